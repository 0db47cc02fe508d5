//! URL templates and URL checks for the music catalog

use anyhow::Context;
use regex::Regex;
use url::Url;

use crate::{
    config::CatalogConfig,
    domain::hash::{AlbumId, TrackHash},
};

/// Compiled view of [`CatalogConfig`]
#[derive(Debug, Clone)]
pub struct Catalog {
    config: CatalogConfig,
    track_page: Regex,
}

impl Catalog {
    pub fn new(config: CatalogConfig) -> anyhow::Result<Self> {
        let track_page = Regex::new(&config.track_page_pattern)
            .with_context(|| format!("invalid track page pattern {}", config.track_page_pattern))?;
        Ok(Self { config, track_page })
    }

    pub fn play_info_url(&self, hash: &TrackHash) -> String {
        fill(&self.config.play_info_api, &[("hash", hash.as_str())])
    }

    pub fn album_data_url(&self, hash: &TrackHash, album_id: &AlbumId) -> String {
        fill(
            &self.config.album_data_api,
            &[("hash", hash.as_str()), ("album_id", album_id.as_str())],
        )
    }

    pub fn is_track_page(&self, url: &str) -> bool {
        self.track_page.is_match(url)
    }

    /// Token captured from a canonical track page URL
    pub fn track_page_token(&self, url: &str) -> Option<String> {
        let captures = self.track_page.captures(url)?;
        captures.get(1).map(|token| token.as_str().to_string())
    }

    pub fn mobile_track_page_url(&self, token: &str) -> String {
        fill(&self.config.mobile_track_page, &[("token", token)])
    }

    pub fn album_page_url(&self, album_id: &AlbumId) -> String {
        fill(&self.config.album_page, &[("album_id", album_id.as_str())])
    }

    pub fn mobile_album_page_url(&self, album_id: &AlbumId) -> String {
        fill(&self.config.mobile_album_page, &[("album_id", album_id.as_str())])
    }

    /// true if the URL is served by one of the catalog's image hosts (or their subdomains)
    pub fn is_image_host(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        self.config.image_hosts.iter().any(|allowed| {
            let allowed = allowed.trim_start_matches('.').to_ascii_lowercase();
            host == allowed || host.ends_with(&format!(".{allowed}"))
        })
    }

    /// Substitutes the `{size}` placeholder and forces https
    pub fn normalize_image_url(&self, url: &str) -> String {
        let url = url.trim().replace("{size}", &self.config.cover_size);
        let scheme = url.get(..7).filter(|scheme| scheme.eq_ignore_ascii_case("http://"));
        if scheme.is_some() {
            format!("https://{}", &url[7..])
        } else if url.starts_with("//") {
            format!("https:{url}")
        } else {
            url
        }
    }
}

fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), &urlencoding::encode(value))
    })
}
