//! Turns a share link into [`CanonicalMetadata`].
//!
//! Pipeline: extract identifiers, query play info (mandatory) and album
//! data (optional), merge fields, then pick a cover.

use log::{info, warn};

use crate::{
    catalog::Catalog,
    config::HttpConfig,
    domain::track::{CanonicalMetadata, SourceTag},
    http::{FetchRequest, Fetcher},
    resolve::{
        cover::CoverContext,
        error::{ResolveError, SourceError, SourceFailure},
    },
};

pub mod cover;
pub mod error;
pub mod extract;
pub mod reconcile;
pub mod sources;

pub struct Resolver<F> {
    fetcher: F,
    catalog: Catalog,
    http: HttpConfig,
}

impl<F: Fetcher> Resolver<F> {
    pub fn new(fetcher: F, catalog: Catalog, http: HttpConfig) -> Self {
        Self {
            fetcher,
            catalog,
            http,
        }
    }

    /// Resolves `input_url` end to end.
    ///
    /// Only a missing identifier or a missing stream URL is an error;
    /// album data and cover problems are logged and skipped.
    pub fn resolve(
        &self,
        input_url: &str,
        cover_override: Option<&str>,
    ) -> Result<CanonicalMetadata, ResolveError> {
        let extracted = self.extract(input_url)?;

        let play_info = self
            .fetch_play_info(&extracted.hash)
            .map_err(ResolveError::NoPlayableStream)?;

        let album_data = match &extracted.album_id {
            Some(album_id) => match self.fetch_album_data(&extracted.hash, album_id) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Album data not available, continuing with play info only: {e}");
                    None
                }
            },
            None => None,
        };

        let merged = reconcile::reconcile(&play_info, album_data.as_ref()).ok_or_else(|| {
            ResolveError::NoPlayableStream(SourceError::new(
                SourceTag::PlayInfo,
                SourceFailure::Unavailable("play info has no stream URL".to_string()),
            ))
        })?;
        info!("Resolved \"{} - {}\" ({})", merged.artist, merged.title, merged.album);

        let cover = self.resolve_cover(
            &CoverContext {
                page_url: extracted.page_url.as_str(),
                track_page: extracted.track_page.as_deref(),
                album_id: extracted.album_id.as_ref(),
                play_info: &play_info,
                album_data: album_data.as_ref(),
            },
            cover_override,
        );

        Ok(CanonicalMetadata {
            hash: extracted.hash.to_string(),
            album_id: extracted.album_id.map(|id| id.to_string()),
            title: merged.title,
            artist: merged.artist,
            album: merged.album,
            stream_url: merged.stream_url,
            cover,
        })
    }

    fn desktop_page(&self, url: &str) -> FetchRequest {
        FetchRequest::new(url, self.http.page_timeout()).headers(self.http.desktop.headers())
    }

    fn mobile_page(&self, url: &str) -> FetchRequest {
        FetchRequest::new(url, self.http.page_timeout()).headers(self.http.mobile.headers())
    }

    fn desktop_api(&self, url: &str) -> FetchRequest {
        FetchRequest::new(url, self.http.api_timeout()).headers(self.http.desktop.headers())
    }

    fn mobile_api(&self, url: &str) -> FetchRequest {
        FetchRequest::new(url, self.http.api_timeout()).headers(self.http.mobile.headers())
    }
}
