//! Track identifier extraction from share links and track pages

use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;
use url::Url;

use crate::{
    domain::hash::{AlbumId, TrackHash},
    http::Fetcher,
    resolve::{Resolver, error::ExtractionError},
};

static JSON_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)"hash"\s*:\s*"([a-f0-9]{32})""#).unwrap());
static QUERY_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)hash=([a-f0-9]{32})").unwrap());
static JSON_ALBUM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""album_id"\s*:\s*(\d+)"#).unwrap());

/// Ways of finding the identifiers, tried in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `#hash=...&album_id=...`
    Fragment,
    /// `?hash=...&album_id=...`
    Query,
    /// markup of a canonical track page
    PageScrape,
}

pub const STRATEGIES: [Strategy; 3] = [Strategy::Fragment, Strategy::Query, Strategy::PageScrape];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub hash: TrackHash,
    pub album_id: Option<AlbumId>,
    pub strategy: Strategy,
    /// The input after parsing; later steps match against this, not the raw text
    pub page_url: Url,
    /// Markup of the track page, when it was scraped
    pub track_page: Option<String>,
}

impl<F: Fetcher> Resolver<F> {
    /// Finds the track hash (and album id, if any) behind `input`
    pub fn extract(&self, input: &str) -> Result<Extracted, ExtractionError> {
        let url = Url::parse(input.trim()).map_err(|e| ExtractionError::InvalidUrl {
            url: input.to_string(),
            reason: e.to_string(),
        })?;

        for strategy in STRATEGIES {
            if let Some(extracted) = self.probe(strategy, &url)? {
                info!(
                    "Found hash {} via {strategy:?}{}",
                    extracted.hash,
                    extracted
                        .album_id
                        .as_ref()
                        .map(|id| format!(", album_id {id}"))
                        .unwrap_or_default()
                );
                return Ok(extracted);
            }
            debug!("{strategy:?} found no hash in {url}");
        }

        Err(ExtractionError::NotFound)
    }

    fn probe(&self, strategy: Strategy, url: &Url) -> Result<Option<Extracted>, ExtractionError> {
        let (ids, track_page) = match strategy {
            Strategy::Fragment => (url.fragment().and_then(ids_from_pairs), None),
            Strategy::Query => (url.query().and_then(ids_from_pairs), None),
            Strategy::PageScrape => {
                if !self.catalog.is_track_page(url.as_str()) {
                    return Ok(None);
                }
                let html = self.fetcher.fetch_text(&self.desktop_page(url.as_str()))?;
                (ids_from_markup(&html), Some(html))
            }
        };
        Ok(ids.map(|(hash, album_id)| Extracted {
            hash,
            album_id,
            strategy,
            page_url: url.clone(),
            track_page,
        }))
    }
}

/// Reads `hash` and `album_id` from a query-string shaped text
fn ids_from_pairs(pairs: &str) -> Option<(TrackHash, Option<AlbumId>)> {
    let first = |key: &str| {
        url::form_urlencoded::parse(pairs.as_bytes())
            .find(|(k, v)| k == key && !v.trim().is_empty())
            .map(|(_, v)| v.into_owned())
    };
    let hash = TrackHash::new(&first("hash")?)?;
    let album_id = first("album_id").and_then(|id| AlbumId::new(&id));
    Some((hash, album_id))
}

fn ids_from_markup(html: &str) -> Option<(TrackHash, Option<AlbumId>)> {
    let token = JSON_HASH
        .captures(html)
        .or_else(|| QUERY_HASH.captures(html))?
        .get(1)?
        .as_str();
    let hash = TrackHash::from_scraped(token)?;
    let album_id = JSON_ALBUM_ID
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|id| AlbumId::new(id.as_str()));
    Some((hash, album_id))
}
