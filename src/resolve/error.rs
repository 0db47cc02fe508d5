use thiserror::Error;

use crate::{domain::track::SourceTag, http::error::TransportError};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("identifier not found")]
    NotFound,

    #[error("failed to fetch track page: {0}")]
    Fetch(#[from] TransportError),
}

/// Why a metadata source produced no record.
///
/// HTTP failures, malformed payloads and "not available" answers
/// all end up here.
#[derive(Debug, Error)]
#[error("{source_tag} source failed: {kind}")]
pub struct SourceError {
    pub source_tag: SourceTag,
    pub kind: SourceFailure,
}

#[derive(Debug, Error)]
pub enum SourceFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected payload: {0}")]
    Malformed(String),

    #[error("not available: {0}")]
    Unavailable(String),
}

impl SourceError {
    pub fn new(source_tag: SourceTag, kind: impl Into<SourceFailure>) -> Self {
        Self {
            source_tag,
            kind: kind.into(),
        }
    }
}

/// Failures that abort a resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not extract track identifier: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("no playable stream: {0}")]
    NoPlayableStream(SourceError),
}
