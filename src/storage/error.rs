use thiserror::Error;

use crate::http::error::TransportError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("download failed: {0}")]
    Download(#[from] TransportError),

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("tagging failed: {0}")]
    Tag(#[from] lofty::error::LoftyError),

    #[error("cover {0} is empty")]
    EmptyCover(String),

    #[error("{0} has no writable tag")]
    NoWritableTag(String),
}
