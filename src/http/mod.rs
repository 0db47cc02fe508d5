//! Blocking HTTP access used by the resolver and the downloader

use std::{io::Read, time::Duration};

use serde_json::Value;

pub mod client;
pub mod error;

use error::TransportError;

/// One GET request: target, headers and its own timeout
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout,
        }
    }

    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }
}

/// Read access to pages and JSON APIs.
///
/// Implementations do not retry. A non-2xx status is an error.
#[cfg_attr(test, mockall::automock)]
pub trait Fetcher {
    fn fetch_text(&self, request: &FetchRequest) -> Result<String, TransportError>;

    fn fetch_json(&self, request: &FetchRequest) -> Result<Value, TransportError>;
}

/// Streaming access to large bodies (audio files, cover images)
#[cfg_attr(test, mockall::automock)]
pub trait Downloader {
    fn open(&self, request: &FetchRequest) -> Result<Box<dyn Read + Send>, TransportError>;
}

impl<T: Fetcher + ?Sized> Fetcher for &T {
    fn fetch_text(&self, request: &FetchRequest) -> Result<String, TransportError> {
        (**self).fetch_text(request)
    }

    fn fetch_json(&self, request: &FetchRequest) -> Result<Value, TransportError> {
        (**self).fetch_json(request)
    }
}

impl<T: Downloader + ?Sized> Downloader for &T {
    fn open(&self, request: &FetchRequest) -> Result<Box<dyn Read + Send>, TransportError> {
        (**self).open(request)
    }
}
