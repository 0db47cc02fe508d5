use std::{io::Read, time::Duration};

use log::debug;
use serde_json::Value;

use crate::http::{Downloader, FetchRequest, Fetcher, error::TransportError};

/// [`Fetcher`] and [`Downloader`] backed by a `ureq` agent
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .build();
        Self { agent }
    }

    fn call(&self, request: &FetchRequest) -> Result<ureq::Response, TransportError> {
        debug!("GET {}", request.url);
        let mut call = self.agent.get(&request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }
        call.call()
            .map_err(|err| TransportError::from_ureq(&request.url, err))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpClient {
    fn fetch_text(&self, request: &FetchRequest) -> Result<String, TransportError> {
        self.call(request)?
            .into_string()
            .map_err(|err| TransportError::body(&request.url, err))
    }

    fn fetch_json(&self, request: &FetchRequest) -> Result<Value, TransportError> {
        self.call(request)?
            .into_json::<Value>()
            .map_err(|err| TransportError::body(&request.url, err))
    }
}

impl Downloader for HttpClient {
    fn open(&self, request: &FetchRequest) -> Result<Box<dyn Read + Send>, TransportError> {
        let response = self.call(request)?;
        Ok(Box::new(response.into_reader()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_request_collects_headers() {
        let request = FetchRequest::new("https://m.kugou.com/", Duration::from_secs(3))
            .headers(vec![("User-Agent".to_string(), "ua".to_string())])
            .headers(vec![("Referer".to_string(), "ref".to_string())]);

        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.timeout, Duration::from_secs(3));
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let client = HttpClient::new();
        let request = FetchRequest::new("http://127.0.0.1:1/", Duration::from_secs(2));

        let err = client.fetch_text(&request).unwrap_err();

        assert!(matches!(err, TransportError::Transport { .. }));
    }
}
