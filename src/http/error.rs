use thiserror::Error;

/// Failure of a single HTTP exchange.
///
/// Timeouts are reported as `Transport` like any other connection problem.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("unreadable response from {url}: {reason}")]
    Body { url: String, reason: String },
}

impl TransportError {
    pub fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => TransportError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => TransportError::Transport {
                url: url.to_string(),
                reason: transport.to_string(),
            },
        }
    }

    pub fn body(url: &str, reason: impl ToString) -> Self {
        TransportError::Body {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
