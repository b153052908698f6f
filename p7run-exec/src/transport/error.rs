use std::time::Duration;

use crate::transport::HttpError;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{method} {url}: {source}")]
    Network {
        method: String,
        url: String,
        #[source]
        source: HttpError,
    },
    #[error("{method} {url}: unexpected status {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },
    #[error("gave up after {attempts} attempts in {elapsed:?}: {last}")]
    GaveUp {
        attempts: usize,
        elapsed: Duration,
        last: Box<TransportError>,
    },
    #[error("invalid URL '{href}': {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("API token must be non-empty UTF-8 text")]
    InvalidToken,
    #[error("cancelled")]
    Cancelled,
}

impl TransportError {
    /// HTTP status of the final failed attempt, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::GaveUp { last, .. } => last.status(),
            _ => None,
        }
    }
}
