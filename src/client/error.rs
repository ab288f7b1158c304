use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors returned by [`PublerClient`](super::PublerClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a status outside 200-299.
    #[error("Publer API error: {status} {status_text}")]
    Api {
        status: u16,
        status_text: String,
        /// Response body, parsed as JSON when possible, otherwise the raw text.
        payload: Value,
    },

    #[error("request failed")]
    Transport(#[from] reqwest::Error),

    #[error("invalid request URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid {name} header value")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Payload returned by the server for an API error.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ClientError::Api { payload, .. } => Some(payload),
            _ => None,
        }
    }
}
