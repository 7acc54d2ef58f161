use std::time::Duration;
use thiserror::Error;

/// How a failed lookup should be treated by its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Worth retrying: timeouts, throttling, transport errors, truncated bodies.
    Transient,
    /// Retrying will not help: the page does not exist or carries no link data.
    Permanent,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Throttled by server (HTTP {0})")]
    Throttled(u16),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Response carries no link data for '{0}'")]
    NoLinkData(String),

    #[error("Page does not exist: {0}")]
    MissingPage(String),

    #[error("API error {code}: {info}")]
    Api { code: String, info: String },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// API error codes that clear up on their own.
const TRANSIENT_API_CODES: &[&str] = &["maxlag", "ratelimited", "readonly", "internal_api_error"];

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::HttpError(e) if e.is_builder() => FailureKind::Permanent,
            FetchError::HttpError(_)
            | FetchError::Timeout(_)
            | FetchError::Throttled(_)
            | FetchError::Malformed(_) => FailureKind::Transient,
            FetchError::Status(code) if *code >= 500 => FailureKind::Transient,
            FetchError::Status(_) => FailureKind::Permanent,
            FetchError::Api { code, .. } if TRANSIENT_API_CODES.contains(&code.as_str()) => {
                FailureKind::Transient
            }
            FetchError::Api { .. }
            | FetchError::NoLinkData(_)
            | FetchError::MissingPage(_)
            | FetchError::InvalidEndpoint(_) => FailureKind::Permanent,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == FailureKind::Transient
    }

    /// True when no connection to the endpoint could be established at all.
    pub fn is_connect(&self) -> bool {
        matches!(self, FetchError::HttpError(e) if e.is_connect())
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
