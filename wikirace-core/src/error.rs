use thiserror::Error;
use wikirace_scanner::FetchError;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to set up link source: {0}")]
    Setup(#[source] FetchError),

    #[error("Link source unavailable, no lookup succeeded: {0}")]
    Unavailable(#[source] FetchError),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SearchError>;
