pub mod api;
pub mod error;
pub mod limiter;
pub mod parse;
pub mod source;

pub use api::ApiLinkSource;
pub use error::{FailureKind, FetchError};
pub use limiter::RateLimiter;
pub use parse::ParseLinkSource;
pub use source::{DEFAULT_ENDPOINT, LinkSource, build_client, parse_endpoint};
