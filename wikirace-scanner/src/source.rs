use crate::error::{FetchError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// Titles containing this character live in a non-content namespace
/// (Help:, Category:, Template:, User talk:, ...).
pub const NAMESPACE_SEPARATOR: char = ':';

const USER_AGENT: &str = "wikirace/0.1 (https://github.com/trapdoorsec/wikirace)";

/// Something that can list the pages a page links to.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Returns the content pages linked from `page`.
    ///
    /// The result is deduplicated and keeps the order the links appeared in
    /// the response. An empty vector means the page has no outgoing links.
    async fn fetch_links(&self, page: &str) -> Result<Vec<String>>;

    /// Short label for logs and reports.
    fn name(&self) -> &'static str;
}

pub fn is_content_title(title: &str) -> bool {
    !title.is_empty() && !title.contains(NAMESPACE_SEPARATOR)
}

/// Accumulates titles, dropping non-content and duplicate entries while
/// keeping first-seen order.
#[derive(Debug, Default)]
pub struct LinkCollector {
    seen: HashSet<String>,
    links: Vec<String>,
}

impl LinkCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, title: &str) -> bool {
        if !is_content_title(title) || self.seen.contains(title) {
            return false;
        }
        self.seen.insert(title.to_string());
        self.links.push(title.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn into_links(self) -> Vec<String> {
        self.links
    }
}

/// Builds the shared HTTP client used by both link sources.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout / 2)
        .pool_max_idle_per_host(50)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| FetchError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidEndpoint(format!(
            "unsupported scheme '{}' in {}",
            other, endpoint
        ))),
    }
}

/// Sends one GET to the API endpoint and returns the body of a 2xx response.
pub(crate) async fn get_body(
    client: &Client,
    endpoint: &Url,
    params: &[(&str, &str)],
) -> Result<String> {
    debug!("GET {} {:?}", endpoint, params);

    let response = client.get(endpoint.clone()).query(params).send().await?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::Throttled(status.as_u16()));
    }
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    Ok(response.text().await?)
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_title_filter() {
        assert!(is_content_title("Rust (programming language)"));
        assert!(!is_content_title("Help:Contents"));
        assert!(!is_content_title("User talk:Example"));
        assert!(!is_content_title(""));
    }

    #[test]
    fn test_collector_keeps_first_seen_order() {
        let mut collector = LinkCollector::new();
        assert!(collector.push("Tokio"));
        assert!(collector.push("Rust"));
        assert!(!collector.push("Tokio"));
        assert!(!collector.push("Category:Software"));
        assert!(collector.push("Async"));

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.into_links(), vec!["Tokio", "Rust", "Async"]);
    }

    #[test]
    fn test_parse_endpoint() {
        assert!(parse_endpoint(DEFAULT_ENDPOINT).is_ok());
        assert!(matches!(
            parse_endpoint("ftp://example.com/api.php"),
            Err(FetchError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            parse_endpoint("not a url"),
            Err(FetchError::InvalidEndpoint(_))
        ));
    }
}
