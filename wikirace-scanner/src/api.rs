// Link source backed by the MediaWiki query API (prop=links)

use crate::error::{FetchError, Result};
use crate::source::{LinkCollector, LinkSource, get_body, parse_json};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::Url;

/// Follow at most this many `continue` tokens per page by default.
pub const DEFAULT_MAX_CONTINUATIONS: usize = 20;

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
    #[serde(default, rename = "continue")]
    continuation: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: BTreeMap<String, PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    #[serde(default)]
    missing: Option<serde_json::Value>,
    #[serde(default)]
    invalid: Option<serde_json::Value>,
    #[serde(default)]
    links: Vec<LinkEntry>,
}

#[derive(Debug, Deserialize)]
struct LinkEntry {
    title: String,
}

pub struct ApiLinkSource {
    client: Client,
    endpoint: Url,
    max_continuations: usize,
}

impl ApiLinkSource {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self {
            client,
            endpoint,
            max_continuations: DEFAULT_MAX_CONTINUATIONS,
        }
    }

    pub fn with_max_continuations(mut self, max_continuations: usize) -> Self {
        self.max_continuations = max_continuations;
        self
    }

    async fn fetch_batch(
        &self,
        page: &str,
        continuation: &[(String, String)],
    ) -> Result<QueryResponse> {
        let mut params: Vec<(&str, &str)> = vec![
            ("action", "query"),
            ("titles", page),
            ("format", "json"),
            ("prop", "links"),
            ("pllimit", "max"),
        ];
        params.extend(continuation.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let body = get_body(&self.client, &self.endpoint, &params).await?;
        parse_json(&body)
    }
}

#[async_trait]
impl LinkSource for ApiLinkSource {
    async fn fetch_links(&self, page: &str) -> Result<Vec<String>> {
        let mut collector = LinkCollector::new();
        let mut continuation: Vec<(String, String)> = Vec::new();
        let mut rounds = 0;

        loop {
            let response = self.fetch_batch(page, &continuation).await?;

            if let Some(error) = response.error {
                return Err(FetchError::Api {
                    code: error.code,
                    info: error.info,
                });
            }

            let query = response
                .query
                .ok_or_else(|| FetchError::NoLinkData(page.to_string()))?;

            for entry in query.pages.values() {
                if entry.missing.is_some() || entry.invalid.is_some() {
                    return Err(FetchError::MissingPage(page.to_string()));
                }
                for link in &entry.links {
                    collector.push(&link.title);
                }
            }

            let Some(next) = response.continuation else {
                break;
            };
            if rounds >= self.max_continuations {
                warn!(
                    "Stopping link listing for '{}' after {} continuations ({} links so far)",
                    page,
                    rounds,
                    collector.len()
                );
                break;
            }

            continuation = next
                .into_iter()
                .filter_map(|(key, value)| value.as_str().map(|v| (key, v.to_string())))
                .collect();
            rounds += 1;
        }

        debug!("'{}' links to {} content pages", page, collector.len());
        Ok(collector.into_links())
    }

    fn name(&self) -> &'static str {
        "api"
    }
}
