// Link source that scrapes the rendered HTML of a page (action=parse)

use crate::api::ApiErrorBody;
use crate::error::{FetchError, Result};
use crate::source::{LinkCollector, LinkSource, get_body, parse_json};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Article links in rendered HTML start with this path.
pub const CONTENT_PATH_PREFIX: &str = "/wiki/";

#[derive(Debug, Deserialize)]
struct ParseResponse {
    #[serde(default)]
    parse: Option<ParseBody>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ParseBody {
    text: ParseText,
}

#[derive(Debug, Deserialize)]
struct ParseText {
    #[serde(rename = "*")]
    html: String,
}

pub struct ParseLinkSource {
    client: Client,
    endpoint: Url,
}

impl ParseLinkSource {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

/// Pulls article titles out of rendered page HTML.
///
/// Only plain anchors count: the href must start with `content_prefix`, the
/// anchor must carry no `class` attribute (those are edit links, red links,
/// navigation chrome) and its `title` must not name another namespace.
pub fn extract_titles(html: &str, content_prefix: &str) -> Vec<String> {
    let document = Html::parse_fragment(html);
    let selector = Selector::parse("a[href]").expect("anchor selector is valid");
    let mut collector = LinkCollector::new();

    for element in document.select(&selector) {
        let anchor = element.value();
        let Some(href) = anchor.attr("href") else {
            continue;
        };
        if !href.starts_with(content_prefix) || anchor.attr("class").is_some() {
            continue;
        }
        if let Some(title) = anchor.attr("title") {
            collector.push(title);
        }
    }

    collector.into_links()
}

#[async_trait]
impl LinkSource for ParseLinkSource {
    async fn fetch_links(&self, page: &str) -> Result<Vec<String>> {
        let params = [("action", "parse"), ("page", page), ("format", "json")];
        let body = get_body(&self.client, &self.endpoint, &params).await?;
        let response: ParseResponse = parse_json(&body)?;

        if let Some(error) = response.error {
            if error.code == "missingtitle" {
                return Err(FetchError::MissingPage(page.to_string()));
            }
            return Err(FetchError::Api {
                code: error.code,
                info: error.info,
            });
        }

        let parsed = response
            .parse
            .ok_or_else(|| FetchError::NoLinkData(page.to_string()))?;

        let links = extract_titles(&parsed.text.html, CONTENT_PATH_PREFIX);
        debug!("'{}' renders {} content links", page, links.len());
        Ok(links)
    }

    fn name(&self) -> &'static str {
        "parse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{build_client, parse_endpoint};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    const PAGE_HTML: &str = r#"<div class="mw-parser-output">
        <p><a href="/wiki/Mozilla" title="Mozilla">Mozilla</a> sponsored
        <a href="/wiki/Graydon_Hoare" title="Graydon Hoare">Graydon</a>.</p>
        <a href="/wiki/Help:IPA" title="Help:IPA">IPA</a>
        <a href="/wiki/Cargo_(software)" class="mw-redirect" title="Cargo (software)">Cargo</a>
        <a href="https://www.rust-lang.org/" title="External">site</a>
        <a href="/wiki/Mozilla" title="Mozilla">again</a>
        <a href="/wiki/No_title">untitled</a>
    </div>"#;

    #[test]
    fn test_extract_titles() {
        let titles = extract_titles(PAGE_HTML, CONTENT_PATH_PREFIX);
        assert_eq!(titles, vec!["Mozilla", "Graydon Hoare"]);
    }

    #[test]
    fn test_extract_titles_custom_prefix() {
        let html = r#"<a href="/w/Alpha" title="Alpha">a</a>
            <a href="/wiki/Beta" title="Beta">b</a>"#;
        assert_eq!(extract_titles(html, "/w/"), vec!["Alpha"]);
    }

    #[tokio::test]
    async fn test_fetch_parsed_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("action", "parse"))
            .and(query_param("page", "Rust"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parse": {"title": "Rust", "pageid": 1, "text": {"*": PAGE_HTML}}
            })))
            .mount(&server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let endpoint = parse_endpoint(&format!("{}/w/api.php", server.uri())).unwrap();
        let source = ParseLinkSource::new(client, endpoint);

        let links = source.fetch_links("Rust").await.unwrap();
        assert_eq!(links, vec!["Mozilla", "Graydon Hoare"]);
    }

    #[tokio::test]
    async fn test_missing_title() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": "missingtitle", "info": "The page you specified doesn't exist."}
            })))
            .mount(&server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let endpoint = parse_endpoint(&server.uri()).unwrap();
        let source = ParseLinkSource::new(client, endpoint);

        let err = source.fetch_links("Nowhere").await.unwrap_err();
        assert!(matches!(err, FetchError::MissingPage(_)));
    }

    #[tokio::test]
    async fn test_response_without_parse_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"batchcomplete": ""})))
            .mount(&server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let endpoint = parse_endpoint(&server.uri()).unwrap();
        let source = ParseLinkSource::new(client, endpoint);

        let err = source.fetch_links("Rust").await.unwrap_err();
        assert!(matches!(err, FetchError::NoLinkData(_)));
        assert!(!err.is_transient());
    }
}
