use clap::ArgMatches;
use serde_json::json;
use std::time::Duration;
use wikirace::commands::command_argument_builder;
use wikirace::handlers::*;
use wikirace_core::{PathResult, SourceKind, Strategy};
use wikirace_scanner::LinkSource;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn matches(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["wikirace"];
    argv.extend_from_slice(args);
    command_argument_builder()
        .try_get_matches_from(argv)
        .expect("arguments should parse")
}

fn search_matches(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["search"];
    argv.extend_from_slice(args);
    matches(&argv)
        .subcommand_matches("search")
        .cloned()
        .expect("search subcommand")
}

// ============================================================================
// Argument handling
// ============================================================================

#[test]
fn test_search_defaults() {
    let args = search_matches(&["-s", "Rust", "-e", "Python"]);
    let request = build_search_request(&args, false).unwrap();

    assert_eq!(request.start, "Rust");
    assert_eq!(request.target, "Python");
    assert_eq!(request.endpoint.as_str(), "https://en.wikipedia.org/w/api.php");
    assert_eq!(request.source, SourceKind::Api);
    assert_eq!(request.max_rate, 150);
    assert_eq!(request.window, Duration::from_secs(1));
    assert_eq!(request.max_continuations, 20);
    assert_eq!(request.options.strategy, Strategy::Concurrent);
    assert_eq!(request.options.max_depth, None);
    assert_eq!(request.options.max_in_flight, 256);
    assert_eq!(request.options.retry.max_retries, 3);
    assert_eq!(request.options.lookup_timeout, Duration::from_secs(10));
    assert!(request.show_progress);
}

#[test]
fn test_dumb_strategy_pairs_with_parse_source() {
    let args = search_matches(&["-s", "A", "-e", "B", "--strategy", "dumb", "-d", "4"]);
    let request = build_search_request(&args, false).unwrap();

    assert_eq!(request.options.strategy, Strategy::Sequential);
    assert_eq!(request.options.in_flight_limit(), 1);
    assert_eq!(request.options.max_depth, Some(4));
    assert_eq!(request.source, SourceKind::Parse);
}

#[test]
fn test_explicit_source_wins() {
    let args = search_matches(&[
        "-s", "A", "-e", "B", "--strategy", "sequential", "--source", "api",
    ]);
    let request = build_search_request(&args, false).unwrap();
    assert_eq!(request.source, SourceKind::Api);
}

#[test]
fn test_tuning_flags() {
    let args = search_matches(&[
        "-s",
        "A",
        "-e",
        "B",
        "--rate",
        "20",
        "--window-ms",
        "500",
        "--max-in-flight",
        "8",
        "--retries",
        "0",
        "--timeout",
        "3",
        "--max-continuations",
        "2",
    ]);
    let request = build_search_request(&args, false).unwrap();

    assert_eq!(request.max_rate, 20);
    assert_eq!(request.window, Duration::from_millis(500));
    assert_eq!(request.options.max_in_flight, 8);
    assert_eq!(request.options.retry.max_retries, 0);
    assert_eq!(request.options.lookup_timeout, Duration::from_secs(3));
    assert_eq!(request.max_continuations, 2);
}

#[test]
fn test_json_and_quiet_disable_progress() {
    let args = search_matches(&["-s", "A", "-e", "B", "--json"]);
    assert!(!build_search_request(&args, false).unwrap().show_progress);

    let args = search_matches(&["-s", "A", "-e", "B"]);
    assert!(!build_search_request(&args, true).unwrap().show_progress);
}

#[test]
fn test_quiet_is_global() {
    let top = matches(&["search", "-s", "A", "-e", "B", "-q"]);
    assert!(top.get_flag("quiet"));
}

#[test]
fn test_invalid_endpoint_is_rejected() {
    let args = search_matches(&["-s", "A", "-e", "B", "--endpoint", "ftp://example.com/api"]);
    let err = build_search_request(&args, false).unwrap_err();
    assert!(format!("{:#}", err).contains("invalid endpoint"));
}

#[test]
fn test_start_and_end_are_required() {
    let result = command_argument_builder().try_get_matches_from(["wikirace", "search", "-s", "A"]);
    assert!(result.is_err());
}

#[test]
fn test_unknown_strategy_is_rejected_by_parser() {
    let result = command_argument_builder().try_get_matches_from([
        "wikirace", "search", "-s", "A", "-e", "B", "--strategy", "parallel",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_zero_timeout_is_rejected_by_parser() {
    for argv in [
        vec!["wikirace", "search", "-s", "A", "-e", "B", "--timeout", "0"],
        vec!["wikirace", "links", "A", "--timeout", "0"],
    ] {
        assert!(command_argument_builder().try_get_matches_from(argv).is_err());
    }

    let args = search_matches(&["-s", "A", "-e", "B", "--timeout", "1"]);
    let request = build_search_request(&args, false).unwrap();
    assert_eq!(request.options.lookup_timeout, Duration::from_secs(1));
}

// ============================================================================
// Search execution
// ============================================================================

async fn mount_links(server: &MockServer, page: &str, links: &[&str]) {
    let links: Vec<_> = links.iter().map(|title| json!({"ns": 0, "title": title})).collect();
    Mock::given(method("GET"))
        .and(query_param("action", "query"))
        .and(query_param("titles", page))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": "",
            "query": {"pages": {"1": {"pageid": 1, "ns": 0, "title": page, "links": links}}}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_handle_search_found() {
    let server = MockServer::start().await;
    mount_links(&server, "Alpha", &["Beta", "Gamma"]).await;
    mount_links(&server, "Beta", &["Omega"]).await;
    mount_links(&server, "Gamma", &[]).await;

    let endpoint = format!("{}/w/api.php", server.uri());
    let args = search_matches(&["-s", "Alpha", "-e", "Omega", "--endpoint", &endpoint]);

    assert_eq!(handle_search(&args, true).await, EXIT_FOUND);
}

#[tokio::test]
async fn test_handle_search_not_found() {
    let server = MockServer::start().await;
    mount_links(&server, "Alpha", &["Beta"]).await;
    mount_links(&server, "Beta", &[]).await;

    let endpoint = format!("{}/w/api.php", server.uri());
    let args = search_matches(&[
        "-s", "Alpha", "-e", "Omega", "--endpoint", &endpoint, "--json",
    ]);

    assert_eq!(handle_search(&args, true).await, EXIT_NOT_FOUND);
}

#[tokio::test]
async fn test_handle_search_same_page_is_an_error() {
    let args = search_matches(&["-s", "Alpha", "-e", "Alpha"]);
    assert_eq!(handle_search(&args, true).await, EXIT_ERROR);
}

#[test]
fn test_exit_codes() {
    let report = wikirace_core::SearchReport {
        start: "A".to_string(),
        target: "B".to_string(),
        max_depth: None,
        strategy: Strategy::Concurrent,
        result: PathResult::NotFound,
        stats: Default::default(),
    };
    assert_eq!(exit_code(&report), EXIT_NOT_FOUND);

    let found = wikirace_core::SearchReport {
        result: PathResult::Found(vec!["A".into(), "B".into()]),
        ..report
    };
    assert_eq!(exit_code(&found), EXIT_FOUND);
}

// ============================================================================
// Links subcommand
// ============================================================================

#[tokio::test]
async fn test_links_source_fetches_page_links() {
    let server = MockServer::start().await;
    mount_links(&server, "Alpha", &["Beta", "Talk:Alpha", "Gamma"]).await;

    let endpoint = server.uri();
    let top = matches(&["links", "Alpha", "--endpoint", &endpoint]);
    let args = top.subcommand_matches("links").unwrap();

    let source = build_links_source(args).unwrap();
    assert_eq!(source.name(), "api");
    assert_eq!(source.fetch_links("Alpha").await.unwrap(), vec!["Beta", "Gamma"]);
    assert_eq!(handle_links(args, true).await, EXIT_FOUND);
}
