use crate::engine::PathFinder;
use crate::error::{Result, SearchError};
use crate::event::{EventCallback, SearchEvent};
use crate::options::{SearchOptions, Strategy};
use crate::report::SearchReport;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use url::Url;
use wikirace_scanner::{ApiLinkSource, LinkSource, ParseLinkSource, RateLimiter, build_client};

/// Which link source backs a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Structured `prop=links` query
    Api,
    /// Scrape the rendered page HTML
    Parse,
}

impl SourceKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "api" | "query" => Some(SourceKind::Api),
            "parse" | "html" => Some(SourceKind::Parse),
            _ => None,
        }
    }

    /// The pairing used when no source is requested explicitly.
    pub fn default_for(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Sequential => SourceKind::Parse,
            Strategy::Concurrent => SourceKind::Api,
        }
    }
}

/// Options for configuring a search run
#[derive(Debug)]
pub struct SearchRequest {
    pub start: String,
    pub target: String,
    pub endpoint: Url,
    pub source: SourceKind,
    pub max_rate: u32,
    pub window: Duration,
    pub max_continuations: usize,
    pub options: SearchOptions,
    pub show_progress: bool,
}

/// Builds the link source a request asks for, sharing one HTTP client.
pub fn build_link_source(request: &SearchRequest) -> Result<Arc<dyn LinkSource>> {
    let client = build_client(request.options.lookup_timeout).map_err(SearchError::Setup)?;
    let endpoint = request.endpoint.clone();

    Ok(match request.source {
        SourceKind::Api => Arc::new(
            ApiLinkSource::new(client, endpoint).with_max_continuations(request.max_continuations),
        ),
        SourceKind::Parse => Arc::new(ParseLinkSource::new(client, endpoint)),
    })
}

/// Execute a search with the given request
pub async fn execute_search(request: SearchRequest) -> Result<SearchReport> {
    let source = build_link_source(&request)?;
    let limiter = Arc::new(RateLimiter::new(request.max_rate, request.window));

    let SearchRequest {
        start,
        target,
        options,
        show_progress,
        ..
    } = request;

    // Spinner for overall progress (only if enabled)
    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Searching '{}' -> '{}'...", start, target));
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut finder = PathFinder::new(source, limiter).with_options(options);
    if let Some(ref pb) = progress_bar {
        finder = finder.with_event_callback(progress_callback(pb.clone()));
    }

    let outcome = finder.find_path(&start, &target).await;

    if let Some(ref pb) = progress_bar {
        match &outcome {
            Ok(report) if report.result.is_found() => pb.finish_with_message(format!(
                "Path found! {} pages looked up",
                report.stats.lookups
            )),
            Ok(report) => pb.finish_with_message(format!(
                "Search finished, no path. {} pages looked up",
                report.stats.lookups
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    outcome
}

/// Counts finished lookups and discoveries into the spinner message.
fn progress_callback(pb: Arc<ProgressBar>) -> EventCallback {
    let looked_up = Arc::new(AtomicUsize::new(0));
    let discovered = Arc::new(AtomicUsize::new(1));
    let failed = Arc::new(AtomicUsize::new(0));
    let started = Instant::now();

    Arc::new(move |event: &SearchEvent| match event {
        SearchEvent::NodeExpanded {
            discovered: new, ..
        } => {
            let count = looked_up.fetch_add(1, Ordering::Relaxed) + 1;
            let total = discovered.fetch_add(*new, Ordering::Relaxed) + new;
            let rate = count as f64 / started.elapsed().as_secs_f64().max(0.001);
            pb.set_message(format!(
                "Searching... {} looked up, {} discovered, {} failed ({:.1} lookups/s)",
                count,
                total,
                failed.load(Ordering::Relaxed),
                rate
            ));
        }
        SearchEvent::LookupFailed { .. } => {
            looked_up.fetch_add(1, Ordering::Relaxed);
            failed.fetch_add(1, Ordering::Relaxed);
        }
        SearchEvent::TargetFound { page, depth } => {
            pb.set_message(format!("Reached '{}' at depth {}", page, depth));
        }
        SearchEvent::LookupStarted { .. } | SearchEvent::LookupRetried { .. } => {}
    })
}
