// Frontier engine: breadth-first search over page links with many lookups in flight

use crate::error::{Result, SearchError};
use crate::event::{EventCallback, SearchEvent};
use crate::node::{NodeArena, NodeId};
use crate::options::{RetryPolicy, SearchOptions};
use crate::report::{PathResult, SearchReport, SearchStats};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use wikirace_scanner::{FetchError, LinkSource, RateLimiter};

type LookupResult = std::result::Result<Vec<String>, FetchError>;

/// A finished lookup task, handed back to the coordinating loop.
struct Lookup {
    node: NodeId,
    result: LookupResult,
    attempts: u32,
}

/// State of one search run.
///
/// Only the coordinating loop touches it; lookup tasks return their results
/// instead of writing here. That makes the visited check-and-insert a single
/// `HashSet::insert`, with no window for two tasks to claim the same page.
struct Frontier {
    arena: NodeArena,
    visited: HashSet<String>,
    /// Accepted nodes waiting for an in-flight slot, oldest first.
    queue: VecDeque<NodeId>,
    in_flight: JoinSet<Lookup>,
    stats: SearchStats,
    succeeded: usize,
    connect_error: Option<FetchError>,
}

impl Frontier {
    fn new(start: &str) -> Self {
        let mut arena = NodeArena::new();
        let root = arena.root(start);
        let mut visited = HashSet::new();
        visited.insert(start.to_string());

        Self {
            arena,
            visited,
            queue: VecDeque::from([root]),
            in_flight: JoinSet::new(),
            stats: SearchStats::default(),
            succeeded: 0,
            connect_error: None,
        }
    }

    fn describe(&self, id: NodeId) -> (String, usize) {
        self.arena
            .get(id)
            .map(|node| (node.page.clone(), node.depth))
            .unwrap_or_default()
    }
}

/// Runs the search. Each frontier node gets one lookup task (permit, fetch with
/// timeout, retries); the coordinating loop consumes completions in whatever
/// order they finish and stops at the first link that names the target.
/// Depth is carried per node, so BFS order holds per branch even though
/// completions interleave across levels.
pub struct PathFinder {
    source: Arc<dyn LinkSource>,
    limiter: Arc<RateLimiter>,
    options: SearchOptions,
    event_callback: Option<EventCallback>,
}

impl PathFinder {
    pub fn new(source: Arc<dyn LinkSource>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            source,
            limiter,
            options: SearchOptions::default(),
            event_callback: None,
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    /// Searches for a link path from `start` to `target`.
    ///
    /// Per-page lookup failures never abort the search; such pages simply
    /// contribute no links. An error is returned only for invalid input, or
    /// when no lookup succeeded and the link source could not be reached.
    pub async fn find_path(&self, start: &str, target: &str) -> Result<SearchReport> {
        validate_input(start, target)?;

        info!(
            "Searching '{}' -> '{}' (max depth: {}, strategy: {}, source: {})",
            start,
            target,
            self.options
                .max_depth
                .map_or_else(|| "unbounded".to_string(), |d| d.to_string()),
            self.options.strategy.as_str(),
            self.source.name()
        );

        let started = Instant::now();
        let mut frontier = Frontier::new(start);
        let outcome = self.run(&mut frontier, target).await;

        // Whatever is still outstanding can no longer change the answer.
        frontier.stats.abandoned = frontier.in_flight.len();
        frontier.in_flight.abort_all();

        let terminal = outcome?;
        frontier.stats.visited = frontier.visited.len();
        frontier.stats.elapsed = started.elapsed();

        let result = match terminal {
            Some(id) => PathResult::Found(frontier.arena.path_to(id)),
            None => {
                if frontier.succeeded == 0
                    && let Some(err) = frontier.connect_error.take()
                {
                    return Err(SearchError::Unavailable(err));
                }
                PathResult::NotFound
            }
        };

        let stats = frontier.stats;
        match &result {
            PathResult::Found(path) => info!(
                "Path found with {} hops after {} lookups in {:.2}s",
                path.len().saturating_sub(1),
                stats.lookups,
                stats.elapsed.as_secs_f64()
            ),
            PathResult::NotFound => info!(
                "Path not found after {} lookups ({} pages discovered)",
                stats.lookups, stats.visited
            ),
        }

        Ok(SearchReport {
            start: start.to_string(),
            target: target.to_string(),
            max_depth: self.options.max_depth,
            strategy: self.options.strategy,
            result,
            stats,
        })
    }

    async fn run(&self, frontier: &mut Frontier, target: &str) -> Result<Option<NodeId>> {
        if !self.options.allows_expansion(0) {
            debug!("Depth bound of 0 leaves nothing to expand");
            return Ok(None);
        }

        let limit = self.options.in_flight_limit();

        loop {
            while frontier.in_flight.len() < limit {
                let Some(id) = frontier.queue.pop_front() else {
                    break;
                };
                self.spawn_lookup(frontier, id);
            }

            // Empty task set with an empty queue: the frontier is exhausted.
            let Some(joined) = frontier.in_flight.join_next().await else {
                return Ok(None);
            };
            let lookup = joined?;

            frontier.stats.lookups += 1;
            frontier.stats.retries += lookup.attempts.saturating_sub(1) as usize;

            match lookup.result {
                Ok(links) => {
                    frontier.succeeded += 1;
                    if let Some(terminal) = self.expand(frontier, lookup.node, links, target) {
                        return Ok(Some(terminal));
                    }
                }
                Err(err) => self.record_failure(frontier, lookup.node, err),
            }
        }
    }

    /// Turns one page's links into frontier nodes. Returns the terminal node
    /// as soon as a link names the target.
    fn expand(
        &self,
        frontier: &mut Frontier,
        parent: NodeId,
        links: Vec<String>,
        target: &str,
    ) -> Option<NodeId> {
        let (parent_page, parent_depth) = frontier.describe(parent);
        let child_depth = parent_depth + 1;
        let expandable = self.options.allows_expansion(child_depth);
        let total = links.len();
        let mut discovered = 0;

        for link in links {
            if link == target {
                let terminal = frontier.arena.child(parent, link);
                debug!("'{}' links to target '{}'", parent_page, target);
                emit(
                    &self.event_callback,
                    SearchEvent::TargetFound {
                        page: target.to_string(),
                        depth: child_depth,
                    },
                );
                return Some(terminal);
            }

            if expandable && frontier.visited.insert(link.clone()) {
                let child = frontier.arena.child(parent, link);
                frontier.queue.push_back(child);
                discovered += 1;
            }
        }

        debug!(
            "Expanded '{}' (depth {}): {} links, {} new, {} queued",
            parent_page,
            parent_depth,
            total,
            discovered,
            frontier.queue.len()
        );
        emit(
            &self.event_callback,
            SearchEvent::NodeExpanded {
                page: parent_page,
                depth: parent_depth,
                links: total,
                discovered,
            },
        );

        None
    }

    fn record_failure(&self, frontier: &mut Frontier, node: NodeId, err: FetchError) {
        let (page, depth) = frontier.describe(node);
        frontier.stats.failed_lookups += 1;

        warn!("Giving up on '{}' (depth {}): {}", page, depth, err);
        emit(
            &self.event_callback,
            SearchEvent::failed(&page, depth, err.kind(), err.to_string()),
        );

        if err.is_connect() {
            frontier.connect_error = Some(err);
        }
    }

    fn spawn_lookup(&self, frontier: &mut Frontier, id: NodeId) {
        let (page, depth) = frontier.describe(id);
        let task = LookupTask {
            page,
            depth,
            source: Arc::clone(&self.source),
            limiter: Arc::clone(&self.limiter),
            retry: self.options.retry.clone(),
            timeout: self.options.lookup_timeout,
            event_callback: self.event_callback.clone(),
        };

        frontier.in_flight.spawn(async move {
            let (result, attempts) = task.run().await;
            Lookup {
                node: id,
                result,
                attempts,
            }
        });
    }
}

/// Everything one lookup needs, moved into its task.
struct LookupTask {
    page: String,
    depth: usize,
    source: Arc<dyn LinkSource>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    timeout: Duration,
    event_callback: Option<EventCallback>,
}

impl LookupTask {
    async fn run(self) -> (LookupResult, u32) {
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.limiter.acquire().await;

            debug!(
                "Looking up '{}' (depth {}, attempt {})",
                self.page, self.depth, attempt
            );
            emit(
                &self.event_callback,
                SearchEvent::LookupStarted {
                    page: self.page.clone(),
                    depth: self.depth,
                    attempt,
                },
            );

            let result = tokio::time::timeout(self.timeout, self.source.fetch_links(&self.page))
                .await
                .unwrap_or(Err(FetchError::Timeout(self.timeout)));

            match result {
                Err(err) if err.is_transient() && attempt <= self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Lookup of '{}' failed ({}), retry {} in {:?}",
                        self.page, err, attempt, delay
                    );
                    emit(
                        &self.event_callback,
                        SearchEvent::LookupRetried {
                            page: self.page.clone(),
                            attempt,
                            error: err.to_string(),
                        },
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return (other, attempt),
            }
        }
    }
}

fn emit(callback: &Option<EventCallback>, event: SearchEvent) {
    if let Some(callback) = callback {
        callback(&event);
    }
}

/// Rejects searches that cannot be meaningful before any lookup is issued.
pub fn validate_input(start: &str, target: &str) -> Result<()> {
    if start.trim().is_empty() {
        return Err(SearchError::InvalidInput(
            "start page must not be empty".to_string(),
        ));
    }
    if target.trim().is_empty() {
        return Err(SearchError::InvalidInput(
            "target page must not be empty".to_string(),
        ));
    }
    if start == target {
        return Err(SearchError::InvalidInput(format!(
            "start and target are the same page ('{}')",
            start
        )));
    }
    Ok(())
}
