// Configuration for a path search

use serde::Serialize;
use std::time::Duration;

/// How many lookups the engine keeps in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One lookup at a time, frontier served strictly first-in first-out.
    Sequential,
    /// Many overlapping lookups, bounded by the rate limiter and
    /// `max_in_flight`.
    Concurrent,
}

impl Strategy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sequential" | "dumb" => Some(Strategy::Sequential),
            "concurrent" | "async" => Some(Strategy::Concurrent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Concurrent => "concurrent",
        }
    }
}

/// Retry budget for transient lookup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Backoff before retry number `retry` (1-based): base, 2x base, 4x base, ...
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Nodes at this depth or deeper are never expanded. `None` is unbounded.
    pub max_depth: Option<usize>,
    pub strategy: Strategy,
    /// Upper bound on outstanding lookups for the concurrent strategy.
    pub max_in_flight: usize,
    pub retry: RetryPolicy,
    /// Per-attempt deadline; expiry counts as a transient failure.
    pub lookup_timeout: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            strategy: Strategy::Concurrent,
            max_in_flight: 256,
            retry: RetryPolicy::default(),
            lookup_timeout: Duration::from_secs(10),
        }
    }
}

impl SearchOptions {
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// The in-flight ceiling the engine actually uses.
    pub fn in_flight_limit(&self) -> usize {
        match self.strategy {
            Strategy::Sequential => 1,
            Strategy::Concurrent => self.max_in_flight.max(1),
        }
    }

    /// Whether a node at `depth` may still be expanded.
    pub fn allows_expansion(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth < max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(Strategy::from_str("sequential"), Some(Strategy::Sequential));
        assert_eq!(Strategy::from_str("DUMB"), Some(Strategy::Sequential));
        assert_eq!(Strategy::from_str("async"), Some(Strategy::Concurrent));
        assert_eq!(Strategy::from_str("parallel"), None);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.delay_for(1), Duration::from_millis(200));
        assert_eq!(retry.delay_for(2), Duration::from_millis(400));
        assert_eq!(retry.delay_for(3), Duration::from_millis(800));
        assert_eq!(retry.delay_for(30), Duration::from_secs(5));
    }

    #[test]
    fn test_sequential_forces_single_lookup() {
        let options = SearchOptions::default()
            .with_strategy(Strategy::Sequential)
            .with_max_in_flight(64);
        assert_eq!(options.in_flight_limit(), 1);

        let options = SearchOptions::default().with_max_in_flight(0);
        assert_eq!(options.in_flight_limit(), 1);
    }

    #[test]
    fn test_depth_bound() {
        let unbounded = SearchOptions::default();
        assert!(unbounded.allows_expansion(1_000));

        let bounded = SearchOptions::default().with_max_depth(Some(2));
        assert!(bounded.allows_expansion(0));
        assert!(bounded.allows_expansion(1));
        assert!(!bounded.allows_expansion(2));
    }
}
