use serde::Serialize;
use std::sync::Arc;
use wikirace_scanner::FailureKind;

/// Progress notifications emitted while a search runs.
///
/// Events are informational only; the engine's decisions never depend on
/// whether anyone is listening.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEvent {
    LookupStarted {
        page: String,
        depth: usize,
        attempt: u32,
    },
    LookupRetried {
        page: String,
        attempt: u32,
        error: String,
    },
    LookupFailed {
        page: String,
        depth: usize,
        permanent: bool,
        error: String,
    },
    NodeExpanded {
        page: String,
        depth: usize,
        links: usize,
        discovered: usize,
    },
    TargetFound {
        page: String,
        depth: usize,
    },
}

impl SearchEvent {
    pub(crate) fn failed(page: &str, depth: usize, kind: FailureKind, error: String) -> Self {
        SearchEvent::LookupFailed {
            page: page.to_string(),
            depth,
            permanent: kind == FailureKind::Permanent,
            error,
        }
    }
}

/// Callback receiving search events; may be invoked from lookup tasks.
pub type EventCallback = Arc<dyn Fn(&SearchEvent) + Send + Sync>;
