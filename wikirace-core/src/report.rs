// Search results and report generation

use crate::options::Strategy;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Outcome of a search: a start-to-target path, or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum PathResult {
    Found(Vec<String>),
    NotFound,
}

impl PathResult {
    pub fn is_found(&self) -> bool {
        matches!(self, PathResult::Found(_))
    }

    /// The path, or an empty slice when nothing was found.
    pub fn path(&self) -> &[String] {
        match self {
            PathResult::Found(path) => path,
            PathResult::NotFound => &[],
        }
    }

    /// Number of link hops, if a path was found.
    pub fn hops(&self) -> Option<usize> {
        match self {
            PathResult::Found(path) => Some(path.len().saturating_sub(1)),
            PathResult::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchStats {
    /// Pages whose lookup finished, successfully or not.
    pub lookups: usize,
    pub failed_lookups: usize,
    pub retries: usize,
    /// Distinct pages accepted into the frontier, start included.
    pub visited: usize,
    /// Lookups still outstanding when the search stopped.
    pub abandoned: usize,
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn lookups_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.lookups as f64 / secs
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub start: String,
    pub target: String,
    pub max_depth: Option<usize>,
    pub strategy: Strategy,
    pub result: PathResult,
    pub stats: SearchStats,
}

/// Renders a path the way it is shown to users: `'A' -> 'B' -> 'C'`.
pub fn format_path(path: &[String]) -> String {
    path.iter()
        .map(|page| format!("'{}'", page))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Generate a human-readable search report
pub fn generate_search_report(report: &SearchReport) -> String {
    let mut out = String::new();
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    match &report.result {
        PathResult::Found(path) => {
            out.push_str(&format!(
                "# Path found ({} hops):\n",
                path.len().saturating_sub(1)
            ));
            out.push_str(&format!("  {}\n", format_path(path)));
        }
        PathResult::NotFound => {
            out.push_str("# Path not found\n");
            match report.max_depth {
                Some(depth) => out.push_str(&format!(
                    "  No path from '{}' to '{}' within depth {}\n",
                    report.start, report.target, depth
                )),
                None => out.push_str(&format!(
                    "  '{}' is not reachable from '{}'\n",
                    report.target, report.start
                )),
            }
        }
    }

    let stats = &report.stats;
    out.push_str("\n# Summary:\n");
    out.push_str(&format!("  Strategy: {}\n", report.strategy.as_str()));
    out.push_str(&format!("  Pages looked up: {}\n", stats.lookups));
    out.push_str(&format!("  Pages discovered: {}\n", stats.visited));
    out.push_str(&format!("  Failed lookups: {}\n", stats.failed_lookups));
    out.push_str(&format!("  Retries: {}\n", stats.retries));
    if stats.abandoned > 0 {
        out.push_str(&format!("  Abandoned lookups: {}\n", stats.abandoned));
    }
    out.push_str(&format!(
        "  Elapsed: {:.2}s ({:.1} lookups/s)\n",
        stats.elapsed.as_secs_f64(),
        stats.lookups_per_second()
    ));
    out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    out
}

pub fn render_report(report: &SearchReport, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_search_report(report)),
        ReportFormat::Json => serde_json::to_string_pretty(report),
    }
}
