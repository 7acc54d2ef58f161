pub mod engine;
pub mod error;
pub mod event;
pub mod node;
pub mod options;
pub mod report;
pub mod search;

pub use engine::{PathFinder, validate_input};
pub use error::SearchError;
pub use event::{EventCallback, SearchEvent};
pub use node::{Node, NodeArena, NodeId};
pub use options::{RetryPolicy, SearchOptions, Strategy};
pub use report::{PathResult, ReportFormat, SearchReport, SearchStats};
pub use search::{SearchRequest, SourceKind, execute_search};
