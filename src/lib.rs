pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod model;
pub mod report;
pub mod repos;
pub mod sink;
pub mod stats;
pub mod summary;
pub mod util;
pub mod window;

pub use aggregate::aggregate;
pub use error::{ReportError, Result};
pub use model::{Commit, FileChange, RepoStats, Report, RepositoryRef};
pub use report::{run, CancelToken, RunContext};
pub use summary::{MarkdownSummarizer, Summarizer};
