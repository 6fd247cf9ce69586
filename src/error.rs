use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },
    #[error("Command `{command}` failed ({}): {stderr}", exit_status(.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("Malformed log entry: {0}")]
    MalformedEntry(String),
    #[error("Cannot scan {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No git repositories found under the configured roots")]
    NoRepositories,
    #[error("All {0} discovered repositories failed to process")]
    AllRepositoriesFailed(usize),
    #[error("Summarizer error: {0}")]
    Summarizer(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid ignore pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// Whether the error describes a single degraded unit of work rather than a broken run.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ReportError::NotARepository { .. }
                | ReportError::MalformedEntry(_)
                | ReportError::Discovery { .. }
        )
    }
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
