pub mod log;
pub mod numstat;
pub mod runner;

pub use log::{log_args, parse_log, ProvisionalCommit, StatusEntry};
pub use numstat::{join_stats, numstat_args, parse_numstat};
pub use runner::{probe_repository, GitCli, ProcessRunner};
