//! Multi-repository run: discover, extract each repository, merge.

pub mod discover;
pub mod extract;

pub use discover::{discover, has_marker, REPOSITORY_MARKER};
pub use extract::{extract_repository, is_ignored, Extraction};

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::error::{ReportError, Result};
use crate::git::ProcessRunner;
use crate::model::{RepoReport, RepoStats, Report, SCHEMA_VERSION};
use crate::sink::DiagnosticSink;
use crate::window::DateWindow;
use chrono::Utc;
use indicatif::ProgressBar;
use regex::Regex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag, checked between repositories and before each stats query.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything one run needs; nothing in it outlives the run.
pub struct RunContext<'a> {
    pub runner: &'a dyn ProcessRunner,
    pub sink: &'a dyn DiagnosticSink,
    pub window: DateWindow,
    pub author_filter: Option<String>,
    pub ignore: Vec<Regex>,
    pub cancel: CancelToken,
    pub progress: Option<ProgressBar>,
    pool: rayon::ThreadPool,
}

impl<'a> RunContext<'a> {
    pub fn new(
        runner: &'a dyn ProcessRunner,
        sink: &'a dyn DiagnosticSink,
        config: &Config,
        window: DateWindow,
    ) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs.max(1))
            .thread_name(|i| format!("gitweek-numstat-{i}"))
            .build()?;

        Ok(Self {
            runner,
            sink,
            window,
            author_filter: config.author_filter.clone(),
            ignore: config.compile_ignore_patterns()?,
            cancel: CancelToken::new(),
            progress: None,
            pool,
        })
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn jobs(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// Discover repositories under `roots`, extract each one in discovery order
/// and recompute combined stats over every collected commit.
///
/// A repository that fails is logged and counts as zero commits. The run
/// itself fails only when nothing was discovered or every repository failed.
pub fn run(ctx: &RunContext, roots: &[PathBuf]) -> Result<Report> {
    let repositories = discover(roots, ctx.sink);
    if repositories.is_empty() {
        return Err(ReportError::NoRepositories);
    }
    ctx.sink.info(&format!(
        "Found {} repositories, collecting {} with {} workers",
        repositories.len(),
        ctx.window,
        ctx.jobs()
    ));

    let mut reports = Vec::with_capacity(repositories.len());
    let mut commits = Vec::new();
    let mut cancelled = false;
    let mut failures = 0usize;

    for repository in repositories {
        if ctx.cancel.is_cancelled() {
            ctx.sink.warn(&format!("Run cancelled before {}", repository.name));
            cancelled = true;
            break;
        }
        if let Some(pb) = &ctx.progress {
            pb.set_message(format!("Collecting {}", repository.name));
        }

        match extract_repository(ctx, &repository) {
            Ok(extraction) => {
                cancelled |= extraction.cancelled;
                let stats = aggregate(&extraction.commits);
                ctx.sink.debug(&format!(
                    "{}: {} commits, {} files, +{} -{}, contributors: {}",
                    repository.name,
                    stats.total_commits,
                    stats.total_files,
                    stats.total_additions,
                    stats.total_deletions,
                    stats.contributors.join(", ")
                ));
                reports.push(RepoReport {
                    repository,
                    commit_count: extraction.commits.len(),
                    stats,
                    error: extraction.skipped,
                });
                commits.extend(extraction.commits);
            }
            Err(e) => {
                failures += 1;
                if e.is_local() {
                    ctx.sink.warn(&format!("Skipping {}: {e}", repository.name));
                } else {
                    ctx.sink.error(&format!("Failed to process {}: {e}", repository.name));
                }
                reports.push(RepoReport {
                    repository,
                    commit_count: 0,
                    stats: RepoStats::default(),
                    error: Some(e.to_string()),
                });
            }
        }
    }

    if !reports.is_empty() && failures == reports.len() {
        return Err(ReportError::AllRepositoriesFailed(failures));
    }

    let stats = aggregate(&commits);
    ctx.sink.info(&format!(
        "Collected {} commits from {} repositories",
        stats.total_commits,
        reports.len()
    ));

    Ok(Report {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        window: ctx.window,
        repositories: reports,
        commits,
        stats,
        cancelled,
    })
}
