use crate::aggregate::contributor_commit_counts;
use crate::cli::CommonArgs;
use crate::error::{ReportError, Result};
use crate::model::{Commit, FileChange, RepoStats, Report};
use crate::stats::collect_report;
use crate::window::ReportKind;
use anyhow::Context;
use chrono::Local;
use console::style;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::PathBuf;

pub const REPORTS_DIR: &str = "reports";

/// Turns collected commits and stats into report text.
///
/// Implementations may call remote services; failures surface as
/// `ReportError::Summarizer` and are not retried.
pub trait Summarizer {
    fn summarize(&self, report: &Report, kind: ReportKind) -> Result<String>;
}

/// Deterministic markdown report: statistics plus a per-commit listing.
#[derive(Debug, Clone)]
pub struct MarkdownSummarizer {
    pub include_commits: bool,
}

impl Default for MarkdownSummarizer {
    fn default() -> Self {
        Self { include_commits: true }
    }
}

impl Summarizer for MarkdownSummarizer {
    fn summarize(&self, report: &Report, kind: ReportKind) -> Result<String> {
        render(report, kind, self.include_commits)
            .map_err(|e| ReportError::Summarizer(format!("Failed to render markdown: {e}")))
    }
}

fn render(report: &Report, kind: ReportKind, include_commits: bool) -> std::result::Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# {} ({})", kind.title(), report.window)?;
    writeln!(out)?;
    if report.cancelled {
        writeln!(out, "> Collection was cancelled; the figures below are partial.")?;
        writeln!(out)?;
    }

    write_stats(&mut out, &report.stats)?;

    let authors = contributor_commit_counts(&report.commits);
    if !authors.is_empty() {
        writeln!(out)?;
        writeln!(out, "### Commits per contributor")?;
        writeln!(out)?;
        for (author, count) in authors {
            writeln!(out, "- {author}: {count}")?;
        }
    }

    if report.repositories.len() > 1 || report.repositories.iter().any(|r| r.error.is_some()) {
        writeln!(out)?;
        writeln!(out, "## Repositories")?;
        writeln!(out)?;
        for repo in &report.repositories {
            match &repo.error {
                Some(err) => writeln!(out, "- {}: no commits ({err})", repo.repository.name)?,
                None => writeln!(
                    out,
                    "- {}: {} commits, +{} / -{}",
                    repo.repository.name,
                    repo.commit_count,
                    repo.stats.total_additions,
                    repo.stats.total_deletions
                )?,
            }
        }
    }

    if include_commits && !report.commits.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Commits")?;
        for commit in &report.commits {
            writeln!(out)?;
            write_commit(&mut out, commit)?;
        }
    }

    Ok(out)
}

fn write_stats(out: &mut String, stats: &RepoStats) -> fmt::Result {
    writeln!(out, "## Statistics")?;
    writeln!(out)?;
    writeln!(out, "- Commits: {}", stats.total_commits)?;
    writeln!(out, "- Files changed: {}", stats.total_files)?;
    writeln!(
        out,
        "- Lines: +{} / -{} (net {})",
        stats.total_additions,
        stats.total_deletions,
        stats.net_change()
    )?;
    if stats.contributors.is_empty() {
        writeln!(out, "- Contributors: none")?;
    } else {
        writeln!(out, "- Contributors: {}", stats.contributors.join(", "))?;
    }

    if !stats.most_changed_files.is_empty() {
        writeln!(out)?;
        writeln!(out, "### Most changed files")?;
        writeln!(out)?;
        for (i, hot) in stats.most_changed_files.iter().enumerate() {
            writeln!(out, "{}. `{}`: {} lines", i + 1, hot.file, hot.changes)?;
        }
    }
    Ok(())
}

fn write_commit(out: &mut String, commit: &Commit) -> fmt::Result {
    writeln!(out, "### [{}] {}", commit.short_hash(), commit.subject)?;
    writeln!(out)?;
    writeln!(out, "- Repository: {}", commit.repo)?;
    writeln!(out, "- Author: {} <{}>", commit.author, commit.email)?;
    writeln!(out, "- Date: {}", commit.date)?;
    if !commit.body.is_empty() {
        writeln!(out, "- Details: {}", commit.body.replace('\n', " "))?;
    }
    for file in &commit.files {
        write_file(out, file)?;
    }
    Ok(())
}

fn write_file(out: &mut String, file: &FileChange) -> fmt::Result {
    let stats = file.stats.unwrap_or_default();
    match &file.previous_name {
        Some(previous) => writeln!(
            out,
            "  - {} `{}` (from `{}`): +{}/-{}",
            file.kind(),
            file.name,
            previous,
            stats.additions,
            stats.deletions
        ),
        None => writeln!(
            out,
            "  - {} `{}`: +{}/-{}",
            file.kind(),
            file.name,
            stats.additions,
            stats.deletions
        ),
    }
}

pub fn exec(common: CommonArgs, output: Option<PathBuf>, save: bool, no_commits: bool) -> anyhow::Result<()> {
    let (report, kind) = collect_report(&common, true)?;

    let summarizer = MarkdownSummarizer { include_commits: !no_commits };
    let content = summarizer
        .summarize(&report, kind)
        .context("Failed to generate report")?;

    let target = match (output, save) {
        (Some(path), _) => Some(path),
        (None, true) => Some(PathBuf::from(REPORTS_DIR).join(kind.file_name(Local::now().date_naive()))),
        (None, false) => None,
    };

    match target {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, &content).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} {}", style("Report written to").green(), path.display());
        }
        None => print!("{content}"),
    }

    Ok(())
}
