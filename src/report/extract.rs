use super::RunContext;
use crate::error::Result;
use crate::git::{join_stats, log_args, numstat_args, parse_log, parse_numstat, probe_repository, ProvisionalCommit};
use crate::model::{Commit, LineStats, RepositoryRef};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

type NumstatByHash = HashMap<String, HashMap<String, LineStats>>;

/// Commits of one repository, plus whether cancellation cut the fetch short.
#[derive(Debug, Default)]
pub struct Extraction {
    pub commits: Vec<Commit>,
    pub cancelled: bool,
    /// Why the repository contributed nothing, when it was skipped rather than failed.
    pub skipped: Option<String>,
}

/// Run the log query, parse it and attach per-file counts.
///
/// A path that is not a repository yields an empty extraction. A failing
/// log query is returned as an error. A failing per-commit stats query only
/// zeroes that commit's files.
pub fn extract_repository(ctx: &RunContext, repo: &RepositoryRef) -> Result<Extraction> {
    ctx.sink.info(&format!(
        "Collecting commits for {} ({}), {}",
        repo.name,
        repo.path.display(),
        ctx.window
    ));

    if let Err(e) = probe_repository(ctx.runner, &repo.path) {
        ctx.sink.warn(&e.to_string());
        return Ok(Extraction {
            skipped: Some(e.to_string()),
            ..Extraction::default()
        });
    }

    let args = log_args(&ctx.window, ctx.author_filter.as_deref());
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let raw = ctx.runner.run(&args, &repo.path)?;

    if raw.trim().is_empty() {
        ctx.sink.info(&format!("No commits in {} for {}", repo.name, ctx.window));
        return Ok(Extraction::default());
    }

    let mut provisional = parse_log(&raw, ctx.sink);
    let parsed = provisional.len();
    provisional.retain(|c| !is_ignored(&ctx.ignore, &c.header.subject));
    if provisional.len() < parsed {
        ctx.sink.debug(&format!(
            "Ignored {} commits in {} by subject pattern",
            parsed - provisional.len(),
            repo.name
        ));
    }

    let (mut numstats, cancelled) = fetch_numstats(ctx, &repo.path, &provisional);

    let total = provisional.len();
    let commits: Vec<Commit> = provisional
        .into_iter()
        .filter_map(|p| {
            let stats = numstats.remove(&p.header.hash)?;
            let files = join_stats(p.entries, &stats);
            Some(Commit::assemble(&repo.name, p.header, p.body, files))
        })
        .collect();

    if cancelled {
        ctx.sink.warn(&format!(
            "Cancelled while collecting {}: kept {} of {} commits",
            repo.name,
            commits.len(),
            total
        ));
    } else {
        ctx.sink.info(&format!("Collected {} commits from {}", commits.len(), repo.name));
    }

    Ok(Extraction {
        commits,
        cancelled,
        skipped: None,
    })
}

pub fn is_ignored(patterns: &[Regex], subject: &str) -> bool {
    patterns.iter().any(|p| p.is_match(subject))
}

/// Per-commit numstat queries on the bounded pool, keyed by hash.
///
/// Completion order is arbitrary, so callers must look results up by hash.
/// Commits not started before cancellation are absent from the map.
fn fetch_numstats(ctx: &RunContext, path: &Path, commits: &[ProvisionalCommit]) -> (NumstatByHash, bool) {
    let pb = ctx.progress.clone().unwrap_or_else(ProgressBar::hidden);
    let results: Vec<(String, HashMap<String, LineStats>)> = ctx.pool.install(|| {
        commits
            .par_iter()
            .progress_with(pb)
            .filter_map(|commit| {
                if ctx.cancel.is_cancelled() {
                    return None;
                }
                let hash = commit.header.hash.as_str();
                let stats = match ctx.runner.run(&numstat_args(hash), path) {
                    Ok(raw) => parse_numstat(&raw),
                    Err(e) => {
                        ctx.sink.warn(&format!(
                            "Stats query failed for {}: {e}; counting its files as zero",
                            hash.get(..7).unwrap_or(hash)
                        ));
                        HashMap::new()
                    }
                };
                Some((hash.to_string(), stats))
            })
            .collect()
    });

    let cancelled = results.len() < commits.len();
    (results.into_iter().collect(), cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::ReportError;
    use crate::git::runner::testing::{log_entry, ScriptedRunner};
    use crate::model::CommitStats;
    use crate::sink::{Level, MemorySink};
    use crate::window::DateWindow;
    use pretty_assertions::assert_eq;

    fn window() -> DateWindow {
        DateWindow::parse("2024-01-01", "2024-01-08").unwrap()
    }

    fn repo() -> RepositoryRef {
        RepositoryRef::from_path("/work/web")
    }

    fn context<'a>(runner: &'a ScriptedRunner, sink: &'a MemorySink) -> RunContext<'a> {
        RunContext::new(runner, sink, &Config::default(), window()).unwrap()
    }

    #[test]
    fn not_a_repository_yields_empty_extraction() {
        let runner = ScriptedRunner::new();
        let sink = MemorySink::new();
        let extraction = extract_repository(&context(&runner, &sink), &repo()).unwrap();

        assert!(extraction.commits.is_empty());
        assert!(extraction.skipped.is_some());
        assert_eq!(runner.count("log"), 0);
    }

    #[test]
    fn joins_numstat_onto_parsed_commits() {
        let path = repo().path;
        let log = format!(
            "{}{}",
            log_entry("c2", "Jane", "fix: null check", "", &["M\ta.ts", "A\tlogo.png"]),
            log_entry("c1", "Bob", "feat: login", "Adds login.", &["R090\told.ts\tnew.ts"]),
        );
        let runner = ScriptedRunner::new()
            .repo(&path)
            .log(&path, &log)
            .show(&path, "c2", "3\t1\ta.ts\n-\t-\tlogo.png\n")
            .show(&path, "c1", "5\t2\t{old.ts => new.ts}\n");
        let sink = MemorySink::new();

        let extraction = extract_repository(&context(&runner, &sink), &repo()).unwrap();
        let commits = extraction.commits;

        assert_eq!(commits.iter().map(|c| c.hash.as_str()).collect::<Vec<_>>(), vec!["c2", "c1"]);
        assert_eq!(commits[0].stats, CommitStats { total_files: 2, additions: 3, deletions: 1 });
        assert_eq!(commits[0].repo, "web");
        assert_eq!(commits[1].files[0].name, "new.ts");
        assert_eq!(commits[1].stats, CommitStats { total_files: 1, additions: 5, deletions: 2 });
        assert_eq!(commits[1].body, "Adds login.");
        assert_eq!(runner.count("show"), 2);
    }

    #[test]
    fn progress_advances_once_per_fetched_commit() {
        let path = repo().path;
        let log = format!(
            "{}{}",
            log_entry("c2", "Jane", "fix: b", "", &["M\ta.ts"]),
            log_entry("c1", "Jane", "fix: a", "", &["M\tb.ts"]),
        );
        let runner = ScriptedRunner::new()
            .repo(&path)
            .log(&path, &log)
            .show(&path, "c2", "1\t0\ta.ts\n")
            .show(&path, "c1", "1\t0\tb.ts\n");
        let sink = MemorySink::new();
        let pb = ProgressBar::hidden();
        let ctx = context(&runner, &sink).with_progress(pb.clone());

        let extraction = extract_repository(&ctx, &repo()).unwrap();

        assert_eq!(extraction.commits.len(), 2);
        assert_eq!(pb.position(), 2);
    }

    #[test]
    fn failed_stats_query_keeps_commit_with_zero_counts() {
        let path = repo().path;
        let log = log_entry("c1", "Jane", "fix: x", "", &["M\ta.ts"]);
        let runner = ScriptedRunner::new()
            .repo(&path)
            .log(&path, &log)
            .fail(&path, "show c1", 128);
        let sink = MemorySink::new();

        let commits = extract_repository(&context(&runner, &sink), &repo()).unwrap().commits;

        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].stats, CommitStats { total_files: 1, additions: 0, deletions: 0 });
        assert_eq!(commits[0].files[0].stats, None);
        assert_eq!(sink.messages_at(Level::Warn).len(), 1);
    }

    #[test]
    fn failed_log_query_propagates() {
        let path = repo().path;
        let runner = ScriptedRunner::new().repo(&path).fail(&path, "log", 128);
        let sink = MemorySink::new();

        let err = extract_repository(&context(&runner, &sink), &repo()).unwrap_err();
        assert!(matches!(err, ReportError::CommandFailed { exit_code: Some(128), .. }));
    }

    #[test]
    fn ignored_subjects_skip_stats_queries() {
        let path = repo().path;
        let log = format!(
            "{}{}",
            log_entry("c2", "Jane", "Revert \"feat: login\"", "", &["M\ta.ts"]),
            log_entry("c1", "Jane", "feat: login", "", &["M\ta.ts"]),
        );
        let runner = ScriptedRunner::new()
            .repo(&path)
            .log(&path, &log)
            .show(&path, "c1", "1\t1\ta.ts\n");
        let sink = MemorySink::new();

        let commits = extract_repository(&context(&runner, &sink), &repo()).unwrap().commits;
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].hash, "c1");
        assert_eq!(runner.count("show"), 1);
    }

    #[test]
    fn empty_log_output_is_not_an_error() {
        let path = repo().path;
        let runner = ScriptedRunner::new().repo(&path).log(&path, "");
        let sink = MemorySink::new();
        let extraction = extract_repository(&context(&runner, &sink), &repo()).unwrap();
        assert!(extraction.commits.is_empty());
        assert!(!extraction.cancelled);
    }

    #[test]
    fn cancellation_stops_stats_queries() {
        let path = repo().path;
        let log = log_entry("c1", "Jane", "fix", "", &["M\ta.ts"]);
        let runner = ScriptedRunner::new()
            .repo(&path)
            .log(&path, &log)
            .show(&path, "c1", "1\t0\ta.ts\n");
        let sink = MemorySink::new();
        let ctx = context(&runner, &sink);
        ctx.cancel.cancel();

        let extraction = extract_repository(&ctx, &repo()).unwrap();
        assert!(extraction.cancelled);
        assert!(extraction.commits.is_empty());
        assert_eq!(runner.count("show"), 0);
    }

    #[test]
    fn results_reattach_by_hash_under_parallel_fetch() {
        let path = repo().path;
        let hashes: Vec<String> = (0..40).map(|i| format!("h{i:02}")).collect();
        let log: String = hashes
            .iter()
            .map(|h| log_entry(h, "Jane", "work", "", &[format!("M\t{h}.rs").as_str()]))
            .collect();
        let mut runner = ScriptedRunner::new().repo(&path).log(&path, &log);
        for (i, h) in hashes.iter().enumerate() {
            runner = runner.show(&path, h, &format!("{i}\t0\t{h}.rs\n"));
        }
        let sink = MemorySink::new();
        let config = Config { jobs: 8, ..Config::default() };
        let ctx = RunContext::new(&runner, &sink, &config, window()).unwrap();

        let commits = extract_repository(&ctx, &repo()).unwrap().commits;

        assert_eq!(commits.len(), 40);
        for (i, commit) in commits.iter().enumerate() {
            assert_eq!(commit.hash, hashes[i]);
            assert_eq!(commit.stats.additions, i as u64);
        }
    }
}
