use crate::cli::CommonArgs;
use crate::config::Config;
use crate::git::GitCli;
use crate::model::{Commit, Report};
use crate::report::{self, RunContext};
use crate::sink::LogSink;
use crate::window::ReportKind;
use anyhow::Context;
use chrono::Local;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

pub fn exec(common: CommonArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    // Keep stderr quiet when the output is meant for another program
    let (report, _) = collect_report(&common, !json && !ndjson)?;

    if json {
        output_json(&report)?;
    } else if ndjson {
        output_ndjson(&report.commits)?;
    } else {
        output_table(&report)?;
    }

    Ok(())
}

/// Load config, resolve the window and run the collection with a spinner.
pub fn collect_report(common: &CommonArgs, show_progress: bool) -> anyhow::Result<(Report, ReportKind)> {
    let config = Config::load(common.config.as_deref())
        .context("Failed to load config")?
        .merge_with_args(common);

    let window = config
        .resolve_window(Local::now().date_naive())
        .context("Failed to resolve date range")?;

    let runner = GitCli::new();
    let sink = LogSink;

    let pb = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} ({pos} commits)")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Discovering repositories...");
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    } else {
        ProgressBar::hidden()
    };

    let ctx = RunContext::new(&runner, &sink, &config, window)
        .context("Failed to prepare collection")?
        .with_progress(pb.clone());

    let started = Instant::now();
    let report = report::run(&ctx, &config.roots_or_current_dir())
        .context("Failed to collect commits")?;

    let elapsed = Duration::from_millis(started.elapsed().as_millis() as u64);
    pb.finish_with_message(format!(
        "Collected {} commits in {}",
        report.stats.total_commits,
        humantime::format_duration(elapsed)
    ));

    Ok((report, config.report_kind))
}

fn output_json(report: &Report) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn output_ndjson(commits: &[Commit]) -> anyhow::Result<()> {
    for commit in commits {
        println!("{}", serde_json::to_string(commit)?);
    }
    Ok(())
}

fn output_table(report: &Report) -> anyhow::Result<()> {
    let stats = &report.stats;

    println!("{} {}", style("Commit Summary").bold(), style(report.window).dim());
    println!("{}", "─".repeat(60));
    println!("Total commits: {}", style(stats.total_commits).cyan());
    println!("Total files changed: {}", style(stats.total_files).cyan());
    println!("Total lines added: {}", style(stats.total_additions).green());
    println!("Total lines deleted: {}", style(stats.total_deletions).red());
    println!("Contributors: {}", style(stats.contributors.join(", ")).yellow());
    if report.cancelled {
        println!("{}", style("Collection was cancelled; figures are partial").red());
    }

    if !stats.most_changed_files.is_empty() {
        println!("\n{}", style("Most Changed Files").bold());
        println!("{:<50} {:>8}", style("Path").bold(), style("Changes").bold());
        for hot in &stats.most_changed_files {
            println!("{:<50} {:>8}", hot.file, hot.changes);
        }
    }

    println!("\n{}", style("Repositories").bold());
    println!(
        "{:<30} {:>8} {:>8} {:>8}",
        style("Name").bold(),
        style("Commits").bold(),
        style("Added").bold(),
        style("Deleted").bold()
    );
    for repo in &report.repositories {
        match &repo.error {
            Some(err) => println!("{:<30} {}", repo.repository.name, style(err).red()),
            None => println!(
                "{:<30} {:>8} {:>8} {:>8}",
                repo.repository.name,
                repo.commit_count,
                repo.stats.total_additions,
                repo.stats.total_deletions
            ),
        }
    }

    println!("\nUse --json or --ndjson flags to export the raw data.");
    Ok(())
}
