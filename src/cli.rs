use crate::window::ReportKind;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gitweek")]
#[command(about = "Commit history and statistics across git repositories for work reports")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct CommonArgs {
    #[arg(
        long = "root",
        value_name = "DIR",
        help = "Repository, or directory whose immediate children are repositories (repeatable)"
    )]
    pub roots: Vec<PathBuf>,

    #[arg(long, help = "Path to JSON config file (default: ./report_config.json)")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, help = "Report period used to derive the date window")]
    pub kind: Option<ReportKind>,

    #[arg(long, help = "Start date, inclusive (YYYY-MM-DD)")]
    pub since: Option<String>,

    #[arg(long, help = "End date, exclusive (YYYY-MM-DD)")]
    pub until: Option<String>,

    #[arg(long, help = "Concurrent per-commit stats queries")]
    pub jobs: Option<usize>,

    #[arg(long, help = "Only include commits whose author matches this pattern")]
    pub author: Option<String>,

    #[arg(long, help = "Keep commits whose subject matches the ignore patterns")]
    pub no_ignore: bool,

    #[arg(short, long, help = "Show progress messages")]
    pub verbose: bool,

    #[arg(long, help = "Show debug output, including every git invocation")]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the repositories found under the roots
    Repos {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Collect commits and print statistics
    Stats {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON, one commit per line")]
        ndjson: bool,
    },
    /// Collect commits and render a markdown report
    Report {
        #[arg(long, short, help = "Write the report to this file")]
        output: Option<PathBuf>,

        #[arg(long, help = "Save under reports/<kind>-<date>.md")]
        save: bool,

        #[arg(long, help = "Leave out the per-commit listing")]
        no_commits: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        crate::logging::init_logging(self.common.verbose, self.common.debug)?;

        match self.command {
            Commands::Repos { json } => crate::repos::exec(self.common, json),
            Commands::Stats { json, ndjson } => crate::stats::exec(self.common, json, ndjson),
            Commands::Report { output, save, no_commits } => {
                crate::summary::exec(self.common, output, save, no_commits)
            }
        }
    }
}
