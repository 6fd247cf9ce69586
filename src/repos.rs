use crate::cli::CommonArgs;
use crate::config::Config;
use crate::error::ReportError;
use crate::report::discover;
use crate::sink::LogSink;
use anyhow::Context;
use console::style;

pub fn exec(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(common.config.as_deref())
        .context("Failed to load config")?
        .merge_with_args(&common);

    let repositories = discover(&config.roots_or_current_dir(), &LogSink);
    if repositories.is_empty() {
        return Err(ReportError::NoRepositories.into());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&repositories)?);
        return Ok(());
    }

    println!("{:<30} {}", style("Name").bold(), style("Path").bold());
    for repo in &repositories {
        println!("{:<30} {}", repo.name, style(repo.path.display()).dim());
    }
    Ok(())
}
