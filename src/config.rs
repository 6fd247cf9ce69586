use crate::cli::CommonArgs;
use crate::error::{ReportError, Result};
use crate::window::{parse_date, DateWindow, ReportKind};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "report_config.json";
pub const DEFAULT_JOBS: usize = 4;

pub fn default_ignore_patterns() -> Vec<String> {
    ["^Merge", "^Revert", r"^feat\(deps\)", r"^chore\(deps\)"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// Settings for one run. Built once, then only read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub roots: Vec<PathBuf>,
    #[serde(alias = "ignorePatterns")]
    pub ignore_patterns: Vec<String>,
    #[serde(alias = "authorFilter", alias = "authorEmail", alias = "author_email")]
    pub author_filter: Option<String>,
    pub jobs: usize,
    #[serde(alias = "reportKind", alias = "reportType")]
    pub report_kind: ReportKind,
    pub since: Option<String>,
    pub until: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            ignore_patterns: default_ignore_patterns(),
            author_filter: None,
            jobs: DEFAULT_JOBS,
            report_kind: ReportKind::default(),
            since: None,
            until: None,
        }
    }
}

impl Config {
    /// Load `path`, or `report_config.json` in the working directory when no
    /// path is given. A missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| {
            ReportError::Config(format!("Cannot read {}: {e}", config_path.display()))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        log::debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Command-line values win over file values.
    pub fn merge_with_args(mut self, args: &CommonArgs) -> Self {
        if !args.roots.is_empty() {
            self.roots = args.roots.clone();
        }
        if let Some(kind) = args.kind {
            self.report_kind = kind;
        }
        if let Some(jobs) = args.jobs {
            self.jobs = jobs;
        }
        if args.author.is_some() {
            self.author_filter = args.author.clone();
        }
        if args.since.is_some() {
            self.since = args.since.clone();
        }
        if args.until.is_some() {
            self.until = args.until.clone();
        }
        if args.no_ignore {
            self.ignore_patterns.clear();
        }
        self
    }

    /// Explicit `since`/`until` override the matching bound of the kind's window.
    pub fn resolve_window(&self, today: NaiveDate) -> Result<DateWindow> {
        let base = self.report_kind.window(today);
        let from = match &self.since {
            Some(s) => parse_date(s)?,
            None => base.from,
        };
        let to = match &self.until {
            Some(u) => parse_date(u)?,
            None => base.to,
        };
        DateWindow::new(from, to)
    }

    pub fn roots_or_current_dir(&self) -> Vec<PathBuf> {
        if self.roots.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.roots.clone()
        }
    }

    pub fn compile_ignore_patterns(&self) -> Result<Vec<Regex>> {
        self.ignore_patterns
            .iter()
            .map(|p| Regex::new(p).map_err(ReportError::from))
            .collect()
    }
}
