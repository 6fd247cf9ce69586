//! Parser for the delimited `git log --name-status` stream.
//!
//! Every entry starts with a `COMMIT_START` line followed by the hash,
//! author name, author email, author date and subject, one per line. The
//! body follows until the `==END==` line; everything after it up to the
//! next entry is name-status output.

use crate::error::{ReportError, Result};
use crate::model::{ChangeKind, CommitHeader};
use crate::sink::DiagnosticSink;
use crate::window::DateWindow;

pub const COMMIT_START: &str = "COMMIT_START";
pub const COMMIT_END: &str = "==END==";
pub const PRETTY_FORMAT: &str = "--pretty=format:COMMIT_START%n%H%n%an%n%ae%n%aI%n%s%n%b%n==END==";

const HEADER_LINES: usize = 5;

/// One `<status>\t<path>` line. Renames and copies also carry the source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub status: String,
    pub path: String,
    pub previous_path: Option<String>,
}

/// A parsed entry still waiting for its numstat counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionalCommit {
    pub header: CommitHeader,
    pub body: String,
    pub entries: Vec<StatusEntry>,
}

pub fn log_args(window: &DateWindow, author: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "log".to_string(),
        window.since_arg(),
        window.until_arg(),
        "--no-merges".to_string(),
        PRETTY_FORMAT.to_string(),
        "--name-status".to_string(),
    ];
    if let Some(author) = author.filter(|a| !a.trim().is_empty()) {
        args.push(format!("--author={author}"));
    }
    args
}

/// Split a raw log blob into provisional commits, in emission order.
///
/// A malformed entry is reported on `sink` and skipped; it never costs the
/// rest of the batch.
pub fn parse_log(raw: &str, sink: &dyn DiagnosticSink) -> Vec<ProvisionalCommit> {
    let start = format!("{COMMIT_START}\n");
    let mut commits = Vec::new();

    for (index, fragment) in raw.split(start.as_str()).enumerate() {
        if fragment.trim().is_empty() {
            continue;
        }
        match parse_entry(fragment, sink) {
            Ok(commit) => commits.push(commit),
            Err(e) => sink.warn(&format!("Skipping log entry #{index}: {e}")),
        }
    }

    commits
}

fn parse_entry(fragment: &str, sink: &dyn DiagnosticSink) -> Result<ProvisionalCommit> {
    let lines: Vec<&str> = fragment
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    if lines.len() < HEADER_LINES {
        return Err(ReportError::MalformedEntry(format!(
            "expected {HEADER_LINES} header lines, found {}",
            lines.len()
        )));
    }

    let hash = lines[0].trim();
    if hash.is_empty() || hash.contains(char::is_whitespace) {
        return Err(ReportError::MalformedEntry(format!("invalid commit hash '{}'", lines[0])));
    }

    let rest = &lines[HEADER_LINES..];
    let end = rest.iter().position(|line| *line == COMMIT_END).ok_or_else(|| {
        ReportError::MalformedEntry(format!("commit {hash} has no {COMMIT_END} marker"))
    })?;

    let body = rest[..end].join("\n").trim().to_string();

    let mut entries = Vec::new();
    for line in rest[end + 1..].iter().filter(|l| !l.trim().is_empty()) {
        match parse_status_line(line) {
            Some(entry) => entries.push(entry),
            None => sink.warn(&format!("Ignoring malformed status line in {hash}: {line:?}")),
        }
    }

    Ok(ProvisionalCommit {
        header: CommitHeader {
            hash: hash.to_string(),
            author: lines[1].to_string(),
            email: lines[2].to_string(),
            date: lines[3].to_string(),
            subject: lines[4].to_string(),
        },
        body,
        entries,
    })
}

/// Parse `<status>\t<path>` or, for renames and copies, `<status>\t<old>\t<new>`.
pub fn parse_status_line(line: &str) -> Option<StatusEntry> {
    let (status, rest) = line.split_once('\t')?;
    let status = status.trim();
    if status.is_empty() || rest.is_empty() {
        return None;
    }

    if ChangeKind::has_two_paths(status) {
        if let Some((old, new)) = rest.split_once('\t') {
            return Some(StatusEntry {
                status: status.to_string(),
                path: new.to_string(),
                previous_path: Some(old.to_string()),
            });
        }
    }

    Some(StatusEntry {
        status: status.to_string(),
        path: rest.to_string(),
        previous_path: None,
    })
}
