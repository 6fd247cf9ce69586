use crate::util::display_name;
use crate::window::DateWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStats {
    pub additions: u64,
    pub deletions: u64,
}

impl LineStats {
    pub fn new(additions: u64, deletions: u64) -> Self {
        Self { additions, deletions }
    }

    pub fn changes(&self) -> u64 {
        self.additions + self.deletions
    }
}

/// Change kind decoded from a name-status code such as `M`, `R086` or `C100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    TypeChanged,
    Renamed { similarity: Option<u8> },
    Copied { similarity: Option<u8> },
    Other(String),
}

impl ChangeKind {
    pub fn from_code(code: &str) -> Self {
        let mut chars = code.chars();
        let similarity = || code.get(1..).and_then(|s| s.parse::<u8>().ok());
        match chars.next() {
            Some('A') => ChangeKind::Added,
            Some('M') => ChangeKind::Modified,
            Some('D') => ChangeKind::Deleted,
            Some('T') => ChangeKind::TypeChanged,
            Some('R') => ChangeKind::Renamed { similarity: similarity() },
            Some('C') => ChangeKind::Copied { similarity: similarity() },
            _ => ChangeKind::Other(code.to_string()),
        }
    }

    /// Rename and copy lines carry a source and a destination path.
    pub fn has_two_paths(code: &str) -> bool {
        matches!(code.chars().next(), Some('R') | Some('C'))
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Deleted => write!(f, "deleted"),
            ChangeKind::TypeChanged => write!(f, "type changed"),
            ChangeKind::Renamed { .. } => write!(f, "renamed"),
            ChangeKind::Copied { .. } => write!(f, "copied"),
            ChangeKind::Other(code) => write!(f, "{code}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    /// Current path of the file. For renames and copies this is the destination.
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_name: Option<String>,
    pub stats: Option<LineStats>,
}

impl FileChange {
    pub fn kind(&self) -> ChangeKind {
        ChangeKind::from_code(&self.status)
    }

    pub fn changes(&self) -> u64 {
        self.stats.map(|s| s.changes()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStats {
    pub total_files: usize,
    pub additions: u64,
    pub deletions: u64,
}

/// Positional header fields of one log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitHeader {
    pub hash: String,
    pub author: String,
    pub email: String,
    pub date: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub repo: String,
    pub hash: String,
    pub author: String,
    pub email: String,
    pub date: String,
    pub subject: String,
    pub body: String,
    pub files: Vec<FileChange>,
    pub stats: CommitStats,
}

impl Commit {
    /// Build a commit from its parsed header and joined files.
    ///
    /// `stats` is always derived from `files`; no upstream total is trusted.
    pub fn assemble(repo: &str, header: CommitHeader, body: String, files: Vec<FileChange>) -> Self {
        let (additions, deletions) = files
            .iter()
            .filter_map(|f| f.stats)
            .fold((0u64, 0u64), |(a, d), s| (a + s.additions, d + s.deletions));

        let stats = CommitStats {
            total_files: files.len(),
            additions,
            deletions,
        };

        Self {
            repo: repo.to_string(),
            hash: header.hash,
            author: header.author,
            email: header.email,
            date: header.date,
            subject: header.subject,
            body,
            files,
            stats,
        }
    }

    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotFile {
    pub file: String,
    pub changes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStats {
    pub total_commits: u64,
    pub total_files: u64,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub contributors: Vec<String>,
    pub most_changed_files: Vec<HotFile>,
}

impl RepoStats {
    pub fn net_change(&self) -> i64 {
        self.total_additions as i64 - self.total_deletions as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub path: PathBuf,
    pub name: String,
}

impl RepositoryRef {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = display_name(&path);
        Self { path, name }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoReport {
    pub repository: RepositoryRef,
    pub commit_count: usize,
    pub stats: RepoStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub window: DateWindow,
    pub repositories: Vec<RepoReport>,
    pub commits: Vec<Commit>,
    pub stats: RepoStats,
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header(hash: &str) -> CommitHeader {
        CommitHeader {
            hash: hash.to_string(),
            author: "Jane".to_string(),
            email: "j@x.com".to_string(),
            date: "2024-01-05".to_string(),
            subject: "fix: null check".to_string(),
        }
    }

    fn file(name: &str, stats: Option<(u64, u64)>) -> FileChange {
        FileChange {
            name: name.to_string(),
            status: "M".to_string(),
            previous_name: None,
            stats: stats.map(|(a, d)| LineStats::new(a, d)),
        }
    }

    #[test]
    fn assemble_recomputes_totals_from_files() {
        let commit = Commit::assemble(
            "web",
            header("abc123"),
            String::new(),
            vec![file("a.ts", Some((3, 1))), file("b.png", None), file("c.ts", Some((0, 7)))],
        );

        assert_eq!(
            commit.stats,
            CommitStats { total_files: 3, additions: 3, deletions: 8 }
        );
        assert_eq!(commit.repo, "web");
        assert_eq!(commit.body, "");
    }

    #[test]
    fn single_file_commit_scenario() {
        let commit = Commit::assemble("r", header("abc123"), String::new(), vec![file("a.ts", Some((3, 1)))]);
        assert_eq!(commit.stats, CommitStats { total_files: 1, additions: 3, deletions: 1 });
        assert_eq!(commit.files[0].changes(), 4);
    }

    #[test]
    fn short_hash_handles_short_ids() {
        let commit = Commit::assemble("r", header("abc"), String::new(), Vec::new());
        assert_eq!(commit.short_hash(), "abc");
        let commit = Commit::assemble("r", header("0123456789abcdef"), String::new(), Vec::new());
        assert_eq!(commit.short_hash(), "0123456");
    }

    #[test]
    fn change_kind_decodes_similarity() {
        assert_eq!(ChangeKind::from_code("R086"), ChangeKind::Renamed { similarity: Some(86) });
        assert_eq!(ChangeKind::from_code("C100"), ChangeKind::Copied { similarity: Some(100) });
        assert_eq!(ChangeKind::from_code("M"), ChangeKind::Modified);
        assert_eq!(ChangeKind::from_code("X"), ChangeKind::Other("X".to_string()));
        assert!(ChangeKind::has_two_paths("R100"));
        assert!(!ChangeKind::has_two_paths("A"));
    }

    #[test]
    fn commit_serializes_with_camel_case_stats() {
        let commit = Commit::assemble("r", header("abc123"), String::new(), vec![file("a.ts", Some((3, 1)))]);
        let value = serde_json::to_value(&commit).unwrap();
        assert_eq!(value["stats"]["totalFiles"], 1);
        assert_eq!(value["files"][0]["stats"]["additions"], 3);
        assert!(value["files"][0].get("previousName").is_none());
    }

    #[test]
    fn net_change_can_be_negative() {
        let stats = RepoStats { total_additions: 2, total_deletions: 9, ..RepoStats::default() };
        assert_eq!(stats.net_change(), -7);
    }
}
