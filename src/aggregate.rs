use crate::model::{Commit, HotFile, RepoStats};
use std::collections::{HashMap, HashSet};

pub const TOP_FILES: usize = 5;

/// Fold commits into totals, contributors and the five hottest files.
pub fn aggregate(commits: &[Commit]) -> RepoStats {
    aggregate_top(commits, TOP_FILES)
}

pub fn aggregate_top(commits: &[Commit], limit: usize) -> RepoStats {
    let mut stats = RepoStats {
        total_commits: commits.len() as u64,
        ..RepoStats::default()
    };

    for commit in commits {
        stats.total_files += commit.stats.total_files as u64;
        stats.total_additions += commit.stats.additions;
        stats.total_deletions += commit.stats.deletions;
    }

    stats.contributors = contributors(commits);
    stats.most_changed_files = most_changed_files(commits, limit);
    stats
}

/// Distinct author names in first-seen order. Identity is the name, not the email.
pub fn contributors(commits: &[Commit]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    commits
        .iter()
        .filter(|c| seen.insert(c.author.as_str()))
        .map(|c| c.author.clone())
        .collect()
}

/// Files ranked by cumulative additions + deletions; ties keep first-seen order.
pub fn most_changed_files(commits: &[Commit], limit: usize) -> Vec<HotFile> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<HotFile> = Vec::new();

    for file in commits.iter().flat_map(|c| &c.files) {
        match index.get(file.name.as_str()) {
            Some(&i) => totals[i].changes += file.changes(),
            None => {
                index.insert(file.name.as_str(), totals.len());
                totals.push(HotFile {
                    file: file.name.clone(),
                    changes: file.changes(),
                });
            }
        }
    }

    // stable: equal counts stay in first-seen order
    totals.sort_by(|a, b| b.changes.cmp(&a.changes));
    totals.truncate(limit);
    totals
}

/// Commits per author, most active first.
pub fn contributor_commit_counts(commits: &[Commit]) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for commit in commits {
        match index.get(commit.author.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(commit.author.as_str(), counts.len());
                counts.push((commit.author.clone(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
