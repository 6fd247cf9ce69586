use crate::git::log::StatusEntry;
use crate::model::{FileChange, LineStats};
use std::collections::HashMap;

pub fn numstat_args(hash: &str) -> [&str; 4] {
    ["show", "--numstat", "--format=", hash]
}

/// Parse `<additions>\t<deletions>\t<path>` lines keyed by current path.
///
/// Binary files report `-` for both counts and are kept with zero stats.
pub fn parse_numstat(raw: &str) -> HashMap<String, LineStats> {
    let mut stats: HashMap<String, LineStats> = HashMap::new();

    for line in raw.lines().filter(|l| !l.trim().is_empty()) {
        let mut parts = line.splitn(3, '\t');
        let (Some(additions), Some(deletions), Some(path)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };

        let entry = stats.entry(destination_path(path)).or_default();
        entry.additions += additions.trim().parse::<u64>().unwrap_or(0);
        entry.deletions += deletions.trim().parse::<u64>().unwrap_or(0);
    }

    stats
}

/// Resolve numstat's rename notation to the destination path.
///
/// `old => new` becomes `new`; `src/{a => b}/lib.rs` becomes `src/b/lib.rs`.
pub fn destination_path(path: &str) -> String {
    if let (Some(open), Some(close)) = (path.find('{'), path.rfind('}')) {
        if open < close {
            let inner = &path[open + 1..close];
            if let Some((_, new)) = inner.split_once(" => ") {
                let joined = format!("{}{}{}", &path[..open], new, &path[close + 1..]);
                return joined.replace("//", "/").trim_start_matches('/').to_string();
            }
        }
    }

    match path.split_once(" => ") {
        Some((_, new)) => new.to_string(),
        None => path.to_string(),
    }
}

/// Attach numstat counts to name-status entries by exact current path.
pub fn join_stats(entries: Vec<StatusEntry>, stats: &HashMap<String, LineStats>) -> Vec<FileChange> {
    entries
        .into_iter()
        .map(|entry| {
            let stats = stats.get(&entry.path).copied();
            FileChange {
                name: entry.path,
                status: entry.status,
                previous_name: entry.previous_path,
                stats,
            }
        })
        .collect()
}
