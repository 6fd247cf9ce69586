use crate::error::{ReportError, Result};
use crate::model::RepositoryRef;
use crate::sink::DiagnosticSink;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const REPOSITORY_MARKER: &str = ".git";

pub fn has_marker(path: &Path) -> bool {
    path.join(REPOSITORY_MARKER).exists()
}

/// Shallow scan of the configured roots.
///
/// A root that is itself a repository is taken as is. Any other root is
/// probed one level deep and never further. Unreadable roots are reported
/// and contribute nothing.
pub fn discover(roots: &[PathBuf], sink: &dyn DiagnosticSink) -> Vec<RepositoryRef> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut repositories = Vec::new();

    for root in roots {
        match discover_root(root) {
            Ok(found) => {
                if found.is_empty() {
                    sink.info(&format!("No repositories under {}", root.display()));
                }
                for repo in found {
                    let key = fs::canonicalize(&repo.path).unwrap_or_else(|_| repo.path.clone());
                    if seen.insert(key) {
                        sink.debug(&format!("Found repository {} ({})", repo.name, repo.path.display()));
                        repositories.push(repo);
                    }
                }
            }
            Err(e) => sink.warn(&e.to_string()),
        }
    }

    repositories
}

fn discover_root(root: &Path) -> Result<Vec<RepositoryRef>> {
    if has_marker(root) {
        return Ok(vec![RepositoryRef::from_path(root)]);
    }

    let entries = fs::read_dir(root).map_err(|source| ReportError::Discovery {
        path: root.to_path_buf(),
        source,
    })?;

    let mut children: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && has_marker(path))
        .collect();
    children.sort();

    Ok(children.into_iter().map(RepositoryRef::from_path).collect())
}
