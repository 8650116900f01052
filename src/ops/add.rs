//! stage working-tree files

use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::ignore::IgnoreRules;
use crate::index;
use crate::repo::Repo;
use crate::scan::{build_entries, tracked_paths};
use crate::util::clean_path;

/// stage the given paths, or every non-ignored file when none are given
///
/// directories are expanded recursively with ignore rules applied;
/// explicitly named files are staged as-is. returns the staged paths.
pub fn add(repo: &Repo, paths: &[String]) -> Result<Vec<String>> {
    let targets = if paths.is_empty() {
        tracked_paths(repo)?
    } else {
        expand(repo, paths)?
    };

    let entries = build_entries(repo, &targets)?;
    let staged: Vec<String> = entries.iter().map(|e| e.path.clone()).collect();
    index::save_merge(repo, entries)?;
    info!(files = staged.len(), "staged");
    Ok(staged)
}

fn expand(repo: &Repo, paths: &[String]) -> Result<Vec<String>> {
    let rules = IgnoreRules::load(repo)?;
    let mut out = Vec::new();
    for raw in paths {
        let rel = clean_path(Path::new(raw));
        let abs = repo.worktree_file(&rel);
        if repo.fs().is_dir(&abs) {
            collect_dir(repo, &rules, &abs, &mut out)?;
        } else if repo.fs().exists(&abs) {
            out.push(rel);
        } else {
            return Err(Error::PathNotFound(abs));
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

fn collect_dir(
    repo: &Repo,
    rules: &IgnoreRules,
    dir: &Path,
    out: &mut Vec<String>,
) -> Result<()> {
    for entry in repo.fs().read_dir(dir)? {
        if entry.is_dir {
            if entry.path == repo.path() {
                continue;
            }
            collect_dir(repo, rules, &entry.path, out)?;
        } else {
            let rel = entry
                .path
                .strip_prefix(repo.worktree())
                .unwrap_or(&entry.path);
            let rel = clean_path(rel);
            if !rules.matches(&rel) {
                out.push(rel);
            }
        }
    }
    Ok(())
}
