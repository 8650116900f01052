//! working-tree scan and entry building

use std::collections::BTreeSet;
use std::path::Path;

use rayon::prelude::*;
use tracing::debug;

use crate::chunker::split_reader;
use crate::error::{IoResultExt, Result};
use crate::ignore::IgnoreRules;
use crate::index;
use crate::repo::Repo;
use crate::types::{Entry, Fileset};
use crate::util::clean_path;

/// the three disjoint groups a scan classifies files into
pub struct ScanResult {
    pub tracked: Fileset,
    pub staged: Fileset,
    pub ignored: Fileset,
}

/// split one working-tree file into an entry
///
/// `rel` may be any spelling of the path; the stored form is cleaned and
/// forward-slash.
pub fn build_entry(repo: &Repo, rel: &Path) -> Result<Entry> {
    let cleaned = clean_path(rel);
    let abs = repo.worktree_file(&cleaned);
    let mut handle = repo.fs().open(&abs)?;
    let blocks = split_reader(&mut handle).with_path(&abs)?;
    Ok(Entry::new(cleaned, blocks))
}

/// build entries for many paths on the worker pool, collected by path
pub fn build_entries(repo: &Repo, paths: &[String]) -> Result<Vec<Entry>> {
    let mut entries = paths
        .par_iter()
        .map(|p| build_entry(repo, Path::new(p)))
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// walk the working tree and classify every file
///
/// precedence: ignored beats staged beats tracked; each file lands in
/// exactly one group. the repository directory itself is never walked.
pub fn scan(repo: &Repo) -> Result<ScanResult> {
    let rules = IgnoreRules::load(repo)?;
    let staged: BTreeSet<String> = index::staged_paths(repo)?.into_iter().collect();
    let rel_paths = worktree_files(repo)?;

    let mut tracked_paths = Vec::new();
    let mut staged_paths = Vec::new();
    let mut ignored_paths = Vec::new();
    for rel in rel_paths {
        if rules.matches(&rel) {
            ignored_paths.push(rel);
        } else if staged.contains(&rel) {
            staged_paths.push(rel);
        } else {
            tracked_paths.push(rel);
        }
    }
    debug!(
        tracked = tracked_paths.len(),
        staged = staged_paths.len(),
        ignored = ignored_paths.len(),
        "scanned working tree"
    );

    Ok(ScanResult {
        tracked: Fileset::from_entries(build_entries(repo, &tracked_paths)?),
        staged: Fileset::from_entries(build_entries(repo, &staged_paths)?),
        ignored: Fileset::from_entries(build_entries(repo, &ignored_paths)?),
    })
}

/// all tracked (non-ignored) file paths, for `add` with no arguments
pub fn tracked_paths(repo: &Repo) -> Result<Vec<String>> {
    let rules = IgnoreRules::load(repo)?;
    let rel_paths = worktree_files(repo)?;
    Ok(rel_paths.into_iter().filter(|p| !rules.matches(p)).collect())
}

/// every file under the working tree, repo-relative, repo dir excluded
pub(crate) fn worktree_files(repo: &Repo) -> Result<Vec<String>> {
    let mut rel_paths = Vec::new();
    collect_files(repo, repo.worktree(), &mut rel_paths)?;
    Ok(rel_paths)
}

fn collect_files(repo: &Repo, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in repo.fs().read_dir(dir)? {
        if entry.is_dir {
            // the repository directory is internal, never scanned
            if entry.path == repo.path() {
                continue;
            }
            collect_files(repo, &entry.path, out)?;
        } else {
            let rel = entry
                .path
                .strip_prefix(repo.worktree())
                .unwrap_or(&entry.path);
            out.push(clean_path(rel));
        }
    }
    Ok(())
}
