//! three-way merge of another branch into the current one

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::history::merge_base;
use crate::object::{read_commit, read_fileset, save_fileset, write_commit};
use crate::refs::{head_branch, read_tip, write_tip};
use crate::repo::Repo;
use crate::restore::restore_clean;
use crate::types::{Commit, Entry, Fileset};

/// what a completed merge produced
#[derive(Debug)]
pub struct MergeOutcome {
    pub commit: Commit,
    /// paths merged by keeping ours; theirs is preserved next to each
    /// under a `.MERGE_THEIRS` suffix
    pub conflicts: Vec<String>,
}

/// merge branch `them` into the current branch
///
/// per path: identical on both sides keeps it; a side that left the base
/// untouched takes the other side's version, deletions included; anything
/// else is a conflict resolved by keeping ours and writing theirs to
/// `<path>.MERGE_THEIRS`. the branch tip only moves once every object of
/// the merge is on disk.
pub fn merge(repo: &Repo, them: &str) -> Result<MergeOutcome> {
    let us = head_branch(repo)?;
    if them == us {
        return Err(Error::MergeIntoSelf(us));
    }

    let their_tip = read_tip(repo, them)?;
    if their_tip.is_empty() {
        return Err(Error::EmptyBranch(them.to_string()));
    }
    let our_tip = read_tip(repo, &us)?;
    if our_tip.is_empty() {
        return Err(Error::EmptyBranch(us));
    }

    let base_id = merge_base(repo, &our_tip, &their_tip)?.ok_or_else(|| Error::NoMergeBase {
        us: us.clone(),
        them: them.to_string(),
    })?;

    let ours = read_fileset(repo, &read_commit(repo, &our_tip)?.fileset_id)?;
    let theirs = read_fileset(repo, &read_commit(repo, &their_tip)?.fileset_id)?;
    let base = read_fileset(repo, &read_commit(repo, &base_id)?.fileset_id)?;

    let (merged, conflicts) = combine(&base, &ours, &theirs);
    if !conflicts.is_empty() {
        warn!(count = conflicts.len(), "merge completed with conflicts");
    }

    // every block in the merged set is already stored: all entries come
    // from filesets of existing commits
    let fileset = Fileset::from_entries(merged);
    save_fileset(repo, &fileset)?;

    let message = format!("Merge branch '{}' into '{}'", them, us);
    let commit = Commit::new(vec![our_tip, their_tip], &us, message, fileset.id.clone());
    write_commit(repo, &commit)?;
    write_tip(repo, &us, &commit.id)?;
    restore_clean(repo, &fileset)?;

    info!(id = %commit.short_id(), from = them, into = %us, "merged");
    Ok(MergeOutcome { commit, conflicts })
}

/// the per-path three-way combine, pure over the three filesets
fn combine(base: &Fileset, ours: &Fileset, theirs: &Fileset) -> (Vec<Entry>, Vec<String>) {
    let paths: BTreeSet<&str> = ours
        .files
        .iter()
        .chain(theirs.files.iter())
        .map(|e| e.path.as_str())
        .collect();

    let mut merged = Vec::new();
    let mut conflicts = Vec::new();

    for path in paths {
        let b = base.get(path);
        let o = ours.get(path);
        let t = theirs.get(path);

        if same(o, t) {
            if let Some(o) = o {
                merged.push(o.clone());
            }
            continue;
        }
        if same(b, o) {
            // we left it alone; their change (or deletion) wins
            if let Some(t) = t {
                merged.push(t.clone());
            }
            continue;
        }
        if same(b, t) {
            if let Some(o) = o {
                merged.push(o.clone());
            }
            continue;
        }

        // both sides changed it differently: keep ours, preserve theirs
        if let Some(o) = o {
            merged.push(o.clone());
        }
        if let Some(t) = t {
            merged.push(Entry::new(format!("{}.MERGE_THEIRS", path), t.blocks.clone()));
        }
        conflicts.push(path.to_string());
    }

    (merged, conflicts)
}

fn same(a: Option<&Entry>, b: Option<&Entry>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_content(b),
        (None, None) => true,
        _ => false,
    }
}
