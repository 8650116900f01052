//! block verification across the whole store

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::hash::BlockHash;
use crate::history::first_parent_ids;
use crate::object::{read_commit, read_fileset, verify_blocks};
use crate::refs::list_branches;
use crate::repo::Repo;
use crate::types::{BlockCheck, BlockStatus};

/// collect every referenced block and who references it
///
/// `only_latest` limits the walk to each branch's tip commit; otherwise
/// the full first-parent history of every branch is covered.
fn referenced_blocks(repo: &Repo, only_latest: bool) -> Result<BTreeMap<BlockHash, BlockCheck>> {
    let mut map: BTreeMap<BlockHash, BlockCheck> = BTreeMap::new();

    for branch in list_branches(repo)? {
        let ids = first_parent_ids(repo, &branch)?;
        let ids = if only_latest {
            ids.into_iter().take(1).collect::<Vec<_>>()
        } else {
            ids
        };

        for id in ids {
            let commit = match read_commit(repo, &id) {
                Ok(c) => c,
                Err(e) => {
                    warn!(id, error = %e, "skipping unreadable commit during verify");
                    continue;
                }
            };
            let fileset = match read_fileset(repo, &commit.fileset_id) {
                Ok(f) => f,
                Err(e) => {
                    warn!(id, error = %e, "skipping unreadable fileset during verify");
                    continue;
                }
            };
            for entry in &fileset.files {
                for block in &entry.blocks {
                    let check = map.entry(block.hash).or_insert_with(|| BlockCheck {
                        hash: block.hash,
                        status: BlockStatus::Ok,
                        files: Default::default(),
                        branches: Default::default(),
                    });
                    check.files.insert(entry.path.clone());
                    check.branches.insert(branch.clone());
                }
            }
        }
    }
    debug!(blocks = map.len(), only_latest, "collected referenced blocks");
    Ok(map)
}

/// blocks referenced by more than one file or branch, i.e. the payoff of
/// content-defined deduplication
pub fn shared_blocks(repo: &Repo, only_latest: bool) -> Result<(usize, Vec<BlockCheck>)> {
    let map = referenced_blocks(repo, only_latest)?;
    let total = map.len();
    let shared = map
        .into_values()
        .filter(|c| c.files.len() > 1 || c.branches.len() > 1)
        .collect();
    Ok((total, shared))
}

/// verify every referenced block, streaming results as they come
///
/// `on_check` runs on the caller's thread; returning `false` stops the
/// verification early.
pub fn verify_stream(
    repo: &Repo,
    only_latest: bool,
    mut on_check: impl FnMut(BlockCheck) -> bool,
) -> Result<()> {
    let mut map = referenced_blocks(repo, only_latest)?;
    let hashes: Vec<BlockHash> = map.keys().copied().collect();

    verify_blocks(repo, &hashes, |hash, status| {
        match map.remove(&hash) {
            Some(mut check) => {
                check.status = status;
                on_check(check)
            }
            None => true,
        }
    })
}

/// blocking verification: the first non-OK block becomes an error
pub fn verify_all(repo: &Repo, only_latest: bool) -> Result<()> {
    let mut bad: Option<BlockCheck> = None;
    verify_stream(repo, only_latest, |check| {
        if check.is_ok() {
            true
        } else {
            bad = Some(check);
            false
        }
    })?;

    match bad {
        None => Ok(()),
        Some(check) => match check.status {
            BlockStatus::Missing => Err(Error::BlockMissing(check.hash)),
            _ => Err(Error::BlockDamaged(check.hash)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::object::block_path;
    use crate::ops::{add, commit};
    use crate::vfs::{MemoryVfs, Vfs};
    use std::path::Path;
    use std::sync::Arc;

    fn mem_repo() -> Repo {
        let fs = MemoryVfs::new();
        fs.create_dir_all(Path::new("/work")).unwrap();
        Repo::init_with(Path::new("/work"), Arc::new(fs), Config::new()).unwrap()
    }

    #[test]
    fn test_verify_clean_repo() {
        let repo = mem_repo();
        repo.fs().write(&repo.worktree_file("a.txt"), b"fine").unwrap();
        add(&repo, &[]).unwrap();
        commit(&repo, "one", false).unwrap();

        verify_all(&repo, false).unwrap();

        let mut seen = 0;
        verify_stream(&repo, true, |check| {
            assert!(check.is_ok());
            assert!(check.files.contains("a.txt"));
            assert!(check.branches.contains("main"));
            seen += 1;
            true
        })
        .unwrap();
        assert!(seen >= 1);
    }

    #[test]
    fn test_verify_reports_damage() {
        let repo = mem_repo();
        repo.fs().write(&repo.worktree_file("a.txt"), b"original").unwrap();
        add(&repo, &[]).unwrap();
        commit(&repo, "one", false).unwrap();

        // flip bytes of one stored block
        let objects = repo.fs().read_dir(&repo.objects_path()).unwrap();
        let victim = objects.iter().find(|e| !e.is_dir).unwrap();
        repo.fs().write(&victim.path, b"corrupted!").unwrap();

        let err = verify_all(&repo, false).unwrap_err();
        assert!(matches!(err, Error::BlockDamaged(_)));
    }

    #[test]
    fn test_verify_reports_missing() {
        let repo = mem_repo();
        repo.fs().write(&repo.worktree_file("a.txt"), b"original").unwrap();
        add(&repo, &[]).unwrap();
        commit(&repo, "one", false).unwrap();

        let mut saw = None;
        verify_stream(&repo, true, |check| {
            saw = Some(check.hash);
            false
        })
        .unwrap();
        let hash = saw.unwrap();
        repo.fs().remove(&block_path(&repo, &hash)).unwrap();

        let err = verify_all(&repo, true).unwrap_err();
        assert!(matches!(err, Error::BlockMissing(_)));
    }

    #[test]
    fn test_shared_blocks_across_branches() {
        let repo = mem_repo();
        repo.fs().write(&repo.worktree_file("a.txt"), b"dedup me").unwrap();
        add(&repo, &[]).unwrap();
        commit(&repo, "one", false).unwrap();

        let (_, shared) = shared_blocks(&repo, false).unwrap();
        assert!(shared.is_empty());

        crate::ops::branch_create(&repo, "dev").unwrap();
        let (total, shared) = shared_blocks(&repo, false).unwrap();
        assert_eq!(total, 1);
        assert_eq!(shared.len(), 1);
        assert!(shared[0].branches.contains("dev"));
        assert!(shared[0].branches.contains("main"));
    }

    #[test]
    fn test_only_latest_skips_old_history() {
        let repo = mem_repo();
        repo.fs().write(&repo.worktree_file("a.txt"), b"first content here").unwrap();
        add(&repo, &[]).unwrap();
        commit(&repo, "one", false).unwrap();
        repo.fs()
            .write(&repo.worktree_file("a.txt"), b"completely different bytes")
            .unwrap();
        add(&repo, &[]).unwrap();
        commit(&repo, "two", false).unwrap();

        let full = referenced_blocks(&repo, false).unwrap();
        let latest = referenced_blocks(&repo, true).unwrap();
        assert!(latest.len() < full.len());
    }
}
