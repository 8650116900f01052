//! materializing entries back into the working tree

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::ignore::IgnoreRules;
use crate::index;
use crate::object::read_block;
use crate::repo::Repo;
use crate::scan;
use crate::types::{Entry, Fileset};
use crate::vfs::TempFile;

/// write one entry's content to its working-tree path
///
/// blocks are concatenated in order into a temp file in the target
/// directory, then renamed into place. a missing block fails the entry.
pub fn restore_entry(repo: &Repo, entry: &Entry) -> Result<()> {
    let fs = repo.fs();
    let target = repo.worktree_file(&entry.path);
    let dir = target.parent().unwrap_or_else(|| Path::new(""));
    fs.create_dir_all(dir)?;

    let mut tmp = fs.create_temp(dir, ".tmp-")?;
    if let Err(e) = fill_temp(repo, &mut tmp, entry) {
        drop(tmp.writer);
        let _ = fs.remove(&tmp.path);
        return Err(e);
    }
    drop(tmp.writer);

    if let Err(e) = fs.rename(&tmp.path, &target) {
        let _ = fs.remove(&tmp.path);
        return Err(e);
    }
    Ok(())
}

// any failure here, block reads included, must leave no temp behind
fn fill_temp(repo: &Repo, tmp: &mut TempFile, entry: &Entry) -> Result<()> {
    for block in &entry.blocks {
        let bytes = read_block(repo, &block.hash)?;
        tmp.writer.write_all(&bytes).map_err(|source| Error::Io {
            path: tmp.path.clone(),
            source,
        })?;
    }
    tmp.writer.flush().map_err(|source| Error::Io {
        path: tmp.path.clone(),
        source,
    })?;
    Ok(())
}

/// restore many entries, parallel across entries
pub fn restore_entries(repo: &Repo, entries: &[Entry]) -> Result<()> {
    entries
        .par_iter()
        .try_for_each(|entry| restore_entry(repo, entry))?;
    debug!(files = entries.len(), "restored entries");
    Ok(())
}

/// restore a fileset and prune leftovers
///
/// files present in the working tree but absent from the fileset are
/// removed, except staged and ignored paths.
pub fn restore_clean(repo: &Repo, fileset: &Fileset) -> Result<()> {
    restore_entries(repo, &fileset.files)?;

    let keep: BTreeSet<&str> = fileset.files.iter().map(|e| e.path.as_str()).collect();
    let staged: BTreeSet<String> = index::staged_paths(repo)?.into_iter().collect();
    let rules = IgnoreRules::load(repo)?;

    for rel in scan::worktree_files(repo)? {
        if keep.contains(rel.as_str()) || staged.contains(&rel) || rules.matches(&rel) {
            continue;
        }
        info!(path = %rel, "pruning file absent from target fileset");
        repo.fs().remove(&repo.worktree_file(&rel))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::split_bytes;
    use crate::config::Config;
    use crate::object::write_entry_blocks;
    use crate::vfs::{MemoryVfs, Vfs};
    use std::sync::Arc;

    fn mem_repo() -> Repo {
        let fs = MemoryVfs::new();
        fs.create_dir_all(Path::new("/work")).unwrap();
        Repo::init_with(Path::new("/work"), Arc::new(fs), Config::new()).unwrap()
    }

    fn committed_entry(repo: &Repo, rel: &str, content: &[u8]) -> Entry {
        let abs = repo.worktree_file(rel);
        if let Some(parent) = abs.parent() {
            repo.fs().create_dir_all(parent).unwrap();
        }
        repo.fs().write(&abs, content).unwrap();
        let entry = Entry::new(rel, split_bytes(content));
        write_entry_blocks(repo, &entry).unwrap();
        entry
    }

    #[test]
    fn test_restore_roundtrip() {
        let repo = mem_repo();
        let entry = committed_entry(&repo, "sub/dir/file.txt", b"round trip me");
        repo.fs().remove(&repo.worktree_file("sub/dir/file.txt")).unwrap();

        restore_entry(&repo, &entry).unwrap();
        assert_eq!(
            repo.fs().read(&repo.worktree_file("sub/dir/file.txt")).unwrap(),
            b"round trip me"
        );
    }

    #[test]
    fn test_restore_overwrites_existing() {
        let repo = mem_repo();
        let entry = committed_entry(&repo, "a.txt", b"wanted");
        repo.fs()
            .write(&repo.worktree_file("a.txt"), b"stale content")
            .unwrap();

        restore_entry(&repo, &entry).unwrap();
        assert_eq!(repo.fs().read(&repo.worktree_file("a.txt")).unwrap(), b"wanted");
    }

    #[test]
    fn test_restore_missing_block_fails_entry() {
        let repo = mem_repo();
        let entry = Entry::new("a.txt", split_bytes(b"never stored"));
        let err = restore_entry(&repo, &entry).unwrap_err();
        assert!(matches!(err, Error::BlockMissing(_)));
        // no temp debris in the worktree
        let leftovers: Vec<_> = repo
            .fs()
            .read_dir(repo.worktree())
            .unwrap()
            .into_iter()
            .filter(|e| e.file_name.starts_with(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_restore_clean_prunes_untracked() {
        let repo = mem_repo();
        let keep = committed_entry(&repo, "keep.txt", b"keep");
        let fileset = Fileset::from_entries(vec![keep]);

        repo.fs().write(&repo.worktree_file("stray.txt"), b"bye").unwrap();
        restore_clean(&repo, &fileset).unwrap();

        assert!(repo.fs().exists(&repo.worktree_file("keep.txt")));
        assert!(!repo.fs().exists(&repo.worktree_file("stray.txt")));
    }

    #[test]
    fn test_restore_clean_spares_staged_and_ignored() {
        let repo = mem_repo();
        let keep = committed_entry(&repo, "keep.txt", b"keep");
        let fileset = Fileset::from_entries(vec![keep]);

        // staged file not in the fileset
        let staged = committed_entry(&repo, "staged.txt", b"staged");
        index::save_replace(&repo, vec![staged]).unwrap();
        // ignored file
        repo.fs().write(&repo.worktree_file(".bvc-ignore"), b"*.tmp\n").unwrap();
        repo.fs().write(&repo.worktree_file("scratch.tmp"), b"i").unwrap();

        restore_clean(&repo, &fileset).unwrap();

        assert!(repo.fs().exists(&repo.worktree_file("staged.txt")));
        assert!(repo.fs().exists(&repo.worktree_file("scratch.tmp")));
    }
}
