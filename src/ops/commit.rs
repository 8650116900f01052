//! turn the staging index into a commit

use tracing::info;

use crate::error::{Error, Result};
use crate::index;
use crate::object::{read_commit, write_commit, write_fileset};
use crate::refs::{head_branch, read_tip, write_tip};
use crate::repo::Repo;
use crate::types::{Commit, Fileset};

/// commit the staging index on the current branch
///
/// the staged entries become a fileset, a commit record is written
/// pointing at it, the branch tip advances and the index is cleared.
/// with `allow_empty` and nothing staged, the parent's fileset is reused.
pub fn commit(repo: &Repo, message: &str, allow_empty: bool) -> Result<Commit> {
    if message.trim().is_empty() {
        return Err(Error::EmptyMessage);
    }

    let branch = head_branch(repo)?;
    let tip = read_tip(repo, &branch)?;
    let staged = index::load(repo)?;

    let fileset_id = if staged.is_empty() {
        if !allow_empty {
            return Err(Error::NothingStaged);
        }
        if tip.is_empty() {
            // nothing staged and no parent to borrow a tree from
            return Err(Error::EmptyFileset);
        }
        read_commit(repo, &tip)?.fileset_id
    } else {
        let fileset = Fileset::from_entries(staged);
        write_fileset(repo, &fileset)?;
        fileset.id
    };

    let parents = if tip.is_empty() { Vec::new() } else { vec![tip] };
    let commit = Commit::new(parents, &branch, message, fileset_id);
    write_commit(repo, &commit)?;
    write_tip(repo, &branch, &commit.id)?;
    index::clear(repo)?;

    info!(id = %commit.short_id(), branch, "committed");
    Ok(commit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ops::add;
    use crate::vfs::{MemoryVfs, Vfs};
    use std::path::Path;
    use std::sync::Arc;

    fn mem_repo() -> Repo {
        let fs = MemoryVfs::new();
        fs.create_dir_all(Path::new("/work")).unwrap();
        Repo::init_with(Path::new("/work"), Arc::new(fs), Config::new()).unwrap()
    }

    #[test]
    fn test_commit_advances_tip_and_clears_index() {
        let repo = mem_repo();
        repo.fs().write(&repo.worktree_file("a.txt"), b"a").unwrap();
        add(&repo, &[]).unwrap();

        let c = commit(&repo, "first", false).unwrap();
        assert!(c.is_root());
        assert_eq!(read_tip(&repo, "main").unwrap(), c.id);
        assert!(index::load(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_second_commit_has_first_as_parent() {
        let repo = mem_repo();
        repo.fs().write(&repo.worktree_file("a.txt"), b"a").unwrap();
        add(&repo, &[]).unwrap();
        let c1 = commit(&repo, "first", false).unwrap();

        repo.fs().write(&repo.worktree_file("a.txt"), b"a2").unwrap();
        add(&repo, &[]).unwrap();
        let c2 = commit(&repo, "second", false).unwrap();

        assert_eq!(c2.parents, vec![c1.id]);
    }

    #[test]
    fn test_empty_stage_is_refused() {
        let repo = mem_repo();
        let err = commit(&repo, "nothing", false).unwrap_err();
        assert!(matches!(err, Error::NothingStaged));
    }

    #[test]
    fn test_allow_empty_reuses_parent_fileset() {
        let repo = mem_repo();
        repo.fs().write(&repo.worktree_file("a.txt"), b"a").unwrap();
        add(&repo, &[]).unwrap();
        let c1 = commit(&repo, "first", false).unwrap();

        let c2 = commit(&repo, "tag point", true).unwrap();
        assert_eq!(c2.fileset_id, c1.fileset_id);
        assert_eq!(c2.parents, vec![c1.id]);
    }

    #[test]
    fn test_blank_message_is_refused() {
        let repo = mem_repo();
        let err = commit(&repo, "   ", false).unwrap_err();
        assert!(matches!(err, Error::EmptyMessage));
    }
}
