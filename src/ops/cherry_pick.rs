//! apply one commit's tree onto the current branch

use tracing::info;

use crate::error::Result;
use crate::object::{read_commit, read_fileset, write_commit};
use crate::refs::{head_branch, read_tip, write_tip};
use crate::repo::Repo;
use crate::restore::restore_clean;
use crate::types::Commit;

/// record a new commit on the current branch carrying the picked commit's
/// fileset, then restore the working tree to it
pub fn cherry_pick(repo: &Repo, commit_id: &str) -> Result<Commit> {
    let picked = read_commit(repo, commit_id)?;
    let branch = head_branch(repo)?;
    let tip = read_tip(repo, &branch)?;

    let parents = if tip.is_empty() { Vec::new() } else { vec![tip] };
    let message = format!("Cherry-pick: {}", picked.message);
    let commit = Commit::new(parents, &branch, message, picked.fileset_id.clone());
    write_commit(repo, &commit)?;
    write_tip(repo, &branch, &commit.id)?;

    let fileset = read_fileset(repo, &commit.fileset_id)?;
    restore_clean(repo, &fileset)?;

    info!(picked = %picked.short_id(), id = %commit.short_id(), branch, "cherry-picked");
    Ok(commit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::Error;
    use crate::ops::{add, branch_create, checkout, commit};
    use crate::vfs::{MemoryVfs, Vfs};
    use std::path::Path;
    use std::sync::Arc;

    fn mem_repo() -> Repo {
        let fs = MemoryVfs::new();
        fs.create_dir_all(Path::new("/work")).unwrap();
        Repo::init_with(Path::new("/work"), Arc::new(fs), Config::new()).unwrap()
    }

    #[test]
    fn test_cherry_pick_carries_fileset_and_message() {
        let repo = mem_repo();
        repo.fs().write(&repo.worktree_file("a.txt"), b"base").unwrap();
        add(&repo, &[]).unwrap();
        commit(&repo, "base", false).unwrap();
        branch_create(&repo, "feature").unwrap();
        checkout(&repo, "feature").unwrap();

        repo.fs().write(&repo.worktree_file("b.txt"), b"feature work").unwrap();
        add(&repo, &[]).unwrap();
        let picked = commit(&repo, "add b", false).unwrap();

        checkout(&repo, "main").unwrap();
        let new = cherry_pick(&repo, &picked.id).unwrap();

        assert_eq!(new.message, "Cherry-pick: add b");
        assert_eq!(new.fileset_id, picked.fileset_id);
        assert_eq!(new.branch, "main");
        assert_ne!(new.id, picked.id);
        assert_eq!(
            repo.fs().read(&repo.worktree_file("b.txt")).unwrap(),
            b"feature work"
        );
    }

    #[test]
    fn test_cherry_pick_unknown_commit() {
        let repo = mem_repo();
        let err = cherry_pick(&repo, "deadbeef").unwrap_err();
        assert!(matches!(err, Error::CommitNotFound(_)));
    }
}
