//! switch the working tree to a branch or a commit

use tracing::info;

use crate::error::{Error, Result};
use crate::object::{commit_exists, read_commit, read_fileset};
use crate::refs::{branch_exists, head_branch, read_tip, set_head, write_tip};
use crate::repo::Repo;
use crate::restore::restore_clean;

/// check out a branch name or a commit id
///
/// a branch target restores its tip's fileset and moves HEAD. a commit
/// target restores that commit's fileset and rewinds the current branch's
/// tip to it; HEAD stays where it is.
pub fn checkout(repo: &Repo, target: &str) -> Result<()> {
    if branch_exists(repo, target) {
        let tip = read_tip(repo, target)?;
        if tip.is_empty() {
            return Err(Error::EmptyBranch(target.to_string()));
        }
        let commit = read_commit(repo, &tip)?;
        let fileset = read_fileset(repo, &commit.fileset_id)?;
        restore_clean(repo, &fileset)?;
        set_head(repo, target)?;
        info!(branch = target, "checked out branch");
        return Ok(());
    }

    if commit_exists(repo, target) {
        let commit = read_commit(repo, target)?;
        let fileset = read_fileset(repo, &commit.fileset_id)?;
        restore_clean(repo, &fileset)?;
        let branch = head_branch(repo)?;
        write_tip(repo, &branch, &commit.id)?;
        info!(id = %commit.short_id(), branch, "checked out commit");
        return Ok(());
    }

    Err(Error::CommitNotFound(target.to_string()))
}
