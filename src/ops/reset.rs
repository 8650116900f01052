//! move the current branch tip, optionally resetting index and tree

use tracing::info;

use crate::error::{Error, Result};
use crate::index;
use crate::object::{read_commit, read_fileset};
use crate::refs::{head_branch, read_tip, write_tip};
use crate::repo::Repo;
use crate::restore::restore_clean;
use crate::types::Commit;

/// how much of the repository state `reset` rewrites
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetMode {
    /// branch tip only
    Soft,
    /// tip and staging index
    Mixed,
    /// tip, index and working tree
    Hard,
}

/// reset the current branch to `commit_id`, defaulting to its own tip
pub fn reset(repo: &Repo, mode: ResetMode, commit_id: Option<&str>) -> Result<Commit> {
    let branch = head_branch(repo)?;
    let target_id = match commit_id {
        Some(id) => id.to_string(),
        None => {
            let tip = read_tip(repo, &branch)?;
            if tip.is_empty() {
                return Err(Error::EmptyBranch(branch));
            }
            tip
        }
    };

    let target = read_commit(repo, &target_id)?;
    write_tip(repo, &branch, &target.id)?;

    if mode != ResetMode::Soft {
        let fileset = read_fileset(repo, &target.fileset_id)?;
        index::save_replace(repo, fileset.files.clone())?;
        if mode == ResetMode::Hard {
            restore_clean(repo, &fileset)?;
        }
    }

    info!(id = %target.short_id(), branch, ?mode, "reset");
    Ok(target)
}
