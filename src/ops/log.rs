//! first-parent history of the current branch

use crate::error::Result;
use crate::history::commits_for_branch;
use crate::refs::head_branch;
use crate::repo::Repo;
use crate::types::Commit;

/// commits of the current branch, newest first
pub fn log(repo: &Repo) -> Result<Vec<Commit>> {
    let branch = head_branch(repo)?;
    commits_for_branch(repo, &branch)
}
