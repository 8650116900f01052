//! branch listing and creation

use tracing::info;

use crate::error::Result;
use crate::refs;
use crate::repo::Repo;

/// branch names with the current one flagged
pub fn branch_list(repo: &Repo) -> Result<Vec<(String, bool)>> {
    let current = refs::head_branch(repo)?;
    Ok(refs::list_branches(repo)?
        .into_iter()
        .map(|name| {
            let is_current = name == current;
            (name, is_current)
        })
        .collect())
}

/// create a branch at the current branch's tip
pub fn branch_create(repo: &Repo, name: &str) -> Result<()> {
    refs::create_branch(repo, name)?;
    info!(branch = name, "created branch");
    Ok(())
}
