//! working-tree status

use crate::error::Result;
use crate::refs::head_branch;
use crate::repo::Repo;
use crate::scan;

/// what `status` reports: the current branch and the scan groups
pub struct Status {
    pub branch: String,
    pub tracked: Vec<String>,
    pub staged: Vec<String>,
    pub ignored: Vec<String>,
}

pub fn status(repo: &Repo) -> Result<Status> {
    let branch = head_branch(repo)?;
    let result = scan::scan(repo)?;
    let paths = |fs: &crate::types::Fileset| -> Vec<String> {
        fs.files.iter().map(|e| e.path.clone()).collect()
    };
    Ok(Status {
        branch,
        tracked: paths(&result.tracked),
        staged: paths(&result.staged),
        ignored: paths(&result.ignored),
    })
}
