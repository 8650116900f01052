//! branches and HEAD
//!
//! a branch is the single-line file `branches/<name>` whose content is a
//! commit id; an empty file is an unborn branch. HEAD holds exactly
//! `ref: branches/<name>` — detached HEAD is not supported.

use std::io::Write;

use tracing::debug;

use crate::error::{Error, Result};
use crate::repo::Repo;
use crate::vfs::TempWrite;

/// write a branch tip (create or update), atomically
pub fn write_tip(repo: &Repo, branch: &str, commit_id: &str) -> Result<()> {
    validate_branch_name(branch)?;
    let fs = repo.fs();
    let branches = repo.branches_path();
    fs.create_dir_all(&branches)?;

    let mut tmp = fs.create_temp(&branches, ".tmp-")?;
    let written = tmp
        .writer
        .write_all(commit_id.as_bytes())
        .and_then(|_| tmp.writer.flush())
        .and_then(|_| tmp.writer.sync());
    drop(tmp.writer);
    if let Err(source) = written {
        let _ = fs.remove(&tmp.path);
        return Err(Error::Io {
            path: tmp.path,
            source,
        });
    }
    if let Err(e) = fs.rename(&tmp.path, &repo.branch_path(branch)) {
        let _ = fs.remove(&tmp.path);
        return Err(e);
    }
    debug!(branch, tip = commit_id, "advanced branch");
    Ok(())
}

/// read a branch tip; empty string means the branch is unborn
pub fn read_tip(repo: &Repo, branch: &str) -> Result<String> {
    let path = repo.branch_path(branch);
    match repo.fs().read(&path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).trim().to_string()),
        Err(e) if e.is_not_found() => Err(Error::BranchNotFound(branch.to_string())),
        Err(e) => Err(e),
    }
}

/// a branch exists iff its file exists
pub fn branch_exists(repo: &Repo, branch: &str) -> bool {
    repo.fs().exists(&repo.branch_path(branch))
}

/// create a branch pointing at the current branch's tip
pub fn create_branch(repo: &Repo, name: &str) -> Result<()> {
    validate_branch_name(name)?;
    if branch_exists(repo, name) {
        return Err(Error::BranchExists(name.to_string()));
    }
    let current = head_branch(repo)?;
    let tip = read_tip(repo, &current)?;
    write_tip(repo, name, &tip)
}

/// branch names sorted lexicographically
pub fn list_branches(repo: &Repo) -> Result<Vec<String>> {
    let dir = repo.branches_path();
    if !repo.fs().is_dir(&dir) {
        return Ok(Vec::new());
    }
    let mut names: Vec<String> = repo
        .fs()
        .read_dir(&dir)?
        .into_iter()
        .filter(|e| !e.is_dir && !e.file_name.starts_with(".tmp-"))
        .map(|e| e.file_name)
        .collect();
    names.sort();
    Ok(names)
}

/// current branch name parsed from HEAD
pub fn head_branch(repo: &Repo) -> Result<String> {
    let bytes = repo.fs().read(&repo.head_path())?;
    let content = String::from_utf8_lossy(&bytes).trim().to_string();
    match content.strip_prefix("ref: branches/") {
        Some(name) if !name.is_empty() && !name.contains('/') => Ok(name.to_string()),
        _ => Err(Error::BadHead(content)),
    }
}

/// point HEAD at a branch
pub fn set_head(repo: &Repo, branch: &str) -> Result<()> {
    validate_branch_name(branch)?;
    repo.fs().write(
        &repo.head_path(),
        format!("ref: branches/{}", branch).as_bytes(),
    )?;
    debug!(branch, "moved HEAD");
    Ok(())
}

fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidBranch("empty branch name".to_string()));
    }
    if name.contains('/') || name.contains('\0') {
        return Err(Error::InvalidBranch(format!(
            "branch name cannot contain '/' or null: {}",
            name
        )));
    }
    if name == "." || name == ".." || name.starts_with(".tmp-") {
        return Err(Error::InvalidBranch(name.to_string()));
    }
    Ok(())
}
