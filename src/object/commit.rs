use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::repo::Repo;
use crate::types::Commit;
use crate::util::write_json_atomic;

fn commit_record_path(repo: &Repo, id: &str) -> PathBuf {
    repo.commits_path().join(format!("{}.json", id))
}

pub fn commit_exists(repo: &Repo, id: &str) -> bool {
    repo.fs().exists(&commit_record_path(repo, id))
}

/// persist a commit record; a pre-existing id is a collision and fatal
pub fn write_commit(repo: &Repo, commit: &Commit) -> Result<()> {
    if commit_exists(repo, &commit.id) {
        return Err(Error::CommitIdCollision(commit.id.clone()));
    }
    write_json_atomic(repo.fs(), &commit_record_path(repo, &commit.id), commit)?;
    debug!(id = %commit.short_id(), branch = %commit.branch, "wrote commit");
    Ok(())
}

/// load a commit record by id
pub fn read_commit(repo: &Repo, id: &str) -> Result<Commit> {
    let path = commit_record_path(repo, id);
    match repo.fs().read(&path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.is_not_found() => Err(Error::CommitNotFound(id.to_string())),
        Err(e) => Err(e),
    }
}

/// ids of every commit record on disk, skipping files that are not records
pub fn list_commit_ids(repo: &Repo) -> Result<Vec<String>> {
    let dir = repo.commits_path();
    if !repo.fs().is_dir(&dir) {
        return Ok(Vec::new());
    }
    let mut ids = Vec::new();
    for entry in repo.fs().read_dir(&dir)? {
        if entry.is_dir {
            continue;
        }
        match entry.file_name.strip_suffix(".json") {
            Some(id) => ids.push(id.to_string()),
            None => warn!(path = %entry.path.display(), "stray file in commits directory"),
        }
    }
    ids.sort();
    Ok(ids)
}
