//! staging index: the entries that will form the next commit
//!
//! persisted as `<repo>/index.json`, an ordered array of entries. an
//! absent file is an empty index; malformed JSON is an error.

use tracing::debug;

use crate::error::Result;
use crate::repo::Repo;
use crate::types::Entry;
use crate::util::write_json_atomic;

/// load the staging index; absent file = empty
pub fn load(repo: &Repo) -> Result<Vec<Entry>> {
    match repo.fs().read(&repo.index_path()) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// overwrite the index with the given entries
pub fn save_replace(repo: &Repo, mut entries: Vec<Entry>) -> Result<()> {
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    write_json_atomic(repo.fs(), &repo.index_path(), &entries)
}

/// merge entries into the index: same path overwrites, others are kept
pub fn save_merge(repo: &Repo, new_entries: Vec<Entry>) -> Result<()> {
    let mut entries = load(repo)?;
    for new_entry in new_entries {
        match entries.iter_mut().find(|e| e.path == new_entry.path) {
            Some(existing) => *existing = new_entry,
            None => entries.push(new_entry),
        }
    }
    debug!(staged = entries.len(), "updated staging index");
    save_replace(repo, entries)
}

/// remove the index file; a missing file is not an error
pub fn clear(repo: &Repo) -> Result<()> {
    match repo.fs().remove(&repo.index_path()) {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

/// paths currently staged
pub fn staged_paths(repo: &Repo) -> Result<Vec<String>> {
    Ok(load(repo)?.into_iter().map(|e| e.path).collect())
}
