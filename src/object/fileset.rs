use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::object::block::{clean_temp, write_entry_blocks};
use crate::repo::Repo;
use crate::types::Fileset;
use crate::util::write_json_atomic;

fn fileset_path(repo: &Repo, id: &str) -> PathBuf {
    repo.filesets_path().join(format!("{}.json", id))
}

/// persist a fileset record at `<repo>/filesets/<id>.json`
pub fn save_fileset(repo: &Repo, fileset: &Fileset) -> Result<()> {
    if fileset.id.is_empty() || fileset.files.is_empty() {
        return Err(Error::EmptyFileset);
    }
    write_json_atomic(repo.fs(), &fileset_path(repo, &fileset.id), fileset)
}

/// load a fileset by id
pub fn read_fileset(repo: &Repo, id: &str) -> Result<Fileset> {
    let path = fileset_path(repo, id);
    match repo.fs().read(&path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.is_not_found() => Err(Error::FilesetNotFound(id.to_string())),
        Err(e) => Err(e),
    }
}

/// enumerate all persisted filesets, skipping undecodable records
pub fn list_filesets(repo: &Repo) -> Result<Vec<Fileset>> {
    let dir = repo.filesets_path();
    if !repo.fs().is_dir(&dir) {
        return Ok(Vec::new());
    }
    let mut filesets = Vec::new();
    for entry in repo.fs().read_dir(&dir)? {
        if entry.is_dir || !entry.file_name.ends_with(".json") {
            continue;
        }
        match repo
            .fs()
            .read(&entry.path)
            .and_then(|bytes| Ok(serde_json::from_slice::<Fileset>(&bytes)?))
        {
            Ok(fileset) => filesets.push(fileset),
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "skipping unreadable fileset record")
            }
        }
    }
    filesets.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(filesets)
}

/// store every block of every entry, then persist the fileset record
///
/// a temp-file sweep of the block store runs first so a crashed previous
/// write cannot leave `.tmp-*` debris next to the new blocks. block writes
/// for distinct entries run in parallel; within an entry the block writer
/// parallelizes again over refs.
pub fn write_fileset(repo: &Repo, fileset: &Fileset) -> Result<()> {
    if fileset.id.is_empty() || fileset.files.is_empty() {
        return Err(Error::EmptyFileset);
    }

    clean_temp(repo)?;

    fileset
        .files
        .par_iter()
        .try_for_each(|entry| write_entry_blocks(repo, entry))?;

    save_fileset(repo, fileset)?;
    debug!(id = %fileset.id, files = fileset.files.len(), "wrote fileset");
    Ok(())
}
