//! rebuild damaged or missing blocks from the working tree

use tracing::{info, warn};

use crate::chunker::split_reader;
use crate::error::{IoResultExt, Result};
use crate::object::{block_path, verify_block, write_block};
use super::verify::verify_stream;
use crate::repo::Repo;
use crate::types::{BlockCheck, BlockStatus};

/// what a repair pass recovered and what stayed lost
pub struct RepairOutcome {
    pub checked: usize,
    pub recovered: Vec<BlockCheck>,
    pub lost: Vec<BlockCheck>,
}

impl RepairOutcome {
    pub fn is_clean(&self) -> bool {
        self.lost.is_empty()
    }
}

/// scan every referenced block and rebuild the broken ones
///
/// a broken block is recoverable when some worktree file that references
/// it still carries its bytes: re-splitting that file yields a block with
/// the wanted hash, which is written back and re-verified. the first file
/// that works wins.
pub fn repair(repo: &Repo) -> Result<RepairOutcome> {
    let mut checked = 0;
    let mut broken = Vec::new();
    verify_stream(repo, false, |check| {
        checked += 1;
        if !check.is_ok() {
            broken.push(check);
        }
        true
    })?;

    let mut recovered = Vec::new();
    let mut lost = Vec::new();
    for check in broken {
        if rebuild(repo, &check)? {
            recovered.push(check);
        } else {
            warn!(hash = %check.hash, "block unrecoverable");
            lost.push(check);
        }
    }

    info!(
        checked,
        recovered = recovered.len(),
        lost = lost.len(),
        "repair pass finished"
    );
    Ok(RepairOutcome {
        checked,
        recovered,
        lost,
    })
}

fn rebuild(repo: &Repo, check: &BlockCheck) -> Result<bool> {
    let path = block_path(repo, &check.hash);
    if check.status == BlockStatus::Damaged {
        repo.fs().remove(&path)?;
    }

    for rel in &check.files {
        let abs = repo.worktree_file(rel);
        if !repo.fs().exists(&abs) {
            continue;
        }
        let mut handle = match repo.fs().open(&abs) {
            Ok(h) => h,
            Err(e) => {
                warn!(path = rel.as_str(), error = %e, "cannot open candidate file");
                continue;
            }
        };
        let refs = split_reader(&mut handle).with_path(&abs)?;
        let Some(wanted) = refs.into_iter().find(|r| r.hash == check.hash) else {
            continue;
        };
        write_block(repo, &abs, &wanted)?;
        if verify_block(repo, &check.hash) == BlockStatus::Ok {
            info!(hash = %check.hash, source = rel.as_str(), "block rebuilt");
            return Ok(true);
        }
        // the file changed between split and write; drop the bad copy
        let _ = repo.fs().remove(&path);
    }
    Ok(false)
}
