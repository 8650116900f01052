use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{Error, IoResultExt, Result};
use crate::hash::BlockHash;
use crate::repo::Repo;
use crate::types::{BlockRef, BlockStatus, Entry};
use crate::vfs::TempWrite;

/// filesystem path of a block: `<repo>/objects/<hash>.bin`
pub fn block_path(repo: &Repo, hash: &BlockHash) -> PathBuf {
    repo.objects_path().join(format!("{}.bin", hash.to_hex()))
}

/// write one block, reading its bytes from `source` at the ref's offset
///
/// idempotent: a pre-existing target with matching size is skipped. the
/// atomicity point is the final rename; until then only a `.tmp-*` file in
/// the objects directory exists, and it is removed on any earlier failure.
pub fn write_block(repo: &Repo, source: &Path, block: &BlockRef) -> Result<()> {
    let fs = repo.fs();
    let target = block_path(repo, &block.hash);

    // deduplication: identical hash means identical bytes
    if let Ok(info) = fs.metadata(&target) {
        if info.size == block.size {
            return Ok(());
        }
    }

    let objects = repo.objects_path();
    fs.create_dir_all(&objects)?;

    let mut handle = fs.open(source)?;
    handle
        .seek(SeekFrom::Start(block.offset))
        .with_path(source)?;
    let mut bytes = vec![0u8; block.size as usize];
    handle.read_exact(&mut bytes).with_path(source)?;

    let mut tmp = fs.create_temp(&objects, ".tmp-")?;
    let written = tmp
        .writer
        .write_all(&bytes)
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

    if let Err(e) = fs.rename(&tmp.path, &target) {
        let _ = fs.remove(&tmp.path);
        return Err(e);
    }
    debug!(hash = %block.hash, size = block.size, "stored block");
    Ok(())
}

/// write all blocks of one entry in parallel
pub fn write_entry_blocks(repo: &Repo, entry: &Entry) -> Result<()> {
    let source = repo.worktree_file(&entry.path);
    entry
        .blocks
        .par_iter()
        .try_for_each(|block| write_block(repo, &source, block))
}

/// read a block's bytes; a missing file is [`Error::BlockMissing`]
pub fn read_block(repo: &Repo, hash: &BlockHash) -> Result<Vec<u8>> {
    let path = block_path(repo, hash);
    match repo.fs().read(&path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.is_not_found() => Err(Error::BlockMissing(*hash)),
        Err(e) => Err(e),
    }
}

/// verify one block against its stored bytes
///
/// a read failure on a present file counts as damage.
pub fn verify_block(repo: &Repo, hash: &BlockHash) -> BlockStatus {
    let path = block_path(repo, hash);
    if !repo.fs().exists(&path) {
        return BlockStatus::Missing;
    }
    match repo.fs().read(&path) {
        Ok(bytes) if BlockHash::of(&bytes) == *hash => BlockStatus::Ok,
        Ok(_) => BlockStatus::Damaged,
        Err(e) => {
            warn!(hash = %hash, error = %e, "block file unreadable");
            BlockStatus::Damaged
        }
    }
}

/// verify many blocks in parallel, streaming results in arbitrary order
///
/// `on_result` is called on the caller's thread as results become
/// available; returning `false` stops early. the consumer loop never
/// enters the worker pool, so even a one-thread pool can run the
/// producer.
pub fn verify_blocks(
    repo: &Repo,
    hashes: &[BlockHash],
    mut on_result: impl FnMut(BlockHash, BlockStatus) -> bool,
) -> Result<()> {
    let (tx, rx) = crossbeam_channel::bounded::<(BlockHash, BlockStatus)>(128);

    rayon::in_place_scope(|s| {
        s.spawn(|_| {
            hashes.par_iter().for_each_with(tx, |tx, hash| {
                let status = verify_block(repo, hash);
                // a send error means the consumer stopped; nothing to do
                let _ = tx.send((*hash, status));
            });
        });

        while let Ok((hash, status)) = rx.recv() {
            if !on_result(hash, status) {
                break;
            }
        }
        drop(rx);
    });

    Ok(())
}

/// remove leftover temp files from the objects directory
///
/// recognizes both the current `.tmp-` prefix and the legacy `tmp-` one.
pub fn clean_temp(repo: &Repo) -> Result<usize> {
    let fs = repo.fs();
    let objects = repo.objects_path();
    if !fs.is_dir(&objects) {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs.read_dir(&objects)? {
        if entry.is_dir {
            continue;
        }
        if entry.file_name.starts_with(".tmp-") || entry.file_name.starts_with("tmp-") {
            match fs.remove(&entry.path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %entry.path.display(), error = %e, "could not remove temp file"),
            }
        }
    }
    if removed > 0 {
        debug!(removed, "cleaned temp files from block store");
    }
    Ok(removed)
}
