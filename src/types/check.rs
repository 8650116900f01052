use std::collections::BTreeSet;
use std::fmt;

use crate::hash::BlockHash;

/// outcome of verifying one block against its stored bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockStatus {
    /// bytes hash to the expected value
    Ok,
    /// no file at the block's path
    Missing,
    /// file present but bytes do not match the hash
    Damaged,
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockStatus::Ok => write!(f, "ok"),
            BlockStatus::Missing => write!(f, "missing"),
            BlockStatus::Damaged => write!(f, "damaged"),
        }
    }
}

/// one verify result, joined with where the block is referenced from
#[derive(Clone, Debug)]
pub struct BlockCheck {
    pub hash: BlockHash,
    pub status: BlockStatus,
    /// repo-relative paths of files referencing this block
    pub files: BTreeSet<String>,
    /// branches whose history references this block
    pub branches: BTreeSet<String>,
}

impl BlockCheck {
    pub fn is_ok(&self) -> bool {
        self.status == BlockStatus::Ok
    }
}
