use serde::{Deserialize, Serialize};

use crate::hash::BlockHash;

/// one content-defined chunk of a file
///
/// `offset` locates the chunk inside the originating file and is only used
/// while materializing blocks; it is not part of block identity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BlockRef {
    pub hash: BlockHash,
    pub size: u64,
    pub offset: u64,
}

impl PartialEq for BlockRef {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.size == other.size
    }
}

impl Eq for BlockRef {}

/// one file at one version: a cleaned, repo-relative path plus its blocks
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entry {
    pub path: String,
    pub blocks: Vec<BlockRef>,
}

impl Entry {
    pub fn new(path: impl Into<String>, blocks: Vec<BlockRef>) -> Self {
        Self {
            path: path.into(),
            blocks,
        }
    }

    /// total byte length of the file this entry describes
    pub fn size(&self) -> u64 {
        self.blocks.iter().map(|b| b.size).sum()
    }

    /// two entries carry the same content iff their block sequences have
    /// pairwise-equal (hash, size)
    pub fn same_content(&self, other: &Entry) -> bool {
        self.blocks == other.blocks
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.blocks == other.blocks
    }
}

impl Eq for Entry {}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(hash: &[u8], size: u64, offset: u64) -> BlockRef {
        BlockRef {
            hash: BlockHash::of(hash),
            size,
            offset,
        }
    }

    #[test]
    fn test_offset_not_part_of_identity() {
        let a = block(b"x", 5, 0);
        let b = block(b"x", 5, 100);
        assert_eq!(a, b);
    }

    #[test]
    fn test_size_part_of_identity() {
        let a = block(b"x", 5, 0);
        let b = block(b"x", 6, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_entry_same_content() {
        let e1 = Entry::new("a.txt", vec![block(b"x", 5, 0), block(b"y", 3, 5)]);
        let e2 = Entry::new("b.txt", vec![block(b"x", 5, 10), block(b"y", 3, 15)]);
        assert!(e1.same_content(&e2));
        assert_ne!(e1, e2); // paths differ

        let e3 = Entry::new("a.txt", vec![block(b"x", 5, 0)]);
        assert!(!e1.same_content(&e3));
    }

    #[test]
    fn test_entry_size() {
        let e = Entry::new("a", vec![block(b"x", 5, 0), block(b"y", 7, 5)]);
        assert_eq!(e.size(), 12);
    }

    #[test]
    fn test_entry_json_shape() {
        let e = Entry::new("dir/a.txt", vec![block(b"x", 5, 0)]);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["path"], "dir/a.txt");
        assert_eq!(json["blocks"][0]["size"], 5);
        assert_eq!(json["blocks"][0]["offset"], 0);
        assert!(json["blocks"][0]["hash"].is_string());
    }
}
