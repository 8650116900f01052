use serde::{Deserialize, Serialize};

use crate::hash::StreamHasher;
use crate::types::Entry;

/// an immutable, content-addressed snapshot of a set of file versions
///
/// the id is a pure function of the entries: paths sorted lexicographically,
/// each entry contributing its block hashes with a `\n` after every hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fileset {
    pub id: String,
    pub files: Vec<Entry>,
}

impl Fileset {
    /// build a fileset from entries: sort by path, derive the id
    pub fn from_entries(mut files: Vec<Entry>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let id = Self::compute_id(&files);
        Self { id, files }
    }

    /// deterministic id over path-sorted entries' block hash sequences
    pub fn compute_id(sorted_files: &[Entry]) -> String {
        let mut hasher = StreamHasher::new();
        for entry in sorted_files {
            for block in &entry.blocks {
                hasher.update(block.hash.to_hex().as_bytes());
                hasher.update(b"\n");
            }
        }
        hasher.finalize().to_hex()
    }

    /// entry for a path, if present
    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.files.iter().find(|e| e.path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}
