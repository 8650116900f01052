use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::hash::StreamHasher;

/// one node of the version DAG
///
/// `parents` has zero entries for a root commit, one for a normal commit and
/// two for a merge. the timestamp is RFC3339.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub parents: Vec<String>,
    pub branch: String,
    pub message: String,
    pub timestamp: String,
    pub fileset_id: String,
}

impl Commit {
    /// create a commit record; the id is a digest of everything else
    pub fn new(
        parents: Vec<String>,
        branch: impl Into<String>,
        message: impl Into<String>,
        fileset_id: impl Into<String>,
    ) -> Self {
        let branch = branch.into();
        let message = message.into();
        let fileset_id = fileset_id.into();
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
        let id = derive_id(&parents, &branch, &message, &timestamp, &fileset_id);
        Self {
            id,
            parents,
            branch,
            message,
            timestamp,
            fileset_id,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// abbreviated id for display
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(12)]
    }
}

/// commit id: XXH3-128 over fileset id, parents, branch, message, timestamp
fn derive_id(
    parents: &[String],
    branch: &str,
    message: &str,
    timestamp: &str,
    fileset_id: &str,
) -> String {
    let mut hasher = StreamHasher::new();
    hasher.update(fileset_id.as_bytes());
    for parent in parents {
        hasher.update(parent.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(branch.as_bytes());
    hasher.update(b"\0");
    hasher.update(message.as_bytes());
    hasher.update(b"\0");
    hasher.update(timestamp.as_bytes());
    hasher.finalize().to_hex()
}
