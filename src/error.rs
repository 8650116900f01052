use std::path::PathBuf;

use crate::hash::BlockHash;

/// error type for bvc operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("repository not found at {0} (missing HEAD)")]
    NoRepo(PathBuf),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("branch already exists: {0}")]
    BranchExists(String),

    #[error("invalid branch name: {0}")]
    InvalidBranch(String),

    #[error("branch '{0}' has no commits yet")]
    EmptyBranch(String),

    #[error("commit not found: {0}")]
    CommitNotFound(String),

    #[error("commit id collision: {0}")]
    CommitIdCollision(String),

    #[error("fileset not found: {0}")]
    FilesetNotFound(String),

    #[error("block missing from store: {0}")]
    BlockMissing(BlockHash),

    #[error("block damaged (bytes do not match hash): {0}")]
    BlockDamaged(BlockHash),

    #[error("block {hash} is unrecoverable: no referencing file still carries its bytes")]
    BlockLost { hash: BlockHash },

    #[error("integrity check failed: {0} bad block(s)")]
    IntegrityFailed(usize),

    #[error("path not found in working tree: {0}")]
    PathNotFound(PathBuf),

    #[error("malformed HEAD: expected 'ref: branches/<name>', got {0:?}")]
    BadHead(String),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),

    #[error("fileset has no id or no files; refusing to save")]
    EmptyFileset,

    #[error("nothing staged; use --allow-empty to commit anyway")]
    NothingStaged,

    #[error("commit message must not be empty")]
    EmptyMessage,

    #[error("cannot merge branch '{0}' into itself")]
    MergeIntoSelf(String),

    #[error("no common ancestor between '{us}' and '{them}'")]
    NoMergeBase { us: String, them: String },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid ignore pattern {pattern:?}: {message}")]
    IgnorePattern { pattern: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// true when the underlying cause is a missing file or directory
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NoRepo(_)
            | Error::BranchNotFound(_)
            | Error::CommitNotFound(_)
            | Error::FilesetNotFound(_)
            | Error::BlockMissing(_)
            | Error::PathNotFound(_) => true,
            Error::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
