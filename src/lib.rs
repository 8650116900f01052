//! bvc - block version control
//!
//! a git-like version tracker over a content-addressed block store. files
//! are split into content-defined chunks with a gear rolling hash, each
//! chunk is stored once under its XXH3-128 identity, and snapshots are
//! sorted lists of per-file entries (filesets) referenced by a commit DAG
//! with branches, merge, cherry-pick and reset.
//!
//! # Core concepts
//!
//! - **Block**: one chunk of file bytes, stored as `objects/<hash>.bin`
//! - **Entry**: a file path plus its ordered block references
//! - **Fileset**: a path-sorted list of entries, identified by a digest
//! - **Commit**: a fileset plus parents, branch, message, timestamp
//! - **Branch**: the single-line file `branches/<name>` holding a tip id
//!
//! # Example usage
//!
//! ```no_run
//! use bvc::{ops, Repo};
//! use std::path::Path;
//!
//! let repo = Repo::init(Path::new("/path/to/worktree")).unwrap();
//! ops::add(&repo, &[]).unwrap();
//! let commit = ops::commit(&repo, "initial commit", false).unwrap();
//! println!("{}", commit.short_id());
//! ```

mod config;
mod error;
mod hash;
mod ignore;
mod index;
mod repo;
mod restore;
mod util;

pub mod chunker;
pub mod history;
pub mod object;
pub mod ops;
pub mod refs;
pub mod scan;
pub mod types;
pub mod vfs;

pub use config::Config;
pub use error::{Error, IoResultExt, Result};
pub use hash::{BlockHash, StreamHasher};
pub use ignore::IgnoreRules;
pub use repo::Repo;
pub use restore::{restore_clean, restore_entries, restore_entry};
pub use types::{BlockCheck, BlockRef, BlockStatus, Commit, Entry, Fileset};
