//! on-disk object I/O: blocks, filesets, commit records

pub mod block;
pub mod commit;
pub mod fileset;

pub use block::{
    block_path, clean_temp, read_block, verify_block, verify_blocks, write_block,
    write_entry_blocks,
};
pub use commit::{commit_exists, list_commit_ids, read_commit, write_commit};
pub use fileset::{list_filesets, read_fileset, save_fileset, write_fileset};
