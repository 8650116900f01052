//! high-level operations, one command each
//!
//! these orchestrate the lower layers; the CLI in `main.rs` is a thin
//! wrapper over them and the library API re-exports them.

mod add;
mod branch;
mod checkout;
mod cherry_pick;
mod commit;
mod log;
mod merge;
mod repair;
mod reset;
mod status;
mod verify;

pub use add::add;
pub use branch::{branch_create, branch_list};
pub use checkout::checkout;
pub use cherry_pick::cherry_pick;
pub use commit::commit;
pub use log::log;
pub use merge::{merge, MergeOutcome};
pub use repair::{repair, RepairOutcome};
pub use reset::{reset, ResetMode};
pub use status::{status, Status};
pub use verify::{shared_blocks, verify_all, verify_stream};
