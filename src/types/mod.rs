mod check;
mod commit;
mod entry;
mod fileset;

pub use check::{BlockCheck, BlockStatus};
pub use commit::Commit;
pub use entry::{BlockRef, Entry};
pub use fileset::Fileset;
