//! Domain logic - pure business rules independent of git operations

pub mod bump;
pub mod commit;
pub mod tag;
pub mod version;

pub use bump::{BumpRules, BumpType};
pub use commit::Commit;
pub use tag::Tag;
pub use version::Version;
