//! Cross-source identity resolution.

pub mod resolver;
pub mod scoring;
pub mod types;

pub use resolver::{IdentityResolver, RegistrySearch};
pub use types::*;

pub const TARGET_IDENTITY: &str = "identity";
