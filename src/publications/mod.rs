//! Literature-index search and authorship disambiguation.

pub mod client;
pub mod matcher;
pub mod scoring;
pub mod types;

pub use client::LiteratureClient;
pub use matcher::{LiteratureIndex, PublicationMatcher};
pub use types::*;

pub const TARGET_MATCH: &str = "publication_match";
