//! National provider registry collaborator.

pub mod client;
pub mod types;

pub use client::RegistryClient;
pub use types::*;
