// Re-export core modules for consumers of the service crate
pub use relaycore::{store, types};

pub mod auth;
pub mod config;
pub mod directory;
