//! Common utilities module
//!
//! Shared helpers used by configuration and context loading.

/// Environment variable loading utilities
pub mod env_loader;

pub use env_loader::{load_env_string, try_load_env_parsed, EnvLoader};
