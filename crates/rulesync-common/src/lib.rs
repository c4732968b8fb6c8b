//! rulesync Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all rulesync components:
//! - Error types and error codes
//! - Blank-string helpers
//! - Common constants

pub mod error;
pub mod utils;

// Re-exports for convenience
pub use error::{ErrorCode, Result, RuleSyncError};
pub use utils::{is_blank, is_not_blank, non_blank};

/// Default Redis port used when the settings omit one
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Default database index for chain data
pub const DEFAULT_DATABASE: u32 = 0;

/// Default polling interval and start delay in seconds
pub const DEFAULT_POLLING_SECONDS: u64 = 60;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "RULESYNC";
