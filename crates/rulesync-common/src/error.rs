//! Error types for rulesync
//!
//! This module defines:
//! - `RuleSyncError`: Error enum shared by the topology builder, the node codec
//!   and the settings layer
//! - `ErrorCode`: Stable numeric codes for each error kind

use std::fmt::{Display, Formatter};

/// Application-specific error types
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleSyncError {
    #[error("invalid node identifier '{0}', expected nodeId:type[:name[:language]]")]
    InvalidIdentifier(String),

    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("invalid url '{0}': {1}")]
    InvalidUrl(String, String),

    /// For `ScriptNodeRegistry` implementations supplied by the embedding
    /// flow engine that fail to apply or drop a node
    #[error("registry error: {0}")]
    RegistryError(String),
}

impl RuleSyncError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RuleSyncError::InvalidIdentifier(_) => INVALID_IDENTIFIER,
            RuleSyncError::UnknownNodeType(_) => UNKNOWN_NODE_TYPE,
            RuleSyncError::MissingField(_) => PARAMETER_MISSING,
            RuleSyncError::ConfigError(_) => CONFIG_ERROR,
            RuleSyncError::InvalidUrl(..) => INVALID_URL,
            RuleSyncError::RegistryError(_) => REGISTRY_ERROR,
        }
    }
}

/// Result alias used across the rulesync crates
pub type Result<T> = std::result::Result<T, RuleSyncError>;

/// Error code structure
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ErrorCode {
    pub code: i32,
    pub message: &'static str,
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

pub const PARAMETER_MISSING: ErrorCode = ErrorCode {
    code: 10000,
    message: "parameter missing",
};

pub const CONFIG_ERROR: ErrorCode = ErrorCode {
    code: 10001,
    message: "configuration error",
};

pub const INVALID_URL: ErrorCode = ErrorCode {
    code: 10002,
    message: "invalid url",
};

pub const INVALID_IDENTIFIER: ErrorCode = ErrorCode {
    code: 20001,
    message: "invalid node identifier",
};

pub const UNKNOWN_NODE_TYPE: ErrorCode = ErrorCode {
    code: 20002,
    message: "unknown node type",
};

pub const REGISTRY_ERROR: ErrorCode = ErrorCode {
    code: 30000,
    message: "registry error",
};
