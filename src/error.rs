//! Error types for the expiry tool
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Expire Error Enum ==
/// Unified error type for the expiry tool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpireError {
    /// Could not open a connection to the store
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A store command failed at the transport or server level
    #[error("{command} failed: {reason}")]
    Command {
        command: &'static str,
        reason: String,
    },

    /// A store reply did not have the expected shape
    #[error("Failed to parse {command} response: {reason}")]
    Parse {
        command: &'static str,
        reason: String,
    },

    /// Run configuration rejected before scanning
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The stats task is no longer accepting requests
    #[error("Stats task unavailable")]
    StatsUnavailable,

    /// Consecutive SCAN failures exceeded the configured cap
    #[error("SCAN failed {attempts} times in a row at cursor {cursor}")]
    ScanRetriesExhausted { attempts: u32, cursor: u64 },
}

impl ExpireError {
    /// Shorthand for a failed store command.
    pub fn command(command: &'static str, reason: impl ToString) -> Self {
        ExpireError::Command {
            command,
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a malformed store reply.
    pub fn parse(command: &'static str, reason: impl ToString) -> Self {
        ExpireError::Parse {
            command,
            reason: reason.to_string(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the expiry tool.
pub type Result<T> = std::result::Result<T, ExpireError>;
