//! # error
//!
//! why: typed failures for the pieces of raft-core that can fail
//! relations: CodecError wrapped by raft-follower's TransportError
//! what: CodecError, ConfigError

use crate::message::Opcode;
use thiserror::Error;

/// Failure to frame or parse a pull-logs message
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected opcode: expected {expected:?}, got {actual:?}")]
    UnexpectedOpcode { expected: Opcode, actual: Opcode },
}

/// Rejected follower configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("pull interval must be greater than zero")]
    ZeroInterval,

    #[error("pull timeout must be greater than zero")]
    ZeroTimeout,
}
