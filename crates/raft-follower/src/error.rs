use raft_core::{CodecError, PullStatus};
use std::time::Duration;
use thiserror::Error;

/// A pull attempt that did not produce usable entries.
///
/// Always recoverable: the next timer firing retries from the same cursor.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("leader unreachable: {0}")]
    Unreachable(String),

    #[error("pull request timed out after {0:?}")]
    Timeout(Duration),

    #[error("leader rejected pull: {status:?}")]
    Rejected { status: PullStatus },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("timer {name:?} is not registered")]
    Unregistered { name: String },

    #[error("timer {name:?} needs a non-zero interval")]
    ZeroInterval { name: String },

    #[error("no tokio runtime available to drive timers")]
    NoRuntime,
}
