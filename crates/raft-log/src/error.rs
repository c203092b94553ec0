use raft_core::LogIndex;
use thiserror::Error;

/// Invariant violations detected by the log store.
///
/// These denote a broken upstream (leader or caller), never a transient
/// condition; the store refuses the operation and leaves its state untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LogError {
    #[error("entry {index} is missing but required to commit up to {committed}")]
    MissingEntry {
        index: LogIndex,
        committed: LogIndex,
    },

    #[error(
        "conflict at index {index} would truncate committed entries (committed up to {committed})"
    )]
    TruncateCommitted {
        index: LogIndex,
        committed: LogIndex,
    },
}
