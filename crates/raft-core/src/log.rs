//! # log
//!
//! why: describe the unit of replication the follower receives from its leader
//! relations: stored by raft-log, carried in pull-logs responses (message.rs)
//! what: LogEntry struct, index and term aliases

use serde::{Deserialize, Serialize};

/// Position of an entry in the replicated log (0-indexed)
pub type LogIndex = u64;

/// Leadership epoch that produced an entry
pub type Term = u64;

/// A single entry in the replicated log
///
/// Entries are immutable once ingested; the only way one changes is being
/// replaced wholesale during conflict truncation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The term when this entry was created
    pub term: Term,
    /// The index of this entry in the log
    pub index: LogIndex,
    /// Opaque application payload, handed verbatim to the state machine
    pub payload: Vec<u8>,
}

impl LogEntry {
    /// Create a new log entry
    pub fn new(term: Term, index: LogIndex, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            term,
            index,
            payload: payload.into(),
        }
    }
}
