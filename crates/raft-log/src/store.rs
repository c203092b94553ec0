//! # store
//!
//! why: accept entries from the leader, discard divergent history, apply commits in order
//! relations: owned by raft-follower behind a single mutex, applies to a StateMachine
//! what: LogStore with ingest (log-matching check + conflict truncation) and advance_commit

use crate::error::LogError;
use crate::state_machine::StateMachine;
use raft_core::{LogEntry, LogIndex, Term};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// What a single ingest observed.
///
/// Divergence is expected and self-correcting, so it is reported here
/// rather than as an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ingested {
    /// An entry already existed at this index
    pub duplicate: bool,
    /// The predecessor was absent or had a different term; the cursor was rewound
    pub gap: bool,
    /// A different-term entry at this index was truncated along with its suffix
    pub conflict: bool,
}

/// Follower-side log: entries by index, the replication cursor and the commit boundary.
///
/// Not synchronized; the owner keeps all three fields under one lock.
pub struct LogStore {
    entries: BTreeMap<LogIndex, LogEntry>,
    /// Next index to ask the leader for
    next_index: LogIndex,
    /// Highest applied index; `None` until something commits
    committed_index: Option<LogIndex>,
    state_machine: Arc<dyn StateMachine>,
}

impl LogStore {
    pub fn new(state_machine: Arc<dyn StateMachine>) -> Self {
        Self {
            entries: BTreeMap::new(),
            next_index: 0,
            committed_index: None,
            state_machine,
        }
    }

    pub fn next_index(&self) -> LogIndex {
        self.next_index
    }

    pub fn committed_index(&self) -> Option<LogIndex> {
        self.committed_index
    }

    pub fn entry(&self, index: LogIndex) -> Option<&LogEntry> {
        self.entries.get(&index)
    }

    pub fn contains(&self, index: LogIndex) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn term_at(&self, index: LogIndex) -> Option<Term> {
        self.entries.get(&index).map(|e| e.term)
    }

    /// Highest stored index, contiguous or not
    pub fn last_index(&self) -> Option<LogIndex> {
        self.entries.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Accept one entry from the leader.
    ///
    /// `preceding_term` is the leader's term for `entry.index - 1`, and
    /// `committed_hint` the leader's commit index at send time.
    ///
    /// When the predecessor does not match, the entry is still stored but the
    /// cursor is left pointing at the predecessor so the next pull re-requests
    /// it. The commit step runs either way.
    pub fn ingest(
        &mut self,
        committed_hint: Option<LogIndex>,
        preceding_term: Term,
        entry: LogEntry,
    ) -> Result<Ingested, LogError> {
        let index = entry.index;
        let mut outcome = Ingested::default();

        let existing_term = self.term_at(index);
        if existing_term.is_some() {
            debug!(index, "duplicated log index");
            outcome.duplicate = true;
        }

        // committed entries are immutable; refuse before touching anything
        if existing_term.is_some_and(|term| term != entry.term) {
            if let Some(committed) = self.committed_index.filter(|&c| index <= c) {
                error!(index, committed, "conflict below commit boundary");
                return Err(LogError::TruncateCommitted { index, committed });
            }
        }

        if index > 0 {
            let pre_index = index - 1;
            if self.term_at(pre_index) != Some(preceding_term) {
                debug!(index = pre_index, "lack of log index");
                outcome.gap = true;
            }
        }

        if existing_term.is_some_and(|term| term != entry.term) {
            self.truncate_from(index);
            self.next_index = index;
            debug!(index, "conflict at log index");
            outcome.conflict = true;
        }

        // a same-term redelivery of a committed entry must not rewrite its payload
        let committed_copy = self.committed_index.is_some_and(|c| index <= c);
        if !(outcome.duplicate && committed_copy) {
            self.entries.insert(index, entry);
        }

        if outcome.gap {
            self.next_index = index - 1;
        } else if index >= self.next_index {
            self.next_index = index + 1;
        }

        self.advance_commit(committed_hint)?;
        Ok(outcome)
    }

    /// Drop the contiguous run of entries starting at `index`.
    ///
    /// Stops at the first missing index; nothing past a hole can belong to
    /// the same divergent suffix.
    fn truncate_from(&mut self, index: LogIndex) {
        let mut cursor = index;
        while self.entries.remove(&cursor).is_some() {
            cursor += 1;
        }
    }

    /// Move the commit boundary to `new_committed` and apply everything newly covered.
    ///
    /// Stale or duplicate reports are no-ops. Every index in the new range
    /// is checked before anything is applied, so a missing entry leaves the
    /// store exactly as it was.
    pub fn advance_commit(&mut self, new_committed: Option<LogIndex>) -> Result<(), LogError> {
        let Some(target) = new_committed else {
            return Ok(());
        };
        if self.committed_index.is_some_and(|c| target <= c) {
            return Ok(());
        }

        let first = self.committed_index.map_or(0, |c| c + 1);
        if let Some(missing) = (first..=target).find(|i| !self.entries.contains_key(i)) {
            error!(index = missing, committed = target, "committed entry missing from log");
            return Err(LogError::MissingEntry {
                index: missing,
                committed: target,
            });
        }

        for (&index, entry) in self.entries.range(first..=target) {
            trace!(index, term = entry.term, "applying entry");
            self.state_machine.apply(&entry.payload);
        }
        self.committed_index = Some(target);
        Ok(())
    }
}

impl fmt::Debug for LogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStore")
            .field("len", &self.entries.len())
            .field("next_index", &self.next_index)
            .field("committed_index", &self.committed_index)
            .finish()
    }
}
