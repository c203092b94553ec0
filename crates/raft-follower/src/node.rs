//! # node
//!
//! why: give the hosting runtime a small lifecycle surface over follower replication
//! relations: owns the LogStore and Puller, registers the pull timer with a shared TimerManager
//! what: FollowerNode with run / stop / is_running / ingest / advance_commit

use crate::puller::Puller;
use crate::timer::TimerManager;
use crate::transport::{LeaderAccessor, LeaderHandle, LeadershipCheck};
use parking_lot::Mutex;
use raft_core::{ConfigError, FollowerConfig, LogEntry, LogIndex, NodeId, Term};
use raft_log::{Ingested, LogError, LogStore, StateMachine};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Name a node's pull cycle is registered under in the TimerManager.
///
/// Carries the node id so several nodes can share one manager.
pub fn pull_timer_name(id: NodeId) -> String {
    format!("pull_logs/{id}")
}

/// Replication engine of a node that is not the leader.
///
/// All log state sits behind one mutex shared by the push path
/// ([`FollowerNode::ingest`]) and the timer-driven puller.
pub struct FollowerNode {
    id: NodeId,
    pull_interval: Duration,
    store: Arc<Mutex<LogStore>>,
    timers: Arc<TimerManager>,
    puller: Arc<Puller>,
}

impl FollowerNode {
    /// Build the node and register its pull timer (not started).
    pub fn new<L, F>(
        id: NodeId,
        config: FollowerConfig,
        state_machine: Arc<dyn StateMachine>,
        is_leader: L,
        leader: F,
        timers: Arc<TimerManager>,
    ) -> Result<Self, ConfigError>
    where
        L: Fn() -> bool + Send + Sync + 'static,
        F: Fn() -> Option<LeaderHandle> + Send + Sync + 'static,
    {
        config.validate()?;

        let store = Arc::new(Mutex::new(LogStore::new(state_machine)));
        let leader: LeaderAccessor = Arc::new(leader);
        let is_leader: LeadershipCheck = Arc::new(is_leader);
        let puller = Arc::new(Puller {
            node_id: id,
            store: store.clone(),
            leader,
            is_leader,
            timers: timers.clone(),
            timer_name: pull_timer_name(id),
            pull_timeout: config.pull_timeout(),
            pulling: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            halted: AtomicBool::new(false),
        });

        // weak, so the timer does not keep a dropped node alive
        let weak = Arc::downgrade(&puller);
        timers.register(&puller.timer_name, move || {
            if let Some(puller) = weak.upgrade() {
                puller.fire();
            }
        });

        Ok(Self {
            id,
            pull_interval: config.pull_interval(),
            store,
            timers,
            puller,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn timer_name(&self) -> &str {
        &self.puller.timer_name
    }

    /// Begin periodic pulling. Refused once replication has halted.
    pub fn run(&self) {
        if self.is_halted() {
            error!(node = %self.id, "replication halted, not starting puller");
            return;
        }
        match self.timers.start(self.timer_name(), self.pull_interval) {
            Ok(()) => info!(node = %self.id, interval = ?self.pull_interval, "puller running"),
            Err(err) => warn!(node = %self.id, error = %err, "failed to start puller"),
        }
    }

    /// Cease periodic pulling. A request already in flight may still land.
    pub fn stop(&self) {
        match self.timers.stop(self.timer_name()) {
            Ok(()) => info!(node = %self.id, "puller stopped"),
            Err(err) => warn!(node = %self.id, error = %err, "failed to stop puller"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.timers.is_running(self.timer_name())
    }

    /// Whether the last pull cycle found a leader to ask. Diagnostic only.
    pub fn is_pulling(&self) -> bool {
        self.puller.pulling.load(Ordering::Acquire)
    }

    /// Whether an invariant violation stopped replication
    pub fn is_halted(&self) -> bool {
        self.puller.halted.load(Ordering::Acquire)
    }

    /// Run one pull cycle now, outside the timer schedule.
    pub fn pull_now(&self) {
        self.puller.fire();
    }

    /// Accept an entry delivered outside the pull path (e.g. leader push).
    pub fn ingest(
        &self,
        committed_hint: Option<LogIndex>,
        preceding_term: Term,
        entry: LogEntry,
    ) -> Result<Ingested, LogError> {
        let result = self.store.lock().ingest(committed_hint, preceding_term, entry);
        if let Err(err) = &result {
            self.puller.halt(err);
        }
        result
    }

    pub fn advance_commit(&self, committed: Option<LogIndex>) -> Result<(), LogError> {
        let result = self.store.lock().advance_commit(committed);
        if let Err(err) = &result {
            self.puller.halt(err);
        }
        result
    }

    pub fn next_index(&self) -> LogIndex {
        self.store.lock().next_index()
    }

    pub fn committed_index(&self) -> Option<LogIndex> {
        self.store.lock().committed_index()
    }

    /// Inspect the log under the node's lock
    pub fn with_log<R>(&self, f: impl FnOnce(&LogStore) -> R) -> R {
        f(&self.store.lock())
    }
}

impl Drop for FollowerNode {
    fn drop(&mut self) {
        let _ = self.timers.stop(self.timer_name());
    }
}
