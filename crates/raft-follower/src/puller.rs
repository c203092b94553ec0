//! # puller
//!
//! why: ask the leader for whatever this node is missing, once per timer tick
//! relations: fired by TimerManager, reads/writes raft-log's LogStore under the node's lock
//! what: Puller firing (leader lookup + request build), response handling, halting

use crate::error::TransportError;
use crate::timer::TimerManager;
use crate::transport::{LeaderAccessor, LeadershipCheck};
use parking_lot::Mutex;
use raft_core::{NodeId, PullLogsRequest, PullLogsResponse, PullStatus};
use raft_log::{LogError, LogStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub(crate) struct Puller {
    pub(crate) node_id: NodeId,
    pub(crate) store: Arc<Mutex<LogStore>>,
    pub(crate) leader: LeaderAccessor,
    pub(crate) is_leader: LeadershipCheck,
    pub(crate) timers: Arc<TimerManager>,
    pub(crate) timer_name: String,
    pub(crate) pull_timeout: Duration,
    /// diagnostic: last firing reached a leader
    pub(crate) pulling: AtomicBool,
    pub(crate) in_flight: AtomicBool,
    pub(crate) halted: AtomicBool,
}

impl Puller {
    /// One pull cycle. Never blocks on the network; the request runs on its
    /// own task and re-enters the log lock when it completes.
    pub(crate) fn fire(self: &Arc<Self>) {
        if self.halted.load(Ordering::Acquire) {
            return;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(node = %self.node_id, "previous pull still in flight");
            return;
        }

        let (client, request) = {
            let store = self.store.lock();
            let Some(client) = (self.leader)() else {
                info!(
                    node = %self.node_id,
                    is_leader = (self.is_leader)(),
                    "failed to get leader rpc client"
                );
                self.pulling.store(false, Ordering::Release);
                self.in_flight.store(false, Ordering::Release);
                return;
            };
            (client, PullLogsRequest::new(self.node_id, store.next_index()))
        };
        self.pulling.store(true, Ordering::Release);

        let guard = InFlight(Arc::clone(self));
        let next_index = request.next_index;
        self.timers.runtime().spawn(async move {
            let puller = &guard.0;
            debug!(node = %puller.node_id, next_index, "pulling logs");
            let pull = client.pull_logs(request);
            let result = match tokio::time::timeout(puller.pull_timeout, pull).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(puller.pull_timeout)),
            };
            puller.complete(result);
        });
    }

    fn complete(&self, result: Result<PullLogsResponse, TransportError>) {
        let response = match result {
            Ok(response) if response.status == PullStatus::Ok => response,
            Ok(response) => {
                let err = TransportError::Rejected {
                    status: response.status,
                };
                warn!(node = %self.node_id, error = %err, "pull logs failed");
                return;
            }
            Err(err) => {
                warn!(node = %self.node_id, error = %err, "pull logs failed");
                return;
            }
        };

        let mut store = self.store.lock();
        if response.entries.is_empty() {
            // nothing new; still learn the leader's commit if our tail matches its history
            let next_index = store.next_index();
            let Some(tail) = next_index.checked_sub(1) else {
                return;
            };
            if store.term_at(tail) != Some(response.prev_log_term) {
                debug!(index = tail, "tail term differs from leader, not committing");
                return;
            }
            let committed = response.committed_index.map(|c| c.min(tail));
            if let Err(err) = store.advance_commit(committed) {
                drop(store);
                self.halt(&err);
            }
            return;
        }

        for item in response.into_ingest_items() {
            let index = item.entry.index;
            // the leader's commit only speaks for history we share with it
            let matches = index == 0 || store.term_at(index - 1) == Some(item.preceding_term);
            let hint = if matches { item.committed_hint } else { None };
            match store.ingest(hint, item.preceding_term, item.entry) {
                Ok(outcome) if outcome.gap => {
                    // the rest of the batch sits on an unverified predecessor
                    debug!(index, next_index = store.next_index(), "gap in pulled batch");
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    drop(store);
                    self.halt(&err);
                    return;
                }
            }
        }
    }

    /// Stop replicating after an invariant violation; the log can no longer be trusted.
    pub(crate) fn halt(&self, err: &LogError) {
        error!(
            node = %self.node_id,
            error = %err,
            "log invariant violated, halting replication"
        );
        self.halted.store(true, Ordering::Release);
        if let Err(err) = self.timers.stop(&self.timer_name) {
            warn!(error = %err, "failed to stop pull timer");
        }
    }
}

/// Clears the in-flight flag when the request task ends, however it ends.
struct InFlight(Arc<Puller>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}
