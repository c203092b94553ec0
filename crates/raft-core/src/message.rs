//! # message
//!
//! why: define the pull-logs rpc a follower sends to its leader, and its reply
//! relations: built by raft-follower's puller, payload entries fed to raft-log
//! what: Opcode, Envelope, PullLogsRequest, PullLogsResponse, json codec

use crate::error::CodecError;
use crate::log::{LogEntry, LogIndex, Term};
use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Operation carried by an rpc envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opcode {
    /// Ask the leader for entries starting at a given index
    #[serde(rename = "request_pull_logs")]
    PullLogs,
    /// Any opcode this node does not speak
    #[serde(other)]
    Unknown,
}

/// Request framing: an opcode plus its json payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub opcode: Opcode,
    pub payload: serde_json::Value,
}

/// Follower -> leader: "send me entries from `next_index` on"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullLogsRequest {
    /// Binary identity of the requesting node (see `NodeId::to_binary`)
    pub node_id: Vec<u8>,
    /// First index the follower is missing
    pub next_index: LogIndex,
}

impl PullLogsRequest {
    pub fn new(node_id: NodeId, next_index: LogIndex) -> Self {
        Self {
            node_id: node_id.to_binary(),
            next_index,
        }
    }

    /// Decoded requester identity, if the binary form is well formed
    pub fn requester(&self) -> Option<NodeId> {
        NodeId::from_binary(&self.node_id)
    }
}

/// Outcome code of a pull-logs call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullStatus {
    Ok,
    /// The callee is not (or no longer) the leader
    NotLeader,
    /// The leader could not serve the request right now
    Unavailable,
}

/// Leader -> follower: a contiguous batch plus the leader's commit boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullLogsResponse {
    pub status: PullStatus,
    /// Leader's committed index; `None` when nothing is committed yet
    pub committed_index: Option<LogIndex>,
    /// Term of the entry just before `entries[0]` (ignored when it starts at 0)
    pub prev_log_term: Term,
    pub entries: Vec<LogEntry>,
}

/// One unit of work for the log store's ingest entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestItem {
    pub committed_hint: Option<LogIndex>,
    pub preceding_term: Term,
    pub entry: LogEntry,
}

impl PullLogsResponse {
    pub fn ok(
        committed_index: Option<LogIndex>,
        prev_log_term: Term,
        entries: Vec<LogEntry>,
    ) -> Self {
        Self {
            status: PullStatus::Ok,
            committed_index,
            prev_log_term,
            entries,
        }
    }

    pub fn failed(status: PullStatus) -> Self {
        Self {
            status,
            committed_index: None,
            prev_log_term: 0,
            entries: Vec::new(),
        }
    }

    /// Expand the batch into ingest calls, in index order.
    ///
    /// The first entry is checked against `prev_log_term`; every later entry
    /// is checked against the term of the batch entry before it. The commit
    /// hint is capped at each entry's own index, since a follower only knows
    /// an index is committed once it holds that index.
    pub fn into_ingest_items(self) -> Vec<IngestItem> {
        let mut entries = self.entries;
        entries.sort_by_key(|e| e.index);

        let mut preceding_term = self.prev_log_term;
        entries
            .into_iter()
            .map(|entry| {
                let item = IngestItem {
                    committed_hint: self.committed_index.map(|c| c.min(entry.index)),
                    preceding_term,
                    entry,
                };
                preceding_term = item.entry.term;
                item
            })
            .collect()
    }
}

// -- codec --

pub fn encode_request(request: &PullLogsRequest) -> Result<Vec<u8>, CodecError> {
    let envelope = Envelope {
        opcode: Opcode::PullLogs,
        payload: serde_json::to_value(request)?,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

pub fn decode_request(bytes: &[u8]) -> Result<PullLogsRequest, CodecError> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    if envelope.opcode != Opcode::PullLogs {
        return Err(CodecError::UnexpectedOpcode {
            expected: Opcode::PullLogs,
            actual: envelope.opcode,
        });
    }
    Ok(serde_json::from_value(envelope.payload)?)
}

pub fn encode_response(response: &PullLogsResponse) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(response)?)
}

pub fn decode_response(bytes: &[u8]) -> Result<PullLogsResponse, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}
