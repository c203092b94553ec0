//! # raft-core
//!
//! why: shared vocabulary for the follower-side replication engine
//! relations: used by raft-log for the log store, raft-follower for the puller and wire
//! what: log entries, node identity, pull-logs messages and codec, config, errors

pub mod config;
pub mod error;
pub mod log;
pub mod message;
pub mod node;

pub use config::FollowerConfig;
pub use error::{CodecError, ConfigError};
pub use log::{LogEntry, LogIndex, Term};
pub use message::{Envelope, IngestItem, Opcode, PullLogsRequest, PullLogsResponse, PullStatus};
pub use node::NodeId;
