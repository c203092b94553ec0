//! # raft-log
//!
//! why: hold the follower's copy of the leader's log and apply what is committed
//! relations: fed by raft-follower's puller and push path, delivers to a StateMachine
//! what: LogStore (ingest, conflict truncation, commit/apply), StateMachine trait, LogError

mod error;
mod state_machine;
mod store;

pub use error::LogError;
pub use state_machine::StateMachine;
pub use store::{Ingested, LogStore};
