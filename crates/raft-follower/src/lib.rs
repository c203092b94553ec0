//! # raft-follower
//!
//! why: keep a non-leader node's log in step with the leader by pulling on a timer
//! relations: drives raft-log's LogStore, speaks raft-core's pull-logs messages
//! what: TimerManager, LeaderClient seam, the replication puller, FollowerNode shell

mod error;
mod node;
mod puller;
mod timer;
mod transport;

pub use error::{TimerError, TransportError};
pub use node::{pull_timer_name, FollowerNode};
pub use timer::TimerManager;
pub use transport::{
    JsonLeaderClient, LeaderAccessor, LeaderClient, LeaderHandle, LeadershipCheck, RpcChannel,
};
