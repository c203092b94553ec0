//! # transport
//!
//! why: keep the puller independent of how rpcs actually reach the leader
//! relations: LeaderClient is called by the puller; JsonLeaderClient frames with raft-core's codec
//! what: LeaderClient and RpcChannel traits, accessor aliases, JsonLeaderClient adapter

use crate::error::TransportError;
use async_trait::async_trait;
use raft_core::message::{decode_response, encode_request};
use raft_core::{PullLogsRequest, PullLogsResponse};
use std::sync::Arc;

/// RPC handle to the current leader
#[async_trait]
pub trait LeaderClient: Send + Sync {
    async fn pull_logs(&self, request: PullLogsRequest) -> Result<PullLogsResponse, TransportError>;
}

pub type LeaderHandle = Arc<dyn LeaderClient>;

/// Resolves the current leader's handle; `None` when no leader is known or reachable
pub type LeaderAccessor = Arc<dyn Fn() -> Option<LeaderHandle> + Send + Sync>;

/// Reports whether this node currently holds leadership (diagnostics only)
pub type LeadershipCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// Raw request/response byte channel to one peer
#[async_trait]
pub trait RpcChannel: Send + Sync {
    async fn call(&self, frame: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}

/// LeaderClient that speaks the json pull-logs wire format over an RpcChannel
pub struct JsonLeaderClient<C> {
    channel: C,
}

impl<C: RpcChannel> JsonLeaderClient<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl<C: RpcChannel> LeaderClient for JsonLeaderClient<C> {
    async fn pull_logs(
        &self,
        request: PullLogsRequest,
    ) -> Result<PullLogsResponse, TransportError> {
        let frame = encode_request(&request)?;
        let reply = self.channel.call(frame).await?;
        Ok(decode_response(&reply)?)
    }
}
