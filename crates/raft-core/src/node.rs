//! # node
//!
//! why: identify this node to the leader so it can track follower progress
//! relations: encoded into PullLogsRequest (message.rs), owned by raft-follower
//! what: NodeId newtype with a fixed binary encoding

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a cluster node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Width of the binary identity in bytes
    pub const BINARY_LEN: usize = 8;

    /// Binary identity sent on the wire (big endian)
    pub fn to_binary(&self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }

    /// Parse a binary identity; `None` unless exactly `BINARY_LEN` bytes
    pub fn from_binary(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; Self::BINARY_LEN] = bytes.try_into().ok()?;
        Some(Self(u64::from_be_bytes(raw)))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_identity_is_big_endian() {
        assert_eq!(NodeId(1).to_binary(), vec![0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(NodeId::from_binary(&NodeId(258).to_binary()), Some(NodeId(258)));
    }

    #[test]
    fn from_binary_rejects_wrong_length() {
        assert_eq!(NodeId::from_binary(&[1, 2, 3]), None);
        assert_eq!(NodeId::from_binary(&[0; 9]), None);
    }
}
