use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;

/// Unique identifier for a node in the mesh.
///
/// The name is the node's advertised HTTP address rendered as a string
/// ("host:port"), so knowing a peer's name is enough to reach it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeName(pub String);

impl NodeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SocketAddr> for NodeName {
    fn from(addr: SocketAddr) -> Self {
        Self(addr.to_string())
    }
}

/// Opaque key/value map a node advertises once per ping cycle.
pub type Metadata = HashMap<String, serde_json::Value>;
