//! Persistence of the last known reachable node list.
//!
//! The list survives restarts so a node can rejoin the mesh without any
//! configured referral. The format is an opaque bincode sequence of names,
//! sorted; readers tolerate a missing or corrupt file and report an empty
//! list instead of failing.

use super::types::NodeName;
use anyhow::Result;
use std::path::Path;

/// Reads the persisted node list. Any read or decode failure yields an
/// empty list.
pub fn read_nodes(path: &Path) -> Vec<NodeName> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return Vec::new(),
    };

    match bincode::deserialize::<Vec<String>>(&bytes) {
        Ok(names) => names.into_iter().map(NodeName).collect(),
        Err(e) => {
            tracing::warn!("Ignoring unreadable persisted node list: {}", e);
            Vec::new()
        }
    }
}

/// Writes the node list, creating the parent directory if needed. The
/// caller passes an already sorted list so the on-disk order is canonical.
pub fn write_nodes(path: &Path, names: &[NodeName]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let raw: Vec<&str> = names.iter().map(|name| name.as_str()).collect();
    let bytes = bincode::serialize(&raw)?;
    std::fs::write(path, bytes)?;

    Ok(())
}
