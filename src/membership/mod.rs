//! Membership & Discovery Module
//!
//! Maintains each node's view of the mesh and keeps it converging:
//!
//! - **`registry`**: the authoritative local map of node name to advertised
//!   metadata, always containing this node itself.
//! - **`ping`**: periodic liveness probing over the union of persisted
//!   nodes, current registry, and configured referrals; rebuilds the peer
//!   map from responders and persists it on change.
//! - **`sync`**: periodic union-merge of peer registries so membership
//!   spreads transitively (A learns of C via B).
//! - **`persist`**: the on-disk node list that lets a restarted node rejoin
//!   without any configured referral.
//!
//! Membership is eventually consistent by design: ping removes the
//! unreachable, sync adds the transitively known, and neither blocks the
//! registry on network I/O.

pub mod handlers;
pub mod persist;
pub mod ping;
pub mod protocol;
pub mod registry;
pub mod sync;
pub mod types;
