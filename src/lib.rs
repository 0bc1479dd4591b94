//! Request Mesh Library
//!
//! This library crate implements a peer-to-peer mesh for balancing remote
//! function invocations across a set of cooperating nodes. Every node runs
//! the same software: it can originate requests (asking the mesh to compute
//! `module.function(args)`) and execute requests on behalf of other nodes.
//! Results flow back to the originating caller directly.
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`membership`**: The cluster coordination layer. A node registry plus
//!   periodic ping (liveness + metadata exchange + seed persistence) and
//!   sync (transitive registry merge) tasks.
//! - **`store`**: The request state layer. Tracks requests this node
//!   originated (pending) and requests it is executing (handling), and
//!   computes the busyness and acceptance-priority scheduling signals.
//! - **`executor`**: The scheduling and execution engine. Assigns each
//!   pending request to the most eager, least busy capable node, runs
//!   assigned requests through registered callables, and ships results back
//!   to the waiting caller.
//! - **`rpc`**: The HTTP client side of the node-to-node RPC surface.
//! - **`config`**: Process-wide configuration (referrals, metadata, cost
//!   rules, task latencies).

pub mod config;
pub mod executor;
pub mod membership;
pub mod node;
pub mod rpc;
pub mod store;
pub mod supervisor;
