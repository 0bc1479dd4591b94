//! Node-to-node RPC client.
//!
//! The server side of the RPC surface lives in each module's `handlers`;
//! this module holds the reqwest-based client that consumes it.

pub mod client;
