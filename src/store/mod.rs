//! Request Store Module
//!
//! The per-node request state: which requests this node originated and has
//! not yet placed (pending), which requests it is currently executing
//! (handling), and the mutable base busyness that biases its scheduling
//! score without reference to actual load.
//!
//! The store also computes the two scheduling signals derived from that
//! state: `acceptance_priority` (the score a node reports when polled for a
//! candidate request; ineligibility is `None`) and `busyness_weight` (what
//! a handled request contributes to the node's load metric).
//!
//! Remote peers mutate the store only through the narrow RPC surface in
//! `handlers`: score polls, delegation pushes into the handling list, and
//! removal at completion.

pub mod handlers;
pub mod protocol;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;
