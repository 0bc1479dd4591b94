//! Scheduling & Execution Module
//!
//! Moves requests from "pending somewhere" to "answered at the caller":
//!
//! 1. **Assignment** (`assign`): the originator polls every known node for
//!    its acceptance priority on each pending request and hands the request
//!    to the maximum — itself via a local pick, a peer via delegation.
//! 2. **Execution** (`handle`): the chosen node spawns one worker per
//!    handled request; the worker resolves the callable in `registry`,
//!    invokes it, and ships the result envelope back.
//! 3. **Completion** (`caller`): the originator's response router completes
//!    the oneshot channel the caller is blocked on; the request disappears
//!    from both ends.
//!
//! There is no mesh-level retry or cancellation: an RPC that fails leaves
//! the request pending for the next cycle, and work whose caller timed out
//! runs to completion with its response dropped on delivery.

pub mod assign;
pub mod caller;
pub mod handle;
pub mod handlers;
pub mod protocol;
pub mod registry;

#[cfg(test)]
mod tests;
