//! Unattended artifact growth loop.
//!
//! This crate drives a remote text-generation service round after round,
//! appending one generated record per round to a single output file until the
//! file reaches a target size. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (round state machine, topic draw,
//!   record formatting, progress math). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, credential, artifact file,
//!   HTTP transport, console output, sleeping). Isolated behind traits so tests
//!   can script them.
//!
//! [`agents`] wraps the two sub-agent roles, and [`coordinator`] sequences
//! them into the control loop.

pub mod agents;
pub mod coordinator;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
