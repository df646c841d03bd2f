//! Deterministic, pure logic shared by the loop.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests. Randomness is
//! injected by the caller.

pub mod catalog;
pub mod machine;
pub mod progress;
pub mod record;
pub mod types;
