//! I/O helpers for the loop.

pub mod artifact;
pub mod config;
pub mod console;
pub mod credential;
pub mod generator;
pub mod prompt;
pub mod sleep;
