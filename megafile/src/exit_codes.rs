//! Stable exit codes for the `megafile` binary.

/// The artifact reached its target size.
pub const OK: i32 = 0;
/// Missing or empty credential, invalid configuration, or a fatal artifact I/O error.
pub const INVALID: i32 = 1;
