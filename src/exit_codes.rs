//! Stable exit codes for git-stream CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Validation or fatal error (undefined stream, wrong branch, schema
/// mismatch, git failure).
pub const INVALID: i32 = 1;
