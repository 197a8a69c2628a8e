//! Stream-based development branch manager.
//!
//! A *stream* is a local development branch tracked against one or more
//! upstream parent branches, recorded in a single user-level YAML file
//! (`~/.git-streams.yml`). The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (config model, stream records,
//!   naming rules, delivery templates). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config store, git, GitHub CLI).
//!   Isolated to keep external-tool interaction behind typed wrappers.
//!
//! Orchestration modules ([`create`], [`update`], [`deliver`], [`remove`])
//! coordinate core logic with I/O to implement CLI commands; [`context`]
//! resolves the stream owning the current working directory.

pub mod context;
pub mod core;
pub mod create;
pub mod deliver;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod remove;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod update;
