//! Side-effecting operations: config store, git, GitHub CLI.

pub mod config_store;
pub mod gh;
pub mod git;
