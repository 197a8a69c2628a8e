//! Pure, deterministic logic: config model, stream records, naming, templates.

pub mod config;
pub mod naming;
pub mod record;
pub mod template;
