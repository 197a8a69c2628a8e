//! Tool configuration model for `~/.git-streams.yml`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::record::StreamRecord;

/// Expected `schema` value in the configuration file.
pub const CONFIG_SCHEMA: u32 = 1;
/// `schema` value stamped on newly created stream records.
pub const STREAM_SCHEMA: u32 = 1;

/// Keys that `config --set` must refuse to change.
pub const READONLY_KEYS: [&str; 2] = ["schema", "streams"];

/// User-level configuration: tool defaults plus the stream mapping.
///
/// Stored flat in YAML: the default option values sit next to `schema` and
/// `streams` at the document top level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamsConfig {
    pub schema: u32,
    /// Parent branch used by `create` when `-p` is not given.
    pub default_parent: String,
    /// Prefix used to normalize bare repo names into SSH clone URLs.
    pub default_remote: String,
    /// Reviewer for `deliver --create-pr` when the record has no override.
    pub default_pr_reviewer: String,
    /// Template for delivery branch names (`%t` ticket, `%d` description).
    pub delivery_branch_template: String,
    /// Prefix for stream branch names.
    pub stream_branch_prefix: String,
    /// Directory under which stream working copies are cloned.
    pub stream_home: PathBuf,
    pub streams: BTreeMap<String, StreamRecord>,
}

impl StreamsConfig {
    /// Refuse to operate on a config file written at another schema version.
    pub fn validate_schema(&self) -> Result<()> {
        if self.schema != CONFIG_SCHEMA {
            return Err(anyhow!(
                "Configuration at wrong schema: {}; expected: {}",
                self.schema,
                CONFIG_SCHEMA
            ));
        }
        Ok(())
    }

    /// Settings shown by `config`, in stable order. Read-only keys excluded.
    pub fn settings(&self) -> Vec<(&'static str, String)> {
        vec![
            ("default_parent", self.default_parent.clone()),
            ("default_remote", self.default_remote.clone()),
            ("default_pr_reviewer", self.default_pr_reviewer.clone()),
            (
                "delivery_branch_template",
                self.delivery_branch_template.clone(),
            ),
            ("stream_branch_prefix", self.stream_branch_prefix.clone()),
            ("stream_home", self.stream_home.display().to_string()),
        ]
    }

    /// Change a single setting by key.
    ///
    /// Read-only keys (`schema`, `streams`) and unknown keys are rejected.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        if READONLY_KEYS.contains(&key) {
            return Err(anyhow!("The value of {key} is readonly."));
        }
        match key {
            "default_parent" => self.default_parent = value.to_string(),
            "default_remote" => self.default_remote = value.to_string(),
            "default_pr_reviewer" => self.default_pr_reviewer = value.to_string(),
            "delivery_branch_template" => self.delivery_branch_template = value.to_string(),
            "stream_branch_prefix" => self.stream_branch_prefix = value.to_string(),
            "stream_home" => self.stream_home = PathBuf::from(value),
            _ => return Err(anyhow!("Not a valid configuration value: {key}.")),
        }
        Ok(())
    }
}
