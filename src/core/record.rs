//! Stream record model and mutations.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Fields that must always be present on a record.
const REQUIRED_FIELDS: [&str; 3] = ["repo", "description", "branch"];

/// A tracked local branch plus its delivery/parent metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamRecord {
    /// Repository clone URL (normalized at create time).
    pub repo: String,
    /// Human description: the stream name as requested on `create`.
    pub description: String,
    /// Local stream branch name.
    pub branch: String,
    /// Upstream branches updates are merged from, in merge order.
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_reviewer: Option<String>,
    pub schema: u32,
    /// Ad hoc fields attached via `set_value`.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, String>,
}

impl StreamRecord {
    /// Append a parent branch. Duplicates are rejected.
    pub fn add_parent(&mut self, stream_name: &str, parent: &str) -> Result<()> {
        if self.parents.iter().any(|existing| existing == parent) {
            return Err(anyhow!(
                "Parent \"{parent}\" already defined for stream \"{stream_name}\""
            ));
        }
        self.parents.push(parent.to_string());
        Ok(())
    }

    /// Remove a parent branch. Unknown parents are rejected.
    pub fn rm_parent(&mut self, stream_name: &str, parent: &str) -> Result<()> {
        let before = self.parents.len();
        self.parents.retain(|existing| existing != parent);
        if self.parents.len() == before {
            return Err(anyhow!(
                "Parent \"{parent}\" not defined for stream \"{stream_name}\""
            ));
        }
        Ok(())
    }

    /// Set a field by name; an empty value removes the field.
    ///
    /// `parents` and `schema` are not settable this way, and required fields
    /// cannot be removed. Names without a dedicated field land in `extra`.
    pub fn set_value(&mut self, parameter: &str, value: &str) -> Result<()> {
        if matches!(parameter, "parents" | "schema") {
            return Err(anyhow!("The {parameter} field cannot be set directly."));
        }
        if REQUIRED_FIELDS.contains(&parameter) && value.is_empty() {
            return Err(anyhow!("The {parameter} field cannot be removed."));
        }
        match parameter {
            "repo" => self.repo = value.to_string(),
            "description" => self.description = value.to_string(),
            "branch" => self.branch = value.to_string(),
            "delivery_branch" => self.delivery_branch = optional(value),
            "ticket" => self.ticket = optional(value),
            "pr_reviewer" => self.pr_reviewer = optional(value),
            _ => {
                if value.is_empty() {
                    self.extra.remove(parameter);
                } else {
                    self.extra.insert(parameter.to_string(), value.to_string());
                }
            }
        }
        Ok(())
    }

    /// Human-readable rendering: a `name:` line followed by indented fields.
    /// The record schema version is bookkeeping and is not shown.
    pub fn render(&self, name: &str) -> String {
        let mut out = format!("name: {name}\n");
        let mut field = |key: &str, value: &str| {
            let _ = writeln!(out, "    {key}: {value}");
        };
        field("repo", &self.repo);
        field("description", &self.description);
        field("branch", &self.branch);
        field("parents", &self.parents.join(", "));
        if let Some(delivery_branch) = &self.delivery_branch {
            field("delivery_branch", delivery_branch);
        }
        if let Some(ticket) = &self.ticket {
            field("ticket", ticket);
        }
        if let Some(pr_reviewer) = &self.pr_reviewer {
            field("pr_reviewer", pr_reviewer);
        }
        for (key, value) in &self.extra {
            field(key, value);
        }
        out
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
