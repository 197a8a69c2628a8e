//! Configuration store for `~/.git-streams.yml`.
//!
//! Load-or-initialize a single YAML file. Every write first copies the prior
//! file to a sibling `.bak`, then writes atomically (temp file + rename); a
//! failed write restores the backup over the config path. No locking:
//! single-user, single-process usage assumed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::config::{CONFIG_SCHEMA, StreamsConfig};

/// Configuration file location: `~/.git-streams.yml`.
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("locate home directory")?;
    Ok(home.join(".git-streams.yml"))
}

/// Backup location next to the config file (`.yml` replaced by `.bak`).
pub fn backup_path(config: &Path) -> PathBuf {
    config.with_extension("bak")
}

/// Seed configuration written on first use.
pub fn default_config() -> StreamsConfig {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    StreamsConfig {
        schema: CONFIG_SCHEMA,
        default_parent: "main".to_string(),
        default_remote: "git@github.com:".to_string(),
        default_pr_reviewer: String::new(),
        delivery_branch_template: "%t_%d".to_string(),
        stream_branch_prefix: format!("{}/", whoami::username()),
        stream_home: home.join("git").join("streams"),
        streams: BTreeMap::new(),
    }
}

/// Create the config file with defaults if it does not exist yet.
pub fn ensure_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    debug!(path = %path.display(), "seeding default configuration");
    write_config(path, &default_config())
}

/// Load the configuration, rejecting schema mismatches.
pub fn load_config(path: &Path) -> Result<StreamsConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config: StreamsConfig =
        serde_yaml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    config.validate_schema()?;
    Ok(config)
}

/// Write the configuration, backup first.
///
/// The prior file (if any) is copied to [`backup_path`] before the write; if
/// the write fails the backup is copied back and the error propagates.
pub fn write_config(path: &Path, config: &StreamsConfig) -> Result<()> {
    let backup = backup_path(path);
    let had_previous = path.exists();
    if had_previous {
        fs::copy(path, &backup)
            .with_context(|| format!("back up {} to {}", path.display(), backup.display()))?;
    }
    match write_yaml(path, config) {
        Ok(()) => Ok(()),
        Err(err) => {
            if had_previous {
                if let Err(restore_err) = fs::copy(&backup, path) {
                    warn!(err = %restore_err, "failed to restore config backup");
                }
            }
            Err(err)
        }
    }
}

fn write_yaml(path: &Path, config: &StreamsConfig) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let buf = serde_yaml::to_string(config).context("serialize config yaml")?;
    let tmp_path = path.with_extension("yml.tmp");
    fs::write(&tmp_path, &buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
