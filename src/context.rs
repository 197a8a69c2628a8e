//! Resolution and write-through for current-directory stream commands.
//!
//! `add_parent`, `deliver`, `rm_parent`, `set_value`, `show`, and `update`
//! operate on the stream owning the current working directory: the stream
//! name is the directory basename, the record must exist in the
//! configuration, and the working copy must be checked out on the stream's
//! branch.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::core::config::StreamsConfig;
use crate::core::record::StreamRecord;
use crate::io::config_store::{load_config, write_config};
use crate::io::git::Git;

/// A resolved stream: its record, working copy, and the loaded config.
#[derive(Debug)]
pub struct StreamContext {
    pub name: String,
    pub git: Git,
    pub config: StreamsConfig,
    config_path: PathBuf,
}

impl StreamContext {
    /// Resolve the stream for `workdir` against the config at `config_path`.
    pub fn open(workdir: &Path, config_path: &Path) -> Result<Self> {
        let name = workdir
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow!("cannot derive a stream name from {}", workdir.display())
            })?;
        let git = Git::new(workdir);
        if !git.is_repo() {
            return Err(anyhow!("This is not a git repository."));
        }
        let config = load_config(config_path)?;
        let record = config
            .streams
            .get(&name)
            .ok_or_else(|| anyhow!("This stream is not defined: {name}"))?;
        let branch = git.current_branch()?;
        if branch != record.branch {
            return Err(anyhow!(
                "This stream is on the wrong branch ({branch}). Should be: {}",
                record.branch
            ));
        }
        debug!(stream = %name, branch = %branch, "stream context resolved");
        Ok(Self {
            name,
            git,
            config,
            config_path: config_path.to_path_buf(),
        })
    }

    pub fn record(&self) -> Result<&StreamRecord> {
        self.config
            .streams
            .get(&self.name)
            .ok_or_else(|| anyhow!("This stream is not defined: {}", self.name))
    }

    fn record_mut(&mut self) -> Result<&mut StreamRecord> {
        let name = self.name.clone();
        self.config
            .streams
            .get_mut(&name)
            .ok_or_else(|| anyhow!("This stream is not defined: {name}"))
    }

    /// Add a parent branch and persist the record.
    pub fn add_parent(&mut self, parent: &str) -> Result<()> {
        let name = self.name.clone();
        self.record_mut()?.add_parent(&name, parent)?;
        self.store()
    }

    /// Remove a parent branch and persist the record.
    pub fn rm_parent(&mut self, parent: &str) -> Result<()> {
        let name = self.name.clone();
        self.record_mut()?.rm_parent(&name, parent)?;
        self.store()
    }

    /// Set (or clear) a record field and persist the record.
    pub fn set_value(&mut self, parameter: &str, value: &str) -> Result<()> {
        self.record_mut()?.set_value(parameter, value)?;
        self.store()
    }

    /// Human-readable rendering of the stream, for `show`.
    pub fn render(&self) -> Result<String> {
        Ok(self.record()?.render(&self.name))
    }

    fn store(&self) -> Result<()> {
        write_config(&self.config_path, &self.config)
    }
}
