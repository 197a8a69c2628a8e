//! Git adapter for stream commands.
//!
//! Every stream operation is a short sequence of git subcommands, so we keep
//! a small, explicit wrapper around `git` subprocess calls. Failed commands
//! surface their stderr in the error text; orchestration code matches on it
//! to recognize expected conditions (branch already exists, unknown
//! pathspec) and treats everything else as fatal.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Clone `url` checked out at `branch` into `root`, creating parent
    /// directories as needed.
    #[instrument(skip_all, fields(url, branch))]
    pub fn clone_repo(url: &str, branch: &str, root: &Path) -> Result<Self> {
        if let Some(parent) = root.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        debug!(root = %root.display(), "cloning working copy");
        let output = Command::new("git")
            .args(["clone", "--branch", branch, url])
            .arg(root)
            .output()
            .with_context(|| format!("spawn git clone {url}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git clone {} failed: {}", url, stderr.trim()));
        }
        Ok(Self::new(root))
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// True if the workdir is inside a git working copy.
    pub fn is_repo(&self) -> bool {
        Command::new("git")
            .args(["rev-parse", "--git-dir"])
            .current_dir(&self.workdir)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Return the current branch name (errors on detached HEAD).
    #[instrument(skip_all)]
    pub fn current_branch(&self) -> Result<String> {
        let out = self.run_capture(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        let name = out.trim().to_string();
        if name == "HEAD" {
            warn!("detached HEAD detected");
            return Err(anyhow!("detached HEAD (refuse to run)"));
        }
        debug!(branch = %name, "current branch");
        Ok(name)
    }

    /// Checkout an existing branch.
    #[instrument(skip_all, fields(branch))]
    pub fn checkout_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "checking out branch");
        self.run_checked(&["checkout", branch])?;
        Ok(())
    }

    /// Create and checkout a new branch at current HEAD.
    #[instrument(skip_all, fields(branch))]
    pub fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "creating and checking out new branch");
        self.run_checked(&["checkout", "-b", branch])?;
        Ok(())
    }

    /// Create and checkout `branch` tracking `upstream` (e.g. `origin/main`).
    #[instrument(skip_all, fields(branch, upstream))]
    pub fn checkout_tracking(&self, branch: &str, upstream: &str) -> Result<()> {
        debug!(branch, upstream, "creating tracking branch");
        self.run_checked(&["checkout", "-b", branch, "--track", upstream])?;
        Ok(())
    }

    /// Pull the upstream of the current branch.
    pub fn pull(&self) -> Result<()> {
        self.run_checked(&["pull"])?;
        Ok(())
    }

    /// Pull `branch` from `remote` with rebase.
    #[instrument(skip_all, fields(remote, branch))]
    pub fn pull_rebase(&self, remote: &str, branch: &str) -> Result<()> {
        self.run_checked(&["pull", "--rebase", remote, branch])?;
        Ok(())
    }

    /// Merge `branch` into the current branch with a commit message.
    #[instrument(skip_all, fields(branch))]
    pub fn merge(&self, branch: &str, message: &str) -> Result<()> {
        debug!(branch, "merging");
        self.run_checked(&["merge", branch, "-m", message])?;
        Ok(())
    }

    /// Mixed reset of the current branch to `target`, keeping the worktree.
    pub fn reset(&self, target: &str) -> Result<()> {
        self.run_checked(&["reset", target])?;
        Ok(())
    }

    /// Stage all changes (respects .gitignore).
    pub fn add_all(&self) -> Result<()> {
        self.run_checked(&["add", "--all"])?;
        Ok(())
    }

    /// Commit all tracked changes with a message.
    ///
    /// Returns `Ok(false)` when git reports there is nothing to commit.
    #[instrument(skip_all)]
    pub fn commit_all(&self, message: &str) -> Result<bool> {
        let output = self.run(&["commit", "-a", "-m", message])?;
        if output.status.success() {
            return Ok(true);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stdout.contains("nothing to commit")
            || stderr.contains("nothing to commit")
            || stdout.contains("up to date")
        {
            debug!("nothing to commit");
            return Ok(false);
        }
        let detail = if stderr.trim().is_empty() {
            stdout
        } else {
            stderr
        };
        Err(anyhow!("git commit failed: {}", detail.trim()))
    }

    /// Push `refspec` (e.g. `HEAD` or a branch name) to `remote`.
    #[instrument(skip_all, fields(remote, refspec))]
    pub fn push(&self, remote: &str, refspec: &str) -> Result<()> {
        debug!(remote, refspec, "pushing");
        self.run_checked(&["push", remote, refspec])?;
        Ok(())
    }

    /// Set the upstream of the current branch (e.g. `origin/T1_fix`).
    pub fn set_upstream(&self, upstream: &str) -> Result<()> {
        self.run_checked(&["branch", "--set-upstream-to", upstream])?;
        Ok(())
    }

    /// Delete `branch` on `remote`.
    ///
    /// A branch that was never pushed makes the delete fail; that is
    /// reported as `Ok(false)` rather than an error.
    #[instrument(skip_all, fields(remote, branch))]
    pub fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<bool> {
        let output = self.run(&["push", remote, "--delete", branch])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(branch, stderr = %stderr.trim(), "remote branch delete failed");
            return Ok(false);
        }
        Ok(true)
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))
    }
}
