//! Test-only fixtures: temp git repositories wired to a local bare origin.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::core::config::{CONFIG_SCHEMA, STREAM_SCHEMA, StreamsConfig};
use crate::core::record::StreamRecord;
use crate::io::config_store::write_config;

/// A throwaway git working copy plus a local bare `origin`.
///
/// Layout under a single temp dir:
/// - `origin.git`: bare repository acting as the remote (`main` seeded with
///   one commit)
/// - `seed`: clone used to publish upstream changes
/// - `work/<name>`: clone of `origin.git` checked out at `main`; `work` also
///   serves as `stream_home` for configs built by [`TestRepo::base_config`]
pub struct TestRepo {
    temp: TempDir,
    root: PathBuf,
    seed: PathBuf,
}

impl TestRepo {
    pub fn new(name: &str) -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let origin = temp.path().join("origin.git");
        run_git(temp.path(), &["init", "--bare", "-b", "main", "origin.git"])?;

        let seed = temp.path().join("seed");
        run_git(temp.path(), &["init", "-b", "main", "seed"])?;
        configure_identity(&seed)?;
        fs::write(seed.join("README.md"), "seed\n").context("write seed README")?;
        run_git(&seed, &["add", "--all"])?;
        run_git(&seed, &["commit", "-m", "initial commit"])?;
        run_git(&seed, &["remote", "add", "origin", path_str(&origin)?])?;
        run_git(&seed, &["push", "origin", "main"])?;

        let work = temp.path().join("work");
        fs::create_dir_all(&work).context("create work dir")?;
        let root = work.join(name);
        run_git(&work, &["clone", path_str(&origin)?, name])?;
        configure_identity(&root)?;

        Ok(Self { temp, root, seed })
    }

    /// The working copy created for this fixture (`work/<name>`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The bare origin repository.
    pub fn origin_dir(&self) -> PathBuf {
        self.temp.path().join("origin.git")
    }

    /// Repository argument for `create`: the origin path without its `.git`
    /// suffix, so URL normalization against an empty remote re-adds it.
    pub fn repo_arg(&self) -> String {
        self.temp.path().join("origin").display().to_string()
    }

    /// Directory configs built by [`TestRepo::base_config`] clone into.
    pub fn stream_home(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp.path().join("git-streams.yml")
    }

    /// A config with deterministic values pointing at this fixture.
    pub fn base_config(&self) -> StreamsConfig {
        StreamsConfig {
            schema: CONFIG_SCHEMA,
            default_parent: "main".to_string(),
            default_remote: String::new(),
            default_pr_reviewer: String::new(),
            delivery_branch_template: "%t_%d".to_string(),
            stream_branch_prefix: "dev/".to_string(),
            stream_home: self.stream_home(),
            streams: BTreeMap::new(),
        }
    }

    pub fn write_stream_config(&self, config: &StreamsConfig) -> Result<()> {
        write_config(&self.config_path(), config)
    }

    /// A record pointing at this fixture's origin.
    pub fn record(&self, branch: &str, parents: &[&str]) -> StreamRecord {
        StreamRecord {
            repo: self.origin_dir().display().to_string(),
            description: "fix".to_string(),
            branch: branch.to_string(),
            parents: parents.iter().map(|parent| parent.to_string()).collect(),
            delivery_branch: None,
            ticket: None,
            pr_reviewer: None,
            schema: STREAM_SCHEMA,
            extra: BTreeMap::new(),
        }
    }

    /// Run git in the fixture's working copy.
    pub fn git(&self, args: &[&str]) -> Result<String> {
        run_git(&self.root, args)
    }

    pub fn write_file(&self, rel: &str, contents: &str) -> Result<()> {
        fs::write(self.root.join(rel), contents).with_context(|| format!("write {rel}"))
    }

    /// Commit a file in the fixture's working copy on the current branch.
    pub fn commit_file(&self, rel: &str, contents: &str, message: &str) -> Result<()> {
        self.write_file(rel, contents)?;
        run_git(&self.root, &["add", "--all"])?;
        run_git(&self.root, &["commit", "-m", message])?;
        Ok(())
    }

    /// Publish a change on the upstream `main` via the seed clone.
    pub fn commit_upstream(&self, rel: &str, contents: &str, message: &str) -> Result<()> {
        run_git(&self.seed, &["checkout", "main"])?;
        fs::write(self.seed.join(rel), contents).with_context(|| format!("write {rel}"))?;
        run_git(&self.seed, &["add", "--all"])?;
        run_git(&self.seed, &["commit", "-m", message])?;
        run_git(&self.seed, &["push", "origin", "main"])?;
        Ok(())
    }

    /// Publish a change on another upstream branch (created from `main` if
    /// missing) via the seed clone.
    pub fn commit_upstream_on(
        &self,
        branch: &str,
        rel: &str,
        contents: &str,
        message: &str,
    ) -> Result<()> {
        run_git(&self.seed, &["checkout", "-B", branch, "main"])?;
        fs::write(self.seed.join(rel), contents).with_context(|| format!("write {rel}"))?;
        run_git(&self.seed, &["add", "--all"])?;
        run_git(&self.seed, &["commit", "-m", message])?;
        run_git(&self.seed, &["push", "origin", branch])?;
        run_git(&self.seed, &["checkout", "main"])?;
        Ok(())
    }
}

/// Set a local commit identity so test commits work without global config.
pub fn configure_identity(dir: &Path) -> Result<()> {
    run_git(dir, &["config", "user.email", "dev@example.com"])?;
    run_git(dir, &["config", "user.name", "Dev"])?;
    run_git(dir, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

/// Run git in `dir`, returning trimmed stdout or the failure's stderr.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("spawn git {}", args.join(" ")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("non-utf8 path {}", path.display()))
}
