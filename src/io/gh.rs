//! GitHub CLI adapter for pull request creation.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

/// Open a pull request with `gh pr create --fill`.
///
/// The PR title and body are filled from the branch commits; the created PR
/// URL (gh's stdout) is echoed to stdout.
pub fn create_pr(workdir: &Path, base: &str, reviewer: &str) -> Result<()> {
    let mut args = vec!["pr", "create", "--fill", "--base", base];
    if !reviewer.is_empty() {
        args.push("--reviewer");
        args.push(reviewer);
    }
    debug!(base, reviewer, "creating pull request");
    let output = Command::new("gh")
        .args(&args)
        .current_dir(workdir)
        .output()
        .context("spawn gh pr create")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("gh pr create failed: {}", stderr.trim()));
    }
    let url = String::from_utf8_lossy(&output.stdout);
    if !url.trim().is_empty() {
        println!("{}", url.trim());
    }
    Ok(())
}
