//! Orchestration for `rm`: optional remote/worktree cleanup plus record
//! removal.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use crate::io::config_store::{load_config, write_config};
use crate::io::git::Git;

/// Flags for `rm`.
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Delete the remote branch and the local working copy as well.
    pub cleanup: bool,
}

/// Remove a stream record, optionally cleaning up its branches on disk and
/// on the remote.
pub fn remove_stream(config_path: &Path, name: &str, opts: &RemoveOptions) -> Result<()> {
    let mut config = load_config(config_path)?;
    let record = config
        .streams
        .get(name)
        .ok_or_else(|| anyhow!("Stream not defined: {name}"))?
        .clone();

    if opts.cleanup {
        let root = config.stream_home.join(name);
        if root.exists() {
            let git = Git::new(&root);
            // The branch may never have been pushed; a failed delete is fine.
            if !git.delete_remote_branch("origin", &record.branch)? {
                warn!(branch = %record.branch, "remote branch not deleted");
            }
            fs::remove_dir_all(&root).with_context(|| format!("remove {}", root.display()))?;
        }
    }

    config.streams.remove(name);
    write_config(config_path, &config)?;
    info!(stream = %name, "stream removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create::{CreateOptions, create_stream};
    use crate::test_support::{TestRepo, run_git};

    #[test]
    fn rm_undefined_stream_fails() {
        let repo = TestRepo::new("scratch").expect("repo");
        repo.write_stream_config(&repo.base_config()).expect("config");

        let err = remove_stream(&repo.config_path(), "nope", &RemoveOptions::default())
            .expect_err("rm should fail");
        assert!(err.to_string().contains("Stream not defined: nope"));
    }

    #[test]
    fn rm_deletes_the_record() {
        let repo = TestRepo::new("scratch").expect("repo");
        repo.write_stream_config(&repo.base_config()).expect("config");
        let outcome = create_stream(
            &repo.config_path(),
            "fix",
            &repo.repo_arg(),
            &CreateOptions::default(),
        )
        .expect("create");

        remove_stream(&repo.config_path(), &outcome.stream_name, &RemoveOptions::default())
            .expect("rm");

        let config = load_config(&repo.config_path()).expect("reload");
        assert!(config.streams.is_empty());
        // Without --cleanup the working copy stays.
        assert!(outcome.root.exists());
    }

    #[test]
    fn rm_cleanup_removes_worktree_and_remote_branch() {
        let repo = TestRepo::new("scratch").expect("repo");
        repo.write_stream_config(&repo.base_config()).expect("config");
        let outcome = create_stream(
            &repo.config_path(),
            "fix",
            &repo.repo_arg(),
            &CreateOptions::default(),
        )
        .expect("create");
        run_git(&outcome.root, &["push", "origin", "dev/fix"]).expect("push branch");

        remove_stream(
            &repo.config_path(),
            &outcome.stream_name,
            &RemoveOptions { cleanup: true },
        )
        .expect("rm");

        assert!(!outcome.root.exists());
        let config = load_config(&repo.config_path()).expect("reload");
        assert!(config.streams.is_empty());
        assert!(
            run_git(&repo.origin_dir(), &["show-ref", "--verify", "refs/heads/dev/fix"]).is_err(),
            "remote branch should be gone"
        );
    }
}
