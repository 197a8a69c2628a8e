//! Orchestration for `create`: clone, branch setup, record persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::core::config::STREAM_SCHEMA;
use crate::core::record::StreamRecord;
use crate::core::{naming, template};
use crate::io::config_store::{load_config, write_config};
use crate::io::git::Git;

/// Flags for `create`.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Parent branch; falls back to the configured `default_parent`.
    pub parent: Option<String>,
    pub ticket: Option<String>,
    /// Explicit delivery branch; otherwise derived from the template.
    pub delivery_branch: Option<String>,
}

/// Outcome of `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub stream_name: String,
    pub branch: String,
    /// Working copy location under `stream_home`.
    pub root: PathBuf,
}

/// Create a stream: clone its repository, set up the stream branch, and
/// persist the record.
pub fn create_stream(
    config_path: &Path,
    name: &str,
    repo: &str,
    opts: &CreateOptions,
) -> Result<CreateOutcome> {
    let mut config = load_config(config_path)?;

    let repo = naming::normalize_repo_url(repo, &config.default_remote);
    let repo_name = naming::repo_name(&repo);
    let branch = naming::stream_branch(&config.stream_branch_prefix, name);
    let stream_name = naming::stream_name(&repo_name, &branch);
    let parent = opts
        .parent
        .clone()
        .unwrap_or_else(|| config.default_parent.clone());

    if config.streams.contains_key(&stream_name) {
        return Err(anyhow!("Stream already defined: {stream_name}"));
    }

    let root = config.stream_home.join(&stream_name);
    info!(stream = %stream_name, repo = %repo, root = %root.display(), "cloning stream working copy");
    let git = Git::clone_repo(&repo, &parent, &root)?;

    // The stream branch may already exist (locally after a re-create, or on
    // the remote); only an unknown pathspec means we have to create it.
    match git.checkout_branch(&branch) {
        Ok(()) => debug!(branch = %branch, "reusing existing stream branch"),
        Err(err) if err.to_string().contains("did not match any file(s) known to git") => {
            git.checkout_new_branch(&branch)
                .with_context(|| format!("create branch {branch}"))?;
        }
        Err(err) => return Err(err),
    }

    let mut record = StreamRecord {
        repo,
        description: name.to_string(),
        branch: branch.clone(),
        parents: vec![parent],
        delivery_branch: opts.delivery_branch.clone(),
        ticket: opts.ticket.clone(),
        pr_reviewer: None,
        schema: STREAM_SCHEMA,
        extra: BTreeMap::new(),
    };

    if record.delivery_branch.is_none() && !config.delivery_branch_template.is_empty() {
        match template::expand(
            &config.delivery_branch_template,
            record.ticket.as_deref(),
            Some(&record.description),
        ) {
            Ok(delivery_branch) => record.delivery_branch = Some(delivery_branch),
            // Not fatal: the stream is created without a delivery branch.
            Err(field) => eprintln!("Unable to set delivery branch since {field} is not set."),
        }
    }

    config.streams.insert(stream_name.clone(), record);
    write_config(config_path, &config)?;
    info!(stream = %stream_name, branch = %branch, "stream created");
    Ok(CreateOutcome {
        stream_name,
        branch,
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestRepo;

    #[test]
    fn create_clones_branches_and_persists_record() {
        let repo = TestRepo::new("scratch").expect("repo");
        repo.write_stream_config(&repo.base_config()).expect("config");

        let opts = CreateOptions {
            ticket: Some("T1".to_string()),
            ..CreateOptions::default()
        };
        let outcome =
            create_stream(&repo.config_path(), "fix", &repo.repo_arg(), &opts).expect("create");

        assert_eq!(outcome.stream_name, "origin-dev-fix");
        assert_eq!(outcome.branch, "dev/fix");
        assert!(outcome.root.join("README.md").exists());

        let git = Git::new(&outcome.root);
        assert_eq!(git.current_branch().expect("branch"), "dev/fix");

        let config = load_config(&repo.config_path()).expect("reload");
        let record = &config.streams["origin-dev-fix"];
        assert_eq!(record.description, "fix");
        assert_eq!(record.parents, vec!["main"]);
        assert_eq!(record.ticket.as_deref(), Some("T1"));
        assert_eq!(record.delivery_branch.as_deref(), Some("T1_fix"));
    }

    #[test]
    fn create_twice_with_same_derived_name_fails() {
        let repo = TestRepo::new("scratch").expect("repo");
        repo.write_stream_config(&repo.base_config()).expect("config");

        let opts = CreateOptions {
            ticket: Some("T1".to_string()),
            ..CreateOptions::default()
        };
        create_stream(&repo.config_path(), "fix", &repo.repo_arg(), &opts).expect("create");
        let err = create_stream(&repo.config_path(), "fix", &repo.repo_arg(), &opts)
            .expect_err("second create should fail");
        assert!(
            err.to_string()
                .contains("Stream already defined: origin-dev-fix")
        );
    }

    #[test]
    fn missing_ticket_skips_delivery_branch_but_creates_stream() {
        let repo = TestRepo::new("scratch").expect("repo");
        repo.write_stream_config(&repo.base_config()).expect("config");

        let outcome = create_stream(
            &repo.config_path(),
            "fix",
            &repo.repo_arg(),
            &CreateOptions::default(),
        )
        .expect("create");

        let config = load_config(&repo.config_path()).expect("reload");
        let record = &config.streams[&outcome.stream_name];
        assert_eq!(record.delivery_branch, None);
    }

    #[test]
    fn explicit_delivery_branch_wins_over_template() {
        let repo = TestRepo::new("scratch").expect("repo");
        repo.write_stream_config(&repo.base_config()).expect("config");

        let opts = CreateOptions {
            ticket: Some("T1".to_string()),
            delivery_branch: Some("review/fix".to_string()),
            ..CreateOptions::default()
        };
        let outcome =
            create_stream(&repo.config_path(), "fix", &repo.repo_arg(), &opts).expect("create");

        let config = load_config(&repo.config_path()).expect("reload");
        let record = &config.streams[&outcome.stream_name];
        assert_eq!(record.delivery_branch.as_deref(), Some("review/fix"));
    }
}
