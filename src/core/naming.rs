//! Repository URL normalization and stream naming rules.

/// Normalize a repository argument into a clone URL.
///
/// Values already in SSH form (`git@...`) pass through untouched; anything
/// else is treated as a fragment relative to the configured default remote
/// and gets a `.git` suffix.
pub fn normalize_repo_url(repo: &str, default_remote: &str) -> String {
    if repo.starts_with("git@") {
        repo.to_string()
    } else {
        format!("{default_remote}{repo}.git")
    }
}

/// Repository short name: final path segment with any `.git` suffix dropped.
pub fn repo_name(url: &str) -> String {
    let segment = url.rsplit('/').next().unwrap_or(url);
    segment.split('.').next().unwrap_or(segment).to_string()
}

/// Local branch name for a stream: configured prefix plus requested name.
pub fn stream_branch(prefix: &str, name: &str) -> String {
    format!("{prefix}{name}")
}

/// Stream key in the configuration: repo short name plus the stream branch
/// with path separators flattened, so the key is usable as a directory name.
pub fn stream_name(repo_name: &str, stream_branch: &str) -> String {
    format!("{repo_name}-{}", stream_branch.replace('/', "-"))
}
