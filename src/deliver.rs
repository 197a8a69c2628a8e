//! Orchestration for `deliver`: bring the delivery branch up to date and
//! optionally open a pull request.
//!
//! The first delivery creates the delivery branch from the parent tip and
//! seeds it with a single squashed commit of the stream's work; subsequent
//! deliveries merge the stream branch forward into the existing delivery
//! branch.

use anyhow::{Result, anyhow};
use tracing::{debug, info};

use crate::context::StreamContext;
use crate::io::gh;

/// Flags for `deliver`.
#[derive(Debug, Clone, Default)]
pub struct DeliverOptions {
    /// Open a pull request against the first parent after delivering.
    pub create_pr: bool,
}

/// How the delivery branch was brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    /// The delivery branch was created and seeded from the stream branch.
    First,
    /// The stream branch was merged into the existing delivery branch.
    MergeForward,
}

/// Deliver the stream to its delivery branch.
pub fn deliver_stream(
    ctx: &StreamContext,
    commit_message: &str,
    opts: &DeliverOptions,
) -> Result<DeliveryKind> {
    let record = ctx.record()?.clone();
    let delivery_branch = record
        .delivery_branch
        .clone()
        .ok_or_else(|| anyhow!("No delivery branch set for this stream."))?;
    let target_parent = record
        .parents
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("No parents defined for this stream."))?;
    let origin_parent = format!("origin/{target_parent}");
    let branch = record.branch.clone();

    ctx.git.checkout_branch(&branch)?;

    // An existing delivery branch means this is not the first delivery.
    let kind = match ctx.git.checkout_tracking(&delivery_branch, &origin_parent) {
        Ok(()) => DeliveryKind::First,
        Err(err) if err.to_string().contains("already exists") => {
            debug!(branch = %delivery_branch, "delivery branch exists, merging forward");
            ctx.git.checkout_branch(&delivery_branch)?;
            DeliveryKind::MergeForward
        }
        Err(err) => return Err(err),
    };

    match kind {
        DeliveryKind::First => {
            // Replay the stream's commits, then collapse them into a single
            // commit sitting on the parent tip.
            ctx.git.pull_rebase("origin", &branch)?;
            ctx.git.reset(&origin_parent)?;
            ctx.git.add_all()?;
            if !ctx.git.commit_all(commit_message)? {
                return Err(anyhow!("There are no changes to deliver"));
            }
            ctx.git.push("origin", "HEAD")?;
            ctx.git.set_upstream(&format!("origin/{delivery_branch}"))?;
        }
        DeliveryKind::MergeForward => {
            ctx.git.merge(&branch, commit_message)?;
        }
    }

    if opts.create_pr {
        if !record.repo.contains("github") {
            return Err(anyhow!("Unable to create PR for non-GitHub repo."));
        }
        let reviewer = record
            .pr_reviewer
            .clone()
            .unwrap_or_else(|| ctx.config.default_pr_reviewer.clone());
        gh::create_pr(ctx.git.workdir(), &target_parent, &reviewer)?;
    }

    ctx.git.checkout_branch(&branch)?;
    info!(stream = %ctx.name, delivery = %delivery_branch, ?kind, "delivered");
    Ok(kind)
}
