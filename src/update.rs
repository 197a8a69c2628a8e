//! Orchestration for `update`: merge each parent into the stream branch.

use anyhow::{Context, Result};

use crate::context::StreamContext;

/// Merge every parent into the stream branch, in listed order.
///
/// Each parent branch is checked out and pulled first so the merge sees the
/// upstream tip; progress lines go to stdout.
pub fn update_stream(ctx: &StreamContext) -> Result<()> {
    let record = ctx.record()?.clone();
    for parent in &record.parents {
        println!("Updating from origin/{parent}");
        ctx.git
            .checkout_branch(parent)
            .with_context(|| format!("checkout parent {parent}"))?;
        ctx.git.pull()?;
        ctx.git.checkout_branch(&record.branch)?;
        ctx.git.merge(parent, &format!("Update from {parent}."))?;
    }
    Ok(())
}
