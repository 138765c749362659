use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::progress;

// Only the exit status is interpreted; everything else is git's business.
pub fn push_current_branch() -> Result<()> {
    progress::info("Step 1: Pushing to git...");

    let output = Command::new("git")
        .args(["push", "origin"])
        .output()
        .context("could not run git")?;

    if !output.stdout.is_empty() {
        print!("{}", String::from_utf8_lossy(&output.stdout));
    }

    if !output.status.success() {
        if !output.stderr.is_empty() {
            eprint!("{}", String::from_utf8_lossy(&output.stderr));
        }
        bail!("git push failed ({})", output.status);
    }

    progress::success("Git push successful!");
    Ok(())
}
