use anyhow::{bail, Result};

use crate::config::DeployConfig;
use crate::fs::{IgnoreRules, TransferList};
use crate::git::push_current_branch;
use crate::progress;
use crate::ssh::transfer::{ensure_directories, upload_files};
use crate::ssh::RemoteSession;
use crate::util::SecretProvider;

pub fn run_deploy(config: &DeployConfig, secrets: &dyn SecretProvider) -> Result<()> {
    progress::success("Starting deployment...");

    push_current_branch()?;
    mirror(config, secrets)?;

    progress::success("Deployment completed successfully!");
    Ok(())
}

fn mirror(config: &DeployConfig, secrets: &dyn SecretProvider) -> Result<()> {
    progress::info("Step 2: Uploading files via SFTP...");
    progress::info(format!(
        "Connecting to {}:{} as {}",
        config.host, config.port, config.user
    ));

    if !config.key_file.exists() {
        bail!("SSH key file not found: {}", config.key_file.display());
    }

    progress::info("Preparing files for upload...");
    let list = TransferList::new(&config.local_root, IgnoreRules::new(&config.ignore));
    let set = list.collect();

    if set.entries.is_empty() {
        progress::info("No files to upload!");
        return Ok(());
    }

    // the session closes on every exit path below, including errors
    let session = RemoteSession::open(config, secrets)?;

    ensure_directories(&session, &set.dirs)?;
    upload_files(&session, &set.entries)?;

    progress::success("SFTP upload successful!");
    Ok(())
}
