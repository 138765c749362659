use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ssh2::{Session, Sftp};

use crate::config::DeployConfig;
use crate::progress::{self, with_spinner};
use crate::ssh::connect::{authenticate, open_session};
use crate::util::SecretProvider;

mod connect;
pub mod transfer;

pub struct RemoteSession {
    // declared before `session` so the sub-channel shuts down first
    sftp: Sftp,
    session: Session,
    remote_dir: PathBuf,
}

impl RemoteSession {
    pub fn open(config: &DeployConfig, secrets: &dyn SecretProvider) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);

        let session = with_spinner("Connecting to the host...", |spinner| {
            let session = open_session(&addr)?;
            spinner.stop_with_message(format!("Connected to {addr}"));
            Ok(session)
        })?;
        println!();

        authenticate(&session, config, secrets)?;

        if let Some(banner) = session.banner() {
            println!("----------------------------------");
            println!("{banner}");
            println!("----------------------------------");
        }

        let sftp = session
            .sftp()
            .context("could not open the SFTP channel")?;

        // all relative paths live under the remote base directory; a missing
        // base is fatal before any transfer starts
        sftp.stat(&config.remote_dir).with_context(|| {
            format!("remote directory not found: {}", config.remote_dir.display())
        })?;

        progress::success("Connected to the remote server");

        Ok(Self {
            sftp,
            session,
            remote_dir: config.remote_dir.clone(),
        })
    }

    pub fn sftp(&self) -> &Sftp {
        &self.sftp
    }

    pub fn remote_path(&self, rel: &str) -> PathBuf {
        self.remote_dir.join(Path::new(rel))
    }
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        let _ = self
            .session
            .disconnect(None, "closing session", None);
    }
}
