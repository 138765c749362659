use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use anyhow::{anyhow, ensure, Context, Result};
use ssh2::Session;

use crate::config::DeployConfig;
use crate::util::SecretProvider;

pub(super) fn open_session(addr: &str) -> Result<Session> {
    let stream = try_connection(addr)?;

    let mut session = Session::new().context("could not create session")?;
    session.set_tcp_stream(stream);
    session
        .handshake()
        .with_context(|| format!("SSH handshake with {addr} failed"))?;

    Ok(session)
}

fn try_connection(addr: &str) -> Result<TcpStream> {
    addr.to_socket_addrs()
        .with_context(|| format!("could not resolve {addr}"))?
        .find_map(|candidate| TcpStream::connect_timeout(&candidate, Duration::from_secs(30)).ok())
        .ok_or_else(|| anyhow!("could not connect to {addr}"))
}

// Key-only authentication: no agent, no password fallback.
pub(super) fn authenticate(
    session: &Session,
    config: &DeployConfig,
    secrets: &dyn SecretProvider,
) -> Result<()> {
    let passphrase = secrets.read_secret(&format!(
        "Enter passphrase for {}: ",
        config.key_file.display()
    ))?;

    session
        .userauth_pubkey_file(&config.user, None, &config.key_file, Some(&passphrase))
        .with_context(|| format!("authentication as {} failed", config.user))?;

    ensure!(session.authenticated(), "server rejected the key");
    Ok(())
}
