use std::fs::{self, File};
use std::io::{Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use ssh2::FileStat;

use crate::fs::Entry;
use crate::progress;

use super::RemoteSession;

pub fn ensure_directories(session: &RemoteSession, dirs: &[String]) -> Result<()> {
    if dirs.is_empty() {
        return Ok(());
    }

    progress::info("Making directories");
    for dir in dirs {
        progress::tick();

        let remote = session.remote_path(dir);
        if session.sftp().stat(&remote).is_ok() {
            continue;
        }

        if let Err(err) = session.sftp().mkdir(&remote, 0o755) {
            // a concurrent writer may have won the race; anything else aborts
            if session.sftp().stat(&remote).is_ok() {
                continue;
            }
            progress::end_ticks();
            progress::failure(format!("Failed to create directory {dir}"));
            return Err(err).with_context(|| format!("mkdir {dir}"));
        }
    }
    progress::end_ticks();

    Ok(())
}

#[derive(Debug, Default)]
pub struct UploadOutcome {
    pub uploaded: usize,
    pub up_to_date: usize,
    pub failed: usize,
}

pub fn upload_files(session: &RemoteSession, entries: &[Entry]) -> Result<UploadOutcome> {
    progress::info("Uploading files");

    let mut outcome = UploadOutcome::default();
    for entry in entries {
        progress::tick();

        match sync_file(session, entry) {
            Ok(true) => outcome.uploaded += 1,
            Ok(false) => outcome.up_to_date += 1,
            Err(err) => {
                progress::end_ticks();
                progress::failure(format!("Failed to upload {}: {err:#}", entry.remote_path));
                outcome.failed += 1;
            }
        }
    }
    progress::end_ticks();

    progress::detail(format!(
        "{} uploaded, {} up to date, {} failed",
        outcome.uploaded, outcome.up_to_date, outcome.failed
    ));

    Ok(outcome)
}

// Ok(true) = uploaded, Ok(false) = remote copy already current.
fn sync_file(session: &RemoteSession, entry: &Entry) -> Result<bool> {
    let meta = fs::metadata(&entry.local_source)
        .with_context(|| format!("could not stat {}", entry.local_source.display()))?;
    let local_mtime = unix_secs(meta.modified().context("local mtime unavailable")?);

    let remote = session.remote_path(&entry.remote_path);
    // a failed stat is the normal "does not exist yet" signal
    let remote_mtime = session
        .sftp()
        .stat(&remote)
        .ok()
        .map(|stat| stat.mtime.unwrap_or(0));

    if !needs_upload(local_mtime, remote_mtime) {
        return Ok(false);
    }

    if let Some(remote_mtime) = remote_mtime {
        progress::end_ticks();
        progress::detail(format!(
            "Uploading {}: local={}, remote={}, diff={}",
            entry.remote_path,
            local_mtime,
            remote_mtime,
            local_mtime - remote_mtime
        ));
    }
    progress::info(&entry.remote_path);

    let mut content = Vec::new();
    File::open(&entry.local_source)
        .and_then(|mut file| file.read_to_end(&mut content))
        .with_context(|| format!("could not read {}", entry.local_source.display()))?;

    let mut remote_file = session
        .sftp()
        .create(&remote)
        .context("could not create remote file")?;
    remote_file.write_all(&content).context("write failed")?;
    drop(remote_file);

    // stamp the local times so the next run compares against the truth
    let local_atime = meta.accessed().map(unix_secs).unwrap_or(local_mtime);
    session
        .sftp()
        .setstat(
            &remote,
            FileStat {
                size: None,
                uid: None,
                gid: None,
                perm: None,
                atime: Some(local_atime),
                mtime: Some(local_mtime),
            },
        )
        .context("could not set remote timestamps")?;

    Ok(true)
}

fn needs_upload(local_mtime: u64, remote_mtime: Option<u64>) -> bool {
    match remote_mtime {
        None => true,
        // tolerance band: remote SFTP servers round timestamps to whole
        // seconds, so anything within one second counts as current
        Some(remote_mtime) => local_mtime > remote_mtime + 1,
    }
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_remote_file_is_uploaded() {
        assert!(needs_upload(100, None));
    }

    #[test]
    fn equal_mtime_is_up_to_date() {
        assert!(!needs_upload(100, Some(100)));
    }

    #[test]
    fn one_second_newer_stays_inside_the_tolerance_band() {
        assert!(!needs_upload(101, Some(100)));
    }

    #[test]
    fn more_than_one_second_newer_is_uploaded() {
        assert!(needs_upload(102, Some(100)));
    }

    #[test]
    fn older_local_file_is_never_pushed() {
        assert!(!needs_upload(50, Some(100)));
    }
}
