//! Update artifact downloader with progress reporting.
//!
//! Streams the artifact to the download staging directory, emitting a
//! [`DownloadProgress`] snapshot per chunk as bytes arrive.

use crate::error::{Result, WispError};
use crate::update::events::DownloadProgress;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Instant;

const CHUNK_SIZE: usize = 64 * 1024;

/// Download `url` to `dest`, reporting progress per received chunk.
///
/// # Errors
///
/// Returns [`WispError::Download`] on transport failure, a non-success
/// status, or a filesystem error while staging the artifact.
pub fn download_artifact(
    agent: &ureq::Agent,
    url: &str,
    headers: &BTreeMap<String, String>,
    auth_header: Option<&str>,
    dest: &Path,
    mut on_progress: impl FnMut(DownloadProgress),
) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            WispError::Download(format!(
                "cannot create download directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let mut request = agent.get(url);
    for (name, value) in headers {
        request = request.set(name, value);
    }
    if let Some(auth) = auth_header {
        request = request.set("Authorization", auth);
    }

    let response = request
        .call()
        .map_err(|e| WispError::Download(format!("download request failed: {e}")))?;

    let total: u64 = response
        .header("Content-Length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mut reader = response.into_reader();
    let mut file = std::fs::File::create(dest).map_err(|e| {
        WispError::Download(format!("cannot create {}: {e}", dest.display()))
    })?;

    let started = Instant::now();
    let mut transferred: u64 = 0;
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| WispError::Download(format!("download read failed: {e}")))?;
        if n == 0 {
            break;
        }

        file.write_all(&buf[..n])
            .map_err(|e| WispError::Download(format!("download write failed: {e}")))?;

        transferred += n as u64;
        let elapsed = started.elapsed().as_secs_f64().max(1e-3);
        on_progress(DownloadProgress {
            bytes_per_second: (transferred as f64 / elapsed) as u64,
            percent: percent_of(transferred, total),
            transferred,
            total,
        });
    }

    file.flush()
        .map_err(|e| WispError::Download(format!("download flush failed: {e}")))?;

    tracing::info!("downloaded {url} to {} ({transferred} bytes)", dest.display());
    Ok(())
}

/// Completion percentage, `0` when the total is unknown.
fn percent_of(transferred: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (transferred as f64 / total as f64) * 100.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn percent_of_known_total() {
        assert!((percent_of(500, 1000) - 50.0).abs() < f64::EPSILON);
        assert!((percent_of(1000, 1000) - 100.0).abs() < f64::EPSILON);
        assert!(percent_of(0, 1000).abs() < f64::EPSILON);
    }

    #[test]
    fn percent_of_unknown_total_is_zero() {
        assert!(percent_of(12345, 0).abs() < f64::EPSILON);
    }
}
