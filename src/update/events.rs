//! Lifecycle events emitted by update backends.
//!
//! Callback-based reporting that decouples the backend's check/download
//! machinery from presentation: the orchestrator turns each event into a
//! status line for the window and log.

use crate::update::feed::UpdateInfo;

/// Snapshot of an in-flight download.
///
/// Emitted repeatedly while chunks arrive; never persisted.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    /// Average transfer rate since the download started.
    pub bytes_per_second: u64,
    /// Completion percentage in `[0, 100]`. `0` when the total is unknown.
    pub percent: f64,
    /// Bytes received so far.
    pub transferred: u64,
    /// Total bytes expected, from `Content-Length`. `0` when unknown.
    pub total: u64,
}

/// Events emitted by an update backend over one check/download cycle.
#[derive(Debug, Clone)]
pub enum UpdateEvent {
    /// A feed check has started.
    CheckingForUpdate,
    /// The feed offered a version different from the running one.
    UpdateAvailable {
        /// The offered release.
        info: UpdateInfo,
    },
    /// The feed offered nothing, or the same version that is running.
    UpdateNotAvailable,
    /// A check, download, or install step failed.
    Error {
        /// Human-readable failure description.
        message: String,
    },
    /// Download progress update.
    DownloadProgress(DownloadProgress),
    /// The update artifact is fully downloaded.
    UpdateDownloaded {
        /// The downloaded release.
        info: UpdateInfo,
    },
}

/// Callback type for receiving update events.
pub type UpdateCallback = Box<dyn Fn(&UpdateEvent) + Send + Sync>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn callback_receives_events_in_order() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let callback: UpdateCallback = Box::new(move |event| {
            let label = match event {
                UpdateEvent::CheckingForUpdate => "checking",
                UpdateEvent::UpdateAvailable { .. } => "available",
                UpdateEvent::UpdateNotAvailable => "not-available",
                UpdateEvent::Error { .. } => "error",
                UpdateEvent::DownloadProgress(_) => "progress",
                UpdateEvent::UpdateDownloaded { .. } => "downloaded",
            };
            let Ok(mut guard) = seen_clone.lock() else {
                return;
            };
            guard.push(label.to_owned());
        });

        callback(&UpdateEvent::CheckingForUpdate);
        callback(&UpdateEvent::DownloadProgress(DownloadProgress {
            bytes_per_second: 1024,
            percent: 50.0,
            transferred: 512,
            total: 1024,
        }));
        callback(&UpdateEvent::UpdateNotAvailable);

        let guard = seen.lock().unwrap();
        assert_eq!(*guard, vec!["checking", "progress", "not-available"]);
    }

    #[test]
    fn progress_fields_are_preserved() {
        let progress = DownloadProgress {
            bytes_per_second: 2048,
            percent: 12.5,
            transferred: 125,
            total: 1000,
        };
        let event = UpdateEvent::DownloadProgress(progress.clone());
        match event {
            UpdateEvent::DownloadProgress(p) => {
                assert_eq!(p.bytes_per_second, 2048);
                assert!((p.percent - 12.5).abs() < f64::EPSILON);
                assert_eq!(p.transferred, 125);
                assert_eq!(p.total, 1000);
            }
            _ => panic!("expected DownloadProgress"),
        }
    }
}
