//! The version window and its status display contract.
//!
//! There is no GUI toolkit here: [`VersionWindow`] is the handle the rest
//! of the shell talks to. It carries the version load fragment and records
//! the status lines the updater forwards, which is all the update flow
//! needs from a presentation layer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Fire-and-forget sink for human-readable status lines.
///
/// Callers never wait for acknowledgment; a sink that cannot display a
/// line drops it.
pub trait StatusSink: Send + Sync {
    /// Display one status line.
    fn display_status(&self, text: &str);
}

/// The single application window, displaying the running version.
///
/// Created once at startup and passed around as an explicit handle. After
/// [`close`](VersionWindow::close) the handle stays valid but further
/// status lines are dropped.
pub struct VersionWindow {
    title: String,
    load_fragment: String,
    open: AtomicBool,
    statuses: Mutex<Vec<String>>,
}

impl VersionWindow {
    /// Open the window for the given running version.
    pub fn open(title: &str, version: &str) -> Arc<Self> {
        Arc::new(Self {
            title: title.to_owned(),
            load_fragment: format!("v{version}"),
            open: AtomicBool::new(true),
            statuses: Mutex::new(Vec::new()),
        })
    }

    /// Window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// URL fragment carrying the running version (`v<version>`).
    pub fn load_fragment(&self) -> &str {
        &self.load_fragment
    }

    /// Returns `true` while the window has not been closed.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Close the window. Status lines arriving afterwards are dropped.
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    /// Status lines displayed so far, oldest first.
    pub fn statuses(&self) -> Vec<String> {
        self.statuses
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl StatusSink for VersionWindow {
    fn display_status(&self, text: &str) {
        if !self.is_open() {
            tracing::debug!("window closed, dropping status: {text}");
            return;
        }
        if let Ok(mut lines) = self.statuses.lock() {
            lines.push(text.to_owned());
        }
    }
}
