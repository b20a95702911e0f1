//! The update orchestrator.
//!
//! Drives exactly one check → decide → download → install cycle per
//! application launch, forwarding every backend event as a human-readable
//! status line to the window and the log.

use crate::config::UpdateConfig;
use crate::error::Result;
use crate::update::backend::{InstallOutcome, UpdateBackend, select_backend};
use crate::update::events::UpdateEvent;
use crate::update::version::{UpdateDirection, decide_direction};
use crate::window::StatusSink;
use semver::Version;
use std::sync::Arc;

/// Where the single per-launch cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleState {
    Idle,
    Running,
    Done,
}

/// Update orchestrator: one backend, one display handle, one cycle.
pub struct AppUpdater {
    backend: Box<dyn UpdateBackend>,
    window: Arc<dyn StatusSink>,
    current_version: Version,
    state: CycleState,
    outcome: Option<InstallOutcome>,
}

impl AppUpdater {
    /// Initialize the updater for the running platform and immediately run
    /// one update cycle.
    ///
    /// On an unsupported platform this reports the error once and returns
    /// `None`; the application continues without an updater.
    pub fn initialize(
        window: Arc<dyn StatusSink>,
        config: &UpdateConfig,
        current_version: Version,
    ) -> Option<Self> {
        Self::initialize_for_platform(std::env::consts::OS, window, config, current_version)
    }

    /// Platform-explicit variant of [`AppUpdater::initialize`].
    pub fn initialize_for_platform(
        os: &str,
        window: Arc<dyn StatusSink>,
        config: &UpdateConfig,
        current_version: Version,
    ) -> Option<Self> {
        let backend = match select_backend(os, config, &current_version) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::error!("auto-updater disabled: {e}");
                return None;
            }
        };

        let mut updater = Self::with_backend(backend, window, config, current_version);
        updater.check_for_updates();
        Some(updater)
    }

    /// Build an updater around an already-selected backend.
    ///
    /// Registers the auth header and the status-forwarding subscription but
    /// does not start a check.
    pub fn with_backend(
        mut backend: Box<dyn UpdateBackend>,
        window: Arc<dyn StatusSink>,
        config: &UpdateConfig,
        current_version: Version,
    ) -> Self {
        if let Some(token) = &config.auth_token {
            backend.add_auth_header(&format!("Bearer {token}"));
        }

        let sink = Arc::clone(&window);
        backend.subscribe(Box::new(move |event| forward_status(sink.as_ref(), event)));

        Self {
            backend,
            window,
            current_version,
            state: CycleState::Idle,
            outcome: None,
        }
    }

    /// Run the check → decide → download → install cycle.
    ///
    /// Failures are surfaced as status text and end the cycle; nothing is
    /// retried and nothing escalates to the host application. Re-triggers
    /// while a cycle runs or after it finished are ignored, so a second
    /// download can never start.
    pub fn check_for_updates(&mut self) {
        match self.state {
            CycleState::Running => {
                tracing::warn!("update cycle already in flight; ignoring re-trigger");
                return;
            }
            CycleState::Done => {
                tracing::warn!("update cycle already ran this launch; ignoring re-trigger");
                return;
            }
            CycleState::Idle => {}
        }

        self.state = CycleState::Running;
        if let Err(e) = self.run_cycle() {
            // Already surfaced through the event stream; the cycle just ends.
            tracing::error!("update cycle ended early: {e}");
        }
        self.state = CycleState::Done;
    }

    /// Outcome of the install step, if the cycle got that far.
    pub fn install_outcome(&self) -> Option<&InstallOutcome> {
        self.outcome.as_ref()
    }

    /// Consume the updater, yielding the install outcome.
    pub fn into_install_outcome(self) -> Option<InstallOutcome> {
        self.outcome
    }

    fn run_cycle(&mut self) -> Result<()> {
        let info = match self.backend.check_for_updates()? {
            Some(info) => info,
            None => return Ok(()),
        };

        if info.version == self.current_version {
            return Ok(());
        }

        let direction = decide_direction(&info.version, &self.current_version);
        self.send_status(match direction {
            UpdateDirection::Downgrade => "Downgrade available. Proceeding with downgrade...",
            UpdateDirection::Upgrade => "Upgrade available. Proceeding with upgrade...",
        });

        self.backend.download_update()?;
        let outcome = self.backend.quit_and_install()?;
        self.outcome = Some(outcome);
        Ok(())
    }

    fn send_status(&self, text: &str) {
        tracing::info!("{text}");
        self.window.display_status(text);
    }
}

/// Convert a backend event into the status line the window shows,
/// mirroring the console output.
fn forward_status(sink: &dyn StatusSink, event: &UpdateEvent) {
    let text = match event {
        UpdateEvent::CheckingForUpdate => "Checking for update...".to_owned(),
        UpdateEvent::UpdateAvailable { .. } => "Update available.".to_owned(),
        UpdateEvent::UpdateNotAvailable => "Update not available.".to_owned(),
        UpdateEvent::Error { message } => format!("Error in auto-updater. {message}"),
        UpdateEvent::DownloadProgress(progress) => format!(
            "Download speed: {} - Downloaded {}% ({}/{})",
            progress.bytes_per_second,
            progress.percent.round(),
            progress.transferred,
            progress.total
        ),
        UpdateEvent::UpdateDownloaded { .. } => "Update downloaded".to_owned(),
    };

    tracing::info!("{text}");
    sink.display_status(&text);
}
