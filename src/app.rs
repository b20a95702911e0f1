//! Application lifecycle.
//!
//! Ready → build the menu template, open the version window, start the
//! updater (which immediately runs its one cycle). When the window closes
//! the process winds down; a successful install turns the shutdown into a
//! restart or an exit-for-installer handover.

use crate::config::WispConfig;
use crate::error::Result;
use crate::menu::build_menu;
use crate::update::backend::InstallOutcome;
use crate::update::orchestrator::AppUpdater;
use crate::update::version::parse_version;
use crate::window::{StatusSink, VersionWindow};
use std::path::PathBuf;
use std::sync::Arc;

/// Application name, used for the menu template.
pub const APP_NAME: &str = "Wisp";

/// How the process should wind down after the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shutdown {
    /// Plain exit (also the handover to a launched installer).
    Exit,
    /// Relaunch the freshly installed binary, then exit.
    Restart {
        /// Binary to relaunch.
        binary: PathBuf,
    },
}

/// The application shell.
pub struct App {
    config: WispConfig,
}

impl App {
    /// Build the shell from loaded configuration.
    pub fn new(config: WispConfig) -> Self {
        Self { config }
    }

    /// Run the application and report how to shut down.
    ///
    /// # Errors
    ///
    /// Returns an error only if the running version cannot be parsed;
    /// updater failures never escalate here.
    pub fn run(&self) -> Result<Shutdown> {
        let version = parse_version(env!("CARGO_PKG_VERSION"))?;

        let menu = build_menu(std::env::consts::OS, APP_NAME);
        tracing::debug!("menu template has {} submenus", menu.len());

        let window = VersionWindow::open(&self.config.window.title, &version.to_string());
        tracing::info!("window loaded with fragment {}", window.load_fragment());

        let updater = AppUpdater::initialize(
            Arc::clone(&window) as Arc<dyn StatusSink>,
            &self.config.update,
            version,
        );
        let outcome = updater.and_then(AppUpdater::into_install_outcome);

        window.close();

        Ok(match outcome {
            Some(InstallOutcome::RestartRequired { binary }) => Shutdown::Restart { binary },
            Some(InstallOutcome::ExitRequired) | None => Shutdown::Exit,
        })
    }
}
