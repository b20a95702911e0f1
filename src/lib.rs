//! Wisp: a minimal self-updating desktop application shell.
//!
//! Opens a single window displaying the running version, builds a
//! platform-conditional menu template, and drives one auto-update cycle
//! per launch: check → decide → download → install.
//!
//! # Architecture
//!
//! - **Window / menu**: plain handle and data types standing in for the
//!   presentation layer; the updater only depends on the [`StatusSink`]
//!   contract.
//! - **Orchestrator**: [`AppUpdater`] selects a platform backend, forwards
//!   its lifecycle events as status text to the window and log, and decides
//!   upgrade vs downgrade by semantic-version comparison.
//! - **Backends**: NSIS installer (Windows), binary replacement (macOS),
//!   AppImage replacement (Linux), all served by one generic HTTP feed.

pub mod app;
pub mod config;
pub mod error;
pub mod menu;
pub mod update;
pub mod window;
pub mod wisp_dirs;

pub use app::{App, Shutdown};
pub use config::{UpdateConfig, WispConfig};
pub use error::{Result, WispError};
pub use update::{AppUpdater, UpdateBackend, UpdateEvent};
pub use window::{StatusSink, VersionWindow};
