//! Auto-update subsystem.
//!
//! Checks a generic update feed for a different version, downloads the
//! platform artifact with progress reporting, and installs it with
//! platform-specific mechanics: silent NSIS installer on Windows, binary
//! replacement on macOS, AppImage replacement on Linux.

pub mod backend;
pub mod download;
pub mod events;
pub mod feed;
pub mod orchestrator;
pub mod version;

pub use backend::{InstallOutcome, UpdateBackend, select_backend};
pub use events::{DownloadProgress, UpdateCallback, UpdateEvent};
pub use feed::{FeedClient, UpdateInfo};
pub use orchestrator::AppUpdater;
pub use version::{UpdateDirection, decide_direction, parse_version};
