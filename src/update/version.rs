//! Version parsing and upgrade/downgrade decision logic.

use crate::error::{Result, WispError};
use semver::Version;

/// Direction of a pending update relative to the running version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDirection {
    /// The offered version sorts at or above the running one.
    Upgrade,
    /// The offered version sorts below the running one.
    Downgrade,
}

impl std::fmt::Display for UpdateDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upgrade => write!(f, "upgrade"),
            Self::Downgrade => write!(f, "downgrade"),
        }
    }
}

/// Parse a version string, tolerating a leading `v` tag prefix.
///
/// # Errors
///
/// Returns an error if the remainder is not a valid semantic version.
pub fn parse_version(raw: &str) -> Result<Version> {
    let trimmed = raw.trim();
    let candidate = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(candidate)
        .map_err(|e| WispError::Check(format!("invalid version {raw:?}: {e}")))
}

/// Decide the update direction by total semantic-version ordering.
///
/// `Downgrade` iff `server < current`, else `Upgrade`. Equal versions do
/// not normally reach this decision; they resolve to `Upgrade` for
/// determinism. The direction only affects the status text shown to the
/// user, never whether the download proceeds.
pub fn decide_direction(server: &Version, current: &Version) -> UpdateDirection {
    if server < current {
        UpdateDirection::Downgrade
    } else {
        UpdateDirection::Upgrade
    }
}
