//! Centralized application directory paths for Wisp.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution,
//! which is sandbox-transparent on macOS (returns container-relative paths
//! under App Sandbox automatically).
//!
//! # Environment Overrides
//!
//! - `WISP_CONFIG_DIR` — overrides [`config_dir`]
//! - `WISP_CACHE_DIR` — overrides [`cache_dir`]

use std::path::PathBuf;

/// Application config directory.
///
/// Used for `config.toml`. Resolves to `dirs::config_dir()/wisp/` by
/// default. Override with the `WISP_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("WISP_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("wisp"))
        .unwrap_or_else(|| PathBuf::from("/tmp/wisp-config"))
}

/// Application cache directory.
///
/// Used for downloaded update artifacts and other expendable data.
/// Resolves to `dirs::cache_dir()/wisp/` by default. Override with the
/// `WISP_CACHE_DIR` environment variable.
#[must_use]
pub fn cache_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("WISP_CACHE_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::cache_dir()
        .map(|d| d.join("wisp"))
        .unwrap_or_else(|| PathBuf::from("/tmp/wisp-cache"))
}

/// Download staging directory (`cache_dir()/downloads/`).
#[must_use]
pub fn downloads_dir() -> PathBuf {
    cache_dir().join("downloads")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn config_dir_ends_with_app_name() {
        let dir = config_dir();
        let path_str = dir.to_string_lossy();
        assert!(path_str.contains("wisp"), "unexpected config dir: {path_str}");
    }

    #[test]
    fn cache_dir_ends_with_app_name() {
        let dir = cache_dir();
        let path_str = dir.to_string_lossy();
        assert!(path_str.contains("wisp"), "unexpected cache dir: {path_str}");
    }

    #[test]
    fn downloads_dir_is_under_cache_dir() {
        assert!(downloads_dir().starts_with(cache_dir()));
        assert!(downloads_dir().ends_with("downloads"));
    }
}
