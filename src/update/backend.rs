//! Platform update backends.
//!
//! Three concrete variants behind one capability trait, selected by host
//! platform identity. All of them share the generic feed client and the
//! progress-reporting downloader; they differ in artifact naming and
//! install mechanics (silent NSIS installer on Windows, binary replacement
//! on macOS and Linux).

use crate::config::UpdateConfig;
use crate::error::{Result, WispError};
use crate::update::download::download_artifact;
use crate::update::events::{UpdateCallback, UpdateEvent};
use crate::update::feed::{FeedClient, UpdateInfo, feed_target};
use semver::Version;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What the host process should do after a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The binary was replaced in place; relaunch it.
    RestartRequired {
        /// Path of the replaced binary.
        binary: PathBuf,
    },
    /// An installer was launched; the process should exit and let it finish.
    ExitRequired,
}

/// Common operation set every platform backend honors.
pub trait UpdateBackend {
    /// Ask the feed for the latest release.
    ///
    /// Emits [`UpdateEvent::CheckingForUpdate`], then
    /// [`UpdateEvent::UpdateAvailable`] when the offered version differs
    /// from the running one (in either direction) or
    /// [`UpdateEvent::UpdateNotAvailable`] otherwise. Returns `None` when
    /// the feed has nothing to offer.
    fn check_for_updates(&mut self) -> Result<Option<UpdateInfo>>;

    /// Download the artifact of the release reported by the last check.
    ///
    /// Emits [`UpdateEvent::DownloadProgress`] per chunk and
    /// [`UpdateEvent::UpdateDownloaded`] on completion. Returns the staged
    /// artifact path.
    fn download_update(&mut self) -> Result<PathBuf>;

    /// Install the downloaded artifact and report how to hand over.
    fn quit_and_install(&mut self) -> Result<InstallOutcome>;

    /// Register an `Authorization` header for feed and download requests.
    fn add_auth_header(&mut self, value: &str);

    /// Subscribe a callback to lifecycle events.
    fn subscribe(&mut self, callback: UpdateCallback);
}

/// Select the update backend for the given platform identifier.
///
/// `windows`, `macos`, and `linux` map to the NSIS, app-binary, and
/// AppImage backends; anything else is [`WispError::UnsupportedPlatform`].
pub fn select_backend(
    os: &str,
    config: &UpdateConfig,
    current_version: &Version,
) -> Result<Box<dyn UpdateBackend>> {
    match os {
        "windows" => Ok(Box::new(NsisBackend::new(config, current_version.clone()))),
        "macos" => Ok(Box::new(MacBackend::new(config, current_version.clone())?)),
        "linux" => Ok(Box::new(AppImageBackend::new(config, current_version.clone())?)),
        other => Err(WispError::UnsupportedPlatform(other.to_owned())),
    }
}

/// Shared generic-provider plumbing: feed access, event fan-out, download
/// staging. Each backend wraps one of these.
struct GenericProvider {
    feed: FeedClient,
    agent: ureq::Agent,
    headers: std::collections::BTreeMap<String, String>,
    auth_header: Option<String>,
    callbacks: Vec<UpdateCallback>,
    current_version: Version,
    target: String,
    fallback_artifact: &'static str,
    downloads_dir: PathBuf,
    /// Release reported by the last check.
    pending: Option<UpdateInfo>,
    /// Artifact staged by the last download.
    downloaded: Option<PathBuf>,
}

impl GenericProvider {
    fn new(
        config: &UpdateConfig,
        current_version: Version,
        os: &str,
        fallback_artifact: &'static str,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(15))
            .timeout_read(Duration::from_secs(300))
            .build();

        Self {
            feed: FeedClient::new(config),
            agent,
            headers: config.request_headers.clone(),
            auth_header: None,
            callbacks: Vec::new(),
            current_version,
            target: feed_target(os),
            fallback_artifact,
            downloads_dir: crate::wisp_dirs::downloads_dir(),
            pending: None,
            downloaded: None,
        }
    }

    fn add_auth_header(&mut self, value: &str) {
        self.auth_header = Some(value.to_owned());
        self.feed.set_auth_header(value);
    }

    fn subscribe(&mut self, callback: UpdateCallback) {
        self.callbacks.push(callback);
    }

    fn emit(&self, event: &UpdateEvent) {
        for callback in &self.callbacks {
            callback(event);
        }
    }

    fn emit_error(&self, error: &WispError) {
        self.emit(&UpdateEvent::Error {
            message: error.to_string(),
        });
    }

    fn check(&mut self) -> Result<Option<UpdateInfo>> {
        self.emit(&UpdateEvent::CheckingForUpdate);

        match self.feed.latest(&self.target, &self.current_version) {
            Ok(Some(info)) => {
                if info.version == self.current_version {
                    self.emit(&UpdateEvent::UpdateNotAvailable);
                } else {
                    self.emit(&UpdateEvent::UpdateAvailable { info: info.clone() });
                }
                self.pending = Some(info.clone());
                Ok(Some(info))
            }
            Ok(None) => {
                self.emit(&UpdateEvent::UpdateNotAvailable);
                self.pending = None;
                Ok(None)
            }
            Err(e) => {
                self.emit_error(&e);
                Err(e)
            }
        }
    }

    fn download(&mut self) -> Result<PathBuf> {
        let info = match &self.pending {
            Some(info) => info.clone(),
            None => {
                let err = WispError::Download("no pending release; check first".to_owned());
                self.emit_error(&err);
                return Err(err);
            }
        };

        let dest = self
            .downloads_dir
            .join(artifact_filename(&info.url, self.fallback_artifact));

        let callbacks = &self.callbacks;
        let result = download_artifact(
            &self.agent,
            &info.url,
            &self.headers,
            self.auth_header.as_deref(),
            &dest,
            |progress| {
                let event = UpdateEvent::DownloadProgress(progress);
                for callback in callbacks {
                    callback(&event);
                }
            },
        );

        match result {
            Ok(()) => {
                self.downloaded = Some(dest.clone());
                self.emit(&UpdateEvent::UpdateDownloaded { info });
                Ok(dest)
            }
            Err(e) => {
                self.emit_error(&e);
                Err(e)
            }
        }
    }

    fn require_downloaded(&self) -> Result<PathBuf> {
        match &self.downloaded {
            Some(path) => Ok(path.clone()),
            None => {
                let err = WispError::Install("no downloaded update; download first".to_owned());
                self.emit_error(&err);
                Err(err)
            }
        }
    }
}

/// Windows backend: the artifact is an NSIS installer executable.
pub struct NsisBackend {
    provider: GenericProvider,
}

impl NsisBackend {
    /// Build the backend from the update configuration.
    pub fn new(config: &UpdateConfig, current_version: Version) -> Self {
        Self {
            provider: GenericProvider::new(config, current_version, "windows", "wisp-setup.exe"),
        }
    }

    /// Override the download staging directory.
    #[must_use]
    pub fn with_downloads_dir(mut self, dir: PathBuf) -> Self {
        self.provider.downloads_dir = dir;
        self
    }
}

impl UpdateBackend for NsisBackend {
    fn check_for_updates(&mut self) -> Result<Option<UpdateInfo>> {
        self.provider.check()
    }

    fn download_update(&mut self) -> Result<PathBuf> {
        self.provider.download()
    }

    fn quit_and_install(&mut self) -> Result<InstallOutcome> {
        let installer = self.provider.require_downloaded()?;

        // Silent mode; the installer finishes after this process exits.
        match std::process::Command::new(&installer).arg("/S").spawn() {
            Ok(_) => Ok(InstallOutcome::ExitRequired),
            Err(e) => {
                let err = WispError::Install(format!(
                    "cannot launch installer {}: {e}",
                    installer.display()
                ));
                self.provider.emit_error(&err);
                Err(err)
            }
        }
    }

    fn add_auth_header(&mut self, value: &str) {
        self.provider.add_auth_header(value);
    }

    fn subscribe(&mut self, callback: UpdateCallback) {
        self.provider.subscribe(callback);
    }
}

/// macOS backend: the artifact replaces the running binary, with the
/// quarantine attribute cleared afterwards.
pub struct MacBackend {
    provider: GenericProvider,
    install_target: PathBuf,
}

impl MacBackend {
    /// Build the backend from the update configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the running executable path cannot be determined.
    pub fn new(config: &UpdateConfig, current_version: Version) -> Result<Self> {
        Ok(Self {
            provider: GenericProvider::new(config, current_version, "macos", "wisp"),
            install_target: current_exe_path()?,
        })
    }

    /// Override where the updated binary lands.
    #[must_use]
    pub fn with_install_target(mut self, target: PathBuf) -> Self {
        self.install_target = target;
        self
    }

    /// Override the download staging directory.
    #[must_use]
    pub fn with_downloads_dir(mut self, dir: PathBuf) -> Self {
        self.provider.downloads_dir = dir;
        self
    }
}

impl UpdateBackend for MacBackend {
    fn check_for_updates(&mut self) -> Result<Option<UpdateInfo>> {
        self.provider.check()
    }

    fn download_update(&mut self) -> Result<PathBuf> {
        self.provider.download()
    }

    fn quit_and_install(&mut self) -> Result<InstallOutcome> {
        let artifact = self.provider.require_downloaded()?;

        match replace_binary(&artifact, &self.install_target, true) {
            Ok(()) => Ok(InstallOutcome::RestartRequired {
                binary: self.install_target.clone(),
            }),
            Err(e) => {
                self.provider.emit_error(&e);
                Err(e)
            }
        }
    }

    fn add_auth_header(&mut self, value: &str) {
        self.provider.add_auth_header(value);
    }

    fn subscribe(&mut self, callback: UpdateCallback) {
        self.provider.subscribe(callback);
    }
}

/// Linux backend: the artifact replaces the running AppImage.
pub struct AppImageBackend {
    provider: GenericProvider,
    install_target: PathBuf,
}

impl AppImageBackend {
    /// Build the backend from the update configuration.
    ///
    /// The install target is the AppImage the process was launched from
    /// (`$APPIMAGE`), falling back to the running executable.
    ///
    /// # Errors
    ///
    /// Returns an error if neither can be determined.
    pub fn new(config: &UpdateConfig, current_version: Version) -> Result<Self> {
        let install_target = match std::env::var_os("APPIMAGE") {
            Some(path) => PathBuf::from(path),
            None => current_exe_path()?,
        };

        Ok(Self {
            provider: GenericProvider::new(config, current_version, "linux", "wisp.AppImage"),
            install_target,
        })
    }

    /// Override where the updated AppImage lands.
    #[must_use]
    pub fn with_install_target(mut self, target: PathBuf) -> Self {
        self.install_target = target;
        self
    }

    /// Override the download staging directory.
    #[must_use]
    pub fn with_downloads_dir(mut self, dir: PathBuf) -> Self {
        self.provider.downloads_dir = dir;
        self
    }
}

impl UpdateBackend for AppImageBackend {
    fn check_for_updates(&mut self) -> Result<Option<UpdateInfo>> {
        self.provider.check()
    }

    fn download_update(&mut self) -> Result<PathBuf> {
        self.provider.download()
    }

    fn quit_and_install(&mut self) -> Result<InstallOutcome> {
        let artifact = self.provider.require_downloaded()?;

        match replace_binary(&artifact, &self.install_target, false) {
            Ok(()) => Ok(InstallOutcome::RestartRequired {
                binary: self.install_target.clone(),
            }),
            Err(e) => {
                self.provider.emit_error(&e);
                Err(e)
            }
        }
    }

    fn add_auth_header(&mut self, value: &str) {
        self.provider.add_auth_header(value);
    }

    fn subscribe(&mut self, callback: UpdateCallback) {
        self.provider.subscribe(callback);
    }
}

/// Returns the path to the currently running executable.
///
/// # Errors
///
/// Returns an error if the path cannot be determined.
pub fn current_exe_path() -> Result<PathBuf> {
    std::env::current_exe()
        .map_err(|e| WispError::Install(format!("cannot determine current executable path: {e}")))
}

/// Artifact filename from a release URL, ignoring query and fragment.
fn artifact_filename(url: &str, fallback: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| fallback.to_owned())
}

/// Replace `target` with `artifact`: rename old → backup, copy new into
/// place, restore the backup on failure.
fn replace_binary(artifact: &Path, target: &Path, clear_quarantine: bool) -> Result<()> {
    let metadata = std::fs::metadata(artifact).map_err(|e| {
        WispError::Install(format!("cannot stat artifact {}: {e}", artifact.display()))
    })?;
    if metadata.len() == 0 {
        return Err(WispError::Install(format!(
            "downloaded artifact {} is empty",
            artifact.display()
        )));
    }

    let backup = target.with_extension("old");

    if target.exists() {
        std::fs::rename(target, &backup).map_err(|e| {
            WispError::Install(format!(
                "cannot backup current binary {} → {}: {e}",
                target.display(),
                backup.display()
            ))
        })?;
    }

    std::fs::copy(artifact, target).map_err(|e| {
        if backup.exists() {
            let _ = std::fs::rename(&backup, target);
        }
        WispError::Install(format!(
            "cannot install new binary to {}: {e}",
            target.display()
        ))
    })?;

    set_executable(target)?;

    if clear_quarantine && cfg!(target_os = "macos") {
        let _ = std::process::Command::new("xattr")
            .args(["-c", &target.to_string_lossy()])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status();
    }

    let _ = std::fs::remove_file(&backup);

    tracing::info!("binary updated at {}", target.display());
    Ok(())
}

/// Set executable permission on Unix platforms.
fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
            WispError::Install(format!(
                "cannot set executable permission on {}: {e}",
                path.display()
            ))
        })?;
    }
    let _ = path; // Suppress unused warning on Windows.
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn test_config() -> UpdateConfig {
        UpdateConfig {
            url: "https://updates.example.com/feed".to_owned(),
            ..Default::default()
        }
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn select_backend_rejects_unknown_platform() {
        let err = select_backend("freebsd", &test_config(), &v("1.2.0")).err().unwrap();
        assert!(matches!(err, WispError::UnsupportedPlatform(p) if p == "freebsd"));
    }

    #[test]
    fn select_backend_covers_supported_platforms() {
        for os in ["windows", "macos", "linux"] {
            assert!(select_backend(os, &test_config(), &v("1.2.0")).is_ok(), "{os}");
        }
    }

    #[test]
    fn artifact_filename_from_url() {
        assert_eq!(
            artifact_filename("https://d.example/wisp-1.3.0.AppImage", "wisp.AppImage"),
            "wisp-1.3.0.AppImage"
        );
        assert_eq!(
            artifact_filename("https://d.example/path/wisp-setup.exe?token=abc", "fallback"),
            "wisp-setup.exe"
        );
    }

    #[test]
    fn artifact_filename_falls_back_on_bare_url() {
        assert_eq!(artifact_filename("https://d.example/", "wisp.AppImage"), "wisp.AppImage");
    }

    #[test]
    fn current_exe_path_returns_ok() {
        let path = current_exe_path();
        assert!(path.is_ok());
        assert!(path.unwrap().exists());
    }

    #[test]
    fn replace_binary_swaps_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("wisp");
        let artifact = dir.path().join("wisp-new");

        std::fs::write(&target, "old-content").unwrap();
        std::fs::write(&artifact, "new-content").unwrap();

        replace_binary(&artifact, &target, false).unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new-content");
        // Backup should have been cleaned up.
        assert!(!target.with_extension("old").exists());
    }

    #[test]
    fn replace_binary_creates_from_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("wisp");
        let artifact = dir.path().join("wisp-new");

        std::fs::write(&artifact, "new-content").unwrap();

        replace_binary(&artifact, &target, false).unwrap();
        assert!(target.exists());
    }

    #[test]
    fn replace_binary_rejects_empty_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("wisp");
        let artifact = dir.path().join("wisp-new");

        std::fs::write(&target, "old-content").unwrap();
        std::fs::write(&artifact, "").unwrap();

        let err = replace_binary(&artifact, &target, false).unwrap_err();
        assert!(matches!(err, WispError::Install(_)));
        // The running binary is untouched.
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "old-content");
    }

    #[cfg(unix)]
    #[test]
    fn replace_binary_sets_executable_permission() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("wisp");
        let artifact = dir.path().join("wisp-new");
        std::fs::write(&artifact, "#!/bin/sh\necho ok").unwrap();

        replace_binary(&artifact, &target, false).unwrap();

        let perms = std::fs::metadata(&target).unwrap().permissions();
        assert_eq!(perms.mode() & 0o111, 0o111);
    }

    #[test]
    fn download_without_check_is_an_error() {
        let mut backend = NsisBackend::new(&test_config(), v("1.2.0"));
        let err = backend.download_update().unwrap_err();
        assert!(matches!(err, WispError::Download(_)));
    }

    #[test]
    fn install_without_download_is_an_error() {
        let mut backend =
            AppImageBackend::new(&test_config(), v("1.2.0")).unwrap();
        let err = backend.quit_and_install().unwrap_err();
        assert!(matches!(err, WispError::Install(_)));
    }
}
