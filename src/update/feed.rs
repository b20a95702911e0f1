//! Generic update feed client.
//!
//! Queries a dynamic update server over plain HTTP:
//! `GET {base}/{target}/{current_version}` answers `200` with the latest
//! release as JSON, or `204 No Content` when there is nothing to offer.
//! The request carries the configured custom headers plus the registered
//! `Authorization` header.

use crate::config::UpdateConfig;
use crate::error::{Result, WispError};
use crate::update::version::parse_version;
use chrono::{DateTime, Utc};
use semver::Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::time::Duration;

/// Latest-release metadata reported by the update feed.
///
/// Everything besides `version` is opaque to the orchestrator.
#[derive(Debug, Clone)]
pub struct UpdateInfo {
    /// The offered version.
    pub version: Version,
    /// When the release was published.
    pub pub_date: Option<DateTime<Utc>>,
    /// Download URL of the platform artifact.
    pub url: String,
    /// Publisher signature over the artifact, if the feed provides one.
    pub signature: Option<String>,
    /// Release notes.
    pub notes: Option<String>,
}

/// Wire format of a feed response.
#[derive(Debug, Deserialize)]
struct FeedResponse {
    version: String,
    pub_date: Option<DateTime<Utc>>,
    url: String,
    signature: Option<String>,
    notes: Option<String>,
}

/// Returns the feed target identifier for a platform (`{os}-{arch}`).
pub fn feed_target(os: &str) -> String {
    format!("{os}-{}", std::env::consts::ARCH)
}

/// HTTP client for the generic update feed.
pub struct FeedClient {
    agent: ureq::Agent,
    base_url: String,
    headers: BTreeMap<String, String>,
    auth_header: Option<String>,
}

impl FeedClient {
    /// Build a client from the update configuration.
    pub fn new(config: &UpdateConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(15))
            .timeout_read(Duration::from_secs(30))
            .build();

        Self {
            agent,
            base_url: config.url.trim_end_matches('/').to_owned(),
            headers: config.request_headers.clone(),
            auth_header: None,
        }
    }

    /// Register an `Authorization` header value for every feed request.
    pub fn set_auth_header(&mut self, value: &str) {
        self.auth_header = Some(value.to_owned());
    }

    /// Fetch the latest release for the given platform target.
    ///
    /// Returns `None` when the server answers `204 No Content`.
    ///
    /// # Errors
    ///
    /// Returns [`WispError::Check`] on transport failure, a non-success
    /// status, or a malformed response body.
    pub fn latest(&self, target: &str, current_version: &Version) -> Result<Option<UpdateInfo>> {
        let url = format!("{}/{}/{}", self.base_url, target, current_version);

        let mut request = self.agent.get(&url).set("Accept", "application/json");
        for (name, value) in &self.headers {
            request = request.set(name, value);
        }
        if let Some(auth) = &self.auth_header {
            request = request.set("Authorization", auth);
        }

        let response = request
            .call()
            .map_err(|e| WispError::Check(format!("feed request failed: {e}")))?;

        if response.status() == 204 {
            return Ok(None);
        }

        let mut body = String::new();
        response
            .into_reader()
            .read_to_string(&mut body)
            .map_err(|e| WispError::Check(format!("cannot read feed response: {e}")))?;

        parse_feed_body(&body).map(Some)
    }
}

/// Parse a feed response body into [`UpdateInfo`].
fn parse_feed_body(body: &str) -> Result<UpdateInfo> {
    let wire: FeedResponse = serde_json::from_str(body)
        .map_err(|e| WispError::Check(format!("malformed feed response: {e}")))?;

    Ok(UpdateInfo {
        version: parse_version(&wire.version)?,
        pub_date: wire.pub_date,
        url: wire.url,
        signature: wire.signature,
        notes: wire.notes,
    })
}
