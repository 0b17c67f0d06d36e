//! REST backend.
//!
//! [`RestClient`] implements [`FileSystem`] on top of the cluster's `/v1`
//! HTTP API. Every call is blocking and is attempted exactly once.
//!
//! # Authentication
//!
//! A client starts without a session. Either log in with a username and
//! password ([`RestClient::login`]) or attach a pre-issued access token
//! ([`RestClient::with_access_token`]); both end up as a bearer token on
//! every subsequent request.

use crate::backend::FileSystem;
use crate::error::{Error, Result};
use crate::types::{DirAggregates, FileAttributes, FileRef};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Default REST port of a cluster.
pub const DEFAULT_PORT: u16 = 8000;

/// Blocking HTTP client for one cluster.
pub struct RestClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// `https://host:port`
    base_url: String,
    /// Bearer token, once authenticated.
    token: Option<String>,
}

impl RestClient {
    /// Create a client for `https://{address}:{port}`.
    ///
    /// Clusters usually present self-signed certificates, so certificate
    /// verification is only performed when `verify_tls` is set.
    #[must_use]
    pub fn new(address: &str, port: u16, verify_tls: bool) -> Self {
        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(!verify_tls)
            .build();
        let config = ureq::Agent::config_builder().tls_config(tls).build();

        Self {
            agent: ureq::Agent::new_with_config(config),
            base_url: format!("https://{}:{}", address, port),
            token: None,
        }
    }

    /// Create a client with a custom base URL (for testing).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Use a pre-issued access token instead of logging in.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a bearer token is attached.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Log in and keep the returned bearer token for later requests.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let url = format!("{}/v1/session/login", self.base_url);
        log::debug!("Logging in to {} as {}", self.base_url, username);

        let body = LoginRequest { username, password };
        let response: LoginResponse = self
            .agent
            .post(&url)
            .send_json(&body)
            .map_err(|e| match Error::from(e) {
                Error::Http {
                    status: Some(code @ (401 | 403)),
                    ..
                } => Error::Authentication(format!("cluster rejected login (HTTP {})", code)),
                other => other,
            })?
            .body_mut()
            .read_json()?;

        self.token = Some(response.bearer_token);
        Ok(())
    }

    fn files_url(&self, file: &FileRef, endpoint: &str) -> String {
        format!("{}/v1/files/{}/{}", self.base_url, file.url_segment(), endpoint)
    }

    fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| Error::Authentication("no session, log in first".to_string()))?;

        log::debug!("GET {}", url);
        let value = self
            .agent
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .call()?
            .body_mut()
            .read_json()?;
        Ok(value)
    }
}

impl FileSystem for RestClient {
    fn aggregates(&self, file: &FileRef) -> Result<DirAggregates> {
        self.get(&self.files_url(file, "aggregates/"))
    }

    fn recursive_aggregates(&self, file: &FileRef, max_depth: u32) -> Result<Vec<DirAggregates>> {
        let url = format!(
            "{}?max-depth={}",
            self.files_url(file, "recursive-aggregates/"),
            max_depth
        );
        self.get(&url)
    }

    fn attributes(&self, file: &FileRef) -> Result<FileAttributes> {
        self.get(&self.files_url(file, "info/attributes"))
    }

    fn cluster_name(&self) -> Result<String> {
        let url = format!("{}/v1/cluster/settings", self.base_url);
        let settings: ClusterSettings = self.get(&url)?;
        Ok(settings.cluster_name)
    }
}

// =============================================================================
// API request/response types
// =============================================================================

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    bearer_token: String,
}

#[derive(Debug, Deserialize)]
struct ClusterSettings {
    cluster_name: String,
}
