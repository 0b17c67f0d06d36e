//! Configuration: the JSON file, command-line overrides and per-mode
//! validation into [`Settings`].

use crate::Mode;
use crate::cli::Cli;
use crate::mailer::SmtpSecurity;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the snapshot lives unless `directories.snapshot_file` says otherwise.
pub const DEFAULT_SNAPSHOT_FILE: &str = "./config/previous_dir_usages.json";

/// Default SMTP port when neither the file nor the CLI give one.
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// InfluxDB HTTP port used when `influxdb.address` is a bare host.
pub const DEFAULT_INFLUX_PORT: u16 = 8086;

// ============================================================================
// Config file
// ============================================================================

/// The config file as written on disk. Every key is optional here; what is
/// actually required depends on the mode and is checked in
/// [`Settings::resolve`].
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub cluster: ClusterSection,
    #[serde(default)]
    pub directories: DirectoriesSection,
    pub email: Option<EmailSection>,
    pub influxdb: Option<InfluxSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClusterSection {
    pub address: Option<String>,
    pub port: Option<NumberOrString>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub access_token: Option<String>,
    #[serde(default)]
    pub verify_tls: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DirectoriesSection {
    pub dir_paths: Option<Vec<String>>,
    pub max_depth: Option<NumberOrString>,
    pub snapshot_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailSection {
    pub from: Option<String>,
    pub to: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub server: Option<String>,
    pub port: Option<NumberOrString>,
    #[serde(rename = "use")]
    pub security: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InfluxSection {
    pub address: Option<String>,
    pub token: Option<String>,
    pub org_name: Option<String>,
    pub bucket_name: Option<String>,
}

/// Ports and depths show up both as `587` and `"587"` in hand-written files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(u64),
    Text(String),
}

impl NumberOrString {
    fn parse<T: TryFrom<u64>>(&self, key: &str) -> Result<T> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<u64>()
                .with_context(|| format!("`{}` is not a number: {:?}", key, s))?,
        };
        T::try_from(value)
            .map_err(|_| anyhow::anyhow!("`{}` is out of range: {}", key, value))
    }
}

impl ConfigFile {
    /// Load and parse a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config format in {}", path.display()))
    }
}

// ============================================================================
// Resolved settings
// ============================================================================

/// Everything a run needs, validated for one mode.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cluster: ClusterSettings,
    pub directories: DirectorySettings,
    pub output: Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSettings {
    pub address: String,
    pub port: u16,
    pub auth: ClusterAuth,
    pub verify_tls: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterAuth {
    AccessToken(String),
    Password { username: String, password: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySettings {
    pub dir_paths: Vec<String>,
    pub max_depth: u32,
    pub snapshot_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Email(EmailSettings),
    Influx(InfluxSettings),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub from: String,
    pub to: Vec<String>,
    /// `None` when no SMTP login is configured.
    pub credentials: Option<(String, String)>,
    pub server: String,
    pub port: u16,
    pub security: SmtpSecurity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfluxSettings {
    /// `http://host:8086`, or the configured address verbatim if it already
    /// carries a scheme.
    pub url: String,
    pub token: String,
    pub org_name: String,
    pub bucket_name: String,
}

impl Settings {
    /// Merge the optional config file with command-line overrides and
    /// validate the result for `mode`.
    pub fn resolve(mode: Mode, file: Option<ConfigFile>, cli: &Cli) -> Result<Self> {
        let file = file.unwrap_or_default();

        let cluster = resolve_cluster(file.cluster, cli)?;
        let directories = resolve_directories(file.directories, cli)?;
        let output = match mode {
            Mode::Email => Output::Email(resolve_email(file.email, cli)?),
            Mode::Influx => Output::Influx(resolve_influx(file.influxdb)?),
        };

        Ok(Self {
            cluster,
            directories,
            output,
        })
    }
}

/// CLI value if given, else the file value; empty strings count as unset.
fn pick(cli: Option<&String>, file: Option<String>) -> Option<String> {
    cli.cloned()
        .or(file)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Like [`pick`], but the value is kept byte for byte.
fn pick_secret(cli: Option<&String>, file: Option<String>) -> Option<String> {
    cli.cloned().or(file).filter(|v| !v.is_empty())
}

fn require(value: Option<String>, key: &str) -> Result<String> {
    value.with_context(|| format!("missing required key `{}`", key))
}

fn resolve_cluster(section: ClusterSection, cli: &Cli) -> Result<ClusterSettings> {
    let args = cli.cluster.as_ref();

    let address = require(
        pick(args.and_then(|a| a.address.as_ref()), section.address),
        "cluster.address",
    )?;
    let port = match (args.and_then(|a| a.port), section.port) {
        (Some(port), _) => port,
        (None, Some(port)) => port.parse("cluster.port")?,
        (None, None) => qumulo::DEFAULT_PORT,
    };

    let token = pick_secret(args.and_then(|a| a.access_token.as_ref()), section.access_token);
    let username = pick(args.and_then(|a| a.username.as_ref()), section.username);
    let password = pick_secret(args.and_then(|a| a.password.as_ref()), section.password);

    let auth = match (token, username, password) {
        (Some(token), _, _) => ClusterAuth::AccessToken(token),
        (None, Some(username), Some(password)) => ClusterAuth::Password { username, password },
        _ => bail!(
            "missing cluster credentials: set `cluster.access_token` or both \
             `cluster.username` and `cluster.password`"
        ),
    };

    Ok(ClusterSettings {
        address,
        port,
        auth,
        verify_tls: section.verify_tls,
    })
}

fn resolve_directories(section: DirectoriesSection, cli: &Cli) -> Result<DirectorySettings> {
    let args = cli.directories.as_ref();

    let dir_paths = match args.filter(|a| !a.dir_paths.is_empty()) {
        Some(a) => a.dir_paths.clone(),
        None => section.dir_paths.unwrap_or_default(),
    };
    if dir_paths.is_empty() {
        bail!("missing required key `directories.dir_paths`");
    }
    if let Some(bad) = dir_paths.iter().find(|p| !p.starts_with('/')) {
        bail!("`directories.dir_paths` entries must be absolute paths, got {:?}", bad);
    }

    let max_depth = match (args.and_then(|a| a.max_depth), section.max_depth) {
        (Some(depth), _) => depth,
        (None, Some(depth)) => depth.parse("directories.max_depth")?,
        (None, None) => 0,
    };

    let snapshot_file = section
        .snapshot_file
        .unwrap_or_else(|| DEFAULT_SNAPSHOT_FILE.to_string());
    let snapshot_file = PathBuf::from(shellexpand::tilde(&snapshot_file).as_ref());

    Ok(DirectorySettings {
        dir_paths,
        max_depth,
        snapshot_file,
    })
}

fn resolve_email(section: Option<EmailSection>, cli: &Cli) -> Result<EmailSettings> {
    let args = cli.email.as_ref();
    if section.is_none() && args.is_none() {
        bail!("missing required section `email`");
    }
    let section = section.unwrap_or_default();

    let from = require(pick(args.and_then(|a| a.from.as_ref()), section.from), "email.from")?;
    let to = require(pick(args.and_then(|a| a.to.as_ref()), section.to), "email.to")?;
    let to = split_recipients(&to);
    if to.is_empty() {
        bail!("`email.to` does not contain any address");
    }
    let server = require(
        pick(args.and_then(|a| a.server.as_ref()), section.server),
        "email.server",
    )?;

    let port = match (args.and_then(|a| a.port), section.port) {
        (Some(port), _) => port,
        (None, Some(port)) => port.parse("email.port")?,
        (None, None) => DEFAULT_SMTP_PORT,
    };
    let security = match pick(args.and_then(|a| a.security.as_ref()), section.security) {
        Some(value) => value.parse().context("invalid `email.use`")?,
        None => SmtpSecurity::None,
    };

    let login = pick(args.and_then(|a| a.login.as_ref()), section.login);
    let password = pick_secret(args.and_then(|a| a.password.as_ref()), section.password);
    let credentials = login.map(|login| (login, password.unwrap_or_default()));

    Ok(EmailSettings {
        from,
        to,
        credentials,
        server,
        port,
        security,
    })
}

fn resolve_influx(section: Option<InfluxSection>) -> Result<InfluxSettings> {
    let section = section.context("missing required section `influxdb`")?;

    let address = require(pick(None, section.address), "influxdb.address")?;
    let url = if address.contains("://") {
        address.trim_end_matches('/').to_string()
    } else {
        format!("http://{}:{}", address, DEFAULT_INFLUX_PORT)
    };

    Ok(InfluxSettings {
        url,
        token: require(pick_secret(None, section.token), "influxdb.token")?,
        org_name: require(pick(None, section.org_name), "influxdb.org_name")?,
        bucket_name: require(pick(None, section.bucket_name), "influxdb.bucket_name")?,
    })
}

/// `"a@x.com, b@y.com"` -> `["a@x.com", "b@y.com"]`
fn split_recipients(to: &str) -> Vec<String> {
    to.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
