//! Command-line surface shared by both binaries.
//!
//! The sub-commands are argument groups rather than actions, and several of
//! them can be given in one invocation:
//!
//! ```text
//! dirtrends-email --log DEBUG \
//!     directories --dir-paths /data /home --max-depth 1 \
//!     cluster --address qumulo.local --username admin --password secret \
//!     email --from ops@x.com --to team@x.com --server smtp.x.com --use TLS
//! ```
//!
//! argv is split at each sub-command name and every segment is parsed by its
//! own clap parser. A value that is spelled exactly like a sub-command name
//! therefore starts a new segment.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

/// Names that start a new argument group.
pub const GROUPS: [&str; 3] = ["directories", "cluster", "email"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
}

impl LogLevel {
    pub fn filter(self) -> log::LevelFilter {
        match self {
            Self::Debug => log::LevelFilter::Debug,
            Self::Info => log::LevelFilter::Info,
            Self::Warning => log::LevelFilter::Warn,
            Self::Error => log::LevelFilter::Error,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version)]
#[command(about = "Track capacity changes of Qumulo directories between runs", long_about = None)]
#[command(after_help = "Argument groups (may be combined, each followed by its own options):\n  \
    directories  Directories to check\n  \
    cluster      Qumulo cluster connection\n  \
    email        SMTP delivery")]
pub struct GlobalArgs {
    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "INFO", ignore_case = true)]
    pub log: LogLevel,

    /// JSON configuration file
    #[arg(short, long)]
    pub config_file: Option<PathBuf>,
}

/// Define the directories which will be checked
#[derive(Debug, Default, Parser)]
#[command(name = "directories")]
pub struct DirectoriesArgs {
    /// Directory paths to check
    #[arg(short, long, num_args = 1..)]
    pub dir_paths: Vec<String>,

    /// Directory levels below each path to report individually
    #[arg(long)]
    pub max_depth: Option<u32>,
}

/// Qumulo cluster details
#[derive(Debug, Default, Parser)]
#[command(name = "cluster")]
pub struct ClusterArgs {
    /// Cluster IP address or hostname
    #[arg(long)]
    pub address: Option<String>,

    /// Cluster REST port
    #[arg(long)]
    pub port: Option<u16>,

    /// Cluster username
    #[arg(long)]
    pub username: Option<String>,

    /// Cluster password
    #[arg(long)]
    pub password: Option<String>,

    /// Pre-issued access token (instead of username/password)
    #[arg(long)]
    pub access_token: Option<String>,
}

/// Email details
#[derive(Debug, Default, Parser)]
#[command(name = "email")]
pub struct EmailArgs {
    /// From address
    #[arg(long)]
    pub from: Option<String>,

    /// To address(es), comma separated
    #[arg(long)]
    pub to: Option<String>,

    /// SMTP login user
    #[arg(long)]
    pub login: Option<String>,

    /// SMTP password
    #[arg(long)]
    pub password: Option<String>,

    /// SMTP server IP address or hostname
    #[arg(long)]
    pub server: Option<String>,

    /// SMTP server port
    #[arg(long)]
    pub port: Option<u16>,

    /// Transport security: none, TLS or SSL
    #[arg(long = "use")]
    pub security: Option<String>,
}

/// Everything parsed from argv.
#[derive(Debug)]
pub struct Cli {
    pub global: GlobalArgs,
    pub directories: Option<DirectoriesArgs>,
    pub cluster: Option<ClusterArgs>,
    pub email: Option<EmailArgs>,
}

impl Cli {
    /// Parse the process arguments.
    pub fn try_parse() -> Result<Self, clap::Error> {
        Self::try_parse_from(std::env::args_os())
    }

    /// Parse an explicit argv (first element is the program name).
    pub fn try_parse_from<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut segments = split_groups(argv.into_iter().map(Into::into));
        let global = GlobalArgs::try_parse_from(segments.remove(0))?;

        let mut cli = Self {
            global,
            directories: None,
            cluster: None,
            email: None,
        };

        for segment in segments {
            let name = segment[0].to_string_lossy().into_owned();
            let duplicate = match name.as_str() {
                "directories" => cli
                    .directories
                    .replace(DirectoriesArgs::try_parse_from(segment)?)
                    .is_some(),
                "cluster" => cli
                    .cluster
                    .replace(ClusterArgs::try_parse_from(segment)?)
                    .is_some(),
                _ => cli
                    .email
                    .replace(EmailArgs::try_parse_from(segment)?)
                    .is_some(),
            };
            if duplicate {
                return Err(GlobalArgs::command().error(
                    ErrorKind::ArgumentConflict,
                    format!("'{}' was given more than once", name),
                ));
            }
        }

        Ok(cli)
    }
}

/// Split argv into the global segment and one segment per group.
///
/// The global segment keeps the program name; every group segment starts
/// with the group name, which clap then treats as its program name.
fn split_groups(argv: impl Iterator<Item = OsString>) -> Vec<Vec<OsString>> {
    let mut segments: Vec<Vec<OsString>> = vec![Vec::new()];
    for (i, arg) in argv.enumerate() {
        let is_group = i > 0 && GROUPS.iter().any(|g| arg == *g);
        if is_group {
            segments.push(vec![arg]);
        } else if let Some(last) = segments.last_mut() {
            last.push(arg);
        }
    }
    segments
}
