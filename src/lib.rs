//! # dirtrends
//!
//! Capacity trends for Qumulo directories. Two binaries share this crate:
//!
//! - `dirtrends-email` compares each directory against the previous run
//!   and mails an HTML table of the changes
//! - `dirtrends-influx` writes absolute capacity metrics to InfluxDB
//!
//! Both read the same JSON config and accept the same argument groups
//! (see [`cli`]).

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod influx;
pub mod mailer;
pub mod report;
pub mod ui;

use cli::{Cli, LogLevel};
use config::{ConfigFile, Output, Settings};
use error::{Error, Result};
use influx::InfluxSink;
use mailer::SmtpMailer;
use std::process::ExitCode;
use trends::SnapshotStore;

/// Which output a binary produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Email,
    Influx,
}

/// Entry point shared by both binaries.
pub fn main(mode: Mode) -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            // --help / --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.global.log);

    match run(mode, &cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("[{}] {}", e.kind(), e);
            ui::error(&e.to_string());
            if let Some(advice) = e.advice() {
                ui::dim(advice);
            }
            e.exit_code()
        }
    }
}

fn init_logging(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.filter())
        .format_timestamp_secs()
        .init();
}

fn run(mode: Mode, cli: &Cli) -> Result<()> {
    let file = cli
        .global
        .config_file
        .as_deref()
        .map(ConfigFile::load)
        .transpose()
        .map_err(Error::Config)?;
    let settings = Settings::resolve(mode, file, cli).map_err(Error::Config)?;
    log::debug!("{:?} mode, roots: {:?}", mode, settings.directories.dir_paths);

    let fs = commands::connect(&settings.cluster)?;
    ui::info(&format!(
        "Checking {} root path(s) on {} (max depth {})",
        settings.directories.dir_paths.len(),
        settings.cluster.address,
        settings.directories.max_depth
    ));

    match &settings.output {
        Output::Email(email) => {
            let store = SnapshotStore::new(&settings.directories.snapshot_file);
            let mailer = SmtpMailer::new(email).map_err(Error::Delivery)?;
            commands::email::run(&settings.directories, email, &fs, &store, &mailer)?;
        }
        Output::Influx(influx) => {
            let mut sink = InfluxSink::new(influx);
            let captured_at = chrono::Utc::now();
            commands::influx::run(&settings.directories, &fs, &mut sink, captured_at)?;
        }
    }

    Ok(())
}
