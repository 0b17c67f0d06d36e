//! InfluxDB v2 time-series output.
//!
//! Every reported directory becomes five points in the `CapacityDetails`
//! measurement, tagged with its path. All points of a run share one
//! timestamp and are written in line protocol, one HTTP request per root.

use crate::config::InfluxSettings;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use trends::MetricTuple;

pub const MEASUREMENT: &str = "CapacityDetails";

/// Field names, in the order they are written for each directory.
pub const FIELDS: [&str; 5] = [
    "capacity",
    "data_capacity",
    "metadata_capacity",
    "dir_count",
    "file_count",
];

/// One field value for one directory at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub path: String,
    pub field: &'static str,
    pub value: u64,
    pub timestamp: DateTime<Utc>,
}

impl Point {
    /// `CapacityDetails,path=/data capacity=123i 1700000000000000000`
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{},path={} {}={}i {}",
            MEASUREMENT,
            escape_tag(&self.path),
            self.field,
            self.value,
            unix_nanos(self.timestamp)
        )
    }
}

/// The five points for one directory.
#[must_use]
pub fn points_for(tuple: &MetricTuple, timestamp: DateTime<Utc>) -> Vec<Point> {
    let values = [
        tuple.capacity,
        tuple.data,
        tuple.metadata,
        tuple.dir_count,
        tuple.file_count,
    ];
    FIELDS
        .iter()
        .zip(values)
        .map(|(field, value)| Point {
            path: tuple.path.clone(),
            field,
            value,
            timestamp,
        })
        .collect()
}

/// Line-protocol body for a batch, one point per line.
#[must_use]
pub fn encode(points: &[Point]) -> String {
    let mut body = points.iter().map(Point::to_line).collect::<Vec<_>>().join("\n");
    body.push('\n');
    body
}

fn escape_tag(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '=' | ' ') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn unix_nanos(at: DateTime<Utc>) -> i128 {
    i128::from(at.timestamp()) * 1_000_000_000 + i128::from(at.timestamp_subsec_nanos())
}

/// Destination for batches of points.
pub trait SeriesSink {
    fn write(&mut self, points: &[Point]) -> Result<()>;
}

/// Writes to the InfluxDB v2 HTTP API.
pub struct InfluxSink {
    agent: ureq::Agent,
    write_url: String,
    org: String,
    bucket: String,
    token: String,
}

impl InfluxSink {
    #[must_use]
    pub fn new(settings: &InfluxSettings) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            write_url: format!("{}/api/v2/write", settings.url),
            org: settings.org_name.clone(),
            bucket: settings.bucket_name.clone(),
            token: settings.token.clone(),
        }
    }
}

impl SeriesSink for InfluxSink {
    fn write(&mut self, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        log::debug!("POST {} ({} points)", self.write_url, points.len());
        self.agent
            .post(&self.write_url)
            .query("org", &self.org)
            .query("bucket", &self.bucket)
            .query("precision", "ns")
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .send(encode(points))
            .with_context(|| {
                format!(
                    "writing {} points to bucket {:?} at {}",
                    points.len(),
                    self.bucket,
                    self.write_url
                )
            })?;
        Ok(())
    }
}
