//! One runner per delivery mode, plus the pieces they share: connecting
//! to the cluster and the skip-and-continue loop over root paths.

pub mod email;
pub mod influx;

use crate::config::{ClusterAuth, ClusterSettings};
use crate::error::{Error, Result};
use crate::ui;
use qumulo::{FileSystem, RestClient};
use trends::CollectionError;

/// Open an authenticated session with the cluster.
pub fn connect(cluster: &ClusterSettings) -> Result<RestClient> {
    let client = RestClient::new(&cluster.address, cluster.port, cluster.verify_tls);
    log::info!("Connecting to {}", client.base_url());

    match &cluster.auth {
        ClusterAuth::AccessToken(token) => Ok(client.with_access_token(token.as_str())),
        ClusterAuth::Password { username, password } => {
            let mut client = client;
            client
                .login(username, password)
                .map_err(Error::Authentication)?;
            Ok(client)
        }
    }
}

/// Cluster name, which is also the first authenticated call of a run.
pub fn cluster_name(fs: &dyn FileSystem) -> Result<String> {
    let name = fs.cluster_name().map_err(Error::Authentication)?;
    log::info!("Connected to cluster \"{}\"", name);
    Ok(name)
}

/// What came back from looping over the configured roots.
#[derive(Debug)]
pub struct RootResults<T> {
    /// One entry per root that succeeded, in configuration order.
    pub collected: Vec<(String, T)>,
    pub failed: Vec<CollectionError>,
}

impl<T> RootResults<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collected: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Log a root that could not be collected and move on.
    pub fn skip(&mut self, err: CollectionError) {
        log::error!("{}", err);
        ui::warn(&format!("Skipping {}: {}", err.root, err.source));
        self.failed.push(err);
    }

    pub fn total(&self) -> usize {
        self.collected.len() + self.failed.len()
    }

    /// Fail when not a single root could be collected.
    pub fn require_any(&mut self) -> Result<()> {
        if self.collected.is_empty() {
            if let Some(err) = self.failed.pop() {
                return Err(Error::Collection(err));
            }
        }
        Ok(())
    }

    /// Report roots that were skipped, after whatever did succeed has been
    /// delivered.
    pub fn finish(self) -> Result<()> {
        if self.failed.is_empty() {
            return Ok(());
        }
        let total = self.total();
        Err(Error::PartialCollection {
            failed: self.failed.into_iter().map(|e| e.root).collect(),
            total,
        })
    }
}

impl<T> Default for RootResults<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `collect` for every root. A failing root is logged and skipped.
pub fn for_each_root<T, F>(roots: &[String], mut collect: F) -> RootResults<T>
where
    F: FnMut(&str) -> std::result::Result<T, CollectionError>,
{
    let mut results = RootResults::new();
    for root in roots {
        match collect(root) {
            Ok(value) => results.collected.push((root.clone(), value)),
            Err(err) => results.skip(err),
        }
    }

    results
}
