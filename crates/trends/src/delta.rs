//! Comparing a collection pass against the snapshot.

use crate::aggregate::DirectoryAggregate;
use crate::snapshot::{Snapshot, SnapshotEntry};
use crate::units::round2;

/// How one directory changed since the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change {
    /// Not in the snapshot; the current usage became its baseline.
    New { data_gb: f64, metadata_gb: f64 },
    /// Signed difference from the previous snapshot, in GB.
    Changed { data_gb: f64, metadata_gb: f64 },
}

/// Change record for one directory in one run.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRecord {
    pub path: String,
    pub change: Change,
}

impl DeltaRecord {
    #[must_use]
    pub fn is_new(&self) -> bool {
        matches!(self.change, Change::New { .. })
    }
}

/// Counts over a set of delta records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaSummary {
    pub new: usize,
    pub grown: usize,
    pub shrunk: usize,
    pub unchanged: usize,
}

impl DeltaSummary {
    /// Classify by data change; metadata breaks ties when data is flat.
    pub fn from_records(records: &[DeltaRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.change {
                Change::New { .. } => summary.new += 1,
                Change::Changed {
                    data_gb,
                    metadata_gb,
                } => {
                    let direction = if data_gb != 0.0 { data_gb } else { metadata_gb };
                    if direction > 0.0 {
                        summary.grown += 1;
                    } else if direction < 0.0 {
                        summary.shrunk += 1;
                    } else {
                        summary.unchanged += 1;
                    }
                }
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.new + self.grown + self.shrunk + self.unchanged
    }
}

/// Compute per-directory deltas and fold the current values into `snapshot`.
///
/// Records come out in the same order as `aggregates`. A path seen before
/// gets a signed delta and its entry overwritten; an unseen path is inserted
/// and reported as [`Change::New`].
pub fn compute_deltas(aggregates: &[DirectoryAggregate], snapshot: &mut Snapshot) -> Vec<DeltaRecord> {
    aggregates
        .iter()
        .map(|agg| {
            let current = SnapshotEntry::new(agg.data_gb(), agg.metadata_gb());

            let change = match snapshot.get_mut(&agg.path) {
                Some(previous) => {
                    let change = Change::Changed {
                        data_gb: round2(current.data - previous.data),
                        metadata_gb: round2(current.metadata - previous.metadata),
                    };
                    *previous = current;
                    change
                }
                None => {
                    log::debug!("New directory: {}", agg.path);
                    snapshot.insert(agg.path.clone(), current);
                    Change::New {
                        data_gb: current.data,
                        metadata_gb: current.metadata,
                    }
                }
            };

            DeltaRecord {
                path: agg.path.clone(),
                change,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qumulo::DirAggregates;

    fn agg(path: &str, data: u64, meta: u64) -> DirectoryAggregate {
        DirectoryAggregate::from_record(path, DirAggregates::new(path, 1).with_usage(0, data, meta))
    }

    fn baseline() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert("/data/a", SnapshotEntry::new(10.0, 1.0));
        snapshot
    }

    #[test]
    fn test_growth_against_snapshot() {
        let mut snapshot = baseline();
        let records = compute_deltas(&[agg("/data/a", 12_000_000_000, 1_500_000_000)], &mut snapshot);

        assert_eq!(
            records,
            vec![DeltaRecord {
                path: "/data/a".to_string(),
                change: Change::Changed {
                    data_gb: 2.0,
                    metadata_gb: 0.5
                },
            }]
        );
        assert_eq!(snapshot.get("/data/a"), Some(&SnapshotEntry::new(12.0, 1.5)));
    }

    #[test]
    fn test_new_directory_seeds_snapshot() {
        let mut snapshot = baseline();
        let records = compute_deltas(&[agg("/data/b", 5_000_000_000, 200_000_000)], &mut snapshot);

        assert_eq!(records.len(), 1);
        assert!(records[0].is_new());
        assert_eq!(
            records[0].change,
            Change::New {
                data_gb: 5.0,
                metadata_gb: 0.2
            }
        );
        assert_eq!(snapshot.get("/data/b"), Some(&SnapshotEntry::new(5.0, 0.2)));
        assert_eq!(snapshot.get("/data/a"), Some(&SnapshotEntry::new(10.0, 1.0)));
    }

    #[test]
    fn test_every_directory_new_on_cold_start() {
        let mut snapshot = Snapshot::new();
        let aggs = [agg("/x", 1, 1), agg("/y", 2_000_000_000, 0)];
        let records = compute_deltas(&aggs, &mut snapshot);

        assert!(records.iter().all(DeltaRecord::is_new));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("/y"), Some(&SnapshotEntry::new(2.0, 0.0)));
    }

    #[test]
    fn test_shrinking_keeps_sign() {
        let mut snapshot = baseline();
        let records = compute_deltas(&[agg("/data/a", 8_770_000_000, 1_000_000_000)], &mut snapshot);

        assert_eq!(
            records[0].change,
            Change::Changed {
                data_gb: -1.23,
                metadata_gb: 0.0
            }
        );
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let aggs = [
            agg("/data/a", 12_000_000_000, 1_500_000_000),
            agg("/data/b", 5_000_000_000, 200_000_000),
        ];
        let mut snapshot = baseline();

        compute_deltas(&aggs, &mut snapshot);
        let after_first = snapshot.clone();
        let records = compute_deltas(&aggs, &mut snapshot);

        assert_eq!(snapshot, after_first);
        for record in &records {
            match record.change {
                Change::Changed {
                    data_gb,
                    metadata_gb,
                } => {
                    assert_eq!(data_gb, 0.0);
                    assert_eq!(metadata_gb, 0.0);
                    assert!(data_gb.is_sign_positive());
                    assert!(metadata_gb.is_sign_positive());
                }
                Change::New { .. } => panic!("{} should not be new twice", record.path),
            }
        }
    }

    #[test]
    fn test_order_follows_input() {
        let mut snapshot = Snapshot::new();
        let aggs = [agg("/z", 0, 0), agg("/a", 0, 0), agg("/m", 0, 0)];
        let paths: Vec<String> = compute_deltas(&aggs, &mut snapshot)
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert_eq!(paths, vec!["/z", "/a", "/m"]);
    }

    #[test]
    fn test_duplicate_path_in_one_pass() {
        let mut snapshot = Snapshot::new();
        let aggs = [agg("/data", 3_000_000_000, 0), agg("/data", 3_000_000_000, 0)];
        let records = compute_deltas(&aggs, &mut snapshot);

        assert!(records[0].is_new());
        assert_eq!(
            records[1].change,
            Change::Changed {
                data_gb: 0.0,
                metadata_gb: 0.0
            }
        );
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_summary() {
        let records = vec![
            DeltaRecord {
                path: "/a".to_string(),
                change: Change::New {
                    data_gb: 1.0,
                    metadata_gb: 0.0,
                },
            },
            DeltaRecord {
                path: "/b".to_string(),
                change: Change::Changed {
                    data_gb: 2.0,
                    metadata_gb: 0.0,
                },
            },
            DeltaRecord {
                path: "/c".to_string(),
                change: Change::Changed {
                    data_gb: -0.5,
                    metadata_gb: 0.1,
                },
            },
            DeltaRecord {
                path: "/d".to_string(),
                change: Change::Changed {
                    data_gb: 0.0,
                    metadata_gb: 0.0,
                },
            },
        ];

        let summary = DeltaSummary::from_records(&records);
        assert_eq!(
            summary,
            DeltaSummary {
                new: 1,
                grown: 1,
                shrunk: 1,
                unchanged: 1
            }
        );
        assert_eq!(summary.total(), 4);
    }
}
