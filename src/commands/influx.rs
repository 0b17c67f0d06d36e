//! Time-series mode: absolute metrics for every directory down to the
//! configured depth, written as one batch per root.

use super::RootResults;
use crate::config::DirectorySettings;
use crate::error::{Error, Result};
use crate::influx::{SeriesSink, points_for};
use crate::ui;
use chrono::{DateTime, Utc};
use qumulo::FileSystem;

/// Collect each root and write it to `sink` before moving on to the next,
/// every point stamped with `captured_at`.
///
/// Returns the number of directories written. A sink failure aborts the
/// run; a root that fails to collect is skipped and reported through
/// [`Error::PartialCollection`] once the other roots are written.
pub fn run(
    dirs: &DirectorySettings,
    fs: &dyn FileSystem,
    sink: &mut dyn SeriesSink,
    captured_at: DateTime<Utc>,
) -> Result<usize> {
    let mut results = RootResults::new();
    let mut written = 0;

    for root in &dirs.dir_paths {
        let tuples = match trends::walk(fs, root, dirs.max_depth) {
            Ok(tuples) => tuples,
            Err(err) => {
                results.skip(err);
                continue;
            }
        };

        let points: Vec<_> = tuples
            .iter()
            .flat_map(|tuple| points_for(tuple, captured_at))
            .collect();
        sink.write(&points).map_err(Error::Delivery)?;

        let data: u64 = tuples.first().map_or(0, |t| t.data);
        log::info!("{}: wrote {} directories", root, tuples.len());
        ui::success(&format!(
            "{} ({} data, {} directories)",
            root,
            ui::format_size(data),
            tuples.len()
        ));
        written += tuples.len();
        results.collected.push((root.clone(), tuples.len()));
    }

    results.require_any()?;
    ui::kv(
        "Roots",
        &format!("{} written, {} failed", results.collected.len(), results.failed.len()),
    );
    results.finish()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::influx::Point;
    use chrono::TimeZone;
    use qumulo::{
        DirAggregates, FileAggregate, FileAttributes, FileRef, FileType, MockFileSystem,
    };
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingSink {
        batches: Vec<Vec<Point>>,
        fail: bool,
    }

    impl SeriesSink for RecordingSink {
        fn write(&mut self, points: &[Point]) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("401 unauthorized");
            }
            self.batches.push(points.to_vec());
            Ok(())
        }
    }

    fn cluster() -> MockFileSystem {
        let mut mock = MockFileSystem::new("lab");
        mock.add_directory(
            DirAggregates::new("/data", 1)
                .with_usage(300, 200, 100)
                .with_counts(7, 2)
                .with_file(
                    FileAggregate::new("a", 2, FileType::Directory)
                        .with_usage(30, 20, 10)
                        .with_counts(3, 1),
                )
                .with_file(FileAggregate::new("f.txt", 3, FileType::File).with_usage(5, 5, 0)),
        );
        mock.add_directory(
            DirAggregates::new("/data/a", 2)
                .with_usage(30, 20, 10)
                .with_counts(3, 1)
                .with_file(FileAggregate::new("deep", 4, FileType::Directory).with_usage(9, 8, 1)),
        );
        mock.add_directory(DirAggregates::new("/data/a/deep", 4).with_usage(9, 8, 1));
        mock.add_directory(DirAggregates::new("/home", 10).with_usage(50, 40, 10));
        mock
    }

    fn dirs(paths: &[&str], max_depth: u32) -> DirectorySettings {
        DirectorySettings {
            dir_paths: paths.iter().map(|p| p.to_string()).collect(),
            max_depth,
            snapshot_file: PathBuf::from("unused.json"),
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_one_batch_per_root_sharing_timestamp() {
        let mut sink = RecordingSink::default();
        let written = run(&dirs(&["/data", "/home"], 1), &cluster(), &mut sink, at()).unwrap();

        assert_eq!(written, 3);
        assert_eq!(sink.batches.len(), 2);
        assert_eq!(sink.batches[0].len(), 10);
        assert_eq!(sink.batches[1].len(), 5);
        assert!(sink.batches.iter().flatten().all(|p| p.timestamp == at()));

        let paths: Vec<_> = sink.batches[0].iter().map(|p| p.path.as_str()).collect();
        assert!(paths.contains(&"/data"));
        assert!(paths.contains(&"/data/a"));
        assert!(!paths.contains(&"/data/f.txt"));
    }

    #[test]
    fn test_depth_zero_reports_roots_only() {
        let mut sink = RecordingSink::default();
        let written = run(&dirs(&["/data"], 0), &cluster(), &mut sink, at()).unwrap();
        assert_eq!(written, 1);
        assert!(sink.batches[0].iter().all(|p| p.path == "/data"));
    }

    #[test]
    fn test_deeper_levels() {
        let mut sink = RecordingSink::default();
        let written = run(&dirs(&["/data"], 2), &cluster(), &mut sink, at()).unwrap();
        assert_eq!(written, 3);
        assert!(sink.batches[0].iter().any(|p| p.path == "/data/a/deep"));
    }

    #[test]
    fn test_sink_failure_is_fatal() {
        let mut sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        let err = run(&dirs(&["/data"], 1), &cluster(), &mut sink, at()).unwrap_err();
        assert!(matches!(err, Error::Delivery(_)));
    }

    #[test]
    fn test_failed_root_is_skipped() {
        let mut mock = cluster();
        mock.fail_path("/data");
        let mut sink = RecordingSink::default();

        let err = run(&dirs(&["/data", "/home"], 1), &mock, &mut sink, at()).unwrap_err();
        assert!(matches!(err, Error::PartialCollection { .. }));
        assert_eq!(sink.batches.len(), 1);
        assert!(sink.batches[0].iter().all(|p| p.path == "/home"));
    }

    #[test]
    fn test_every_root_failing() {
        let mut sink = RecordingSink::default();
        let err = run(&dirs(&["/nope"], 1), &cluster(), &mut sink, at()).unwrap_err();
        assert!(matches!(err, Error::Collection(_)));
        assert!(sink.batches.is_empty());
    }

    /// Records root lookups and batch writes into one shared event list.
    struct Traced<'a> {
        inner: MockFileSystem,
        events: &'a RefCell<Vec<String>>,
    }

    impl FileSystem for Traced<'_> {
        fn aggregates(&self, file: &FileRef) -> qumulo::Result<DirAggregates> {
            if let FileRef::Path(path) = file {
                self.events.borrow_mut().push(format!("collect {}", path));
            }
            self.inner.aggregates(file)
        }

        fn recursive_aggregates(
            &self,
            file: &FileRef,
            max_depth: u32,
        ) -> qumulo::Result<Vec<DirAggregates>> {
            self.inner.recursive_aggregates(file, max_depth)
        }

        fn attributes(&self, file: &FileRef) -> qumulo::Result<FileAttributes> {
            self.inner.attributes(file)
        }

        fn cluster_name(&self) -> qumulo::Result<String> {
            self.inner.cluster_name()
        }
    }

    struct TracedSink<'a> {
        events: &'a RefCell<Vec<String>>,
    }

    impl SeriesSink for TracedSink<'_> {
        fn write(&mut self, points: &[Point]) -> anyhow::Result<()> {
            let root = points.first().map_or("", |p| p.path.as_str());
            self.events.borrow_mut().push(format!("write {}", root));
            Ok(())
        }
    }

    #[test]
    fn test_each_root_written_before_next_is_collected() {
        let events = RefCell::new(Vec::new());
        let fs = Traced {
            inner: cluster(),
            events: &events,
        };
        let mut sink = TracedSink { events: &events };

        run(&dirs(&["/data", "/home"], 0), &fs, &mut sink, at()).unwrap();

        assert_eq!(
            events.into_inner(),
            vec!["collect /data", "write /data", "collect /home", "write /home"]
        );
    }

    #[test]
    fn test_failed_root_does_not_hold_back_earlier_batches() {
        let events = RefCell::new(Vec::new());
        let mut inner = cluster();
        inner.fail_path("/home");
        let fs = Traced {
            inner,
            events: &events,
        };
        let mut sink = TracedSink { events: &events };

        let err = run(&dirs(&["/data", "/home", "/data/a"], 0), &fs, &mut sink, at()).unwrap_err();
        assert!(matches!(err, Error::PartialCollection { total: 3, .. }));
        assert_eq!(
            events.into_inner(),
            vec![
                "collect /data",
                "write /data",
                "collect /home",
                "collect /data/a",
                "write /data/a"
            ]
        );
    }
}
