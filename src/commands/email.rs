//! Email mode: compare every directory against the stored snapshot, mail
//! the changes, then save the new baseline.

use super::{cluster_name, for_each_root};
use crate::config::{DirectorySettings, EmailSettings};
use crate::error::{Error, Result};
use crate::mailer::{EmailMessage, Mailer};
use crate::{report, ui};
use qumulo::FileSystem;
use trends::{DeltaSummary, DirectoryAggregate, SnapshotStore, compute_deltas};

/// Run one email report.
///
/// The snapshot is written only after the mailer accepted the report, so a
/// failed delivery leaves the previous baseline in place. Roots that fail
/// to collect are skipped; the run still mails the rest and then returns
/// [`Error::PartialCollection`].
pub fn run(
    dirs: &DirectorySettings,
    email: &EmailSettings,
    fs: &dyn FileSystem,
    store: &SnapshotStore,
    mailer: &dyn Mailer,
) -> Result<DeltaSummary> {
    let cluster = cluster_name(fs)?;
    let mut snapshot = store.load_or_default()?;

    let mut results = for_each_root(&dirs.dir_paths, |root| {
        trends::collect(fs, root, dirs.max_depth, true)
    });
    results.require_any()?;

    let aggregates: Vec<DirectoryAggregate> = results
        .collected
        .iter_mut()
        .flat_map(|(_, aggs)| std::mem::take(aggs))
        .collect();
    let records = compute_deltas(&aggregates, &mut snapshot);
    let summary = DeltaSummary::from_records(&records);

    let message = EmailMessage {
        from: email.from.clone(),
        to: email.to.clone(),
        subject: EmailMessage::report_subject(&cluster),
        html: report::render_html(&records),
    };
    mailer.send(&message).map_err(Error::Delivery)?;
    ui::success(&format!(
        "Report for \"{}\" sent to {}",
        cluster,
        email.to.join(", ")
    ));

    store.save(&snapshot)?;

    ui::header("Directory trends");
    ui::kv(
        "Roots",
        &format!("{} collected, {} failed", results.collected.len(), results.failed.len()),
    );
    ui::kv("Directories", &summary.total().to_string());
    ui::kv("New", &summary.new.to_string());
    ui::kv(
        "Changed",
        &format!("{} grown, {} shrunk, {} unchanged", summary.grown, summary.shrunk, summary.unchanged),
    );

    results.finish()?;
    Ok(summary)
}
