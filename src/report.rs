//! HTML rendering of a delta report.

use std::fmt::Write;
use trends::units::format_gb_change;
use trends::{Change, DeltaRecord};

pub const TITLE: &str = "Qumulo Storage Report";

/// Shown in both change columns for a directory with no previous snapshot.
pub const NEW_DIRECTORY: &str = "New directory";

const HEAD_STYLE: &str = "text-align: left; padding: 4px 12px; border-bottom: 1px solid #999;";
const CELL_STYLE: &str = "text-align: left; padding: 4px 12px;";

/// Display text for the data and metadata columns of one record.
#[must_use]
pub fn change_cells(record: &DeltaRecord) -> (String, String) {
    match record.change {
        Change::New { .. } => (NEW_DIRECTORY.to_string(), NEW_DIRECTORY.to_string()),
        Change::Changed {
            data_gb,
            metadata_gb,
        } => (format_gb_change(data_gb), format_gb_change(metadata_gb)),
    }
}

/// Render one table row per record, in order.
#[must_use]
pub fn render_html(records: &[DeltaRecord]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    let _ = writeln!(html, "<meta charset=\"utf-8\">\n<title>{}</title>", TITLE);
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h2>{}</h2>", TITLE);
    html.push_str("<table>\n<tr>");
    for header in ["Directory", "Data Change", "Metadata Change"] {
        let _ = write!(html, "<th style=\"{}\">{}</th>", HEAD_STYLE, header);
    }
    html.push_str("</tr>\n");

    for record in records {
        let (data, metadata) = change_cells(record);
        html.push_str("<tr>");
        for cell in [record.path.as_str(), data.as_str(), metadata.as_str()] {
            let _ = write!(html, "<td style=\"{}\">{}</td>", CELL_STYLE, escape(cell));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
