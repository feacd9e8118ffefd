//! Row reconciliation: merging freshly computed rows into the persisted table.

use super::{Row, Table};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// What to do for a video before any collaborator is called.
#[derive(Debug, PartialEq)]
pub enum VideoPlan<'r> {
    /// No row yet: fetch metadata and transcript, generate everything.
    Fresh,
    /// A row exists but some requested columns are empty. Metadata and
    /// transcript are reused; only the listed columns need work.
    Reuse { row: &'r Row, missing: Vec<usize> },
    /// A row exists and every requested column is filled.
    Skip,
}

/// Decide how much work a video needs.
///
/// `required` lists the columns this run would produce (one summary text
/// column per requested model, plus any other per-video outputs). A video
/// with an existing row is skipped when all of them are non-empty, which
/// includes the case where nothing was requested.
pub fn plan_video<'r>(existing: Option<&'r Row>, required: &[String]) -> VideoPlan<'r> {
    let Some(row) = existing else {
        return VideoPlan::Fresh;
    };

    let missing: Vec<usize> = required
        .iter()
        .enumerate()
        .filter(|(_, col)| !row.has_value(col))
        .map(|(i, _)| i)
        .collect();

    if missing.is_empty() {
        VideoPlan::Skip
    } else {
        VideoPlan::Reuse { row, missing }
    }
}

/// Merge new rows into an existing table.
///
/// Existing rows whose URL reappears in `new_rows` are dropped in favour of
/// the new row; all other existing rows are kept unchanged. New rows are
/// keyed by URL so a URL can never appear twice (the last row for a URL
/// wins). The column set is the union of both sides, and the result is
/// sorted by publish date, newest first.
pub fn reconcile(existing: Table, new_rows: Vec<Row>) -> Table {
    let mut incoming: HashMap<String, Row> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for row in new_rows {
        let Some(url) = row.url().map(str::to_string) else {
            warn!("Dropping new row without a URL");
            continue;
        };
        if incoming.insert(url.clone(), row).is_none() {
            order.push(url);
        }
    }

    let replaced: HashSet<&str> = order.iter().map(String::as_str).collect();
    let (columns, existing_rows) = existing.into_parts();
    let existing_count = existing_rows.len();

    let mut rows: Vec<Row> = existing_rows
        .into_iter()
        .filter(|r| r.url().map_or(true, |u| !replaced.contains(u)))
        .collect();
    let kept = rows.len();

    rows.extend(order.iter().filter_map(|url| incoming.remove(url)));

    debug!(
        "Reconciled {} existing rows ({} kept) with {} new rows",
        existing_count,
        kept,
        rows.len() - kept
    );

    let mut table = Table::from_parts(columns, rows);
    table.sort_by_published();
    table
}
