//! Text Views of the Store
//!
//! Renders the current documents as a table with a TTL column, and dumps the
//! non-empty index buckets. Both functions only read the database, so they
//! can be called from a refresh timer between commands.
//!
//! ```text
//! KEY     | VALUE                  | TTL
//! --------+------------------------+--------
//! session | {"token":"abc"}        | 12s
//! user:1  | {"status":"active"}    | -
//! ```

use crate::storage::Database;
use std::fmt::Write;

/// Maximum characters of compact JSON shown in the VALUE column.
pub const MAX_VALUE_WIDTH: usize = 48;

const HEADERS: [&str; 3] = ["KEY", "VALUE", "TTL"];

/// Renders the document table at `now` (epoch ms).
pub fn render_documents(db: &Database, now: i64) -> String {
    if db.is_empty() {
        return "(no documents)".to_string();
    }

    let rows: Vec<[String; 3]> = db
        .documents()
        .iter()
        .map(|(key, record)| {
            let value = serde_json::to_string(&record.payload).unwrap_or_default();
            [
                key.clone(),
                truncate(&value, MAX_VALUE_WIDTH),
                record.ttl_status(now).to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }

    out.truncate(out.trim_end().len());
    out
}

/// Renders every non-empty index bucket as indented JSON.
pub fn render_indices(db: &Database) -> String {
    let buckets: Vec<_> = db
        .indices()
        .iter()
        .filter(|(_, bucket)| !bucket.is_empty())
        .collect();

    if buckets.is_empty() {
        return "(no indices)".to_string();
    }

    let mut out = String::new();
    for (name, bucket) in buckets {
        let body = serde_json::to_string_pretty(bucket).unwrap_or_default();
        let _ = writeln!(out, "{}:\n{}", name, body);
    }

    out.truncate(out.trim_end().len());
    out
}

/// Renders the document table followed by the index dump.
pub fn render_view(db: &Database, now: i64) -> String {
    format!("{}\n\n{}", render_documents(db, now), render_indices(db))
}

fn push_row(out: &mut String, cells: &[String; 3], widths: &[usize; 3]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
