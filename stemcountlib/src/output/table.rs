//! Table-ready data structures for stem count output.
//!
//! This module provides `StemTable`, a presentation-ready data structure
//! that can be printed directly or serialized to JSON.
//!
//! StemTable is a pure presentation layer - it only formats counts into
//! strings. All counting happens in the data stage.

use std::path::PathBuf;

use serde::Serialize;

use crate::data::counter::{LexcCount, StemCount};
use crate::data::dix::DixStats;
use crate::data::history::History;

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Row label (lexicon name, commit, file path, "Total", etc.)
    pub label: String,
    /// Values for each column after the label (ready for display)
    pub values: Vec<String>,
}

/// Table-ready stem count data.
#[derive(Debug, Clone, Serialize)]
pub struct StemTable {
    /// Optional title (e.g., the dictionary counted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Column headers: [label_header, column1, column2, ...]
    pub headers: Vec<String>,
    /// Data rows
    pub rows: Vec<TableRow>,
    /// Summary/footer row
    pub footer: TableRow,
    /// Optional note below the table (e.g., "2 rows skipped")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
}

impl StemTable {
    /// One row per reachable lexicon.
    ///
    /// Row values are per-lexicon, so they can add up to more than the
    /// footer: the footer is the deduplicated union.
    pub fn from_lexc(count: &LexcCount) -> Self {
        let rows = count
            .lexicons
            .iter()
            .map(|lexicon| TableRow {
                label: lexicon.name.clone(),
                values: vec![
                    lexicon.unique_entries.to_string(),
                    lexicon.pointers.to_string(),
                ],
            })
            .collect();

        StemTable {
            title: None,
            headers: strings(&["Lexicon", "Entries", "Pointers"]),
            rows,
            footer: TableRow {
                label: format!("Total ({} lexicons)", count.lexicons.len()),
                values: vec![count.unique_entries.to_string(), String::new()],
            },
            legend: skipped_legend(count.diagnostics.len()),
        }
    }

    /// A single-row table of a dix tally.
    pub fn from_dix(stats: &DixStats) -> Self {
        let kind = if stats.bilingual {
            "bilingual"
        } else {
            "monolingual"
        };
        let paradigms = stats
            .paradigms
            .map_or_else(|| "-".to_string(), |n| n.to_string());

        StemTable {
            title: None,
            headers: strings(&["Dictionary", "Stems", "Paradigms"]),
            rows: Vec::new(),
            footer: TableRow {
                label: kind.to_string(),
                values: vec![stats.stems.to_string(), paradigms],
            },
            legend: None,
        }
    }

    /// One row per counted commit, newest first, with the change from the
    /// previous revision.
    pub fn from_history(history: &History) -> Self {
        let rows = history
            .entries
            .iter()
            .zip(history.deltas())
            .map(|(entry, delta)| TableRow {
                label: short_sha(&entry.sha).to_string(),
                values: vec![
                    entry.author.clone(),
                    entry.date.clone(),
                    entry.stems.to_string(),
                    format_delta(delta),
                ],
            })
            .collect();

        let latest = history
            .entries
            .first()
            .map_or_else(|| "0".to_string(), |e| e.stems.to_string());

        StemTable {
            title: Some(format!("{} @ {}", history.path.display(), history.rev)),
            headers: strings(&["Commit", "Author", "Date", "Stems", "Change"]),
            rows,
            footer: TableRow {
                label: format!("Total ({} commits)", history.entries.len()),
                values: vec![String::new(), String::new(), latest, String::new()],
            },
            legend: (history.skipped > 0)
                .then(|| format!("{} revision(s) could not be counted", history.skipped)),
        }
    }

    /// One row per dictionary found by a directory scan.
    pub fn from_scan(results: &[(PathBuf, StemCount)]) -> Self {
        let rows = results
            .iter()
            .map(|(path, count)| TableRow {
                label: path.display().to_string(),
                values: vec![count.format().to_string(), count.stems().to_string()],
            })
            .collect();
        let total: usize = results.iter().map(|(_, count)| count.stems()).sum();

        StemTable {
            title: None,
            headers: strings(&["File", "Format", "Stems"]),
            rows,
            footer: TableRow {
                label: format!("Total ({} files)", results.len()),
                values: vec![String::new(), total.to_string()],
            },
            legend: None,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn skipped_legend(skipped: usize) -> Option<String> {
    (skipped > 0).then(|| format!("{} row(s) skipped while parsing", skipped))
}

fn short_sha(sha: &str) -> &str {
    sha.get(..8).unwrap_or(sha)
}

/// Format a signed change as "+N", "-N" or "0".
fn format_delta(delta: i64) -> String {
    if delta > 0 {
        format!("+{}", delta)
    } else {
        delta.to_string()
    }
}
