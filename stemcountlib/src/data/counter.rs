//! High-level stem counting API.
//!
//! This module provides the main entry points for counting unique stems in
//! a dictionary: from lexc text, from dix text, or from a source that is
//! fetched first and dispatched on its format.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::{error, info};

use crate::error::StemcountError;
use crate::options::{DixMode, UniqueOn};
use crate::source::{fetch, DictionaryFormat, DictionarySource};
use crate::Result;

use super::dix::{count_dix, DixStats};
use super::lexicon::{parse_lexicon_graph, Diagnostic, LexiconGraph, StemKey};

/// Name of the entry-point lexicon.
pub const ROOT_LEXICON: &str = "Root";

/// Options for counting stems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountOptions {
    /// Criterion deciding when two lexc rows are the same stem
    pub unique_on: UniqueOn,
    /// Lexicon reachability is computed from
    pub root: String,
    /// How dix documents are tallied
    pub dix_mode: DixMode,
}

impl Default for CountOptions {
    fn default() -> Self {
        Self {
            unique_on: UniqueOn::default(),
            root: ROOT_LEXICON.to_string(),
            dix_mode: DixMode::default(),
        }
    }
}

impl CountOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the uniqueness criterion.
    pub fn unique_on(mut self, unique_on: UniqueOn) -> Self {
        self.unique_on = unique_on;
        self
    }

    /// Count from a lexicon other than `Root`.
    pub fn root(mut self, name: impl Into<String>) -> Self {
        self.root = name.into();
        self
    }

    /// Set how dix documents are tallied.
    pub fn dix_mode(mut self, mode: DixMode) -> Self {
        self.dix_mode = mode;
        self
    }
}

/// Per-lexicon figures of a lexc count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexiconSummary {
    /// Lexicon name
    pub name: String,
    /// Unique entries declared directly in this lexicon
    pub unique_entries: usize,
    /// Pointer rows in this lexicon
    pub pointers: usize,
    /// Whether the lexicon had a `LEXICON` header
    pub declared: bool,
}

/// Result of counting a lexc dictionary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LexcCount {
    /// Criterion the count was made under
    pub unique_on: UniqueOn,
    /// Unique entries across all lexicons reachable from the root
    pub unique_entries: usize,
    /// Lexicons reachable from the root
    pub reachable: BTreeSet<String>,
    /// Summaries of the reachable lexicons, in name order
    pub lexicons: Vec<LexiconSummary>,
    /// Rows that were skipped while parsing
    pub diagnostics: Vec<Diagnostic>,
}

impl LexcCount {
    /// True when some rows were skipped, so the count may be low.
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Result of counting any supported dictionary.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum StemCount {
    /// A lexc lexicon
    Lexc(LexcCount),
    /// A dix dictionary
    Dix(DixStats),
    /// A metadix dictionary
    Metadix(DixStats),
}

impl StemCount {
    /// The headline stem figure.
    pub fn stems(&self) -> usize {
        match self {
            StemCount::Lexc(count) => count.unique_entries,
            StemCount::Dix(stats) | StemCount::Metadix(stats) => stats.stems,
        }
    }

    /// Format of the dictionary that was counted.
    pub fn format(&self) -> DictionaryFormat {
        match self {
            StemCount::Lexc(_) => DictionaryFormat::Lexc,
            StemCount::Dix(_) => DictionaryFormat::Dix,
            StemCount::Metadix(_) => DictionaryFormat::Metadix,
        }
    }
}

/// Count unique stems in lexc text.
///
/// ```rust
/// use stemcountlib::{count_stems, UniqueOn};
///
/// let text = "LEXICON Root\nfoo ;\nLEXICON foo\ncat:N ; ! feline\ncat:N ; ! feline\n";
/// assert_eq!(count_stems(text, UniqueOn::LemmaContinuation).unwrap(), 1);
/// ```
pub fn count_stems(text: &str, unique_on: UniqueOn) -> Result<usize> {
    let options = CountOptions::new().unique_on(unique_on);
    count_lexc(text, &options).map(|count| count.unique_entries)
}

/// Count lexc text and keep the per-lexicon breakdown and skipped rows.
///
/// Fails with [`StemcountError::MissingRoot`] when no `LEXICON` header
/// declares the root lexicon; malformed rows only produce diagnostics.
pub fn count_lexc(text: &str, options: &CountOptions) -> Result<LexcCount> {
    let (graph, diagnostics) = parse_lexicon_graph(text, options.unique_on);

    if !graph.is_declared(&options.root) {
        error!("No {} lexicon found", options.root);
        return Err(StemcountError::MissingRoot {
            root: options.root.clone(),
        });
    }

    let reachable = graph.reachable_from(&options.root);
    info!("Counting from lexicons {:?}", reachable);

    let unique_entries = union_entries(&graph, &reachable).len();
    let lexicons = graph
        .iter()
        .filter(|(name, _)| reachable.contains(*name))
        .map(|(name, entry)| LexiconSummary {
            name: name.to_string(),
            unique_entries: entry.unique_entries.len(),
            pointers: entry.pointers.len(),
            declared: entry.declared,
        })
        .collect();

    info!("Unique entries: {}", unique_entries);

    Ok(LexcCount {
        unique_on: options.unique_on,
        unique_entries,
        reachable,
        lexicons,
        diagnostics,
    })
}

/// Union of the unique entries of every reachable lexicon.
fn union_entries<'g>(graph: &'g LexiconGraph, reachable: &BTreeSet<String>) -> HashSet<&'g StemKey> {
    let mut entries = HashSet::new();
    for name in reachable {
        if let Some(entry) = graph.get(name) {
            info!(
                "In lexicon {} referenced from root, found {} entries.",
                name,
                entry.unique_entries.len()
            );
            entries.extend(entry.unique_entries.iter());
        }
    }
    entries
}

/// Count dictionary text of a known format.
pub fn count_text(text: &str, format: DictionaryFormat, options: &CountOptions) -> Result<StemCount> {
    match format {
        DictionaryFormat::Lexc => count_lexc(text, options).map(StemCount::Lexc),
        DictionaryFormat::Dix => count_dix(text, options.dix_mode).map(StemCount::Dix),
        DictionaryFormat::Metadix => count_dix(text, options.dix_mode).map(StemCount::Metadix),
    }
}

/// Fetch a dictionary and count it according to its extension.
///
/// # Example
///
/// ```rust,ignore
/// use stemcountlib::{count_source, CountOptions, DictionarySource};
///
/// let source = DictionarySource::parse("apertium-kaz/apertium-kaz.kaz.lexc");
/// let count = count_source(&source, &CountOptions::new())?;
/// println!("Stems: {}", count.stems());
/// ```
pub fn count_source(source: &DictionarySource, options: &CountOptions) -> Result<StemCount> {
    let format = source.format()?;
    let text = fetch(source)?;
    count_text(&text, format, options)
}
