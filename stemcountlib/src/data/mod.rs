//! Data collection: parse dictionaries and count stems.
//!
//! This module handles the second stage of the pipeline - turning dictionary
//! text into stem counts. It provides:
//!
//! - **Normalization**: escape-aware comment stripping for lexc lines
//! - **Lexicon graph**: lexicons, their unique entries and continuation pointers
//! - **Counting**: reachable-union stem counts (`count_stems`, `count_lexc`)
//! - **Dix tally**: bilingual and monolingual lttoolbox counts (`count_dix`)
//! - **History**: stem counts over a file's git history (`stem_history`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use stemcountlib::data::{count_lexc, CountOptions};
//!
//! let count = count_lexc(&text, &CountOptions::new())?;
//! println!("Unique entries: {}", count.unique_entries);
//! ```

pub mod counter;
pub mod dix;
pub mod history;
pub mod lexicon;
pub mod normalize;

pub use counter::{
    count_lexc, count_source, count_stems, count_text, CountOptions, LexcCount, LexiconSummary,
    StemCount, ROOT_LEXICON,
};
pub use dix::{count_dix, DixStats};
pub use history::{stem_history, History, HistoryEntry, HistoryOptions};
pub use lexicon::{
    classify_line, parse_lexicon_graph, Diagnostic, GraphBuilder, LexiconEntry, LexiconGraph,
    LineOutcome, SkipReason, StemKey,
};
pub use normalize::{clean_line, unescape, CleanLine};
