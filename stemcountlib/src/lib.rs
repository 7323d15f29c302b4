//! # stemcountlib
//!
//! A stem counter for Apertium morphological dictionaries.
//!
//! ## Overview
//!
//! A dictionary's size, measured in stems, is the usual figure for how far
//! along a language pair is. This library computes it for:
//!
//! - **lexc**: HFST lexicons, counted as the unique entries of every lexicon
//!   reachable from `Root` through continuation pointers
//! - **dix / metadix**: lttoolbox dictionaries, counted by the left sides of
//!   the main section (bilingual) or by the lemma-bearing entries and
//!   paradigms (monolingual)
//!
//! ## Features
//!
//! - **Escape-aware lexc parsing**: `%!`, `%:` and `% ` are literals, never syntax
//! - **Configurable uniqueness**: lemma with continuation classes, gloss or comment
//! - **Cycle-safe reachability**: mutually recursive lexicons are counted once
//! - **Remote sources**: dictionaries can be read from `http(s)` URLs
//! - **History**: the stem count of a file at every commit that touched it
//! - **Pure Rust data types**: Returns structured data, no output side effects
//!
//! ## Example
//!
//! ```rust
//! use stemcountlib::{count_lexc, count_stems, CountOptions, UniqueOn};
//!
//! let text = "\
//! LEXICON Root
//! Nouns ;
//! LEXICON Nouns
//! cat:cat N-SG ;
//! dog:dog N-SG ;
//! dog:dog SG-N ;
//! ";
//!
//! // Class order does not make a new stem
//! assert_eq!(count_stems(text, UniqueOn::LemmaContinuation).unwrap(), 2);
//!
//! let count = count_lexc(text, &CountOptions::new()).unwrap();
//! assert!(count.reachable.contains("Nouns"));
//! assert!(!count.is_degraded());
//! ```

pub mod data;
pub mod error;
pub mod options;
pub mod output;
pub mod source;

pub use data::{
    classify_line, clean_line, count_dix, count_lexc, count_source, count_stems, count_text,
    parse_lexicon_graph, stem_history, CountOptions, Diagnostic, DixStats, History, HistoryEntry,
    HistoryOptions, LexcCount, LexiconEntry, LexiconGraph, LexiconSummary, LineOutcome,
    SkipReason, StemCount, StemKey, ROOT_LEXICON,
};
pub use error::StemcountError;
pub use options::{DixMode, UniqueOn};
pub use output::{StemTable, TableRow};
pub use source::{
    discover_dictionaries, fetch, language_dictionary, DictionaryFormat, DictionarySource,
    FilterConfig,
};

/// Result type for stemcountlib operations
pub type Result<T> = std::result::Result<T, StemcountError>;
