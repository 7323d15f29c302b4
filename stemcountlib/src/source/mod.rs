//! Source discovery: find and fetch dictionaries.
//!
//! This module handles the first stage of the pipeline - getting dictionary
//! text to count. It provides:
//!
//! - **Sources**: local paths or `http(s)` URLs, fetched into a string
//! - **Formats**: lexc, dix or metadix, detected from the extension
//! - **File filtering**: find dictionaries in a tree with glob patterns
//!
//! ## Example
//!
//! ```rust,ignore
//! use stemcountlib::source::{fetch, DictionarySource, FilterConfig, discover_dictionaries};
//!
//! let source = DictionarySource::parse("https://example.org/apertium-kaz.kaz.lexc");
//! let text = fetch(&source)?;
//!
//! let filter = FilterConfig::new().exclude("**/dev/**")?;
//! let files = discover_dictionaries("apertium-kaz", &filter)?;
//! ```

pub mod fetch;
pub mod filter;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::StemcountError;
use crate::Result;

pub use fetch::{decode_text, fetch};
pub use filter::{discover_dictionaries, language_dictionary, FilterConfig};

/// Where dictionary text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    /// A file on disk
    Path(PathBuf),
    /// An `http://` or `https://` URL
    Url(String),
}

impl DictionarySource {
    /// Classify a URI: anything starting with `http://` or `https://` is a URL.
    pub fn parse(uri: &str) -> Self {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            DictionarySource::Url(uri.to_string())
        } else {
            DictionarySource::Path(PathBuf::from(uri))
        }
    }

    /// Format implied by the source's extension.
    pub fn format(&self) -> Result<DictionaryFormat> {
        match self {
            DictionarySource::Path(path) => DictionaryFormat::from_path(path),
            DictionarySource::Url(url) => DictionaryFormat::from_name(url),
        }
    }
}

impl fmt::Display for DictionarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionarySource::Path(path) => write!(f, "{}", path.display()),
            DictionarySource::Url(url) => f.write_str(url),
        }
    }
}

/// Supported dictionary formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryFormat {
    /// HFST lexc lexicon
    Lexc,
    /// lttoolbox dictionary
    Dix,
    /// lttoolbox dictionary with metadix extensions
    Metadix,
}

impl DictionaryFormat {
    /// Extensions recognised as dictionaries, without the dot.
    pub const EXTENSIONS: [&'static str; 3] = ["lexc", "dix", "metadix"];

    /// Detect the format from a file name, path or URL.
    ///
    /// Query strings and fragments on URLs are ignored.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.split(['?', '#']).next().unwrap_or(name);
        let file = name.rsplit('/').next().unwrap_or(name);
        let extension = file.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        Self::from_extension(extension)
            .ok_or_else(|| StemcountError::UnknownFormat(file.to_string()))
    }

    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| StemcountError::UnknownFormat(path.display().to_string()))
    }

    fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "lexc" => Some(DictionaryFormat::Lexc),
            "dix" => Some(DictionaryFormat::Dix),
            "metadix" => Some(DictionaryFormat::Metadix),
            _ => None,
        }
    }

    /// Extension of this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DictionaryFormat::Lexc => "lexc",
            DictionaryFormat::Dix => "dix",
            DictionaryFormat::Metadix => "metadix",
        }
    }
}

impl fmt::Display for DictionaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
