//! Error types for stemcountlib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while counting stems
#[derive(Error, Debug)]
pub enum StemcountError {
    /// Unknown uniqueness criterion
    #[error("invalid unique criteria: {0}")]
    InvalidCriterion(String),

    /// No root lexicon was declared in the lexc text
    #[error("no {root} lexicon found")]
    MissingRoot { root: String },

    /// Failed to read a dictionary file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Transport-level failure while fetching a dictionary
    #[error("failed to fetch '{uri}': {message}")]
    Fetch { uri: String, message: String },

    /// The server answered with a non-success status
    #[error("dictionary {uri} not found (HTTP {status})")]
    Http { uri: String, status: u16 },

    /// Malformed dix document
    #[error("malformed dix XML: {0}")]
    Xml(String),

    /// File extension is not one of lexc, dix or metadix
    #[error("unknown dictionary format: {0}")]
    UnknownFormat(String),

    /// No dictionary file found for a language
    #[error("no dictionary found for '{language}' in {dir}")]
    DictionaryNotFound { language: String, dir: PathBuf },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Git operation error
    #[error("git error: {0}")]
    GitError(String),
}
