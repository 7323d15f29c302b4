//! Dictionary discovery with glob pattern support.
//!
//! Apertium language repositories keep their dictionaries next to build
//! scripts, tag sets and test data. This module walks such trees and picks
//! out the lexc, dix and metadix files.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::StemcountError;
use crate::Result;

use super::DictionaryFormat;

/// Configuration for dictionary filtering.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Glob patterns to include (if empty, include every dictionary)
    pub include: Vec<Pattern>,
    /// Glob patterns to exclude
    pub exclude: Vec<Pattern>,
}

impl FilterConfig {
    /// Create a new empty filter config (includes every dictionary).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(compile(pattern)?);
        Ok(self)
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude.push(compile(pattern)?);
        Ok(self)
    }

    /// Check if a path matches the filter criteria.
    ///
    /// A path matches if it has a dictionary extension, matches at least one
    /// include pattern (or include is empty) and matches no exclude pattern.
    pub fn matches(&self, path: &Path) -> bool {
        if DictionaryFormat::from_path(path).is_err() {
            return false;
        }

        let path_str = path.to_string_lossy();

        if self.exclude.iter().any(|p| p.matches(&path_str)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|p| p.matches(&path_str))
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| StemcountError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Hidden directories hold VCS metadata and editor state.
fn should_skip_dir(name: &str) -> bool {
    name.starts_with('.')
}

/// Discover dictionaries under a directory.
///
/// Walks the tree and returns every dictionary file that matches the filter,
/// sorted. A file root is returned as-is when it matches.
pub fn discover_dictionaries(
    root: impl AsRef<Path>,
    filter: &FilterConfig,
) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();

    if !root.exists() {
        return Err(StemcountError::PathNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();

    if root.is_file() {
        if filter.matches(root) {
            files.push(root.to_path_buf());
        }
        return Ok(files);
    }

    let walker = WalkDir::new(root).follow_links(true).into_iter();

    for entry in walker.filter_entry(|e| {
        if e.depth() == 0 {
            return true;
        }
        if e.file_type().is_dir() {
            let name = e.file_name().to_str().unwrap_or("");
            return !should_skip_dir(name);
        }
        true
    }) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let path = entry.path();

        if path.is_file() && filter.matches(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();

    Ok(files)
}

/// Locate the main dictionary of a language in its repository directory.
///
/// Looks for `apertium-{lang}.{lang}.*` directly inside `repo_dir` and returns
/// the first match (in sorted order) with a dictionary extension.
pub fn language_dictionary(repo_dir: impl AsRef<Path>, language: &str) -> Result<PathBuf> {
    let repo_dir = repo_dir.as_ref();
    let dir = Pattern::escape(&repo_dir.to_string_lossy());
    let name = Pattern::escape(&format!("apertium-{language}.{language}."));
    let pattern = format!("{dir}/{name}*");

    let entries = glob::glob(&pattern).map_err(|e| StemcountError::InvalidGlob {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file() && DictionaryFormat::from_path(path).is_ok())
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| StemcountError::DictionaryNotFound {
            language: language.to_string(),
            dir: repo_dir.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn create_language_repo(dir: &Path) {
        fs::create_dir_all(dir.join("dev")).unwrap();
        fs::create_dir_all(dir.join(".git/objects")).unwrap();

        fs::write(dir.join("apertium-kaz.kaz.lexc"), "LEXICON Root\n").unwrap();
        fs::write(dir.join("apertium-kaz.kaz.twol"), "Alphabet\n").unwrap();
        fs::write(dir.join("apertium-kaz.kaz.rlx"), "DELIMITERS\n").unwrap();
        fs::write(dir.join("dev/extra.lexc"), "LEXICON Root\n").unwrap();
        fs::write(dir.join("dev/old.dix"), "<dictionary/>").unwrap();
        fs::write(dir.join(".git/objects/stale.lexc"), "LEXICON Root\n").unwrap();
        fs::write(dir.join("README.md"), "# kaz").unwrap();
    }

    #[test]
    fn test_filter_matches_dictionaries() {
        let filter = FilterConfig::new();

        assert!(filter.matches(Path::new("apertium-kaz.kaz.lexc")));
        assert!(filter.matches(Path::new("x/apertium-eng-spa.eng-spa.dix")));
        assert!(filter.matches(Path::new("apertium-eng.eng.metadix")));
        assert!(!filter.matches(Path::new("apertium-kaz.kaz.twol")));
        assert!(!filter.matches(Path::new("Makefile.am")));
    }

    #[test]
    fn test_filter_with_patterns() {
        let filter = FilterConfig::new()
            .include("**/*.lexc")
            .unwrap()
            .exclude("**/dev/**")
            .unwrap();

        assert!(filter.matches(Path::new("repo/apertium-kaz.kaz.lexc")));
        assert!(!filter.matches(Path::new("repo/dev/extra.lexc")));
        assert!(!filter.matches(Path::new("repo/a.dix")));
    }

    #[test]
    fn test_discover_dictionaries() {
        let temp = tempdir().unwrap();
        create_language_repo(temp.path());

        let files = discover_dictionaries(temp.path(), &FilterConfig::new()).unwrap();

        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("apertium-kaz.kaz.lexc"));
        assert!(files.iter().any(|p| p.ends_with("dev/old.dix")));
        assert!(!files.iter().any(|p| p.to_string_lossy().contains(".git")));
    }

    #[test]
    fn test_discover_with_exclude() {
        let temp = tempdir().unwrap();
        create_language_repo(temp.path());

        let filter = FilterConfig::new().exclude("**/dev/**").unwrap();
        let files = discover_dictionaries(temp.path(), &filter).unwrap();

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_discover_single_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("x.lexc");
        fs::write(&path, "LEXICON Root\n").unwrap();

        let files = discover_dictionaries(&path, &FilterConfig::new()).unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn test_discover_nonexistent() {
        let result = discover_dictionaries("/nonexistent/path", &FilterConfig::new());
        assert!(matches!(result, Err(StemcountError::PathNotFound(_))));
    }

    #[test]
    fn test_language_dictionary() {
        let temp = tempdir().unwrap();
        create_language_repo(temp.path());

        let path = language_dictionary(temp.path(), "kaz").unwrap();
        assert!(path.ends_with("apertium-kaz.kaz.lexc"));
    }

    #[test]
    fn test_language_dictionary_missing() {
        let temp = tempdir().unwrap();
        create_language_repo(temp.path());

        let err = language_dictionary(temp.path(), "tat").unwrap_err();
        assert!(matches!(err, StemcountError::DictionaryNotFound { .. }));
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let result = FilterConfig::new().include("[invalid");

        if let Err(StemcountError::InvalidGlob { pattern, .. }) = result {
            assert_eq!(pattern, "[invalid");
        } else {
            panic!("Expected InvalidGlob error");
        }
    }
}
