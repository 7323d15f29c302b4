//! Input options for stem counting.
//!
//! This module contains the configuration types that control how entries
//! are considered unique and how dix documents are tallied.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StemcountError;

/// Criterion deciding when two lexc rows are the same stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UniqueOn {
    /// Same lemma and same set of continuation classes
    #[default]
    #[serde(rename = "lemma+continuationLexicon")]
    LemmaContinuation,
    /// Same lemma and same gloss
    #[serde(rename = "lemma+gloss")]
    LemmaGloss,
    /// Alias of `LemmaGloss`; the gloss lives in the row comment
    #[serde(rename = "lemma+comment")]
    LemmaComment,
}

impl UniqueOn {
    /// All accepted criteria, in their textual form.
    pub const NAMES: [&'static str; 3] =
        ["lemma+continuationLexicon", "lemma+gloss", "lemma+comment"];

    /// Canonical textual name of the criterion.
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueOn::LemmaContinuation => "lemma+continuationLexicon",
            UniqueOn::LemmaGloss => "lemma+gloss",
            UniqueOn::LemmaComment => "lemma+comment",
        }
    }

    /// Whether keys are built from the gloss rather than the continuation classes.
    pub fn uses_gloss(&self) -> bool {
        matches!(self, UniqueOn::LemmaGloss | UniqueOn::LemmaComment)
    }
}

impl fmt::Display for UniqueOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UniqueOn {
    type Err = StemcountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lemma+continuationLexicon" => Ok(UniqueOn::LemmaContinuation),
            "lemma+gloss" => Ok(UniqueOn::LemmaGloss),
            "lemma+comment" => Ok(UniqueOn::LemmaComment),
            _ => Err(StemcountError::InvalidCriterion(s.to_string())),
        }
    }
}

/// How a dix document should be tallied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DixMode {
    /// Bilingual when the document has no `<pardefs>` section
    #[default]
    Auto,
    /// Count `<l>` sides of entries in the main section
    Bilingual,
    /// Count lemma-bearing entries and paradigms
    Monolingual,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_on_default() {
        assert_eq!(UniqueOn::default(), UniqueOn::LemmaContinuation);
    }

    #[test]
    fn test_unique_on_from_str() {
        for name in UniqueOn::NAMES {
            let parsed = UniqueOn::from_str(name).unwrap();
            assert_eq!(parsed.as_str(), name);
        }
    }

    #[test]
    fn test_unique_on_rejects_unknown() {
        let err = UniqueOn::from_str("lemma").unwrap_err();
        assert!(matches!(err, StemcountError::InvalidCriterion(ref s) if s == "lemma"));
        assert!(UniqueOn::from_str("Lemma+Gloss").is_err());
    }

    #[test]
    fn test_comment_is_gloss_alias() {
        assert!(UniqueOn::LemmaComment.uses_gloss());
        assert!(UniqueOn::LemmaGloss.uses_gloss());
        assert!(!UniqueOn::LemmaContinuation.uses_gloss());
    }

    #[test]
    fn test_unique_on_serde_names() {
        let json = serde_json::to_string(&UniqueOn::LemmaGloss).unwrap();
        assert_eq!(json, "\"lemma+gloss\"");
        let back: UniqueOn = serde_json::from_str("\"lemma+continuationLexicon\"").unwrap();
        assert_eq!(back, UniqueOn::LemmaContinuation);
    }

    #[test]
    fn test_dix_mode_default() {
        assert_eq!(DixMode::default(), DixMode::Auto);
    }
}
