//! Lexicon graph construction from lexc text.
//!
//! A lexc file is a sequence of `LEXICON <name>` sections. Each section holds
//! rows of two kinds:
//!
//! - **entries**, which carry a lemma and one or more continuation classes,
//!   either as `lemma:surface Class ;` or `lemma Class ;`
//! - **pointers**, which name a single sub-lexicon: `Nouns ;`
//!
//! [`parse_lexicon_graph`] folds the lines of a file into a [`LexiconGraph`],
//! threading a [`GraphBuilder`] accumulator through every line. Rows that do
//! not parse are skipped and reported as [`Diagnostic`]s; they never abort
//! the parse.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::normalize::{
    find_unescaped, split_unescaped, tokens, unescape, whitespace_runs, CleanLine,
};
use crate::options::UniqueOn;

const HEADER: &str = "LEXICON";

/// Uniqueness key of one dictionary row.
///
/// Continuation classes are held in an ordered set, so `N-Vblex` and
/// `Vblex-N` produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum StemKey {
    /// Lemma plus its set of continuation classes
    Continuation {
        lemma: String,
        classes: BTreeSet<String>,
    },
    /// Lemma plus the gloss found in the row comment
    Gloss {
        lemma: String,
        gloss: Option<String>,
    },
}

/// Contents of one named lexicon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexiconEntry {
    /// Sub-lexicons named by pointer rows, in file order
    pub pointers: Vec<String>,
    /// Unique keys of the entry rows
    pub unique_entries: HashSet<StemKey>,
    /// Whether a `LEXICON` header for this name was seen
    pub declared: bool,
}

/// Mapping from lexicon name to its contents.
///
/// Entries are created on first reference, as a header or as a pointer
/// target, so a dangling pointer resolves to an empty lexicon.
#[derive(Debug, Clone, Default)]
pub struct LexiconGraph {
    lexicons: BTreeMap<String, LexiconEntry>,
}

impl LexiconGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for `name`, inserting an empty one if needed.
    pub fn entry_mut(&mut self, name: &str) -> &mut LexiconEntry {
        self.lexicons.entry(name.to_string()).or_default()
    }

    /// Look up a lexicon.
    pub fn get(&self, name: &str) -> Option<&LexiconEntry> {
        self.lexicons.get(name)
    }

    /// Whether a `LEXICON name` header was seen.
    pub fn is_declared(&self, name: &str) -> bool {
        self.lexicons.get(name).is_some_and(|e| e.declared)
    }

    /// Iterate lexicons in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LexiconEntry)> {
        self.lexicons.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Names transitively reachable from `root` through pointer rows.
    ///
    /// `root` itself is only included when some reachable lexicon points
    /// back at it. Cycles are visited once.
    pub fn reachable_from(&self, root: &str) -> BTreeSet<String> {
        let mut reachable = BTreeSet::new();
        let mut stack: Vec<&str> = match self.lexicons.get(root) {
            Some(entry) => entry.pointers.iter().rev().map(String::as_str).collect(),
            None => return reachable,
        };

        while let Some(name) = stack.pop() {
            if !reachable.insert(name.to_string()) {
                continue;
            }
            if let Some(entry) = self.lexicons.get(name) {
                stack.extend(entry.pointers.iter().rev().map(String::as_str));
            }
        }

        reachable
    }
}

/// Why a row was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// `LEXICON` header without a name
    #[error("LEXICON header without a name")]
    MissingLexiconName,
    /// Colon-form entry that does not match `lemma:continuation ;`
    #[error("entry does not match 'lemma:continuation ;'")]
    MalformedEntry,
    /// Entry row without a continuation class
    #[error("entry has no continuation class")]
    MissingContinuation,
    /// Pointer row whose name contains a space
    #[error("lexicon pointer contains a space")]
    PointerWithSpace,
    /// Row that is neither an entry nor a pointer
    #[error("row is neither an entry nor a lexicon pointer")]
    Unclassifiable,
}

/// A skipped row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
    /// What went wrong
    pub reason: SkipReason,
}

/// Result of classifying one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank or comment-only line
    Blank,
    /// `LEXICON <name>` header
    Header(String),
    /// Entry row with its uniqueness key
    Entry(StemKey),
    /// Pointer row naming a sub-lexicon
    Pointer(String),
    /// Row appearing before any header
    Orphan,
    /// Row that could not be parsed
    Skipped(SkipReason),
}

/// Classify one raw line.
///
/// `in_lexicon` tells whether a header has been seen yet; rows before the
/// first header are [`LineOutcome::Orphan`].
pub fn classify_line(raw: &str, in_lexicon: bool, unique_on: UniqueOn) -> LineOutcome {
    let line = CleanLine::split(raw);
    let content = line.content();

    if content.is_empty() {
        return LineOutcome::Blank;
    }

    if content.starts_with(HEADER) {
        return match content.split_whitespace().nth(1) {
            Some(name) => LineOutcome::Header(name.to_string()),
            None => LineOutcome::Skipped(SkipReason::MissingLexiconName),
        };
    }

    if !in_lexicon {
        return LineOutcome::Orphan;
    }

    classify_row(&line, unique_on)
}

fn classify_row(line: &CleanLine<'_>, unique_on: UniqueOn) -> LineOutcome {
    let code = line.code;
    let head = before_semicolon(code);

    match whitespace_runs(code) {
        runs if runs >= 2 => parse_entry(line, unique_on),
        // `cat:N ;` has a single run but is an entry, not a pointer
        1 if find_unescaped(head, ':').is_some() => parse_entry(line, unique_on),
        1 => parse_pointer(head),
        _ => LineOutcome::Skipped(SkipReason::Unclassifiable),
    }
}

fn parse_entry(line: &CleanLine<'_>, unique_on: UniqueOn) -> LineOutcome {
    match split_unescaped(line.code, ':') {
        Some((lemma, rest)) => parse_colon_entry(lemma, rest, line.comment.clone(), unique_on),
        None => parse_space_entry(line.code),
    }
}

/// `lemma:surface Class ;`: the last token before `;` names the classes.
fn parse_colon_entry(
    lemma: &str,
    rest: &str,
    gloss: Option<String>,
    unique_on: UniqueOn,
) -> LineOutcome {
    let Some((classes, _)) = split_unescaped(rest, ';') else {
        return LineOutcome::Skipped(SkipReason::MalformedEntry);
    };
    if lemma.is_empty() || classes.is_empty() {
        return LineOutcome::Skipped(SkipReason::MalformedEntry);
    }

    let Some(last) = tokens(classes).pop() else {
        return LineOutcome::Skipped(SkipReason::MissingContinuation);
    };

    let lemma = unescape(lemma).trim().to_string();
    let key = if unique_on.uses_gloss() {
        StemKey::Gloss { lemma, gloss }
    } else {
        StemKey::Continuation {
            lemma,
            classes: continuation_classes(&last),
        }
    };

    LineOutcome::Entry(key)
}

/// `lemma Class ;`: always keyed on continuation classes, whatever the
/// criterion.
fn parse_space_entry(code: &str) -> LineOutcome {
    let mut parts = tokens(before_semicolon(code)).into_iter();
    let (Some(lemma), Some(classes)) = (parts.next(), parts.next()) else {
        return LineOutcome::Skipped(SkipReason::MissingContinuation);
    };

    LineOutcome::Entry(StemKey::Continuation {
        lemma,
        classes: continuation_classes(&classes),
    })
}

fn parse_pointer(head: &str) -> LineOutcome {
    let name = unescape(head).trim().to_string();
    if name.contains(' ') {
        LineOutcome::Skipped(SkipReason::PointerWithSpace)
    } else if name.is_empty() {
        LineOutcome::Skipped(SkipReason::Unclassifiable)
    } else {
        LineOutcome::Pointer(name)
    }
}

fn before_semicolon(code: &str) -> &str {
    split_unescaped(code, ';').map_or(code, |(head, _)| head)
}

fn continuation_classes(field: &str) -> BTreeSet<String> {
    field.split('-').map(str::to_string).collect()
}

/// Accumulator threaded through every line of a lexc file.
#[derive(Debug)]
pub struct GraphBuilder {
    unique_on: UniqueOn,
    current: Option<String>,
    graph: LexiconGraph,
    diagnostics: Vec<Diagnostic>,
}

impl GraphBuilder {
    /// Start an empty graph keyed on `unique_on`.
    pub fn new(unique_on: UniqueOn) -> Self {
        Self {
            unique_on,
            current: None,
            graph: LexiconGraph::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Fold one line into the graph.
    pub fn push_line(mut self, line_no: usize, raw: &str) -> Self {
        match classify_line(raw, self.current.is_some(), self.unique_on) {
            LineOutcome::Header(name) => {
                self.log_switch(&name);
                self.graph.entry_mut(&name).declared = true;
                self.current = Some(name);
            }
            LineOutcome::Entry(key) => {
                if let Some(current) = &self.current {
                    debug!("Parsed L{} ({}) as {:?}", line_no, raw.trim(), key);
                    self.graph.entry_mut(current).unique_entries.insert(key);
                }
            }
            LineOutcome::Pointer(name) => {
                if let Some(current) = &self.current {
                    debug!("Parsed L{} as pointer to {}", line_no, name);
                    self.graph.entry_mut(&name);
                    self.graph.entry_mut(current).pointers.push(name);
                }
            }
            LineOutcome::Skipped(reason) => {
                warn!("Failed to parse L{}: {} ({})", line_no, raw.trim(), reason);
                self.diagnostics.push(Diagnostic {
                    line: line_no,
                    text: raw.trim().to_string(),
                    reason,
                });
            }
            LineOutcome::Blank | LineOutcome::Orphan => {}
        }
        self
    }

    /// Close the last lexicon and hand back the graph and skipped rows.
    pub fn finish(self) -> (LexiconGraph, Vec<Diagnostic>) {
        self.log_switch("END");
        (self.graph, self.diagnostics)
    }

    fn log_switch(&self, next: &str) {
        let (entries, pointers) = self
            .current
            .as_deref()
            .and_then(|name| self.graph.get(name))
            .map_or((0, 0), |e| (e.unique_entries.len(), e.pointers.len()));

        info!(
            "Switching lexicon from {} ({} unique entries, {} pointers) to {}",
            self.current.as_deref().unwrap_or("None"),
            entries,
            pointers,
            next
        );
    }
}

/// Parse lexc text into a lexicon graph.
pub fn parse_lexicon_graph(text: &str, unique_on: UniqueOn) -> (LexiconGraph, Vec<Diagnostic>) {
    text.lines()
        .enumerate()
        .fold(GraphBuilder::new(unique_on), |builder, (idx, line)| {
            builder.push_line(idx + 1, line)
        })
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(lemma: &str, classes: &[&str]) -> StemKey {
        StemKey::Continuation {
            lemma: lemma.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn classify(raw: &str) -> LineOutcome {
        classify_line(raw, true, UniqueOn::LemmaContinuation)
    }

    #[test]
    fn test_classify_header() {
        assert_eq!(
            classify_line("LEXICON Root", false, UniqueOn::default()),
            LineOutcome::Header("Root".to_string())
        );
        assert_eq!(
            classify("LEXICON Nouns ! all the nouns"),
            LineOutcome::Header("Nouns".to_string())
        );
        assert_eq!(
            classify("LEXICON"),
            LineOutcome::Skipped(SkipReason::MissingLexiconName)
        );
    }

    #[test]
    fn test_classify_blank_and_comment() {
        assert_eq!(classify(""), LineOutcome::Blank);
        assert_eq!(classify("   ! only a comment"), LineOutcome::Blank);
    }

    #[test]
    fn test_classify_orphan_before_header() {
        assert_eq!(
            classify_line("cat:cat N ;", false, UniqueOn::default()),
            LineOutcome::Orphan
        );
    }

    #[test]
    fn test_classify_pointer() {
        assert_eq!(classify("Nouns ;"), LineOutcome::Pointer("Nouns".to_string()));
        assert_eq!(
            classify("Nouns ; ! nouns go here"),
            LineOutcome::Pointer("Nouns".to_string())
        );
    }

    #[test]
    fn test_classify_pointer_with_space() {
        assert_eq!(
            classify("New% York ;"),
            LineOutcome::Skipped(SkipReason::PointerWithSpace)
        );
    }

    #[test]
    fn test_classify_no_whitespace() {
        assert_eq!(
            classify("Nouns;"),
            LineOutcome::Skipped(SkipReason::Unclassifiable)
        );
    }

    #[test]
    fn test_classify_colon_entry() {
        assert_eq!(classify("cat:cat N ;"), LineOutcome::Entry(key("cat", &["N"])));
        assert_eq!(classify("cat:N ; ! feline"), LineOutcome::Entry(key("cat", &["N"])));
    }

    #[test]
    fn test_colon_entry_uses_last_token() {
        assert_eq!(
            classify("run:run foo N-Vblex ;"),
            LineOutcome::Entry(key("run", &["N", "Vblex"]))
        );
    }

    #[test]
    fn test_colon_entry_without_semicolon() {
        assert_eq!(
            classify("cat:cat N"),
            LineOutcome::Skipped(SkipReason::MalformedEntry)
        );
    }

    #[test]
    fn test_colon_entry_empty_lemma() {
        assert_eq!(
            classify(":cat N ;"),
            LineOutcome::Skipped(SkipReason::MalformedEntry)
        );
    }

    #[test]
    fn test_escaped_colon_in_lemma() {
        assert_eq!(
            classify("a%:b:ab N ;"),
            LineOutcome::Entry(key("a:b", &["N"]))
        );
    }

    #[test]
    fn test_classify_space_entry() {
        assert_eq!(classify("cat N ;"), LineOutcome::Entry(key("cat", &["N"])));
        assert_eq!(
            classify("cat Vblex-N ; ! feline"),
            LineOutcome::Entry(key("cat", &["N", "Vblex"]))
        );
    }

    #[test]
    fn test_gloss_key_for_colon_entry() {
        let outcome = classify_line("cat:cat N ; ! feline", true, UniqueOn::LemmaGloss);
        assert_eq!(
            outcome,
            LineOutcome::Entry(StemKey::Gloss {
                lemma: "cat".to_string(),
                gloss: Some("feline".to_string()),
            })
        );
    }

    #[test]
    fn test_space_entry_ignores_gloss_criterion() {
        let outcome = classify_line("cat N ; ! feline", true, UniqueOn::LemmaComment);
        assert_eq!(outcome, LineOutcome::Entry(key("cat", &["N"])));
    }

    #[test]
    fn test_continuation_order_is_irrelevant() {
        assert_eq!(classify("x:x N-Vblex ;"), classify("x:x Vblex-N ;"));
    }

    #[test]
    fn test_graph_builder_accumulates() {
        let text = "LEXICON Root\nNouns ;\nVerbs ;\nLEXICON Nouns\ncat:cat N ;\ndog:dog N ;\n";
        let (graph, diagnostics) = parse_lexicon_graph(text, UniqueOn::default());

        assert!(diagnostics.is_empty());
        assert_eq!(graph.get("Root").unwrap().pointers, vec!["Nouns", "Verbs"]);
        assert_eq!(graph.get("Nouns").unwrap().unique_entries.len(), 2);
        // referenced but never declared
        assert!(graph.get("Verbs").is_some());
        assert!(!graph.is_declared("Verbs"));
        assert!(graph.get("Verbs").unwrap().unique_entries.is_empty());
    }

    #[test]
    fn test_repeated_header_merges() {
        let text = "LEXICON A\nx:x N ;\nB ;\nLEXICON C\nLEXICON A\ny:y N ;\nD ;\n";
        let (graph, _) = parse_lexicon_graph(text, UniqueOn::default());
        let a = graph.get("A").unwrap();

        assert_eq!(a.unique_entries.len(), 2);
        assert_eq!(a.pointers, vec!["B", "D"]);
    }

    #[test]
    fn test_skipped_rows_become_diagnostics() {
        let text = "LEXICON Root\nbad;\ncat:cat N ;\nNew% York ;\n";
        let (graph, diagnostics) = parse_lexicon_graph(text, UniqueOn::default());

        assert_eq!(graph.get("Root").unwrap().unique_entries.len(), 1);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].line, 2);
        assert_eq!(diagnostics[0].reason, SkipReason::Unclassifiable);
        assert_eq!(diagnostics[1].line, 4);
        assert_eq!(diagnostics[1].reason, SkipReason::PointerWithSpace);
    }

    #[test]
    fn test_reachable_excludes_root() {
        let text = "LEXICON Root\nA ;\nLEXICON A\nB ;\nLEXICON B\nLEXICON Z\n";
        let (graph, _) = parse_lexicon_graph(text, UniqueOn::default());
        let reachable = graph.reachable_from("Root");

        assert_eq!(
            reachable.into_iter().collect::<Vec<_>>(),
            vec!["A".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn test_reachable_terminates_on_cycle() {
        let text = "LEXICON Root\nA ;\nLEXICON A\nB ;\nLEXICON B\nA ;\nRoot ;\n";
        let (graph, _) = parse_lexicon_graph(text, UniqueOn::default());
        let reachable = graph.reachable_from("Root");

        assert_eq!(reachable.len(), 3);
        assert!(reachable.contains("Root"));
    }

    #[test]
    fn test_reachable_unknown_root() {
        let graph = LexiconGraph::new();
        assert!(graph.reachable_from("Root").is_empty());
    }
}
