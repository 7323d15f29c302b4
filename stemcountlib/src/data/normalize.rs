//! Line normalization for lexc text.
//!
//! lexc escapes any single character with a leading `%` and starts a comment
//! with `!`. Every helper here is escape-aware: an escaped `!`, `:`, `;` or
//! space is a literal and never acts as a delimiter.

const ESCAPE: char = '%';
const COMMENT: char = '!';

/// Iterator over `(byte offset, char, escaped)` triples of a lexc fragment.
///
/// An escape pair `%x` yields `x` once, at the offset of the `%`. A lone
/// trailing `%` is yielded as itself.
struct Scan<'a> {
    chars: std::str::CharIndices<'a>,
}

impl<'a> Scan<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            chars: s.char_indices(),
        }
    }
}

impl Iterator for Scan<'_> {
    type Item = (usize, char, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, c) = self.chars.next()?;
        if c == ESCAPE {
            if let Some((_, escaped)) = self.chars.next() {
                return Some((idx, escaped, true));
            }
        }
        Some((idx, c, false))
    }
}

/// A physical lexc line split at its first unescaped `!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanLine<'a> {
    /// Text before the comment marker, escapes still in place
    pub code: &'a str,
    /// Unescaped and trimmed comment text; `None` when absent or blank
    pub comment: Option<String>,
}

impl<'a> CleanLine<'a> {
    /// Split a raw line into code and comment.
    pub fn split(raw: &'a str) -> Self {
        let raw = raw.trim_start();
        match find_unescaped(raw, COMMENT) {
            Some(idx) => {
                let comment = unescape(&raw[idx + COMMENT.len_utf8()..])
                    .trim()
                    .to_string();
                Self {
                    code: &raw[..idx],
                    comment: (!comment.is_empty()).then_some(comment),
                }
            }
            None => Self {
                code: raw,
                comment: None,
            },
        }
    }

    /// The normalized line: unescaped code, trimmed.
    pub fn content(&self) -> String {
        unescape(self.code).trim().to_string()
    }

    /// True for blank and comment-only lines.
    pub fn is_blank(&self) -> bool {
        self.content().is_empty()
    }
}

/// Normalize one raw lexc line.
///
/// Escapes are resolved, everything from the first unescaped `!` is dropped
/// and the result is trimmed. Blank and comment-only lines come back empty.
///
/// ```rust
/// use stemcountlib::clean_line;
///
/// assert_eq!(clean_line("  cat:cat N ; ! feline "), "cat:cat N ;");
/// assert_eq!(clean_line("wow%!:wow%! Interj ;"), "wow!:wow! Interj ;");
/// assert_eq!(clean_line("! just a comment"), "");
/// ```
pub fn clean_line(raw: &str) -> String {
    CleanLine::split(raw).content()
}

/// Resolve every `%x` escape to `x`.
pub fn unescape(s: &str) -> String {
    Scan::new(s).map(|(_, c, _)| c).collect()
}

/// Byte offset of the first unescaped `target`.
pub(crate) fn find_unescaped(s: &str, target: char) -> Option<usize> {
    Scan::new(s)
        .find(|&(_, c, escaped)| !escaped && c == target)
        .map(|(idx, _, _)| idx)
}

/// Split around the first unescaped `target`, dropping the delimiter.
pub(crate) fn split_unescaped(s: &str, target: char) -> Option<(&str, &str)> {
    find_unescaped(s, target).map(|idx| (&s[..idx], &s[idx + target.len_utf8()..]))
}

/// Number of unescaped whitespace runs between non-whitespace content.
///
/// Leading and trailing whitespace is not counted, matching a count over a
/// trimmed line.
pub(crate) fn whitespace_runs(s: &str) -> usize {
    let mut runs = 0;
    let mut seen_content = false;
    let mut in_run = false;

    for (_, c, escaped) in Scan::new(s) {
        if !escaped && c.is_whitespace() {
            in_run = seen_content;
        } else {
            if in_run {
                runs += 1;
                in_run = false;
            }
            seen_content = true;
        }
    }

    runs
}

/// Split on unescaped whitespace and unescape each token.
pub(crate) fn tokens(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for (_, c, escaped) in Scan::new(s) {
        if !escaped && c.is_whitespace() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }

    out
}
