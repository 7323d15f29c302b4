//! Stem tally for lttoolbox `dix` dictionaries.
//!
//! Bilingual dictionaries are counted by the left sides (`<l>`) of the entries
//! in the section whose id is `main`. Monolingual dictionaries are counted by
//! the lemma-bearing (`lm="..."`) entries of every section, plus the number
//! of paradigms in `<pardefs>`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

use crate::error::StemcountError;
use crate::options::DixMode;
use crate::Result;

/// Counts extracted from a dix document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DixStats {
    /// Stem count under the chosen mode
    pub stems: usize,
    /// Paradigm count; only reported for monolingual dictionaries with `<pardefs>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paradigms: Option<usize>,
    /// Whether the document was tallied as a bilingual dictionary
    pub bilingual: bool,
}

/// Position of an open element relative to the structures we count.
#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    main_section: bool,
    section: bool,
    pardefs: bool,
    in_main_entry: bool,
}

/// Raw figures for both modes, gathered in one pass.
#[derive(Debug, Default)]
struct Tally {
    main_sides: usize,
    lemmas: usize,
    paradigms: usize,
    has_pardefs: bool,
    saw_root: bool,
}

impl Tally {
    fn open(&mut self, element: &BytesStart<'_>, parent: Option<&Frame>, depth: usize) -> Result<Frame> {
        let name = element.name();
        let name = name.as_ref();
        let mut frame = Frame::default();

        match depth {
            0 => self.saw_root = true,
            1 => {
                frame.main_section = attribute_is(element, b"id", b"main")?;
                frame.section = name == b"section";
                // only the first <pardefs> counts
                if name == b"pardefs" && !self.has_pardefs {
                    self.has_pardefs = true;
                    frame.pardefs = true;
                }
            }
            _ => {
                let parent = parent.copied().unwrap_or_default();
                if depth == 2 {
                    frame.in_main_entry = parent.main_section && name == b"e";
                    if parent.section && has_attribute(element, b"lm")? {
                        self.lemmas += 1;
                    }
                    if parent.pardefs && name == b"pardef" {
                        self.paradigms += 1;
                    }
                } else {
                    frame.in_main_entry = parent.in_main_entry;
                    if parent.in_main_entry && name == b"l" {
                        self.main_sides += 1;
                    }
                }
            }
        }

        Ok(frame)
    }
}

/// Count stems in dix text.
///
/// ```rust
/// use stemcountlib::{count_dix, DixMode};
///
/// let xml = r#"<dictionary>
///   <section id="main" type="standard">
///     <e><p><l>house<s n="n"/></l><r>casa<s n="n"/></r></p></e>
///     <e><p><l>dog<s n="n"/></l><r>perro<s n="n"/></r></p></e>
///   </section>
/// </dictionary>"#;
/// assert_eq!(count_dix(xml, DixMode::Auto).unwrap().stems, 2);
/// ```
pub fn count_dix(xml: &str, mode: DixMode) -> Result<DixStats> {
    let tally = tally(xml)?;
    let bilingual = match mode {
        DixMode::Auto => !tally.has_pardefs,
        DixMode::Bilingual => true,
        DixMode::Monolingual => false,
    };

    Ok(if bilingual {
        DixStats {
            stems: tally.main_sides,
            paradigms: None,
            bilingual,
        }
    } else {
        DixStats {
            stems: tally.lemmas,
            paradigms: tally.has_pardefs.then_some(tally.paradigms),
            bilingual,
        }
    })
}

fn tally(xml: &str) -> Result<Tally> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut tally = Tally::default();

    loop {
        let event = reader.read_event().map_err(|e| {
            StemcountError::Xml(format!("at position {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(element) => {
                let frame = tally.open(&element, stack.last(), stack.len())?;
                stack.push(frame);
            }
            Event::Empty(element) => {
                tally.open(&element, stack.last(), stack.len())?;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !tally.saw_root {
        return Err(StemcountError::Xml("no root element".to_string()));
    }
    if !stack.is_empty() {
        return Err(StemcountError::Xml(format!(
            "{} unclosed element(s) at end of document",
            stack.len()
        )));
    }

    Ok(tally)
}

fn has_attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<bool> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| StemcountError::Xml(e.to_string()))?;
        if attr.key.as_ref() == key {
            return Ok(true);
        }
    }
    Ok(false)
}

fn attribute_is(element: &BytesStart<'_>, key: &[u8], value: &[u8]) -> Result<bool> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| StemcountError::Xml(e.to_string()))?;
        if attr.key.as_ref() == key {
            return Ok(attr.value.as_ref() == value);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIDIX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dictionary>
  <alphabet/>
  <sdefs><sdef n="n"/><sdef n="vblex"/></sdefs>
  <section id="main" type="standard">
    <e><p><l>house<s n="n"/></l><r>casa<s n="n"/></r></p></e>
    <e r="LR"><p><l>home<s n="n"/></l><r>casa<s n="n"/></r></p></e>
    <e><par n="x"/></e>
  </section>
  <section id="extra" type="standard">
    <e><p><l>dog<s n="n"/></l><r>perro<s n="n"/></r></p></e>
  </section>
</dictionary>"#;

    const MONODIX: &str = r#"<dictionary>
  <pardefs>
    <pardef n="house__n"><e><p><l/><r><s n="n"/></r></p></e></pardef>
    <pardef n="walk__vblex"><e><p><l/><r><s n="vblex"/></r></p></e></pardef>
  </pardefs>
  <section id="main" type="standard">
    <e lm="house"><i>house</i><par n="house__n"/></e>
    <e lm="walk"><i>walk</i><par n="walk__vblex"/></e>
    <e><i>orphan</i></e>
  </section>
  <section id="regex" type="inconditional">
    <e lm="1"><re>[0-9]+</re></e>
  </section>
</dictionary>"#;

    #[test]
    fn test_bidix_counts_main_left_sides() {
        let stats = count_dix(BIDIX, DixMode::Auto).unwrap();
        assert!(stats.bilingual);
        assert_eq!(stats.stems, 2);
        assert_eq!(stats.paradigms, None);
    }

    #[test]
    fn test_monodix_counts_lemmas_and_paradigms() {
        let stats = count_dix(MONODIX, DixMode::Auto).unwrap();
        assert!(!stats.bilingual);
        assert_eq!(stats.stems, 3);
        assert_eq!(stats.paradigms, Some(2));
    }

    #[test]
    fn test_forced_bilingual_on_monodix() {
        // pardef <l/> sides are not in the main section
        let stats = count_dix(MONODIX, DixMode::Bilingual).unwrap();
        assert!(stats.bilingual);
        assert_eq!(stats.stems, 0);
    }

    #[test]
    fn test_forced_monolingual_without_pardefs() {
        let stats = count_dix(BIDIX, DixMode::Monolingual).unwrap();
        assert_eq!(stats.stems, 0);
        assert_eq!(stats.paradigms, None);
    }

    #[test]
    fn test_malformed_xml() {
        let err = count_dix("<dictionary><section></dictionary>", DixMode::Auto).unwrap_err();
        assert!(matches!(err, StemcountError::Xml(_)));
    }

    #[test]
    fn test_empty_document() {
        assert!(count_dix("", DixMode::Auto).is_err());
        assert!(count_dix("<dictionary>", DixMode::Auto).is_err());
    }
}
