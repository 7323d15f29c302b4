//! Template rendering for CLI output using outstanding

use console::Style;
use outstanding::{render_auto, render_with_output, Theme};
use serde::Serialize;
use stemcountlib::StemTable;

/// Include template at compile time
const STEM_TABLE_TEMPLATE: &str = include_str!("../templates/stem_table.jinja");

/// Labels longer than this are shortened from the left
const MAX_LABEL_WIDTH: usize = 60;

/// Re-export OutputMode for callers
pub use outstanding::OutputMode;

/// Data context for the stem table template
#[derive(Debug, Serialize)]
struct StemTableContext {
    title: Option<String>,
    /// Pre-padded header line
    header: String,
    /// Separator line (dashes)
    separator: String,
    /// Pre-padded data rows
    rows: Vec<String>,
    /// Pre-padded footer row
    footer: String,
    /// Legend, preceded by a blank line
    legend: Option<String>,
}

/// Map the `--output` value to an output mode.
pub fn output_mode_from_arg(value: Option<&str>) -> OutputMode {
    match value {
        Some("json") => OutputMode::Json,
        Some("text") => OutputMode::Text,
        Some("term-debug") => OutputMode::TermDebug,
        Some("term") => OutputMode::Term,
        _ => OutputMode::Auto,
    }
}

/// Create the theme with styles
fn create_theme() -> Theme {
    Theme::new().add("category", Style::new().bold())
}

fn terminated(mut out: String) -> String {
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Truncate a label to fit within max_len, adding ".." prefix if needed
fn truncate_label(label: &str, max_len: usize) -> String {
    let count = label.chars().count();
    if count > max_len {
        let tail: String = label.chars().skip(count - max_len + 2).collect();
        format!("..{}", tail)
    } else {
        label.to_string()
    }
}

/// Serialize a library result for a structured output mode (JSON).
pub fn render_structured<T: Serialize>(value: &T, output_mode: OutputMode) -> anyhow::Result<String> {
    let theme = create_theme();
    let rendered = render_auto(STEM_TABLE_TEMPLATE, value, &theme, output_mode)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(terminated(rendered))
}

/// Render a table: labels left, values right, header and footer in the
/// `category` style.
pub fn render_table(table: &StemTable, output_mode: OutputMode) -> anyhow::Result<String> {
    let theme = create_theme();

    let labels: Vec<String> = table
        .rows
        .iter()
        .map(|row| truncate_label(&row.label, MAX_LABEL_WIDTH))
        .collect();
    let footer_label = truncate_label(&table.footer.label, MAX_LABEL_WIDTH);

    let label_width = labels
        .iter()
        .chain(std::iter::once(&footer_label))
        .map(|l| l.chars().count())
        .chain(table.headers.first().map(|h| h.chars().count()))
        .max()
        .unwrap_or(0);

    let columns = table.headers.len().saturating_sub(1);
    let mut widths: Vec<usize> = table
        .headers
        .iter()
        .skip(1)
        .map(|h| h.chars().count())
        .collect();
    for row in table.rows.iter().chain(std::iter::once(&table.footer)) {
        for (idx, value) in row.values.iter().enumerate().take(columns) {
            widths[idx] = widths[idx].max(value.chars().count());
        }
    }

    let first_header = table.headers.first().map_or("", String::as_str);
    let header_values: Vec<String> = table.headers.iter().skip(1).cloned().collect();

    let context = StemTableContext {
        title: table.title.clone(),
        header: format_row(first_header, &header_values, label_width, &widths),
        separator: "-".repeat(label_width + widths.iter().map(|w| w + 2).sum::<usize>()),
        rows: labels
            .iter()
            .zip(&table.rows)
            .map(|(label, row)| format_row(label, &row.values, label_width, &widths))
            .collect(),
        footer: format_row(&footer_label, &table.footer.values, label_width, &widths),
        legend: table.legend.as_ref().map(|legend| format!("\n{}", legend)),
    };

    let rendered = render_with_output(STEM_TABLE_TEMPLATE, &context, &theme, output_mode)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(terminated(rendered))
}

/// Render a rowless table as `Header: value` lines, one per filled footer
/// cell.
pub fn render_summary(table: &StemTable) -> String {
    table
        .headers
        .iter()
        .skip(1)
        .zip(&table.footer.values)
        .filter(|(_, value)| !value.is_empty() && value.as_str() != "-")
        .map(|(header, value)| format!("{}: {}\n", header, value))
        .collect()
}

fn format_row(label: &str, values: &[String], label_width: usize, widths: &[usize]) -> String {
    let mut line = format!("{:<width$}", label, width = label_width);
    for (value, width) in values.iter().zip(widths) {
        line.push_str("  ");
        line.push_str(&format!("{:>width$}", value, width = *width));
    }
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stemcountlib::{DixStats, TableRow};

    fn sample_table() -> StemTable {
        StemTable {
            title: None,
            headers: vec!["Lexicon".into(), "Entries".into(), "Pointers".into()],
            rows: vec![
                TableRow {
                    label: "Nouns".into(),
                    values: vec!["120".into(), "0".into()],
                },
                TableRow {
                    label: "Verbs".into(),
                    values: vec!["7".into(), "2".into()],
                },
            ],
            footer: TableRow {
                label: "Total (2 lexicons)".into(),
                values: vec!["125".into(), String::new()],
            },
            legend: None,
        }
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let out = render_table(&sample_table(), OutputMode::Text).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Lexicon             Entries  Pointers");
        assert!(lines[1].starts_with("----"));
        assert_eq!(lines[2], "Nouns                   120         0");
        assert_eq!(lines[3], "Verbs                     7         2");
        assert!(lines[4].starts_with("----"));
        assert_eq!(lines[5], "Total (2 lexicons)      125");
    }

    #[test]
    fn test_render_table_text_mode_has_no_styles() {
        let out = render_table(&sample_table(), OutputMode::Text).unwrap();
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn test_render_table_title_and_legend() {
        let mut table = sample_table();
        table.title = Some("apertium-xyz.xyz.lexc @ HEAD".into());
        table.legend = Some("1 row(s) skipped while parsing".into());

        let out = render_table(&table, OutputMode::Text).unwrap();
        assert!(out.starts_with("apertium-xyz.xyz.lexc @ HEAD\n"));
        assert!(out.ends_with("\n\n1 row(s) skipped while parsing\n"));
    }

    #[test]
    fn test_render_table_without_rows() {
        let table = StemTable::from_dix(&DixStats {
            stems: 3,
            paradigms: None,
            bilingual: true,
        });
        let out = render_table(&table, OutputMode::Text).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "bilingual       3          -");
    }

    #[test]
    fn test_render_summary_from_dix() {
        let bilingual = StemTable::from_dix(&DixStats {
            stems: 3,
            paradigms: None,
            bilingual: true,
        });
        assert_eq!(render_summary(&bilingual), "Stems: 3\n");

        let monolingual = StemTable::from_dix(&DixStats {
            stems: 2,
            paradigms: Some(1),
            bilingual: false,
        });
        assert_eq!(render_summary(&monolingual), "Stems: 2\nParadigms: 1\n");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("abcdefghijkl", 8), "..ghijkl");
    }

    #[test]
    fn test_output_mode_from_arg() {
        assert!(matches!(output_mode_from_arg(Some("json")), OutputMode::Json));
        assert!(matches!(output_mode_from_arg(Some("text")), OutputMode::Text));
        assert!(matches!(output_mode_from_arg(None), OutputMode::Auto));
    }

    #[test]
    fn test_render_structured_json() {
        let out = render_structured(&sample_table(), OutputMode::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["footer"]["values"][0], "125");
        assert!(value.get("title").is_none());
    }
}
