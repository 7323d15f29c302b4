//! # stemcount
//!
//! A CLI tool for counting stems in Apertium dictionaries.
//!
//! ## Overview
//!
//! stemcount is built on top of stemcountlib and provides a command-line
//! interface for measuring dictionaries: lexc lexicons, bilingual and
//! monolingual dix files, and their growth over a repository's history.
//!
//! ## Usage
//!
//! ```bash
//! # Count the stems of a lexc file (local or remote)
//! stemcount lexc apertium-kaz/apertium-kaz.kaz.lexc
//! stemcount lexc https://example.org/apertium-kaz.kaz.lexc --by-lexicon
//!
//! # Unique on lemma and gloss instead of continuation classes
//! stemcount lexc apertium-kaz.kaz.lexc -l
//!
//! # Count a bilingual dictionary
//! stemcount dix apertium-kaz-tat.kaz-tat.dix -b
//!
//! # Stem count at every commit that changed a dictionary
//! stemcount history apertium-kaz.kaz.lexc -p apertium-kaz -n 20
//!
//! # Count every dictionary in a checkout
//! stemcount scan apertium-kaz --exclude "**/dev/**" --output json
//! ```

mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use console::Style;
use serde::Serialize;
use stemcountlib::{
    count_dix, count_lexc, count_source, discover_dictionaries, fetch, language_dictionary,
    stem_history, CountOptions, DictionarySource, DixMode, FilterConfig, HistoryOptions,
    StemCount, StemTable, UniqueOn, ROOT_LEXICON,
};
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use render::{output_mode_from_arg, render_structured, render_summary, render_table, OutputMode};

/// One counted file of a directory scan
#[derive(Debug, Serialize)]
struct ScanEntry {
    path: PathBuf,
    count: StemCount,
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("stemcount")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Stem counter for Apertium lexc and dix dictionaries")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .global(true)
                .value_parser(["auto", "term", "term-debug", "text", "json"])
                .default_value("auto")
                .help("Output mode"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v warn, -vv info, -vvv debug)"),
        )
        .subcommand(
            Command::new("lexc")
                .about("Count unique stems reachable from the root lexicon")
                .arg(
                    Arg::new("uri")
                        .required(true)
                        .help("Path or http(s) URL of the lexc file"),
                )
                .arg(
                    Arg::new("uniq-lemma-gloss")
                        .short('l')
                        .long("uniq-lemma-gloss")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("unique-on")
                        .help("Count unique lemma+gloss pairs"),
                )
                .arg(
                    Arg::new("unique-on")
                        .long("unique-on")
                        .value_name("CRITERION")
                        .help(format!(
                            "Uniqueness criterion ({})",
                            UniqueOn::NAMES.join(", ")
                        )),
                )
                .arg(
                    Arg::new("root")
                        .long("root")
                        .value_name("LEXICON")
                        .default_value(ROOT_LEXICON)
                        .help("Lexicon to count from"),
                )
                .arg(
                    Arg::new("by-lexicon")
                        .long("by-lexicon")
                        .action(ArgAction::SetTrue)
                        .help("Show breakdown by reachable lexicon"),
                ),
        )
        .subcommand(
            Command::new("dix")
                .about("Count stems in an lttoolbox dictionary")
                .arg(
                    Arg::new("uri")
                        .required(true)
                        .help("Path or http(s) URL of the dix file"),
                )
                .arg(
                    Arg::new("bidix")
                        .short('b')
                        .long("bidix")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("monodix")
                        .help("Count as a bilingual dictionary"),
                )
                .arg(
                    Arg::new("monodix")
                        .short('m')
                        .long("monodix")
                        .action(ArgAction::SetTrue)
                        .help("Count as a monolingual dictionary"),
                ),
        )
        .subcommand(
            Command::new("history")
                .about("Show the stem count at every commit that changed a dictionary")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .help("Dictionary file inside the repository"),
                )
                .arg(
                    Arg::new("path")
                        .short('p')
                        .long("path")
                        .default_value(".")
                        .help("Path to repository"),
                )
                .arg(
                    Arg::new("rev")
                        .long("rev")
                        .default_value("HEAD")
                        .help("Revision to walk back from"),
                )
                .arg(
                    Arg::new("limit")
                        .short('n')
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .help("Show at most N commits"),
                )
                .arg(
                    Arg::new("uniq-lemma-gloss")
                        .short('l')
                        .long("uniq-lemma-gloss")
                        .action(ArgAction::SetTrue)
                        .help("Count unique lemma+gloss pairs"),
                )
                .arg(
                    Arg::new("bidix")
                        .short('b')
                        .long("bidix")
                        .action(ArgAction::SetTrue)
                        .help("Count dix revisions as bilingual"),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("Count every dictionary found under a directory")
                .arg(
                    Arg::new("dir")
                        .default_value(".")
                        .help("Directory to scan"),
                )
                .arg(
                    Arg::new("include")
                        .short('i')
                        .long("include")
                        .action(ArgAction::Append)
                        .help("Include files matching glob pattern"),
                )
                .arg(
                    Arg::new("exclude")
                        .short('e')
                        .long("exclude")
                        .action(ArgAction::Append)
                        .help("Exclude files matching glob pattern"),
                )
                .arg(
                    Arg::new("language")
                        .long("language")
                        .value_name("LANG")
                        .conflicts_with_all(["include", "exclude"])
                        .help("Only count the language's main dictionary (apertium-LANG.LANG.*)"),
                ),
        )
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` takes precedence over the `-v` count.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn string_arg<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a str> {
    matches.get_one::<String>(id).map(|s| s.as_str())
}

fn required_arg<'a>(matches: &'a ArgMatches, id: &str) -> anyhow::Result<&'a str> {
    string_arg(matches, id).with_context(|| format!("missing argument <{}>", id))
}

/// Resolve `-l` / `--unique-on` to a criterion.
fn extract_unique_on(matches: &ArgMatches) -> anyhow::Result<UniqueOn> {
    if matches.get_flag("uniq-lemma-gloss") {
        return Ok(UniqueOn::LemmaGloss);
    }
    let unique_on = match matches.try_get_one::<String>("unique-on") {
        Ok(Some(name)) => name.parse()?,
        _ => UniqueOn::default(),
    };
    Ok(unique_on)
}

/// Build filter config from matches
fn build_filter(matches: &ArgMatches) -> anyhow::Result<FilterConfig> {
    let mut filter = FilterConfig::new();

    if let Some(includes) = matches.get_many::<String>("include") {
        for pattern in includes {
            filter = filter.include(pattern)?;
        }
    }

    if let Some(excludes) = matches.get_many::<String>("exclude") {
        for pattern in excludes {
            filter = filter.exclude(pattern)?;
        }
    }

    Ok(filter)
}

/// Convert a path to a relative path from the base directory
fn make_relative(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Handler for lexc command
fn lexc_handler(matches: &ArgMatches, output_mode: OutputMode) -> anyhow::Result<String> {
    let source = DictionarySource::parse(required_arg(matches, "uri")?);
    let unique_on = extract_unique_on(matches)?;
    let root = string_arg(matches, "root").unwrap_or(ROOT_LEXICON);

    let options = CountOptions::new().unique_on(unique_on).root(root);
    let text = fetch(&source)?;
    let count = count_lexc(&text, &options)?;

    if count.is_degraded() {
        let note = format!(
            "Note: {} row(s) in {} could not be parsed; the count may be low",
            count.diagnostics.len(),
            source
        );
        eprintln!("{}", Style::new().yellow().apply_to(note));
    }

    if output_mode.is_structured() {
        return render_structured(&count, output_mode);
    }

    let mut out = format!("Unique entries: {}\n", count.unique_entries);
    if matches.get_flag("by-lexicon") {
        out.push('\n');
        out.push_str(&render_table(&StemTable::from_lexc(&count), output_mode)?);
    }
    Ok(out)
}

/// Handler for dix command
fn dix_handler(matches: &ArgMatches, output_mode: OutputMode) -> anyhow::Result<String> {
    let source = DictionarySource::parse(required_arg(matches, "uri")?);
    let mode = if matches.get_flag("bidix") {
        DixMode::Bilingual
    } else if matches.get_flag("monodix") {
        DixMode::Monolingual
    } else {
        DixMode::Auto
    };

    let text = fetch(&source)?;
    let stats = count_dix(&text, mode)?;

    if output_mode.is_structured() {
        return render_structured(&stats, output_mode);
    }
    Ok(render_summary(&StemTable::from_dix(&stats)))
}

/// Handler for history command
fn history_handler(matches: &ArgMatches, output_mode: OutputMode) -> anyhow::Result<String> {
    let file = required_arg(matches, "file")?;
    let repo = string_arg(matches, "path").unwrap_or(".");
    let rev = string_arg(matches, "rev").unwrap_or("HEAD");

    let mut options = HistoryOptions::new()
        .rev(rev)
        .unique_on(extract_unique_on(matches)?);
    if matches.get_flag("bidix") {
        options = options.dix_mode(DixMode::Bilingual);
    }
    if let Some(limit) = matches.get_one::<usize>("limit") {
        options = options.limit(*limit);
    }

    let history = stem_history(repo, file, options)?;

    if output_mode.is_structured() {
        return render_structured(&history, output_mode);
    }
    render_table(&StemTable::from_history(&history), output_mode)
}

/// Handler for scan command
fn scan_handler(matches: &ArgMatches, output_mode: OutputMode) -> anyhow::Result<String> {
    let dir = Path::new(string_arg(matches, "dir").unwrap_or("."));

    let files = match string_arg(matches, "language") {
        Some(language) => vec![language_dictionary(dir, language)?],
        None => discover_dictionaries(dir, &build_filter(matches)?)?,
    };
    debug!("Found {} dictionaries under {}", files.len(), dir.display());

    let options = CountOptions::new();
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let source = DictionarySource::Path(path.clone());
        match count_source(&source, &options) {
            Ok(count) => results.push((make_relative(&path, dir), count)),
            Err(e) => warn!("Unable to count stems in {}: {}", path.display(), e),
        }
    }

    if output_mode.is_structured() {
        let entries: Vec<ScanEntry> = results
            .into_iter()
            .map(|(path, count)| ScanEntry { path, count })
            .collect();
        return render_structured(&entries, output_mode);
    }
    render_table(&StemTable::from_scan(&results), output_mode)
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();

    let Some((name, sub)) = matches.subcommand() else {
        return ExitCode::FAILURE;
    };

    init_tracing(sub.get_count("verbose"));
    let output_mode = output_mode_from_arg(string_arg(sub, "output"));

    let result = match name {
        "lexc" => lexc_handler(sub, output_mode),
        "dix" => dix_handler(sub, output_mode),
        "history" => history_handler(sub, output_mode),
        "scan" => scan_handler(sub, output_mode),
        other => Err(anyhow::anyhow!("unknown command '{}'", other)),
    };

    match result {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
