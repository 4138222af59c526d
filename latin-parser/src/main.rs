use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use latin_parser_lib::{lemmatize, lemmatize_sentence, Options, Registry};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "latin-parser", about = "Latin morphological analyser")]
struct Cli {
    /// Latin text to analyse. If omitted, reads from stdin.
    input: Option<String>,

    /// Directory with morphos.la, modeles.la, lemmes.la and the optional
    /// grammar files. Defaults to the built-in grammar.
    #[arg(long, env = "LATIN_PARSER_DATA")]
    data: Option<PathBuf>,

    /// Output tab-separated lines instead of JSON.
    #[arg(long)]
    tabular: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    /// Keep only analyses whose part of speech contains this tag.
    #[arg(long)]
    pos: Option<char>,

    /// Drop extension-lexicon analyses of a word that has core analyses.
    #[arg(long)]
    core_only: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let options = Options {
        core_only: cli.core_only,
    };
    let registry = match &cli.data {
        Some(dir) => match Registry::from_dir_with(dir, options) {
            Ok(registry) => registry,
            Err(err) => {
                eprintln!("latin-parser: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => Registry::with_options(options),
    };
    debug!(defects = registry.defects().len(), "grammar loaded");

    match cli.input {
        Some(ref text) => process_line(text, &registry, &cli),
        None => {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        eprintln!("latin-parser: cannot read stdin: {err}");
                        return ExitCode::FAILURE;
                    }
                };
                if !line.trim().is_empty() {
                    process_line(&line, &registry, &cli);
                }
            }
        }
    }
    ExitCode::SUCCESS
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

fn process_line(line: &str, registry: &Registry, cli: &Cli) {
    // Whitespace makes it a sentence; otherwise a single word.
    let has_spaces = line.trim().contains(char::is_whitespace);

    if has_spaces {
        let mut parse = lemmatize_sentence(line, registry);
        for wa in &mut parse.words {
            filter_pos(&mut wa.analyses, cli);
        }
        if cli.tabular {
            println!("{}", latin_parser_lib::output::sentence_to_tabular(&parse));
        } else {
            print_json(&parse, cli);
        }
    } else {
        let word = line
            .trim()
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'));
        let mut wa = lemmatize(word, registry);
        filter_pos(&mut wa.analyses, cli);
        if cli.tabular {
            println!("{}", latin_parser_lib::output::word_to_tabular(&wa));
        } else {
            print_json(&wa, cli);
        }
    }
}

fn filter_pos(analyses: &mut Vec<latin_parser_lib::Analysis>, cli: &Cli) {
    if let Some(tag) = cli.pos {
        analyses.retain(|a| a.pos.contains(tag));
    }
}

fn print_json<T: serde::Serialize>(value: &T, cli: &Cli) {
    let json = if cli.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    println!("{}", json.expect("JSON serialization failed"));
}
