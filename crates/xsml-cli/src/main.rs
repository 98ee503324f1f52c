use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xsml_services::{LanguageService, LineIndex, ParsedDocument, ServiceConfig, UriContext};
use xsml_vocabulary::DataVocabulary;

#[derive(Parser)]
#[command(name = "xsml")]
#[command(about = "XSML markup analysis: tokens, trees, completion and structural queries")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token stream
    Tokens {
        path: PathBuf,
        /// Start scanning at this byte offset
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Print the parse tree
    Tree { path: PathBuf },

    /// Report elements that were never closed; fails if there are any
    Check { path: PathBuf },

    /// Completion proposals at a byte offset
    Complete {
        path: PathBuf,
        #[arg(long)]
        offset: usize,
    },

    /// Folding ranges
    Fold { path: PathBuf },

    /// Selection ranges at one or more byte offsets
    Select {
        path: PathBuf,
        #[arg(long = "offset", required = true)]
        offsets: Vec<usize>,
    },

    /// Document symbols
    Symbols {
        path: PathBuf,
        /// List symbols in document order with their container
        #[arg(long)]
        flat: bool,
    },

    /// Links from reference-bearing attributes
    Links { path: PathBuf },

    /// What the vocabulary knows about the name at a byte offset
    Hover {
        path: PathBuf,
        #[arg(long)]
        offset: usize,
    },

    /// Matching tag and linked editing ranges at a byte offset
    Match {
        path: PathBuf,
        #[arg(long)]
        offset: usize,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "xsml=debug" } else { "xsml=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    let service = LanguageService::from_config(config).context("building vocabulary")?;

    match cli.command {
        Command::Tokens { path, offset } => {
            let source = read_source(&path)?;
            let tokens: Vec<_> = service.scan(&source, offset).collect();
            print_json(&tokens)?;
        }
        Command::Tree { path } => {
            let parsed = parse(&service, &path)?;
            print_json(parsed.document())?;
        }
        Command::Check { path } => return cmd_check(&service, &path),
        Command::Complete { path, offset } => {
            let parsed = parse(&service, &path)?;
            print_json(&service.complete(&parsed, offset))?;
        }
        Command::Fold { path } => {
            let parsed = parse(&service, &path)?;
            print_json(&service.folding_ranges(&parsed))?;
        }
        Command::Select { path, offsets } => {
            let parsed = parse(&service, &path)?;
            print_json(&service.selection_ranges(&parsed, &offsets))?;
        }
        Command::Symbols { path, flat } => {
            let parsed = parse(&service, &path)?;
            if flat {
                print_json(&service.flat_symbols(&parsed))?;
            } else {
                print_json(&service.document_symbols(&parsed))?;
            }
        }
        Command::Links { path } => {
            let parsed = parse(&service, &path)?;
            let context = UriContext::new(file_uri(&path)?);
            print_json(&service.document_links(&parsed, &context))?;
        }
        Command::Hover { path, offset } => {
            let parsed = parse(&service, &path)?;
            print_json(&service.hover(&parsed, offset))?;
        }
        Command::Match { path, offset } => {
            let parsed = parse(&service, &path)?;
            #[derive(Serialize)]
            struct MatchOutput {
                matching: Option<xsml_parser::MatchingTag>,
                linked_editing: Option<[xsml_lexer::Span; 2]>,
            }
            print_json(&MatchOutput {
                matching: service.matching_tag_range(&parsed, offset),
                linked_editing: service.linked_editing_ranges(&parsed, offset),
            })?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn parse(service: &LanguageService<DataVocabulary>, path: &Path) -> Result<ParsedDocument> {
    let parsed = service.parse(&read_source(path)?);
    tracing::debug!(
        path = %path.display(),
        nodes = parsed.document().node_count(),
        "parsed"
    );
    Ok(parsed)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn file_uri(path: &Path) -> Result<String> {
    let absolute = std::fs::canonicalize(path)
        .with_context(|| format!("resolving {}", path.display()))?;
    let path = absolute.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        Ok(format!("file://{path}"))
    } else {
        Ok(format!("file:///{path}"))
    }
}

fn cmd_check(service: &LanguageService<DataVocabulary>, path: &Path) -> Result<ExitCode> {
    let parsed = parse(service, path)?;
    let lines = LineIndex::new(parsed.text());
    let document = parsed.document();

    let mut unclosed = 0;
    for id in document.unclosed() {
        let node = document.node(id);
        let line = lines.line_of(node.start);
        let column = node.start - lines.line_start(line).unwrap_or(0);
        eprintln!(
            "{}:{}:{}: <{}> is never closed",
            path.display(),
            line + 1,
            column + 1,
            node.tag.as_deref().unwrap_or("")
        );
        unclosed += 1;
    }

    if unclosed > 0 {
        eprintln!("{unclosed} unclosed element(s) in {}", path.display());
        return Ok(ExitCode::FAILURE);
    }
    eprintln!("OK: {}", path.display());
    Ok(ExitCode::SUCCESS)
}
