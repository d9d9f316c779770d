//! thymesia: inspect a tagged contact book from the command line.
//!
//! Usage:
//!   thymesia --book contacts.json search "hair:brown"
//!   thymesia --book contacts.json suggest --entry School:Berkeley
//!   thymesia --book contacts.json guess-key berk
//!   thymesia --book contacts.json filters berkeley
//!   thymesia --book contacts.json stats
//!   thymesia --book contacts.json save-model model.bincode

mod book_file;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thymesia_core::{Config, ContactBook, Entry};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "thymesia")]
#[command(about = "Search, suggest and filter a tagged contact book")]
struct Args {
    /// Contact book (JSON array of contacts, each an array of {key, value})
    #[arg(short, long)]
    book: PathBuf,

    /// Optional TOML config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print contacts matching every token of the query
    Search { query: String },
    /// Rank attributes to add to a draft contact
    Suggest {
        /// Entries already on the draft, as key:value
        #[arg(short, long)]
        entry: Vec<String>,
    },
    /// Guess the key for a typed value
    GuessKey { value: String },
    /// Rank quick filters over the contacts matching a query
    Filters {
        #[arg(default_value = "")]
        query: String,
    },
    /// Print model statistics
    Stats,
    /// Write the co-occurrence model as bincode
    SaveModel { out: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    let contacts = book_file::load_book(&args.book)?;
    info!(contacts = contacts.len(), "loaded book");
    let book = ContactBook::from_contacts(contacts, config)?;

    match args.command {
        Command::Search { query } => {
            let hits = book.search(&query);
            for id in &hits {
                if let Some(contact) = book.contact(*id) {
                    println!("{}  {}", id, render(contact));
                }
            }
            println!("({} of {} contacts)", hits.len(), book.len());
        }
        Command::Suggest { entry } => {
            let existing: Vec<Entry> = entry.iter().map(|s| Entry::parse(s)).collect();
            let engine = thymesia_core::SuggestionEngine::new(book.model());
            let scored = engine.scored_suggestions(&existing);
            let shown = book.suggestions(&existing);
            for s in scored.iter().filter(|s| shown.contains(&s.entry)) {
                println!("{:.3}  {}", s.score, s.entry);
            }
        }
        Command::GuessKey { value } => {
            println!("{}", book.suggest_key(&value));
        }
        Command::Filters { query } => {
            for entry in book.filter_entries(&query) {
                println!("{}", entry);
            }
        }
        Command::Stats => {
            let stats = book.model().stats();
            println!("contacts:     {}", book.len());
            println!("entries:      {}", stats.entries);
            println!("pairs:        {}", stats.pairs);
            println!("observations: {}", stats.observations);
        }
        Command::SaveModel { out } => {
            book.save_model(&out)
                .with_context(|| format!("writing model {}", out.display()))?;
            println!("Wrote {}", out.display());
        }
    }

    Ok(())
}

fn render(contact: &[Entry]) -> String {
    contact
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
