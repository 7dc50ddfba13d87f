//! Flash CLI
//!
//! Command-line flashcard reviewer: manage decks, import card lists, and run
//! spaced repetition sessions. Decks live in a SQLite database in the
//! platform data directory unless `--data-dir` (or `FLASH_DATA_DIR`) says
//! otherwise.

mod import;
mod review;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use flash_core::{CardId, Deck, DeckSnapshot, DeckStore, Pool, SqliteStore, StorageError};
use tracing_subscriber::EnvFilter;

/// Flash - spaced repetition flashcards
#[derive(Parser)]
#[command(name = "flash")]
#[command(author = "Flash Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Spaced repetition flashcards in the terminal")]
struct Cli {
    /// Directory holding the deck database
    #[arg(long, global = true, env = "FLASH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List decks with their card and due counts
    Decks,

    /// Create an empty deck
    Create {
        name: String,
    },

    /// Rename a deck
    Rename {
        old: String,
        new: String,
    },

    /// Delete a deck and all its cards
    Delete {
        name: String,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Add a card to a deck
    Add {
        deck: String,
        front: String,
        back: String,
        /// Also add the reverse card (back -> front)
        #[arg(long)]
        two_sided: bool,
    },

    /// Import cards from a tab-separated file (front<TAB>back per line)
    Import {
        deck: String,
        file: PathBuf,
        /// Also add the reverse of every card
        #[arg(long)]
        two_sided: bool,
    },

    /// List the cards of a deck by pool
    Cards {
        deck: String,
    },

    /// Change the labels of a card
    Edit {
        deck: String,
        /// Card id or a unique prefix of it
        card: String,
        front: String,
        back: String,
    },

    /// Remove a card from a deck
    Remove {
        deck: String,
        /// Card id or a unique prefix of it
        card: String,
    },

    /// Review a deck interactively
    Review {
        deck: String,
        /// Only review this pool (new, due, failed)
        #[arg(long)]
        pool: Option<Pool>,
    },

    /// Write a deck to a JSON file
    Export {
        deck: String,
        output: PathBuf,
    },

    /// Load a deck from a JSON export
    Restore {
        file: PathBuf,
        /// Store under this name instead of the exported one
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with review output
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, rust_log.as_deref()))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    let store = open_store(cli.data_dir.as_deref())?;

    match cli.command {
        Commands::Decks => run_decks(&store),
        Commands::Create { name } => run_create(&store, &name),
        Commands::Rename { old, new } => run_rename(&store, &old, &new),
        Commands::Delete { name, yes } => run_delete(&store, &name, yes),
        Commands::Add {
            deck,
            front,
            back,
            two_sided,
        } => run_add(&store, &deck, &front, &back, two_sided),
        Commands::Import {
            deck,
            file,
            two_sided,
        } => run_import(&store, &deck, &file, two_sided),
        Commands::Cards { deck } => run_cards(&store, &deck),
        Commands::Edit {
            deck,
            card,
            front,
            back,
        } => run_edit(&store, &deck, &card, &front, &back),
        Commands::Remove { deck, card } => run_remove(&store, &deck, &card),
        Commands::Review { deck, pool } => run_review(&store, &deck, pool),
        Commands::Export { deck, output } => run_export(&store, &deck, &output),
        Commands::Restore { file, name } => run_restore(&store, &file, name),
    }
}

fn open_store(data_dir: Option<&Path>) -> anyhow::Result<SqliteStore> {
    let store = match data_dir {
        Some(dir) => SqliteStore::in_dir(dir)?,
        None => SqliteStore::new(None)?,
    };
    Ok(store)
}

fn run_decks(store: &dyn DeckStore) -> anyhow::Result<()> {
    let summaries = store.summaries(Utc::now())?;

    println!("{}", "=== Decks ===".cyan().bold());
    if summaries.is_empty() {
        println!("{}", "No decks yet. Create one with `flash create <name>`.".dimmed());
        return Ok(());
    }

    println!(
        "{:<24} {:>6} {:>6} {:>6} {:>7}  {}",
        "Name".white().bold(),
        "Total",
        "Due",
        "New",
        "Failed",
        "Next due"
    );
    for summary in summaries {
        let due = if summary.due > 0 {
            summary.due.to_string().yellow().bold()
        } else {
            summary.due.to_string().normal()
        };
        let next_due = summary
            .next_due
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:>6} {:>6} {:>6} {:>7}  {}",
            truncate(&summary.name, 24),
            summary.total,
            due,
            summary.new,
            summary.failed,
            next_due.dimmed()
        );
    }
    Ok(())
}

fn run_create(store: &dyn DeckStore, name: &str) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Deck name cannot be empty");
    }
    store.create(name)?;
    println!("{} {}", "Created deck".green(), name.bold());
    Ok(())
}

fn run_rename(store: &dyn DeckStore, old: &str, new: &str) -> anyhow::Result<()> {
    if new.trim().is_empty() {
        anyhow::bail!("Deck name cannot be empty");
    }
    store.rename(old, new)?;
    println!("{} {} -> {}", "Renamed".green(), old, new.bold());
    Ok(())
}

fn run_delete(store: &dyn DeckStore, name: &str, yes: bool) -> anyhow::Result<()> {
    let deck = store.load(name)?;

    if !yes {
        print!(
            "{} Delete deck '{}' with {} cards? This cannot be undone. [y/N] ",
            "WARNING:".red().bold(),
            name,
            deck.check_total_size()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input != "y" && input != "yes" {
            println!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    store.delete(name)?;
    println!("{} {}", "Deleted deck".green(), name);
    Ok(())
}

fn run_add(
    store: &dyn DeckStore,
    name: &str,
    front: &str,
    back: &str,
    two_sided: bool,
) -> anyhow::Result<()> {
    let mut deck = store.load(name)?;
    if two_sided {
        let (card, reverse) = deck.add_two_sided(front, back)?;
        store.save(name, &deck)?;
        println!("{} {} and {}", "Added".green(), short_id(card), short_id(reverse));
    } else {
        let card = deck.add_card(front, back)?;
        store.save(name, &deck)?;
        println!("{} {}", "Added".green(), short_id(card));
    }
    Ok(())
}

fn run_import(store: &dyn DeckStore, name: &str, file: &Path, two_sided: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)?;
    let parsed = import::parse_pairs(&text);
    for line in &parsed.malformed {
        eprintln!("  {} line {} has no tab, skipped", "WARN".yellow(), line);
    }

    let mut deck = store.load(name)?;
    let added = deck.import_pairs(parsed.pairs.iter().map(|(f, b)| (f.as_str(), b.as_str())), two_sided);
    store.save(name, &deck)?;

    println!(
        "{}",
        format!(
            "Imported {} cards into {} ({} total)",
            added,
            name,
            deck.check_total_size()
        )
        .green()
        .bold()
    );
    Ok(())
}

fn run_cards(store: &dyn DeckStore, name: &str) -> anyhow::Result<()> {
    let deck = store.load(name)?;

    println!("{}", format!("=== {} ===", name).cyan().bold());
    for pool in Pool::ALL {
        let count = deck.pool_len(pool);
        if count == 0 {
            continue;
        }
        println!();
        println!("{}", format!("{} ({})", pool, count).yellow().bold());
        for (card_pool, card) in deck.cards() {
            if card_pool != pool {
                continue;
            }
            let due = deck
                .due_at(card.id)
                .map(|at| format!(" due {}", at.format("%Y-%m-%d %H:%M")))
                .unwrap_or_default();
            println!(
                "  {} {} -> {} {}",
                short_id(card.id).dimmed(),
                truncate(&card.front, 30),
                truncate(&card.back, 30),
                format!(
                    "[rep={}, ef={:.2}, ivl={:.1}d{}]",
                    card.repetition, card.easiness, card.interval, due
                )
                .dimmed()
            );
        }
    }
    Ok(())
}

fn run_edit(
    store: &dyn DeckStore,
    name: &str,
    card: &str,
    front: &str,
    back: &str,
) -> anyhow::Result<()> {
    let mut deck = store.load(name)?;
    let id = resolve_card(&deck, card)?;
    deck.edit_card(id, front, back)?;
    store.save(name, &deck)?;
    println!("{} {}", "Updated".green(), short_id(id));
    Ok(())
}

fn run_remove(store: &dyn DeckStore, name: &str, card: &str) -> anyhow::Result<()> {
    let mut deck = store.load(name)?;
    let id = resolve_card(&deck, card)?;
    let removed = deck.delete_card(id)?;
    store.save(name, &deck)?;
    println!(
        "{} {} ({} -> {})",
        "Removed".green(),
        short_id(id),
        removed.front,
        removed.back
    );
    Ok(())
}

fn run_review(store: &dyn DeckStore, name: &str, pool: Option<Pool>) -> anyhow::Result<()> {
    let pools = match pool {
        Some(Pool::Scheduled) => {
            anyhow::bail!("The scheduled pool is not reviewable; use new, due or failed")
        }
        Some(pool) => vec![pool],
        None => review::DEFAULT_ORDER.to_vec(),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    review::run_session(store, name, &pools, &mut input, &mut output, &Utc::now)?;
    Ok(())
}

fn run_export(store: &dyn DeckStore, name: &str, output: &Path) -> anyhow::Result<()> {
    let snapshot = store.load(name)?.snapshot();

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, serde_json::to_string_pretty(&snapshot)?)?;

    println!(
        "{} {} cards from {} to {}",
        "Exported".green(),
        snapshot.total(),
        name,
        output.display()
    );
    Ok(())
}

fn run_restore(store: &dyn DeckStore, file: &Path, name: Option<String>) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)?;
    let snapshot: DeckSnapshot = serde_json::from_str(&text)?;
    let name = name.unwrap_or_else(|| snapshot.name.clone());

    if store.exists(&name)? {
        return Err(StorageError::DeckExists(name).into());
    }

    let mut deck = Deck::try_from(snapshot)?;
    deck.rename(name.as_str());
    store.save(&name, &deck)?;

    println!(
        "{} {} with {} cards",
        "Restored".green(),
        name.bold(),
        deck.check_total_size()
    );
    Ok(())
}

/// Find a card by full id or unique id prefix
fn resolve_card(deck: &Deck, query: &str) -> anyhow::Result<CardId> {
    if let Ok(id) = query.parse::<CardId>() {
        if deck.card(id).is_some() {
            return Ok(id);
        }
        anyhow::bail!("No card {} in deck {}", id, deck.name());
    }

    let query = query.trim().to_lowercase();
    if query.is_empty() {
        anyhow::bail!("Card id cannot be empty");
    }
    let matches: Vec<CardId> = deck
        .cards()
        .map(|(_, card)| card.id)
        .filter(|id| id.to_string().starts_with(&query))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => anyhow::bail!("No card matching '{}' in deck {}", query, deck.name()),
        _ => anyhow::bail!("'{}' matches {} cards; use a longer prefix", query, matches.len()),
    }
}

/// `RUST_LOG` directives when set and valid, otherwise warn (info with -v)
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let fallback = if verbose { "info" } else { "warn" };
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

fn short_id(id: CardId) -> String {
    id.to_string()[..8].to_string()
}

/// Truncate a string for display (UTF-8 safe)
fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_chars {
        s
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
