//! Tally CLI - named counters that persist between runs.
//!
//! Each invocation dispatches one intent into the counter store: add,
//! increment, decrement, reset, rename, remove, clear, list, or a settings
//! change. State lives as plain files under the data directory, so the
//! list survives across runs exactly as the store left it.

mod config;
mod output;
mod storage;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::storage::FileStorage;
use tally_engine::{CounterStore, DecrementOutcome, SortMode};

#[derive(Parser)]
#[command(name = "tally")]
#[command(version)]
#[command(about = "Named counters that persist between runs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a counter (auto-named "Counter N" when no name is given)
    Add {
        name: Option<String>,
    },
    /// Increment a counter by one
    #[command(alias = "inc")]
    Increment {
        id: String,
    },
    /// Decrement a counter by one
    #[command(alias = "dec")]
    Decrement {
        id: String,
    },
    /// Reset a counter to zero
    Reset {
        id: String,
    },
    /// Rename a counter
    Rename {
        id: String,
        name: String,
    },
    /// Delete a counter
    #[command(alias = "rm")]
    Remove {
        id: String,
    },
    /// Delete every counter
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show counters
    #[command(alias = "ls")]
    List {
        /// Only show counters whose name contains TERM
        #[arg(long, value_name = "TERM")]
        filter: Option<String>,
        /// Switch to (and persist) a sort mode: name-asc, name-desc,
        /// count-asc, count-desc, created-asc, created-desc
        #[arg(long, value_name = "MODE")]
        sort: Option<SortMode>,
    },
    /// Allow or forbid negative counts (forbidding clamps them to zero)
    AllowNegatives {
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| EnvFilter::new("tally=warn,tally_engine=warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!(data_dir = %config.data_dir.display(), "using data directory");
    let mut store = CounterStore::open(FileStorage::new(config.data_dir));

    match cli.command {
        Command::Add { name } => {
            let counter = store.add(name.as_deref().unwrap_or(""));
            println!("Added \"{}\" ({})", counter.name, counter.id);
        }
        Command::Increment { id } => match store.increment(&id) {
            Some(count) => report_count(&store, &id, count),
            None => missing(&id),
        },
        Command::Decrement { id } => match store.decrement(&id) {
            DecrementOutcome::Applied(count) => report_count(&store, &id, count),
            DecrementOutcome::RejectedAtFloor => {
                let name = store.get(&id).map(|c| c.name.clone()).unwrap_or_default();
                println!("\"{name}\" is already at zero (negatives are off)");
            }
            DecrementOutcome::Missing => missing(&id),
        },
        Command::Reset { id } => {
            if store.reset(&id) {
                report_count(&store, &id, 0);
            } else {
                missing(&id);
            }
        }
        Command::Rename { id, name } => {
            if store.rename(&id, &name) {
                println!("Renamed to \"{}\"", store.get(&id).map(|c| c.name.as_str()).unwrap_or(""));
            } else {
                missing(&id);
            }
        }
        Command::Remove { id } => {
            let name = store.get(&id).map(|c| c.name.clone());
            if store.remove(&id) {
                println!("Removed \"{}\"", name.unwrap_or_default());
            } else {
                missing(&id);
            }
        }
        Command::Clear { yes } => {
            if store.is_empty() {
                println!("Nothing to clear.");
            } else if yes || confirm_clear(store.len())? {
                let removed = store.len();
                store.clear();
                println!("Cleared {removed} counters.");
            } else {
                println!("Aborted.");
            }
        }
        Command::List { filter, sort } => {
            if let Some(mode) = sort {
                store.set_sort_mode(mode);
            }
            let visible = store.visible(filter.as_deref().unwrap_or(""));
            print!(
                "{}",
                output::render_list(&visible, store.len(), store.total())
            );
        }
        Command::AllowNegatives { value } => {
            store.set_allow_negatives(value);
            println!(
                "Negative counts {}",
                if value { "enabled" } else { "disabled" }
            );
        }
    }

    if store.persistence_degraded() {
        eprintln!("warning: changes could not be saved to disk");
    }

    Ok(())
}

fn report_count(store: &CounterStore<FileStorage>, id: &str, count: i64) {
    let name = store.get(id).map(|c| c.name.as_str()).unwrap_or(id);
    println!("\"{name}\" = {count}");
}

fn missing(id: &str) {
    // Unknown ids are a no-op, not an error
    eprintln!("No counter with id {id}");
}

/// Destructive: ask before letting the store clear everything.
fn confirm_clear(count: usize) -> Result<bool> {
    print!("Clear ALL {count} counters? This deletes every counter and its count. [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
