//! funnel-cli: inspect and edit a funnel store outside the browser.
//!
//! Uses the same store, processor, and snapshot format as the web app,
//! with a JSON file in place of `localStorage`. Handy for preparing
//! fixtures and checking funnel documents before uploading them.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin funnel-cli -- [--store <FILE>] [--key <NAME>] <COMMAND>
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `warn`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod file_storage;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use funnel_core::{
    Funnel, FunnelFile, FunnelStore, JsonFunnelProcessor, PersistOptions, ProcessorError,
};
use futures::executor::block_on;
use futures::future::join_all;
use tracing_subscriber::EnvFilter;

use crate::file_storage::FileStorage;

type CliStore = FunnelStore<FileStorage, JsonFunnelProcessor>;

/// Manage a file-backed funnel store.
#[derive(Parser)]
#[command(name = "funnel-cli", version)]
struct Cli {
    /// JSON file holding the storage slots (created on first write).
    #[arg(long, default_value = "funnel-sandbox.json")]
    store: PathBuf,

    /// Storage key of the funnel snapshot.
    #[arg(long, default_value = PersistOptions::DEFAULT_NAME)]
    key: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse funnel documents and add each under a new id.
    Import {
        /// Funnel JSON documents.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Add a complete funnel record, keeping the id it carries.
    Add {
        /// JSON file with a funnel record (content plus `id`).
        record: PathBuf,
    },

    /// List stored funnels in order.
    List {
        /// Print the full records as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Print one funnel as JSON.
    Show { id: String },

    /// Remove a funnel by id. Unknown ids are not an error.
    Remove { id: String },

    /// Delete the persisted snapshot.
    Clear,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = PersistOptions {
        name: cli.key.clone(),
        ..PersistOptions::default()
    };
    let store = FunnelStore::open(FileStorage::new(&cli.store), JsonFunnelProcessor, options);
    tracing::debug!(path = %cli.store.display(), key = %cli.key, count = store.len(), "opened store");

    match cli.command {
        Command::Import { files } => import(&store, &files),
        Command::Add { record } => add(&store, &record),
        Command::List { json } => list(&store, json),
        Command::Show { id } => show(&store, &id),
        Command::Remove { id } => {
            if !store.remove_funnel(&id) {
                eprintln!("No funnel with id {id}");
                return ExitCode::SUCCESS;
            }
            if !persisted(&store) {
                return ExitCode::FAILURE;
            }
            eprintln!("Removed {id}");
            ExitCode::SUCCESS
        }
        Command::Clear => match store.clear_storage() {
            Ok(()) => {
                eprintln!("Cleared {} in {}", cli.key, store.storage().path().display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error clearing storage: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Import all files concurrently; report each outcome.
fn import(store: &CliStore, paths: &[PathBuf]) -> ExitCode {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match read_file(path) {
            Ok(file) => files.push(file),
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    let outcomes: Vec<Result<String, ProcessorError>> =
        block_on(join_all(files.iter().map(|f| store.add_funnel_from_file(f))));

    let saved = persisted(store);
    let mut failed = !saved;
    for (file, outcome) in files.iter().zip(outcomes) {
        match outcome {
            Ok(id) if saved => println!("{id}\t{}", file.name),
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error importing {}: {e}", file.name);
                failed = true;
            }
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn add(store: &CliStore, path: &Path) -> ExitCode {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };
    match serde_json::from_slice::<Funnel>(&bytes) {
        Ok(funnel) => {
            let id = funnel.id.clone();
            store.add_funnel(funnel);
            if !persisted(store) {
                return ExitCode::FAILURE;
            }
            println!("{id}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Invalid funnel record in {}: {e}", path.display());
            ExitCode::FAILURE
        }
    }
}

fn list(store: &CliStore, json: bool) -> ExitCode {
    let funnels = store.funnels();
    if json {
        return print_json(&funnels);
    }
    for funnel in &funnels {
        let blocks: usize = funnel.content.pages.iter().map(|p| p.blocks.len()).sum();
        println!(
            "{}\t{}\t{} page(s), {blocks} block(s)",
            funnel.id,
            funnel.content.name,
            funnel.content.pages.len(),
        );
    }
    ExitCode::SUCCESS
}

fn show(store: &CliStore, id: &str) -> ExitCode {
    store.get(id).map_or_else(
        || {
            eprintln!("No funnel with id {id}");
            ExitCode::FAILURE
        },
        |funnel| print_json(&funnel),
    )
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Whether the latest write reached the store file; reports it if not.
///
/// A failed write leaves the change in memory only, which is lost when
/// the process exits.
fn persisted(store: &CliStore) -> bool {
    match store.last_persist_error() {
        None => true,
        Some(e) => {
            eprintln!("Error writing {}: {e}", store.storage().path().display());
            false
        }
    }
}

fn read_file(path: &Path) -> std::io::Result<FunnelFile> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(FunnelFile::new(name, bytes))
}
