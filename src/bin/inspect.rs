//! slotstore inspector
//!
//! Read-only command-line view of an existing store file.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use slotstore::RecordStore;
use tracing_subscriber::{fmt, EnvFilter};

/// slotstore inspector
#[derive(Parser, Debug)]
#[command(name = "slotstore-inspect")]
#[command(about = "Inspect a slotstore record file without modifying it")]
#[command(version)]
struct Args {
    /// Store file to inspect
    path: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print stride, file size and slot counts (default)
    Summary,

    /// List occupied slots with their values
    Slots,

    /// List empty slots
    Free,

    /// Print the record in one slot
    Get {
        /// 1-based slot index
        index: u32,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slotstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let store = match RecordStore::open_existing(&args.path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open {}: {}", args.path.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&store, args.command.unwrap_or(Commands::Summary)) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(store: &RecordStore, command: Commands) -> slotstore::Result<()> {
    match command {
        Commands::Summary => {
            let slot_count = store.slot_count()?;
            let empty = store.empty_slots()?.len();
            println!("path:       {}", store.path().display());
            println!("stride:     {} bytes", store.stride());
            println!("file size:  {} bytes", store.file_size()?);
            println!("slots:      {}", slot_count);
            println!("occupied:   {}", slot_count as usize - empty);
            println!("empty:      {}", empty);
        }
        Commands::Slots => {
            for (index, value) in store.scan()? {
                println!("{:>6}  {:<7} {}", index, format!("{:?}", value.tag()), value);
            }
        }
        Commands::Free => {
            for index in store.free_slots()? {
                println!("{}", index);
            }
        }
        Commands::Get { index } => match store.read_at(index)? {
            Some(value) => println!("{}", value),
            None => println!("(empty)"),
        },
    }
    Ok(())
}
