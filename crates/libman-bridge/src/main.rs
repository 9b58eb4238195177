//! Libman Bridge - JSON-RPC host for the library manager.
//!
//! The IDE front end talks to this process over HTTP: it dispatches library
//! actions, reads store slots and drains UI events. The bridge in turn calls
//! the backend CLI server through `core.call`.

mod handlers;
mod server;

use anyhow::{Context, Result};
use clap::Parser;
use libman_core::{
    LibraryManager, LibraryStorage, SqliteStateStore, StaticStorages, UiEventLog,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "libman-bridge")]
#[command(about = "JSON-RPC host for the library manager")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// JSON-RPC endpoint of the backend CLI server
    #[arg(long, default_value = "http://127.0.0.1:8008/jsonrpc")]
    backend_url: String,

    /// Identity of the global library storage
    #[arg(long, default_value = "/global")]
    global_storage: String,

    /// Project library storage folder (repeatable)
    #[arg(long = "project-storage")]
    project_storages: Vec<PathBuf>,

    /// SQLite file for persisted UI state (defaults to the user data dir)
    #[arg(long)]
    state_db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting Libman Bridge");

    let state_store = match &args.state_db {
        Some(path) => SqliteStateStore::open_at(path),
        None => SqliteStateStore::open(),
    }
    .context("Failed to open UI state database")?;

    let mut storages = vec![LibraryStorage::global(args.global_storage.clone())];
    storages.extend(args.project_storages.iter().cloned().map(LibraryStorage::project));
    info!("Library storages: {}", storages.len());
    let storages = Arc::new(StaticStorages::new(storages));

    let rpc = Arc::new(libman_core::HttpRpcClient::new(&args.backend_url)?);
    info!("Backend endpoint: {}", rpc.endpoint());

    let ui = Arc::new(UiEventLog::new());
    let manager = LibraryManager::builder(rpc)
        .with_ui(ui.clone())
        .with_state_store(Arc::new(state_store))
        .with_storages(storages.clone())
        .build();

    // Start the server
    let addr = server::start_server(manager, ui, storages, &args.host, args.port).await?;

    // Print port for the front end to read (intentional stdout for IPC)
    println!("RPC_PORT={}", addr.port());

    info!("RPC server running on {}", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
