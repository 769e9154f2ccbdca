use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use partcat_api::{CatalogServer, CatalogService, ServiceConfig};
use partcat_common::{Part, PartId, PartPatch};
use partcat_kernel::{ConflictPolicy, VersionedStore};
use partcat_persist::{CatalogStore, open_catalog};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "partcat", version, about = "Versioned vehicle-parts catalog")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML service configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog directory; overrides the configuration file
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Conflict policy: merge, replace-chain or reject-duplicate
    #[arg(short, long, global = true)]
    policy: Option<ConflictPolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Listen address, e.g. 127.0.0.1:1710
        #[arg(long)]
        addr: Option<String>,
        /// Worker threads
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Create a part from a JSON payload (`@file` reads a file)
    Create { payload: String },
    /// Print the current version of a part
    Get { id: String },
    /// Print every live part
    List,
    /// Replace a part with a JSON payload as its next version
    Update { id: String, payload: String },
    /// Apply a sparse JSON field map as the next version
    Patch { id: String, payload: String },
    /// Delete a part and its whole history
    Delete { id: String },
    /// List version numbers and timestamps of a part
    Versions { id: String },
    /// Print one recorded version of a part
    Version { id: String, version: u32 },
    /// Search live parts by name substring
    Search { name: String },
    /// Print crate info and catalog counters
    Info,
    /// Check the integrity manifest of the catalog directory
    Verify,
    /// Write a snapshot so recovery skips the journal prefix
    Compact,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    run(cli, &mut stdout)
}

fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let mut config = resolve_config(&cli)?;

    match cli.command {
        Commands::Serve { addr, workers } => {
            if let Some(addr) = addr {
                config.listen_addr = addr;
            }
            if let Some(workers) = workers {
                config.workers = workers;
            }
            config.validate()?;
            let store = Arc::new(open_store(&config)?);
            let service = CatalogService::new(store, config.cors.clone());
            let server = CatalogServer::bind(&config, service)?;
            server.run()?;
        }
        Commands::Create { payload } => {
            let store = open_durable(&config)?;
            let part = Part::from_json(&read_payload(&payload)?)?;
            print_json(out, &store.create_part(part)?)?;
        }
        Commands::Get { id } => {
            let store = open_durable(&config)?;
            print_json(out, &store.get(&PartId::from(id))?)?;
        }
        Commands::List => {
            let store = open_durable(&config)?;
            print_json(out, &store.list_current())?;
        }
        Commands::Update { id, payload } => {
            let store = open_durable(&config)?;
            let part = Part::from_json(&read_payload(&payload)?)?;
            store.update(&PartId::from(id), part)?;
        }
        Commands::Patch { id, payload } => {
            let store = open_durable(&config)?;
            let patch = PartPatch::from_json(&read_payload(&payload)?)?;
            store.patch(&PartId::from(id), patch)?;
        }
        Commands::Delete { id } => {
            let store = open_durable(&config)?;
            store.delete(&PartId::from(id))?;
        }
        Commands::Versions { id } => {
            let store = open_durable(&config)?;
            print_json(out, &store.list_versions(&PartId::from(id))?)?;
        }
        Commands::Version { id, version } => {
            let store = open_durable(&config)?;
            print_json(out, &store.get_version(&PartId::from(id), version)?)?;
        }
        Commands::Search { name } => {
            let store = open_durable(&config)?;
            print_json(out, &store.search_by_name(&name))?;
        }
        Commands::Info => {
            writeln!(out, "partcat v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(out, "common: {}", partcat_common::crate_info())?;
            writeln!(out, "persist: {}", partcat_persist::crate_info())?;
            writeln!(out, "api: {}", partcat_api::crate_info())?;
            if config.data_dir.is_some() {
                writeln!(out, "{}", open_durable(&config)?.summary())?;
            }
        }
        Commands::Verify => {
            let store = CatalogStore::open(data_dir(&config)?)?;
            store.verify_integrity()?;
            let recovered = store.recover()?;
            writeln!(
                out,
                "Integrity: OK files={} snapshots={} segments={} replay_events={}",
                store.manifest().entries.len(),
                store.meta().snapshot_count,
                store.meta().event_segment_count,
                recovered.events.len()
            )?;
        }
        Commands::Compact => {
            let store = open_durable(&config)?;
            store.checkpoint()?;
            writeln!(out, "{}", store.summary())?;
        }
    }

    Ok(())
}

/// Configuration file (or defaults) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(policy) = cli.policy {
        config.policy = policy;
    }
    Ok(config)
}

fn open_store(config: &ServiceConfig) -> anyhow::Result<VersionedStore> {
    match &config.data_dir {
        Some(dir) => open_catalog(dir, config.policy)
            .with_context(|| format!("opening catalog at {}", dir.display())),
        None => {
            tracing::warn!("no data directory configured; catalog lives in memory only");
            Ok(VersionedStore::in_memory(config.policy))
        }
    }
}

/// Offline commands only make sense against a catalog directory.
fn open_durable(config: &ServiceConfig) -> anyhow::Result<VersionedStore> {
    data_dir(config)?;
    open_store(config)
}

fn data_dir(config: &ServiceConfig) -> anyhow::Result<&Path> {
    match config.data_dir.as_deref() {
        Some(dir) => Ok(dir),
        None => bail!("no catalog directory: pass --data-dir or set data_dir in the config file"),
    }
}

fn read_payload(arg: &str) -> anyhow::Result<Vec<u8>> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read(path).with_context(|| format!("reading payload {path}")),
        None => Ok(arg.as_bytes().to_vec()),
    }
}

fn print_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
