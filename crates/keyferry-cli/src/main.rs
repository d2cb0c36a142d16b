//! keyferry: ferry FHE key material between local files and vault nodes
//!
//! Actions (mutually exclusive, exactly one required):
//!   --create-schema          register the record schema, print the new schema id
//!   --store-keys [DIR]       chunk and upload key files, print created record ids
//!   --retrieve-keys [DIR]    download records by id and reassemble key files
//!   --generate-keys [DIR]    generate a TFHE-rs key pair (feature: tfhe-keygen)
//!
//! The scheme (bgv / tfhe / seal) is selected by a substring of the key
//! directory path; record ids printed by --store-keys are the retrieval
//! handle and must be passed back to --record-ids in the same order.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use keyferry_core::config::KeyferryConfig;
use keyferry_core::types::KeyScheme;
use keyferry_vault::VaultClient;

#[cfg(feature = "tfhe-keygen")]
mod keygen;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "keyferry",
    version,
    about = "Split FHE key material into records and ferry it to vault nodes",
    group = ArgGroup::new("action").required(true).multiple(false)
)]
struct Cli {
    /// Path to keyferry.toml configuration file
    #[arg(long, short = 'c', env = "KEYFERRY_CONFIG", default_value = "keyferry.toml")]
    config: PathBuf,

    /// Register the record schema with the vault and print the new schema id
    #[arg(long, group = "action")]
    create_schema: bool,

    /// Chunk the key files in DIR (default: config keys.dir) and upload them
    /// as records
    #[arg(long, group = "action", value_name = "DIR")]
    store_keys: Option<Option<PathBuf>>,

    /// Download records and write the reassembled key files into DIR
    /// (default: config keys.dir)
    #[arg(long, group = "action", value_name = "DIR", requires = "record_ids")]
    retrieve_keys: Option<Option<PathBuf>>,

    /// Generate a fresh TFHE-rs key pair in DIR (default: config keys.dir)
    #[cfg(feature = "tfhe-keygen")]
    #[arg(long, group = "action", value_name = "DIR")]
    generate_keys: Option<Option<PathBuf>>,

    /// Record ids to retrieve, in the order --store-keys printed them
    #[arg(
        long,
        value_name = "ID",
        num_args = 1..,
        value_delimiter = ',',
        env = "KEYFERRY_RECORD_IDS",
        requires = "retrieve_keys",
        conflicts_with_all = ["create_schema", "store_keys"]
    )]
    record_ids: Vec<String>,

    /// Schema id records are stored under
    #[arg(long, env = "KEYFERRY_SCHEMA_ID")]
    schema_id: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "KEYFERRY_LOG", default_value = "warn")]
    log: String,

    /// Log format (json, text)
    #[arg(long, env = "KEYFERRY_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log, &cli.log_format);

    let config = load_config(&cli.config).await?;

    #[cfg(feature = "tfhe-keygen")]
    if let Some(dir) = &cli.generate_keys {
        let dir = dir.clone().unwrap_or_else(|| config.keys.dir.clone());
        return keygen::cmd_generate_keys(&dir);
    }

    if cli.create_schema {
        let client = connect_vault(&config, None)?;
        cmd_create_schema(&client, &config).await
    } else if let Some(dir) = &cli.store_keys {
        let dir = dir.clone().unwrap_or_else(|| config.keys.dir.clone());
        let client = connect_vault(&config, cli.schema_id.as_deref())?;
        cmd_store_keys(&client, &config, &dir).await
    } else if let Some(dir) = &cli.retrieve_keys {
        let dir = dir.clone().unwrap_or_else(|| config.keys.dir.clone());
        let client = connect_vault(&config, cli.schema_id.as_deref())?;
        cmd_retrieve_keys(&client, &cli.record_ids, &dir).await
    } else {
        unreachable!("clap enforces a required action group")
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

async fn load_config(path: &Path) -> Result<KeyferryConfig> {
    if path.exists() {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("parsing config: {}", path.display()))
    } else {
        tracing::warn!(
            "config file not found: {}  (using defaults)",
            path.display()
        );
        Ok(KeyferryConfig::default())
    }
}

// ── Vault client from environment credentials ─────────────────────────────────

/// Resolve node credentials from environment variables.
///
/// Reads AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY (standard S3 env vars),
/// with KEYFERRY_-prefixed fallbacks.
fn load_credentials() -> Result<(String, String)> {
    let access_key = std::env::var("AWS_ACCESS_KEY_ID")
        .or_else(|_| std::env::var("KEYFERRY_ACCESS_KEY_ID"))
        .context(
            "vault credentials not set\n\
             Set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY environment variables.\n\
             Example:\n\
             \texport AWS_ACCESS_KEY_ID=your-key\n\
             \texport AWS_SECRET_ACCESS_KEY=your-secret"
        )?;
    let secret_key = std::env::var("AWS_SECRET_ACCESS_KEY")
        .or_else(|_| std::env::var("KEYFERRY_SECRET_ACCESS_KEY"))
        .context("AWS_SECRET_ACCESS_KEY environment variable not set")?;
    Ok((access_key, secret_key))
}

fn connect_vault(config: &KeyferryConfig, schema_override: Option<&str>) -> Result<VaultClient> {
    let (access_key, secret_key) = load_credentials()?;

    let mut vault_cfg = config.vault.clone();
    if let Some(id) = schema_override {
        vault_cfg.schema_id = Some(id.to_string());
    }

    VaultClient::connect(&vault_cfg, &access_key, &secret_key)
        .context("building vault client")
}

// ── Progress helper ───────────────────────────────────────────────────────────

fn make_spinner(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{prefix:.bold} {spinner} {msg}")
            .unwrap()
    );
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ── `keyferry --create-schema` ────────────────────────────────────────────────

async fn cmd_create_schema(client: &VaultClient, config: &KeyferryConfig) -> Result<()> {
    let schema_path = &config.vault.schema_file;
    let content = tokio::fs::read_to_string(schema_path)
        .await
        .with_context(|| format!("reading schema: {}", schema_path.display()))?;
    let schema: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing schema: {}", schema_path.display()))?;

    let pb = make_spinner("schema");
    pb.set_message(format!("registering on {} nodes...", client.node_count()));

    client.init().await?;
    let schema_id = client
        .create_schema(&schema, &config.vault.schema_name)
        .await?;

    pb.finish_and_clear();
    println!("New schema: {schema_id}");
    println!("Store it in the environment as KEYFERRY_SCHEMA_ID for --store-keys.");
    Ok(())
}

// ── `keyferry --store-keys` ───────────────────────────────────────────────────

async fn cmd_store_keys(
    client: &VaultClient,
    config: &KeyferryConfig,
    dir: &Path,
) -> Result<()> {
    let scheme = KeyScheme::detect(dir);
    println!(
        "Storing {} keys from {} ({} nodes)",
        scheme.prefix(),
        dir.display(),
        client.node_count(),
    );

    let pb = make_spinner("store");
    pb.set_message("uploading records...");

    client.init().await?;
    let outcome = keyferry_engine::store_keys(client, dir, config.keys.chunk_window)
        .await
        .with_context(|| format!("storing keys from {}", dir.display()))?;

    pb.finish_and_clear();
    println!("Created ids:");
    for id in &outcome.record_ids {
        println!("{id}");
    }
    println!();
    println!("  records: {}", outcome.record_ids.len());
    println!("  bytes:   {}", fmt_bytes(outcome.bytes));
    Ok(())
}

// ── `keyferry --retrieve-keys` ────────────────────────────────────────────────

async fn cmd_retrieve_keys(client: &VaultClient, ids: &[String], dir: &Path) -> Result<()> {
    println!("Retrieving {} records into {}", ids.len(), dir.display());

    let pb = make_spinner("retrieve");
    pb.set_message("downloading records...");

    client.init().await?;
    let outcome = keyferry_engine::retrieve_keys(client, ids, dir)
        .await
        .with_context(|| format!("retrieving keys into {}", dir.display()))?;

    pb.finish_and_clear();
    println!("Retrieved:");
    for file in &outcome.files {
        println!("  {}", file.display());
    }
    println!();
    println!("  records: {}", outcome.records);
    println!("  bytes:   {}", fmt_bytes(outcome.bytes));
    Ok(())
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
        }
    }
}

// ── Utilities ─────────────────────────────────────────────────────────────────

fn fmt_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
