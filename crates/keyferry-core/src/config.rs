use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration (loaded from keyferry.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyferryConfig {
    pub vault: VaultConfig,
    pub keys: KeysConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// S3-compatible endpoint per vault node; records replicate to all of them
    pub nodes: Vec<String>,
    /// S3 region (default: us-east-1)
    pub region: String,
    /// Bucket name, identical across nodes
    pub bucket: String,
    /// Enforce HTTPS for node connections (warn/error on HTTP endpoints)
    pub enforce_tls: bool,
    /// JSON schema document registered by --create-schema
    pub schema_file: PathBuf,
    /// Human-readable name attached to the registered schema
    pub schema_name: String,
    /// Schema id records are stored under (usually set via KEYFERRY_SCHEMA_ID)
    pub schema_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Default key directory for --store-keys / --retrieve-keys
    pub dir: PathBuf,
    /// Maximum chunk length in characters per record field
    pub chunk_window: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:8333".into()],
            region: "us-east-1".into(),
            bucket: "keyferry".into(),
            enforce_tls: false,
            schema_file: PathBuf::from("schema.json"),
            schema_name: "fhe-key-material".into(),
            schema_id: None,
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("keys"),
            chunk_window: 4096,
        }
    }
}
