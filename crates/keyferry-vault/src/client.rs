//! Vault client: schema registration and record storage across nodes
//!
//! Write path replicates every record to every node; read path returns the
//! first copy found, scanning nodes in configuration order. Ids are minted
//! here (UUID v4) and returned to the caller in record order. The caller's
//! id list is the only sequencing the vault keeps.

use anyhow::{Context, Result};
use keyferry_core::config::VaultConfig;
use keyferry_core::types::{Record, RecordFilter, RecordId};
use opendal::Operator;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A single vault node: display name (endpoint) plus its operator
pub struct VaultNode {
    pub name: String,
    pub op: Operator,
}

/// Client over the configured node set
pub struct VaultClient {
    nodes: Vec<VaultNode>,
    schema_id: Option<String>,
}

impl VaultClient {
    pub fn new(nodes: Vec<VaultNode>) -> Self {
        Self {
            nodes,
            schema_id: None,
        }
    }

    pub fn with_schema_id(mut self, schema_id: impl Into<String>) -> Self {
        self.schema_id = Some(schema_id.into());
        self
    }

    /// Build a client from config + credentials (one operator per node)
    pub fn connect(
        vault: &VaultConfig,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> Result<Self> {
        let nodes = crate::operator::build_node_operators(vault, access_key_id, secret_access_key)?
            .into_iter()
            .map(|(name, op)| VaultNode { name, op })
            .collect();
        Ok(Self {
            nodes,
            schema_id: vault.schema_id.clone(),
        })
    }

    pub fn schema_id(&self) -> Option<&str> {
        self.schema_id.as_deref()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Health-check every node; any unreachable node is an error
    pub async fn init(&self) -> Result<()> {
        for node in &self.nodes {
            crate::health::check_health(&node.op)
                .await
                .with_context(|| format!("vault node unreachable: {}", node.name))?;
        }
        info!(nodes = self.nodes.len(), "vault nodes reachable");
        Ok(())
    }

    /// Register a schema document on every node, returning the new schema id
    pub async fn create_schema(&self, schema: &serde_json::Value, name: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let doc = serde_json::json!({ "name": name, "schema": schema });
        let bytes = serde_json::to_vec(&doc).context("serializing schema document")?;

        let key = schema_key(&id);
        for node in &self.nodes {
            node.op
                .write(&key, bytes.clone())
                .await
                .with_context(|| format!("writing schema to node {}", node.name))?;
        }

        info!(schema = %id, name = %name, nodes = self.nodes.len(), "schema registered");
        Ok(id)
    }

    /// Write records to every node; returns created ids in record order.
    ///
    /// A failed write surfaces immediately; records written before the
    /// failure stay behind on the nodes (no cleanup).
    pub async fn write_to_nodes(&self, records: &[Record]) -> Result<Vec<RecordId>> {
        let schema_id = self.require_schema_id()?;

        let mut created = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let id: RecordId = Uuid::new_v4().to_string();
            let key = record_key(schema_id, &id);
            let bytes = serde_json::to_vec(record)
                .with_context(|| format!("serializing record {i}"))?;

            for node in &self.nodes {
                node.op
                    .write(&key, bytes.clone())
                    .await
                    .with_context(|| format!("writing record {i} to node {}", node.name))?;
            }
            debug!(record = %id, index = i, "record written");
            created.push(id);
        }

        info!(
            records = created.len(),
            nodes = self.nodes.len(),
            "records written to vault"
        );
        Ok(created)
    }

    /// Read records by id, in filter order, taking the first node that has
    /// each id. Ids missing from every node are logged and skipped.
    pub async fn read_from_nodes(&self, filter: &RecordFilter) -> Result<Vec<Record>> {
        let schema_id = self.require_schema_id()?;

        let mut records = Vec::with_capacity(filter.ids.len());
        for id in &filter.ids {
            let key = record_key(schema_id, id);

            let mut found = None;
            for node in &self.nodes {
                match node.op.read(&key).await {
                    Ok(buf) => {
                        let record: Record = serde_json::from_slice(&buf.to_bytes())
                            .with_context(|| format!("parsing record {id}"))?;
                        found = Some(record);
                        break;
                    }
                    Err(e) => {
                        debug!(node = %node.name, record = %id, "read miss: {e}");
                    }
                }
            }

            match found {
                Some(record) => records.push(record),
                None => warn!(record = %id, "record not found on any node"),
            }
        }

        Ok(records)
    }

    fn require_schema_id(&self) -> Result<&str> {
        self.schema_id
            .as_deref()
            .context("no schema id set; pass --schema-id or set KEYFERRY_SCHEMA_ID")
    }
}

fn schema_key(id: &str) -> String {
    format!("schemas/{id}")
}

fn record_key(schema_id: &str, id: &str) -> String {
    format!("{schema_id}/records/{id}")
}
