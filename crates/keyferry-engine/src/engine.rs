//! Store and retrieve flows
//!
//! Store: read bundle → chunk each field → zip chunks into records → write
//! records to the vault → return created ids in upload order.
//!
//! Retrieve: read records by id (filter order) → reassemble each field by
//! concatenating its chunks across records → write the bundle files.
//!
//! There is no partial-failure recovery: a failed upload mid-sequence leaves
//! the records already written orphaned on the nodes.

use anyhow::Result;
use keyferry_chunks::{chunk, reassemble};
use keyferry_core::types::{KeyBundle, KeyScheme, Record, RecordFilter, RecordId};
use keyferry_vault::VaultClient;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::bundle;

/// Result of storing a key bundle
#[derive(Debug)]
pub struct StoreOutcome {
    pub scheme: KeyScheme,
    pub record_ids: Vec<RecordId>,
    pub bytes: u64,
}

/// Result of retrieving a key bundle
#[derive(Debug)]
pub struct RetrieveOutcome {
    pub scheme: KeyScheme,
    pub records: usize,
    pub files: Vec<PathBuf>,
    pub bytes: u64,
}

/// Zip a bundle's chunked fields into records: record j carries the j-th
/// chunk of each field, fields absent once exhausted.
pub fn bundle_to_records(bundle: &KeyBundle, window: usize) -> Result<Vec<Record>> {
    let secret = chunk(&bundle.secret_key, window)?;
    let public = chunk(&bundle.public_key, window)?;
    let params = match bundle.parameters.as_deref() {
        Some(p) => chunk(p, window)?,
        None => Vec::new(),
    };

    let rows = secret.len().max(public.len()).max(params.len());
    let records = (0..rows)
        .map(|j| Record {
            secret_key: secret.get(j).cloned(),
            public_key: public.get(j).cloned(),
            parameters: params.get(j).cloned(),
        })
        .collect();

    Ok(records)
}

/// Reassemble each field by concatenating its chunks in record order
pub fn records_to_bundle(records: &[Record]) -> KeyBundle {
    let secret_key = reassemble(records.iter().filter_map(|r| r.secret_key.as_deref()));
    let public_key = reassemble(records.iter().filter_map(|r| r.public_key.as_deref()));
    let parameters = records
        .iter()
        .any(|r| r.parameters.is_some())
        .then(|| reassemble(records.iter().filter_map(|r| r.parameters.as_deref())));

    KeyBundle {
        secret_key,
        public_key,
        parameters,
    }
}

/// Store a key directory's bundle in the vault
pub async fn store_keys(client: &VaultClient, dir: &Path, window: usize) -> Result<StoreOutcome> {
    let scheme = KeyScheme::detect(dir);
    let bundle = bundle::read_bundle(dir, scheme).await?;

    let bytes = (bundle.secret_key.len()
        + bundle.public_key.len()
        + bundle.parameters.as_deref().map_or(0, str::len)) as u64;

    let records = bundle_to_records(&bundle, window)?;
    if records.is_empty() {
        warn!(dir = %dir.display(), "key files are empty; nothing to store");
        return Ok(StoreOutcome {
            scheme,
            record_ids: Vec::new(),
            bytes,
        });
    }

    let record_ids = client.write_to_nodes(&records).await?;

    info!(
        dir = %dir.display(),
        scheme = ?scheme,
        records = record_ids.len(),
        bytes,
        "stored key bundle"
    );

    Ok(StoreOutcome {
        scheme,
        record_ids,
        bytes,
    })
}

/// Retrieve records by id and write the reassembled bundle into `dir`.
///
/// Zero retrieved records is an error; no files are written in that case.
pub async fn retrieve_keys(
    client: &VaultClient,
    ids: &[RecordId],
    dir: &Path,
) -> Result<RetrieveOutcome> {
    let scheme = KeyScheme::detect(dir);

    let records = client
        .read_from_nodes(&RecordFilter::by_ids(ids.iter().cloned()))
        .await?;

    if records.is_empty() {
        anyhow::bail!("no records found");
    }

    let bundle = records_to_bundle(&records);
    let bytes = (bundle.secret_key.len()
        + bundle.public_key.len()
        + bundle.parameters.as_deref().map_or(0, str::len)) as u64;

    let files = bundle::write_bundle(dir, scheme, &bundle).await?;

    info!(
        dir = %dir.display(),
        scheme = ?scheme,
        records = records.len(),
        files = files.len(),
        bytes,
        "retrieved key bundle"
    );

    Ok(RetrieveOutcome {
        scheme,
        records: records.len(),
        files,
        bytes,
    })
}
