//! Key bundle file I/O
//!
//! A key directory holds base64 text files named by scheme prefix:
//! `<scheme>-secret-key.b64`, `<scheme>-public-key.b64`, and (for schemes
//! with explicit parameters) `<scheme>-params.b64`. Retrieval writes
//! `retrieved-` prefixed names so it never clobbers the source files when
//! pointed at the same directory.

use anyhow::{Context, Result};
use keyferry_core::types::{KeyBundle, KeyScheme};
use std::path::{Path, PathBuf};

/// Prefix for filenames written on the retrieve path
pub const RETRIEVED_PREFIX: &str = "retrieved-";

/// Read a scheme's key files from `dir` into a bundle
pub async fn read_bundle(dir: &Path, scheme: KeyScheme) -> Result<KeyBundle> {
    let secret_key = read_field(dir, &scheme.secret_key_file()).await?;
    let public_key = read_field(dir, &scheme.public_key_file()).await?;
    let parameters = match scheme.params_file() {
        Some(name) => Some(read_field(dir, &name).await?),
        None => None,
    };

    Ok(KeyBundle {
        secret_key,
        public_key,
        parameters,
    })
}

/// Write a retrieved bundle into `dir`, returning the paths written
pub async fn write_bundle(dir: &Path, scheme: KeyScheme, bundle: &KeyBundle) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating key dir: {}", dir.display()))?;

    let mut written = Vec::new();
    written.push(write_field(dir, &scheme.secret_key_file(), &bundle.secret_key).await?);
    written.push(write_field(dir, &scheme.public_key_file(), &bundle.public_key).await?);
    if let (Some(name), Some(params)) = (scheme.params_file(), bundle.parameters.as_deref()) {
        written.push(write_field(dir, &name, params).await?);
    }

    Ok(written)
}

async fn read_field(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading key file: {}", path.display()))
}

async fn write_field(dir: &Path, name: &str, value: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{RETRIEVED_PREFIX}{name}"));

    // Write via a temp sibling so a failed write never leaves a torn file
    let tmp = path.with_extension("b64.tmp");
    tokio::fs::write(&tmp, value)
        .await
        .with_context(|| format!("writing tmp: {}", tmp.display()))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .with_context(|| format!("renaming to: {}", path.display()))?;

    Ok(path)
}
