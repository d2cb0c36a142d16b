//! TFHE-rs key pair generation
//!
//! Generates a client/server key pair with the default configuration,
//! bincode-serializes both, and writes them base64-encoded to the tfhe file
//! set the store path consumes. Existing key files are left untouched so a
//! repeated invocation never rotates keys by accident.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use keyferry_core::types::KeyScheme;
use std::path::Path;

pub fn cmd_generate_keys(dir: &Path) -> Result<()> {
    let scheme = KeyScheme::TfheRs;
    let secret_path = dir.join(scheme.secret_key_file());
    let public_path = dir.join(scheme.public_key_file());

    if secret_path.exists() && public_path.exists() {
        println!(
            "Key files already present in {} — nothing to do.",
            dir.display()
        );
        return Ok(());
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating key dir: {}", dir.display()))?;

    println!("Generating TFHE-rs key pair (this can take a while)...");
    let config = tfhe::ConfigBuilder::default().build();
    let (client_key, server_key) = tfhe::generate_keys(config);

    let client_bytes = bincode::serialize(&client_key).context("serializing client key")?;
    let server_bytes = bincode::serialize(&server_key).context("serializing server key")?;

    std::fs::write(&secret_path, BASE64.encode(&client_bytes))
        .with_context(|| format!("writing {}", secret_path.display()))?;
    std::fs::write(&public_path, BASE64.encode(&server_bytes))
        .with_context(|| format!("writing {}", public_path.display()))?;

    println!("Wrote:");
    println!("  {}", secret_path.display());
    println!("  {}", public_path.display());
    Ok(())
}
