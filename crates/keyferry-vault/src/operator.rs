//! OpenDAL Operator factory for vault nodes

use anyhow::{Context, Result};
use opendal::Operator;

/// Minimal per-node config needed to build an operator
/// (the node list and bucket live in keyferry-core's VaultConfig)
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Build an OpenDAL Operator for a single S3-compatible vault node
///
/// Uses path-style addressing (default in opendal 0.55), which is what
/// SeaweedFS and MinIO node deployments expect.
pub fn build_operator(cfg: &NodeConfig) -> Result<Operator> {
    let builder = opendal::services::S3::default()
        .endpoint(&cfg.endpoint)
        .region(&cfg.region)
        .bucket(&cfg.bucket)
        .access_key_id(&cfg.access_key_id)
        .secret_access_key(&cfg.secret_access_key);

    let op = Operator::new(builder)
        .with_context(|| format!("creating OpenDAL operator for {}", cfg.endpoint))?
        .layer(opendal::layers::LoggingLayer::default())
        .layer(
            opendal::layers::RetryLayer::new()
                .with_max_times(5)
                .with_jitter(),
        )
        .finish();

    Ok(op)
}

/// Build one operator per configured vault node.
///
/// If `enforce_tls` is set and a node endpoint uses HTTP, this returns an
/// error. Otherwise a warning is logged for non-HTTPS endpoints.
pub fn build_node_operators(
    vault: &keyferry_core::config::VaultConfig,
    access_key_id: &str,
    secret_access_key: &str,
) -> Result<Vec<(String, Operator)>> {
    if vault.nodes.is_empty() {
        anyhow::bail!("no vault nodes configured; set vault.nodes in the config file");
    }

    let mut operators = Vec::with_capacity(vault.nodes.len());
    for endpoint in &vault.nodes {
        if endpoint.starts_with("http://") {
            if vault.enforce_tls {
                anyhow::bail!(
                    "vault node uses plaintext HTTP ({endpoint}), but enforce_tls is enabled. \
                     Use an HTTPS endpoint or set vault.enforce_tls = false for local development."
                );
            }
            tracing::warn!(
                endpoint = %endpoint,
                "vault node uses plaintext HTTP — key material is transmitted unencrypted. \
                 Set vault.enforce_tls = true and use HTTPS in production."
            );
        }

        let op = build_operator(&NodeConfig {
            endpoint: endpoint.clone(),
            region: vault.region.clone(),
            bucket: vault.bucket.clone(),
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
        })?;
        operators.push((endpoint.clone(), op));
    }

    Ok(operators)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_operator_valid() {
        let cfg = NodeConfig {
            endpoint: "http://localhost:8333".to_string(),
            region: "us-east-1".to_string(),
            bucket: "test-bucket".to_string(),
            access_key_id: "test-key".to_string(),
            secret_access_key: "test-secret".to_string(),
        };
        let op = build_operator(&cfg);
        assert!(op.is_ok(), "operator construction should succeed");
    }

    #[test]
    fn test_build_node_operators_http_warning() {
        // HTTP endpoint with enforce_tls=false should succeed (but log warning)
        let vault = keyferry_core::config::VaultConfig {
            nodes: vec!["http://localhost:8333".into()],
            enforce_tls: false,
            ..Default::default()
        };
        let result = build_node_operators(&vault, "key", "secret");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 1);
    }

    #[test]
    fn test_build_node_operators_http_enforce_tls() {
        // HTTP endpoint with enforce_tls=true should fail
        let vault = keyferry_core::config::VaultConfig {
            nodes: vec!["http://insecure:8333".into()],
            enforce_tls: true,
            ..Default::default()
        };
        let result = build_node_operators(&vault, "key", "secret");
        assert!(result.is_err(), "HTTP + enforce_tls must fail");
        assert!(
            result.unwrap_err().to_string().contains("enforce_tls"),
            "error message should mention enforce_tls"
        );
    }

    #[test]
    fn test_build_node_operators_empty_node_list() {
        let vault = keyferry_core::config::VaultConfig {
            nodes: vec![],
            ..Default::default()
        };
        let result = build_node_operators(&vault, "key", "secret");
        assert!(result.is_err(), "empty node list must fail");
    }

    #[test]
    fn test_build_node_operators_https_multi_node() {
        let vault = keyferry_core::config::VaultConfig {
            nodes: vec![
                "https://node-a.example.com:8333".into(),
                "https://node-b.example.com:8333".into(),
                "https://node-c.example.com:8333".into(),
            ],
            enforce_tls: true,
            ..Default::default()
        };
        let result = build_node_operators(&vault, "key", "secret");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 3);
    }
}
