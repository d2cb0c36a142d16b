//! Vault node health check

use anyhow::Result;
use opendal::Operator;

/// Verify a node is reachable by listing the bucket root
pub async fn check_health(op: &Operator) -> Result<()> {
    // A root list is the lightest probe the S3 surface offers
    op.list("/")
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("node health check failed: {e}"))
}

/// Returns true if the node is reachable, false otherwise (non-panicking)
pub async fn is_healthy(op: &Operator) -> bool {
    check_health(op).await.is_ok()
}
