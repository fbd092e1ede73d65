//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the listener is bound.

use tracing::warn;

/// Warn when the console asset directory is missing; the RPC surface still works without it.
pub async fn ensure_env(static_dir: &str) -> anyhow::Result<()> {
    match tokio::fs::metadata(static_dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("{static_dir} exists but is not a directory")),
        Err(_) => {
            warn!(%static_dir, "console assets directory not found; static assets may 404");
            Ok(())
        }
    }
}
