use std::net::SocketAddr;

use configs::AppConfig;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};

/// Resolve the listen address from `server.host` / `server.port`.
fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.server.bind_addr();
    raw.parse()
        .map_err(|e| StartupError::Any(anyhow::anyhow!("invalid listen address {raw}: {e}")))
}

/// Public entry: connect the store, build the app and run the HTTP server.
///
/// Configuration has already been validated by the caller; a store that
/// cannot be reached here aborts startup before anything is bound.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    common::env::ensure_env(&cfg.server.static_dir).await?;

    let store = service::connect(&cfg.store).await?;
    let state = AppState::new(store);

    let app = routes::build_router(state, &cfg.server.static_dir, routes::build_cors());

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Any(anyhow::anyhow!("cannot bind {addr}: {e}")))?;
    info!(service = "server", event = "listening", %addr, static_dir = %cfg.server.static_dir, "redis tool server listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_from_config() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "0.0.0.0".into();
        cfg.server.port = 5555;
        assert_eq!(bind_addr(&cfg).unwrap().port(), 5555);

        cfg.server.host = "not a host".into();
        assert!(bind_addr(&cfg).is_err());
    }
}
