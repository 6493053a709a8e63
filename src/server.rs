//! Process lifecycle: store pool, gRPC server, graceful shutdown.

use anyhow::Context;
use authz_grpc_proto::AuthorizationServer;
use credential_store::{create_store, StoreClient};
use tonic::transport::Server;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    config::AuthzConfig,
    decision::DecisionEngine,
    response::ResponseBuilder,
    service::AuthorizationService,
    telemetry,
};

/// Serve until SIGINT/SIGTERM, then close the store pool.
///
/// Fails fast when the credential store is unreachable at startup.
pub async fn run(config: AuthzConfig) -> anyhow::Result<()> {
    let store = create_store(&config.store).context("failed to initialize credential store")?;
    serve(config, store).await
}

/// Serve with an already constructed store client.
pub async fn serve(config: AuthzConfig, store: StoreClient) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;

    store
        .ping(config.store.redis.connect_timeout())
        .await
        .context("credential store connection failed")?;
    info!(backend = store.backend_name(), "credential store reachable");

    if let Some(metrics_addr) = config.metrics.socket_addr()? {
        telemetry::install_prometheus(metrics_addr)
            .context("failed to start prometheus exporter")?;
    }

    let service = AuthorizationService::new(
        DecisionEngine::new(store.clone()),
        ResponseBuilder::new(config.policy.clone()),
    );

    info!(
        address = %addr,
        lookup_timeout_ms = config.store.lookup_timeout_ms,
        rules = config.policy.rules.len(),
        "auth server starting"
    );
    let served = Server::builder()
        .layer(TraceLayer::new_for_grpc())
        .add_service(AuthorizationServer::new(service))
        .serve_with_shutdown(addr, shutdown_signal())
        .await;

    store.close();
    served.context("grpc server failed")?;
    info!("auth server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received, draining in-flight checks");
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use async_trait::async_trait;
    use credential_store::{CredentialStore, StoreBackend, StoreError, StoreResult, TenantId};

    use super::*;

    struct UnreachableStore;

    #[async_trait]
    impl CredentialStore for UnreachableStore {
        async fn get_tenant(&self, _key: &str) -> StoreResult<Option<TenantId>> {
            Err(StoreError::Pool("connection refused".to_string()))
        }

        async fn ping(&self) -> StoreResult<()> {
            Err(StoreError::Pool("connection refused".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "unreachable"
        }
    }

    fn local_config() -> AuthzConfig {
        let mut config = AuthzConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.store.backend = StoreBackend::Memory;
        config
    }

    #[tokio::test]
    async fn startup_fails_when_store_ping_fails() {
        let config = local_config();
        let store = StoreClient::new(Arc::new(UnreachableStore), config.store.lookup_timeout());

        let started = std::time::Instant::now();
        let err = serve(config, store).await.unwrap_err();
        assert!(
            format!("{err:#}").contains("credential store connection failed"),
            "{err:#}"
        );
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn startup_fails_when_redis_is_unreachable() {
        let mut config = local_config();
        config.store.backend = StoreBackend::Redis;
        config.store.redis.url = "redis://127.0.0.1:1".to_string();
        config.store.redis.connect_timeout_ms = 500;

        let err = run(config).await.unwrap_err();
        assert!(
            format!("{err:#}").contains("credential store connection failed"),
            "{err:#}"
        );
    }
}
