use anyhow::Context;
use notification_service::{server, Config, NotificationService, StatusRegistry};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(env = %config.app.env, "Starting notification service");

    // The registry lives for the whole process and is shared by every handler
    let registry = Arc::new(StatusRegistry::new());
    let core_service =
        NotificationService::with_processing_delay(registry, config.processing_delay());

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let grpc_addr = config.grpc_addr();
    let mut grpc_task = tokio::spawn(async move {
        server::serve(grpc_addr, core_service, async {
            shutdown_rx.await.ok();
        })
        .await
    });

    let http_addr = config.http_addr();
    let (http_handle, mut http_task) = server::spawn_http_server(http_addr)
        .with_context(|| format!("Failed to bind HTTP server on {}", http_addr))?;

    // Either server task finishing before a signal means it failed
    tokio::select! {
        _ = server::shutdown_signal() => {}
        joined = &mut grpc_task => {
            http_handle.stop(true).await;
            return match joined {
                Ok(result) => result.context("gRPC server error"),
                Err(e) => Err(e).context("gRPC server task failed"),
            };
        }
        joined = &mut http_task => {
            let _ = shutdown_tx.send(());
            let _ = tokio::time::timeout(config.shutdown_grace(), grpc_task).await;
            return match joined {
                Ok(Ok(())) => Err(anyhow::anyhow!("HTTP server stopped unexpectedly")),
                Ok(Err(e)) => Err(e).context("HTTP server error"),
                Err(e) => Err(e).context("HTTP server task failed"),
            };
        }
    }

    let _ = shutdown_tx.send(());
    http_handle.stop(true).await;

    match tokio::time::timeout(config.shutdown_grace(), grpc_task).await {
        Ok(Ok(Ok(()))) => info!("Notification service shutdown complete"),
        Ok(Ok(Err(e))) => error!("gRPC server error during shutdown: {}", e),
        Ok(Err(e)) => error!("gRPC server task failed: {}", e),
        Err(_) => warn!(
            "In-flight requests did not finish within {:?}, exiting",
            config.shutdown_grace()
        ),
    }

    Ok(())
}
