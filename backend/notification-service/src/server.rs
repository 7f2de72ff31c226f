/// gRPC and HTTP server wiring
///
/// The gRPC server carries the notification service, the standard
/// grpc.health.v1 service and a correlation-id interceptor. The HTTP server
/// only exposes /health and /metrics.
use crate::grpc::nova::notification_service::v1::notification_service_server::NotificationServiceServer;
use crate::grpc::{CorrelationId, NotificationServiceImpl};
use crate::metrics;
use crate::services::NotificationService as CoreNotificationService;
use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpServer};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::metadata::MetadataValue;
use tonic::transport::server::Router;
use tonic::transport::Server;
use tonic::{Request, Status};
use tracing::{error, info};
use uuid::Uuid;

const CORRELATION_HEADER: &str = "x-correlation-id";

async fn build_router(core_service: CoreNotificationService) -> Router {
    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<NotificationServiceServer<NotificationServiceImpl>>()
        .await;

    Server::builder()
        .add_service(health_service)
        .add_service(NotificationServiceServer::with_interceptor(
            NotificationServiceImpl::new(core_service),
            grpc_server_interceptor,
        ))
}

/// Serve on `addr` until `shutdown` resolves
pub async fn serve<F>(
    addr: SocketAddr,
    core_service: CoreNotificationService,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()>,
{
    info!("gRPC server listening on {}", addr);
    build_router(core_service)
        .await
        .serve_with_shutdown(addr, shutdown)
        .await
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve_with_listener<F>(
    listener: TcpListener,
    core_service: CoreNotificationService,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()>,
{
    if let Ok(addr) = listener.local_addr() {
        info!("gRPC server listening on {}", addr);
    }
    build_router(core_service)
        .await
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
}

/// HTTP server for liveness and Prometheus scraping
pub fn http_server(addr: SocketAddr) -> std::io::Result<actix_web::dev::Server> {
    info!("HTTP server listening on {}", addr);
    let server = HttpServer::new(|| {
        App::new()
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .route("/", web::get().to(|| async { "Notification Service v1" }))
    })
    .workers(1)
    .disable_signals()
    .bind(addr)?
    .run();

    Ok(server)
}

/// Run the HTTP server in the background, logging how it exits
pub fn spawn_http_server(
    addr: SocketAddr,
) -> std::io::Result<(ServerHandle, JoinHandle<std::io::Result<()>>)> {
    let server = http_server(addr)?;
    let handle = server.handle();
    let task = actix_web::rt::spawn(async move {
        let result = server.await;
        match &result {
            Ok(()) => info!("HTTP server stopped"),
            Err(e) => error!("HTTP server error: {}", e),
        }
        result
    });

    Ok((handle, task))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutting down gracefully...");
}

/// Attach a correlation id to every request, reusing the caller's if present
fn grpc_server_interceptor(mut req: Request<()>) -> Result<Request<()>, Status> {
    let existing = req
        .metadata()
        .get(CORRELATION_HEADER)
        .and_then(|val| val.to_str().ok())
        .map(str::to_string);

    let correlation_id = match existing {
        Some(existing) => existing,
        None => {
            let generated = Uuid::new_v4().to_string();
            let value = MetadataValue::try_from(generated.as_str())
                .map_err(|_| Status::internal("failed to set correlation id"))?;
            req.metadata_mut().insert(CORRELATION_HEADER, value);
            generated
        }
    };

    req.extensions_mut().insert(CorrelationId(correlation_id));
    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_http_server_task_reports_clean_stop() {
        let (handle, task) = spawn_http_server("127.0.0.1:0".parse().unwrap()).unwrap();

        handle.stop(true).await;
        let result = task.await.unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn test_interceptor_keeps_caller_correlation_id() {
        let mut req = Request::new(());
        req.metadata_mut()
            .insert(CORRELATION_HEADER, MetadataValue::from_static("abc-123"));

        let req = grpc_server_interceptor(req).unwrap();
        let id = req.extensions().get::<CorrelationId>().unwrap();
        assert_eq!(id.0, "abc-123");
    }

    #[test]
    fn test_interceptor_generates_correlation_id() {
        let req = grpc_server_interceptor(Request::new(())).unwrap();

        let id = req.extensions().get::<CorrelationId>().unwrap().0.clone();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(
            req.metadata().get(CORRELATION_HEADER).unwrap().to_str().unwrap(),
            id
        );
    }
}
