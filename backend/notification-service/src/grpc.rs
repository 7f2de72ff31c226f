// gRPC server for NotificationService
use std::time::Instant;
use tonic::{Request, Response, Status};
use tracing::info;

pub mod nova {
    pub mod notification_service {
        pub mod v1 {
            tonic::include_proto!("nova.notification_service.v1");
        }
        pub use v1::*;
    }
}

use nova::notification_service::v1::notification_service_server::NotificationService;
use nova::notification_service::v1::*;

use crate::metrics;
use crate::models::NotificationKind;
use crate::services::NotificationService as CoreNotificationService;

/// Correlation id attached to each request by the server interceptor
#[derive(Debug, Clone)]
pub struct CorrelationId(pub String);

fn correlation_id<T>(request: &Request<T>) -> String {
    request
        .extensions()
        .get::<CorrelationId>()
        .map(|c| c.0.clone())
        .unwrap_or_default()
}

/// Map a wire `MessageType` value onto a notification kind
///
/// Values outside the enum decode as `Unknown` and are rejected downstream.
pub fn kind_from_wire(value: i32) -> NotificationKind {
    match MessageType::try_from(value) {
        Ok(MessageType::Hello) => NotificationKind::Hello,
        Ok(MessageType::Goodbye) => NotificationKind::Goodbye,
        Ok(MessageType::Unknown) | Err(_) => NotificationKind::Unknown,
    }
}

fn observe<T>(method: &str, start: Instant, result: &Result<T, Status>) {
    let code = match result {
        Ok(_) => tonic::Code::Ok,
        Err(status) => status.code(),
    };
    metrics::observe_grpc_request(method, code, start.elapsed());
}

#[derive(Clone)]
pub struct NotificationServiceImpl {
    core_service: CoreNotificationService,
}

impl NotificationServiceImpl {
    pub fn new(core_service: CoreNotificationService) -> Self {
        Self { core_service }
    }
}

#[tonic::async_trait]
impl NotificationService for NotificationServiceImpl {
    /// Record a HELLO/GOODBYE notification
    async fn send_message(
        &self,
        request: Request<SendMessageRequest>,
    ) -> Result<Response<SendMessageResponse>, Status> {
        let start = Instant::now();
        let correlation_id = correlation_id(&request);
        let req = request.into_inner();
        let kind = kind_from_wire(req.message_type);

        info!(
            correlation_id = %correlation_id,
            "SendMessage: client_id={:?}, message_type={}",
            req.client_id, req.message_type
        );

        let result = self
            .core_service
            .handle_notification(&req.client_id, kind)
            .await
            .map(|ack| {
                Response::new(SendMessageResponse {
                    success: ack.success,
                    message: ack.message,
                })
            })
            .map_err(Status::from);

        observe("SendMessage", start, &result);
        result
    }

    /// Get one or all client statuses
    async fn get_client_status(
        &self,
        request: Request<GetClientStatusRequest>,
    ) -> Result<Response<GetClientStatusResponse>, Status> {
        let start = Instant::now();
        let correlation_id = correlation_id(&request);
        let req = request.into_inner();

        info!(
            correlation_id = %correlation_id,
            "GetClientStatus: client_id={}",
            if req.client_id.trim().is_empty() {
                "all clients"
            } else {
                req.client_id.as_str()
            }
        );

        let result = self
            .core_service
            .handle_status_query(Some(&req.client_id))
            .await
            .map(|snapshot| {
                let client_statuses = snapshot
                    .into_iter()
                    .map(|(id, status)| (id, status.as_str().to_string()))
                    .collect();
                Response::new(GetClientStatusResponse { client_statuses })
            })
            .map_err(Status::from);

        if let Ok(response) = &result {
            info!(
                correlation_id = %correlation_id,
                "Returned status for {} clients",
                response.get_ref().client_statuses.len()
            );
        }

        observe("GetClientStatus", start, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StatusRegistry;
    use std::sync::Arc;
    use std::time::Duration;
    use tonic::Code;

    fn service() -> NotificationServiceImpl {
        NotificationServiceImpl::new(CoreNotificationService::with_processing_delay(
            Arc::new(StatusRegistry::new()),
            Duration::ZERO,
        ))
    }

    async fn send(
        svc: &NotificationServiceImpl,
        client_id: &str,
        message_type: i32,
    ) -> Result<SendMessageResponse, Status> {
        svc.send_message(Request::new(SendMessageRequest {
            client_id: client_id.to_string(),
            message_type,
        }))
        .await
        .map(Response::into_inner)
    }

    async fn status(svc: &NotificationServiceImpl, client_id: &str) -> GetClientStatusResponse {
        svc.get_client_status(Request::new(GetClientStatusRequest {
            client_id: client_id.to_string(),
        }))
        .await
        .unwrap()
        .into_inner()
    }

    #[test]
    fn test_kind_from_wire() {
        assert_eq!(kind_from_wire(MessageType::Hello as i32), NotificationKind::Hello);
        assert_eq!(kind_from_wire(MessageType::Goodbye as i32), NotificationKind::Goodbye);
        assert_eq!(kind_from_wire(MessageType::Unknown as i32), NotificationKind::Unknown);
        assert_eq!(kind_from_wire(42), NotificationKind::Unknown);
        assert_eq!(kind_from_wire(-1), NotificationKind::Unknown);
    }

    #[tokio::test]
    async fn test_send_hello_message() {
        let svc = service();

        let response = send(&svc, "test_client_1", MessageType::Hello as i32)
            .await
            .unwrap();
        assert!(response.success);
        assert!(response.message.contains("test_client_1"));

        let statuses = status(&svc, "test_client_1").await.client_statuses;
        assert_eq!(statuses.get("test_client_1").map(String::as_str), Some("connected"));
    }

    #[tokio::test]
    async fn test_send_goodbye_message() {
        let svc = service();
        send(&svc, "test_client_2", MessageType::Hello as i32)
            .await
            .unwrap();

        let response = send(&svc, "test_client_2", MessageType::Goodbye as i32)
            .await
            .unwrap();
        assert!(response.success);

        let statuses = status(&svc, "test_client_2").await.client_statuses;
        assert_eq!(
            statuses.get("test_client_2").map(String::as_str),
            Some("disconnected")
        );
    }

    #[tokio::test]
    async fn test_invalid_message_type() {
        let svc = service();

        for message_type in [MessageType::Unknown as i32, 7] {
            let err = send(&svc, "test_client_3", message_type).await.unwrap_err();
            assert_eq!(err.code(), Code::InvalidArgument);
            assert_eq!(err.message(), "invalid message type");
        }
        assert!(status(&svc, "").await.client_statuses.is_empty());
    }

    #[tokio::test]
    async fn test_empty_client_id() {
        let svc = service();

        for id in ["", "    "] {
            let err = send(&svc, id, MessageType::Hello as i32).await.unwrap_err();
            assert_eq!(err.code(), Code::InvalidArgument);
            assert_eq!(err.message(), "client id cannot be empty");
        }
        assert!(status(&svc, "").await.client_statuses.is_empty());
    }

    #[tokio::test]
    async fn test_get_all_client_statuses() {
        let svc = service();
        let clients = ["client_a", "client_b", "client_c"];
        for client in clients {
            send(&svc, client, MessageType::Hello as i32).await.unwrap();
        }

        let statuses = status(&svc, "").await.client_statuses;
        assert_eq!(statuses.len(), clients.len());
        for client in clients {
            assert_eq!(statuses[client], "connected");
        }
    }

    #[tokio::test]
    async fn test_unknown_client_yields_no_entry() {
        let svc = service();
        send(&svc, "known", MessageType::Hello as i32).await.unwrap();

        let statuses = status(&svc, "stranger").await.client_statuses;
        assert!(statuses.is_empty());
    }

    #[tokio::test]
    async fn test_internal_fault_is_opaque() {
        let core = CoreNotificationService::with_processing_delay(
            Arc::new(StatusRegistry::new()),
            Duration::ZERO,
        );
        core.registry().poison();
        let svc = NotificationServiceImpl::new(core);

        let err = send(&svc, "alice", MessageType::Hello as i32)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Internal);
        assert_eq!(err.message(), "internal server error");

        let err = svc
            .get_client_status(Request::new(GetClientStatusRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Internal);
        assert_eq!(err.message(), "internal server error");
    }
}
