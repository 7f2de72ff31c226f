/// gRPC client for the notification service
///
/// Thin wrapper over the generated stub with helpers for the two
/// notification kinds. The stub is cloned per call, so one client can be
/// shared across concurrent tasks.
use crate::grpc::nova::notification_service::v1::notification_service_client::NotificationServiceClient;
use crate::grpc::nova::notification_service::v1::{
    GetClientStatusRequest, MessageType, SendMessageRequest, SendMessageResponse,
};
use std::collections::HashMap;
use thiserror::Error;
use tonic::transport::Channel;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("rpc failed: {0}")]
    Rpc(#[from] tonic::Status),
}

#[derive(Clone)]
pub struct NotificationClient {
    inner: NotificationServiceClient<Channel>,
}

impl NotificationClient {
    /// Connect to a server, e.g. `http://127.0.0.1:50051`
    pub async fn connect(addr: impl Into<String>) -> Result<Self, ClientError> {
        let addr = addr.into();
        let inner = NotificationServiceClient::connect(addr.clone()).await?;
        debug!("Connected to notification service at {}", addr);
        Ok(Self { inner })
    }

    pub async fn send_hello(&self, client_id: &str) -> Result<SendMessageResponse, ClientError> {
        self.send_message(client_id, MessageType::Hello).await
    }

    pub async fn send_goodbye(&self, client_id: &str) -> Result<SendMessageResponse, ClientError> {
        self.send_message(client_id, MessageType::Goodbye).await
    }

    pub async fn send_message(
        &self,
        client_id: &str,
        message_type: MessageType,
    ) -> Result<SendMessageResponse, ClientError> {
        let request = SendMessageRequest {
            client_id: client_id.to_string(),
            message_type: message_type.into(),
        };

        let response = self
            .inner
            .clone()
            .send_message(request)
            .await
            .map_err(|status| {
                warn!(
                    "SendMessage failed: {:?} - {}",
                    status.code(),
                    status.message()
                );
                status
            })?;

        Ok(response.into_inner())
    }

    /// Statuses keyed by client id; `None` asks for every known client
    pub async fn get_client_status(
        &self,
        client_id: Option<&str>,
    ) -> Result<HashMap<String, String>, ClientError> {
        let request = GetClientStatusRequest {
            client_id: client_id.unwrap_or_default().to_string(),
        };

        let response = self.inner.clone().get_client_status(request).await?;
        let statuses = response.into_inner().client_statuses;
        debug!("Retrieved status for {} clients", statuses.len());
        Ok(statuses)
    }
}
