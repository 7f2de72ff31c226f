/// Error types for notification-service
use thiserror::Error;
use tracing::error;

use crate::models::NotificationKind;

/// Failures raised by [`crate::services::StatusRegistry`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("client id cannot be empty")]
    EmptyClientId,

    #[error("invalid message type: {0}")]
    InvalidKind(NotificationKind),

    #[error("registry lock poisoned")]
    LockPoisoned,
}

/// Errors surfaced at the RPC boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RegistryError> for ServiceError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::EmptyClientId => {
                ServiceError::InvalidArgument("client id cannot be empty".to_string())
            }
            RegistryError::InvalidKind(_) => {
                ServiceError::InvalidArgument("invalid message type".to_string())
            }
            RegistryError::LockPoisoned => ServiceError::Internal(err.to_string()),
        }
    }
}

/// Convert ServiceError to tonic::Status for gRPC responses
///
/// Internal details are logged here and replaced by an opaque message.
impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidArgument(msg) => tonic::Status::invalid_argument(msg),
            ServiceError::Internal(detail) => {
                error!(detail = %detail, "internal error while handling request");
                tonic::Status::internal("internal server error")
            }
        }
    }
}

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_registry_errors_map_to_invalid_argument() {
        let err: ServiceError = RegistryError::EmptyClientId.into();
        assert_eq!(
            err,
            ServiceError::InvalidArgument("client id cannot be empty".to_string())
        );

        let err: ServiceError = RegistryError::InvalidKind(NotificationKind::Unknown).into();
        assert_eq!(
            err,
            ServiceError::InvalidArgument("invalid message type".to_string())
        );
    }

    #[test]
    fn test_poisoned_lock_maps_to_internal() {
        let err: ServiceError = RegistryError::LockPoisoned.into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[test]
    fn test_status_codes() {
        let status: tonic::Status =
            ServiceError::InvalidArgument("client id cannot be empty".into()).into();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "client id cannot be empty");

        let status: tonic::Status = ServiceError::Internal("lock poisoned".into()).into();
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "internal server error");
    }
}
