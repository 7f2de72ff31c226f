/// Notification handling core
///
/// Validates inbound notifications and status queries, drives the
/// [`StatusRegistry`] and defines the error contract seen by RPC callers:
/// 1. Empty or whitespace-only client ids are rejected as invalid arguments
/// 2. Unrecognised notification kinds are rejected as invalid arguments
/// 3. Anything that goes wrong inside the registry is reported as internal
use super::StatusRegistry;
use crate::error::{Result, ServiceError};
use crate::metrics;
use crate::models::{Ack, NotificationKind, StatusSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay applied before each registry write, emulating asynchronous processing
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(10);

/// Main Notification Service
#[derive(Clone)]
pub struct NotificationService {
    registry: Arc<StatusRegistry>,
    processing_delay: Duration,
}

impl NotificationService {
    /// Create a service over a shared registry
    pub fn new(registry: Arc<StatusRegistry>) -> Self {
        Self::with_processing_delay(registry, DEFAULT_PROCESSING_DELAY)
    }

    pub fn with_processing_delay(
        registry: Arc<StatusRegistry>,
        processing_delay: Duration,
    ) -> Self {
        Self {
            registry,
            processing_delay,
        }
    }

    pub fn registry(&self) -> &Arc<StatusRegistry> {
        &self.registry
    }

    /// Apply a HELLO/GOODBYE notification for a client
    ///
    /// The processing delay elapses before the registry lock is taken, so two
    /// concurrent notifications for the same id are applied in completion
    /// order and the later write wins.
    pub async fn handle_notification(
        &self,
        client_id: &str,
        kind: NotificationKind,
    ) -> Result<Ack> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            warn!("Rejected notification with empty client id");
            metrics::record_notification(kind, false);
            return Err(ServiceError::InvalidArgument(
                "client id cannot be empty".to_string(),
            ));
        }

        if kind.resulting_status().is_none() {
            warn!(client_id = %client_id, kind = %kind, "Rejected notification with invalid type");
            metrics::record_notification(kind, false);
            return Err(ServiceError::InvalidArgument(
                "invalid message type".to_string(),
            ));
        }

        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }

        self.registry.record(client_id, kind).map_err(|e| {
            metrics::record_notification(kind, false);
            ServiceError::Internal(format!(
                "failed to record {} for client {}: {}",
                kind, client_id, e
            ))
        })?;

        metrics::record_notification(kind, true);
        info!(client_id = %client_id, kind = %kind, "Notification processed");

        Ok(Ack::processed(client_id))
    }

    /// Status of one client, or of every known client
    ///
    /// A missing or blank `client_id` selects all clients. An id that never
    /// notified yields an empty snapshot rather than an error.
    pub async fn handle_status_query(&self, client_id: Option<&str>) -> Result<StatusSnapshot> {
        let client_id = client_id.map(str::trim).filter(|id| !id.is_empty());

        let snapshot = match client_id {
            Some(id) => {
                let mut snapshot = StatusSnapshot::new();
                if let Some(status) = self.registry.get(id)? {
                    snapshot.insert(id.to_string(), status);
                }
                snapshot
            }
            None => self.registry.get_all()?,
        };

        debug!(
            scope = client_id.unwrap_or("all clients"),
            count = snapshot.len(),
            "Status query answered"
        );

        Ok(snapshot)
    }
}
