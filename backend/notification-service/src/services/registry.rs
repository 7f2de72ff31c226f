/// Client connection-status registry
///
/// Holds the client_id -> status mapping shared by every request handler.
/// A single mutex covers the whole map: writes are last-write-wins and reads
/// always observe a complete snapshot. Nothing awaits while the guard is held.
use crate::error::RegistryError;
use crate::models::{ClientStatus, NotificationKind, StatusSnapshot};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
pub struct StatusRegistry {
    /// Map of client_id -> last recorded status
    clients: Mutex<HashMap<String, ClientStatus>>,
}

impl StatusRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, ClientStatus>>, RegistryError> {
        self.clients.lock().map_err(|_| RegistryError::LockPoisoned)
    }

    /// Record a notification for a client
    ///
    /// HELLO sets the client to `Connected`, GOODBYE to `Disconnected`,
    /// overwriting whatever was there. The id is stored trimmed.
    ///
    /// # Arguments
    ///
    /// * `client_id` - Non-empty (after trimming) client identifier
    /// * `kind` - Must be HELLO or GOODBYE
    pub fn record(&self, client_id: &str, kind: NotificationKind) -> Result<(), RegistryError> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(RegistryError::EmptyClientId);
        }
        let status = kind
            .resulting_status()
            .ok_or(RegistryError::InvalidKind(kind))?;

        let previous = self.lock()?.insert(client_id.to_string(), status);
        debug!(
            client_id = %client_id,
            from = ?previous,
            to = %status,
            "client status recorded"
        );

        Ok(())
    }

    /// Status of a single client, `None` if it never notified
    pub fn get(&self, client_id: &str) -> Result<Option<ClientStatus>, RegistryError> {
        Ok(self.lock()?.get(client_id.trim()).copied())
    }

    /// Copy of the whole mapping, detached from later mutation
    pub fn get_all(&self) -> Result<StatusSnapshot, RegistryError> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> Result<usize, RegistryError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.lock()?.is_empty())
    }

    /// Poison the lock by panicking while it is held
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = self.clients.lock();
                    panic!("poisoning registry lock");
                })
                .join();
        });
    }
}
