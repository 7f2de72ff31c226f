use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Connection state of a client, as last reported by its notifications
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    /// Last notification was HELLO
    Connected,
    /// Last notification was GOODBYE
    Disconnected,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Connected => "connected",
            ClientStatus::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connected" => Ok(ClientStatus::Connected),
            "disconnected" => Ok(ClientStatus::Disconnected),
            other => Err(format!("unknown client status: {}", other)),
        }
    }
}

/// Kind of an inbound notification
///
/// `Unknown` covers both the wire's explicit UNKNOWN value and any
/// integer the wire enum does not recognise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationKind {
    Hello,
    Goodbye,
    Unknown,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Hello => "hello",
            NotificationKind::Goodbye => "goodbye",
            NotificationKind::Unknown => "unknown",
        }
    }

    /// Status a client ends up in after this notification, if the kind is valid
    pub fn resulting_status(&self) -> Option<ClientStatus> {
        match self {
            NotificationKind::Hello => Some(ClientStatus::Connected),
            NotificationKind::Goodbye => Some(ClientStatus::Disconnected),
            NotificationKind::Unknown => None,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgement returned for an accepted notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn processed(client_id: &str) -> Self {
        Self {
            success: true,
            message: format!("processed for {}", client_id),
        }
    }
}

/// Point-in-time copy of client statuses
pub type StatusSnapshot = HashMap<String, ClientStatus>;
