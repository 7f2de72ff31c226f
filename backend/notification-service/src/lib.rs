pub mod client;
pub mod config;
pub mod error;
pub mod grpc;
pub mod metrics;
pub mod models;
pub mod server;
pub mod services;

pub use client::{ClientError, NotificationClient};
pub use config::Config;
pub use error::{RegistryError, Result, ServiceError};
pub use models::{Ack, ClientStatus, NotificationKind, StatusSnapshot};
pub use services::*;
