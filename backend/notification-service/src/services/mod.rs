pub mod notification_service;
pub mod registry;

pub use notification_service::*;
pub use registry::*;
