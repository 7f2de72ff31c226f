use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: AppConfig,
    pub grpc: GrpcConfig,
    pub http: HttpConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub env: String,
    /// Seconds to wait for in-flight RPCs after a shutdown signal
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrpcConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Serves /health and /metrics
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessingConfig {
    /// Simulated processing delay before each registry write
    pub delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            app: AppConfig {
                env: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
                shutdown_grace_secs: parse_or(&lookup, "SHUTDOWN_GRACE_SECS", 5, "u64")?,
            },
            grpc: GrpcConfig {
                host: parse_or(
                    &lookup,
                    "GRPC_HOST",
                    IpAddr::from([0, 0, 0, 0]),
                    "IP address",
                )?,
                port: parse_or(&lookup, "GRPC_PORT", 50051, "u16")?,
            },
            http: HttpConfig {
                host: parse_or(
                    &lookup,
                    "HTTP_HOST",
                    IpAddr::from([0, 0, 0, 0]),
                    "IP address",
                )?,
                port: parse_or(&lookup, "HTTP_PORT", 8080, "u16")?,
            },
            processing: ProcessingConfig {
                delay_ms: parse_or(&lookup, "PROCESSING_DELAY_MS", 10, "u64")?,
            },
        })
    }

    pub fn grpc_addr(&self) -> SocketAddr {
        SocketAddr::new(self.grpc.host, self.grpc.port)
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing.delay_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.app.shutdown_grace_secs)
    }
}

fn parse_or<F, T>(
    lookup: &F,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            expected,
        }),
        None => Ok(default),
    }
}
