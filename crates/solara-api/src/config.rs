//! # Service Configuration
//!
//! Env-driven configuration with a defined load step at startup. A
//! missing `DATABASE_URL` selects the in-memory registry with a
//! filesystem blob root — enough to run the service locally without
//! external collaborators.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use solara_kyc::UploadLimits;

/// Configuration errors raised at load time.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `SOLARA_PORT` did not parse as a port number.
    #[error("SOLARA_PORT must be a valid u16")]
    InvalidPort,

    /// `SOLARA_HOST` did not parse as an IP address.
    #[error("SOLARA_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost(#[source] std::net::AddrParseError),

    /// A numeric variable did not parse.
    #[error("{name} must be a positive integer")]
    InvalidNumber {
        /// The offending variable.
        name: &'static str,
    },
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host, IP literal or `localhost`.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl ServerConfig {
    /// Resolve the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }
        let ip: IpAddr = self.host.parse().map_err(ConfigError::InvalidHost)?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Storage collaborator selection.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Postgres connection string; in-memory registry when absent.
    pub database_url: Option<String>,
    /// Root directory for the filesystem blob store.
    pub blob_root: PathBuf,
}

/// Top-level configuration for the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP binding.
    pub server: ServerConfig,
    /// Storage collaborators.
    pub storage: StorageConfig,
    /// Upload ceilings.
    pub limits: UploadLimits,
    /// Deadline for blob fetches on the read path.
    pub fetch_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from the environment (and `.env` if present).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let host = env::var("SOLARA_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("SOLARA_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = env::var("DATABASE_URL").ok();
        let blob_root = env::var("SOLARA_BLOB_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/blobs"));

        let max_size_bytes = parse_positive("SOLARA_MAX_UPLOAD_BYTES")?
            .unwrap_or(UploadLimits::default().max_size_bytes);
        let fetch_timeout_ms = parse_positive("SOLARA_FETCH_TIMEOUT_MS")?.unwrap_or(10_000);

        Ok(Self {
            server: ServerConfig { host, port },
            storage: StorageConfig {
                database_url,
                blob_root,
            },
            limits: UploadLimits { max_size_bytes },
            fetch_timeout: Duration::from_millis(fetch_timeout_ms),
        })
    }
}

fn parse_positive(name: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(name) {
        Ok(raw) => {
            let value = raw
                .parse::<u64>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ConfigError::InvalidNumber { name })?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localhost_resolves() {
        let server = ServerConfig {
            host: "localhost".to_string(),
            port: 9000,
        };
        let addr = server.socket_addr().unwrap();
        assert_eq!(addr.port(), 9000);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_ip_literal_resolves() {
        let server = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert!(server.socket_addr().is_ok());
    }

    #[test]
    fn test_bad_host_rejected() {
        let server = ServerConfig {
            host: "solar.example".to_string(),
            port: 8080,
        };
        assert!(matches!(
            server.socket_addr().unwrap_err(),
            ConfigError::InvalidHost(_)
        ));
    }
}
