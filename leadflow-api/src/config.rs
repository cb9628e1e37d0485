//! API Configuration Module
//!
//! Server-level settings: bind address, CORS, static assets and the
//! administrative reset switch. Loaded from environment variables with
//! defaults suited to local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::constants::{DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_PORT};
use crate::error::{ApiError, ApiResult};

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind (default `0.0.0.0`).
    pub bind_host: String,

    /// Port to listen on (default 5000).
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Directory served for non-API paths (the web client), if any.
    pub static_dir: Option<PathBuf>,

    /// Whether `POST /api/reset-database` is enabled.
    pub allow_reset: bool,

    /// Deployment environment name (`development`, `production`, ...).
    pub environment: String,

    /// Create missing tables at startup.
    pub bootstrap_schema: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(), // Empty = allow all
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            static_dir: None,
            allow_reset: true,
            environment: "development".to_string(),
            bootstrap_schema: true,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `LEADFLOW_API_BIND`: Interface to bind (default: 0.0.0.0)
    /// - `PORT` / `LEADFLOW_API_PORT`: Listen port (default: 5000)
    /// - `LEADFLOW_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `LEADFLOW_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `LEADFLOW_STATIC_DIR`: Directory with the web client (default: none)
    /// - `LEADFLOW_ENVIRONMENT`: Deployment environment (default: development)
    /// - `LEADFLOW_ALLOW_RESET`: "true"/"false"; defaults to false in production
    /// - `LEADFLOW_SKIP_BOOTSTRAP`: "true" to skip table creation at startup
    pub fn from_env() -> Self {
        let environment =
            std::env::var("LEADFLOW_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("LEADFLOW_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let cors_origins = std::env::var("LEADFLOW_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("LEADFLOW_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CORS_MAX_AGE_SECS);

        let static_dir = std::env::var("LEADFLOW_STATIC_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let allow_reset = std::env::var("LEADFLOW_ALLOW_RESET")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or_else(|| !is_production(&environment));

        let bootstrap_schema = std::env::var("LEADFLOW_SKIP_BOOTSTRAP")
            .map(|s| s.to_lowercase() != "true")
            .unwrap_or(true);

        Self {
            bind_host: std::env::var("LEADFLOW_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            cors_origins,
            cors_max_age_secs,
            static_dir,
            allow_reset,
            environment,
            bootstrap_schema,
        }
    }

    /// Check if running in a production environment.
    pub fn is_production(&self) -> bool {
        is_production(&self.environment)
    }

    /// Resolve the socket address to bind.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::internal_error(format!("Invalid bind address {}: {}", addr, e))
        })
    }
}

fn is_production(environment: &str) -> bool {
    matches!(environment.to_lowercase().as_str(), "production" | "prod")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 5000);
        assert!(config.cors_origins.is_empty());
        assert!(config.allow_reset);
        assert!(!config.is_production());
    }

    #[test]
    fn test_bind_addr() {
        let config = ApiConfig {
            bind_host: "127.0.0.1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.bind_addr().unwrap().port(), 8080);

        let config = ApiConfig {
            bind_host: "not an address".to_string(),
            ..Default::default()
        };
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn test_production_detection() {
        let config = ApiConfig {
            environment: "Production".to_string(),
            ..Default::default()
        };
        assert!(config.is_production());
    }
}
