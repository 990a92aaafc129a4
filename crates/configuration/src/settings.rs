use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub covers: CoverConfig,
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// The single-file SQLite catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the database file, relative to the working directory.
    pub path: PathBuf,
    pub max_connections: u32,
}

/// The third-party cover-image lookup used by the catalog page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    /// When `false`, the catalog is rendered without cover images and no
    /// outbound requests are made.
    pub enabled: bool,
    pub base_url: String,
    /// Upper bound for a single lookup, in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of lookups in flight for one catalog request.
    pub concurrency: usize,
    /// Remember lookup results (hits and misses) between page views.
    pub cache: bool,
    /// How long a remembered result is trusted, in seconds.
    pub cache_ttl_secs: u64,
    /// Maximum number of remembered results; the oldest is evicted first.
    pub cache_capacity: usize,
}

// --- Default Implementations ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("library.sqlite"),
            max_connections: 5,
        }
    }
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://covers.openlibrary.org".to_string(),
            timeout_ms: 3000,
            concurrency: 8,
            cache: true,
            cache_ttl_secs: 3600,
            cache_capacity: 1024,
        }
    }
}

impl ServerConfig {
    /// The `host:port` string the listener binds to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl CoverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Settings {
    /// Rejects values that would leave the application unable to serve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError("server.port must not be 0".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.covers.enabled {
            if self.covers.concurrency == 0 {
                return Err(ConfigError::ValidationError(
                    "covers.concurrency must be at least 1".to_string(),
                ));
            }
            if self.covers.base_url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "covers.base_url must be set when covers are enabled".to_string(),
                ));
            }
        }
        Ok(())
    }
}
