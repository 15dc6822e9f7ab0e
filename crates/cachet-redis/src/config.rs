//! Backend construction options.

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, Result};

/// Construction options for [`RedisBackend`](crate::RedisBackend).
///
/// All fields default to a local unauthenticated Redis. When `sentinels` is
/// non-empty the backend connects through Redis Sentinel and `hostname` /
/// `port` are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendOptions {
    /// Redis server hostname (ignored in sentinel mode)
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Redis server port (ignored in sentinel mode)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Sentinel addresses, e.g. `["10.101.213.145:26379", "redis://10.101.213.146:26379"]`.
    /// Non-empty enables sentinel-based master discovery.
    #[serde(default)]
    pub sentinels: Vec<String>,

    /// Sentinel service (master set) name
    #[serde(default = "default_service")]
    pub service: String,

    /// Logical Redis database index
    #[serde(default)]
    pub database: i64,

    /// Password for the Redis server (and sentinel-discovered masters)
    #[serde(default)]
    pub password: Option<String>,

    /// Gzip level 0-9; 0 disables compression
    #[serde(default)]
    pub compression_level: u32,

    /// Lifetime in seconds applied when `set` is called without an explicit
    /// one; 0 means unlimited
    #[serde(default)]
    pub default_lifetime: u64,

    /// Log each distinct transport failure only once per process
    #[serde(default = "default_true")]
    pub deduplicate_errors: bool,

    /// Log transport failures at all (they are re-raised either way)
    #[serde(default = "default_true")]
    pub log_errors: bool,

    /// Connect timeout in milliseconds (0 = no limit)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Read/write timeout in milliseconds (0 = no limit)
    #[serde(default = "default_timeout_ms")]
    pub read_write_timeout_ms: u64,
}

fn default_hostname() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_service() -> String {
    "mymaster".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            port: default_port(),
            sentinels: Vec::new(),
            service: default_service(),
            database: 0,
            password: None,
            compression_level: 0,
            default_lifetime: 0,
            deduplicate_errors: default_true(),
            log_errors: default_true(),
            timeout_ms: default_timeout_ms(),
            read_write_timeout_ms: default_timeout_ms(),
        }
    }
}

impl BackendOptions {
    /// Check option shapes that cannot be expressed in the type system.
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > 9 {
            return Err(BackendError::configuration(format!(
                "compression_level must be between 0 and 9, got {}",
                self.compression_level
            )));
        }
        for sentinel in &self.sentinels {
            sentinel_url(sentinel)?;
        }
        Ok(())
    }
}

/// Normalize one sentinel address into a `redis://host:port` URL.
///
/// Accepts bare `host:port` as well as `tcp://` and `redis://` prefixed
/// addresses (the `tcp://` form is what older deployments carry in their
/// configuration).
pub(crate) fn sentinel_url(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(BackendError::configuration(
            "sentinel address must not be empty",
        ));
    }
    let host_port = if let Some(rest) = trimmed.strip_prefix("redis://") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("tcp://") {
        rest
    } else if trimmed.contains("://") {
        return Err(BackendError::configuration(format!(
            "unsupported scheme in sentinel address \"{trimmed}\""
        )));
    } else {
        trimmed
    };
    let (host, port) = host_port.rsplit_once(':').ok_or_else(|| {
        BackendError::configuration(format!(
            "sentinel address \"{trimmed}\" must have the shape host:port"
        ))
    })?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return Err(BackendError::configuration(format!(
            "sentinel address \"{trimmed}\" must have the shape host:port"
        )));
    }
    Ok(format!("redis://{host}:{port}"))
}
