//! # cachet-redis
//!
//! A tagged, freezable cache backend on Redis, reachable directly or through
//! Sentinel-discovered masters.
//!
//! ## Overview
//!
//! The backend maps cache entries (identifier → byte payload, optional tags,
//! optional lifetime) onto plain Redis primitives and adds the two
//! guarantees application caches need but a key-value store does not give
//! natively:
//!
//! - **Tag-based bulk invalidation** — `flush_by_tag` deletes every entry
//!   carrying a tag, atomically, via a server-side script.
//! - **Freeze/thaw** — `freeze` strips expiry from all entries and rejects
//!   further writes until an explicit `flush`.
//!
//! Multi-key writes are made race-safe with optimistic WATCH/MULTI/EXEC
//! retry loops (`remove`, `freeze`) or server-side script atomicity
//! (`flush`, `flush_by_tag`); the dual tag indices (`tag:<t>` ⇄ `tags:<id>`)
//! are kept mutually consistent across those operations.
//!
//! ## Example
//!
//! ```ignore
//! use cachet_redis::{BackendOptions, RedisBackend};
//!
//! let options = BackendOptions {
//!     compression_level: 6,
//!     ..Default::default()
//! };
//! let mut backend = RedisBackend::new("pages", &options)?;
//!
//! backend.set("home", b"<html>...</html>", &["navigation", "frontpage"], Some(3600))?;
//! assert!(backend.get("home")?.is_some());
//!
//! // Invalidate everything that depends on the navigation.
//! let flushed = backend.flush_by_tag("navigation")?;
//! assert_eq!(flushed, 1);
//! ```
//!
//! ## Serialization
//!
//! Payloads are opaque bytes; serialization belongs to the caching front-end
//! that owns this backend. The only transform applied here is the optional
//! gzip compression (`compression_level` > 0), transparent on read.

pub mod backend;
pub mod config;
pub mod connect;
pub mod error;

mod codec;
mod iter;
mod keys;
mod reporter;
mod scripts;

pub use backend::RedisBackend;
pub use config::BackendOptions;
pub use error::{BackendError, Result};
pub use iter::Entries;

/// Oldest Redis server version the backend is known to work with (SCAN and
/// Lua scripting are required).
pub const MIN_REDIS_VERSION: &str = "2.8.0";
