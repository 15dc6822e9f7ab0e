//! Connection establishment: direct TCP or Sentinel master discovery.
//!
//! The backend itself works on any pre-established [`redis::ConnectionLike`];
//! this module is the default way to obtain one from [`BackendOptions`].

use std::time::Duration;

use redis::sentinel::{SentinelClient, SentinelNodeConnectionInfo, SentinelServerType};
use redis::{Client, Connection, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use crate::config::{BackendOptions, sentinel_url};
use crate::error::Result;

/// Open a synchronous connection according to the configured options.
///
/// With a non-empty `sentinels` list the master of the configured `service`
/// is discovered through Sentinel; otherwise `hostname:port` is dialed
/// directly. Read/write timeouts apply to every subsequent round trip.
pub fn open(options: &BackendOptions) -> Result<Connection> {
    options.validate()?;
    let mut connection = if options.sentinels.is_empty() {
        open_direct(options)?
    } else {
        open_via_sentinel(options)?
    };
    if options.read_write_timeout_ms > 0 {
        let timeout = Duration::from_millis(options.read_write_timeout_ms);
        connection.set_read_timeout(Some(timeout))?;
        connection.set_write_timeout(Some(timeout))?;
    }
    Ok(connection)
}

fn open_direct(options: &BackendOptions) -> Result<Connection> {
    let client = Client::open(ConnectionInfo {
        addr: ConnectionAddr::Tcp(options.hostname.clone(), options.port),
        redis: redis_connection_info(options),
    })?;
    let connection = if options.timeout_ms > 0 {
        client.get_connection_with_timeout(Duration::from_millis(options.timeout_ms))?
    } else {
        client.get_connection()?
    };
    tracing::debug!(
        hostname = %options.hostname,
        port = options.port,
        database = options.database,
        "connected to redis"
    );
    Ok(connection)
}

fn open_via_sentinel(options: &BackendOptions) -> Result<Connection> {
    let addresses = options
        .sentinels
        .iter()
        .map(|address| sentinel_url(address))
        .collect::<Result<Vec<_>>>()?;
    let node_info = SentinelNodeConnectionInfo {
        tls_mode: None,
        redis_connection_info: Some(redis_connection_info(options)),
    };
    let mut client = SentinelClient::build(
        addresses,
        options.service.clone(),
        Some(node_info),
        SentinelServerType::Master,
    )?;
    let connection = client.get_connection()?;
    tracing::debug!(
        sentinels = options.sentinels.len(),
        service = %options.service,
        database = options.database,
        "connected to redis master via sentinel"
    );
    Ok(connection)
}

fn redis_connection_info(options: &BackendOptions) -> RedisConnectionInfo {
    RedisConnectionInfo {
        db: options.database,
        username: None,
        password: options.password.clone(),
        ..Default::default()
    }
}
