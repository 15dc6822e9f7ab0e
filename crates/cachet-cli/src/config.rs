use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use cachet_redis::BackendOptions;
use serde::Deserialize;

/// The diagnostic configuration file: one backend options block per cache.
///
/// ```toml
/// [caches.pages]
/// hostname = "redis.internal"
/// compression_level = 6
///
/// [caches.sessions]
/// sentinels = ["10.0.3.1:26379", "10.0.3.2:26379"]
/// service = "mymaster"
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub caches: BTreeMap<String, BackendOptions>,
}

pub fn load(path: &str) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read configuration file {path}"))?;
    let config: ConfigFile =
        toml::from_str(&content).with_context(|| format!("cannot parse {path}"))?;
    Ok(config)
}

pub fn cache_options<'a>(config: &'a ConfigFile, cache: &str) -> Result<&'a BackendOptions> {
    config.caches.get(cache).with_context(|| {
        let known: Vec<_> = config.caches.keys().cloned().collect();
        if known.is_empty() {
            format!("cache \"{cache}\" is not configured (the configuration file is empty)")
        } else {
            format!(
                "cache \"{cache}\" is not configured; known caches: {}",
                known.join(", ")
            )
        }
    })
}
