use anyhow::{Result, ensure};
use cachet_redis::RedisBackend;

use crate::config;
use crate::output::{print_success, step};

const ENTRY_ID: &str = "cachet_verify_entry";
const TAG: &str = "cachet_verify_tag";

/// Exercise a configured backend end-to-end: set, get, get-by-tag, remove.
///
/// Uses reserved identifiers inside the cache's own namespace and removes
/// them again, so a verification run leaves production entries untouched.
pub fn run(config_path: &str, cache: &str) -> Result<()> {
    let config = config::load(config_path)?;
    let options = config::cache_options(&config, cache)?;

    let mut backend = step("Connecting", || Ok(RedisBackend::new(cache, options)?))?;

    let payload = format!("cachet verification payload for \"{cache}\"");
    step("Setting a tagged entry", || {
        Ok(backend.set(ENTRY_ID, payload.as_bytes(), &[TAG], Some(300))?)
    })?;

    step("Reading the entry back", || {
        let read = backend.get(ENTRY_ID)?;
        ensure!(
            read.as_deref() == Some(payload.as_bytes()),
            "payload read back does not match what was written"
        );
        Ok(())
    })?;

    step("Finding the entry by tag", || {
        let ids = backend.find_identifiers_by_tag(TAG)?;
        ensure!(
            ids.iter().any(|id| id == ENTRY_ID),
            "entry is not listed under its tag"
        );
        Ok(())
    })?;

    step("Removing the entry", || {
        backend.remove(ENTRY_ID)?;
        ensure!(
            backend.get(ENTRY_ID)?.is_none(),
            "entry is still readable after removal"
        );
        ensure!(
            backend.find_identifiers_by_tag(TAG)?.is_empty(),
            "tag still lists the removed entry"
        );
        Ok(())
    })?;

    print_success(&format!("Cache \"{cache}\" verified."));
    Ok(())
}
