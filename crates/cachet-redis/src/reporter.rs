//! Deduplicated reporting of store failures.
//!
//! Every Redis round trip is routed through a [`FailureReporter`]: transport
//! failures are logged, and with deduplication enabled each distinct error
//! text is logged only once per process, shared across all backend instances
//! (the set exists to suppress log floods, so it is process-wide, not
//! per-instance). The failure itself is always propagated to the caller;
//! this component only controls log volume.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

use sha2::{Digest, Sha256};

fn logged_errors() -> &'static Mutex<HashSet<String>> {
    static LOGGED_ERRORS: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    LOGGED_ERRORS.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Stable fingerprint of an error text.
fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Marks a fingerprint as reported; `true` on first sight.
fn first_occurrence(fingerprint: String) -> bool {
    let mut seen = match logged_errors().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    seen.insert(fingerprint)
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FailureReporter {
    log_errors: bool,
    deduplicate: bool,
}

impl FailureReporter {
    pub fn new(log_errors: bool, deduplicate: bool) -> Self {
        Self {
            log_errors,
            deduplicate,
        }
    }

    /// Log a transport failure for `cache`, unless an identical one was
    /// already reported since process start. Never affects propagation; the
    /// caller re-raises the error regardless of what happens here.
    pub fn report(&self, cache: &str, error: &redis::RedisError) {
        if !self.log_errors {
            return;
        }
        if self.deduplicate && !first_occurrence(fingerprint(&error.to_string())) {
            return;
        }
        tracing::error!(cache = %cache, error = %error, "redis operation failed");
    }
}
