//! Key namespace construction.
//!
//! Every piece of backend state lives in Redis under a per-cache prefix,
//! joined with `:`. The five suffixes built here (`entry:`, `tag:`, `tags:`,
//! `entries`, `frozen`) are the persisted, wire-visible contract: changing
//! them breaks compatibility with data written by existing deployments.

/// Builds namespaced Redis keys for one cache backend.
///
/// Entry identifiers and tag names are used verbatim. The delimiter is `:`;
/// identifiers and tags are not sanitized here, so callers must not use
/// values that produce a colliding prefix (e.g. a tag named `s:x` colliding
/// with the `tags:` suffix namespace).
#[derive(Debug, Clone)]
pub(crate) struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(cache_identifier: &str) -> Self {
        Self {
            prefix: format!("{cache_identifier}:"),
        }
    }

    /// Payload key for one entry: `P:entry:<id>`.
    pub fn entry(&self, id: &str) -> String {
        format!("{}entry:{id}", self.prefix)
    }

    /// Set of tags attached to one entry: `P:tags:<id>`.
    pub fn entry_tags(&self, id: &str) -> String {
        format!("{}tags:{id}", self.prefix)
    }

    /// Set of entry identifiers carrying one tag: `P:tag:<tag>`.
    pub fn tag(&self, tag: &str) -> String {
        format!("{}tag:{tag}", self.prefix)
    }

    /// Insertion-ordered list of live entry identifiers: `P:entries`.
    pub fn entries(&self) -> String {
        format!("{}entries", self.prefix)
    }

    /// Frozen marker key: `P:frozen`.
    pub fn frozen(&self) -> String {
        format!("{}frozen", self.prefix)
    }

    /// Wildcard matching every key of this cache: `P:*`.
    pub fn wildcard(&self) -> String {
        format!("{}*", self.prefix)
    }

    /// Wildcard matching every entry payload key: `P:entry:*`.
    pub fn entry_wildcard(&self) -> String {
        format!("{}entry:*", self.prefix)
    }

    /// The bare namespace prefix `P:`, as passed to server-side scripts.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Byte length of the part of a payload key preceding the identifier.
    pub fn entry_prefix_len(&self) -> usize {
        self.prefix.len() + "entry:".len()
    }
}
