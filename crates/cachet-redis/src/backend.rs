//! The cache backend: entry storage, dual tag indices, freeze/thaw and bulk
//! invalidation on a single Redis connection.

use redis::{Commands, Connection, ConnectionLike, Script};

use crate::codec::PayloadCodec;
use crate::config::BackendOptions;
use crate::connect;
use crate::error::{BackendError, Result};
use crate::iter::Entries;
use crate::keys::KeySpace;
use crate::reporter::FailureReporter;
use crate::scripts;

/// How many keys one SCAN round trip asks for during iteration.
pub(crate) const SCAN_BATCH: usize = 100;

/// A tagged, freezable cache backend on Redis.
///
/// ## Key layout
///
/// All state lives under the cache identifier prefix `P`:
///
/// | Key             | Type   | Meaning                                    |
/// |-----------------|--------|--------------------------------------------|
/// | `P:entry:<id>`  | string | compressed-or-raw payload, optional TTL    |
/// | `P:tags:<id>`   | set    | tags attached to entry `<id>`              |
/// | `P:tag:<tag>`   | set    | entries carrying `<tag>`                   |
/// | `P:entries`     | list   | insertion-order record of live entry ids   |
/// | `P:frozen`      | string | present ⇒ backend is frozen                |
///
/// ## Concurrency
///
/// One synchronous connection per instance; every operation is a blocking
/// round trip or a bounded sequence of them. [`remove`](Self::remove) and
/// [`freeze`](Self::freeze) use optimistic WATCH/MULTI/EXEC loops, retried
/// until the commit goes through on an unchanged snapshot.
/// [`flush`](Self::flush) and [`flush_by_tag`](Self::flush_by_tag) run as
/// atomic server-side scripts. [`set`](Self::set) commits a plain MULTI/EXEC
/// pipeline without watch protection; two concurrent `set` calls for the
/// same identifier can leave stale tag memberships behind (see `set`).
pub struct RedisBackend<C = Connection> {
    cache_identifier: String,
    connection: C,
    keys: KeySpace,
    codec: PayloadCodec,
    reporter: FailureReporter,
    default_lifetime: u64,
    frozen: Option<bool>,
    flush_script: Script,
    flush_by_tag_script: Script,
}

impl RedisBackend<Connection> {
    /// Connect according to `options` and construct the backend.
    pub fn new(cache_identifier: impl Into<String>, options: &BackendOptions) -> Result<Self> {
        let connection = connect::open(options)?;
        Ok(Self::with_connection(cache_identifier, connection, options))
    }
}

impl<C: ConnectionLike> RedisBackend<C> {
    /// Construct the backend on a pre-established connection (or any other
    /// [`ConnectionLike`], e.g. a mock in tests). Transport options in
    /// `options` are ignored here; codec, lifetime and error reporting
    /// options still apply.
    pub fn with_connection(
        cache_identifier: impl Into<String>,
        connection: C,
        options: &BackendOptions,
    ) -> Self {
        let cache_identifier = cache_identifier.into();
        Self {
            keys: KeySpace::new(&cache_identifier),
            codec: PayloadCodec::new(options.compression_level),
            reporter: FailureReporter::new(options.log_errors, options.deduplicate_errors),
            default_lifetime: options.default_lifetime,
            frozen: None,
            flush_script: scripts::flush_script(),
            flush_by_tag_script: scripts::flush_by_tag_script(),
            connection,
            cache_identifier,
        }
    }

    pub fn cache_identifier(&self) -> &str {
        &self.cache_identifier
    }

    /// Store an entry, replacing the payload, lifetime and `entries` record
    /// of any previous entry with the same identifier.
    ///
    /// Without an explicit `lifetime` the configured default applies; an
    /// effective lifetime of 0 means no expiry. Payload write, `entries`
    /// list upkeep and tag index additions commit as one MULTI/EXEC
    /// pipeline.
    ///
    /// Tags carried by a previous `set` of the same identifier are *not*
    /// diffed away: re-setting an entry with a different tag list leaves its
    /// old memberships in their `tag:` sets until the entry is removed or
    /// flushed. Kept for compatibility with existing deployments;
    /// `flush_by_tag` tolerates such members and cleans them up.
    pub fn set(
        &mut self,
        id: &str,
        data: &[u8],
        tags: &[&str],
        lifetime: Option<u64>,
    ) -> Result<()> {
        self.ensure_not_frozen()?;
        let payload = self.codec.encode(data)?;
        let lifetime = lifetime.unwrap_or(self.default_lifetime);

        let mut pipe = redis::pipe();
        pipe.atomic();
        if lifetime > 0 {
            pipe.set_ex(self.keys.entry(id), payload.as_slice(), lifetime)
                .ignore();
        } else {
            pipe.set(self.keys.entry(id), payload.as_slice()).ignore();
        }
        pipe.lrem(self.keys.entries(), 0, id).ignore();
        pipe.rpush(self.keys.entries(), id).ignore();
        for tag in tags {
            pipe.sadd(self.keys.tag(tag), id).ignore();
            pipe.sadd(self.keys.entry_tags(id), *tag).ignore();
        }
        let result = pipe.query::<()>(&mut self.connection);
        self.guard(result)?;
        tracing::debug!(
            cache = %self.cache_identifier,
            id = %id,
            tags = tags.len(),
            lifetime,
            "cache entry set"
        );
        Ok(())
    }

    /// Load an entry's payload, decoded. `None` when no entry exists under
    /// `id`; loading never fails on a missing entry.
    pub fn get(&mut self, id: &str) -> Result<Option<Vec<u8>>> {
        let key = self.keys.entry(id);
        let result: redis::RedisResult<Option<Vec<u8>>> = self.connection.get(&key);
        let stored = self.guard(result)?;
        Ok(self.codec.decode(stored)?)
    }

    /// Whether an entry exists under `id`. Checks the payload key only; the
    /// tag indices are not consulted.
    pub fn has(&mut self, id: &str) -> Result<bool> {
        let key = self.keys.entry(id);
        let result: redis::RedisResult<bool> = self.connection.exists(&key);
        self.guard(result)
    }

    /// Remove an entry together with all of its tag index state.
    ///
    /// `tags:<id>` is watched while its members are read; the commit
    /// (delete payload, remove the id from every tag set, delete the tag
    /// set) aborts and retries from the read whenever a concurrent writer
    /// touched the watched key, so the cleanup always acts on a tag snapshot
    /// no other writer invalidated. Retries indefinitely until a commit goes
    /// through. Removing a nonexistent identifier is a successful no-op;
    /// completion always yields `true`.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        self.ensure_not_frozen()?;
        let entry_key = self.keys.entry(id);
        let tags_key = self.keys.entry_tags(id);
        let keys = self.keys.clone();
        let result = redis::transaction(
            &mut self.connection,
            &[tags_key.as_str()],
            |connection, pipe| {
                let tags: Vec<String> = connection.smembers(&tags_key)?;
                pipe.del(&entry_key).ignore();
                for tag in &tags {
                    pipe.srem(keys.tag(tag), id).ignore();
                }
                pipe.del(&tags_key).ignore();
                pipe.query(connection)
            },
        );
        let () = self.guard(result)?;
        tracing::debug!(cache = %self.cache_identifier, id = %id, "cache entry removed");
        Ok(true)
    }

    /// Freeze the backend: strip expiry from every recorded entry and set
    /// the frozen marker, as one watched transaction over the `entries`
    /// list (retried when a concurrent writer changes the list mid-freeze).
    ///
    /// A frozen backend rejects `set`, `remove` and further `freeze` calls;
    /// only [`flush`](Self::flush) thaws it.
    pub fn freeze(&mut self) -> Result<()> {
        if self.is_frozen()? {
            return Err(BackendError::already_frozen(&self.cache_identifier));
        }
        let entries_key = self.keys.entries();
        let frozen_key = self.keys.frozen();
        let keys = self.keys.clone();
        let result = redis::transaction(
            &mut self.connection,
            &[entries_key.as_str()],
            |connection, pipe| {
                let ids: Vec<String> = connection.lrange(&entries_key, 0, -1)?;
                for id in &ids {
                    pipe.persist(keys.entry(id)).ignore();
                }
                pipe.set(&frozen_key, 1).ignore();
                pipe.query(connection)
            },
        );
        let () = self.guard(result)?;
        self.frozen = Some(true);
        tracing::debug!(cache = %self.cache_identifier, "backend frozen");
        Ok(())
    }

    /// Whether the backend is frozen.
    ///
    /// Derived lazily from the frozen marker key and cached for this
    /// instance's lifetime: a freeze or flush performed through another
    /// instance is not observed here until a fresh instance asks Redis
    /// again. Callers needing authoritative freshness must not reuse a
    /// long-lived instance across flush boundaries crossed by another actor.
    pub fn is_frozen(&mut self) -> Result<bool> {
        if let Some(frozen) = self.frozen {
            return Ok(frozen);
        }
        let key = self.keys.frozen();
        let result: redis::RedisResult<bool> = self.connection.exists(&key);
        let frozen = self.guard(result)?;
        self.frozen = Some(frozen);
        Ok(frozen)
    }

    /// Delete every key of this cache's namespace and clear the frozen
    /// marker, as a single atomic server-side script.
    ///
    /// Has no precondition: flushing works on a frozen backend and is the
    /// only mutation a frozen backend accepts (it is also the only way to
    /// thaw one).
    pub fn flush(&mut self) -> Result<()> {
        let result = self
            .flush_script
            .key(self.keys.frozen())
            .arg(self.keys.wildcard())
            .invoke::<()>(&mut self.connection);
        self.guard(result)?;
        self.frozen = None;
        tracing::debug!(cache = %self.cache_identifier, "cache flushed");
        Ok(())
    }

    /// Remove every entry carrying `tag` and repair both indices, as one
    /// atomic server-side script. Returns the number of identifiers that
    /// were members of the tag set when the script started.
    pub fn flush_by_tag(&mut self, tag: &str) -> Result<u64> {
        self.ensure_not_frozen()?;
        let result = self
            .flush_by_tag_script
            .key(self.keys.tag(tag))
            .arg(self.keys.prefix())
            .invoke::<u64>(&mut self.connection);
        let count = self.guard(result)?;
        tracing::debug!(
            cache = %self.cache_identifier,
            tag = %tag,
            count,
            "flushed entries by tag"
        );
        Ok(count)
    }

    /// Apply [`flush_by_tag`](Self::flush_by_tag) to each tag in turn.
    ///
    /// Not atomic across tags: a crash or concurrent writer between two
    /// calls leaves earlier tags flushed and later ones untouched. The
    /// returned total accumulates the per-tag counts as a convenience and
    /// carries the same weak consistency.
    pub fn flush_by_tags(&mut self, tags: &[&str]) -> Result<u64> {
        let mut total = 0;
        for tag in tags {
            total += self.flush_by_tag(tag)?;
        }
        Ok(total)
    }

    /// All identifiers currently carrying `tag`.
    pub fn find_identifiers_by_tag(&mut self, tag: &str) -> Result<Vec<String>> {
        let key = self.keys.tag(tag);
        let result: redis::RedisResult<Vec<String>> = self.connection.smembers(&key);
        self.guard(result)
    }

    /// Lazily enumerate all live `(identifier, payload)` pairs of this
    /// cache. See [`Entries`] for the consistency caveats.
    pub fn entries(&mut self) -> Entries<'_, C> {
        Entries::new(self)
    }

    /// One SCAN batch of entry identifiers, starting at `cursor`.
    pub(crate) fn scan_entry_keys(&mut self, cursor: u64) -> Result<(u64, Vec<String>)> {
        let pattern = self.keys.entry_wildcard();
        let result = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(&pattern)
            .arg("COUNT")
            .arg(SCAN_BATCH)
            .query::<(u64, Vec<String>)>(&mut self.connection);
        let (next_cursor, keys) = self.guard(result)?;
        let prefix_len = self.keys.entry_prefix_len();
        let ids = keys
            .into_iter()
            .map(|key| key[prefix_len..].to_string())
            .collect();
        Ok((next_cursor, ids))
    }

    fn ensure_not_frozen(&mut self) -> Result<()> {
        if self.is_frozen()? {
            return Err(BackendError::frozen(&self.cache_identifier));
        }
        Ok(())
    }

    /// Route a raw Redis result through the failure reporter. Transport
    /// failures are logged (subject to deduplication) and always re-raised.
    fn guard<T>(&self, result: redis::RedisResult<T>) -> Result<T> {
        result.map_err(|error| {
            self.reporter.report(&self.cache_identifier, &error);
            BackendError::from(error)
        })
    }
}
