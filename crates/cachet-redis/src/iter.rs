//! Lazy iteration over all live entries of a cache namespace.

use std::collections::VecDeque;

use redis::ConnectionLike;

use crate::backend::RedisBackend;
use crate::error::Result;

/// Lazy cursor over the `(identifier, payload)` pairs of one cache,
/// produced by a batched keyspace SCAN over `P:entry:*`.
///
/// Weakly consistent: entries created or removed while the scan runs may or
/// may not be observed (SCAN guarantees neither a snapshot nor exactly-once
/// delivery), and an identifier whose payload disappears between the SCAN
/// batch and the read is skipped silently. The cursor is not restartable;
/// obtain a fresh one from [`RedisBackend::entries`] for another pass.
pub struct Entries<'a, C: ConnectionLike> {
    backend: &'a mut RedisBackend<C>,
    cursor: u64,
    buffered: VecDeque<String>,
    exhausted: bool,
}

impl<'a, C: ConnectionLike> Entries<'a, C> {
    pub(crate) fn new(backend: &'a mut RedisBackend<C>) -> Self {
        Self {
            backend,
            cursor: 0,
            buffered: VecDeque::new(),
            exhausted: false,
        }
    }
}

impl<C: ConnectionLike> Iterator for Entries<'_, C> {
    type Item = Result<(String, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.buffered.pop_front() {
                match self.backend.get(&id) {
                    Ok(Some(payload)) => return Some(Ok((id, payload))),
                    // Removed since the SCAN batch was fetched.
                    Ok(None) => continue,
                    Err(error) => return Some(Err(error)),
                }
            }
            if self.exhausted {
                return None;
            }
            match self.backend.scan_entry_keys(self.cursor) {
                Ok((next_cursor, ids)) => {
                    self.cursor = next_cursor;
                    if next_cursor == 0 {
                        self.exhausted = true;
                    }
                    self.buffered.extend(ids);
                }
                Err(error) => {
                    self.exhausted = true;
                    return Some(Err(error));
                }
            }
        }
    }
}
