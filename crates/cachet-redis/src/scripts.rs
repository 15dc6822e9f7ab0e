//! Server-side Lua scripts for atomic bulk invalidation.
//!
//! A script executes atomically inside Redis: no command from another client
//! interleaves with a running script. That structural guarantee is what
//! makes these multi-key deletes race-safe without watch loops.

use redis::Script;

/// Deletes every key of one cache namespace, then the frozen marker.
///
/// `KEYS[1]` is the frozen marker key, `ARGV[1]` the namespace wildcard
/// (`P:*`). Matching keys are removed through an incremental SCAN loop so a
/// large namespace neither accumulates an unbounded reply nor blocks the
/// server on a single long pattern match.
const FLUSH: &str = r"
local cursor = 0
repeat
    local result = redis.call('SCAN', cursor, 'MATCH', ARGV[1])
    for _, key in ipairs(result[2]) do
        redis.call('DEL', key)
    end
    cursor = tonumber(result[1])
until cursor == 0

redis.call('DEL', KEYS[1])
";

/// Deletes every entry carrying one tag and repairs both indices.
///
/// `KEYS[1]` is the tag's member-set key, `ARGV[1]` the namespace prefix
/// (`P:`). For each member the entry payload is deleted, the identifier is
/// removed from every tag set it belongs to, and its own tag set is deleted.
/// Returns the number of identifiers that were members when the script
/// started. Members whose payload key is already gone are counted and
/// cleaned up all the same, which is what keeps stale tag memberships left
/// behind by `set` harmless.
const FLUSH_BY_TAG: &str = r"
local entries = redis.call('SMEMBERS', KEYS[1])
for _, entryIdentifier in ipairs(entries) do
    redis.call('DEL', ARGV[1]..'entry:'..entryIdentifier)
    local tags = redis.call('SMEMBERS', ARGV[1]..'tags:'..entryIdentifier)
    for _, tagName in ipairs(tags) do
        redis.call('SREM', ARGV[1]..'tag:'..tagName, entryIdentifier)
    end
    redis.call('DEL', ARGV[1]..'tags:'..entryIdentifier)
end
return #entries
";

pub(crate) fn flush_script() -> Script {
    Script::new(FLUSH)
}

pub(crate) fn flush_by_tag_script() -> Script {
    Script::new(FLUSH_BY_TAG)
}
