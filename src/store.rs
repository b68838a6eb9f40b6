use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shard count used by [`ShardedStore::new`].
pub const DEFAULT_SHARDS: usize = 32;

/// String keys mapped to string values, spread over a fixed number of
/// independently locked shards.
///
/// A key always lands in the shard picked by [`ShardedStore::shard_index`],
/// so every operation takes exactly one lock and no two operations ever
/// wait on each other unless their keys share a shard.
pub struct ShardedStore {
    shards: Vec<Mutex<HashMap<String, String>>>,
}

impl ShardedStore {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Creates a store with `num_shards` empty shards (at least one).
    ///
    /// The count is fixed for the lifetime of the store; keys written under
    /// one count are not findable under another.
    pub fn with_shards(num_shards: usize) -> Self {
        let num_shards = num_shards.max(1);
        let mut shards = Vec::with_capacity(num_shards);
        for _ in 0..num_shards {
            shards.push(Mutex::new(HashMap::new()));
        }
        ShardedStore { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// CRC32C of the key bytes, modulo the shard count.
    pub fn shard_index(&self, key: &str) -> usize {
        crc32c::crc32c(key.as_bytes()) as usize % self.shards.len()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let shard = self.lock_shard(key);
        shard.get(key).cloned()
    }

    /// Inserts `value` under `key`, overwriting whatever was there.
    pub fn set(&self, key: String, value: String) {
        let mut shard = self.lock_shard(&key);
        shard.insert(key, value);
    }

    fn lock_shard(&self, key: &str) -> MutexGuard<'_, HashMap<String, String>> {
        // a panic while holding a shard lock cannot leave the map half written
        self.shards[self.shard_index(key)]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ShardedStore {
    fn default() -> Self {
        Self::new()
    }
}
