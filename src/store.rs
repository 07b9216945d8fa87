use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::{error, warn};

/// Pattern matching every key in the logical database.
pub const ALL_KEYS: &str = "*";

/// Result of a conditional write.
///
/// `Skipped` means the store answered but the write's precondition did not
/// hold (key already present for `set_if_absent`, key absent for
/// `set_if_present`). `Failed` means the store itself faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    Skipped,
    Failed,
}

/// The expiring key-value store the record service runs against.
///
/// Sentinel contract: no method ever surfaces a store fault to the caller.
/// Faults are logged here and reduced to `None`, `false`, an empty list or
/// `WriteOutcome::Failed`; the handler layer alone decides which HTTP error
/// a sentinel becomes.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the live value for `key`, or `None` when absent or on fault.
    /// Never touches the key's TTL.
    async fn get(&self, key: &str) -> Option<String>;

    /// Atomically writes `value` with `ttl_seconds` only if `key` is absent.
    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> WriteOutcome;

    /// Atomically writes `value` with a fresh `ttl_seconds` window only if
    /// `key` is already present. The previous remaining TTL is discarded.
    async fn set_if_present(&self, key: &str, value: &str, ttl_seconds: u64) -> WriteOutcome;

    /// True iff a live value is present for `key`. Never touches TTL.
    async fn exists(&self, key: &str) -> bool;

    /// Removes `key`; `false` when nothing was removed or on fault.
    async fn delete(&self, key: &str) -> bool;

    /// All keys matching a glob `pattern`, in store enumeration order.
    /// Empty on fault.
    async fn keys(&self, pattern: &str) -> Vec<String>;

    /// Connectivity probe.
    async fn ping(&self) -> bool;
}

/// Redis-backed store over a multiplexed `ConnectionManager`.
///
/// The manager is created once at startup by the composition root and the
/// handle is cloned into every request task; cloning is cheap and the
/// manager reconnects on its own after connection loss.
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await
        {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "GET failed");
                None
            }
        }
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> WriteOutcome {
        let mut conn = self.conn.clone();
        // SET .. EX .. NX answers OK when written, nil when the key exists.
        match redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds)
            .arg("NX")
            .query_async::<_, Option<String>>(&mut conn)
            .await
        {
            Ok(Some(_)) => WriteOutcome::Applied,
            Ok(None) => WriteOutcome::Skipped,
            Err(err) => {
                error!(key, error = %err, "SET NX failed");
                WriteOutcome::Failed
            }
        }
    }

    async fn set_if_present(&self, key: &str, value: &str, ttl_seconds: u64) -> WriteOutcome {
        let mut conn = self.conn.clone();
        match redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds)
            .arg("XX")
            .query_async::<_, Option<String>>(&mut conn)
            .await
        {
            Ok(Some(_)) => WriteOutcome::Applied,
            Ok(None) => WriteOutcome::Skipped,
            Err(err) => {
                error!(key, error = %err, "SET XX failed");
                WriteOutcome::Failed
            }
        }
    }

    async fn exists(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        match redis::cmd("EXISTS")
            .arg(key)
            .query_async::<_, i64>(&mut conn)
            .await
        {
            Ok(count) => count > 0,
            Err(err) => {
                warn!(key, error = %err, "EXISTS failed");
                false
            }
        }
    }

    async fn delete(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        match redis::cmd("DEL")
            .arg(key)
            .query_async::<_, i64>(&mut conn)
            .await
        {
            Ok(removed) => removed > 0,
            Err(err) => {
                error!(key, error = %err, "DEL failed");
                false
            }
        }
    }

    async fn keys(&self, pattern: &str) -> Vec<String> {
        let mut conn = self.conn.clone();
        match redis::cmd("KEYS")
            .arg(pattern)
            .query_async::<_, Vec<String>>(&mut conn)
            .await
        {
            Ok(keys) => keys,
            Err(err) => {
                warn!(pattern, error = %err, "KEYS failed");
                Vec::new()
            }
        }
    }

    async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        match redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
        {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "PING failed");
                false
            }
        }
    }
}

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory store with the same expiry semantics, for tests and local runs
/// without a Redis instance.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining TTL for a live key. Test hook for verifying TTL resets.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).and_then(|e| {
            if e.is_expired() {
                None
            } else {
                Some(e.expires_at - Instant::now())
            }
        })
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).and_then(|e| {
            if e.is_expired() {
                None
            } else {
                Some(e.value.clone())
            }
        })
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> WriteOutcome {
        let mut entries = self.entries.lock().unwrap();
        let live = entries.get(key).map(|e| !e.is_expired()).unwrap_or(false);
        if live {
            return WriteOutcome::Skipped;
        }
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        WriteOutcome::Applied
    }

    async fn set_if_present(&self, key: &str, value: &str, ttl_seconds: u64) -> WriteOutcome {
        let mut entries = self.entries.lock().unwrap();
        let live = entries.get(key).map(|e| !e.is_expired()).unwrap_or(false);
        if !live {
            return WriteOutcome::Skipped;
        }
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        WriteOutcome::Applied
    }

    async fn exists(&self, key: &str) -> bool {
        let entries = self.entries.lock().unwrap();
        entries.get(key).map(|e| !e.is_expired()).unwrap_or(false)
    }

    async fn delete(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();
        match entries.remove(key) {
            Some(entry) => !entry.is_expired(),
            None => false,
        }
    }

    async fn keys(&self, pattern: &str) -> Vec<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect()
    }

    async fn ping(&self) -> bool {
        true
    }
}

/// Minimal glob support: `*` alone, or a `prefix*` pattern. That covers the
/// administrative enumeration this service performs.
fn glob_match(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: u64 = 60;

    #[tokio::test]
    async fn test_set_if_absent_then_get() {
        let store = MemoryStore::new();
        assert_eq!(store.set_if_absent("k", "v", TTL).await, WriteOutcome::Applied);
        assert_eq!(store.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_set_if_absent_skips_live_key() {
        let store = MemoryStore::new();
        store.set_if_absent("k", "first", TTL).await;
        assert_eq!(
            store.set_if_absent("k", "second", TTL).await,
            WriteOutcome::Skipped
        );
        assert_eq!(store.get("k").await.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_set_if_present_requires_live_key() {
        let store = MemoryStore::new();
        assert_eq!(
            store.set_if_present("k", "v", TTL).await,
            WriteOutcome::Skipped
        );
        store.set_if_absent("k", "v", TTL).await;
        assert_eq!(
            store.set_if_present("k", "updated", TTL).await,
            WriteOutcome::Applied
        );
        assert_eq!(store.get("k").await.as_deref(), Some("updated"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let store = MemoryStore::new();
        store.set_if_absent("k", "v", 0).await;
        assert_eq!(store.get("k").await, None);
        assert!(!store.exists("k").await);
        // An expired key can be created again.
        assert_eq!(store.set_if_absent("k", "v2", TTL).await, WriteOutcome::Applied);
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let store = MemoryStore::new();
        store.set_if_absent("k", "v", TTL).await;
        assert!(store.delete("k").await);
        assert!(!store.delete("k").await);
    }

    #[tokio::test]
    async fn test_keys_enumeration() {
        let store = MemoryStore::new();
        store.set_if_absent("+791600000001", "a", TTL).await;
        store.set_if_absent("+791600000002", "b", TTL).await;
        store.set_if_absent("891600000003", "c", TTL).await;

        let mut all = store.keys(ALL_KEYS).await;
        all.sort();
        assert_eq!(all.len(), 3);

        let plus_only = store.keys("+7916*").await;
        assert_eq!(plus_only.len(), 2);
    }

    #[tokio::test]
    async fn test_ttl_remaining_visible() {
        let store = MemoryStore::new();
        store.set_if_absent("k", "v", TTL).await;
        let remaining = store.ttl_remaining("k").unwrap();
        assert!(remaining <= Duration::from_secs(TTL));
        assert!(remaining > Duration::from_secs(TTL - 5));
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("+7*", "+79161234567"));
        assert!(!glob_match("+7*", "89161234567"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exact-not"));
    }
}
