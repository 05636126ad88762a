//! Time-boxed memoization shared by the recommendation generator and the
//! store adapters. One instance per concern (each with its own TTL) is built
//! at bootstrap and passed by reference; there are no ambient globals.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug)]
struct CacheEntry {
    payload: Value,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached payload if it is still inside the TTL window.
    /// An expired entry counts as a miss and is evicted on this lookup.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Idempotent overwrite by key; concurrent writers for the same key are
    /// content-addressed so last-write-wins is safe.
    pub fn insert(&self, key: impl Into<String>, payload: Value) {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.into(), CacheEntry { payload, inserted_at: Instant::now() });
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|payload| serde_json::from_value(payload).ok())
    }

    pub fn insert_as<T: Serialize>(&self, key: impl Into<String>, payload: &T) {
        if let Ok(value) = serde_json::to_value(payload) {
            self.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn backdate(&self, key: &str, age: Duration) {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(entry) = entries.get_mut(key) {
            entry.inserted_at = Instant::now() - age;
        }
    }
}

/// Stable in-process key over the effective request parameters. Parts are
/// serialized to JSON first so the key reflects values, not memory layout.
pub fn cache_key<T: Serialize>(namespace: &str, parts: &T) -> String {
    let serialized = serde_json::to_string(parts).unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    namespace.hash(&mut hasher);
    serialized.hash(&mut hasher);
    format!("{namespace}:{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::{cache_key, ResultCache};

    #[test]
    fn round_trip_returns_the_identical_value_inside_the_ttl() {
        let cache = ResultCache::new(Duration::from_secs(60));
        let payload = json!({"gifts": [{"category": "Gifts"}]});
        cache.insert("k", payload.clone());
        assert_eq!(cache.get("k"), Some(payload));
    }

    #[test]
    fn expired_entries_miss_and_are_evicted_lazily() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.insert("k", json!(1));
        cache.backdate("k", Duration::from_secs(61));

        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty(), "expired entry should be gone after the missed lookup");
    }

    #[test]
    fn overwrite_by_key_replaces_the_payload() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.insert("k", json!("first"));
        cache.insert("k", json!("second"));
        assert_eq!(cache.get("k"), Some(json!("second")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn typed_accessors_round_trip_through_json() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.insert_as("k", &vec!["a".to_string(), "b".to_string()]);
        assert_eq!(cache.get_as::<Vec<String>>("k"), Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(cache.get_as::<u32>("k"), None);
    }

    #[test]
    fn keys_depend_on_namespace_and_value() {
        let a = cache_key("products", &("jarir", "wireless headphones"));
        let b = cache_key("products", &("jarir", "wireless headphones"));
        let c = cache_key("products", &("jarir", "keyboard"));
        let d = cache_key("gifts", &("jarir", "wireless headphones"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }
}
