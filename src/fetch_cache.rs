use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};

use crate::http_client::Transport;

/// Time-boxed memo of API responses keyed by request path.
///
/// A fresh entry is served without touching the network. A stale or missing one
/// is refetched; if that fails the last known payload is served instead (even
/// when expired), or an empty JSON array when the path was never fetched.
///
/// The lock only guards map operations. Two concurrent misses on one path both
/// hit the network and the later write wins.
pub struct FetchCache {
    transport: Arc<dyn Transport>,
    ttl: Duration,
    capacity: usize,
    inner: Mutex<CacheMap>,
}

#[derive(Debug, Default)]
struct CacheMap {
    entries: HashMap<String, CacheEntry>,
    tick: u64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    fetched_at: Instant,
    last_used: u64,
    expired: bool,
}

impl FetchCache {
    pub fn new(transport: Arc<dyn Transport>, ttl: Duration, capacity: usize) -> Self {
        Self {
            transport,
            ttl,
            capacity: capacity.max(1),
            inner: Mutex::new(CacheMap::default()),
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("fetch cache lock poisoned")
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner
            .lock()
            .expect("fetch cache lock poisoned")
            .entries
            .contains_key(path)
    }

    pub fn get_or_fetch(&self, path: &str) -> Value {
        let now = Instant::now();
        let fallback = {
            let mut guard = self.inner.lock().expect("fetch cache lock poisoned");
            match guard.touch(path) {
                Some(entry)
                    if !entry.expired && now.duration_since(entry.fetched_at) < self.ttl =>
                {
                    debug!(path, "cache hit");
                    return entry.data.clone();
                }
                Some(entry) => Some(entry.data.clone()),
                None => None,
            }
        };

        match self.transport.get_json(path) {
            Ok(body) => {
                let data = unwrap_leaderboard(body);
                self.store(path, data.clone(), now);
                data
            }
            Err(err) => {
                warn!(path, error = %err, stale = fallback.is_some(), "fetch failed");
                fallback.unwrap_or_else(|| Value::Array(Vec::new()))
            }
        }
    }

    /// Forces the next `get_or_fetch` for `path` to hit the network. The old
    /// payload stays around as the failure fallback.
    pub fn expire(&self, path: &str) {
        let mut guard = self.inner.lock().expect("fetch cache lock poisoned");
        if let Some(entry) = guard.entries.get_mut(path) {
            entry.expired = true;
        }
    }

    fn store(&self, path: &str, data: Value, fetched_at: Instant) {
        let mut guard = self.inner.lock().expect("fetch cache lock poisoned");
        let last_used = guard.next_tick();
        guard.entries.insert(
            path.to_string(),
            CacheEntry {
                data,
                fetched_at,
                last_used,
                expired: false,
            },
        );
        while guard.entries.len() > self.capacity {
            let Some(victim) = guard.least_recently_used() else {
                break;
            };
            debug!(path = %victim, "cache evict");
            guard.entries.remove(&victim);
        }
    }
}

impl CacheMap {
    fn next_tick(&mut self) -> u64 {
        self.tick = self.tick.wrapping_add(1);
        self.tick
    }

    fn touch(&mut self, path: &str) -> Option<&CacheEntry> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(path)?;
        entry.last_used = tick;
        Some(entry)
    }

    fn least_recently_used(&self) -> Option<String> {
        self.entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(path, _)| path.clone())
    }
}

/// Leaderboard endpoints wrap their rows in `{ "leaderboard": [...] }`, others
/// return the payload bare. A falsy `leaderboard` member means "use the body".
pub fn unwrap_leaderboard(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("leaderboard") {
            Some(inner) if !is_falsy(&inner) => inner,
            Some(inner) => {
                map.insert("leaderboard".to_string(), inner);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leaderboard_member_is_unwrapped() {
        let body = json!({ "leaderboard": [{ "name": "a" }] });
        assert_eq!(unwrap_leaderboard(body), json!([{ "name": "a" }]));
    }

    #[test]
    fn empty_leaderboard_array_is_kept() {
        assert_eq!(unwrap_leaderboard(json!({ "leaderboard": [] })), json!([]));
    }

    #[test]
    fn null_leaderboard_falls_back_to_body() {
        let body = json!({ "leaderboard": null, "total": 3 });
        assert_eq!(unwrap_leaderboard(body.clone()), body);
    }

    #[test]
    fn bare_payload_passes_through() {
        let body = json!({ "avatarFull": "https://x/y.jpg" });
        assert_eq!(unwrap_leaderboard(body.clone()), body);
    }
}
