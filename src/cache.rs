//! Tenant view cache
//!
//! A small LRU cache for rendered tenant-scoped views (org chart subtrees,
//! dashboard aggregates). Entries are keyed by `(tenant, key)`; mutations
//! invalidate by key prefix after commit, so a stale view never outlives the
//! write that obsoleted it.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use metrics::counter;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Cache key prefix for employee list views
pub const KEY_EMPLOYEES: &str = "employees";
/// Cache key prefix for org chart views
pub const KEY_ORG_CHART: &str = "org-chart";
/// Cache key prefix for admin dashboard aggregates
pub const KEY_DASHBOARD_STATS: &str = "dashboard-stats";

/// LRU-backed cache of rendered tenant views
pub struct TenantViewCache {
    inner: Mutex<LruCache<(Uuid, String), JsonValue>>,
}

impl TenantViewCache {
    /// Create a cache bounded to `capacity` entries; capacity is clamped to
    /// at least one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to >= 1");
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up a cached view.
    pub fn get(&self, tenant_id: Uuid, key: &str) -> Option<JsonValue> {
        let mut cache = self.inner.lock().expect("view cache lock poisoned");
        let hit = cache.get(&(tenant_id, key.to_string())).cloned();
        if hit.is_some() {
            counter!("tenant_view_cache_hits_total").increment(1);
        } else {
            counter!("tenant_view_cache_misses_total").increment(1);
        }
        hit
    }

    /// Store a rendered view.
    pub fn put(&self, tenant_id: Uuid, key: &str, value: JsonValue) {
        let mut cache = self.inner.lock().expect("view cache lock poisoned");
        cache.put((tenant_id, key.to_string()), value);
    }

    /// Drop every cached view for the tenant whose key starts with one of
    /// the given prefixes.
    pub fn invalidate(&self, tenant_id: Uuid, prefixes: &[&str]) {
        let mut cache = self.inner.lock().expect("view cache lock poisoned");

        let stale: Vec<(Uuid, String)> = cache
            .iter()
            .filter(|((tenant, key), _)| {
                *tenant == tenant_id && prefixes.iter().any(|prefix| key.starts_with(prefix))
            })
            .map(|(entry_key, _)| entry_key.clone())
            .collect();

        for entry_key in stale {
            cache.pop(&entry_key);
            counter!("tenant_view_cache_invalidations_total").increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_get_roundtrip() {
        let cache = TenantViewCache::new(8);
        let tenant = Uuid::new_v4();

        assert!(cache.get(tenant, "org-chart:root").is_none());
        cache.put(tenant, "org-chart:root", json!(["a", "b"]));
        assert_eq!(cache.get(tenant, "org-chart:root"), Some(json!(["a", "b"])));
    }

    #[test]
    fn test_invalidate_by_prefix_is_tenant_scoped() {
        let cache = TenantViewCache::new(8);
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();

        cache.put(tenant_a, "org-chart:x", json!(1));
        cache.put(tenant_a, "employees", json!(2));
        cache.put(tenant_b, "org-chart:x", json!(3));

        cache.invalidate(tenant_a, &[KEY_ORG_CHART]);

        assert!(cache.get(tenant_a, "org-chart:x").is_none());
        assert_eq!(cache.get(tenant_a, "employees"), Some(json!(2)));
        // Other tenants are untouched.
        assert_eq!(cache.get(tenant_b, "org-chart:x"), Some(json!(3)));
    }

    #[test]
    fn test_lru_eviction() {
        let cache = TenantViewCache::new(2);
        let tenant = Uuid::new_v4();

        cache.put(tenant, "a", json!(1));
        cache.put(tenant, "b", json!(2));
        cache.put(tenant, "c", json!(3));

        assert!(cache.get(tenant, "a").is_none());
        assert_eq!(cache.get(tenant, "c"), Some(json!(3)));
    }
}
