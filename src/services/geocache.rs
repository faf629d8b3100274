use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

/// Cached resource values are considered fresh for 30 days.
pub const CACHE_TTL_DAYS: i64 = 30;

/// Cache key: a coordinate rounded to 4 decimal places (~11 m). Coordinates
/// inside the same bucket deliberately share one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_e4: i64,
    lon_e4: i64,
}

impl CacheKey {
    pub fn from_coord(latitude: f64, longitude: f64) -> Self {
        Self {
            lat_e4: (latitude * 10_000.0).round() as i64,
            lon_e4: (longitude * 10_000.0).round() as i64,
        }
    }
}

/// Whether a value came out of the cache or from a fresh upstream fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    created_at: DateTime<Utc>,
    payload: V,
}

/// Coordinate-keyed TTL cache shared by the weather-dependent assessments.
///
/// An entry is a hit only while its age is strictly below the TTL; expired
/// entries are not purged, only overwritten by the next successful fetch for
/// the same key. Known race: there is no per-key locking, so two requests
/// racing on the same missing key may both fetch upstream and both write;
/// last write wins. Entries are never evicted, so the map grows with the
/// number of distinct coordinate buckets seen.
#[derive(Debug, Clone)]
pub struct GeoCache<V> {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<V: Clone> GeoCache<V> {
    pub fn new() -> Self {
        Self::with_ttl(Duration::days(CACHE_TTL_DAYS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn get(&self, key: CacheKey) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    /// Lookup against an explicit clock, so tests can drive expiry.
    pub fn get_at(&self, key: CacheKey, now: DateTime<Utc>) -> Option<V> {
        if let Ok(map) = self.entries.read() {
            let entry = map.get(&key)?;
            if now - entry.created_at < self.ttl {
                return Some(entry.payload.clone());
            }
        }
        None
    }

    pub fn put(&self, key: CacheKey, value: V) {
        self.put_at(key, value, Utc::now());
    }

    pub fn put_at(&self, key: CacheKey, value: V, now: DateTime<Utc>) {
        if let Ok(mut map) = self.entries.write() {
            map.insert(
                key,
                CacheEntry {
                    created_at: now,
                    payload: value,
                },
            );
        }
    }
}

impl<V: Clone> Default for GeoCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_hit_within_ttl_returns_same_payload() {
        let cache: GeoCache<f64> = GeoCache::new();
        let key = CacheKey::from_coord(40.7128, -74.0060);
        cache.put_at(key, 42.5, t0());

        let later = t0() + Duration::days(29);
        assert_eq!(cache.get_at(key, later), Some(42.5));
        assert_eq!(cache.get_at(key, later), Some(42.5));
    }

    #[test]
    fn test_entry_expires_at_exactly_ttl() {
        let cache: GeoCache<f64> = GeoCache::new();
        let key = CacheKey::from_coord(40.7128, -74.0060);
        cache.put_at(key, 42.5, t0());

        // Strictly-less-than comparison: an entry aged exactly TTL is absent.
        let boundary = t0() + Duration::days(CACHE_TTL_DAYS);
        assert_eq!(cache.get_at(key, boundary), None);
        assert_eq!(cache.get_at(key, boundary - Duration::seconds(1)), Some(42.5));
    }

    #[test]
    fn test_nearby_coordinates_share_a_bucket() {
        let a = CacheKey::from_coord(40.71281, -74.00604);
        let b = CacheKey::from_coord(40.71279, -74.00596);
        assert_eq!(a, b);

        let far = CacheKey::from_coord(40.7200, -74.0060);
        assert_ne!(a, far);
    }

    #[test]
    fn test_refetch_overwrites_expired_entry() {
        let cache: GeoCache<f64> = GeoCache::new();
        let key = CacheKey::from_coord(34.0901, -118.4065);
        cache.put_at(key, 10.0, t0());

        let after_expiry = t0() + Duration::days(31);
        assert_eq!(cache.get_at(key, after_expiry), None);

        cache.put_at(key, 11.0, after_expiry);
        assert_eq!(cache.get_at(key, after_expiry), Some(11.0));
    }

    #[test]
    fn test_missing_key_is_absent() {
        let cache: GeoCache<f64> = GeoCache::new();
        assert_eq!(cache.get_at(CacheKey::from_coord(0.0, 0.0), t0()), None);
    }
}
