use std::sync::{Arc, RwLock};

use axum::extract::FromRef;

use crate::config::Config;
use crate::models::assessment::{RainfallStats, WeatherReading};
use crate::models::profile::UserProfile;
use crate::services::geocache::GeoCache;

/// The unit costs the metrics pipeline may substitute for its defaults.
/// Intake validation guarantees any present value is non-negative.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveCosts {
    pub electricity_cost_per_kwh: Option<f64>,
    pub water_cost_per_gallon: Option<f64>,
}

/// Single-slot profile store: each submission replaces the previous profile
/// wholesale. Last writer wins; readers see whatever is currently stored.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    slot: Arc<RwLock<Option<UserProfile>>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, profile: UserProfile) {
        if let Ok(mut slot) = self.slot.write() {
            *slot = Some(profile);
        }
    }

    pub fn active_costs(&self) -> ActiveCosts {
        if let Ok(slot) = self.slot.read() {
            if let Some(profile) = slot.as_ref() {
                return ActiveCosts {
                    electricity_cost_per_kwh: profile.utility_usage.electricity_cost_per_kwh,
                    water_cost_per_gallon: profile.utility_usage.water_cost_per_gallon,
                };
            }
        }
        ActiveCosts::default()
    }

}

/// Shared engine state, constructed once and injected into handlers: the two
/// geocaches, the profile slot and the pooled HTTP client.
#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub rainfall_cache: GeoCache<RainfallStats>,
    pub weather_cache: GeoCache<WeatherReading>,
    pub profiles: ProfileStore,
}

impl AppState {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent("eco-assessor/0.1")
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            rainfall_cache: GeoCache::new(),
            weather_cache: GeoCache::new(),
            profiles: ProfileStore::new(),
        }
    }
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Config,
    pub app: AppState,
}

impl FromRef<SharedState> for Config {
    fn from_ref(shared: &SharedState) -> Config {
        shared.config.clone()
    }
}

impl FromRef<SharedState> for AppState {
    fn from_ref(shared: &SharedState) -> AppState {
        shared.app.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{HouseholdDetails, UtilityUsage};

    fn profile(electricity: Option<f64>, water: Option<f64>) -> UserProfile {
        UserProfile {
            geographic_location: "10001".to_string(),
            household_details: HouseholdDetails {
                num_occupants: 2,
                home_size_sqft: 1200.0,
            },
            utility_usage: UtilityUsage {
                electricity_kwh_monthly: 600.0,
                water_gallons_monthly: 3000.0,
                electricity_cost_per_kwh: electricity,
                water_cost_per_gallon: water,
            },
        }
    }

    #[test]
    fn test_empty_store_has_no_costs() {
        let store = ProfileStore::new();
        let costs = store.active_costs();
        assert_eq!(costs.electricity_cost_per_kwh, None);
        assert_eq!(costs.water_cost_per_gallon, None);
    }

    #[test]
    fn test_replace_overwrites_wholesale() {
        let store = ProfileStore::new();
        store.replace(profile(Some(0.22), Some(0.005)));
        store.replace(profile(None, None));

        // The second submission wins entirely; no field-level merging.
        let costs = store.active_costs();
        assert_eq!(costs.electricity_cost_per_kwh, None);
        assert_eq!(costs.water_cost_per_gallon, None);
    }

    #[test]
    fn test_active_costs_reflect_latest_profile() {
        let store = ProfileStore::new();
        store.replace(profile(Some(0.22), None));
        let costs = store.active_costs();
        assert_eq!(costs.electricity_cost_per_kwh, Some(0.22));
        assert_eq!(costs.water_cost_per_gallon, None);
    }
}
