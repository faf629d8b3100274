use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::error::AssessError;
use crate::models::assessment::{Coordinate, DailyArchiveResponse, RainfallStats};
use crate::services::geocache::{CacheKey, CacheStatus, GeoCache};

pub const RAINFALL_DATA_SOURCE: &str = "Open-Meteo archive API (30-year daily aggregation)";
pub const FALLBACK_DATA_SOURCE: &str = "Hardcoded regional averages by input string";

const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(20);

/// The historical window covers the most recent complete calendar years.
const HISTORY_YEARS: i32 = 30;
/// Below this share of requested years the result is degraded-confidence.
const MIN_YEAR_COVERAGE: f64 = 0.8;

// Rainwater harvesting constants.
pub const DEFAULT_COLLECTION_ROOF_AREA_SQFT: f64 = 200.0;
pub const RAINWATER_COLLECTION_EFFICIENCY_FACTOR: f64 = 0.8;
/// 1 inch of rain on 1 sq ft of area = 0.623 gallons.
pub const INCHES_TO_GALLONS_CONVERSION_FACTOR: f64 = 0.623;
/// Fraction of home floor area assumed collectable as roof. Heuristic, not
/// validated against real roof geometry.
pub const COLLECTION_AREA_HOME_FRACTION: f64 = 0.25;

/// Regional annual-rainfall averages (inches) used when the live aggregation
/// fails or produces no usable figure. Keyed by the raw input string.
const REGIONAL_RAINFALL_FALLBACK: &[(&str, f64)] = &[
    ("90210", 15.0), // Los Angeles, CA
    ("10001", 45.0), // New York, NY
    ("60601", 38.0), // Chicago, IL
    ("85001", 9.0),  // Phoenix, AZ
    ("98101", 37.0), // Seattle, WA
    ("33101", 60.0), // Miami, FL
];

/// Final rainfall figure plus the provenance the response must carry.
#[derive(Debug, Clone)]
pub struct RainfallEstimate {
    pub annual_inches: f64,
    pub stats: Option<RainfallStats>,
    pub cache: Option<CacheStatus>,
    pub source: &'static str,
    pub fallback_used: bool,
}

/// The most recent `HISTORY_YEARS` complete calendar years: January 1 thirty
/// years back through December 31 of last year.
pub fn history_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(today.year() - HISTORY_YEARS, 1, 1)
        .unwrap_or(today);
    let end = NaiveDate::from_ymd_opt(today.year() - 1, 12, 31).unwrap_or(today);
    (start, end)
}

/// Sum daily precipitation into per-calendar-year totals. Days without a
/// measured value are skipped, not treated as zero.
pub fn tally_by_year(dates: &[String], values: &[Option<f64>]) -> BTreeMap<i32, f64> {
    let mut tally = BTreeMap::new();
    for (date, value) in dates.iter().zip(values.iter()) {
        let Some(inches) = value else { continue };
        let Some(year) = date.get(..4).and_then(|y| y.parse::<i32>().ok()) else {
            continue;
        };
        *tally.entry(year).or_insert(0.0) += inches;
    }
    tally
}

/// Arithmetic mean of the per-year sums over the years that have at least
/// one recorded day. `None` when no year yielded any data.
pub fn summarize_tally(tally: &BTreeMap<i32, f64>, years_requested: usize) -> Option<RainfallStats> {
    if tally.is_empty() {
        return None;
    }
    let years_with_data = tally.len();
    let mean = tally.values().sum::<f64>() / years_with_data as f64;
    let degraded = (years_with_data as f64) < (years_requested as f64) * MIN_YEAR_COVERAGE;
    Some(RainfallStats {
        mean_annual_inches: mean,
        years_with_data,
        years_requested,
        degraded,
    })
}

/// Average annual rainfall for a coordinate, through the shared geocache.
pub async fn average_annual_rainfall(
    client: &reqwest::Client,
    cache: &GeoCache<RainfallStats>,
    coord: Coordinate,
) -> Result<(RainfallStats, CacheStatus), AssessError> {
    let key = CacheKey::from_coord(coord.latitude, coord.longitude);
    if let Some(stats) = cache.get(key) {
        debug!(
            "rainfall cache hit at ({:.4}, {:.4})",
            coord.latitude, coord.longitude
        );
        return Ok((stats, CacheStatus::Hit));
    }

    let (start, end) = history_window(Utc::now().date_naive());
    let response = client
        .get(ARCHIVE_URL)
        .query(&[
            ("latitude", coord.latitude.to_string()),
            ("longitude", coord.longitude.to_string()),
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
            ("daily", "precipitation_sum".to_string()),
            ("precipitation_unit", "inch".to_string()),
            ("timezone", "UTC".to_string()),
        ])
        .timeout(ARCHIVE_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AssessError::UpstreamTimeout(
                    "Historical weather service timed out. Please try again later.".into(),
                )
            } else {
                AssessError::ServiceUnavailable(format!(
                    "Could not connect to the historical weather service: {e}"
                ))
            }
        })?;

    let data: DailyArchiveResponse = response.json().await.map_err(|e| {
        AssessError::UpstreamDataMissing(format!(
            "Historical weather service returned an unreadable response: {e}"
        ))
    })?;

    let years_requested = HISTORY_YEARS as usize;
    let tally = tally_by_year(&data.daily.time, &data.daily.precipitation_sum);
    let stats = summarize_tally(&tally, years_requested).ok_or_else(|| {
        AssessError::UpstreamDataMissing(format!(
            "No precipitation data available for ({:.4}, {:.4}) in {start}..{end}",
            coord.latitude, coord.longitude
        ))
    })?;

    if stats.degraded {
        warn!(
            "degraded rainfall aggregation at ({:.4}, {:.4}): {} of {} years had data",
            coord.latitude, coord.longitude, stats.years_with_data, stats.years_requested
        );
    }

    cache.put(key, stats.clone());
    Ok((stats, CacheStatus::Miss))
}

/// Resolve a usable annual-rainfall figure: live 30-year aggregation first,
/// then the hardcoded regional table. A live mean of exactly 0 counts as "no
/// usable data" and falls through to the table rather than being reported as
/// a valid zero-rainfall result.
pub async fn resolve_annual_rainfall(
    client: &reqwest::Client,
    cache: &GeoCache<RainfallStats>,
    coord: Option<Coordinate>,
    raw_location: &str,
) -> Result<RainfallEstimate, AssessError> {
    if let Some(coord) = coord {
        match average_annual_rainfall(client, cache, coord).await {
            Ok((stats, cache_status)) if stats.mean_annual_inches > 0.0 => {
                return Ok(RainfallEstimate {
                    annual_inches: stats.mean_annual_inches,
                    stats: Some(stats),
                    cache: Some(cache_status),
                    source: RAINFALL_DATA_SOURCE,
                    fallback_used: false,
                });
            }
            Ok((stats, _)) => {
                warn!(
                    "rainfall mean of exactly {} treated as missing data for {raw_location}",
                    stats.mean_annual_inches
                );
            }
            Err(e) => {
                warn!("live rainfall aggregation failed for {raw_location}: {e}");
            }
        }
    }

    let inches = fallback_annual_rainfall(raw_location).ok_or_else(|| {
        AssessError::UpstreamDataMissing(format!(
            "Rainfall data not available for location: \"{raw_location}\""
        ))
    })?;

    Ok(RainfallEstimate {
        annual_inches: inches,
        stats: None,
        cache: None,
        source: FALLBACK_DATA_SOURCE,
        fallback_used: true,
    })
}

pub fn fallback_annual_rainfall(location: &str) -> Option<f64> {
    REGIONAL_RAINFALL_FALLBACK
        .iter()
        .find(|(zip, _)| *zip == location)
        .map(|(_, inches)| *inches)
}

/// Collection area in sqft: a fixed fraction of home size when a positive
/// size is supplied, else the default roof area. The note says which.
pub fn collection_area_sqft(home_size_sqft: Option<&str>) -> (f64, String) {
    match home_size_sqft {
        None => (
            DEFAULT_COLLECTION_ROOF_AREA_SQFT,
            format!("default collection area ({DEFAULT_COLLECTION_ROOF_AREA_SQFT} sqft)"),
        ),
        Some(raw) => match raw.parse::<f64>() {
            Ok(size) if size > 0.0 => (
                size * COLLECTION_AREA_HOME_FRACTION,
                format!("estimated collection area from home size ({size} sqft)"),
            ),
            Ok(_) => (
                DEFAULT_COLLECTION_ROOF_AREA_SQFT,
                format!(
                    "invalid home size (must be positive), using default collection area ({DEFAULT_COLLECTION_ROOF_AREA_SQFT} sqft)"
                ),
            ),
            Err(_) => (
                DEFAULT_COLLECTION_ROOF_AREA_SQFT,
                format!(
                    "invalid home size format, using default collection area ({DEFAULT_COLLECTION_ROOF_AREA_SQFT} sqft)"
                ),
            ),
        },
    }
}

pub fn harvested_gallons(annual_rainfall_inches: f64, collection_area_sqft: f64) -> f64 {
    annual_rainfall_inches
        * collection_area_sqft
        * INCHES_TO_GALLONS_CONVERSION_FACTOR
        * RAINWATER_COLLECTION_EFFICIENCY_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_window_covers_thirty_complete_years() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let (start, end) = history_window(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(1996, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_two_year_mean() {
        let dates = vec![
            "2090-01-01".to_string(),
            "2090-06-01".to_string(),
            "2091-01-01".to_string(),
        ];
        let values = vec![Some(4.0), Some(6.0), Some(20.0)];
        let tally = tally_by_year(&dates, &values);
        assert_eq!(tally.get(&2090), Some(&10.0));
        assert_eq!(tally.get(&2091), Some(&20.0));

        let stats = summarize_tally(&tally, 2).unwrap();
        assert_eq!(stats.mean_annual_inches, 15.0);
        assert_eq!(stats.years_with_data, 2);
        assert!(!stats.degraded);
    }

    #[test]
    fn test_missing_days_are_skipped_not_zeroed() {
        let dates = vec!["2000-01-01".to_string(), "2000-01-02".to_string()];
        let values = vec![Some(1.5), None];
        let tally = tally_by_year(&dates, &values);
        assert_eq!(tally.get(&2000), Some(&1.5));
        assert_eq!(tally.len(), 1);
    }

    #[test]
    fn test_no_data_yields_no_stats() {
        let tally = tally_by_year(&["2000-01-01".to_string()], &[None]);
        assert!(summarize_tally(&tally, 30).is_none());
    }

    #[test]
    fn test_sparse_years_are_degraded_but_usable() {
        let mut tally = BTreeMap::new();
        for year in 2000..2020 {
            tally.insert(year, 30.0);
        }
        let stats = summarize_tally(&tally, 30).unwrap();
        assert!(stats.degraded);
        assert_eq!(stats.years_with_data, 20);
        assert_eq!(stats.mean_annual_inches, 30.0);

        // Exactly 80% coverage is not degraded.
        for year in 2020..2024 {
            tally.insert(year, 30.0);
        }
        let stats = summarize_tally(&tally, 30).unwrap();
        assert_eq!(stats.years_with_data, 24);
        assert!(!stats.degraded);
    }

    #[test]
    fn test_fallback_table_lookup() {
        assert_eq!(fallback_annual_rainfall("98101"), Some(37.0));
        assert_eq!(fallback_annual_rainfall("00000"), None);
    }

    #[test]
    fn test_collection_area_from_home_size() {
        let (area, _) = collection_area_sqft(Some("1000"));
        assert_eq!(area, 250.0);

        let (area, note) = collection_area_sqft(None);
        assert_eq!(area, 200.0);
        assert!(note.contains("default"));

        let (area, note) = collection_area_sqft(Some("-50"));
        assert_eq!(area, 200.0);
        assert!(note.contains("must be positive"));

        let (area, note) = collection_area_sqft(Some("big"));
        assert_eq!(area, 200.0);
        assert!(note.contains("format"));
    }

    #[test]
    fn test_harvested_gallons_formula() {
        let gallons = harvested_gallons(15.0, 200.0);
        assert!((gallons - 1495.2).abs() < 1e-9, "got {gallons}");
    }
}
