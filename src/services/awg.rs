use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::error::AssessError;
use crate::models::assessment::{Coordinate, DailyArchiveResponse, WeatherReading};
use crate::services::geocache::{CacheKey, CacheStatus, GeoCache};

pub const AWG_WEATHER_DATA_SOURCE: &str = "Open-Meteo archive API (daily mean reading)";

const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const READING_TIMEOUT: Duration = Duration::from_secs(10);

pub const DAYS_PER_YEAR: f64 = 365.0;

/// A numeric band along one axis of the yield table. Bounded bands are
/// closed intervals; the open-ended first band excludes its upper edge,
/// which the next band owns.
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Band {
    fn contains(&self, value: f64) -> bool {
        match (self.lower, self.upper) {
            (None, Some(hi)) => value < hi,
            (Some(lo), Some(hi)) => value >= lo && value <= hi,
            (Some(lo), None) => value >= lo,
            (None, None) => true,
        }
    }
}

const fn band(lower: Option<f64>, upper: Option<f64>) -> Band {
    Band { lower, upper }
}

/// Temperature bands (°C): <15, 15–19.9, 20–24.9, 25–29.9, ≥30.
pub const TEMPERATURE_BANDS: [Band; 5] = [
    band(None, Some(15.0)),
    band(Some(15.0), Some(19.9)),
    band(Some(20.0), Some(24.9)),
    band(Some(25.0), Some(29.9)),
    band(Some(30.0), None),
];

/// Relative-humidity bands (%): <30, 30–49.9, 50–69.9, 70–89.9, ≥90.
pub const HUMIDITY_BANDS: [Band; 5] = [
    band(None, Some(30.0)),
    band(Some(30.0), Some(49.9)),
    band(Some(50.0), Some(69.9)),
    band(Some(70.0), Some(89.9)),
    band(Some(90.0), None),
];

/// Gallons/day by (temperature band, humidity band). The boundaries and cell
/// values encode measured generator behavior; change the bands and the grid
/// together or not at all.
pub const YIELD_TABLE_GALLONS_PER_DAY: [[f64; 5]; 5] = [
    [0.0, 0.1, 0.3, 0.7, 1.0],
    [0.1, 0.3, 1.0, 2.0, 2.5],
    [0.2, 0.8, 2.0, 3.5, 4.5],
    [0.3, 1.5, 3.5, 5.5, 6.5],
    [0.5, 2.5, 5.0, 7.0, 8.0],
];

/// First band containing the value, checked in ascending order.
fn band_index(bands: &[Band; 5], value: f64) -> Option<usize> {
    bands.iter().position(|b| b.contains(value))
}

/// Daily water generation for a (temperature, humidity) reading. A reading
/// outside every band yields 0.0 and is logged as anomalous.
pub fn daily_yield_gallons(temperature_c: f64, relative_humidity_pct: f64) -> f64 {
    let temp_band = band_index(&TEMPERATURE_BANDS, temperature_c);
    let humidity_band = band_index(&HUMIDITY_BANDS, relative_humidity_pct);
    match (temp_band, humidity_band) {
        (Some(t), Some(h)) => YIELD_TABLE_GALLONS_PER_DAY[t][h],
        _ => {
            warn!(
                "reading ({temperature_c} °C, {relative_humidity_pct} %RH) matched no yield band"
            );
            0.0
        }
    }
}

/// Annualized yield under the assumption that the single reading is
/// representative of every day of the year. Callers must surface that
/// assumption in their output notes.
pub fn annual_yield_gallons(daily_gallons: f64) -> f64 {
    daily_gallons * DAYS_PER_YEAR
}

/// Yesterday's mean temperature and relative humidity at a coordinate,
/// through the shared geocache.
pub async fn yesterday_reading(
    client: &reqwest::Client,
    cache: &GeoCache<WeatherReading>,
    coord: Coordinate,
) -> Result<(WeatherReading, CacheStatus), AssessError> {
    let key = CacheKey::from_coord(coord.latitude, coord.longitude);
    if let Some(reading) = cache.get(key) {
        debug!(
            "weather reading cache hit at ({:.4}, {:.4})",
            coord.latitude, coord.longitude
        );
        return Ok((reading, CacheStatus::Hit));
    }

    let yesterday = Utc::now().date_naive() - chrono::Duration::days(1);
    let response = client
        .get(ARCHIVE_URL)
        .query(&[
            ("latitude", coord.latitude.to_string()),
            ("longitude", coord.longitude.to_string()),
            ("start_date", yesterday.to_string()),
            ("end_date", yesterday.to_string()),
            (
                "daily",
                "temperature_2m_mean,relative_humidity_2m_mean".to_string(),
            ),
            ("timezone", "UTC".to_string()),
        ])
        .timeout(READING_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AssessError::UpstreamTimeout(
                    "Weather service timed out. Please try again later.".into(),
                )
            } else {
                AssessError::ServiceUnavailable(format!(
                    "Could not connect to the weather service: {e}"
                ))
            }
        })?;

    let data: DailyArchiveResponse = response.json().await.map_err(|e| {
        AssessError::UpstreamDataMissing(format!(
            "Weather service returned an unreadable response: {e}"
        ))
    })?;

    let temperature = data.daily.temperature_2m_mean.first().copied().flatten();
    let humidity = data
        .daily
        .relative_humidity_2m_mean
        .first()
        .copied()
        .flatten();
    let (Some(temperature_c), Some(relative_humidity_pct)) = (temperature, humidity) else {
        return Err(AssessError::UpstreamDataMissing(format!(
            "No temperature/humidity reading available for ({:.4}, {:.4}) on {yesterday}",
            coord.latitude, coord.longitude
        )));
    };

    let date = data
        .daily
        .time
        .first()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or(yesterday);

    let reading = WeatherReading {
        date,
        temperature_c,
        relative_humidity_pct,
    };
    cache.put(key, reading.clone());
    Ok((reading, CacheStatus::Miss))
}

#[cfg(test)]
mod tests {
    use super::*;

    // One in-band sample per band on each axis.
    const TEMP_SAMPLES: [f64; 5] = [10.0, 17.0, 22.0, 27.0, 35.0];
    const HUMIDITY_SAMPLES: [f64; 5] = [20.0, 40.0, 60.0, 80.0, 95.0];

    #[test]
    fn test_lookup_returns_exact_table_cell() {
        for (t, temp) in TEMP_SAMPLES.iter().enumerate() {
            for (h, humidity) in HUMIDITY_SAMPLES.iter().enumerate() {
                assert_eq!(
                    daily_yield_gallons(*temp, *humidity),
                    YIELD_TABLE_GALLONS_PER_DAY[t][h],
                    "cell ({t}, {h})"
                );
            }
        }
    }

    #[test]
    fn test_band_edges() {
        // Lower edges belong to their band, not the one below.
        assert_eq!(daily_yield_gallons(15.0, 30.0), 0.3);
        assert_eq!(daily_yield_gallons(30.0, 90.0), 8.0);
        // Closed upper edges.
        assert_eq!(daily_yield_gallons(19.9, 49.9), 0.3);
        // Just under the first bounded band.
        assert_eq!(daily_yield_gallons(14.99, 29.99), 0.0);
    }

    #[test]
    fn test_table_is_monotonic_along_both_axes() {
        for t in 0..5 {
            for h in 1..5 {
                assert!(
                    YIELD_TABLE_GALLONS_PER_DAY[t][h] >= YIELD_TABLE_GALLONS_PER_DAY[t][h - 1],
                    "humidity regression at ({t}, {h})"
                );
            }
        }
        for h in 0..5 {
            for t in 1..5 {
                assert!(
                    YIELD_TABLE_GALLONS_PER_DAY[t][h] >= YIELD_TABLE_GALLONS_PER_DAY[t - 1][h],
                    "temperature regression at ({t}, {h})"
                );
            }
        }
    }

    #[test]
    fn test_annual_yield_is_daily_times_365() {
        for row in YIELD_TABLE_GALLONS_PER_DAY {
            for cell in row {
                assert_eq!(annual_yield_gallons(cell), cell * 365.0);
            }
        }
    }

    #[test]
    fn test_between_band_reading_yields_zero() {
        // 19.95 °C falls in the seam between the 15–19.9 and 20–24.9 bands.
        assert_eq!(daily_yield_gallons(19.95, 60.0), 0.0);
    }

    #[test]
    fn test_extremes_hit_the_outer_bands() {
        assert_eq!(daily_yield_gallons(-40.0, 10.0), 0.0);
        assert_eq!(daily_yield_gallons(48.0, 99.0), 8.0);
    }
}
