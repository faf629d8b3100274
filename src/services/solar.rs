use std::time::Duration;

use tracing::error;

use crate::error::AssessError;
use crate::models::assessment::{Coordinate, PvWattsResponse};
use crate::services::metrics::round2;

pub const SOLAR_DATA_SOURCE: &str = "NREL PVWatts API v8";

const PVWATTS_URL: &str = "https://developer.nrel.gov/api/pvwatts/v8.json";
const PVWATTS_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_SYSTEM_CAPACITY_KW: f64 = 4.0;
/// Capacity heuristic: 1 kW per 250 sqft, clamped to 1–15 kW.
const SQFT_PER_KW: f64 = 250.0;
const MIN_SYSTEM_CAPACITY_KW: f64 = 1.0;
const MAX_SYSTEM_CAPACITY_KW: f64 = 15.0;

#[derive(Debug, Clone)]
pub struct PvWattsEstimate {
    pub ac_annual_kwh: f64,
    /// The inputs PVWatts echoed back, passed through for transparency.
    pub inputs: serde_json::Value,
}

/// System capacity from home size, with a note describing the assumption.
/// Invalid input falls back to the default capacity rather than failing.
pub fn estimate_system_capacity_kw(home_size_sqft: Option<&str>) -> (f64, String) {
    let default_note = format!(
        "Estimated annual AC energy production for a default {DEFAULT_SYSTEM_CAPACITY_KW} kW DC system."
    );
    match home_size_sqft {
        None => (DEFAULT_SYSTEM_CAPACITY_KW, default_note),
        Some(raw) => match raw.parse::<f64>() {
            Ok(size) if size > 0.0 => {
                let capacity = round2((size / SQFT_PER_KW).clamp(
                    MIN_SYSTEM_CAPACITY_KW,
                    MAX_SYSTEM_CAPACITY_KW,
                ));
                (
                    capacity,
                    format!(
                        "Estimated annual AC energy production for a {capacity} kW DC system (estimated based on {size} sqft home size)."
                    ),
                )
            }
            Ok(_) => (
                DEFAULT_SYSTEM_CAPACITY_KW,
                format!(
                    "Invalid home size (must be positive), using default {DEFAULT_SYSTEM_CAPACITY_KW} kW DC system. {default_note}"
                ),
            ),
            Err(_) => (
                DEFAULT_SYSTEM_CAPACITY_KW,
                format!(
                    "Invalid home size format, using default {DEFAULT_SYSTEM_CAPACITY_KW} kW DC system. {default_note}"
                ),
            ),
        },
    }
}

/// Annual AC output for a fixed south-facing array at the coordinate.
/// Orientation and loss parameters are pinned; only capacity varies.
pub async fn annual_ac_output(
    client: &reqwest::Client,
    api_key: &str,
    coord: Coordinate,
    system_capacity_kw: f64,
) -> Result<PvWattsEstimate, AssessError> {
    let response = client
        .get(PVWATTS_URL)
        .query(&[
            ("api_key", api_key.to_string()),
            ("lat", coord.latitude.to_string()),
            ("lon", coord.longitude.to_string()),
            ("system_capacity", system_capacity_kw.to_string()),
            ("module_type", "0".to_string()),
            ("losses", "14".to_string()),
            ("array_type", "1".to_string()),
            ("tilt", coord.latitude.to_string()),
            ("azimuth", "180".to_string()),
            ("format", "json".to_string()),
            ("timeframe", "hourly".to_string()),
        ])
        .timeout(PVWATTS_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AssessError::UpstreamTimeout(
                    "Solar assessment service timed out. Please try again later.".into(),
                )
            } else {
                AssessError::ServiceUnavailable(format!(
                    "Could not connect to the solar assessment service: {e}"
                ))
            }
        })?;

    let data: PvWattsResponse = response.json().await.map_err(|e| {
        AssessError::UpstreamDataMissing(format!(
            "Solar assessment service returned an unreadable response: {e}"
        ))
    })?;

    if !data.errors.is_empty() {
        error!("PVWatts returned errors: {:?}", data.errors);
        return Err(AssessError::UpstreamDataMissing(format!(
            "Solar assessment service encountered an issue. Details: {}",
            data.errors.join("; ")
        )));
    }

    let ac_annual_kwh = data
        .outputs
        .and_then(|o| o.ac_annual)
        .ok_or_else(|| {
            error!(
                "PVWatts response missing ac_annual at ({:.4}, {:.4})",
                coord.latitude, coord.longitude
            );
            AssessError::UpstreamDataMissing(
                "Could not retrieve the required solar output data from the assessment service."
                    .into(),
            )
        })?;

    Ok(PvWattsEstimate {
        ac_annual_kwh,
        inputs: data.inputs.unwrap_or(serde_json::Value::Null),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity_without_home_size() {
        let (capacity, note) = estimate_system_capacity_kw(None);
        assert_eq!(capacity, 4.0);
        assert!(note.contains("default 4 kW"));
    }

    #[test]
    fn test_capacity_scales_with_home_size() {
        let (capacity, note) = estimate_system_capacity_kw(Some("2500"));
        assert_eq!(capacity, 10.0);
        assert!(note.contains("2500 sqft"));
    }

    #[test]
    fn test_capacity_is_clamped() {
        let (capacity, _) = estimate_system_capacity_kw(Some("100"));
        assert_eq!(capacity, 1.0);

        let (capacity, _) = estimate_system_capacity_kw(Some("10000"));
        assert_eq!(capacity, 15.0);
    }

    #[test]
    fn test_capacity_is_rounded_to_two_decimals() {
        // 1234 / 250 = 4.936
        let (capacity, _) = estimate_system_capacity_kw(Some("1234"));
        assert_eq!(capacity, 4.94);
    }

    #[test]
    fn test_invalid_home_size_falls_back_to_default() {
        let (capacity, note) = estimate_system_capacity_kw(Some("-100"));
        assert_eq!(capacity, 4.0);
        assert!(note.contains("must be positive"));

        let (capacity, note) = estimate_system_capacity_kw(Some("huge"));
        assert_eq!(capacity, 4.0);
        assert!(note.contains("Invalid home size format"));
    }
}
