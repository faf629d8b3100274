use std::time::Duration;

use tracing::{error, warn};

use crate::error::AssessError;
use crate::models::assessment::{Coordinate, GeocodeResponse};

pub const GEOCODING_DATA_SOURCE: &str = "OpenCage Geocoding API";

const GEOCODE_URL: &str = "https://api.opencagedata.com/geocode/v1/json";
const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolve a free-form location string to coordinates.
///
/// Missing credentials, transport failures, non-200 upstream status and
/// empty result sets all collapse into the same resolution failure: the
/// caller cannot act differently on any of them, beyond retrying with a
/// better location string. The distinct causes are still logged.
pub async fn resolve_coordinates(
    client: &reqwest::Client,
    api_key: Option<&str>,
    location: &str,
) -> Result<Coordinate, AssessError> {
    let failed = || {
        AssessError::GeocodingFailed(format!(
            "Could not geocode location: \"{location}\". Please check the location or try again later."
        ))
    };

    let Some(api_key) = api_key else {
        error!("OPENCAGE_API_KEY not configured");
        return Err(failed());
    };

    let response = client
        .get(GEOCODE_URL)
        .query(&[
            ("q", location),
            ("key", api_key),
            ("limit", "1"),
            ("no_annotations", "1"),
        ])
        .timeout(GEOCODE_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            error!("geocoding request failed for {location}: {e}");
            failed()
        })?;

    let data: GeocodeResponse = response.json().await.map_err(|e| {
        error!("geocoding response parse failed for {location}: {e}");
        failed()
    })?;

    if data.status.as_ref().map(|s| s.code) != Some(200) {
        error!("geocoder returned non-200 status for {location}");
        return Err(failed());
    }

    let geometry = data
        .results
        .into_iter()
        .next()
        .and_then(|r| r.geometry)
        .ok_or_else(|| {
            warn!("no geocoding results for {location}");
            failed()
        })?;

    Ok(Coordinate {
        latitude: geometry.lat,
        longitude: geometry.lng,
    })
}
