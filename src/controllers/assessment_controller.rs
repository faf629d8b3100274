use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::config::Config;
use crate::error::AssessError;
use crate::models::assessment::{
    AssessmentParams, AwgAssessmentResponse, ErrorResponse, RainwaterAssessmentResponse,
    SolarAssessmentResponse,
};
use crate::models::profile::{ProfileRequest, ProfileStatusResponse};
use crate::services::{awg, geocoding, metrics, rainfall, solar};
use crate::shared_state::AppState;

fn error_response(err: AssessError) -> Response {
    (
        err.status_code(),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn missing_location() -> Response {
    error_response(AssessError::InvalidInput(
        "Location parameter (e.g., address, city, zipcode) is required".into(),
    ))
}

/// GET /api/solar_assessment
///
/// Estimate annual solar production for a location, with financial and
/// environmental derivations layered on top.
#[utoipa::path(
    get,
    path = "/api/solar_assessment",
    params(AssessmentParams),
    responses(
        (status = 200, description = "Solar production assessment", body = SolarAssessmentResponse),
        (status = 400, description = "Missing location or location could not be resolved", body = ErrorResponse),
        (status = 502, description = "Upstream returned no usable figure", body = ErrorResponse),
        (status = 503, description = "Assessment service unavailable", body = ErrorResponse)
    )
)]
pub async fn solar_assessment(
    State(config): State<Config>,
    State(app): State<AppState>,
    Query(params): Query<AssessmentParams>,
) -> Response {
    let Some(location) = params.location else {
        return missing_location();
    };
    // Missing credentials surface as service-unavailable before any
    // outbound call is made.
    let Some(nrel_key) = config.keys.nrel_api_key.clone() else {
        error!("NREL_API_KEY not configured");
        return error_response(AssessError::ServiceUnavailable(
            "Solar assessment service is currently unavailable. Please try again later.".into(),
        ));
    };

    let coord = match geocoding::resolve_coordinates(
        &app.http,
        config.keys.opencage_api_key.as_deref(),
        &location,
    )
    .await
    {
        Ok(coord) => coord,
        Err(e) => return error_response(e),
    };

    let (capacity_kw, capacity_note) =
        solar::estimate_system_capacity_kw(params.home_size_sqft.as_deref());
    let estimate = match solar::annual_ac_output(&app.http, &nrel_key, coord, capacity_kw).await {
        Ok(estimate) => estimate,
        Err(e) => return error_response(e),
    };

    let costs = app.profiles.active_costs();
    let financials =
        metrics::solar_financials(estimate.ac_annual_kwh, capacity_kw, costs.electricity_cost_per_kwh);
    let environmental = metrics::solar_environmental(estimate.ac_annual_kwh);

    let response = SolarAssessmentResponse {
        input_location_string: location,
        retrieved_latitude: coord.latitude,
        retrieved_longitude: coord.longitude,
        requested_system_capacity_kw: capacity_kw,
        estimated_annual_ac_kwh: metrics::round2(estimate.ac_annual_kwh),
        notes: capacity_note,
        solar_data_source: solar::SOLAR_DATA_SOURCE.to_string(),
        geocoding_data_source: geocoding::GEOCODING_DATA_SOURCE.to_string(),
        pvwatts_api_inputs: estimate.inputs,
        user_electricity_cost_per_kwh_used: metrics::round2(financials.electricity_cost_per_kwh_used),
        source_of_electricity_cost: financials.cost_source.as_str().to_string(),
        estimated_annual_savings_dollars: metrics::round2(financials.annual_savings_dollars),
        default_solar_install_cost_per_watt_used: metrics::DEFAULT_SOLAR_INSTALL_COST_PER_WATT,
        estimated_system_cost_dollars: metrics::round2(financials.system_cost_dollars),
        simple_payback_period_years: financials.simple_payback_years,
        financial_notes: financials.notes,
        default_co2_emissions_factor_kg_per_kwh_used: environmental.co2_factor_kg_per_kwh,
        estimated_annual_co2_reduction_kg: metrics::round2(environmental.annual_co2_reduction_kg),
        environmental_notes: environmental.notes,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/rainwater_assessment
///
/// Estimate annual harvestable rainwater. Geocoding is best-effort on this
/// path: the regional fallback table is keyed by the raw input string, so a
/// failed resolution still has a chance of producing a figure.
#[utoipa::path(
    get,
    path = "/api/rainwater_assessment",
    params(AssessmentParams),
    responses(
        (status = 200, description = "Rainwater harvesting assessment", body = RainwaterAssessmentResponse),
        (status = 400, description = "Missing location parameter", body = ErrorResponse),
        (status = 502, description = "No rainfall data available for the location", body = ErrorResponse),
        (status = 503, description = "Assessment service unavailable", body = ErrorResponse)
    )
)]
pub async fn rainwater_assessment(
    State(config): State<Config>,
    State(app): State<AppState>,
    Query(params): Query<AssessmentParams>,
) -> Response {
    let Some(location) = params.location else {
        return missing_location();
    };

    let (coord, geocoding_source, geocoding_notes) = match geocoding::resolve_coordinates(
        &app.http,
        config.keys.opencage_api_key.as_deref(),
        &location,
    )
    .await
    {
        Ok(coord) => (
            Some(coord),
            Some(geocoding::GEOCODING_DATA_SOURCE.to_string()),
            "Successfully geocoded location.".to_string(),
        ),
        Err(e) => {
            warn!("geocoding failed for rainwater assessment: {e}");
            (
                None,
                None,
                "Geocoding failed; using the input location directly for the regional fallback lookup."
                    .to_string(),
            )
        }
    };

    let estimate =
        match rainfall::resolve_annual_rainfall(&app.http, &app.rainfall_cache, coord, &location)
            .await
        {
            Ok(estimate) => estimate,
            Err(e) => return error_response(e),
        };

    let (area_sqft, area_note) = rainfall::collection_area_sqft(params.home_size_sqft.as_deref());
    let gallons = rainfall::harvested_gallons(estimate.annual_inches, area_sqft);

    let costs = app.profiles.active_costs();
    let financials = metrics::rainwater_financials(gallons, costs.water_cost_per_gallon);

    let mut notes = format!(
        "Based on average annual rainfall for '{location}' and {area_note}."
    );
    if estimate.fallback_used {
        notes.push_str(
            " Live historical aggregation produced no usable figure; regional average fallback data was used.",
        );
    }
    if let Some(stats) = &estimate.stats {
        if stats.degraded {
            notes.push_str(&format!(
                " Degraded confidence: only {} of {} requested years had precipitation data.",
                stats.years_with_data, stats.years_requested
            ));
        }
    }

    let response = RainwaterAssessmentResponse {
        input_location_string: location,
        retrieved_latitude: coord.map(|c| c.latitude),
        retrieved_longitude: coord.map(|c| c.longitude),
        annual_rainfall_inches: metrics::round2(estimate.annual_inches),
        rainfall_data_source: estimate.source.to_string(),
        rainfall_cache: estimate.cache.map(|c| c.as_str().to_string()),
        rainfall_years_with_data: estimate.stats.as_ref().map(|s| s.years_with_data),
        rainfall_years_requested: estimate.stats.as_ref().map(|s| s.years_requested),
        collection_area_used_sqft: metrics::round2(area_sqft),
        estimated_annual_gallons: metrics::round2(gallons),
        notes,
        geocoding_data_source: geocoding_source,
        geocoding_notes,
        user_water_cost_per_gallon_used: metrics::round4(financials.water_cost_per_gallon_used),
        source_of_water_cost: financials.cost_source.as_str().to_string(),
        estimated_annual_water_savings_dollars: metrics::round2(financials.annual_savings_dollars),
        default_rainwater_system_cost_per_gallon_storage_used:
            metrics::DEFAULT_RAINWATER_SYSTEM_COST_PER_GALLON_STORAGE,
        estimated_rainwater_system_storage_capacity_gallons_assumed: financials
            .storage_capacity_gallons,
        estimated_rainwater_system_cost_dollars: metrics::round2(financials.system_cost_dollars),
        simple_rainwater_payback_period_years: financials.simple_payback_years,
        financial_notes_rainwater: financials.notes,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/awg_assessment
///
/// Estimate atmospheric-water-generator yield from yesterday's temperature
/// and humidity at the location.
#[utoipa::path(
    get,
    path = "/api/awg_assessment",
    params(AssessmentParams),
    responses(
        (status = 200, description = "Atmospheric water generator assessment", body = AwgAssessmentResponse),
        (status = 400, description = "Missing location or location could not be resolved", body = ErrorResponse),
        (status = 502, description = "No weather reading available", body = ErrorResponse),
        (status = 503, description = "Assessment service unavailable", body = ErrorResponse)
    )
)]
pub async fn awg_assessment(
    State(config): State<Config>,
    State(app): State<AppState>,
    Query(params): Query<AssessmentParams>,
) -> Response {
    let Some(location) = params.location else {
        return missing_location();
    };

    let coord = match geocoding::resolve_coordinates(
        &app.http,
        config.keys.opencage_api_key.as_deref(),
        &location,
    )
    .await
    {
        Ok(coord) => coord,
        Err(e) => return error_response(e),
    };

    let (reading, cache_status) =
        match awg::yesterday_reading(&app.http, &app.weather_cache, coord).await {
            Ok(result) => result,
            Err(e) => return error_response(e),
        };

    let daily_gallons = awg::daily_yield_gallons(reading.temperature_c, reading.relative_humidity_pct);
    let annual_gallons = awg::annual_yield_gallons(daily_gallons);

    let costs = app.profiles.active_costs();
    let financials = metrics::awg_financials(annual_gallons, costs.water_cost_per_gallon);

    let notes = format!(
        "Daily yield banded by temperature and relative humidity from the {} reading. \
         Annualization assumes that single reading is representative of every day of the year.",
        reading.date
    );

    let response = AwgAssessmentResponse {
        input_location_string: location,
        retrieved_latitude: coord.latitude,
        retrieved_longitude: coord.longitude,
        reading_date: reading.date.to_string(),
        temperature_c_used: metrics::round2(reading.temperature_c),
        relative_humidity_percent_used: metrics::round2(reading.relative_humidity_pct),
        estimated_daily_gallons: metrics::round2(daily_gallons),
        estimated_annual_gallons: metrics::round2(annual_gallons),
        weather_data_source: awg::AWG_WEATHER_DATA_SOURCE.to_string(),
        weather_cache: cache_status.as_str().to_string(),
        geocoding_data_source: geocoding::GEOCODING_DATA_SOURCE.to_string(),
        notes,
        user_water_cost_per_gallon_used: metrics::round4(financials.water_cost_per_gallon_used),
        source_of_water_cost: financials.cost_source.as_str().to_string(),
        estimated_annual_water_savings_dollars: metrics::round2(financials.annual_savings_dollars),
        financial_notes_awg: financials.notes,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /api/profile
///
/// Store the household profile. Single slot: each submission replaces the
/// previous profile wholesale.
#[utoipa::path(
    post,
    path = "/api/profile",
    request_body = ProfileRequest,
    responses(
        (status = 201, description = "Profile stored", body = ProfileStatusResponse),
        (status = 400, description = "Missing or malformed profile data", body = ProfileStatusResponse)
    )
)]
pub async fn create_profile(
    State(app): State<AppState>,
    Json(payload): Json<ProfileRequest>,
) -> Response {
    match payload.validate() {
        Ok(profile) => {
            app.profiles.replace(profile.clone());
            (
                StatusCode::CREATED,
                Json(ProfileStatusResponse {
                    status: "success".to_string(),
                    message: "Profile data received".to_string(),
                    data: Some(profile),
                }),
            )
                .into_response()
        }
        Err(message) => (
            StatusCode::BAD_REQUEST,
            Json(ProfileStatusResponse {
                status: "error".to_string(),
                message,
                data: None,
            }),
        )
            .into_response(),
    }
}
