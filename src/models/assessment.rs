use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ─── Core geospatial types ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single day's mean temperature and relative humidity at a coordinate.
#[derive(Debug, Clone)]
pub struct WeatherReading {
    pub date: chrono::NaiveDate,
    pub temperature_c: f64,
    pub relative_humidity_pct: f64,
}

/// Result of one historical rainfall aggregation, cached as a unit so the
/// contributing-year counts survive cache hits.
#[derive(Debug, Clone)]
pub struct RainfallStats {
    pub mean_annual_inches: f64,
    pub years_with_data: usize,
    pub years_requested: usize,
    /// Fewer than 80% of the requested years had any data. Usable, but the
    /// caller should say so.
    pub degraded: bool,
}

// ─── Request parameters ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssessmentParams {
    /// Free-form location: address, city or zipcode.
    pub location: Option<String>,
    /// Home size in square feet, used to scale the system estimate.
    pub home_size_sqft: Option<String>,
}

// ─── OpenCage wire types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub status: Option<GeocodeStatus>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeStatus {
    pub code: u16,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Option<GeocodeGeometry>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeGeometry {
    pub lat: f64,
    pub lng: f64,
}

// ─── Open-Meteo archive wire types ───────────────────────────────────────────

/// Daily slice of the Open-Meteo archive API. Which value vectors are present
/// depends on the `daily=` request parameter; individual days may carry null.
#[derive(Debug, Deserialize)]
pub struct DailyArchiveResponse {
    pub daily: DailyArchiveData,
}

#[derive(Debug, Deserialize)]
pub struct DailyArchiveData {
    pub time: Vec<String>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m_mean: Vec<Option<f64>>,
}

// ─── NREL PVWatts wire types ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PvWattsResponse {
    #[serde(default)]
    pub errors: Vec<String>,
    pub outputs: Option<PvWattsOutputs>,
    pub inputs: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct PvWattsOutputs {
    pub ac_annual: Option<f64>,
}

// ─── Assessment responses ────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct SolarAssessmentResponse {
    pub input_location_string: String,
    pub retrieved_latitude: f64,
    pub retrieved_longitude: f64,
    pub requested_system_capacity_kw: f64,
    pub estimated_annual_ac_kwh: f64,
    /// How the production estimate was obtained, including the capacity
    /// assumption used.
    pub notes: String,
    pub solar_data_source: String,
    pub geocoding_data_source: String,
    #[schema(value_type = Object)]
    pub pvwatts_api_inputs: serde_json::Value,

    pub user_electricity_cost_per_kwh_used: f64,
    pub source_of_electricity_cost: String,
    pub estimated_annual_savings_dollars: f64,
    pub default_solar_install_cost_per_watt_used: f64,
    pub estimated_system_cost_dollars: f64,
    /// Absent when savings are zero or negative; the reason is spelled out
    /// in `financial_notes`.
    pub simple_payback_period_years: Option<f64>,
    pub financial_notes: Vec<String>,

    pub default_co2_emissions_factor_kg_per_kwh_used: f64,
    pub estimated_annual_co2_reduction_kg: f64,
    pub environmental_notes: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RainwaterAssessmentResponse {
    pub input_location_string: String,
    pub retrieved_latitude: Option<f64>,
    pub retrieved_longitude: Option<f64>,
    pub annual_rainfall_inches: f64,
    pub rainfall_data_source: String,
    /// "hit" or "miss" when the live aggregation ran; absent on the
    /// hardcoded fallback path.
    pub rainfall_cache: Option<String>,
    pub rainfall_years_with_data: Option<usize>,
    pub rainfall_years_requested: Option<usize>,
    pub collection_area_used_sqft: f64,
    pub estimated_annual_gallons: f64,
    pub notes: String,
    pub geocoding_data_source: Option<String>,
    pub geocoding_notes: String,

    pub user_water_cost_per_gallon_used: f64,
    pub source_of_water_cost: String,
    pub estimated_annual_water_savings_dollars: f64,
    pub default_rainwater_system_cost_per_gallon_storage_used: f64,
    pub estimated_rainwater_system_storage_capacity_gallons_assumed: f64,
    pub estimated_rainwater_system_cost_dollars: f64,
    pub simple_rainwater_payback_period_years: Option<f64>,
    pub financial_notes_rainwater: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AwgAssessmentResponse {
    pub input_location_string: String,
    pub retrieved_latitude: f64,
    pub retrieved_longitude: f64,
    /// Date of the weather reading the yield is derived from.
    pub reading_date: String,
    pub temperature_c_used: f64,
    pub relative_humidity_percent_used: f64,
    pub estimated_daily_gallons: f64,
    pub estimated_annual_gallons: f64,
    pub weather_data_source: String,
    pub weather_cache: String,
    pub geocoding_data_source: String,
    pub notes: String,

    pub user_water_cost_per_gallon_used: f64,
    pub source_of_water_cost: String,
    pub estimated_annual_water_savings_dollars: f64,
    pub financial_notes_awg: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
