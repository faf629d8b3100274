use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─── Stored profile ──────────────────────────────────────────────────────────

/// The single stored household profile. Only the two optional unit costs are
/// read by the assessment engine; the rest is kept so the intake round-trips
/// what the client sent.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub geographic_location: String,
    pub household_details: HouseholdDetails,
    pub utility_usage: UtilityUsage,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HouseholdDetails {
    pub num_occupants: i64,
    pub home_size_sqft: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UtilityUsage {
    pub electricity_kwh_monthly: f64,
    pub water_gallons_monthly: f64,
    pub electricity_cost_per_kwh: Option<f64>,
    pub water_cost_per_gallon: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileStatusResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<UserProfile>,
}

// ─── Intake request ──────────────────────────────────────────────────────────

/// Raw intake payload. Everything is optional so validation can produce the
/// specific message for each missing or malformed field; the unit costs
/// arrive as raw JSON because clients send them both as numbers and as
/// quoted strings.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileRequest {
    pub geographic_location: Option<String>,
    pub household_details: Option<HouseholdDetailsRequest>,
    pub utility_usage: Option<UtilityUsageRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HouseholdDetailsRequest {
    pub num_occupants: Option<i64>,
    pub home_size_sqft: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UtilityUsageRequest {
    pub electricity_kwh_monthly: Option<f64>,
    pub water_gallons_monthly: Option<f64>,
    #[schema(value_type = Option<f64>)]
    pub electricity_cost_per_kwh: Option<serde_json::Value>,
    #[schema(value_type = Option<f64>)]
    pub water_cost_per_gallon: Option<serde_json::Value>,
}

impl ProfileRequest {
    /// Validate the intake payload into a storable profile. Negative or
    /// non-numeric unit costs are rejected here and never reach the metrics
    /// pipeline.
    pub fn validate(self) -> Result<UserProfile, String> {
        let geographic_location = self
            .geographic_location
            .filter(|s| !s.is_empty())
            .ok_or("Missing required profile data")?;
        let household = self.household_details.ok_or("Missing required profile data")?;
        let utility = self.utility_usage.ok_or("Missing required profile data")?;

        let num_occupants = household
            .num_occupants
            .ok_or("Invalid household_details format")?;
        let home_size_sqft = household
            .home_size_sqft
            .ok_or("Invalid household_details format")?;

        let electricity_kwh_monthly = utility
            .electricity_kwh_monthly
            .ok_or("Invalid utility_usage format for consumption values")?;
        let water_gallons_monthly = utility
            .water_gallons_monthly
            .ok_or("Invalid utility_usage format for consumption values")?;

        let electricity_cost_per_kwh =
            parse_unit_cost(utility.electricity_cost_per_kwh, "electricity_cost_per_kwh")?;
        let water_cost_per_gallon =
            parse_unit_cost(utility.water_cost_per_gallon, "water_cost_per_gallon")?;

        Ok(UserProfile {
            geographic_location,
            household_details: HouseholdDetails {
                num_occupants,
                home_size_sqft,
            },
            utility_usage: UtilityUsage {
                electricity_kwh_monthly,
                water_gallons_monthly,
                electricity_cost_per_kwh,
                water_cost_per_gallon,
            },
        })
    }
}

fn parse_unit_cost(raw: Option<serde_json::Value>, field: &str) -> Result<Option<f64>, String> {
    let Some(value) = raw else {
        return Ok(None);
    };
    let parsed = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        serde_json::Value::Null => return Ok(None),
        _ => None,
    };
    let Some(cost) = parsed else {
        return Err(format!("Invalid {field} format, must be a number"));
    };
    if cost < 0.0 {
        return Err(format!("{field} must be non-negative"));
    }
    Ok(Some(cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(utility: serde_json::Value) -> ProfileRequest {
        serde_json::from_value(json!({
            "geographic_location": "90210",
            "household_details": { "num_occupants": 3, "home_size_sqft": 1800.0 },
            "utility_usage": utility,
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_profile_with_costs() {
        let profile = request(json!({
            "electricity_kwh_monthly": 800.0,
            "water_gallons_monthly": 4000.0,
            "electricity_cost_per_kwh": 0.22,
            "water_cost_per_gallon": "0.005",
        }))
        .validate()
        .unwrap();

        assert_eq!(profile.utility_usage.electricity_cost_per_kwh, Some(0.22));
        assert_eq!(profile.utility_usage.water_cost_per_gallon, Some(0.005));
    }

    #[test]
    fn test_costs_are_optional() {
        let profile = request(json!({
            "electricity_kwh_monthly": 800.0,
            "water_gallons_monthly": 4000.0,
        }))
        .validate()
        .unwrap();

        assert_eq!(profile.utility_usage.electricity_cost_per_kwh, None);
        assert_eq!(profile.utility_usage.water_cost_per_gallon, None);
    }

    #[test]
    fn test_negative_cost_rejected_at_intake() {
        let err = request(json!({
            "electricity_kwh_monthly": 800.0,
            "water_gallons_monthly": 4000.0,
            "electricity_cost_per_kwh": -0.10,
        }))
        .validate()
        .unwrap_err();

        assert!(err.contains("non-negative"), "unexpected message: {err}");
    }

    #[test]
    fn test_non_numeric_cost_rejected_at_intake() {
        let err = request(json!({
            "electricity_kwh_monthly": 800.0,
            "water_gallons_monthly": 4000.0,
            "water_cost_per_gallon": "cheap",
        }))
        .validate()
        .unwrap_err();

        assert!(err.contains("must be a number"), "unexpected message: {err}");
    }

    #[test]
    fn test_missing_sections_rejected() {
        let req: ProfileRequest = serde_json::from_value(json!({
            "geographic_location": "90210",
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
