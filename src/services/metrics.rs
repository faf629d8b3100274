//! Derived financial and environmental metrics.
//!
//! Pure arithmetic over the physical estimates. All figures are kept at full
//! precision here; rounding happens once, at the response boundary.

// Financial defaults.
pub const DEFAULT_SOLAR_INSTALL_COST_PER_WATT: f64 = 3.0;
pub const DEFAULT_ELECTRICITY_COST_PER_KWH: f64 = 0.15;
pub const DEFAULT_WATER_COST_PER_GALLON: f64 = 0.004;
pub const DEFAULT_RAINWATER_SYSTEM_COST_PER_GALLON_STORAGE: f64 = 2.0;
pub const DEFAULT_RAINWATER_STORAGE_CAPACITY_GALLONS: f64 = 1000.0;

// Environmental defaults.
/// Average grid displacement, kg CO2 per kWh.
pub const DEFAULT_CO2_EMISSIONS_FACTOR_KG_PER_KWH: f64 = 0.45;

/// Where a unit cost came from; reported verbatim in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostSource {
    UserProfile,
    DefaultValue,
}

impl CostSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostSource::UserProfile => "user_profile",
            CostSource::DefaultValue => "default_value",
        }
    }
}

/// Profile value when present and non-negative, else the fixed default.
pub fn resolve_unit_cost(profile_value: Option<f64>, default: f64) -> (f64, CostSource) {
    match profile_value {
        Some(v) if v >= 0.0 => (v, CostSource::UserProfile),
        _ => (default, CostSource::DefaultValue),
    }
}

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Simple payback: system cost over annual savings, with the two
/// not-applicable cases kept apart so responses can say which one occurred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaybackOutcome {
    Applicable(f64),
    /// Production itself is zero or negative.
    NoProduction,
    /// Positive production but zero or negative savings (unit cost is the
    /// culprit).
    NoSavings,
}

impl PaybackOutcome {
    pub fn years(&self) -> Option<f64> {
        match self {
            PaybackOutcome::Applicable(years) => Some(*years),
            _ => None,
        }
    }
}

pub fn simple_payback(
    system_cost_dollars: f64,
    annual_savings_dollars: f64,
    annual_production: f64,
) -> PaybackOutcome {
    if annual_savings_dollars > 0.0 {
        PaybackOutcome::Applicable(round1(system_cost_dollars / annual_savings_dollars))
    } else if annual_production <= 0.0 {
        PaybackOutcome::NoProduction
    } else {
        PaybackOutcome::NoSavings
    }
}

// ─── Solar ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SolarFinancials {
    pub electricity_cost_per_kwh_used: f64,
    pub cost_source: CostSource,
    pub annual_savings_dollars: f64,
    pub system_cost_dollars: f64,
    pub simple_payback_years: Option<f64>,
    pub notes: Vec<String>,
}

pub fn solar_financials(
    annual_ac_kwh: f64,
    system_capacity_kw: f64,
    profile_electricity_cost: Option<f64>,
) -> SolarFinancials {
    let (cost_per_kwh, cost_source) =
        resolve_unit_cost(profile_electricity_cost, DEFAULT_ELECTRICITY_COST_PER_KWH);
    let annual_savings = annual_ac_kwh * cost_per_kwh;
    let system_cost = system_capacity_kw * 1000.0 * DEFAULT_SOLAR_INSTALL_COST_PER_WATT;

    let mut notes = vec![
        format!(
            "Electricity cost used: ${cost_per_kwh:.2}/kWh (source: {}).",
            cost_source.as_str()
        ),
        format!(
            "Annual savings calculated based on {:.2} kWh annual production.",
            annual_ac_kwh
        ),
        format!(
            "System cost estimated at ${DEFAULT_SOLAR_INSTALL_COST_PER_WATT:.2}/Watt for a {system_capacity_kw} kW system."
        ),
    ];

    let payback = simple_payback(system_cost, annual_savings, annual_ac_kwh);
    notes.push(match payback {
        PaybackOutcome::Applicable(_) => {
            "Simple payback period does not include system degradation, maintenance, or potential incentives/financing.".to_string()
        }
        PaybackOutcome::NoProduction => {
            "Payback period is Not Applicable as estimated energy production is zero or negative.".to_string()
        }
        PaybackOutcome::NoSavings => {
            "Payback period is Not Applicable due to zero or negative estimated annual savings (check electricity cost).".to_string()
        }
    });

    SolarFinancials {
        electricity_cost_per_kwh_used: cost_per_kwh,
        cost_source,
        annual_savings_dollars: annual_savings,
        system_cost_dollars: system_cost,
        simple_payback_years: payback.years(),
        notes,
    }
}

#[derive(Debug, Clone)]
pub struct SolarEnvironmental {
    pub co2_factor_kg_per_kwh: f64,
    pub annual_co2_reduction_kg: f64,
    pub notes: Vec<String>,
}

pub fn solar_environmental(annual_ac_kwh: f64) -> SolarEnvironmental {
    SolarEnvironmental {
        co2_factor_kg_per_kwh: DEFAULT_CO2_EMISSIONS_FACTOR_KG_PER_KWH,
        annual_co2_reduction_kg: annual_ac_kwh * DEFAULT_CO2_EMISSIONS_FACTOR_KG_PER_KWH,
        notes: vec![
            format!(
                "CO2 reduction calculated using an average grid emissions factor of {DEFAULT_CO2_EMISSIONS_FACTOR_KG_PER_KWH} kg CO2/kWh."
            ),
            "This is an estimate; actual displaced emissions vary by region and time of day."
                .to_string(),
        ],
    }
}

// ─── Rainwater ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RainwaterFinancials {
    pub water_cost_per_gallon_used: f64,
    pub cost_source: CostSource,
    pub annual_savings_dollars: f64,
    pub storage_capacity_gallons: f64,
    pub system_cost_dollars: f64,
    pub simple_payback_years: Option<f64>,
    pub notes: Vec<String>,
}

pub fn rainwater_financials(
    annual_gallons: f64,
    profile_water_cost: Option<f64>,
) -> RainwaterFinancials {
    let (cost_per_gallon, cost_source) =
        resolve_unit_cost(profile_water_cost, DEFAULT_WATER_COST_PER_GALLON);
    let annual_savings = annual_gallons * cost_per_gallon;
    let system_cost = DEFAULT_RAINWATER_STORAGE_CAPACITY_GALLONS
        * DEFAULT_RAINWATER_SYSTEM_COST_PER_GALLON_STORAGE;

    let mut notes = vec![
        format!(
            "Water cost used: ${cost_per_gallon:.4}/gallon (source: {}).",
            cost_source.as_str()
        ),
        format!(
            "Annual savings based on {:.2} gallons collected.",
            annual_gallons
        ),
        format!(
            "System cost estimated for a {DEFAULT_RAINWATER_STORAGE_CAPACITY_GALLONS} gallon storage system at ${DEFAULT_RAINWATER_SYSTEM_COST_PER_GALLON_STORAGE:.2}/gallon of storage."
        ),
        "Actual system costs can vary widely based on system type, complexity, and local installation rates."
            .to_string(),
    ];

    let payback = simple_payback(system_cost, annual_savings, annual_gallons);
    notes.push(match payback {
        PaybackOutcome::Applicable(_) => {
            "Simple payback period does not include maintenance, or potential incentives/financing.".to_string()
        }
        PaybackOutcome::NoProduction => {
            "Payback period is Not Applicable as estimated water collection is zero or negative.".to_string()
        }
        PaybackOutcome::NoSavings => {
            "Payback period is Not Applicable due to zero or negative estimated annual savings (check water cost).".to_string()
        }
    });

    RainwaterFinancials {
        water_cost_per_gallon_used: cost_per_gallon,
        cost_source,
        annual_savings_dollars: annual_savings,
        storage_capacity_gallons: DEFAULT_RAINWATER_STORAGE_CAPACITY_GALLONS,
        system_cost_dollars: system_cost,
        simple_payback_years: payback.years(),
        notes,
    }
}

// ─── AWG ─────────────────────────────────────────────────────────────────────

/// Savings only: no installed-cost model exists for atmospheric water
/// generators, so no system cost or payback is derived.
#[derive(Debug, Clone)]
pub struct AwgFinancials {
    pub water_cost_per_gallon_used: f64,
    pub cost_source: CostSource,
    pub annual_savings_dollars: f64,
    pub notes: Vec<String>,
}

pub fn awg_financials(annual_gallons: f64, profile_water_cost: Option<f64>) -> AwgFinancials {
    let (cost_per_gallon, cost_source) =
        resolve_unit_cost(profile_water_cost, DEFAULT_WATER_COST_PER_GALLON);
    let annual_savings = annual_gallons * cost_per_gallon;

    AwgFinancials {
        water_cost_per_gallon_used: cost_per_gallon,
        cost_source,
        annual_savings_dollars: annual_savings,
        notes: vec![
            format!(
                "Water cost used: ${cost_per_gallon:.4}/gallon (source: {}).",
                cost_source.as_str()
            ),
            format!(
                "Annual savings based on {:.2} gallons generated.",
                annual_gallons
            ),
            "No installed-cost model is available for atmospheric water generators; payback is not estimated."
                .to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payback_example() {
        // $12,000 system, $1,200/year savings.
        let payback = simple_payback(12_000.0, 1_200.0, 8_000.0);
        assert_eq!(payback, PaybackOutcome::Applicable(10.0));
        assert_eq!(payback.years(), Some(10.0));
    }

    #[test]
    fn test_payback_not_applicable_reasons_are_distinguished() {
        assert_eq!(
            simple_payback(12_000.0, 0.0, 0.0),
            PaybackOutcome::NoProduction
        );
        assert_eq!(
            simple_payback(12_000.0, 0.0, 5_000.0),
            PaybackOutcome::NoSavings
        );
    }

    #[test]
    fn test_unit_cost_resolution() {
        let (cost, source) = resolve_unit_cost(Some(0.22), DEFAULT_ELECTRICITY_COST_PER_KWH);
        assert_eq!(cost, 0.22);
        assert_eq!(source, CostSource::UserProfile);

        let (cost, source) = resolve_unit_cost(None, DEFAULT_ELECTRICITY_COST_PER_KWH);
        assert_eq!(cost, 0.15);
        assert_eq!(source, CostSource::DefaultValue);

        // Negative values never reach the pipeline via intake, but the
        // resolver still refuses them.
        let (cost, source) = resolve_unit_cost(Some(-0.5), DEFAULT_ELECTRICITY_COST_PER_KWH);
        assert_eq!(cost, 0.15);
        assert_eq!(source, CostSource::DefaultValue);
    }

    #[test]
    fn test_solar_financials_with_profile_cost() {
        let fin = solar_financials(10_000.0, 4.0, Some(0.22));
        assert_eq!(fin.cost_source, CostSource::UserProfile);
        assert_eq!(fin.electricity_cost_per_kwh_used, 0.22);
        assert!((fin.annual_savings_dollars - 2_200.0).abs() < 1e-9);
        assert_eq!(fin.system_cost_dollars, 12_000.0);
        assert_eq!(fin.simple_payback_years, Some(5.5));
        assert!(fin.notes.iter().any(|n| n.contains("user_profile")));
    }

    #[test]
    fn test_solar_financials_with_default_cost() {
        let fin = solar_financials(8_000.0, 4.0, None);
        assert_eq!(fin.cost_source, CostSource::DefaultValue);
        assert_eq!(fin.electricity_cost_per_kwh_used, 0.15);
        assert!((fin.annual_savings_dollars - 1_200.0).abs() < 1e-9);
        assert_eq!(fin.simple_payback_years, Some(10.0));
        assert!(fin.notes.iter().any(|n| n.contains("default_value")));
    }

    #[test]
    fn test_zero_production_has_no_payback() {
        let fin = solar_financials(0.0, 4.0, None);
        assert_eq!(fin.simple_payback_years, None);
        assert!(fin
            .notes
            .iter()
            .any(|n| n.contains("energy production is zero or negative")));
    }

    #[test]
    fn test_rainwater_financials() {
        let fin = rainwater_financials(10_000.0, None);
        assert_eq!(fin.water_cost_per_gallon_used, 0.004);
        assert!((fin.annual_savings_dollars - 40.0).abs() < 1e-9);
        assert_eq!(fin.system_cost_dollars, 2_000.0);
        assert_eq!(fin.simple_payback_years, Some(50.0));
    }

    #[test]
    fn test_awg_financials_have_no_cost_model() {
        let fin = awg_financials(365.0, Some(0.01));
        assert_eq!(fin.cost_source, CostSource::UserProfile);
        assert!((fin.annual_savings_dollars - 3.65).abs() < 1e-9);
        assert!(fin.notes.iter().any(|n| n.contains("payback is not estimated")));
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round1(10.04), 10.0);
        assert_eq!(round2(1234.567), 1234.57);
        assert_eq!(round4(0.00423), 0.0042);
    }
}
