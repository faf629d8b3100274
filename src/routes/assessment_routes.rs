use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::assessment_controller::{
    awg_assessment, create_profile, rainwater_assessment, solar_assessment,
};
use crate::shared_state::SharedState;

/// Build the `/api/*` sub-router.
/// Handlers extract `State<AppState>` and/or `State<Config>` via
/// `FromRef<SharedState>` — a single `.with_state(shared)` covers both.
pub fn api_routes(shared: SharedState) -> Router {
    Router::new()
        .route("/solar_assessment", get(solar_assessment))
        .route("/rainwater_assessment", get(rainwater_assessment))
        .route("/awg_assessment", get(awg_assessment))
        .route("/profile", post(create_profile))
        .with_state(shared)
}
