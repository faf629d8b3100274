use utoipa::OpenApi;

use crate::controllers::assessment_controller;
use crate::models::{assessment, profile};

#[derive(OpenApi)]
#[openapi(
    paths(
        assessment_controller::solar_assessment,
        assessment_controller::rainwater_assessment,
        assessment_controller::awg_assessment,
        assessment_controller::create_profile
    ),
    components(
        schemas(
            assessment::SolarAssessmentResponse,
            assessment::RainwaterAssessmentResponse,
            assessment::AwgAssessmentResponse,
            assessment::ErrorResponse,
            profile::ProfileRequest,
            profile::UserProfile,
            profile::ProfileStatusResponse
        )
    ),
    tags(
        (name = "eco-assessor", description = "Household Resource Assessment API")
    )
)]
pub struct ApiDoc;
