pub mod assessment_routes;
