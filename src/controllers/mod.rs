pub mod assessment_controller;
