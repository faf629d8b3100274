use axum::http::StatusCode;
use thiserror::Error;

/// Unified error type for the assessment engine.
///
/// Every outbound call converts its transport/timeout failures into one of
/// these categories at the call site; nothing is retried automatically.
#[derive(Debug, Error)]
pub enum AssessError {
    /// An upstream service cannot be used at all (missing credentials,
    /// connection refused). Never silently defaulted.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// An outbound call timed out.
    #[error("{0}")]
    UpstreamTimeout(String),

    /// The location string could not be resolved to coordinates. The caller
    /// must supply a better location string.
    #[error("{0}")]
    GeocodingFailed(String),

    /// An upstream provider responded, but without a usable figure.
    #[error("{0}")]
    UpstreamDataMissing(String),

    /// Bad client input caught before any outbound call.
    #[error("{0}")]
    InvalidInput(String),
}

impl AssessError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AssessError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AssessError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AssessError::GeocodingFailed(_) => StatusCode::BAD_REQUEST,
            AssessError::UpstreamDataMissing(_) => StatusCode::BAD_GATEWAY,
            AssessError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}
