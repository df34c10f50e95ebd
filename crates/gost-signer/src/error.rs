use axum::http::StatusCode;
use axum_core::response::{IntoResponse as AxumCoreIntoResponse, Response};

pub const CONFIGURATION_MESSAGE: &str =
    "Cannot get container hash. It seems that service is not correctly configured";
pub const SIGNING_MESSAGE: &str =
    "Failed to create sign. It seems that service is not correctly configured";

/// Signing failure as seen by callers.
///
/// `Display` is a fixed message. The underlying cause is kept for operator
/// logs and deliberately not exposed through `source()`, so error-chain
/// printers cannot leak provider diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    /// The container identifier could not be resolved.
    #[error("{}", CONFIGURATION_MESSAGE)]
    Configuration { cause: anyhow::Error },
    /// Temp-file I/O or the external sign command failed.
    #[error("{}", SIGNING_MESSAGE)]
    Signing { cause: anyhow::Error },
}

impl SignError {
    pub fn configuration(cause: impl Into<anyhow::Error>) -> Self {
        Self::Configuration { cause: cause.into() }
    }

    pub fn signing(cause: impl Into<anyhow::Error>) -> Self {
        Self::Signing { cause: cause.into() }
    }

    /// The internal cause, for logging only.
    pub fn cause(&self) -> &anyhow::Error {
        match self {
            Self::Configuration { cause } | Self::Signing { cause } => cause,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignerServerError {
    #[error("Invalid sign request: {0}")]
    BadRequest(String),
    #[error("Signing is not configured on this service")]
    Unavailable,
    #[error(transparent)]
    Sign(#[from] SignError),
}

/// Trait implementation to convert this error into an axum http response
impl AxumCoreIntoResponse for SignerServerError {
    fn into_response(self) -> Response {
        match self {
            bad_request_error @ SignerServerError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, bad_request_error.to_string()).into_response()
            }
            unavailable_error @ SignerServerError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                unavailable_error.to_string(),
            )
                .into_response(),
            SignerServerError::Sign(sign_error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, sign_error.to_string()).into_response()
            }
        }
    }
}
