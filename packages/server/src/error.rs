//! Mapping from service failures to HTTP responses.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use revassign_directory::StoreError;
use revassign_server_models::ErrorResponse;
use revassign_service::{ErrorCode, ServiceError};

/// Code reported when the store did not answer in time.
pub const UNAVAILABLE: &str = "UNAVAILABLE";
/// Code reported for any other infrastructure failure.
pub const INTERNAL: &str = "INTERNAL";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Body or query string could not be decoded.
    #[error("{0}")]
    BadRequest(String),
}

/// HTTP status for a domain error code.
#[must_use]
pub const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::PrExists
        | ErrorCode::PrMerged
        | ErrorCode::NotAssigned
        | ErrorCode::NoCandidate => StatusCode::CONFLICT,
        ErrorCode::TeamExists | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
    }
}

impl ApiError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Service(ServiceError::Domain(e)) => e.code.into(),
            Self::Service(ServiceError::Store(StoreError::Timeout(_))) => UNAVAILABLE,
            Self::Service(ServiceError::Store(_)) => INTERNAL,
            Self::BadRequest(_) => ErrorCode::InvalidInput.into(),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Service(ServiceError::Domain(e)) => e.message.clone(),
            Self::Service(ServiceError::Store(StoreError::Timeout(_))) => {
                "store did not respond in time".to_string()
            }
            Self::Service(ServiceError::Store(_)) => "internal error".to_string(),
            Self::BadRequest(message) => message.clone(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Service(ServiceError::Domain(e)) => status_for(e.code),
            Self::Service(ServiceError::Store(StoreError::Timeout(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Service(ServiceError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Service(ServiceError::Store(e)) = self {
            log::error!("Store failure: {e}");
        }

        HttpResponse::build(self.status_code())
            .json(ErrorResponse::new(self.code(), self.message()))
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected request body: {err}");
    ApiError::BadRequest(format!("invalid request body: {err}")).into()
}

#[allow(clippy::needless_pass_by_value)]
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected query string: {err}");
    ApiError::BadRequest(format!("invalid query: {err}")).into()
}
