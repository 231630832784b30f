use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use roombook_engine::EngineError;
use roombook_types::api::ReservationResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::RoomNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failures still answer with the `{result, reason}` shape.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reason = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            warn!("Request rejected: {}", self);
            self.to_string()
        };

        (status, Json(ReservationResponse::new(false, reason))).into_response()
    }
}
