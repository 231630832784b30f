use axum::{Json, extract::State};

use roombook_types::api::HealthResponse;
use roombook_types::models::Room;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /rooms
pub async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<Room>>, ApiError> {
    Ok(Json(state.engine.list_rooms().await?))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
