use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use tracing::info;

use roombook_engine::ReservationDecision;
use roombook_types::api::{ReservationRequest, ReservationResponse};

use crate::error::ApiError;
use crate::state::AppState;

pub const ALREADY_RESERVED: &str = "Reservation already exists.";
pub const SCHEDULED: &str = "Reservation scheduled.";

/// POST /room/reserve/{room_id} — reserve now, or at `startTime` when given.
///
/// The body is optional; an empty body reserves immediately with no expiry.
pub async fn reserve_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    body: Bytes,
) -> Result<Json<ReservationResponse>, ApiError> {
    let req = parse_request(&body)?;

    let response = match state.engine.request_reservation(room_id, &req).await? {
        ReservationDecision::Reserved(id) => ReservationResponse::new(true, "").with_ids(vec![id]),
        ReservationDecision::Scheduled { delay_minutes, .. } => {
            info!("Room {} reservation scheduled in {:.2} minutes", room_id, delay_minutes);
            ReservationResponse::new(true, SCHEDULED).with_ids(vec![])
        }
        ReservationDecision::AlreadyReserved => {
            ReservationResponse::new(false, ALREADY_RESERVED).with_ids(vec![])
        }
    };

    Ok(Json(response))
}

/// DELETE /room/delete-reservation/{room_id}
///
/// `result` reports whether the room had an active reservation. When it did,
/// every reservation row for the room is removed. Pending timers for the room
/// are retracted either way when retraction on delete is enabled.
pub async fn delete_reservation(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<Json<ReservationResponse>, ApiError> {
    if !state.engine.check_active_reservation(room_id).await? {
        state.engine.retract_timers(room_id);
        return Ok(Json(ReservationResponse::new(
            false,
            format!("Reservation for room {} does not exist.", room_id),
        )));
    }

    state.engine.delete_reservation(room_id).await?;
    info!("Room {} reservation deleted", room_id);
    Ok(Json(ReservationResponse::new(true, "")))
}

/// GET /room/check-reservation/{room_id}
pub async fn check_reservation(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let active = state.engine.check_active_reservation(room_id).await?;
    let reason = if active { ALREADY_RESERVED } else { "" };
    Ok(Json(ReservationResponse::new(active, reason)))
}

fn parse_request(body: &[u8]) -> Result<ReservationRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReservationRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}
