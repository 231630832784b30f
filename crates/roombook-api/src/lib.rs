pub mod error;
pub mod reservations;
pub mod rooms;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, post},
};

pub use error::ApiError;
pub use state::AppState;

/// All roombook routes. Transport layers (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/room/reserve/{room_id}", post(reservations::reserve_room))
        .route("/room/delete-reservation/{room_id}", delete(reservations::delete_reservation))
        .route("/room/check-reservation/{room_id}", get(reservations::check_reservation))
        .route("/rooms", get(rooms::list_rooms))
        .route("/health", get(rooms::health))
        .with_state(state)
}
