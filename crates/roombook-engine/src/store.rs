use chrono::{DateTime, Utc};

use roombook_types::models::Room;

use crate::error::StoreError;

/// Persistent record of rooms and reservations.
///
/// Every method is a single blocking round-trip; the engine runs them on the
/// blocking pool. The store is the only arbiter of "is this room reserved".
pub trait ReservationStore: Send + Sync + 'static {
    /// Insert a reservation and return its id.
    fn insert_reservation(&self, room_id: i64, start_time: DateTime<Utc>) -> Result<i64, StoreError>;

    /// Flag a reservation expired and stamp its end time.
    /// Returns `false` when no active row with that id exists.
    fn mark_expired(&self, reservation_id: i64, end_time: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Remove every reservation row for the room, expired ones included.
    fn delete_reservations_for_room(&self, room_id: i64) -> Result<usize, StoreError>;

    fn query_active_reservation(&self, room_id: i64) -> Result<bool, StoreError>;

    fn query_room(&self, room_id: i64) -> Result<bool, StoreError>;

    fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;

    /// Insert a reservation unless the room already has an active one.
    ///
    /// The default is a check followed by a separate insert, so two callers
    /// can both pass the check. Stores with an atomic insert-if-absent should
    /// override it.
    fn try_reserve(&self, room_id: i64, start_time: DateTime<Utc>) -> Result<Option<i64>, StoreError> {
        if self.query_active_reservation(room_id)? {
            return Ok(None);
        }
        self.insert_reservation(room_id, start_time).map(Some)
    }
}
