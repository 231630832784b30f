use chrono::{DateTime, Utc};

use roombook_engine::{ReservationStore, StoreError};
use roombook_types::models::Room;

use crate::Database;

/// `try_reserve` keeps the provided check-then-insert: the check and the
/// insert take the connection lock separately.
impl ReservationStore for Database {
    fn insert_reservation(&self, room_id: i64, start_time: DateTime<Utc>) -> Result<i64, StoreError> {
        Ok(self.create_reservation(room_id, start_time)?)
    }

    fn mark_expired(&self, reservation_id: i64, end_time: DateTime<Utc>) -> Result<bool, StoreError> {
        Ok(self.set_expired(reservation_id, end_time)?)
    }

    fn delete_reservations_for_room(&self, room_id: i64) -> Result<usize, StoreError> {
        Ok(self.delete_room_reservations(room_id)?)
    }

    fn query_active_reservation(&self, room_id: i64) -> Result<bool, StoreError> {
        Ok(self.has_active_reservation(room_id)?)
    }

    fn query_room(&self, room_id: i64) -> Result<bool, StoreError> {
        Ok(self.room_exists(room_id)?)
    }

    fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        Ok(self.rooms()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_ROOMS;

    fn store() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.seed_rooms(DEFAULT_ROOMS).unwrap();
        db
    }

    #[test]
    fn try_reserve_refuses_a_reserved_room() {
        let db = store();

        let first = db.try_reserve(1, Utc::now()).unwrap();
        assert!(first.is_some());
        assert_eq!(db.try_reserve(1, Utc::now()).unwrap(), None);
        assert!(db.try_reserve(2, Utc::now()).unwrap().is_some());
    }

    #[test]
    fn foreign_key_violation_maps_to_constraint() {
        let db = store();
        let err = ReservationStore::insert_reservation(&db, 12, Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)), "unexpected error: {err}");
    }

    #[test]
    fn trait_calls_reach_the_database() {
        let db = store();
        assert!(db.query_room(2).unwrap());
        assert!(!db.query_room(7).unwrap());
        assert_eq!(db.list_rooms().unwrap().len(), 3);

        let id = ReservationStore::insert_reservation(&db, 3, Utc::now()).unwrap();
        assert!(db.query_active_reservation(3).unwrap());
        assert!(db.mark_expired(id, Utc::now()).unwrap());
        assert!(!db.query_active_reservation(3).unwrap());
        assert_eq!(db.delete_reservations_for_room(3).unwrap(), 1);
    }
}
