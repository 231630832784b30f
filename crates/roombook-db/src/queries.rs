use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::info;

use roombook_types::models::{Reservation, Room};

use crate::models::{ReservationRow, RoomRow, format_timestamp};
use crate::{Database, DbError};

const RESERVATION_COLUMNS: &str =
    "id, room_id, start_time, end_time, expired, created, last_modified";

impl Database {
    // -- Rooms --

    /// Insert the given rooms if the room table is empty. Returns how many were inserted.
    pub fn seed_rooms(&self, names: &[&str]) -> Result<usize, DbError> {
        self.with_conn(|conn| {
            let existing: i64 = conn.query_row("SELECT COUNT(*) FROM room", [], |row| row.get(0))?;
            if existing > 0 {
                return Ok(0);
            }

            let tx = conn.unchecked_transaction()?;
            for name in names {
                tx.execute("INSERT INTO room (name) VALUES (?1)", [name])?;
            }
            tx.commit()?;

            info!("Seeded {} rooms", names.len());
            Ok(names.len())
        })
    }

    pub fn room_exists(&self, room_id: i64) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM room WHERE id = ?1)",
                [room_id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    pub fn rooms(&self) -> Result<Vec<Room>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, created, last_modified FROM room ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(RoomRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        created: row.get(2)?,
                        last_modified: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter().map(Room::try_from).collect()
        })
    }

    // -- Reservations --

    pub fn create_reservation(&self, room_id: i64, start_time: DateTime<Utc>) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let id = conn.query_row(
                "INSERT INTO reservation (room_id, start_time) VALUES (?1, ?2) RETURNING id",
                rusqlite::params![room_id, format_timestamp(start_time)],
                |row| row.get(0),
            )?;
            Ok(id)
        })
    }

    /// Returns `false` when no active reservation with that id exists.
    pub fn set_expired(&self, reservation_id: i64, end_time: DateTime<Utc>) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE reservation SET expired = 1, end_time = ?2 WHERE id = ?1 AND expired = 0",
                rusqlite::params![reservation_id, format_timestamp(end_time)],
            )?;
            Ok(updated > 0)
        })
    }

    pub fn delete_room_reservations(&self, room_id: i64) -> Result<usize, DbError> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM reservation WHERE room_id = ?1", [room_id])?;
            Ok(deleted)
        })
    }

    pub fn has_active_reservation(&self, room_id: i64) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM reservation WHERE room_id = ?1 AND expired = 0)",
                [room_id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    pub fn get_reservation(&self, reservation_id: i64) -> Result<Option<Reservation>, DbError> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {RESERVATION_COLUMNS} FROM reservation WHERE id = ?1"),
                    [reservation_id],
                    reservation_row,
                )
                .optional()?;
            row.map(Reservation::try_from).transpose()
        })
    }

    /// All reservations for a room, expired ones included, oldest first.
    pub fn reservations_for_room(&self, room_id: i64) -> Result<Vec<Reservation>, DbError> {
        self.with_conn(|conn| query_reservations_for_room(conn, room_id))
    }
}

fn query_reservations_for_room(conn: &Connection, room_id: i64) -> Result<Vec<Reservation>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservation WHERE room_id = ?1 ORDER BY id"
    ))?;

    let rows = stmt
        .query_map([room_id], reservation_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(Reservation::try_from).collect()
}

fn reservation_row(row: &Row<'_>) -> rusqlite::Result<ReservationRow> {
    Ok(ReservationRow {
        id: row.get(0)?,
        room_id: row.get(1)?,
        start_time: row.get(2)?,
        end_time: row.get(3)?,
        expired: row.get(4)?,
        created: row.get(5)?,
        last_modified: row.get(6)?,
    })
}
