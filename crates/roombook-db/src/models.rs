//! Database row types. Timestamps are kept as the TEXT SQLite stores and
//! parsed when converted into the `roombook-types` models.

use chrono::{DateTime, NaiveDateTime, Utc};

use roombook_types::models::{Reservation, Room};

use crate::DbError;

pub struct RoomRow {
    pub id: i64,
    pub name: String,
    pub created: String,
    pub last_modified: String,
}

pub struct ReservationRow {
    pub id: i64,
    pub room_id: i64,
    pub start_time: String,
    pub end_time: Option<String>,
    pub expired: bool,
    pub created: String,
    pub last_modified: String,
}

impl TryFrom<RoomRow> for Room {
    type Error = DbError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Room {
            id: row.id,
            name: row.name,
            created: parse_timestamp("room.created", &row.created)?,
            last_modified: parse_timestamp("room.last_modified", &row.last_modified)?,
        })
    }
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = DbError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: row.id,
            room_id: row.room_id,
            start_time: parse_timestamp("reservation.start_time", &row.start_time)?,
            end_time: row
                .end_time
                .as_deref()
                .map(|t| parse_timestamp("reservation.end_time", t))
                .transpose()?,
            expired: row.expired,
            created: parse_timestamp("reservation.created", &row.created)?,
            last_modified: parse_timestamp("reservation.last_modified", &row.last_modified)?,
        })
    }
}

pub(crate) fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(column: &'static str, value: &str) -> Result<DateTime<Utc>, DbError> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone; it is UTC.
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|_| DbError::CorruptTimestamp {
            column,
            value: value.to_string(),
        })
}
