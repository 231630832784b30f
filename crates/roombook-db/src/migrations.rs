use rusqlite::Connection;
use tracing::info;

use crate::DbError;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS room (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            created         TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            last_modified   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        -- No uniqueness on (room_id, expired): expired rows are kept, so the
        -- one-active-reservation rule lives in the engine.
        CREATE TABLE IF NOT EXISTS reservation (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            room_id         INTEGER NOT NULL REFERENCES room(id),
            start_time      TEXT NOT NULL,
            end_time        TEXT,
            expired         INTEGER NOT NULL DEFAULT 0,
            created         TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            last_modified   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_reservation_room
            ON reservation(room_id, expired);

        CREATE TRIGGER IF NOT EXISTS room_touch
            AFTER UPDATE ON room
            FOR EACH ROW
        BEGIN
            UPDATE room SET last_modified = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = NEW.id;
        END;

        CREATE TRIGGER IF NOT EXISTS reservation_touch
            AFTER UPDATE ON reservation
            FOR EACH ROW
        BEGIN
            UPDATE reservation SET last_modified = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = NEW.id;
        END;
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
