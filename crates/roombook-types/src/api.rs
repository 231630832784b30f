use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unix timestamp of `0001-01-01T00:00:00Z`, which clients send to mean "no start time".
const ZERO_TIME_TIMESTAMP: i64 = -62_135_596_800;

// -- Reservations --

/// Body of `POST /room/reserve/{roomId}`. Both fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Minutes until the reservation expires. Zero or negative means never.
    #[serde(default)]
    pub reservation_length: i64,
}

impl ReservationRequest {
    /// The requested start time, with the zero timestamp treated as absent.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
            .filter(|t| t.timestamp() != ZERO_TIME_TIMESTAMP)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub result: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<i64>>,
}

impl ReservationResponse {
    pub fn new(result: bool, reason: impl Into<String>) -> Self {
        Self {
            result,
            reason: reason.into(),
            ids: None,
        }
    }

    pub fn with_ids(mut self, ids: Vec<i64>) -> Self {
        self.ids = Some(ids);
        self
    }
}

// -- Health --

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
