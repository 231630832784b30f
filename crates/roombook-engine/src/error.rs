use thiserror::Error;

/// Failures reported by a [`ReservationStore`](crate::ReservationStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or the statement failed to run.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A write violated a constraint, e.g. a reservation for a missing room.
    #[error("constraint violated: {0}")]
    Constraint(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("room {0} does not exist")]
    RoomNotFound(i64),

    #[error("persistence error: {0}")]
    Persistence(String),

    /// A blocking store call could not be joined.
    #[error("task failed: {0}")]
    Task(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => EngineError::StoreUnavailable(msg),
            StoreError::Constraint(msg) => EngineError::Persistence(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
