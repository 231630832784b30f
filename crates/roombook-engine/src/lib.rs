//! Reservation lifecycle for roombook.
//!
//! The [`Engine`] decides whether a room may be reserved, writes the
//! reservation through a [`ReservationStore`], and arms one-shot timers on the
//! [`Scheduler`] for deferred creation and automatic expiry. Timers re-enter
//! the engine when they fire and re-check store state before writing.

pub mod config;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod store;

pub use config::{EngineConfig, PastStartPolicy};
pub use engine::{Engine, ReservationDecision, ReserveOutcome};
pub use error::{EngineError, Result, StoreError};
pub use scheduler::{Scheduler, TimerId, TimerKind};
pub use store::ReservationStore;
