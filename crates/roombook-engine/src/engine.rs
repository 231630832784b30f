use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use roombook_types::api::ReservationRequest;
use roombook_types::models::Room;

use crate::config::{EngineConfig, PastStartPolicy};
use crate::error::{EngineError, Result, StoreError};
use crate::scheduler::{Scheduler, TimerId, TimerKind};
use crate::store::ReservationStore;

/// Result of an attempt to reserve a room that may already be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved(i64),
    AlreadyReserved,
}

/// What a reservation request turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum ReservationDecision {
    Reserved(i64),
    /// Creation deferred by `delay_minutes`. `timer` is `None` when the delay
    /// was not positive and creation was handed straight to a detached task.
    Scheduled {
        delay_minutes: f64,
        timer: Option<TimerId>,
    },
    AlreadyReserved,
}

/// The reservation lifecycle engine. Cheap to clone; timers hold a clone and
/// re-enter it when they fire.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: Arc<dyn ReservationStore>,
    scheduler: Scheduler,
    config: EngineConfig,
}

impl Engine {
    pub fn new(store: Arc<dyn ReservationStore>, config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store,
                scheduler: Scheduler::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    pub async fn check_active_reservation(&self, room_id: i64) -> Result<bool> {
        self.blocking(move |store| store.query_active_reservation(room_id)).await
    }

    pub async fn room_exists(&self, room_id: i64) -> Result<bool> {
        self.blocking(move |store| store.query_room(room_id)).await
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>> {
        self.blocking(|store| store.list_rooms()).await
    }

    /// Insert a reservation starting now, without checking for an existing one.
    /// Arms an expiry timer when `expiry_minutes > 0`.
    pub async fn reserve(&self, room_id: i64, expiry_minutes: i64) -> Result<i64> {
        let start_time = Utc::now();
        let reservation_id = self
            .blocking(move |store| store.insert_reservation(room_id, start_time))
            .await?;

        info!(room_id, reservation_id, "reservation created");
        self.arm_expiry(room_id, reservation_id, expiry_minutes);
        Ok(reservation_id)
    }

    /// Reserve the room unless it already has an active reservation.
    pub async fn reserve_if_vacant(&self, room_id: i64, expiry_minutes: i64) -> Result<ReserveOutcome> {
        let start_time = Utc::now();
        let inserted = self
            .blocking(move |store| store.try_reserve(room_id, start_time))
            .await?;

        match inserted {
            Some(reservation_id) => {
                info!(room_id, reservation_id, "reservation created");
                self.arm_expiry(room_id, reservation_id, expiry_minutes);
                Ok(ReserveOutcome::Reserved(reservation_id))
            }
            None => Ok(ReserveOutcome::AlreadyReserved),
        }
    }

    /// Schedule a reservation to be created after `delay_minutes`.
    ///
    /// Existence is checked when the timer fires, not now: of several future
    /// reservations for one room, the first to fire wins and the rest are
    /// dropped. A non-positive delay arms no timer and creates immediately on
    /// a detached task.
    pub fn create_future_reservation(&self, delay_minutes: f64, room_id: i64, expiry_minutes: i64) -> Option<TimerId> {
        let engine = self.clone();
        let task = move || async move { engine.fire_future_reservation(room_id, expiry_minutes).await };

        let delay = self.inner.config.minutes(delay_minutes);
        if delay.is_zero() {
            self.inner.scheduler.detach(room_id, TimerKind::FutureReservation, task);
            return None;
        }

        let timer = self
            .inner
            .scheduler
            .after(room_id, TimerKind::FutureReservation, delay, task);
        info!(room_id, delay_minutes, expiry_minutes, "future reservation scheduled");
        timer
    }

    /// Remove every reservation for the room. Deleting nothing is not an error.
    pub async fn delete_reservation(&self, room_id: i64) -> Result<()> {
        let deleted = self
            .blocking(move |store| store.delete_reservations_for_room(room_id))
            .await?;
        debug!(room_id, deleted, "reservations deleted");

        self.retract_timers(room_id);
        Ok(())
    }

    /// Cancel the room's pending timers when retraction on delete is enabled.
    /// Returns how many were cancelled; always 0 when retraction is off.
    pub fn retract_timers(&self, room_id: i64) -> usize {
        if !self.inner.config.retract_timers_on_delete {
            return 0;
        }

        let cancelled = self.inner.scheduler.cancel_room(room_id);
        if cancelled > 0 {
            info!(room_id, cancelled, "retracted pending timers");
        }
        cancelled
    }

    /// Flag a reservation expired. Returns `false` when it was already gone
    /// (deleted) or already expired.
    pub async fn expire_reservation(&self, reservation_id: i64) -> Result<bool> {
        let end_time = Utc::now();
        let updated = self
            .blocking(move |store| store.mark_expired(reservation_id, end_time))
            .await?;

        if updated {
            info!(reservation_id, "reservation expired");
        } else {
            debug!(reservation_id, "reservation no longer active, nothing to expire");
        }
        Ok(updated)
    }

    /// Handle a reservation request for a room.
    ///
    /// An existing reservation rejects the request before any timing is
    /// considered. Without a start time the room is reserved now; otherwise
    /// creation is scheduled for the distance between now and the start time.
    pub async fn request_reservation(&self, room_id: i64, req: &ReservationRequest) -> Result<ReservationDecision> {
        if !self.room_exists(room_id).await? {
            return Err(EngineError::RoomNotFound(room_id));
        }

        if self.check_active_reservation(room_id).await? {
            return Ok(ReservationDecision::AlreadyReserved);
        }

        let expiry_minutes = req.reservation_length;
        let Some(start_time) = req.start_time() else {
            return self.reserve_now(room_id, expiry_minutes).await;
        };

        let offset_minutes = (start_time - Utc::now()).num_milliseconds() as f64 / 60_000.0;
        let delay_minutes = if offset_minutes >= 0.0 {
            offset_minutes
        } else {
            match self.inner.config.past_start {
                PastStartPolicy::Mirror => {
                    warn!(
                        room_id,
                        %start_time,
                        "start time is {:.2} minutes in the past, scheduling that far ahead instead",
                        -offset_minutes
                    );
                    -offset_minutes
                }
                PastStartPolicy::Immediate => return self.reserve_now(room_id, expiry_minutes).await,
            }
        };

        let timer = self.create_future_reservation(delay_minutes, room_id, expiry_minutes);
        Ok(ReservationDecision::Scheduled { delay_minutes, timer })
    }

    pub fn pending_timers(&self, room_id: i64) -> usize {
        self.inner.scheduler.pending(room_id)
    }

    /// Cancel every pending timer. Returns how many were dropped.
    pub fn shutdown(&self) -> usize {
        let cancelled = self.inner.scheduler.cancel_all();
        if cancelled > 0 {
            warn!(cancelled, "dropping pending reservation timers on shutdown");
        }
        cancelled
    }

    async fn reserve_now(&self, room_id: i64, expiry_minutes: i64) -> Result<ReservationDecision> {
        Ok(match self.reserve_if_vacant(room_id, expiry_minutes).await? {
            ReserveOutcome::Reserved(id) => ReservationDecision::Reserved(id),
            ReserveOutcome::AlreadyReserved => ReservationDecision::AlreadyReserved,
        })
    }

    async fn fire_future_reservation(&self, room_id: i64, expiry_minutes: i64) -> Result<()> {
        match self.reserve_if_vacant(room_id, expiry_minutes).await? {
            ReserveOutcome::Reserved(reservation_id) => {
                info!(room_id, reservation_id, "future reservation created");
            }
            ReserveOutcome::AlreadyReserved => {
                info!(room_id, "room already reserved, dropping future reservation");
            }
        }
        Ok(())
    }

    fn arm_expiry(&self, room_id: i64, reservation_id: i64, expiry_minutes: i64) -> Option<TimerId> {
        if expiry_minutes <= 0 {
            return None;
        }

        let engine = self.clone();
        let delay = self.inner.config.minutes(expiry_minutes as f64);
        self.inner.scheduler.after(
            room_id,
            TimerKind::Expiry { reservation_id },
            delay,
            move || async move { engine.expire_reservation(reservation_id).await.map(|_| ()) },
        )
    }

    /// Run a store call on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn ReservationStore) -> std::result::Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.inner.store.clone();
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                EngineError::Task(e.to_string())
            })?
            .map_err(EngineError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration as TimeDelta};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use roombook_types::models::Reservation;

    /// Length of one scheduling minute in these tests.
    const UNIT: Duration = Duration::from_millis(100);

    /// In-memory store with fault injection.
    #[derive(Default)]
    struct MemoryStore {
        rooms: HashSet<i64>,
        reservations: Mutex<Vec<Reservation>>,
        unavailable: AtomicBool,
        failing_room: Mutex<Option<i64>>,
    }

    impl MemoryStore {
        fn with_rooms(ids: &[i64]) -> Self {
            Self {
                rooms: ids.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn rows(&self, room_id: i64) -> Vec<Reservation> {
            self.reservations
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.room_id == room_id)
                .cloned()
                .collect()
        }

        fn check(&self) -> std::result::Result<(), StoreError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection refused".into()));
            }
            Ok(())
        }
    }

    impl ReservationStore for MemoryStore {
        fn insert_reservation(&self, room_id: i64, start_time: DateTime<Utc>) -> std::result::Result<i64, StoreError> {
            self.check()?;
            if *self.failing_room.lock().unwrap() == Some(room_id) {
                return Err(StoreError::Unavailable("disk I/O error".into()));
            }
            if !self.rooms.contains(&room_id) {
                return Err(StoreError::Constraint("FOREIGN KEY constraint failed".into()));
            }
            let mut rows = self.reservations.lock().unwrap();
            let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            rows.push(Reservation {
                id,
                room_id,
                start_time,
                end_time: None,
                expired: false,
                created: start_time,
                last_modified: start_time,
            });
            Ok(id)
        }

        fn mark_expired(&self, reservation_id: i64, end_time: DateTime<Utc>) -> std::result::Result<bool, StoreError> {
            self.check()?;
            let mut rows = self.reservations.lock().unwrap();
            match rows.iter_mut().find(|r| r.id == reservation_id && !r.expired) {
                Some(row) => {
                    row.expired = true;
                    row.end_time = Some(end_time);
                    row.last_modified = end_time;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        fn delete_reservations_for_room(&self, room_id: i64) -> std::result::Result<usize, StoreError> {
            self.check()?;
            let mut rows = self.reservations.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.room_id != room_id);
            Ok(before - rows.len())
        }

        fn query_active_reservation(&self, room_id: i64) -> std::result::Result<bool, StoreError> {
            self.check()?;
            Ok(self
                .reservations
                .lock()
                .unwrap()
                .iter()
                .any(|r| r.room_id == room_id && r.is_active()))
        }

        fn query_room(&self, room_id: i64) -> std::result::Result<bool, StoreError> {
            self.check()?;
            Ok(self.rooms.contains(&room_id))
        }

        fn list_rooms(&self) -> std::result::Result<Vec<Room>, StoreError> {
            self.check()?;
            let now = Utc::now();
            let mut ids: Vec<_> = self.rooms.iter().copied().collect();
            ids.sort();
            Ok(ids
                .into_iter()
                .map(|id| Room {
                    id,
                    name: format!("Room {id}"),
                    created: now,
                    last_modified: now,
                })
                .collect())
        }
    }

    fn setup(config: EngineConfig) -> (Engine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_rooms(&[1, 2, 3]));
        let engine = Engine::new(store.clone(), config);
        (engine, store)
    }

    fn fast_config() -> EngineConfig {
        EngineConfig {
            minute: UNIT,
            ..EngineConfig::default()
        }
    }

    async fn wait_units(units: u32) {
        tokio::time::sleep(UNIT * units).await;
    }

    #[tokio::test]
    async fn reserve_then_check_is_active() {
        let (engine, store) = setup(fast_config());

        assert!(!engine.check_active_reservation(1).await.unwrap());
        let id = engine.reserve(1, 0).await.unwrap();
        assert!(engine.check_active_reservation(1).await.unwrap());
        assert!(!engine.check_active_reservation(2).await.unwrap());

        let rows = store.rows(1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert!(rows[0].end_time.is_none());
    }

    #[tokio::test]
    async fn reservation_without_expiry_stays_active() {
        let (engine, _store) = setup(fast_config());

        engine.reserve(1, 0).await.unwrap();
        assert_eq!(engine.pending_timers(1), 0);

        wait_units(5).await;
        assert!(engine.check_active_reservation(1).await.unwrap());
    }

    #[tokio::test]
    async fn negative_expiry_disables_expiry() {
        let (engine, _store) = setup(fast_config());

        engine.reserve(1, -3).await.unwrap();
        assert_eq!(engine.pending_timers(1), 0);
    }

    #[tokio::test]
    async fn reservation_expires_after_its_length() {
        let (engine, store) = setup(fast_config());

        let id = engine.reserve(1, 2).await.unwrap();
        assert_eq!(
            engine.scheduler().pending_kinds(1),
            vec![TimerKind::Expiry { reservation_id: id }]
        );
        assert!(engine.check_active_reservation(1).await.unwrap());

        wait_units(7).await;
        assert!(!engine.check_active_reservation(1).await.unwrap());
        assert_eq!(engine.pending_timers(1), 0);

        let rows = store.rows(1);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].expired);
        let end_time = rows[0].end_time.unwrap();
        assert!(end_time >= rows[0].start_time);
    }

    #[tokio::test]
    async fn second_reservation_for_same_room_is_rejected() {
        let (engine, store) = setup(fast_config());

        let first = engine.reserve_if_vacant(1, 0).await.unwrap();
        assert!(matches!(first, ReserveOutcome::Reserved(_)));

        let second = engine.reserve_if_vacant(1, 0).await.unwrap();
        assert_eq!(second, ReserveOutcome::AlreadyReserved);
        assert_eq!(store.rows(1).len(), 1);
    }

    #[tokio::test]
    async fn room_can_be_reserved_again_after_expiry() {
        let (engine, store) = setup(fast_config());

        engine.reserve(1, 1).await.unwrap();
        wait_units(5).await;

        let outcome = engine.reserve_if_vacant(1, 0).await.unwrap();
        assert!(matches!(outcome, ReserveOutcome::Reserved(_)));
        // The expired row is kept alongside the new one.
        assert_eq!(store.rows(1).len(), 2);
    }

    #[tokio::test]
    async fn delete_is_immediate_and_idempotent() {
        let (engine, store) = setup(fast_config());

        engine.reserve(1, 0).await.unwrap();
        engine.reserve(2, 0).await.unwrap();

        engine.delete_reservation(1).await.unwrap();
        assert!(!engine.check_active_reservation(1).await.unwrap());
        assert!(engine.check_active_reservation(2).await.unwrap());

        engine.delete_reservation(1).await.unwrap();
        engine.delete_reservation(3).await.unwrap();
        assert!(store.rows(1).is_empty());
    }

    #[tokio::test]
    async fn delete_removes_expired_rows_too() {
        let (engine, store) = setup(fast_config());

        let id = engine.reserve(1, 0).await.unwrap();
        assert!(engine.expire_reservation(id).await.unwrap());
        engine.reserve(1, 0).await.unwrap();
        assert_eq!(store.rows(1).len(), 2);

        engine.delete_reservation(1).await.unwrap();
        assert!(store.rows(1).is_empty());
    }

    #[tokio::test]
    async fn expiry_after_delete_is_a_no_op() {
        let (engine, store) = setup(fast_config());

        let id = engine.reserve(1, 1).await.unwrap();
        engine.delete_reservation(1).await.unwrap();
        // The expiry timer is left armed by default.
        assert_eq!(engine.pending_timers(1), 1);

        wait_units(4).await;
        assert_eq!(engine.pending_timers(1), 0);
        assert!(store.rows(1).is_empty());
        assert!(!engine.expire_reservation(id).await.unwrap());
    }

    #[tokio::test]
    async fn future_reservation_appears_after_delay() {
        let (engine, _store) = setup(fast_config());

        let timer = engine.create_future_reservation(2.0, 1, 0);
        assert!(timer.is_some());
        assert!(!engine.check_active_reservation(1).await.unwrap());

        wait_units(6).await;
        assert!(engine.check_active_reservation(1).await.unwrap());

        wait_units(3).await;
        assert!(engine.check_active_reservation(1).await.unwrap());
    }

    #[tokio::test]
    async fn future_reservation_then_expiry() {
        let (engine, _store) = setup(fast_config());

        engine.create_future_reservation(2.0, 1, 3);
        assert!(!engine.check_active_reservation(1).await.unwrap());

        wait_units(4).await;
        assert!(engine.check_active_reservation(1).await.unwrap());

        wait_units(6).await;
        assert!(!engine.check_active_reservation(1).await.unwrap());
    }

    #[tokio::test]
    async fn future_reservation_is_dropped_when_room_is_taken() {
        let (engine, store) = setup(fast_config());

        engine.create_future_reservation(2.0, 1, 0);
        let id = engine.reserve(1, 0).await.unwrap();

        wait_units(6).await;
        let rows = store.rows(1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
    }

    #[tokio::test]
    async fn first_future_reservation_to_fire_wins() {
        let (engine, store) = setup(fast_config());

        engine.create_future_reservation(3.0, 1, 0);
        engine.create_future_reservation(1.0, 1, 0);
        engine.create_future_reservation(2.0, 1, 0);
        assert_eq!(engine.pending_timers(1), 3);

        wait_units(8).await;
        assert_eq!(store.rows(1).len(), 1);
        assert_eq!(engine.pending_timers(1), 0);
    }

    #[tokio::test]
    async fn non_positive_delay_creates_without_timer() {
        let (engine, _store) = setup(fast_config());

        assert!(engine.create_future_reservation(0.0, 1, 0).is_none());
        assert_eq!(engine.pending_timers(1), 0);

        wait_units(3).await;
        assert!(engine.check_active_reservation(1).await.unwrap());
    }

    #[tokio::test]
    async fn pending_timers_survive_delete_by_default() {
        let (engine, _store) = setup(fast_config());

        engine.create_future_reservation(2.0, 1, 0);
        engine.delete_reservation(1).await.unwrap();
        assert_eq!(engine.pending_timers(1), 1);

        wait_units(6).await;
        assert!(engine.check_active_reservation(1).await.unwrap());
    }

    #[tokio::test]
    async fn delete_retracts_timers_when_configured() {
        let (engine, _store) = setup(EngineConfig {
            retract_timers_on_delete: true,
            ..fast_config()
        });

        engine.create_future_reservation(2.0, 1, 0);
        engine.create_future_reservation(2.0, 2, 0);
        engine.delete_reservation(1).await.unwrap();
        assert_eq!(engine.pending_timers(1), 0);
        assert_eq!(engine.pending_timers(2), 1);

        wait_units(6).await;
        assert!(!engine.check_active_reservation(1).await.unwrap());
        assert!(engine.check_active_reservation(2).await.unwrap());
    }

    #[tokio::test]
    async fn retract_timers_follows_config() {
        let (engine, _store) = setup(fast_config());
        engine.create_future_reservation(2.0, 1, 0);
        assert_eq!(engine.retract_timers(1), 0);
        assert_eq!(engine.pending_timers(1), 1);

        let (engine, _store) = setup(EngineConfig {
            retract_timers_on_delete: true,
            ..fast_config()
        });
        engine.create_future_reservation(2.0, 1, 0);
        assert_eq!(engine.retract_timers(1), 1);
        assert_eq!(engine.pending_timers(1), 0);

        wait_units(6).await;
        assert!(!engine.check_active_reservation(1).await.unwrap());
    }

    #[tokio::test]
    async fn failing_timer_does_not_affect_other_rooms() {
        let (engine, store) = setup(fast_config());
        *store.failing_room.lock().unwrap() = Some(1);

        engine.create_future_reservation(1.0, 1, 0);
        engine.create_future_reservation(1.0, 2, 0);

        wait_units(5).await;
        assert!(!engine.check_active_reservation(1).await.unwrap());
        assert!(engine.check_active_reservation(2).await.unwrap());
    }

    #[tokio::test]
    async fn request_for_unknown_room_is_rejected() {
        let (engine, _store) = setup(fast_config());

        let err = engine
            .request_reservation(42, &ReservationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::RoomNotFound(42)));
    }

    #[tokio::test]
    async fn request_without_start_time_reserves_now() {
        let (engine, _store) = setup(fast_config());

        let decision = engine
            .request_reservation(1, &ReservationRequest::default())
            .await
            .unwrap();
        assert!(matches!(decision, ReservationDecision::Reserved(_)));
        assert!(engine.check_active_reservation(1).await.unwrap());
    }

    #[tokio::test]
    async fn existing_reservation_takes_precedence_over_start_time() {
        let (engine, _store) = setup(fast_config());
        engine.reserve(1, 0).await.unwrap();

        let req = ReservationRequest {
            start_time: Some(Utc::now() + TimeDelta::minutes(5)),
            reservation_length: 0,
        };
        let decision = engine.request_reservation(1, &req).await.unwrap();
        assert_eq!(decision, ReservationDecision::AlreadyReserved);
        assert_eq!(engine.pending_timers(1), 0);
    }

    #[tokio::test]
    async fn request_with_future_start_time_is_scheduled() {
        let (engine, _store) = setup(EngineConfig::default());

        let req = ReservationRequest {
            start_time: Some(Utc::now() + TimeDelta::minutes(30)),
            reservation_length: 10,
        };
        let decision = engine.request_reservation(1, &req).await.unwrap();
        let ReservationDecision::Scheduled { delay_minutes, timer } = decision else {
            panic!("expected a scheduled reservation, got {decision:?}");
        };
        assert!(timer.is_some());
        assert!((29.9..=30.0).contains(&delay_minutes));
        assert!(!engine.check_active_reservation(1).await.unwrap());
        assert_eq!(engine.scheduler().pending_kinds(1), vec![TimerKind::FutureReservation]);

        assert_eq!(engine.shutdown(), 1);
        assert_eq!(engine.pending_timers(1), 0);
    }

    #[tokio::test]
    async fn past_start_time_is_mirrored_by_default() {
        let (engine, _store) = setup(EngineConfig::default());

        let req = ReservationRequest {
            start_time: Some(Utc::now() - TimeDelta::minutes(10)),
            reservation_length: 0,
        };
        let decision = engine.request_reservation(1, &req).await.unwrap();
        let ReservationDecision::Scheduled { delay_minutes, .. } = decision else {
            panic!("expected a scheduled reservation, got {decision:?}");
        };
        assert!((10.0..10.1).contains(&delay_minutes));
        assert!(!engine.check_active_reservation(1).await.unwrap());
        engine.shutdown();
    }

    #[tokio::test]
    async fn past_start_time_reserves_now_with_immediate_policy() {
        let (engine, _store) = setup(EngineConfig {
            past_start: PastStartPolicy::Immediate,
            ..EngineConfig::default()
        });

        let req = ReservationRequest {
            start_time: Some(Utc::now() - TimeDelta::minutes(10)),
            reservation_length: 0,
        };
        let decision = engine.request_reservation(1, &req).await.unwrap();
        assert!(matches!(decision, ReservationDecision::Reserved(_)));
        assert_eq!(engine.pending_timers(1), 0);
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_store_unavailable() {
        let (engine, store) = setup(fast_config());
        store.unavailable.store(true, Ordering::SeqCst);

        let err = engine.check_active_reservation(1).await.unwrap_err();
        assert!(matches!(err, EngineError::StoreUnavailable(_)));

        let err = engine.delete_reservation(1).await.unwrap_err();
        assert!(matches!(err, EngineError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn dangling_room_reference_is_a_persistence_error() {
        let (engine, _store) = setup(fast_config());

        let err = engine.reserve(99, 5).await.unwrap_err();
        assert!(matches!(err, EngineError::Persistence(_)));
        assert_eq!(engine.pending_timers(99), 0);
    }
}
