use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Expiry { reservation_id: i64 },
    FutureReservation,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::Expiry { reservation_id } => write!(f, "expiry of reservation {reservation_id}"),
            TimerKind::FutureReservation => write!(f, "future reservation"),
        }
    }
}

/// One-shot delayed tasks, each on its own detached tokio task.
///
/// Armed timers are registered per room with a cancellation token so they can
/// be retracted. A timer leaves the registry when it fires or is cancelled.
/// Task failures are logged and go no further.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

#[derive(Default)]
struct SchedulerInner {
    next_id: AtomicU64,
    /// room_id -> (timer id -> pending timer)
    pending: Mutex<HashMap<i64, HashMap<TimerId, PendingTimer>>>,
}

struct PendingTimer {
    kind: TimerKind,
    token: CancellationToken,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once after `delay`. A zero delay arms nothing and returns `None`.
    pub fn after<F, Fut>(&self, room_id: i64, kind: TimerKind, delay: Duration, task: F) -> Option<TimerId>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        if delay.is_zero() {
            return None;
        }

        let id = TimerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let token = CancellationToken::new();
        self.lock()
            .entry(room_id)
            .or_default()
            .insert(id, PendingTimer { kind, token: token.clone() });

        debug!(timer = %id, room_id, %kind, ?delay, "timer armed");

        let scheduler = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(timer = %id, room_id, %kind, "timer cancelled");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            // Lost a race with cancel_room / cancel_all.
            if !scheduler.deregister(room_id, id) {
                return;
            }

            debug!(timer = %id, room_id, %kind, "timer fired");
            run_task(room_id, kind, Some(id), task).await;
        });

        Some(id)
    }

    /// Run `task` now on a detached task, with the same failure handling as a fired timer.
    pub fn detach<F, Fut>(&self, room_id: i64, kind: TimerKind, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        tokio::spawn(run_task(room_id, kind, None, task));
    }

    /// Retract every pending timer for a room. Returns how many were cancelled.
    pub fn cancel_room(&self, room_id: i64) -> usize {
        let timers = self.lock().remove(&room_id).unwrap_or_default();
        for timer in timers.values() {
            timer.token.cancel();
        }
        timers.len()
    }

    /// Retract every pending timer.
    pub fn cancel_all(&self) -> usize {
        let all = std::mem::take(&mut *self.lock());
        let mut count = 0;
        for timers in all.values() {
            for timer in timers.values() {
                timer.token.cancel();
                count += 1;
            }
        }
        count
    }

    pub fn pending(&self, room_id: i64) -> usize {
        self.lock().get(&room_id).map_or(0, HashMap::len)
    }

    /// Kinds of the timers still pending for a room, in arming order.
    pub fn pending_kinds(&self, room_id: i64) -> Vec<TimerKind> {
        let guard = self.lock();
        let Some(timers) = guard.get(&room_id) else {
            return Vec::new();
        };
        let mut entries: Vec<_> = timers.iter().map(|(id, t)| (*id, t.kind)).collect();
        entries.sort_by_key(|(id, _)| *id);
        entries.into_iter().map(|(_, kind)| kind).collect()
    }

    fn deregister(&self, room_id: i64, id: TimerId) -> bool {
        let mut pending = self.lock();
        let Some(timers) = pending.get_mut(&room_id) else {
            return false;
        };
        let removed = timers.remove(&id).is_some();
        if timers.is_empty() {
            pending.remove(&room_id);
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, HashMap<TimerId, PendingTimer>>> {
        // Critical sections are single map updates, so a poisoned map is still usable.
        self.inner.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn run_task<F, Fut>(room_id: i64, kind: TimerKind, id: Option<TimerId>, task: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if let Err(e) = task().await {
        match id {
            Some(id) => error!(timer = %id, room_id, %kind, "scheduled task failed: {}", e),
            None => error!(room_id, %kind, "detached task failed: {}", e),
        }
    }
}
