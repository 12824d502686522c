//! Timer capability used by the feed and the change classifier.
//!
//! [`TokioScheduler`] runs tasks on the tokio runtime. [`ManualScheduler`]
//! keeps a virtual clock that only moves when [`ManualScheduler::advance`]
//! is called, so timer-driven behaviour can be stepped deterministically.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::error::{Error, Result};

pub type Task = Box<dyn FnOnce() + Send + 'static>;
pub type RepeatingTask = Arc<dyn Fn() + Send + Sync + 'static>;

/// Shortest period accepted by [`Scheduler::every`].
const MIN_PERIOD: Duration = Duration::from_millis(1);

pub trait Scheduler: Send + Sync {
    /// Runs `task` once after `delay`, unless cancelled first.
    fn after(&self, delay: Duration, task: Task) -> CancelToken;

    /// Runs `task` every `period`, first firing one period from now.
    fn every(&self, period: Duration, task: RepeatingTask) -> CancelToken;
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct CancelInner {
    cancelled: AtomicBool,
    abort: Mutex<Option<AbortHandle>>,
}

/// Handle to a pending timer. Cancelling is idempotent and a cancelled task
/// never starts running.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = lock(&self.inner.abort).take() {
            handle.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    fn attach(&self, handle: AbortHandle) {
        let mut slot = lock(&self.inner.abort);
        if self.is_cancelled() {
            handle.abort();
        } else {
            *slot = Some(handle);
        }
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Binds to the runtime the caller is running on.
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| Error::SchedulerError(format!("no tokio runtime: {}", e)))?;
        Ok(Self::new(handle))
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, task: Task) -> CancelToken {
        let token = CancelToken::new();
        let guard = token.clone();
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if !guard.is_cancelled() {
                task();
            }
        });
        token.attach(join.abort_handle());
        token
    }

    fn every(&self, period: Duration, task: RepeatingTask) -> CancelToken {
        let period = period.max(MIN_PERIOD);
        let token = CancelToken::new();
        let guard = token.clone();
        let join = self.handle.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if guard.is_cancelled() {
                    break;
                }
                task();
            }
        });
        token.attach(join.abort_handle());
        token
    }
}

enum Job {
    Once(Task),
    Repeat(RepeatingTask, Duration),
}

struct Pending {
    job: Job,
    token: CancelToken,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), Pending>,
}

impl ManualState {
    fn push(&mut self, due: Duration, job: Job, token: CancelToken) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((due, seq), Pending { job, token });
    }
}

/// Virtual-clock scheduler. Tasks fire in due-time order (ties in
/// scheduling order) while the clock is advanced, and may schedule further
/// tasks, which fire within the same advance if they fall due in time.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        lock(&self.state).now
    }

    /// Number of scheduled, not yet cancelled tasks.
    pub fn pending(&self) -> usize {
        lock(&self.state)
            .queue
            .values()
            .filter(|p| !p.token.is_cancelled())
            .count()
    }

    pub fn advance(&self, by: Duration) {
        let target = lock(&self.state).now + by;
        loop {
            let next = {
                let mut state = lock(&self.state);
                let due_key = match state.queue.keys().next() {
                    Some(key) if key.0 <= target => *key,
                    _ => break,
                };
                let pending = state.queue.remove(&due_key);
                state.now = due_key.0;
                pending.map(|p| (due_key.0, p))
            };
            let Some((due, pending)) = next else { continue };
            if pending.token.is_cancelled() {
                continue;
            }
            match pending.job {
                Job::Once(task) => task(),
                Job::Repeat(task, period) => {
                    task();
                    if !pending.token.is_cancelled() {
                        let mut state = lock(&self.state);
                        state.push(due + period, Job::Repeat(task, period), pending.token);
                    }
                }
            }
        }
        let mut state = lock(&self.state);
        state.now = target;
        state.queue.retain(|_, p| !p.token.is_cancelled());
        debug!("manual scheduler advanced to {:?}", target);
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay: Duration, task: Task) -> CancelToken {
        let token = CancelToken::new();
        let mut state = lock(&self.state);
        let due = state.now + delay;
        state.push(due, Job::Once(task), token.clone());
        token
    }

    fn every(&self, period: Duration, task: RepeatingTask) -> CancelToken {
        let period = period.max(MIN_PERIOD);
        let token = CancelToken::new();
        let mut state = lock(&self.state);
        let due = state.now + period;
        state.push(due, Job::Repeat(task, period), token.clone());
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let c = Arc::new(AtomicUsize::new(0));
        (c.clone(), c)
    }

    #[test]
    fn test_manual_after_fires_once_at_due_time() {
        let scheduler = ManualScheduler::new();
        let (count, seen) = counter();
        scheduler.after(
            Duration::from_millis(2500),
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        scheduler.advance(Duration::from_millis(2499));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        scheduler.advance(Duration::from_secs(10));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_manual_every_repeats_until_cancelled() {
        let scheduler = ManualScheduler::new();
        let (count, seen) = counter();
        let token = scheduler.every(
            Duration::from_secs(1),
            Arc::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        scheduler.advance(Duration::from_millis(3500));
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        token.cancel();
        token.cancel();
        scheduler.advance(Duration::from_secs(5));
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.now(), Duration::from_millis(8500));
    }

    #[test]
    fn test_manual_tasks_can_reschedule_themselves() {
        let scheduler = Arc::new(ManualScheduler::new());
        let (count, seen) = counter();

        fn arm(scheduler: Arc<ManualScheduler>, count: Arc<AtomicUsize>) {
            let again = scheduler.clone();
            scheduler.after(
                Duration::from_millis(700),
                Box::new(move || {
                    count.fetch_add(1, Ordering::SeqCst);
                    arm(again, count);
                }),
            );
        }

        arm(scheduler.clone(), count);
        scheduler.advance(Duration::from_millis(2100));
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let scheduler = ManualScheduler::new();
        let (count, seen) = counter();
        let token = scheduler.after(
            Duration::from_millis(10),
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );
        token.cancel();
        scheduler.advance(Duration::from_millis(20));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_after_and_cancel() {
        let scheduler = TokioScheduler::current().unwrap();
        let (count, seen) = counter();
        let fired = count.clone();
        scheduler.after(
            Duration::from_millis(100),
            Box::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let token = scheduler.after(
            Duration::from_millis(100),
            Box::new(move || {
                count.fetch_add(10, Ordering::SeqCst);
            }),
        );
        token.cancel();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_every_fixed_period() {
        let scheduler = TokioScheduler::current().unwrap();
        let (count, seen) = counter();
        let token = scheduler.every(
            Duration::from_secs(1),
            Arc::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        token.cancel();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }
}
