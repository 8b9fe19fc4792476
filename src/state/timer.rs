//! Countdown timer state machine
//!
//! One `Timer` per active session. The `run` loop is the sole driver of
//! progress: once per tick it recomputes the stored remaining time from a
//! monotonic start instant instead of decrementing a counter, so scheduling
//! jitter never biases the measured duration.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::{interval, Instant};
use tracing::debug;

/// Tick period of the countdown loop. Remaining time is only as fresh as the
/// last tick; the design is coarse on purpose.
pub const TICK: Duration = Duration::from_secs(1);

/// Completion action supplied by the orchestrating layer. The timer knows
/// nothing about registries or mute controllers; it awaits this once when the
/// countdown reaches zero.
pub type CompletionAction = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Cloneable handle to one countdown. All clones share the same state, so the
/// registry can keep one while the run loop drives another.
#[derive(Clone)]
pub struct Timer {
    inner: Arc<TimerInner>,
}

struct TimerInner {
    total: Duration,
    clock: Mutex<ClockState>,
    on_complete: Mutex<Option<CompletionAction>>,
}

#[derive(Debug)]
struct ClockState {
    /// Instant `run` started, shifted forward on resume so wall time spent
    /// paused never counts against the deadline.
    base: Option<Instant>,
    remaining: Duration,
    paused: bool,
    paused_at: Option<Instant>,
    /// Whole ticks spent paused. Informational only: reported on resume,
    /// never folded back into `remaining`.
    paused_ticks: u64,
    completed: bool,
}

/// Point-in-time copy of a timer's externally visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub total: Duration,
    pub remaining: Duration,
    pub paused: bool,
    pub paused_ticks: u64,
    pub completed: bool,
}

impl Timer {
    /// Construct a running timer. No side effects beyond allocation; nothing
    /// moves until [`run`](Timer::run) is called. The duration must be
    /// positive; the session layer rejects zero before getting here.
    pub fn new(total: Duration, on_complete: CompletionAction) -> Self {
        Self {
            inner: Arc::new(TimerInner {
                total,
                clock: Mutex::new(ClockState {
                    base: None,
                    remaining: total,
                    paused: false,
                    paused_at: None,
                    paused_ticks: 0,
                    completed: false,
                }),
                on_complete: Mutex::new(Some(on_complete)),
            }),
        }
    }

    pub fn total(&self) -> Duration {
        self.inner.total
    }

    pub fn remaining(&self) -> Duration {
        self.lock_clock().remaining
    }

    pub fn is_paused(&self) -> bool {
        self.lock_clock().paused
    }

    pub fn is_completed(&self) -> bool {
        self.lock_clock().completed
    }

    pub fn paused_ticks(&self) -> u64 {
        self.lock_clock().paused_ticks
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let clock = self.lock_clock();
        TimerSnapshot {
            total: self.inner.total,
            remaining: clock.remaining,
            paused: clock.paused,
            paused_ticks: clock.paused_ticks,
            completed: clock.completed,
        }
    }

    /// Drive the countdown to completion. Must be called exactly once per
    /// timer; the registry spawns it right after inserting the handle.
    ///
    /// Unpaused ticks recompute `remaining` from the elapsed-while-running
    /// wall clock; paused ticks only bump the informational counter. On
    /// natural exit the completion action is awaited exactly once.
    pub async fn run(&self) {
        let mut ticks = interval(TICK);
        {
            let mut clock = self.lock_clock();
            clock.base = Some(Instant::now());
        }

        loop {
            ticks.tick().await;
            let mut clock = self.lock_clock();
            if clock.completed {
                return;
            }
            if clock.paused {
                clock.paused_ticks += 1;
                continue;
            }
            let Some(base) = clock.base else { continue };
            clock.remaining = self.inner.total.saturating_sub(base.elapsed());
            if clock.remaining.is_zero() {
                clock.completed = true;
                break;
            }
        }

        debug!(total_seconds = self.inner.total.as_secs(), "countdown reached zero");
        let action = self
            .inner
            .on_complete
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(action) = action {
            action().await;
        }
    }

    /// Freeze the countdown. Returns false when the timer was already paused,
    /// so the session layer can report the duplicate without a second lock.
    pub fn pause(&self) -> bool {
        let mut clock = self.lock_clock();
        if clock.paused {
            return false;
        }
        clock.paused = true;
        clock.paused_at = Some(Instant::now());
        true
    }

    /// Unfreeze the countdown, pushing the start base forward by the wall
    /// time spent paused so the freeze is not charged against `remaining`.
    /// Returns the accumulated paused-tick count, or `None` when the timer
    /// was not paused.
    pub fn resume(&self) -> Option<u64> {
        let mut clock = self.lock_clock();
        if !clock.paused {
            return None;
        }
        clock.paused = false;
        if let (Some(paused_at), Some(base)) = (clock.paused_at.take(), clock.base) {
            clock.base = Some(base + paused_at.elapsed());
        }
        Some(clock.paused_ticks)
    }

    fn lock_clock(&self) -> MutexGuard<'_, ClockState> {
        self.inner
            .clock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("Timer")
            .field("total", &snapshot.total)
            .field("remaining", &snapshot.remaining)
            .field("paused", &snapshot.paused)
            .field("paused_ticks", &snapshot.paused_ticks)
            .field("completed", &snapshot.completed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn counting_action(counter: Arc<AtomicUsize>) -> CompletionAction {
        Box::new(move || {
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
    }

    fn noop_action() -> CompletionAction {
        Box::new(|| futures::future::ready(()).boxed())
    }

    fn spawn_run(timer: &Timer) -> tokio::task::JoinHandle<()> {
        let runner = timer.clone();
        tokio::spawn(async move { runner.run().await })
    }

    #[tokio::test(start_paused = true)]
    async fn completes_once_and_fires_action_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timer = Timer::new(secs(3), counting_action(Arc::clone(&fired)));

        spawn_run(&timer).await.unwrap();

        assert!(timer.is_completed());
        assert_eq!(timer.remaining(), Duration::ZERO);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_tracks_elapsed_wall_clock() {
        let timer = Timer::new(secs(10), noop_action());
        spawn_run(&timer);

        sleep(Duration::from_millis(50)).await;
        assert_eq!(timer.remaining(), secs(10));

        sleep(secs(4)).await;
        assert_eq!(timer.remaining(), secs(6));

        sleep(secs(3)).await;
        assert_eq!(timer.remaining(), secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_then_immediate_resume_keeps_remaining() {
        let timer = Timer::new(secs(10), noop_action());
        spawn_run(&timer);

        sleep(secs(2) + Duration::from_millis(50)).await;
        assert_eq!(timer.remaining(), secs(8));

        assert!(timer.pause());
        assert_eq!(timer.resume(), Some(0));
        assert_eq!(timer.remaining(), secs(8));

        // Countdown picks up exactly where it left off.
        sleep(secs(1)).await;
        assert_eq!(timer.remaining(), secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn paused_wall_time_is_not_charged_against_remaining() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timer = Timer::new(secs(5), counting_action(Arc::clone(&fired)));
        spawn_run(&timer);

        sleep(secs(2) + Duration::from_millis(50)).await;
        assert_eq!(timer.remaining(), secs(3));

        assert!(timer.pause());
        assert!(!timer.pause(), "second pause reports no transition");

        sleep(secs(3)).await;
        assert_eq!(timer.remaining(), secs(3), "remaining frozen while paused");
        assert!(!timer.is_completed());

        assert_eq!(timer.resume(), Some(3));
        assert_eq!(timer.resume(), None, "second resume reports no transition");

        sleep(secs(2)).await;
        assert_eq!(timer.remaining(), secs(1));

        sleep(secs(1) + Duration::from_millis(50)).await;
        assert!(timer.is_completed());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_resume_after_completion_do_not_refire() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timer = Timer::new(secs(1), counting_action(Arc::clone(&fired)));

        spawn_run(&timer).await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        timer.pause();
        timer.resume();
        sleep(secs(5)).await;

        assert!(timer.is_completed());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
