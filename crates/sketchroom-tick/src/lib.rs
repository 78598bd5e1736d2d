//! Round timers for Sketchroom.
//!
//! Two owned timer primitives, both designed to sit inside a room actor's
//! `tokio::select!` loop:
//!
//! - [`TickScheduler`]: a restartable fixed-period ticker. A room owns
//!   exactly one and drives its round countdown from it. Restarting it
//!   replaces any running countdown, so two countdowns can never overlap.
//! - [`Deadline`]: a one-shot timer for deferred actions such as the pause
//!   between rounds.
//!
//! Neither type spawns a task. While stopped (or disarmed) their wait
//! futures pend forever, which lets `select!` keep servicing other branches:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         info = countdown.wait_for_tick() => { /* one second elapsed */ }
//!         () = intermission.elapsed() => { /* start the next round */ }
//!     }
//! }
//! ```
//!
//! Both wait futures are cancel-safe: state only changes after the
//! underlying sleep completes.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Tick info (returned to caller each tick)
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickInfo {
    /// Ticks fired since the last [`TickScheduler::start`] (starts at 1).
    pub tick: u64,
    /// Fixed tick period.
    pub dt: Duration,
    /// `true` if this tick fired late (more than 10% of a period).
    pub overrun: bool,
    /// Whole periods that elapsed unobserved before this tick fired.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Restartable fixed-period ticker.
///
/// Created stopped. [`start`](Self::start) arms the first tick one period
/// from now; [`stop`](Self::stop) is the single cancellation point.
#[derive(Debug)]
pub struct TickScheduler {
    tick_duration: Duration,
    tick_count: u64,
    /// When the next tick should fire. `None` while stopped.
    next_tick: Option<Instant>,
}

impl TickScheduler {
    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Creates a stopped scheduler with the given period.
    ///
    /// A zero period is bumped to one millisecond.
    pub fn new(tick_duration: Duration) -> Self {
        let tick_duration = tick_duration.max(Duration::from_millis(1));
        debug!(period_ms = tick_duration.as_millis() as u64, "tick scheduler created");
        Self {
            tick_duration,
            tick_count: 0,
            next_tick: None,
        }
    }

    /// Creates a stopped scheduler ticking `tick_rate_hz` times a second.
    ///
    /// The rate is clamped to `1..=MAX_TICK_RATE_HZ`.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        let clamped = tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ);
        if clamped != tick_rate_hz {
            warn!(
                rate = tick_rate_hz,
                clamped, "tick rate out of range, clamping"
            );
        }
        Self::new(Duration::from_secs_f64(1.0 / clamped as f64))
    }

    /// Starts (or restarts) the ticker. The first tick fires one period
    /// from now and the tick counter resets.
    pub fn start(&mut self) {
        if self.next_tick.is_some() {
            debug!(tick = self.tick_count, "replacing running ticker");
        }
        self.tick_count = 0;
        self.next_tick = Some(Instant::now() + self.tick_duration);
    }

    /// Stops the ticker. [`wait_for_tick`](Self::wait_for_tick) pends
    /// until the next [`start`](Self::start). Idempotent.
    pub fn stop(&mut self) {
        if self.next_tick.take().is_some() {
            debug!(tick = self.tick_count, "ticker stopped");
        }
    }

    /// Whether a tick is scheduled.
    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Waits until the next tick is due.
    ///
    /// While stopped this future never resolves.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let Some(next) = self.next_tick else {
            return std::future::pending().await;
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        let dt = self.tick_duration;
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > dt / 10;
        let ticks_skipped = (late_by.as_nanos() / dt.as_nanos()) as u64;

        // Keep the existing cadence unless a whole period was missed, then
        // resume from now instead of firing a burst.
        self.next_tick = Some(if ticks_skipped > 0 {
            warn!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick overrun, skipping ahead"
            );
            now + dt
        } else {
            next + dt
        });

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt,
            overrun,
            ticks_skipped,
        }
    }

    /// Ticks fired since the last start.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The fixed tick period.
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

/// A one-shot timer.
///
/// Arming an already armed deadline moves it. There is no way to cancel
/// one: whoever reacts to [`elapsed`](Self::elapsed) re-checks its own
/// state before acting.
#[derive(Debug, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// Creates a disarmed deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the deadline to fire `after` from now.
    pub fn arm(&mut self, after: Duration) {
        self.at = Some(Instant::now() + after);
    }

    /// Whether the deadline is waiting to fire.
    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    /// Resolves once the armed deadline passes, then disarms it.
    ///
    /// While disarmed this future never resolves.
    pub async fn elapsed(&mut self) {
        let Some(at) = self.at else {
            return std::future::pending().await;
        };
        time::sleep_until(at).await;
        self.at = None;
    }
}
