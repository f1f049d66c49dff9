//! Session elapsed-time accounting.
//!
//! A [`SessionClock`] measures active play time for one session: time spent
//! paused never counts. Readings come from a [`Clock`] so tests can drive time
//! by hand with [`ManualClock`].

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Paused { since: Duration },
    Finished { elapsed_secs: u64 },
}

/// Elapsed-time accumulator with pause/resume support.
///
/// Instants are stored as offsets from the clock's origin. `resume` shifts the
/// start forward by the paused interval, so `now - start` is always the
/// active time.
pub struct SessionClock {
    clock: Arc<dyn Clock>,
    start: Duration,
    phase: Phase,
}

impl SessionClock {
    /// Clock backed by the system monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            start: Duration::ZERO,
            phase: Phase::Idle,
        }
    }

    /// Record the start instant. Calling it again restarts the measurement.
    pub fn start(&mut self) {
        self.start = self.clock.now();
        self.phase = Phase::Running;
        debug!("session clock started");
    }

    /// Freeze accrual. Idempotent while paused; no-op unless running.
    pub fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused {
                since: self.clock.now(),
            };
            trace!(elapsed_secs = self.elapsed_seconds(), "session clock paused");
        }
    }

    /// Resume after a pause. No-op without a preceding pause.
    pub fn resume(&mut self) {
        if let Phase::Paused { since } = self.phase {
            let paused_for = self.clock.now().saturating_sub(since);
            self.start += paused_for;
            self.phase = Phase::Running;
            trace!(paused_ms = paused_for.as_millis() as u64, "session clock resumed");
        }
    }

    /// Whole seconds of active time.
    ///
    /// 0 before `start`, frozen while paused, fixed after `finish`.
    pub fn elapsed_seconds(&self) -> u64 {
        match self.phase {
            Phase::Idle => 0,
            Phase::Running => self.clock.now().saturating_sub(self.start).as_secs(),
            Phase::Paused { since } => since.saturating_sub(self.start).as_secs(),
            Phase::Finished { elapsed_secs } => elapsed_secs,
        }
    }

    /// Stop measuring and return the final value. Later calls return the same value.
    pub fn finish(&mut self) -> u64 {
        let elapsed_secs = self.elapsed_seconds();
        if !matches!(self.phase, Phase::Finished { .. }) {
            self.phase = Phase::Finished { elapsed_secs };
            debug!(elapsed_secs, "session clock finished");
        }
        elapsed_secs
    }

    /// Discard the current measurement and start a new one.
    pub fn restart(&mut self) {
        self.start();
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase, Phase::Paused { .. })
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
