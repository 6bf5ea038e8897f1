//! Fixed-step clock that converts frame time into whole simulation ticks.

use std::time::Duration;

/// Most ticks released by a single frame; older backlog is dropped.
const MAX_CATCH_UP_TICKS: u32 = 5;

/// Accumulates frame time and releases fixed-length ticks.
#[derive(Debug)]
pub(crate) struct FixedStep {
    step: Duration,
    accumulated: Duration,
}

impl FixedStep {
    pub(crate) fn new(step: Duration) -> Self {
        Self {
            step,
            accumulated: Duration::ZERO,
        }
    }

    /// Adds `dt` to the accumulator and returns how many ticks are due.
    pub(crate) fn advance(&mut self, dt: Duration) -> u32 {
        if self.step.is_zero() {
            return 0;
        }

        self.accumulated = self.accumulated.saturating_add(dt);
        let mut due = 0;
        while self.accumulated >= self.step {
            self.accumulated -= self.step;
            due += 1;
        }

        if due > MAX_CATCH_UP_TICKS {
            self.accumulated = Duration::ZERO;
            due = MAX_CATCH_UP_TICKS;
        }
        due
    }
}
