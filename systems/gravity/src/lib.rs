#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fall-interval accumulator that turns elapsed time into descend commands.

use std::time::Duration;

use arcade_core::puzzle::{Command, Event};

/// Default interval between automatic descents.
pub const DEFAULT_FALL_INTERVAL: Duration = Duration::from_millis(500);

/// Pure system that drops the active piece once per fall interval.
#[derive(Debug)]
pub struct Gravity {
    fall_interval: Duration,
    accumulated: Duration,
    halted: bool,
}

impl Gravity {
    /// Creates a gravity system that descends once per `fall_interval`.
    #[must_use]
    pub fn new(fall_interval: Duration) -> Self {
        Self {
            fall_interval,
            accumulated: Duration::ZERO,
            halted: false,
        }
    }

    /// Consumes world events and emits at most one descend per interval.
    ///
    /// The accumulator restarts from zero after each descent and discards the
    /// remainder. Game over halts the system for good.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } if !self.halted => {
                    self.accumulated = self.accumulated.saturating_add(*dt);
                }
                Event::GameOver { .. } => {
                    self.halted = true;
                    self.accumulated = Duration::ZERO;
                }
                _ => {}
            }
        }

        if self.halted || self.fall_interval.is_zero() {
            return;
        }

        if self.accumulated >= self.fall_interval {
            self.accumulated = Duration::ZERO;
            out.push(Command::Descend);
        }
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(DEFAULT_FALL_INTERVAL)
    }
}
