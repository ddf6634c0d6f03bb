use log::{log_enabled, warn, Level};
use std::time::{Duration, Instant};

/// Scoped timer that traces the wall time of a labelled section.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            log::trace!("end {} ({} µs)", self.label, self.start.elapsed().as_micros());
        }
    }
}

/// Warns when a collision tick ran longer than its budget. Returns whether it did.
pub fn warn_if_tick_budget_exceeded(duration: Duration, budget_ms: f32) -> bool {
    let elapsed_ms = duration.as_secs_f32() * 1000.0;
    if elapsed_ms > budget_ms {
        warn!("collision tick exceeded budget: {elapsed_ms:.2} ms > {budget_ms:.2} ms");
        return true;
    }
    false
}
