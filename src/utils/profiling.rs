use std::time::{Duration, Instant};

use log::debug;

/// Counters and timings gathered during one `update` call.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TickProfile {
    pub query_time: Duration,
    pub total_time: Duration,

    pub kinetic_scanned: usize,
    pub static_hits: usize,
    pub triggers_fired: usize,
    pub resolutions: usize,
    /// Kinetic entities skipped because their lock was held during the tick.
    pub skipped_busy: usize,
}

impl TickProfile {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn report(&self) {
        debug!(
            "collision tick: kinetic {}, hits {}, triggers {}, resolutions {}, skipped {}, query {:.3} ms of {:.3} ms",
            self.kinetic_scanned,
            self.static_hits,
            self.triggers_fired,
            self.resolutions,
            self.skipped_busy,
            self.query_time.as_secs_f32() * 1000.0,
            self.total_time.as_secs_f32() * 1000.0,
        );
    }
}

/// Adds the elapsed time of its scope to a duration slot.
pub struct AccumulatingTimer<'a> {
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> AccumulatingTimer<'a> {
    pub fn new(output: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            output,
        }
    }
}

impl<'a> Drop for AccumulatingTimer<'a> {
    fn drop(&mut self) {
        *self.output += self.start.elapsed();
    }
}
