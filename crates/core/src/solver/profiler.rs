//! Step timing helpers.
//!
//! Provides an RAII profiling scope and a timer that remembers the last and
//! slowest step of a run.

use std::time::{Duration, Instant};
use tracing::trace;

/// A profiling scope that measures elapsed time using RAII.
///
/// Time is reported through `tracing` at trace level when dropped.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Creates a new profiling scope.
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Time since the scope was opened.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Gets elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        trace!(scope = self.name, elapsed_ms = self.elapsed_ms(), "profiler scope closed");
    }
}

/// Tracks per-step durations over a run.
#[derive(Debug, Default, Clone)]
pub struct FrameTimer {
    last: Duration,
    slowest: Duration,
    total: Duration,
    frames: u32,
}

impl FrameTimer {
    /// Creates a new frame timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one step's duration.
    pub fn record(&mut self, elapsed: Duration) {
        self.last = elapsed;
        self.slowest = self.slowest.max(elapsed);
        self.total += elapsed;
        self.frames += 1;
    }

    /// Gets the last recorded step time in milliseconds.
    pub fn last_frame_time_ms(&self) -> f64 {
        self.last.as_secs_f64() * 1000.0
    }

    /// Gets the slowest recorded step time in milliseconds.
    pub fn slowest_frame_time_ms(&self) -> f64 {
        self.slowest.as_secs_f64() * 1000.0
    }

    /// Mean step time in milliseconds, zero before any step.
    pub fn mean_frame_time_ms(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.frames)
        }
    }

    /// Number of recorded steps.
    pub fn frames(&self) -> u32 {
        self.frames
    }
}
