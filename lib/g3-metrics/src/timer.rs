/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::{Duration, Instant};

use g3_histogram::{Reservoir, ReservoirSnapshot};

use crate::{Histogram, Meter, Metered};

/// A meter of events plus a histogram of their durations in nanoseconds.
pub struct Timer {
    meter: Meter,
    histogram: Histogram,
}

impl Default for Timer {
    fn default() -> Self {
        Timer::hdr()
    }
}

impl Timer {
    pub fn new<R: Reservoir + 'static>(reservoir: R) -> Self {
        Timer {
            meter: Meter::new(),
            histogram: Histogram::new(reservoir),
        }
    }

    pub fn hdr() -> Self {
        Timer {
            meter: Meter::new(),
            histogram: Histogram::hdr(),
        }
    }

    pub fn update(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.histogram.update(nanos);
        self.meter.mark();
    }

    /// Start timing, the elapsed time is recorded when the context is dropped
    /// or stopped.
    pub fn time(&self) -> TimerContext<'_> {
        TimerContext {
            timer: self,
            start: Instant::now(),
            stopped: false,
        }
    }

    pub fn snapshot(&self) -> ReservoirSnapshot {
        self.histogram.snapshot()
    }

    pub fn restore(&self, snapshot: &ReservoirSnapshot) {
        self.histogram.restore(snapshot);
    }
}

impl Metered for Timer {
    fn count(&self) -> u64 {
        self.histogram.count()
    }

    fn one_minute_rate(&self) -> f64 {
        self.meter.one_minute_rate()
    }

    fn five_minute_rate(&self) -> f64 {
        self.meter.five_minute_rate()
    }

    fn fifteen_minute_rate(&self) -> f64 {
        self.meter.fifteen_minute_rate()
    }

    fn mean_rate(&self) -> f64 {
        self.meter.mean_rate()
    }
}

pub struct TimerContext<'a> {
    timer: &'a Timer,
    start: Instant,
    stopped: bool,
}

impl TimerContext<'_> {
    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let elapsed = self.start.elapsed();
        if !self.stopped {
            self.stopped = true;
            self.timer.update(elapsed);
        }
        elapsed
    }
}

impl Drop for TimerContext<'_> {
    fn drop(&mut self) {
        self.record();
    }
}
