/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use portable_atomic::AtomicF64;

const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Anything carrying a count and the classic 1/5/15 minute moving rates.
///
/// All rates are in events per second.
pub trait Metered {
    fn count(&self) -> u64;
    fn one_minute_rate(&self) -> f64;
    fn five_minute_rate(&self) -> f64;
    fn fifteen_minute_rate(&self) -> f64;
    fn mean_rate(&self) -> f64;
}

struct Ewma {
    alpha: f64,
    rate: AtomicF64,
    uncounted: AtomicU64,
    initialized: AtomicBool,
}

impl Ewma {
    fn with_minutes(minutes: f64) -> Self {
        let alpha = 1.0 - (-TICK_INTERVAL.as_secs_f64() / 60.0 / minutes).exp();
        Ewma {
            alpha,
            rate: AtomicF64::new(0.0),
            uncounted: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    fn update(&self, n: u64) {
        self.uncounted.fetch_add(n, Ordering::Relaxed);
    }

    fn tick(&self) {
        let count = self.uncounted.swap(0, Ordering::Relaxed);
        let instant_rate = count as f64 / TICK_INTERVAL.as_secs_f64();
        if self.initialized.swap(true, Ordering::Relaxed) {
            let rate = self.rate.load(Ordering::Relaxed);
            self.rate
                .store(rate + self.alpha * (instant_rate - rate), Ordering::Relaxed);
        } else {
            self.rate.store(instant_rate, Ordering::Relaxed);
        }
    }

    fn rate(&self) -> f64 {
        self.rate.load(Ordering::Relaxed)
    }
}

pub struct Meter {
    count: AtomicU64,
    start: Instant,
    last_tick_nanos: AtomicU64,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
}

impl Default for Meter {
    fn default() -> Self {
        Meter::new()
    }
}

impl Meter {
    pub fn new() -> Self {
        Meter {
            count: AtomicU64::new(0),
            start: Instant::now(),
            last_tick_nanos: AtomicU64::new(0),
            m1: Ewma::with_minutes(1.0),
            m5: Ewma::with_minutes(5.0),
            m15: Ewma::with_minutes(15.0),
        }
    }

    pub fn mark(&self) {
        self.mark_n(1);
    }

    pub fn mark_n(&self, n: u64) {
        self.tick_if_necessary();
        self.count.fetch_add(n, Ordering::Relaxed);
        self.m1.update(n);
        self.m5.update(n);
        self.m15.update(n);
    }

    fn elapsed_nanos(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn tick_if_necessary(&self) {
        let old_tick = self.last_tick_nanos.load(Ordering::Acquire);
        let now = self.elapsed_nanos();
        let age = now.saturating_sub(old_tick);
        let interval = TICK_INTERVAL.as_nanos() as u64;
        if age <= interval {
            return;
        }

        let new_tick = now - age % interval;
        if self
            .last_tick_nanos
            .compare_exchange(old_tick, new_tick, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            for _ in 0..age / interval {
                self.m1.tick();
                self.m5.tick();
                self.m15.tick();
            }
        }
    }
}

impl Metered for Meter {
    fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    fn one_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m1.rate()
    }

    fn five_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m5.rate()
    }

    fn fifteen_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m15.rate()
    }

    fn mean_rate(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        let elapsed = self.start.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            0.0
        } else {
            count as f64 / elapsed
        }
    }
}
