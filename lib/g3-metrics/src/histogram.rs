/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

use g3_histogram::{HdrReservoir, Reservoir, ReservoirSnapshot};

pub struct Histogram {
    count: AtomicU64,
    reservoir: Box<dyn Reservoir>,
}

impl Histogram {
    pub fn new<R: Reservoir + 'static>(reservoir: R) -> Self {
        Histogram {
            count: AtomicU64::new(0),
            reservoir: Box::new(reservoir),
        }
    }

    /// A histogram backed by a 3 significant figures [`HdrReservoir`].
    pub fn hdr() -> Self {
        Histogram::new(HdrReservoir::new())
    }

    pub fn update(&self, value: u64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.reservoir.update(value);
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ReservoirSnapshot {
        self.reservoir.snapshot()
    }

    /// See [`Reservoir::restore`].
    pub fn restore(&self, snapshot: &ReservoirSnapshot) {
        self.reservoir.restore(snapshot);
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Histogram::hdr()
    }
}
