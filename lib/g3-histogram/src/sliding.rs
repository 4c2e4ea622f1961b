/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{Reservoir, ReservoirSnapshot, SampleSnapshot};

/// Keeps the most recent `size` values.
pub struct SlidingWindowReservoir {
    size: usize,
    window: Mutex<VecDeque<u64>>,
}

impl SlidingWindowReservoir {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        SlidingWindowReservoir {
            size,
            window: Mutex::new(VecDeque::with_capacity(size)),
        }
    }
}

impl Reservoir for SlidingWindowReservoir {
    fn update(&self, value: u64) {
        let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        if window.len() >= self.size {
            window.pop_front();
        }
        window.push_back(value);
    }

    fn snapshot(&self) -> ReservoirSnapshot {
        let window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        ReservoirSnapshot::Sampled(SampleSnapshot::new(window.iter().copied().collect()))
    }
}
