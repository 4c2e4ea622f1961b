/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Mutex};

use hdrhistogram::{CreationError, Histogram};
use tokio::sync::mpsc;

use crate::{HistogramRecorder, HistogramSnapshot, SampleSnapshot};

pub trait Reservoir: Send + Sync {
    fn update(&self, value: u64);

    fn snapshot(&self) -> ReservoirSnapshot;

    /// Hand back the since-last part of a snapshot whose data was not
    /// delivered, so that it is covered again by the next snapshot.
    fn restore(&self, _snapshot: &ReservoirSnapshot) {}
}

pub enum ReservoirSnapshot {
    Sampled(SampleSnapshot),
    Hdr(HdrSnapshot),
}

/// The two projections of an [`HdrReservoir`] taken at the same instant.
#[derive(Clone)]
pub struct HdrSnapshot {
    total: HistogramSnapshot,
    since_last: HistogramSnapshot,
}

impl HdrSnapshot {
    /// Everything recorded since the reservoir was created.
    #[inline]
    pub fn total(&self) -> &HistogramSnapshot {
        &self.total
    }

    /// Everything recorded since the previous snapshot.
    #[inline]
    pub fn since_last(&self) -> &HistogramSnapshot {
        &self.since_last
    }
}

pub(crate) struct HdrState {
    receiver: mpsc::UnboundedReceiver<u64>,
    total: Histogram<u64>,
    interval: Histogram<u64>,
}

fn record_value(h: &mut Histogram<u64>, v: u64) {
    // out of range for a fixed or maxed out histogram
    if h.record(v).is_err() {
        h.saturating_record(v);
    }
}

impl HdrState {
    fn record(&mut self, v: u64) {
        record_value(&mut self.total, v);
        record_value(&mut self.interval, v);
    }

    pub(crate) fn backlog(&self) -> usize {
        self.receiver.len()
    }

    pub(crate) fn refresh(&mut self) {
        while let Ok(v) = self.receiver.try_recv() {
            self.record(v);
        }
    }
}

/// Reservoir keeping a lifetime histogram and one that is rotated on every
/// snapshot.
pub struct HdrReservoir {
    recorder: HistogramRecorder,
    state: Arc<Mutex<HdrState>>,
}

impl HdrReservoir {
    pub fn new() -> Self {
        HdrReservoir::with_sigfig(3).unwrap()
    }

    pub fn with_sigfig(sigfig: u8) -> Result<Self, CreationError> {
        let total = Histogram::new(sigfig)?;
        let interval = Histogram::new(sigfig)?;
        Ok(HdrReservoir::build(total, interval))
    }

    pub fn new_with_max(high: u64, sigfig: u8) -> Result<Self, CreationError> {
        let mut total = Histogram::new_with_max(high, sigfig)?;
        total.auto(true);
        let mut interval = Histogram::new_with_max(high, sigfig)?;
        interval.auto(true);
        Ok(HdrReservoir::build(total, interval))
    }

    fn build(total: Histogram<u64>, interval: Histogram<u64>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(HdrState {
            receiver,
            total,
            interval,
        }));
        HdrReservoir {
            recorder: HistogramRecorder::new(sender, Arc::downgrade(&state)),
            state,
        }
    }

    pub fn recorder(&self) -> HistogramRecorder {
        self.recorder.clone()
    }

    pub fn hdr_snapshot(&self) -> HdrSnapshot {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.refresh();
        let snapshot = HdrSnapshot {
            total: HistogramSnapshot::new(state.total.clone()),
            since_last: HistogramSnapshot::new(state.interval.clone()),
        };
        state.interval.reset();
        snapshot
    }
}

impl Default for HdrReservoir {
    fn default() -> Self {
        HdrReservoir::new()
    }
}

impl Reservoir for HdrReservoir {
    fn update(&self, value: u64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.refresh();
        state.record(value);
    }

    fn snapshot(&self) -> ReservoirSnapshot {
        ReservoirSnapshot::Hdr(self.hdr_snapshot())
    }

    fn restore(&self, snapshot: &ReservoirSnapshot) {
        let ReservoirSnapshot::Hdr(s) = snapshot else {
            return;
        };
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.interval.add(s.since_last().inner()).is_err() {
            for v in s.since_last().inner().iter_recorded() {
                state
                    .interval
                    .saturating_record_n(v.value_iterated_to(), v.count_at_value());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Snapshot;
    use crate::recorder::BACKLOG_LIMIT;
    use std::thread;

    fn backlog(r: &HdrReservoir) -> usize {
        r.state.lock().unwrap().backlog()
    }

    #[test]
    fn projections() {
        let r = HdrReservoir::new();
        for v in 1..=10 {
            r.update(v);
        }

        let s = r.hdr_snapshot();
        assert_eq!(s.total().len(), 10);
        assert_eq!(s.since_last().len(), 10);

        r.update(1000);
        r.update(2000);
        let s = r.hdr_snapshot();
        assert_eq!(s.total().len(), 12);
        assert_eq!(s.total().min(), 1);
        assert_eq!(s.since_last().len(), 2);
        assert_eq!(s.since_last().min(), 1000);
        assert_eq!(s.since_last().max(), 2000);

        let s = r.hdr_snapshot();
        assert_eq!(s.total().len(), 12);
        assert!(s.since_last().is_empty());
    }

    #[test]
    fn shared_recorder() {
        let r = Arc::new(HdrReservoir::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let recorder = r.recorder();
            handles.push(thread::spawn(move || {
                for v in 0..100 {
                    assert!(recorder.record(v));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let ReservoirSnapshot::Hdr(s) = r.snapshot() else {
            panic!("expected hdr snapshot");
        };
        assert_eq!(s.total().len(), 400);
        assert_eq!(s.since_last().len(), 400);
    }

    #[test]
    fn wide_range() {
        let r = HdrReservoir::new();
        r.update(5000);
        r.update(20_000_000);
        r.recorder().record(3_600_000_000_000);

        let s = r.hdr_snapshot();
        let total = s.total();
        assert_eq!(total.len(), 3);
        assert_eq!(total.min(), 5000);
        assert!(total.max() >= 3_600_000_000_000);
        assert!(total.mean() > 1_000_000_000_000.0);

        let since_last = s.since_last();
        assert_eq!(since_last.min(), 5000);
        assert!(since_last.max() >= 3_600_000_000_000);
    }

    #[test]
    fn restore_since_last() {
        let r = HdrReservoir::new();
        r.update(10);
        r.update(20);
        let lost = r.snapshot();

        r.update(3000);
        r.restore(&lost);
        let s = r.hdr_snapshot();
        assert_eq!(s.since_last().len(), 3);
        assert_eq!(s.since_last().min(), 10);
        assert!(s.since_last().max() >= 3000);
        // the lifetime projection never lost them
        assert_eq!(s.total().len(), 3);

        r.restore(&ReservoirSnapshot::Sampled(SampleSnapshot::new(vec![1, 2])));
        assert!(r.hdr_snapshot().since_last().is_empty());
    }

    #[test]
    fn backlog_bounded() {
        let r = HdrReservoir::new();
        let recorder = r.recorder();
        for v in 0..100_000 {
            assert!(recorder.record(v));
        }
        assert!(backlog(&r) < BACKLOG_LIMIT);

        r.update(1);
        assert_eq!(backlog(&r), 0);

        let s = r.hdr_snapshot();
        assert_eq!(s.total().len(), 100_001);
    }

    #[test]
    fn dropped_reservoir() {
        let r = HdrReservoir::new();
        let recorder = r.recorder();
        drop(r);
        assert!(!recorder.record(1));
    }

    #[test]
    fn bounded_auto_resize() {
        let r = HdrReservoir::new_with_max(1000, 2).unwrap();
        r.update(10);
        r.update(1_000_000);
        let s = r.hdr_snapshot();
        assert_eq!(s.total().len(), 2);
        assert!(s.total().max() >= 1000);
    }
}
