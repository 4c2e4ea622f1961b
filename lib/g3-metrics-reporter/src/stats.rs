/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use g3_histogram::HdrReservoir;
use g3_metrics::{Counter, GaugeValue, Histogram, Meter, Metric, MetricSet, Timer};

/// Metrics about the reporter itself.
///
/// Values recorded during a tick only show up in the next tick's report when
/// this set is registered into the reported registry.
pub struct ReporterStats {
    reports: Arc<Timer>,
    failed_reports: Arc<Meter>,
    report_size: Arc<Histogram>,
    skipped_unchanged: Arc<Counter>,
    report_count: Arc<AtomicUsize>,
}

impl Default for ReporterStats {
    fn default() -> Self {
        ReporterStats::new()
    }
}

impl ReporterStats {
    pub fn new() -> Self {
        let size_reservoir = HdrReservoir::with_sigfig(2).unwrap_or_default();
        ReporterStats {
            reports: Arc::new(Timer::hdr()),
            failed_reports: Arc::new(Meter::new()),
            report_size: Arc::new(Histogram::new(size_reservoir)),
            skipped_unchanged: Arc::new(Counter::new()),
            report_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Latency of every send, failed ones included.
    #[inline]
    pub fn reports(&self) -> &Timer {
        &self.reports
    }

    #[inline]
    pub fn failed_reports(&self) -> &Meter {
        &self.failed_reports
    }

    /// Size of the request body, after compression.
    #[inline]
    pub fn report_size(&self) -> &Histogram {
        &self.report_size
    }

    #[inline]
    pub fn skipped_unchanged(&self) -> &Counter {
        &self.skipped_unchanged
    }

    pub(crate) fn skipped_unchanged_counter(&self) -> Arc<Counter> {
        self.skipped_unchanged.clone()
    }

    /// Number of metrics seen by the last report, suppressed ones included.
    pub fn report_count(&self) -> usize {
        self.report_count.load(Ordering::Relaxed)
    }

    pub(crate) fn set_report_count(&self, n: usize) {
        self.report_count.store(n, Ordering::Relaxed);
    }
}

impl MetricSet for ReporterStats {
    fn metrics(&self) -> Vec<(String, Metric)> {
        let report_count = self.report_count.clone();
        vec![
            ("reports".to_string(), Metric::Timer(self.reports.clone())),
            (
                "failed-reports".to_string(),
                Metric::Meter(self.failed_reports.clone()),
            ),
            (
                "report-size-bytes".to_string(),
                Metric::Histogram(self.report_size.clone()),
            ),
            (
                "skipped-unchanged".to_string(),
                Metric::Counter(self.skipped_unchanged.clone()),
            ),
            (
                "report-count".to_string(),
                Metric::Gauge(Arc::new(move || {
                    GaugeValue::from(report_count.load(Ordering::Relaxed))
                })),
            ),
        ]
    }
}
