/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};
use prost::Message;

use g3_metrics::{MetricFilter, MetricRegistry, RegistrySnapshot};

use crate::builder::ReportBuilder;
use crate::config::ReporterConfig;
use crate::error::ReportError;
use crate::ledger::ChangeLedger;
use crate::report::AlertRecord;
use crate::stats::ReporterStats;
use crate::transport::HttpTransport;

pub trait Clock: Send + Sync {
    /// Milliseconds since the unix epoch.
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

pub type StatusSupplier = Box<dyn Fn() -> Option<String> + Send + Sync>;
pub type AlertSupplier = Box<dyn Fn() -> Vec<AlertRecord> + Send + Sync>;

/// Sends one report of the registry per call to [`MetricsReporter::report`].
///
/// Scheduling is left to the caller. Each call blocks for the whole http
/// exchange.
pub struct MetricsReporter {
    registry: Arc<MetricRegistry>,
    filter: Option<MetricFilter>,
    builder: ReportBuilder,
    transport: HttpTransport,
    ledger: ChangeLedger,
    stats: Arc<ReporterStats>,
    clock: Box<dyn Clock>,
    status_supplier: Option<StatusSupplier>,
    alert_supplier: Option<AlertSupplier>,
}

impl MetricsReporter {
    pub fn new(config: &ReporterConfig, registry: Arc<MetricRegistry>) -> anyhow::Result<Self> {
        config.check()?;

        let stats = Arc::new(ReporterStats::new());
        let transport = HttpTransport::new(config, stats.clone())?;
        let builder = ReportBuilder::new(
            config.schema,
            config.identity(),
            config.unit_converter(),
            config.hdr_report,
        );
        let ledger = ChangeLedger::new(config.skip_unchanged, stats.skipped_unchanged_counter());

        Ok(MetricsReporter {
            registry,
            filter: None,
            builder,
            transport,
            ledger,
            stats,
            clock: Box::new(SystemClock),
            status_supplier: None,
            alert_supplier: None,
        })
    }

    pub fn set_filter(&mut self, filter: MetricFilter) {
        self.filter = Some(filter);
    }

    pub fn set_clock<C: Clock + 'static>(&mut self, clock: C) {
        self.clock = Box::new(clock);
    }

    pub fn set_status_supplier<F>(&mut self, f: F)
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.status_supplier = Some(Box::new(f));
    }

    pub fn set_alert_supplier<F>(&mut self, f: F)
    where
        F: Fn() -> Vec<AlertRecord> + Send + Sync + 'static,
    {
        self.alert_supplier = Some(Box::new(f));
    }

    /// The reporter's own metrics, register them with
    /// [`MetricRegistry::register_set`] to have them reported.
    pub fn stats(&self) -> Arc<ReporterStats> {
        self.stats.clone()
    }

    #[inline]
    pub fn ledger(&self) -> &ChangeLedger {
        &self.ledger
    }

    /// Report the current registry content.
    ///
    /// Any error is already counted in the failed reports meter and logged
    /// when returned, so callers are free to ignore it.
    pub fn report(&mut self) -> Result<u16, ReportError> {
        let snapshot = match &self.filter {
            Some(filter) => self.registry.snapshot_filtered(filter),
            None => self.registry.snapshot(),
        };
        self.report_snapshot(&snapshot)
    }

    pub fn report_snapshot(&mut self, snapshot: &RegistrySnapshot) -> Result<u16, ReportError> {
        match self.do_report(snapshot) {
            Ok(status) => {
                debug!("reported metrics to {} ({status})", self.transport.uri());
                Ok(status)
            }
            Err(e) => {
                self.stats.failed_reports().mark();
                warn!("unable to report metrics to {}: {e}", self.transport.uri());
                Err(e)
            }
        }
    }

    fn do_report(&mut self, snapshot: &RegistrySnapshot) -> Result<u16, ReportError> {
        let timestamp = self.clock.now_millis();
        let status_text = self.status_supplier.as_ref().and_then(|f| f());
        let alerts = self
            .alert_supplier
            .as_ref()
            .map(|f| f())
            .unwrap_or_default();

        let built = self
            .builder
            .build(timestamp, status_text, alerts, snapshot, &self.ledger)?;
        self.stats.set_report_count(built.metric_count);

        let status = match self.transport.send(built.report.encode_to_vec()) {
            Ok(status) => status,
            Err(e) => {
                built.restore_reservoirs();
                return Err(e.into());
            }
        };
        if (200..300).contains(&status) {
            self.ledger.commit(built.ledger_update);
            Ok(status)
        } else {
            built.restore_reservoirs();
            Err(ReportError::Status(status))
        }
    }
}
