/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use g3_histogram::ReservoirSnapshot;
use g3_metrics::{GaugeValue, Histogram, Metered, RegistrySnapshot, Timer};

use crate::UnitConverter;
use crate::encode::{HdrReportMode, encode_histogram};
use crate::error::EncodeError;
use crate::ledger::{ChangeLedger, LedgerUpdate};
use crate::report::{
    AlertRecord, CounterRecord, GaugeRecord, HistogramRecord, MeterRecord, Report, TimerRecord,
    gauge_record,
};

/// Wire schema variant written into every report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Without role, description, status and alerts.
    Legacy,
    #[default]
    Current,
}

impl SchemaVersion {
    pub fn version(self) -> u32 {
        match self {
            SchemaVersion::Legacy => 2,
            SchemaVersion::Current => 3,
        }
    }

    fn has_extended_fields(self) -> bool {
        matches!(self, SchemaVersion::Current)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
    pub application: Option<String>,
    pub host: Option<String>,
    pub instance: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
}

enum TakenSnapshot {
    Histogram(Arc<Histogram>, ReservoirSnapshot),
    Timer(Arc<Timer>, ReservoirSnapshot),
}

fn restore_all(taken: Vec<TakenSnapshot>) {
    for entry in taken {
        match entry {
            TakenSnapshot::Histogram(h, s) => h.restore(&s),
            TakenSnapshot::Timer(t, s) => t.restore(&s),
        }
    }
}

pub struct BuiltReport {
    pub report: Report,
    /// Number of metrics in the source snapshot, suppressed ones included.
    pub metric_count: usize,
    pub ledger_update: LedgerUpdate,
    taken: Vec<TakenSnapshot>,
}

impl BuiltReport {
    /// Give the since-last data of every reservoir read for this report back
    /// to it, to be used when the report was not delivered.
    pub fn restore_reservoirs(self) {
        restore_all(self.taken);
    }
}

pub struct ReportBuilder {
    schema: SchemaVersion,
    identity: Identity,
    converter: UnitConverter,
    hdr_mode: HdrReportMode,
}

impl ReportBuilder {
    pub fn new(
        schema: SchemaVersion,
        identity: Identity,
        converter: UnitConverter,
        hdr_mode: HdrReportMode,
    ) -> Self {
        ReportBuilder {
            schema,
            identity,
            converter,
            hdr_mode,
        }
    }

    #[inline]
    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn build(
        &self,
        timestamp: i64,
        status: Option<String>,
        alerts: Vec<AlertRecord>,
        snapshot: &RegistrySnapshot,
        ledger: &ChangeLedger,
    ) -> Result<BuiltReport, EncodeError> {
        let mut report = Report {
            version: self.schema.version(),
            timestamp,
            application: self.identity.application.clone(),
            host: self.identity.host.clone(),
            instance: self.identity.instance.clone(),
            ..Default::default()
        };
        report.set_rate_unit(self.converter.rate_unit());
        report.set_duration_unit(self.converter.duration_unit());
        if self.schema.has_extended_fields() {
            report.role = self.identity.role.clone();
            report.description = self.identity.description.clone();
            report.status = status;
            report.alerts = alerts;
        }

        let mut update = LedgerUpdate::default();

        for (name, gauge) in &snapshot.gauges {
            let value = match gauge.value() {
                GaugeValue::Number(v) => gauge_record::Value::Number(v),
                GaugeValue::Text(s) => gauge_record::Value::Comment(s),
            };
            report.gauges.push(GaugeRecord {
                name: name.clone(),
                value: Some(value),
            });
        }

        for (name, counter) in &snapshot.counters {
            let count = counter.count();
            if ledger.should_skip(name, count, &mut update) {
                continue;
            }
            report.counters.push(CounterRecord {
                name: name.clone(),
                count,
            });
        }

        for (name, meter) in &snapshot.meters {
            let count = meter.count();
            if ledger.should_skip(name, count, &mut update) {
                continue;
            }
            report.meters.push(MeterRecord {
                name: name.clone(),
                count,
                one_minute_rate: self.converter.convert_rate(meter.one_minute_rate()),
                five_minute_rate: self.converter.convert_rate(meter.five_minute_rate()),
                fifteen_minute_rate: self.converter.convert_rate(meter.fifteen_minute_rate()),
                mean_rate: self.converter.convert_rate(meter.mean_rate()),
            });
        }

        let mut taken = Vec::new();
        if let Err(e) = self.add_sampled(&mut report, snapshot, ledger, &mut update, &mut taken) {
            restore_all(taken);
            return Err(e);
        }

        Ok(BuiltReport {
            report,
            metric_count: snapshot.len(),
            ledger_update: update,
            taken,
        })
    }

    fn add_sampled(
        &self,
        report: &mut Report,
        snapshot: &RegistrySnapshot,
        ledger: &ChangeLedger,
        update: &mut LedgerUpdate,
        taken: &mut Vec<TakenSnapshot>,
    ) -> Result<(), EncodeError> {
        // plain histograms carry raw values
        for (name, histogram) in &snapshot.histograms {
            let count = histogram.count();
            if ledger.should_skip(name, count, update) {
                continue;
            }
            let reservoir = histogram.snapshot();
            let encoded = encode_histogram(self.hdr_mode, &reservoir, 1.0);
            taken.push(TakenSnapshot::Histogram(histogram.clone(), reservoir));
            let encoded = encoded.map_err(|source| EncodeError::HdrHistogram {
                name: name.clone(),
                source,
            })?;
            report.histograms.push(HistogramRecord {
                name: name.clone(),
                count,
                summary: Some(encoded.summary),
                hdr_histogram: encoded.payload,
            });
        }

        for (name, timer) in &snapshot.timers {
            let count = timer.count();
            if ledger.should_skip(name, count, update) {
                continue;
            }
            let reservoir = timer.snapshot();
            let encoded =
                encode_histogram(self.hdr_mode, &reservoir, self.converter.duration_factor());
            taken.push(TakenSnapshot::Timer(timer.clone(), reservoir));
            let encoded = encoded.map_err(|source| EncodeError::HdrHistogram {
                name: name.clone(),
                source,
            })?;
            report.timers.push(TimerRecord {
                name: name.clone(),
                count,
                one_minute_rate: self.converter.convert_rate(timer.one_minute_rate()),
                five_minute_rate: self.converter.convert_rate(timer.five_minute_rate()),
                fifteen_minute_rate: self.converter.convert_rate(timer.fifteen_minute_rate()),
                mean_rate: self.converter.convert_rate(timer.mean_rate()),
                summary: Some(encoded.summary),
                hdr_histogram: encoded.payload,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimeUnit;
    use crate::report::AlertSeverity;
    use g3_metrics::{Counter, MetricRegistry};
    use prost::Message;
    use std::time::Duration;

    fn builder(schema: SchemaVersion) -> ReportBuilder {
        ReportBuilder::new(
            schema,
            Identity {
                application: Some("app".to_string()),
                host: Some("host1".to_string()),
                instance: None,
                role: Some("primary".to_string()),
                description: Some("test node".to_string()),
            },
            UnitConverter::new(TimeUnit::Seconds, TimeUnit::Milliseconds),
            HdrReportMode::Snapshot,
        )
    }

    fn ledger(enabled: bool) -> (ChangeLedger, Arc<Counter>) {
        let skipped = Arc::new(Counter::new());
        (ChangeLedger::new(enabled, skipped.clone()), skipped)
    }

    fn registry() -> MetricRegistry {
        let r = MetricRegistry::new();
        r.counter("requests").unwrap().add(5);
        r.counter("errors").unwrap();
        r.meter("bytes").unwrap().mark_n(10);
        r.histogram("size").unwrap().update(300);
        r.timer("latency")
            .unwrap()
            .update(Duration::from_millis(20));
        r.gauge("queue.depth", || GaugeValue::from(7)).unwrap();
        r.gauge("mode", || GaugeValue::from("active")).unwrap();
        r
    }

    #[test]
    fn ordered_and_complete() {
        let (ledger, _) = ledger(false);
        let built = builder(SchemaVersion::Current)
            .build(1_700_000_000_000, None, Vec::new(), &registry().snapshot(), &ledger)
            .unwrap();
        let report = built.report;

        assert_eq!(built.metric_count, 7);
        assert_eq!(report.version, 3);
        assert_eq!(report.timestamp, 1_700_000_000_000);
        assert_eq!(report.rate_unit(), TimeUnit::Seconds);
        assert_eq!(report.duration_unit(), TimeUnit::Milliseconds);
        assert_eq!(report.host.as_deref(), Some("host1"));
        assert_eq!(report.instance, None);

        let names: Vec<&str> = report.gauges.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["mode", "queue.depth"]);
        assert_eq!(
            report.gauges[0].value,
            Some(gauge_record::Value::Comment("active".to_string()))
        );
        assert_eq!(
            report.gauges[1].value,
            Some(gauge_record::Value::Number(7.0))
        );

        let names: Vec<&str> = report.counters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["errors", "requests"]);
        assert_eq!(report.counters[1].count, 5);

        assert_eq!(report.meters[0].count, 10);
        assert_eq!(report.histograms[0].summary.as_ref().unwrap().max, 300.0);
        assert!(report.histograms[0].hdr_histogram.is_some());

        let timer = &report.timers[0];
        assert_eq!(timer.count, 1);
        let summary = timer.summary.as_ref().unwrap();
        assert!((summary.max - 20.0).abs() < 0.1);
    }

    #[test]
    fn deterministic() {
        let r = MetricRegistry::new();
        r.counter("a").unwrap().add(1);
        r.meter("m").unwrap();
        r.gauge("g", || GaugeValue::from(1.5)).unwrap();
        let snapshot = r.snapshot();
        let (ledger, _) = ledger(false);
        let b = builder(SchemaVersion::Current);
        let a1 = b.build(1, None, Vec::new(), &snapshot, &ledger).unwrap();
        let a2 = b.build(1, None, Vec::new(), &snapshot, &ledger).unwrap();
        assert_eq!(a1.report.counters, a2.report.counters);
        assert_eq!(a1.report.gauges, a2.report.gauges);
    }

    #[test]
    fn suppression() {
        let r = MetricRegistry::new();
        let requests = r.counter("requests").unwrap();
        requests.add(5);
        r.gauge("g", || GaugeValue::from(1)).unwrap();
        let (mut ledger, skipped) = ledger(true);
        let b = builder(SchemaVersion::Current);

        let built = b.build(1, None, Vec::new(), &r.snapshot(), &ledger).unwrap();
        assert_eq!(built.report.counters.len(), 1);
        ledger.commit(built.ledger_update);

        let built = b.build(2, None, Vec::new(), &r.snapshot(), &ledger).unwrap();
        assert!(built.report.counters.is_empty());
        // gauges are never suppressed
        assert_eq!(built.report.gauges.len(), 1);
        assert_eq!(built.metric_count, 2);
        assert_eq!(skipped.count(), 1);
    }

    #[test]
    fn legacy_schema() {
        let (ledger, _) = ledger(false);
        let alerts = vec![AlertRecord::new("disk", AlertSeverity::Error, "full")];
        let built = builder(SchemaVersion::Legacy)
            .build(1, Some("ok".to_string()), alerts.clone(), &registry().snapshot(), &ledger)
            .unwrap();
        let report = built.report;
        assert_eq!(report.version, 2);
        assert_eq!(report.application.as_deref(), Some("app"));
        assert_eq!(report.role, None);
        assert_eq!(report.description, None);
        assert_eq!(report.status, None);
        assert!(report.alerts.is_empty());

        let built = builder(SchemaVersion::Current)
            .build(1, Some("ok".to_string()), alerts.clone(), &registry().snapshot(), &ledger)
            .unwrap();
        assert_eq!(built.report.status.as_deref(), Some("ok"));
        assert_eq!(built.report.role.as_deref(), Some("primary"));
        assert_eq!(built.report.alerts, alerts);
    }

    #[test]
    fn round_trip() {
        let (ledger, _) = ledger(false);
        let alerts = vec![AlertRecord::new("cpu", AlertSeverity::Warn, "busy")];
        let built = builder(SchemaVersion::Current)
            .build(42, Some("ok".to_string()), alerts, &registry().snapshot(), &ledger)
            .unwrap();
        let bytes = built.report.encode_to_vec();
        let decoded = Report::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, built.report);
    }

    #[test]
    fn snapshot_timer_delta() {
        let r = MetricRegistry::new();
        let timer = r.timer("latency").unwrap();
        for _ in 0..100 {
            timer.update(Duration::from_millis(1));
        }
        let (ledger, _) = ledger(false);
        let b = builder(SchemaVersion::Current);
        let first = b.build(1, None, Vec::new(), &r.snapshot(), &ledger).unwrap();
        let s = first.report.timers[0].summary.as_ref().unwrap();
        assert!((s.percentile_99 - 1.0).abs() < 0.01);

        for _ in 0..10 {
            timer.update(Duration::from_millis(500));
        }
        let second = b.build(2, None, Vec::new(), &r.snapshot(), &ledger).unwrap();
        let t = &second.report.timers[0];
        assert_eq!(t.count, 110);
        let s = t.summary.as_ref().unwrap();
        // only the samples since the previous report
        assert!((s.min - 500.0).abs() < 1.0);
        assert!((s.median - 500.0).abs() < 1.0);
    }

    #[test]
    fn suppression_all_kinds() {
        let r = MetricRegistry::new();
        r.gauge("g", || GaugeValue::from(1)).unwrap();
        r.meter("bytes").unwrap().mark_n(10);
        r.histogram("size").unwrap().update(300);
        r.timer("latency")
            .unwrap()
            .update(Duration::from_millis(20));
        let (mut ledger, skipped) = ledger(true);
        let b = builder(SchemaVersion::Current);

        let built = b.build(1, None, Vec::new(), &r.snapshot(), &ledger).unwrap();
        assert_eq!(built.report.meters.len(), 1);
        assert_eq!(built.report.histograms.len(), 1);
        assert_eq!(built.report.timers.len(), 1);
        ledger.commit(built.ledger_update);

        let built = b.build(2, None, Vec::new(), &r.snapshot(), &ledger).unwrap();
        assert!(built.report.meters.is_empty());
        assert!(built.report.histograms.is_empty());
        assert!(built.report.timers.is_empty());
        assert_eq!(built.report.gauges.len(), 1);
        assert_eq!(skipped.count(), 3);
        ledger.commit(built.ledger_update);

        // only the changed one comes back
        r.histogram("size").unwrap().update(400);
        let built = b.build(3, None, Vec::new(), &r.snapshot(), &ledger).unwrap();
        assert!(built.report.meters.is_empty());
        assert!(built.report.timers.is_empty());
        assert_eq!(built.report.histograms[0].count, 2);
        assert_eq!(skipped.count(), 5);
    }

    #[test]
    fn restore_undelivered() {
        let r = MetricRegistry::new();
        let timer = r.timer("latency").unwrap();
        let size = r.histogram("size").unwrap();
        for _ in 0..5 {
            timer.update(Duration::from_millis(1));
        }
        size.update(10);
        let (ledger, _) = ledger(false);
        let b = builder(SchemaVersion::Current);

        let lost = b.build(1, None, Vec::new(), &r.snapshot(), &ledger).unwrap();
        lost.restore_reservoirs();

        timer.update(Duration::from_millis(500));
        size.update(20);
        let built = b.build(2, None, Vec::new(), &r.snapshot(), &ledger).unwrap();
        let s = built.report.timers[0].summary.as_ref().unwrap();
        assert!((s.min - 1.0).abs() < 0.01);
        assert!((s.max - 500.0).abs() < 1.0);
        let s = built.report.histograms[0].summary.as_ref().unwrap();
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 20.0);

        // delivered data is not seen twice
        let built = b.build(3, None, Vec::new(), &r.snapshot(), &ledger).unwrap();
        let s = built.report.timers[0].summary.as_ref().unwrap();
        assert_eq!(s.max, 0.0);
    }
}
