/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::{Counter, Gauge, Histogram, Meter, Timer};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("metric {0} already registered")]
    Duplicate(String),
    #[error("metric {name} is registered as {kind}")]
    TypeMismatch { name: String, kind: &'static str },
}

#[derive(Clone)]
pub enum Metric {
    Gauge(Arc<dyn Gauge>),
    Counter(Arc<Counter>),
    Meter(Arc<Meter>),
    Histogram(Arc<Histogram>),
    Timer(Arc<Timer>),
}

impl Metric {
    pub fn kind(&self) -> &'static str {
        match self {
            Metric::Gauge(_) => "gauge",
            Metric::Counter(_) => "counter",
            Metric::Meter(_) => "meter",
            Metric::Histogram(_) => "histogram",
            Metric::Timer(_) => "timer",
        }
    }
}

/// A fixed group of metrics that can be registered as a whole.
pub trait MetricSet {
    fn metrics(&self) -> Vec<(String, Metric)>;
}

pub type MetricFilter = Arc<dyn Fn(&str, &Metric) -> bool + Send + Sync>;

/// A consistent, name ordered view of the registry.
#[derive(Clone, Default)]
pub struct RegistrySnapshot {
    pub gauges: BTreeMap<String, Arc<dyn Gauge>>,
    pub counters: BTreeMap<String, Arc<Counter>>,
    pub meters: BTreeMap<String, Arc<Meter>>,
    pub histograms: BTreeMap<String, Arc<Histogram>>,
    pub timers: BTreeMap<String, Arc<Timer>>,
}

impl RegistrySnapshot {
    pub fn len(&self) -> usize {
        self.gauges.len()
            + self.counters.len()
            + self.meters.len()
            + self.histograms.len()
            + self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add(&mut self, name: String, metric: Metric) {
        match metric {
            Metric::Gauge(g) => {
                self.gauges.insert(name, g);
            }
            Metric::Counter(c) => {
                self.counters.insert(name, c);
            }
            Metric::Meter(m) => {
                self.meters.insert(name, m);
            }
            Metric::Histogram(h) => {
                self.histograms.insert(name, h);
            }
            Metric::Timer(t) => {
                self.timers.insert(name, t);
            }
        }
    }
}

#[derive(Default)]
pub struct MetricRegistry {
    metrics: RwLock<BTreeMap<String, Metric>>,
}

macro_rules! get_or_create {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        pub fn $fn_name(&self, name: &str) -> Result<Arc<$ty>, RegistryError> {
            let mut map = self.metrics.write().unwrap_or_else(|e| e.into_inner());
            match map.entry(name.to_string()) {
                Entry::Occupied(o) => match o.get() {
                    Metric::$variant(m) => Ok(m.clone()),
                    other => Err(RegistryError::TypeMismatch {
                        name: name.to_string(),
                        kind: other.kind(),
                    }),
                },
                Entry::Vacant(v) => {
                    let m = Arc::new(<$ty>::default());
                    v.insert(Metric::$variant(m.clone()));
                    Ok(m)
                }
            }
        }
    };
}

impl MetricRegistry {
    pub fn new() -> Self {
        MetricRegistry::default()
    }

    pub fn register(&self, name: &str, metric: Metric) -> Result<(), RegistryError> {
        let mut map = self.metrics.write().unwrap_or_else(|e| e.into_inner());
        match map.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate(name.to_string())),
            Entry::Vacant(v) => {
                v.insert(metric);
                Ok(())
            }
        }
    }

    /// Register all metrics of the set, names are joined to `prefix` with a dot.
    pub fn register_set(&self, prefix: &str, set: &dyn MetricSet) -> Result<(), RegistryError> {
        for (name, metric) in set.metrics() {
            if prefix.is_empty() {
                self.register(&name, metric)?;
            } else {
                self.register(&format!("{prefix}.{name}"), metric)?;
            }
        }
        Ok(())
    }

    pub fn gauge<G: Gauge + 'static>(
        &self,
        name: &str,
        gauge: G,
    ) -> Result<Arc<dyn Gauge>, RegistryError> {
        let g: Arc<dyn Gauge> = Arc::new(gauge);
        self.register(name, Metric::Gauge(g.clone()))?;
        Ok(g)
    }

    get_or_create!(counter, Counter, Counter);
    get_or_create!(meter, Meter, Meter);
    get_or_create!(histogram, Histogram, Histogram);
    get_or_create!(timer, Timer, Timer);

    pub fn remove(&self, name: &str) -> Option<Metric> {
        let mut map = self.metrics.write().unwrap_or_else(|e| e.into_inner());
        map.remove(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let map = self.metrics.read().unwrap_or_else(|e| e.into_inner());
        let mut snapshot = RegistrySnapshot::default();
        for (name, metric) in map.iter() {
            snapshot.add(name.clone(), metric.clone());
        }
        snapshot
    }

    pub fn snapshot_filtered(&self, filter: &MetricFilter) -> RegistrySnapshot {
        let map = self.metrics.read().unwrap_or_else(|e| e.into_inner());
        let mut snapshot = RegistrySnapshot::default();
        for (name, metric) in map.iter() {
            if filter(name, metric) {
                snapshot.add(name.clone(), metric.clone());
            }
        }
        snapshot
    }
}
