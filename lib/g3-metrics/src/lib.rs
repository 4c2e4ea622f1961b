/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod counter;
pub use counter::Counter;

mod gauge;
pub use gauge::{Gauge, GaugeValue};

mod meter;
pub use meter::{Meter, Metered};

mod histogram;
pub use histogram::Histogram;

mod timer;
pub use timer::{Timer, TimerContext};

mod registry;
pub use registry::{
    Metric, MetricFilter, MetricRegistry, MetricSet, RegistryError, RegistrySnapshot,
};

mod queue;
pub use queue::{InstrumentedQueue, QueueCounters, QueueEventHandler};
