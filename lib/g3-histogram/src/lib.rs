/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod recorder;
pub use recorder::HistogramRecorder;

mod snapshot;
pub use snapshot::{HistogramSnapshot, SampleSnapshot, Snapshot};

mod reservoir;
pub use reservoir::{HdrReservoir, HdrSnapshot, Reservoir, ReservoirSnapshot};

mod sliding;
pub use sliding::SlidingWindowReservoir;

mod error;
pub use error::HistogramEncodeError;
