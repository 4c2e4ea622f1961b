/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use hdrhistogram::Histogram;
use hdrhistogram::serialization::{Serializer, V2DeflateSerializer};

use crate::HistogramEncodeError;

/// Statistical view over a set of recorded values.
pub trait Snapshot {
    /// Number of values covered by this snapshot.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn min(&self) -> u64;
    fn max(&self) -> u64;
    fn mean(&self) -> f64;

    /// Population standard deviation.
    fn std_dev(&self) -> f64;

    /// The value below which `quantile` (in range 0.0..=1.0) of the values fall.
    fn value(&self, quantile: f64) -> f64;

    fn median(&self) -> f64 {
        self.value(0.5)
    }
}

/// Snapshot of a high resolution histogram.
#[derive(Clone)]
pub struct HistogramSnapshot {
    inner: Histogram<u64>,
}

impl HistogramSnapshot {
    pub(crate) fn new(inner: Histogram<u64>) -> Self {
        HistogramSnapshot { inner }
    }

    #[inline]
    pub fn inner(&self) -> &Histogram<u64> {
        &self.inner
    }

    /// Encode using the V2 compressed format, which is the format used by
    /// `encodeIntoCompressedByteBuffer` in other HdrHistogram implementations.
    pub fn encode_compressed(&self) -> Result<Vec<u8>, HistogramEncodeError> {
        let mut buf = Vec::new();
        V2DeflateSerializer::new().serialize(&self.inner, &mut buf)?;
        Ok(buf)
    }
}

impl Snapshot for HistogramSnapshot {
    fn len(&self) -> u64 {
        self.inner.len()
    }

    fn min(&self) -> u64 {
        if self.inner.is_empty() {
            0
        } else {
            self.inner.min()
        }
    }

    fn max(&self) -> u64 {
        if self.inner.is_empty() {
            0
        } else {
            self.inner.max()
        }
    }

    fn mean(&self) -> f64 {
        if self.inner.is_empty() {
            0.0
        } else {
            self.inner.mean()
        }
    }

    fn std_dev(&self) -> f64 {
        if self.inner.is_empty() {
            0.0
        } else {
            self.inner.stdev()
        }
    }

    fn value(&self, quantile: f64) -> f64 {
        if self.inner.is_empty() {
            0.0
        } else {
            self.inner.value_at_quantile(quantile) as f64
        }
    }
}

/// Snapshot of raw samples, quantiles use the nearest rank method.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleSnapshot {
    values: Vec<u64>,
}

impl SampleSnapshot {
    pub fn new(mut values: Vec<u64>) -> Self {
        values.sort_unstable();
        SampleSnapshot { values }
    }

    #[inline]
    pub fn values(&self) -> &[u64] {
        &self.values
    }
}

impl Snapshot for SampleSnapshot {
    fn len(&self) -> u64 {
        self.values.len() as u64
    }

    fn min(&self) -> u64 {
        self.values.first().copied().unwrap_or_default()
    }

    fn max(&self) -> u64 {
        self.values.last().copied().unwrap_or_default()
    }

    fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.values.iter().map(|v| *v as f64).sum();
        sum / self.values.len() as f64
    }

    fn std_dev(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let sum: f64 = self
            .values
            .iter()
            .map(|v| {
                let diff = *v as f64 - mean;
                diff * diff
            })
            .sum();
        (sum / self.values.len() as f64).sqrt()
    }

    fn value(&self, quantile: f64) -> f64 {
        let n = self.values.len();
        if n == 0 {
            return 0.0;
        }
        let quantile = quantile.clamp(0.0, 1.0);
        let rank = ((quantile * n as f64).ceil() as usize).clamp(1, n);
        self.values[rank - 1] as f64
    }
}
