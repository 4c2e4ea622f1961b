/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use g3_histogram::{HistogramEncodeError, ReservoirSnapshot, Snapshot};

use crate::report::HistogramSummary;

/// Which projection of a high resolution reservoir goes into the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HdrReportMode {
    /// Summary only, computed over the lifetime projection.
    None,
    /// Summary and payload from the lifetime projection.
    Total,
    /// Summary and payload from the values recorded since the last report.
    #[default]
    Snapshot,
}

impl HdrReportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            HdrReportMode::None => "none",
            HdrReportMode::Total => "total",
            HdrReportMode::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for HdrReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HdrReportMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(HdrReportMode::None),
            "total" => Ok(HdrReportMode::Total),
            "snapshot" => Ok(HdrReportMode::Snapshot),
            _ => Err(anyhow!("invalid hdr report mode: {s}")),
        }
    }
}

pub struct EncodedHistogram {
    pub summary: HistogramSummary,
    pub payload: Option<Vec<u8>>,
}

fn summarize<S: Snapshot>(s: &S, scale: f64) -> HistogramSummary {
    HistogramSummary {
        min: s.min() as f64 * scale,
        max: s.max() as f64 * scale,
        mean: s.mean() * scale,
        std: s.std_dev() * scale,
        median: s.median() * scale,
        percentile_75: s.value(0.75) * scale,
        percentile_95: s.value(0.95) * scale,
        percentile_98: s.value(0.98) * scale,
        percentile_99: s.value(0.99) * scale,
        percentile_999: s.value(0.999) * scale,
    }
}

/// Build the summary, every statistic multiplied by `scale`, and the optional
/// compressed payload. The payload is never scaled.
pub fn encode_histogram(
    mode: HdrReportMode,
    snapshot: &ReservoirSnapshot,
    scale: f64,
) -> Result<EncodedHistogram, HistogramEncodeError> {
    match snapshot {
        ReservoirSnapshot::Sampled(s) => Ok(EncodedHistogram {
            summary: summarize(s, scale),
            payload: None,
        }),
        ReservoirSnapshot::Hdr(hdr) => {
            let (projection, with_payload) = match mode {
                HdrReportMode::None => (hdr.total(), false),
                HdrReportMode::Total => (hdr.total(), true),
                HdrReportMode::Snapshot => (hdr.since_last(), true),
            };
            let payload = if with_payload {
                Some(projection.encode_compressed()?)
            } else {
                None
            };
            Ok(EncodedHistogram {
                summary: summarize(projection, scale),
                payload,
            })
        }
    }
}
