/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::TimeUnit;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Scales per second rates and nanosecond durations into the configured units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitConverter {
    rate_unit: TimeUnit,
    duration_unit: TimeUnit,
    rate_factor: f64,
    duration_factor: f64,
}

impl Default for UnitConverter {
    fn default() -> Self {
        UnitConverter::new(TimeUnit::Seconds, TimeUnit::Milliseconds)
    }
}

impl UnitConverter {
    pub fn new(rate_unit: TimeUnit, duration_unit: TimeUnit) -> Self {
        UnitConverter {
            rate_unit,
            duration_unit,
            rate_factor: rate_unit.nanos() as f64 / NANOS_PER_SECOND,
            duration_factor: 1.0 / duration_unit.nanos() as f64,
        }
    }

    #[inline]
    pub fn rate_unit(&self) -> TimeUnit {
        self.rate_unit
    }

    #[inline]
    pub fn duration_unit(&self) -> TimeUnit {
        self.duration_unit
    }

    #[inline]
    pub fn convert_rate(&self, per_second: f64) -> f64 {
        per_second * self.rate_factor
    }

    #[inline]
    pub fn convert_duration(&self, nanos: f64) -> f64 {
        nanos * self.duration_factor
    }

    pub(crate) fn duration_factor(&self) -> f64 {
        self.duration_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= f64::EPSILON * a.abs().max(b.abs()).max(1.0) * 4.0
    }

    #[test]
    fn defaults() {
        let c = UnitConverter::default();
        assert_eq!(c.rate_unit(), TimeUnit::Seconds);
        assert_eq!(c.duration_unit(), TimeUnit::Milliseconds);
        assert_eq!(c.convert_rate(12.5), 12.5);
        assert_eq!(c.convert_duration(5_000_000.0), 5.0);
    }

    #[test]
    fn rate() {
        let c = UnitConverter::new(TimeUnit::Minutes, TimeUnit::Nanoseconds);
        assert!(close(c.convert_rate(2.0), 120.0));
        assert_eq!(c.convert_duration(17.0), 17.0);

        let c = UnitConverter::new(TimeUnit::Milliseconds, TimeUnit::Seconds);
        assert!(close(c.convert_rate(1000.0), 1.0));
        assert!(close(c.convert_duration(1_500_000_000.0), 1.5));
    }

    #[test]
    fn invertible() {
        for unit in [
            TimeUnit::Nanoseconds,
            TimeUnit::Microseconds,
            TimeUnit::Milliseconds,
            TimeUnit::Seconds,
            TimeUnit::Minutes,
            TimeUnit::Hours,
            TimeUnit::Days,
        ] {
            let c = UnitConverter::new(unit, unit);
            for nanos in [0.0, 1.0, 999.0, 123_456_789.0, 8.64e13] {
                let back = c.convert_duration(nanos) * unit.nanos() as f64;
                assert!(close(back, nanos), "{unit}: {nanos} -> {back}");
            }
            let rate = 42.0;
            let back = c.convert_rate(rate) / c.rate_factor;
            assert!(close(back, rate));
        }
    }
}
