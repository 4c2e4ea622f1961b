/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

/// Time unit as carried on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TimeUnit {
    Nanoseconds = 0,
    Microseconds = 1,
    Milliseconds = 2,
    Seconds = 3,
    Minutes = 4,
    Hours = 5,
    Days = 6,
}

impl TimeUnit {
    pub const fn nanos(self) -> u64 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60 * 1_000_000_000,
            TimeUnit::Hours => 3_600 * 1_000_000_000,
            TimeUnit::Days => 86_400 * 1_000_000_000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "nanoseconds",
            TimeUnit::Microseconds => "microseconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ns" | "nanosecond" | "nanoseconds" => Ok(TimeUnit::Nanoseconds),
            "us" | "microsecond" | "microseconds" => Ok(TimeUnit::Microseconds),
            "ms" | "millisecond" | "milliseconds" => Ok(TimeUnit::Milliseconds),
            "s" | "second" | "seconds" => Ok(TimeUnit::Seconds),
            "m" | "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "h" | "hour" | "hours" => Ok(TimeUnit::Hours),
            "d" | "day" | "days" => Ok(TimeUnit::Days),
            _ => Err(anyhow!("invalid time unit: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!(TimeUnit::from_str("SECONDS").unwrap(), TimeUnit::Seconds);
        assert_eq!(TimeUnit::from_str("second").unwrap(), TimeUnit::Seconds);
        assert_eq!(TimeUnit::from_str("ms").unwrap(), TimeUnit::Milliseconds);
        assert_eq!(TimeUnit::from_str(" Days ").unwrap(), TimeUnit::Days);
        assert!(TimeUnit::from_str("fortnight").is_err());
    }

    #[test]
    fn display() {
        for unit in [
            TimeUnit::Nanoseconds,
            TimeUnit::Microseconds,
            TimeUnit::Milliseconds,
            TimeUnit::Seconds,
            TimeUnit::Minutes,
            TimeUnit::Hours,
            TimeUnit::Days,
        ] {
            assert_eq!(TimeUnit::from_str(&unit.to_string()).unwrap(), unit);
        }
    }

    #[test]
    fn wire_value() {
        assert_eq!(TimeUnit::Milliseconds as i32, 2);
        assert_eq!(TimeUnit::try_from(6).unwrap(), TimeUnit::Days);
        assert!(TimeUnit::try_from(7).is_err());
    }
}
