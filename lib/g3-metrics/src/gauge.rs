/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

/// A gauge reading, either a number or a free text comment.
#[derive(Clone, Debug, PartialEq)]
pub enum GaugeValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for GaugeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GaugeValue::Number(v) => write!(f, "{v}"),
            GaugeValue::Text(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_from_number {
    ($($t:ty),+) => {
        $(
            impl From<$t> for GaugeValue {
                fn from(v: $t) -> Self {
                    GaugeValue::Number(v as f64)
                }
            }
        )+
    };
}

impl_from_number!(f64, f32, i64, i32, u64, u32, usize);

impl From<String> for GaugeValue {
    fn from(s: String) -> Self {
        GaugeValue::Text(s)
    }
}

impl From<&str> for GaugeValue {
    fn from(s: &str) -> Self {
        GaugeValue::Text(s.to_string())
    }
}

impl From<bool> for GaugeValue {
    fn from(b: bool) -> Self {
        GaugeValue::Text(b.to_string())
    }
}

pub trait Gauge: Send + Sync {
    fn value(&self) -> GaugeValue;
}

impl<F> Gauge for F
where
    F: Fn() -> GaugeValue + Send + Sync,
{
    fn value(&self) -> GaugeValue {
        self()
    }
}
