/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Wire messages, see `proto/report.proto` for the schema.

use crate::TimeUnit;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Report {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    /// Milliseconds since the unix epoch.
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
    #[prost(enumeration = "TimeUnit", tag = "3")]
    pub rate_unit: i32,
    #[prost(enumeration = "TimeUnit", tag = "4")]
    pub duration_unit: i32,
    #[prost(string, optional, tag = "5")]
    pub application: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub host: Option<String>,
    #[prost(string, optional, tag = "7")]
    pub instance: Option<String>,
    #[prost(string, optional, tag = "8")]
    pub role: Option<String>,
    #[prost(string, optional, tag = "9")]
    pub description: Option<String>,
    #[prost(string, optional, tag = "10")]
    pub status: Option<String>,
    #[prost(message, repeated, tag = "11")]
    pub gauges: Vec<GaugeRecord>,
    #[prost(message, repeated, tag = "12")]
    pub counters: Vec<CounterRecord>,
    #[prost(message, repeated, tag = "13")]
    pub meters: Vec<MeterRecord>,
    #[prost(message, repeated, tag = "14")]
    pub histograms: Vec<HistogramRecord>,
    #[prost(message, repeated, tag = "15")]
    pub timers: Vec<TimerRecord>,
    #[prost(message, repeated, tag = "16")]
    pub alerts: Vec<AlertRecord>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GaugeRecord {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "gauge_record::Value", tags = "2, 3")]
    pub value: Option<gauge_record::Value>,
}

pub mod gauge_record {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(double, tag = "2")]
        Number(f64),
        #[prost(string, tag = "3")]
        Comment(String),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CounterRecord {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint64, tag = "2")]
    pub count: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MeterRecord {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint64, tag = "2")]
    pub count: u64,
    #[prost(double, tag = "3")]
    pub one_minute_rate: f64,
    #[prost(double, tag = "4")]
    pub five_minute_rate: f64,
    #[prost(double, tag = "5")]
    pub fifteen_minute_rate: f64,
    #[prost(double, tag = "6")]
    pub mean_rate: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HistogramSummary {
    #[prost(double, tag = "1")]
    pub min: f64,
    #[prost(double, tag = "2")]
    pub max: f64,
    #[prost(double, tag = "3")]
    pub mean: f64,
    #[prost(double, tag = "4")]
    pub std: f64,
    #[prost(double, tag = "5")]
    pub median: f64,
    #[prost(double, tag = "6")]
    pub percentile_75: f64,
    #[prost(double, tag = "7")]
    pub percentile_95: f64,
    #[prost(double, tag = "8")]
    pub percentile_98: f64,
    #[prost(double, tag = "9")]
    pub percentile_99: f64,
    #[prost(double, tag = "10")]
    pub percentile_999: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HistogramRecord {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint64, tag = "2")]
    pub count: u64,
    #[prost(message, optional, tag = "3")]
    pub summary: Option<HistogramSummary>,
    /// V2 compressed HdrHistogram encoding.
    #[prost(bytes = "vec", optional, tag = "4")]
    pub hdr_histogram: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimerRecord {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint64, tag = "2")]
    pub count: u64,
    #[prost(double, tag = "3")]
    pub one_minute_rate: f64,
    #[prost(double, tag = "4")]
    pub five_minute_rate: f64,
    #[prost(double, tag = "5")]
    pub fifteen_minute_rate: f64,
    #[prost(double, tag = "6")]
    pub mean_rate: f64,
    #[prost(message, optional, tag = "7")]
    pub summary: Option<HistogramSummary>,
    #[prost(bytes = "vec", optional, tag = "8")]
    pub hdr_histogram: Option<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AlertSeverity {
    Unknown = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AlertRecord {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "AlertSeverity", tag = "2")]
    pub severity: i32,
    #[prost(string, tag = "3")]
    pub message: String,
}

impl AlertRecord {
    pub fn new<N: Into<String>, M: Into<String>>(
        name: N,
        severity: AlertSeverity,
        message: M,
    ) -> Self {
        AlertRecord {
            name: name.into(),
            severity: severity as i32,
            message: message.into(),
        }
    }
}
