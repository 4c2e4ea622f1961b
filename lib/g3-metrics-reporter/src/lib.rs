/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod unit;
pub use unit::TimeUnit;

mod convert;
pub use convert::UnitConverter;

mod ledger;
pub use ledger::{ChangeLedger, LedgerUpdate};

mod encode;
pub use encode::{EncodedHistogram, HdrReportMode, encode_histogram};

pub mod report;

mod builder;
pub use builder::{BuiltReport, Identity, ReportBuilder, SchemaVersion};

mod error;
pub use error::{EncodeError, ReportError, TransportError};

mod config;
pub use config::ReporterConfig;

mod stats;
pub use stats::ReporterStats;

mod transport;
pub use transport::{HttpTransport, PROTOBUF_CONTENT_TYPE, deflate};

mod reporter;
pub use reporter::{AlertSupplier, Clock, MetricsReporter, StatusSupplier, SystemClock};

#[cfg(test)]
mod test_server;
