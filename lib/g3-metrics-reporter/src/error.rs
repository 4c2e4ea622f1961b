/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use g3_histogram::HistogramEncodeError;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to encode hdr histogram for {name}: {source}")]
    HdrHistogram {
        name: String,
        source: HistogramEncodeError,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io failed: {0:?}")]
    IoFailed(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("unexpected response status {0}")]
    Status(u16),
}
