/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use hdrhistogram::serialization::V2DeflateSerializeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistogramEncodeError {
    #[error("compressed serialization failed: {0:?}")]
    Serialize(V2DeflateSerializeError),
}

impl From<V2DeflateSerializeError> for HistogramEncodeError {
    fn from(e: V2DeflateSerializeError) -> Self {
        HistogramEncodeError::Serialize(e)
    }
}
