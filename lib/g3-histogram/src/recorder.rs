/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::{Mutex, Weak};

use tokio::sync::mpsc;

use crate::reservoir::HdrState;

/// Queued values above which a recorder folds the backlog into the
/// histograms itself.
pub(crate) const BACKLOG_LIMIT: usize = 1024;

/// Lock free handle used to feed values into a [`crate::HdrReservoir`].
///
/// Values are queued and folded into the histograms on the next update or
/// snapshot of the owning reservoir, or by the recorder once the queue grows
/// past a fixed bound.
#[derive(Clone)]
pub struct HistogramRecorder {
    sender: mpsc::UnboundedSender<u64>,
    state: Weak<Mutex<HdrState>>,
}

impl HistogramRecorder {
    pub(crate) fn new(sender: mpsc::UnboundedSender<u64>, state: Weak<Mutex<HdrState>>) -> Self {
        HistogramRecorder { sender, state }
    }

    /// Returns false if the reservoir has been dropped.
    pub fn record(&self, v: u64) -> bool {
        if self.sender.send(v).is_err() {
            return false;
        }
        if let Some(state) = self.state.upgrade()
            && let Ok(mut state) = state.try_lock()
            && state.backlog() >= BACKLOG_LIMIT
        {
            state.refresh();
        }
        true
    }
}
