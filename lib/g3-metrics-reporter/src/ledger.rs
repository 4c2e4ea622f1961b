/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::sync::Arc;

use g3_metrics::Counter;

/// Last reported counts, used to suppress metrics that did not change.
///
/// A counter reset back to exactly the last reported value can not be told
/// apart from an unchanged one and will be suppressed.
pub struct ChangeLedger {
    last_reported: Option<HashMap<String, u64>>,
    skipped: Arc<Counter>,
}

/// Ledger changes computed while building one report.
#[derive(Debug, Default)]
pub struct LedgerUpdate {
    entries: Vec<(String, u64)>,
}

impl LedgerUpdate {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ChangeLedger {
    pub fn new(enabled: bool, skipped: Arc<Counter>) -> Self {
        ChangeLedger {
            last_reported: enabled.then(HashMap::new),
            skipped,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.last_reported.is_some()
    }

    /// Check the count against the committed state.
    ///
    /// Changed or unseen metrics are staged into `update`, an unchanged one
    /// bumps the skipped counter.
    pub fn should_skip(&self, name: &str, count: u64, update: &mut LedgerUpdate) -> bool {
        let Some(map) = &self.last_reported else {
            return false;
        };
        if map.get(name) == Some(&count) {
            self.skipped.inc();
            true
        } else {
            update.entries.push((name.to_string(), count));
            false
        }
    }

    /// Apply staged changes, entries are never removed.
    pub fn commit(&mut self, update: LedgerUpdate) {
        if let Some(map) = &mut self.last_reported {
            map.extend(update.entries);
        }
    }

    pub fn last_reported(&self, name: &str) -> Option<u64> {
        self.last_reported.as_ref()?.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.last_reported.as_ref().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
