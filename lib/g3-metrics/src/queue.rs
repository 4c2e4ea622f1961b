/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::{Counter, Metric, MetricSet};

/// Receives queue mutation events.
pub trait QueueEventHandler: Send + Sync {
    fn added(&self, n: usize);
    fn removed(&self, n: usize);
    fn failed_offer(&self);
}

/// Event handler backed by plain counters.
#[derive(Clone, Default)]
pub struct QueueCounters {
    added: Arc<Counter>,
    removed: Arc<Counter>,
    failed_offers: Arc<Counter>,
}

impl QueueCounters {
    pub fn new() -> Self {
        QueueCounters::default()
    }

    pub fn added_count(&self) -> u64 {
        self.added.count()
    }

    pub fn removed_count(&self) -> u64 {
        self.removed.count()
    }

    pub fn failed_offer_count(&self) -> u64 {
        self.failed_offers.count()
    }
}

impl QueueEventHandler for QueueCounters {
    fn added(&self, n: usize) {
        self.added.add(n as u64);
    }

    fn removed(&self, n: usize) {
        self.removed.add(n as u64);
    }

    fn failed_offer(&self) {
        self.failed_offers.inc();
    }
}

impl MetricSet for QueueCounters {
    fn metrics(&self) -> Vec<(String, Metric)> {
        vec![
            ("added".to_string(), Metric::Counter(self.added.clone())),
            ("removed".to_string(), Metric::Counter(self.removed.clone())),
            (
                "failed-offers".to_string(),
                Metric::Counter(self.failed_offers.clone()),
            ),
        ]
    }
}

/// A bounded blocking FIFO queue that reports every mutation to a handler.
pub struct InstrumentedQueue<T> {
    capacity: usize,
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    handler: Arc<dyn QueueEventHandler>,
}

impl<T> InstrumentedQueue<T> {
    pub fn new(capacity: usize, handler: Arc<dyn QueueEventHandler>) -> Self {
        InstrumentedQueue {
            capacity: capacity.max(1),
            items: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            handler,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push_locked(&self, mut items: MutexGuard<'_, VecDeque<T>>, item: T) {
        items.push_back(item);
        drop(items);
        self.handler.added(1);
        self.not_empty.notify_one();
    }

    fn pop_locked(&self, mut items: MutexGuard<'_, VecDeque<T>>) -> Option<T> {
        let item = items.pop_front();
        drop(items);
        if item.is_some() {
            self.handler.removed(1);
            self.not_full.notify_one();
        }
        item
    }

    /// Enqueue without blocking, the item is handed back if the queue is full.
    pub fn offer(&self, item: T) -> Result<(), T> {
        let items = self.lock();
        if items.len() >= self.capacity {
            drop(items);
            self.handler.failed_offer();
            return Err(item);
        }
        self.push_locked(items, item);
        Ok(())
    }

    pub fn offer_timeout(&self, item: T, timeout: Duration) -> Result<(), T> {
        let deadline = Instant::now() + timeout;
        let mut items = self.lock();
        while items.len() >= self.capacity {
            let now = Instant::now();
            if now >= deadline {
                drop(items);
                self.handler.failed_offer();
                return Err(item);
            }
            items = self
                .not_full
                .wait_timeout(items, deadline - now)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
        self.push_locked(items, item);
        Ok(())
    }

    /// Enqueue, waiting for free space if needed.
    pub fn put(&self, item: T) {
        let mut items = self.lock();
        while items.len() >= self.capacity {
            items = self
                .not_full
                .wait(items)
                .unwrap_or_else(|e| e.into_inner());
        }
        self.push_locked(items, item);
    }

    pub fn poll(&self) -> Option<T> {
        let items = self.lock();
        self.pop_locked(items)
    }

    pub fn poll_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut items = self.lock();
        while items.is_empty() {
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            items = self
                .not_empty
                .wait_timeout(items, deadline - now)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
        self.pop_locked(items)
    }

    /// Dequeue, waiting for an item if needed.
    pub fn take(&self) -> T {
        let mut items = self.lock();
        loop {
            if let Some(item) = items.pop_front() {
                drop(items);
                self.handler.removed(1);
                self.not_full.notify_one();
                return item;
            }
            items = self
                .not_empty
                .wait(items)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    pub fn peek_with<R, F: FnOnce(Option<&T>) -> R>(&self, f: F) -> R {
        let items = self.lock();
        f(items.front())
    }

    /// Move up to `max` items into `dst`, returns the number moved.
    pub fn drain_into(&self, dst: &mut Vec<T>, max: usize) -> usize {
        let mut items = self.lock();
        let n = items.len().min(max);
        dst.extend(items.drain(..n));
        drop(items);
        if n > 0 {
            self.handler.removed(n);
            self.not_full.notify_all();
        }
        n
    }

    /// Keep only the items matching `f`, removals are counted like any other.
    pub fn retain<F: FnMut(&T) -> bool>(&self, f: F) -> usize {
        let mut items = self.lock();
        let before = items.len();
        items.retain(f);
        let n = before - items.len();
        drop(items);
        if n > 0 {
            self.handler.removed(n);
            self.not_full.notify_all();
        }
        n
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }
}
