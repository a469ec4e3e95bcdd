//! In-memory implementation of [`MetricSink`].
//!
//! [`InMemorySink`] is a first-class backend for tests and dry runs. Clones
//! share one record buffer, so a host can hold a sink (or use it as a
//! [`SinkFactory`]) while a test inspects what was sent. Sends can be made to
//! fail to exercise transport-failure handling.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use wjp_core::MetricRecord;

use crate::error::SinkError;
use crate::traits::{MetricSink, SinkFactory};
use crate::types::ProxyEndpoint;

#[derive(Debug, Default)]
struct Shared {
    records: Mutex<Vec<MetricRecord>>,
    fail_all: AtomicBool,
    fail_flush: AtomicBool,
    fail_names: Mutex<HashSet<String>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Records every sent [`MetricRecord`].
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    shared: Arc<Shared>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record sent so far, in send order.
    pub fn records(&self) -> Vec<MetricRecord> {
        lock(&self.shared.records).clone()
    }

    /// Names of every record sent so far, in send order.
    pub fn names(&self) -> Vec<String> {
        lock(&self.shared.records)
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    /// Looks up the first sent record with the given name.
    pub fn find(&self, name: &str) -> Option<MetricRecord> {
        lock(&self.shared.records)
            .iter()
            .find(|r| r.name == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.shared.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all recorded records.
    pub fn clear(&self) {
        lock(&self.shared.records).clear();
    }

    /// Makes every subsequent send fail (or succeed again).
    pub fn set_fail_all(&self, fail: bool) {
        self.shared.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent flush fail, as a transport that accepted
    /// buffered records but could not deliver them.
    pub fn set_fail_flush(&self, fail: bool) {
        self.shared.fail_flush.store(fail, Ordering::SeqCst);
    }

    /// Makes sends of records with this exact name fail.
    pub fn fail_on(&self, name: &str) {
        lock(&self.shared.fail_names).insert(name.to_string());
    }

    /// How many times this sink was opened through [`SinkFactory`].
    pub fn open_count(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    /// How many times `close` was called on this sink or a clone.
    pub fn close_count(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

impl MetricSink for InMemorySink {
    fn send(&mut self, record: &MetricRecord) -> Result<(), SinkError> {
        if self.shared.fail_all.load(Ordering::SeqCst)
            || lock(&self.shared.fail_names).contains(&record.name)
        {
            return Err(SinkError::Rejected {
                name: record.name.clone(),
            });
        }
        lock(&self.shared.records).push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if self.shared.fail_flush.load(Ordering::SeqCst) {
            return Err(SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "flush refused",
            )));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.shared.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl SinkFactory for InMemorySink {
    fn open(&self, _endpoint: &ProxyEndpoint) -> Result<Box<dyn MetricSink + Send>, SinkError> {
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}
