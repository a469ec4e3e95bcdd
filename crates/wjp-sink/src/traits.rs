//! The [`MetricSink`] contract and the [`SinkFactory`] used by hosts.
//!
//! Sinks are synchronous: each `send` blocks until the record has been
//! handed to the transport. Callers that run on an async runtime move sink
//! work onto a blocking thread.

use wjp_core::MetricRecord;

use crate::error::SinkError;
use crate::types::ProxyEndpoint;

/// Destination for metric records.
pub trait MetricSink {
    /// Delivers one record. A buffering sink may return `Ok` before the
    /// record reaches the transport; delivery failures then surface from
    /// [`flush`](Self::flush).
    fn send(&mut self, record: &MetricRecord) -> Result<(), SinkError>;

    /// Pushes buffered data to the transport.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Flushes and releases the transport. A closed sink may be reopened by
    /// the next `send` if the backend supports it.
    fn close(&mut self) -> Result<(), SinkError> {
        self.flush()
    }
}

impl<S: MetricSink + ?Sized> MetricSink for Box<S> {
    fn send(&mut self, record: &MetricRecord) -> Result<(), SinkError> {
        (**self).send(record)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<(), SinkError> {
        (**self).close()
    }
}

impl<S: MetricSink + ?Sized> MetricSink for &mut S {
    fn send(&mut self, record: &MetricRecord) -> Result<(), SinkError> {
        (**self).send(record)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<(), SinkError> {
        (**self).close()
    }
}

/// Opens sinks for a proxy endpoint.
///
/// Hosts hold a factory instead of a sink so that a configuration change can
/// drop the current sink and open a new one on next use.
pub trait SinkFactory: Send + Sync {
    fn open(&self, endpoint: &ProxyEndpoint) -> Result<Box<dyn MetricSink + Send>, SinkError>;
}
