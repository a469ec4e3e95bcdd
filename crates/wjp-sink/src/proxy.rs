//! [`ProxySink`]: Wavefront lines over TCP to a proxy.
//!
//! The connection is opened lazily on the first send. A write failure drops
//! the connection and returns the error; the next send reconnects. Nothing
//! is retried.
//!
//! Lines go through a `BufWriter`, so a successful `send` only means the
//! line was buffered. Socket errors for a batch show up at `flush` (or
//! `close`), once per batch rather than per record.

use std::io::{BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, warn};
use wjp_core::MetricRecord;

use crate::error::SinkError;
use crate::line::encode_line;
use crate::traits::{MetricSink, SinkFactory};
use crate::types::ProxyEndpoint;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends records to a Wavefront proxy.
#[derive(Debug)]
pub struct ProxySink {
    endpoint: ProxyEndpoint,
    connect_timeout: Duration,
    stream: Option<BufWriter<TcpStream>>,
}

impl ProxySink {
    pub fn new(endpoint: ProxyEndpoint) -> Self {
        ProxySink {
            endpoint,
            connect_timeout: CONNECT_TIMEOUT,
            stream: None,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &ProxyEndpoint {
        &self.endpoint
    }

    /// Returns `true` while a connection is open.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn connect(&self) -> Result<TcpStream, SinkError> {
        if !self.endpoint.is_configured() {
            return Err(SinkError::NotConfigured);
        }
        let connect_err = |source| SinkError::Connect {
            endpoint: self.endpoint.to_string(),
            source,
        };
        let addrs = (self.endpoint.host.as_str(), self.endpoint.port)
            .to_socket_addrs()
            .map_err(connect_err)?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    debug!(endpoint = %self.endpoint, %addr, "connected to proxy");
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(connect_err(last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "host resolved to no addresses")
        })))
    }

    fn stream(&mut self) -> Result<&mut BufWriter<TcpStream>, SinkError> {
        if self.stream.is_none() {
            self.stream = Some(BufWriter::new(self.connect()?));
        }
        self.stream.as_mut().ok_or(SinkError::NotConfigured)
    }
}

impl MetricSink for ProxySink {
    fn send(&mut self, record: &MetricRecord) -> Result<(), SinkError> {
        let line = encode_line(record);
        let stream = self.stream()?;
        if let Err(err) = writeln!(stream, "{line}") {
            warn!(endpoint = %self.endpoint, error = %err, "proxy write failed, dropping connection");
            self.stream = None;
            return Err(err.into());
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if let Some(stream) = self.stream.as_mut() {
            if let Err(err) = stream.flush() {
                self.stream = None;
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        let result = self.flush();
        self.stream = None;
        result
    }
}

impl Drop for ProxySink {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(endpoint = %self.endpoint, error = %err, "failed to flush proxy sink on drop");
        }
    }
}

/// Opens a [`ProxySink`] per endpoint.
#[derive(Debug, Clone, Default)]
pub struct ProxySinkFactory {
    connect_timeout: Option<Duration>,
}

impl ProxySinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(timeout: Duration) -> Self {
        ProxySinkFactory {
            connect_timeout: Some(timeout),
        }
    }
}

impl SinkFactory for ProxySinkFactory {
    fn open(&self, endpoint: &ProxyEndpoint) -> Result<Box<dyn MetricSink + Send>, SinkError> {
        if !endpoint.is_configured() {
            return Err(SinkError::NotConfigured);
        }
        let mut sink = ProxySink::new(endpoint.clone());
        if let Some(timeout) = self.connect_timeout {
            sink = sink.with_connect_timeout(timeout);
        }
        Ok(Box::new(sink))
    }
}
