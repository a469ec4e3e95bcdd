//! Sink error types for wjp-sink.

use thiserror::Error;

/// Errors produced while delivering records.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to or flushing the underlying transport failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening the proxy connection failed.
    #[error("cannot connect to proxy at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// No proxy host has been configured.
    #[error("proxy endpoint is not configured")]
    NotConfigured,

    /// The sink refused the record.
    #[error("record rejected: {name}")]
    Rejected { name: String },
}
