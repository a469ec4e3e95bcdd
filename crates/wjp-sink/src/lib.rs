//! Metric sinks: where finished [`MetricRecord`]s go.
//!
//! Provides the [`MetricSink`] contract, the Wavefront line encoder, and
//! three backends:
//!
//! - [`ProxySink`]: TCP connection to a Wavefront proxy
//! - [`WriterSink`]: encoded lines to any `io::Write` (stdout, files)
//! - [`InMemorySink`]: keeps records for inspection in tests
//!
//! [`SinkFactory`] lets a host open a fresh sink whenever the proxy endpoint
//! changes, so sink lifecycle stays with the host.
//!
//! [`MetricRecord`]: wjp_core::MetricRecord

pub mod error;
pub mod line;
pub mod memory;
pub mod proxy;
pub mod traits;
pub mod types;
pub mod writer;

pub use error::SinkError;
pub use line::encode_line;
pub use memory::InMemorySink;
pub use proxy::{ProxySink, ProxySinkFactory};
pub use traits::{MetricSink, SinkFactory};
pub use types::ProxyEndpoint;
pub use writer::WriterSink;
