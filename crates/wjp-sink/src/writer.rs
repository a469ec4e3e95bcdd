//! [`WriterSink`]: encoded lines to any writer.

use std::io::Write;

use wjp_core::MetricRecord;

use crate::error::SinkError;
use crate::line::encode_line;
use crate::traits::MetricSink;

/// Writes one Wavefront line per record to `W`.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    lines: u64,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink { writer, lines: 0 }
    }

    /// Number of lines written.
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MetricSink for WriterSink<W> {
    fn send(&mut self, record: &MetricRecord) -> Result<(), SinkError> {
        writeln!(self.writer, "{}", encode_line(record))?;
        self.lines += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
