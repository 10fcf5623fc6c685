//! JSON-lines record sink.
//!
//! Appends one JSON object per significant reading, and free-form log
//! lines verbatim, to any [`Write`]r. The host binary points it at a file
//! opened in append mode.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::app::ports::{RecordSink, SinkError};
use crate::ingest::SensorRecord;

pub struct JsonLinesSink<W> {
    writer: W,
}

impl JsonLinesSink<File> {
    /// Open (or create) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn persist_line(&mut self, line: &str) -> Result<(), SinkError> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }

    fn persist_record(&mut self, record: &SensorRecord) -> Result<(), SinkError> {
        let json = record.to_json().map_err(|_| SinkError::Encode)?;
        self.persist_line(&json)
    }
}
