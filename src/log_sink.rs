use std::any::Any;
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::encoder::{Encoder, JsonEncoder};
use crate::fields::Fields;
use crate::option::SinkOption;
use crate::output::SharedWriter;
use crate::record::LogRecord;
use crate::sink::{MutableSink, Sink, SinkError};

/// Separator between logger name segments.
pub const NAME_SEPARATOR: &str = ".";

/// Level-filtered sink that encodes each record and writes it as one line.
///
/// Clones share the verbosity threshold and the output slot, so
/// [`LogSink::set_verbosity`] and [`LogSink::set_output`] reach every clone.
/// Sinks derived through `with_name`/`with_values` start from a snapshot of
/// both and are reconfigured independently.
#[derive(Clone)]
pub struct LogSink {
    name: String,
    fields: Fields,
    verbosity: Arc<AtomicU32>,
    output: Arc<RwLock<SharedWriter>>,
    encoder: Arc<dyn Encoder>,
}

impl LogSink {
    pub fn new(
        name: impl Into<String>,
        output: SharedWriter,
        verbosity: u32,
        encoder: Arc<dyn Encoder>,
        fields: Fields,
    ) -> Self {
        LogSink {
            name: name.into(),
            fields,
            verbosity: Arc::new(AtomicU32::new(verbosity)),
            output: Arc::new(RwLock::new(output)),
            encoder,
        }
    }

    /// Sink writing JSON to stdout at verbosity 0, then adjusted by
    /// `options` in order.
    pub fn with_options<I>(name: impl Into<String>, fields: Fields, options: I) -> Self
    where
        I: IntoIterator<Item = SinkOption>,
    {
        let mut sink = LogSink::new(
            name,
            SharedWriter::stdout(),
            0,
            Arc::new(JsonEncoder),
            fields,
        );
        for opt in options {
            opt(&mut sink);
        }
        sink
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn verbosity(&self) -> u32 {
        self.verbosity.load(Ordering::Relaxed)
    }

    /// Current destination.
    pub fn output(&self) -> SharedWriter {
        self.output
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn encoder(&self) -> &Arc<dyn Encoder> {
        &self.encoder
    }

    pub fn set_verbosity(&mut self, verbosity: u32) {
        self.verbosity.store(verbosity, Ordering::Relaxed);
    }

    /// Waits for a line being written through any clone to finish.
    pub fn set_output(&mut self, output: SharedWriter) {
        *self.output.write().unwrap_or_else(PoisonError::into_inner) = output;
    }

    pub fn set_encoder(&mut self, encoder: Arc<dyn Encoder>) {
        self.encoder = encoder;
    }

    fn joined_name(&self, segment: &str) -> String {
        if self.name.is_empty() {
            segment.to_string()
        } else {
            format!("{}{}{}", self.name, NAME_SEPARATOR, segment)
        }
    }

    /// Copy with its own verbosity and output slot, used for derivation.
    fn detached(&self) -> LogSink {
        LogSink {
            name: self.name.clone(),
            fields: self.fields.clone(),
            verbosity: Arc::new(AtomicU32::new(self.verbosity())),
            output: Arc::new(RwLock::new(self.output())),
            encoder: Arc::clone(&self.encoder),
        }
    }

    fn write(&self, record: &LogRecord<'_>) -> Result<(), SinkError> {
        let line = self.encoder.encode(record)?;
        let output = self.output.read().unwrap_or_else(PoisonError::into_inner);
        output.write_line(&line)?;
        Ok(())
    }
}

impl Default for LogSink {
    fn default() -> Self {
        LogSink::with_options("", Fields::new(), Vec::new())
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("verbosity", &self.verbosity())
            .field("output", &self.output())
            .finish_non_exhaustive()
    }
}

impl Sink for LogSink {
    fn enabled(&self, level: u32) -> bool {
        level <= self.verbosity()
    }

    fn info(&self, level: u32, msg: &str, fields: &Fields) -> Result<(), SinkError> {
        if !self.enabled(level) {
            return Ok(());
        }
        let record = LogRecord::new(level, &self.name, msg, &self.fields, fields);
        self.write(&record)
    }

    fn error(
        &self,
        err: &(dyn Error + 'static),
        msg: &str,
        fields: &Fields,
    ) -> Result<(), SinkError> {
        let record = LogRecord::new(0, &self.name, msg, &self.fields, fields).with_error(err);
        self.write(&record)
    }

    fn with_values(&self, fields: Fields) -> Box<dyn Sink> {
        let mut sink = self.detached();
        sink.fields.extend(fields);
        Box::new(sink)
    }

    fn with_name(&self, name: &str) -> Box<dyn Sink> {
        let mut sink = self.detached();
        sink.name = self.joined_name(name);
        Box::new(sink)
    }

    fn clone_sink(&self) -> Box<dyn Sink> {
        Box::new(self.clone())
    }

    fn as_mutable(&mut self) -> Option<&mut dyn MutableSink> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl MutableSink for LogSink {
    fn set_verbosity(&mut self, verbosity: u32) {
        LogSink::set_verbosity(self, verbosity);
    }

    fn set_output(&mut self, output: SharedWriter) {
        LogSink::set_output(self, output);
    }
}
