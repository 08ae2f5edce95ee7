//! Functional options applied to a [`LogSink`] before it is used.

use std::sync::Arc;

use crate::encoder::Encoder;
use crate::log_sink::LogSink;
use crate::output::SharedWriter;

/// Transformation applied to a freshly built sink.
pub type SinkOption = Box<dyn FnOnce(&mut LogSink) + Send>;

pub fn output(output: SharedWriter) -> SinkOption {
    Box::new(move |sink| sink.set_output(output))
}

pub fn verbosity(verbosity: u32) -> SinkOption {
    Box::new(move |sink| sink.set_verbosity(verbosity))
}

pub fn encoder(encoder: Arc<dyn Encoder>) -> SinkOption {
    Box::new(move |sink| sink.set_encoder(encoder))
}
