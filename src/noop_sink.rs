use std::any::Any;
use std::error::Error;

use crate::fields::Fields;
use crate::sink::{Sink, SinkError};

/// A sink that simply drops all records.
///
/// Useful for silencing a component in tests. It has no output to swap and
/// no threshold to change, so it does not offer the mutation capability.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl Sink for NoopSink {
    fn enabled(&self, _level: u32) -> bool {
        false
    }

    fn info(&self, _level: u32, _msg: &str, _fields: &Fields) -> Result<(), SinkError> {
        Ok(())
    }

    fn error(
        &self,
        _err: &(dyn Error + 'static),
        _msg: &str,
        _fields: &Fields,
    ) -> Result<(), SinkError> {
        Ok(())
    }

    fn with_values(&self, _fields: Fields) -> Box<dyn Sink> {
        Box::new(NoopSink)
    }

    fn with_name(&self, _name: &str) -> Box<dyn Sink> {
        Box::new(NoopSink)
    }

    fn clone_sink(&self) -> Box<dyn Sink> {
        Box::new(NoopSink)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
