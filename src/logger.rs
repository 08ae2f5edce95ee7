use std::error::Error;
use std::fmt;

use crate::fields::Fields;
use crate::log_sink::LogSink;
use crate::sink::{Sink, SinkError};

/// Handle given to call sites: a sink plus a relative verbosity level.
///
/// [`Logger::v`] levels are additive: `logger.v(1).v(2)` logs at level 3.
pub struct Logger {
    sink: Box<dyn Sink>,
    level: u32,
}

impl Logger {
    pub fn new<S: Sink>(sink: S) -> Self {
        Logger::from_boxed(Box::new(sink))
    }

    pub fn from_boxed(sink: Box<dyn Sink>) -> Self {
        Logger { sink, level: 0 }
    }

    /// Logger at `level` more verbosity than this one.
    pub fn v(&self, level: u32) -> Logger {
        Logger {
            sink: self.sink.clone_sink(),
            level: self.level.saturating_add(level),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Whether [`Logger::info`] would emit anything at this logger's level.
    pub fn enabled(&self) -> bool {
        self.sink.enabled(self.level)
    }

    /// Log a non-error message.
    ///
    /// Encoding and write failures are reported on stderr and otherwise
    /// ignored; use [`Logger::try_info`] to handle them.
    pub fn info(&self, msg: &str, fields: Fields) {
        if let Err(e) = self.try_info(msg, fields) {
            report(&e);
        }
    }

    pub fn try_info(&self, msg: &str, fields: Fields) -> Result<(), SinkError> {
        if !self.enabled() {
            return Ok(());
        }
        self.sink.info(self.level, msg, &fields)
    }

    /// Log an error with its whole cause chain. Emitted at any verbosity.
    pub fn error(&self, err: &(dyn Error + 'static), msg: &str, fields: Fields) {
        if let Err(e) = self.try_error(err, msg, fields) {
            report(&e);
        }
    }

    pub fn try_error(
        &self,
        err: &(dyn Error + 'static),
        msg: &str,
        fields: Fields,
    ) -> Result<(), SinkError> {
        self.sink.error(err, msg, &fields)
    }

    pub fn with_values(&self, fields: Fields) -> Logger {
        Logger {
            sink: self.sink.with_values(fields),
            level: self.level,
        }
    }

    pub fn with_name(&self, name: &str) -> Logger {
        Logger {
            sink: self.sink.with_name(name),
            level: self.level,
        }
    }

    pub fn sink(&self) -> &dyn Sink {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> &mut dyn Sink {
        self.sink.as_mut()
    }

    /// Concrete sink, if it is a `S`.
    pub fn downcast_sink<S: Sink>(&self) -> Option<&S> {
        self.sink.as_any().downcast_ref::<S>()
    }
}

fn report(err: &SinkError) {
    eprintln!("logerr: dropping log record: {}", err);
}

impl Clone for Logger {
    fn clone(&self) -> Self {
        Logger {
            sink: self.sink.clone_sink(),
            level: self.level,
        }
    }
}

impl Default for Logger {
    /// JSON to stdout at verbosity 0, unnamed.
    fn default() -> Self {
        Logger::new(LogSink::default())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("sink", &self.sink.type_name())
            .field("level", &self.level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::JsonEncoder;
    use crate::kv;
    use crate::kverrors::KvError;
    use crate::noop_sink::NoopSink;
    use crate::output::BufferWriter;
    use serde_json::Value;
    use std::sync::Arc;

    fn logger(verbosity: u32) -> (Logger, BufferWriter) {
        let buf = BufferWriter::new();
        let sink = LogSink::new("app", buf.shared(), verbosity, Arc::new(JsonEncoder), Fields::new());
        (Logger::new(sink), buf)
    }

    fn levels(buf: &BufferWriter) -> Vec<u64> {
        buf.lines()
            .iter()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["level"].as_u64().unwrap())
            .collect()
    }

    #[test]
    fn v_levels_are_additive() {
        let (log, buf) = logger(3);
        log.info("l0", Fields::new());
        log.v(1).v(2).info("l3", Fields::new());
        log.v(4).info("l4", Fields::new());
        assert_eq!(levels(&buf), vec![0, 3]);
        assert_eq!(log.level(), 0);
    }

    #[test]
    fn v_saturates() {
        let (log, _) = logger(0);
        assert_eq!(log.v(u32::MAX).v(1).level(), u32::MAX);
    }

    #[test]
    fn errors_emit_regardless_of_level() {
        let (log, buf) = logger(0);
        log.v(9).error(&KvError::new("boom"), "failed", kv! { "k" => "v" });
        assert_eq!(buf.lines().len(), 1);
    }

    #[test]
    fn derivation_keeps_level_and_parent() {
        let (log, buf) = logger(1);
        let child = log.v(1).with_name("db").with_values(kv! { "shard" => 2 });
        child.info("query", Fields::new());

        let v: Value = serde_json::from_str(&buf.lines()[0]).unwrap();
        assert_eq!(v["logger"], "app.db");
        assert_eq!(v["level"], 1);
        assert_eq!(v["fields"]["shard"], 2);
        assert_eq!(log.downcast_sink::<LogSink>().unwrap().name(), "app");
    }

    #[test]
    fn downcast_and_capability() {
        let mut noop = Logger::new(NoopSink);
        assert!(noop.downcast_sink::<LogSink>().is_none());
        assert!(noop.sink_mut().as_mutable().is_none());

        let (mut log, _) = logger(0);
        assert!(log.sink_mut().as_mutable().is_some());
    }
}
