use std::error::Error;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::fields::Fields;
use crate::log_sink::LogSink;
use crate::logger::Logger;
use crate::option::SinkOption;
use crate::output::SharedWriter;
use crate::sink::{MutableSink, Sink};

/// Error returned when the installed logger cannot be reconfigured.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown logger type: {logger_type} (expected {expected_type})")]
    UnknownLoggerType {
        logger_type: String,
        expected_type: &'static str,
    },
}

/// Owner of the current [`Logger`].
///
/// Logging and derivation take the read lock; installing a logger or
/// changing its verbosity or output takes the write lock, so a
/// reconfiguration either fully precedes or fully follows any single write.
#[derive(Debug, Default)]
pub struct LoggerContext {
    logger: RwLock<Logger>,
}

impl LoggerContext {
    pub fn new(logger: Logger) -> Self {
        LoggerContext {
            logger: RwLock::new(logger),
        }
    }

    /// Install a JSON-to-stdout [`LogSink`] named `component` whose records
    /// all carry `fields`.
    pub fn init(&self, component: &str, fields: Fields) {
        self.init_with_options(component, Vec::new(), fields);
    }

    /// Like [`LoggerContext::init`], applying `options` to the sink first.
    pub fn init_with_options<I>(&self, component: &str, options: I, fields: Fields)
    where
        I: IntoIterator<Item = SinkOption>,
    {
        let sink = LogSink::with_options(component, fields, options);
        self.use_logger(Logger::new(sink));
    }

    /// Replace the current logger.
    pub fn use_logger(&self, logger: Logger) {
        *self.write() = logger;
    }

    /// Clone of the current logger.
    pub fn logger(&self) -> Logger {
        self.read().clone()
    }

    pub fn v(&self, level: u32) -> Logger {
        self.read().v(level)
    }

    pub fn info(&self, msg: &str, fields: Fields) {
        self.read().info(msg, fields);
    }

    pub fn error(&self, err: &(dyn Error + 'static), msg: &str, fields: Fields) {
        self.read().error(err, msg, fields);
    }

    pub fn with_values(&self, fields: Fields) -> Logger {
        self.read().with_values(fields)
    }

    pub fn with_name(&self, name: &str) -> Logger {
        self.read().with_name(name)
    }

    /// Change the verbosity threshold of the current sink.
    ///
    /// Fails with [`ConfigError::UnknownLoggerType`] when the sink does not
    /// support in-place mutation; the logger is left untouched.
    pub fn set_log_level(&self, verbosity: u32) -> Result<(), ConfigError> {
        self.mutate(|sink| sink.set_verbosity(verbosity))
    }

    /// Change the output of the current sink. Same failure mode as
    /// [`LoggerContext::set_log_level`].
    pub fn set_output(&self, output: SharedWriter) -> Result<(), ConfigError> {
        self.mutate(move |sink| sink.set_output(output))
    }

    fn mutate<F>(&self, f: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut dyn MutableSink),
    {
        let mut logger = self.write();
        let sink: &mut dyn Sink = logger.sink_mut();
        let logger_type = sink.type_name();
        match sink.as_mutable() {
            Some(m) => {
                f(m);
                Ok(())
            }
            None => Err(ConfigError::UnknownLoggerType {
                logger_type: logger_type.to_string(),
                expected_type: std::any::type_name::<LogSink>(),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Logger> {
        self.logger.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Logger> {
        self.logger.write().unwrap_or_else(PoisonError::into_inner)
    }
}
