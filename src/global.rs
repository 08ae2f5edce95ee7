//! Process-wide default [`LoggerContext`].
//!
//! Before [`init`] is called a JSON-to-stdout sink at verbosity 0 is
//! already installed, so logging never fails for lack of setup. Programs
//! that prefer explicit wiring can own a [`LoggerContext`] instead.

use std::error::Error;
use std::sync::LazyLock;

use crate::context::{ConfigError, LoggerContext};
use crate::fields::Fields;
use crate::logger::Logger;
use crate::option::SinkOption;
use crate::output::SharedWriter;

static CONTEXT: LazyLock<LoggerContext> = LazyLock::new(LoggerContext::default);

/// The default context itself.
pub fn context() -> &'static LoggerContext {
    &CONTEXT
}

/// Install a logger for `component`. `fields` are attached to every
/// subsequent record.
pub fn init(component: &str, fields: Fields) {
    CONTEXT.init(component, fields);
}

pub fn init_with_options<I>(component: &str, options: I, fields: Fields)
where
    I: IntoIterator<Item = SinkOption>,
{
    CONTEXT.init_with_options(component, options, fields);
}

/// Replace the logger without going through [`init`].
pub fn use_logger(logger: Logger) {
    CONTEXT.use_logger(logger);
}

pub fn logger() -> Logger {
    CONTEXT.logger()
}

pub fn v(level: u32) -> Logger {
    CONTEXT.v(level)
}

pub fn info(msg: &str, fields: Fields) {
    CONTEXT.info(msg, fields);
}

pub fn error(err: &(dyn Error + 'static), msg: &str, fields: Fields) {
    CONTEXT.error(err, msg, fields);
}

pub fn with_values(fields: Fields) -> Logger {
    CONTEXT.with_values(fields)
}

pub fn with_name(name: &str) -> Logger {
    CONTEXT.with_name(name)
}

pub fn set_log_level(verbosity: u32) -> Result<(), ConfigError> {
    CONTEXT.set_log_level(verbosity)
}

pub fn set_output(output: SharedWriter) -> Result<(), ConfigError> {
    CONTEXT.set_output(output)
}
