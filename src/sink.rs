use std::any::Any;
use std::error::Error;
use std::io;

use crate::encoder::EncodeError;
use crate::fields::Fields;
use crate::output::SharedWriter;

/// Leveled-logger contract every sink satisfies.
///
/// Derivation (`with_name`, `with_values`) never touches the receiver; it
/// returns a new sink, so many call sites can derive from one root without
/// coordination. Mutation is a separate capability, see [`MutableSink`].
pub trait Sink: Send + Sync + 'static {
    /// Whether a record at `level` would be emitted.
    fn enabled(&self, level: u32) -> bool;

    /// Emit a non-error record.
    ///
    /// **Parameters**
    /// - `level`: verbosity of the record, 0 being the most important.
    /// - `msg`: constant description of the event.
    /// - `fields`: call-site key/value pairs, appended after the sink's
    ///   base fields.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was written or filtered out.
    /// - `Err(..)` if encoding or writing failed.
    fn info(&self, level: u32, msg: &str, fields: &Fields) -> Result<(), SinkError>;

    /// Emit an error record. Never filtered by verbosity.
    ///
    /// The whole cause chain of `err` is rendered, including the key/value
    /// pairs of every [`KvError`](crate::kverrors::KvError) in it.
    fn error(&self, err: &(dyn Error + 'static), msg: &str, fields: &Fields)
        -> Result<(), SinkError>;

    /// New sink with `fields` appended to the base fields.
    fn with_values(&self, fields: Fields) -> Box<dyn Sink>;

    /// New sink with `name` appended to the logger name.
    fn with_name(&self, name: &str) -> Box<dyn Sink>;

    /// Handle on the same sink. Unlike derivation, a clone observes later
    /// [`MutableSink`] changes made through the original.
    fn clone_sink(&self) -> Box<dyn Sink>;

    /// Mutation capability, `None` when the sink cannot be reconfigured in
    /// place.
    fn as_mutable(&mut self) -> Option<&mut dyn MutableSink> {
        None
    }

    /// Concrete type name, used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any;
}

/// In-place reconfiguration.
///
/// Both methods take `&mut self`: callers sharing a sink across threads
/// must hold an exclusive lock, as [`LoggerContext`](crate::context::LoggerContext)
/// does.
pub trait MutableSink {
    fn set_verbosity(&mut self, verbosity: u32);

    fn set_output(&mut self, output: SharedWriter);
}

/// Error returned by [`Sink::info`] and [`Sink::error`].
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("failed to write log record: {0}")]
    Write(#[from] io::Error),
}
