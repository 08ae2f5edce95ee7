//! Structured JSON logging with key/value carrying errors.
//!
//! A [`LogSink`] filters records by verbosity, accumulates name segments
//! and key/value [`Fields`], and writes one encoded line per call. A
//! [`KvError`] carries its own fields and cause chain, which the sink
//! flattens into the record when the error is logged.
//!
//! ```
//! use logerr::{kv, kverrors, KvError, LogSink, Logger, BufferWriter, option};
//!
//! let buf = BufferWriter::new();
//! let sink = LogSink::with_options("api", kv! { "version" => "1.2" }, vec![option::output(buf.shared())]);
//! let log = Logger::new(sink).with_name("auth");
//!
//! log.info("login", kv! { "user_id" => 42 });
//!
//! let err = kverrors::wrap(KvError::new("bad password"), "login failed", kv! { "user_id" => 42 });
//! log.error(&err, "request rejected", kv! {});
//!
//! assert_eq!(buf.lines().len(), 2);
//! ```

pub mod fields;
pub mod kverrors;
pub mod record;
pub mod encoder;
pub mod output;
pub mod sink;
pub mod log_sink;
pub mod noop_sink;
pub mod option;
pub mod logger;
pub mod context;
pub mod global;
pub mod env;

#[cfg(feature = "tracing-bridge")]
pub mod layer;
#[cfg(feature = "tracing-bridge")]
pub mod init;

pub use context::{ConfigError, LoggerContext};
pub use encoder::{Encoder, EncoderKind, JsonEncoder, TextEncoder};
pub use fields::{Fields, FieldsError};
pub use kverrors::KvError;
pub use log_sink::LogSink;
pub use logger::Logger;
pub use noop_sink::NoopSink;
pub use output::{BufferWriter, SharedWriter};
pub use sink::{MutableSink, Sink, SinkError};
