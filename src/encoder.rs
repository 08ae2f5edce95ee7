use std::fmt::Write as _;
use std::sync::Arc;

use chrono::SecondsFormat;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::record::LogRecord;

/// Turns a [`LogRecord`] into one newline-terminated line.
///
/// Implementations must not panic on any record; failures are reported as
/// [`EncodeError`].
pub trait Encoder: Send + Sync {
    fn encode(&self, record: &LogRecord<'_>) -> Result<Vec<u8>, EncodeError>;
}

/// Error returned when a record cannot be encoded.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("text encoding failed: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Timestamp layout shared by the built-in encoders: RFC 3339, UTC,
/// nanosecond precision, `Z` suffix.
pub fn format_timestamp(record: &LogRecord<'_>) -> String {
    record.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Default encoder: one JSON object per line.
///
/// ```text
/// {"ts":"2024-05-01T10:00:00.000000000Z","level":0,"logger":"app","msg":"started","fields":{"port":8080}}
/// ```
///
/// Error records add `"causes"` (chain messages, outermost first) and end
/// `fields` with the reserved `"error"` key. Duplicate keys are written
/// verbatim; readers that enforce unique keys keep the last one.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

#[derive(Serialize)]
struct JsonLine<'r, 'a> {
    ts: String,
    level: u32,
    logger: &'a str,
    msg: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    causes: Option<&'r [String]>,
    fields: FieldsView<'r, 'a>,
}

struct FieldsView<'r, 'a>(&'r LogRecord<'a>);

impl Serialize for FieldsView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (k, v) in self.0.fields() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, record: &LogRecord<'_>) -> Result<Vec<u8>, EncodeError> {
        let line = JsonLine {
            ts: format_timestamp(record),
            level: record.level,
            logger: record.name,
            msg: record.message,
            causes: record.error.as_ref().map(|e| e.messages.as_slice()),
            fields: FieldsView(record),
        };
        let mut out = serde_json::to_vec(&line)?;
        out.push(b'\n');
        Ok(out)
    }
}

/// logfmt-style encoder for terminals.
///
/// ```text
/// 2024-05-01T10:00:00.000000000Z level=0 logger="app" msg="started" port=8080
/// ```
///
/// Values are rendered as JSON and every pair is printed, duplicates
/// included. Keys that are empty or contain whitespace, `=` or `"` are
/// quoted so each line still splits into pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEncoder;

impl Encoder for TextEncoder {
    fn encode(&self, record: &LogRecord<'_>) -> Result<Vec<u8>, EncodeError> {
        let mut out = String::with_capacity(128);
        write!(
            out,
            "{} level={} logger={} msg={}",
            format_timestamp(record),
            record.level,
            serde_json::to_string(record.name)?,
            serde_json::to_string(record.message)?,
        )?;
        if let Some(err) = &record.error {
            write!(out, " causes={}", serde_json::to_string(&err.messages)?)?;
        }
        for (k, v) in record.fields() {
            out.push(' ');
            push_key(&mut out, k)?;
            write!(out, "={}", serde_json::to_string(v)?)?;
        }
        out.push('\n');
        Ok(out.into_bytes())
    }
}

fn push_key(out: &mut String, key: &str) -> Result<(), EncodeError> {
    let bare = !key.is_empty()
        && !key
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '=' || c == '"');
    if bare {
        out.push_str(key);
    } else {
        out.push_str(&serde_json::to_string(key)?);
    }
    Ok(())
}

/// Built-in encoder selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderKind {
    Json,
    Text,
}

/// Error returned when an encoder name is not recognised.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown log format {0:?}, expected \"json\" or \"text\"")]
    Unknown(String),
}

/// Parse an encoder name, ignoring case and surrounding whitespace.
pub fn parse_format(name: &str) -> Result<EncoderKind, FormatError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(EncoderKind::Json),
        "text" | "logfmt" => Ok(EncoderKind::Text),
        _ => Err(FormatError::Unknown(name.to_string())),
    }
}

impl std::str::FromStr for EncoderKind {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_format(s)
    }
}

pub fn make_encoder(kind: EncoderKind) -> Arc<dyn Encoder> {
    match kind {
        EncoderKind::Json => Arc::new(JsonEncoder),
        EncoderKind::Text => Arc::new(TextEncoder),
    }
}
