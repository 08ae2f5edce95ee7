use chrono::{DateTime, Utc};
use serde_json::Value;
use std::error::Error;

use crate::fields::Fields;
use crate::kverrors::{self, KvError};

/// Reserved field key holding the root cause of an error record.
pub const ERROR_KEY: &str = "error";

/// A single log entry, built per call and dropped once encoded.
#[derive(Debug, Clone)]
pub struct LogRecord<'a> {
    pub timestamp: DateTime<Utc>,
    pub level: u32,
    pub name: &'a str,
    pub message: &'a str,
    pub base_fields: &'a Fields,
    pub call_fields: &'a Fields,
    pub error: Option<ErrorContext>,
}

impl<'a> LogRecord<'a> {
    pub fn new(
        level: u32,
        name: &'a str,
        message: &'a str,
        base_fields: &'a Fields,
        call_fields: &'a Fields,
    ) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            level,
            name,
            message,
            base_fields,
            call_fields,
            error: None,
        }
    }

    pub fn with_error(mut self, err: &(dyn Error + 'static)) -> Self {
        self.error = Some(ErrorContext::from_error(err));
        self
    }

    /// All fields in output order: base, call-site, error context, and the
    /// reserved [`ERROR_KEY`] last.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        let (err_fields, root) = match &self.error {
            Some(ctx) => (Some(ctx.fields.iter()), Some((ERROR_KEY, &ctx.root))),
            None => (None, None),
        };
        self.base_fields
            .iter()
            .chain(self.call_fields.iter())
            .chain(err_fields.into_iter().flatten())
            .chain(root)
    }
}

/// Flattened view of an error chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Message of every error in the chain, outermost first.
    pub messages: Vec<String>,
    /// Key/value pairs of every [`KvError`] in the chain, root first so
    /// that the most recent context comes last.
    pub fields: Fields,
    /// String form of the root cause.
    pub root: Value,
}

impl ErrorContext {
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let links: Vec<&(dyn Error + 'static)> = kverrors::chain(err).collect();

        let messages = links.iter().map(|e| e.to_string()).collect();
        let mut fields = Fields::new();
        for link in links.iter().rev() {
            if let Some(kv) = link.downcast_ref::<KvError>() {
                fields.extend(kv.fields().clone());
            }
        }
        let root = Value::String(kverrors::root(err).to_string());

        ErrorContext {
            messages,
            fields,
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv;
    use crate::kverrors::wrap;
    use serde_json::json;

    #[test]
    fn error_context_flattens_root_first() {
        let err = wrap(
            KvError::with_fields("root", kv! { "a" => 1, "shared" => "inner" }),
            "top",
            kv! { "shared" => "outer" },
        );
        let ctx = ErrorContext::from_error(&err);
        assert_eq!(ctx.messages, vec!["top", "root"]);
        assert_eq!(ctx.fields, kv! { "a" => 1, "shared" => "inner", "shared" => "outer" });
        assert_eq!(ctx.root, json!("root"));
    }

    #[test]
    fn record_fields_order() {
        let base = kv! { "b" => 1 };
        let call = kv! { "c" => 2 };
        let err = KvError::with_fields("boom", kv! { "e" => 3 });
        let rec = LogRecord::new(0, "app", "m", &base, &call).with_error(&err);
        let keys: Vec<&str> = rec.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "c", "e", ERROR_KEY]);
    }
}
