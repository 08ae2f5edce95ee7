//! Errors that carry key/value context alongside their message.
//!
//! A [`KvError`] never changes after construction. Attaching more context
//! produces a new error that owns the previous one as its cause, so the
//! chain reads from the most recent context down to the root failure.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

use crate::fields::{Fields, FieldsError};

/// Shared, thread-safe handle to any error used as a cause.
pub type Cause = Arc<dyn Error + Send + Sync + 'static>;

/// Error with a message, ordered key/value context and an optional cause.
#[derive(Debug, Clone)]
pub struct KvError {
    message: String,
    fields: Fields,
    cause: Option<Cause>,
}

impl KvError {
    /// Leaf error: no fields, no cause.
    pub fn new(message: impl Into<String>) -> Self {
        KvError {
            message: message.into(),
            fields: Fields::new(),
            cause: None,
        }
    }

    /// Leaf error with context.
    pub fn with_fields(message: impl Into<String>, fields: Fields) -> Self {
        KvError {
            message: message.into(),
            fields,
            cause: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Immediate cause, if any.
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// See [`add`].
    pub fn add(&self, fields: Fields) -> KvError {
        add(self.clone(), fields)
    }

    /// See [`wrap`].
    pub fn wrap(self, message: impl Into<String>, fields: Fields) -> KvError {
        wrap(self, message, fields)
    }
}

/// Attach `fields` to `err`.
///
/// The result keeps the cause's message and owns `err` as its cause.
pub fn add<E>(err: E, fields: Fields) -> KvError
where
    E: Error + Send + Sync + 'static,
{
    KvError {
        message: err.to_string(),
        fields,
        cause: Some(Arc::new(err)),
    }
}

/// [`add`] with an alternating `key, value, ...` list.
///
/// Fails on odd-length lists or non-string keys; no error is built in that
/// case.
pub fn add_flat<E, I>(err: E, values: I) -> Result<KvError, FieldsError>
where
    E: Error + Send + Sync + 'static,
    I: IntoIterator<Item = Value>,
{
    let fields = Fields::from_flat(values)?;
    Ok(add(err, fields))
}

/// Wrap `err` under a new message with additional context.
pub fn wrap<E>(err: E, message: impl Into<String>, fields: Fields) -> KvError
where
    E: Error + Send + Sync + 'static,
{
    KvError {
        message: message.into(),
        fields,
        cause: Some(Arc::new(err)),
    }
}

/// Immediate cause of `err`, or `None` at the end of the chain.
pub fn unwrap<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a (dyn Error + 'static)> {
    err.source()
}

/// Terminal error of the chain starting at `err`.
pub fn root<'a>(err: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}

/// Iterate the chain from `err` down to its root.
pub fn chain<'a>(err: &'a (dyn Error + 'static)) -> Chain<'a> {
    Chain { next: Some(err) }
}

/// Iterator returned by [`chain`].
pub struct Chain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

/// Whether any error in the chain of `err` equals `target`.
pub fn is(err: &(dyn Error + 'static), target: &KvError) -> bool {
    chain(err)
        .filter_map(|e| e.downcast_ref::<KvError>())
        .any(|e| e == target)
}

fn causes_eq(a: &(dyn Error + 'static), b: &(dyn Error + 'static)) -> bool {
    match (a.downcast_ref::<KvError>(), b.downcast_ref::<KvError>()) {
        (Some(a), Some(b)) => a == b,
        (None, None) => a.to_string() == b.to_string() && opt_causes_eq(a.source(), b.source()),
        _ => false,
    }
}

fn opt_causes_eq(a: Option<&(dyn Error + 'static)>, b: Option<&(dyn Error + 'static)>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => causes_eq(a, b),
        _ => false,
    }
}

impl PartialEq for KvError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
            && self.fields == other.fields
            && opt_causes_eq(self.source(), other.source())
    }
}

impl fmt::Display for KvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn Error + 'static))
    }
}

// Opaque causes serialize as their string form.
impl Serialize for KvError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("KvError", 3)?;
        s.serialize_field("msg", &self.message)?;
        s.serialize_field("fields", &self.fields)?;
        match self.cause.as_deref() {
            None => s.serialize_field("cause", &Option::<()>::None)?,
            Some(cause) => match (cause as &(dyn Error + 'static)).downcast_ref::<KvError>() {
                Some(kv) => s.serialize_field("cause", kv)?,
                None => s.serialize_field("cause", &cause.to_string())?,
            },
        }
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv;
    use serde_json::json;
    use std::io;

    fn nested() -> KvError {
        wrap(wrap(KvError::new("root"), "mid", Fields::new()), "top", Fields::new())
    }

    #[test]
    fn unwrap_walks_outermost_to_root() {
        let err = nested();
        let mut messages = Vec::new();
        let mut current: Option<&(dyn Error + 'static)> = Some(&err);
        while let Some(e) = current {
            messages.push(e.to_string());
            current = unwrap(e);
        }
        assert_eq!(messages, vec!["top", "mid", "root"]);
    }

    #[test]
    fn chain_and_root_agree() {
        let err = nested();
        let messages: Vec<String> = chain(&err).map(|e| e.to_string()).collect();
        assert_eq!(messages, vec!["top", "mid", "root"]);
        assert_eq!(root(&err).to_string(), "root");
        assert!(unwrap(root(&err)).is_none());
    }

    #[test]
    fn root_of_opaque_cause() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing file");
        let err = wrap(io_err, "load config", kv! { "path" => "/etc/app.toml" });
        assert_eq!(root(&err).to_string(), "missing file");
    }

    #[test]
    fn equality_covers_message_fields_and_cause() {
        let build = |v: i64| {
            wrap(
                KvError::with_fields("root", kv! { "a" => 1 }),
                "top",
                kv! { "b" => v },
            )
        };
        assert_eq!(build(2), build(2));
        assert_ne!(build(2), build(3));

        let other_cause = wrap(KvError::new("other"), "top", kv! { "b" => 2 });
        assert_ne!(build(2), other_cause);

        let no_cause = KvError::with_fields("top", kv! { "b" => 2 });
        assert_ne!(build(2), no_cause);
    }

    #[test]
    fn field_order_matters_for_equality() {
        let a = KvError::with_fields("m", kv! { "x" => 1, "y" => 2 });
        let b = KvError::with_fields("m", kv! { "y" => 2, "x" => 1 });
        assert_ne!(a, b);
    }

    #[test]
    fn opaque_causes_compare_by_string() {
        let a = add(io::Error::new(io::ErrorKind::Other, "boom"), kv! { "k" => "v" });
        let b = add(io::Error::new(io::ErrorKind::Other, "boom"), kv! { "k" => "v" });
        let c = add(io::Error::new(io::ErrorKind::Other, "bang"), kv! { "k" => "v" });
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn add_keeps_message_and_wraps_original() {
        let base = KvError::new("not found");
        let added = base.add(kv! { "id" => 7 });
        assert_eq!(added.message(), "not found");
        assert_eq!(added.fields().get("id"), Some(&json!(7)));
        assert_eq!(added.cause().map(|c| c.to_string()), Some("not found".into()));
        assert!(base.cause().is_none());
    }

    #[test]
    fn add_flat_rejects_odd_lists() {
        let res = add_flat(KvError::new("x"), vec![json!("only_key")]);
        assert!(matches!(res, Err(FieldsError::OddLength(1))));

        let ok = add_flat(KvError::new("x"), vec![json!("k"), json!(true)]).unwrap();
        assert_eq!(ok.fields().get("k"), Some(&json!(true)));
    }

    #[test]
    fn is_matches_anywhere_in_chain() {
        let sentinel = KvError::new("unknown logger type");
        let err = wrap(sentinel.add(kv! { "t" => "x" }), "set level", Fields::new());
        assert!(is(&err, &sentinel));
        assert!(!is(&err, &KvError::new("something else")));
    }

    #[test]
    fn serializes_nested_causes() {
        let err = wrap(KvError::with_fields("root", kv! { "a" => 1 }), "top", kv! { "b" => 2 });
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(
            v,
            json!({
                "msg": "top",
                "fields": {"b": 2},
                "cause": {"msg": "root", "fields": {"a": 1}, "cause": null}
            })
        );
    }
}
