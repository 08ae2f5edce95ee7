use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Ordered list of key/value pairs attached to a sink, a log call or a
/// [`KvError`](crate::kverrors::KvError).
///
/// Insertion order is preserved and duplicate keys are kept. Nothing is
/// deduplicated on insert; readers that need a single value per key use
/// [`Fields::get`], which returns the last match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, Value)>);

/// Error returned when a field list cannot be built.
#[derive(thiserror::Error, Debug)]
pub enum FieldsError {
    #[error("odd number of key/value arguments: {0}")]
    OddLength(usize),

    #[error("key at position {index} is not a string: {key}")]
    NonStringKey { index: usize, key: Value },

    #[error("value for key {key:?} cannot be serialized: {source}")]
    Unserializable {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Fields {
    pub fn new() -> Self {
        Fields(Vec::new())
    }

    /// Builder form of [`Fields::push`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.push((key.into(), value.into()));
    }

    /// Append any serializable value.
    ///
    /// Fails when `value` has no JSON representation, e.g. a map keyed by
    /// tuples.
    pub fn try_with<T>(mut self, key: impl Into<String>, value: &T) -> Result<Self, FieldsError>
    where
        T: Serialize + ?Sized,
    {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(v) => {
                self.0.push((key, v));
                Ok(self)
            }
            Err(source) => Err(FieldsError::Unserializable { key, source }),
        }
    }

    /// Build from an alternating `key, value, key, value, ...` list.
    ///
    /// Odd-length lists and non-string keys are rejected; nothing is padded
    /// or dropped.
    pub fn from_flat<I>(values: I) -> Result<Self, FieldsError>
    where
        I: IntoIterator<Item = Value>,
    {
        let values: Vec<Value> = values.into_iter().collect();
        if values.len() % 2 != 0 {
            return Err(FieldsError::OddLength(values.len()));
        }

        let mut fields = Fields(Vec::with_capacity(values.len() / 2));
        let mut iter = values.into_iter().enumerate();
        while let (Some((index, key)), Some((_, value))) = (iter.next(), iter.next()) {
            match key {
                Value::String(key) => fields.0.push((key, value)),
                key => return Err(FieldsError::NonStringKey { index, key }),
            }
        }
        Ok(fields)
    }

    /// Flatten back into an alternating list. Always even-length.
    pub fn to_flat(&self) -> Vec<Value> {
        self.0
            .iter()
            .flat_map(|(k, v)| [Value::String(k.clone()), v.clone()])
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Value of the last pair named `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn extend(&mut self, other: Fields) {
        self.0.extend(other.0);
    }

    /// New list holding `self` followed by `other`.
    pub fn concat(&self, other: &Fields) -> Fields {
        let mut out = Vec::with_capacity(self.len() + other.len());
        out.extend_from_slice(&self.0);
        out.extend_from_slice(&other.0);
        Fields(out)
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Fields(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// Serialized as a map with every pair written in order, duplicates included.
impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Build [`Fields`] from `key => value` pairs.
///
/// ```
/// use logerr::kv;
///
/// let fields = kv! { "user_id" => 42, "reason" => "invalid password" };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! kv {
    () => {
        $crate::fields::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::fields::Fields::new()$(.with($key, $value))+
    };
}
