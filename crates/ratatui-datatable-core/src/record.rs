use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Field that carries a record's identity.
pub const ID_FIELD: &str = "id";

/// A scalar cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Orders numbers numerically and text lexicographically. Numbers sort before text.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => match (self, other) {
                (Value::Int(a), Value::Int(b)) => a.cmp(b),
                _ => a.total_cmp(&b),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.to_string().cmp(&other.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::Float(v) => Some(v),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// Identity of a record, used for de-duplication and selection.
///
/// Integer `1` and text `"1"` are different identities. Integral floats collapse into
/// [`RecordId::Int`], so `1.0` and `1` are the same record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordId {
    Int(i64),
    Float(u64),
    Text(String),
    Generated(Uuid),
}

impl RecordId {
    /// Reads an identity from an explicit `id` value. Empty text carries no identity.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(RecordId::Int(*v)),
            Value::Float(v) => {
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v <= i64::MAX as f64 {
                    Some(RecordId::Int(*v as i64))
                } else if v.is_nan() {
                    None
                } else {
                    Some(RecordId::Float(v.to_bits()))
                }
            }
            Value::Text(s) if s.is_empty() => None,
            Value::Text(s) => Some(RecordId::Text(s.clone())),
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, RecordId::Generated(_))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(v) => write!(f, "{v}"),
            RecordId::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            RecordId::Text(s) => f.write_str(s),
            RecordId::Generated(u) => write!(f, "{u}"),
        }
    }
}

/// One row of input data: field names mapped to scalar values, in insertion order.
///
/// Field order is part of the record. Inserting an existing key replaces the value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some((_, slot)) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, value));
        }
        self.fields.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The identity given by the record's own `id` field, if any.
    pub fn explicit_id(&self) -> Option<RecordId> {
        self.get(ID_FIELD).and_then(RecordId::from_value)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field names to scalar values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        let mut record = Record::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            record.insert(key, value);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

/// A sanitized record together with the identity it is tracked by.
///
/// Generated identities live here only; they are never written into the record's fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    id: RecordId,
    record: Record,
}

impl Row {
    pub(crate) fn new(id: RecordId, record: Record) -> Self {
        Self { id, record }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    pub fn into_record(self) -> Record {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position() {
        let mut r = Record::new().with("id", 1).with("name", "a");
        r.insert("id", 2);
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(r.get("id"), Some(&Value::Int(2)));
    }

    #[test]
    fn deserialize_preserves_key_order() {
        let r: Record =
            serde_json::from_str(r#"{"name":"Jane","id":7,"age":29.5,"city":"Seattle"}"#).unwrap();
        assert_eq!(
            r.keys().collect::<Vec<_>>(),
            vec!["name", "id", "age", "city"]
        );
        assert_eq!(r.get("age"), Some(&Value::Float(29.5)));
        assert_eq!(r.explicit_id(), Some(RecordId::Int(7)));
    }

    #[test]
    fn deserialize_rejects_non_scalars() {
        assert!(serde_json::from_str::<Record>(r#"{"id":[1]}"#).is_err());
    }

    #[test]
    fn ids_distinguish_text_from_numbers() {
        assert_ne!(
            RecordId::from_value(&Value::Int(1)),
            RecordId::from_value(&Value::Text("1".into()))
        );
        assert_eq!(
            RecordId::from_value(&Value::Float(1.0)),
            Some(RecordId::Int(1))
        );
        assert_eq!(RecordId::from_value(&Value::Text(String::new())), None);
    }

    #[test]
    fn numbers_sort_before_text() {
        assert_eq!(Value::Int(10).compare(&Value::Int(9)), Ordering::Greater);
        assert_eq!(Value::Float(2.5).compare(&Value::Int(3)), Ordering::Less);
        assert_eq!(Value::Int(99).compare(&Value::from("a")), Ordering::Less);
        assert_eq!(Value::from("b").compare(&Value::from("a")), Ordering::Greater);
    }
}
