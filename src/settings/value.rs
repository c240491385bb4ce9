use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single stored setting.
///
/// Serialized untagged, so the blob in the `settings` column is plain JSON
/// (`{"buckets":["a","b"],"retries":3}`). Floats must be finite to be stored;
/// see [`SettingValue::non_finite_path`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<SettingValue>),
    Map(BTreeMap<String, SettingValue>),
}

impl SettingValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Float(f) => Some(*f),
            SettingValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SettingValue]> {
        match self {
            SettingValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, SettingValue>> {
        match self {
            SettingValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Location of the first NaN or infinite float, if any (`""` for the value
    /// itself, `"[2]"` or `".limits"` for nested ones). JSON has no encoding
    /// for these, so they cannot be stored.
    pub fn non_finite_path(&self) -> Option<String> {
        match self {
            SettingValue::Float(f) if !f.is_finite() => Some(String::new()),
            SettingValue::List(items) => items.iter().enumerate().find_map(|(i, item)| {
                item.non_finite_path().map(|rest| format!("[{i}]{rest}"))
            }),
            SettingValue::Map(map) => map.iter().find_map(|(k, v)| {
                v.non_finite_path().map(|rest| format!(".{k}{rest}"))
            }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SettingValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SettingValue::Null => "null",
            SettingValue::Bool(_) => "bool",
            SettingValue::Integer(_) => "integer",
            SettingValue::Float(_) => "float",
            SettingValue::String(_) => "string",
            SettingValue::List(_) => "list",
            SettingValue::Map(_) => "map",
        }
    }
}

impl<'de> Deserialize<'de> for SettingValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SettingValueVisitor)
    }
}

/// Like an untagged derive, except integers that do not fit `i64` are an
/// error instead of silently becoming floats.
struct SettingValueVisitor;

impl<'de> Visitor<'de> for SettingValueVisitor {
    type Value = SettingValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON setting value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<SettingValue, E> {
        Ok(SettingValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<SettingValue, E> {
        Ok(SettingValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<SettingValue, D::Error> {
        SettingValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<SettingValue, E> {
        Ok(SettingValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<SettingValue, E> {
        Ok(SettingValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<SettingValue, E> {
        i64::try_from(v)
            .map(SettingValue::Integer)
            .map_err(|_| E::custom(format!("integer {v} is out of range for a setting")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<SettingValue, E> {
        Ok(SettingValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SettingValue, E> {
        Ok(SettingValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<SettingValue, E> {
        Ok(SettingValue::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SettingValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(SettingValue::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SettingValue, A::Error> {
        let mut map = BTreeMap::new();
        while let Some((key, value)) = access.next_entry::<String, SettingValue>()? {
            map.insert(key, value);
        }
        Ok(SettingValue::Map(map))
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "<{}>", self.kind()),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Integer(v)
    }
}

impl From<i32> for SettingValue {
    fn from(v: i32) -> Self {
        SettingValue::Integer(i64::from(v))
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        SettingValue::Float(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::String(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        SettingValue::String(v)
    }
}

impl<T: Into<SettingValue>> From<Vec<T>> for SettingValue {
    fn from(v: Vec<T>) -> Self {
        SettingValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, SettingValue>> for SettingValue {
    fn from(v: BTreeMap<String, SettingValue>) -> Self {
        SettingValue::Map(v)
    }
}

impl<T: Into<SettingValue>> From<Option<T>> for SettingValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SettingValue::Null, Into::into)
    }
}
