#[cfg(test)]
mod tests;

use crate::model::AttributeKind;
use std::{cmp::Ordering, collections::BTreeMap, fmt};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

///
/// Value
///
/// Dynamic attribute value carried by an `Object`.
/// Conversion from raw JSON is guided by the declared `AttributeKind`;
/// undeclared attributes convert structurally.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(OffsetDateTime),
    List(Vec<Self>),
    Map(BTreeMap<String, Self>),
}

impl Value {
    //
    // Conversion
    //

    /// Convert a raw JSON value without any declared kind.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            serde_json::Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert a raw JSON value for an attribute of a declared kind.
    ///
    /// Timestamps are parsed as RFC 3339; text that does not parse is kept
    /// as text. Payload validation is the producer's concern.
    #[must_use]
    pub fn from_json_as(kind: AttributeKind, json: &serde_json::Value) -> Self {
        match (kind, json) {
            (AttributeKind::Timestamp, serde_json::Value::String(s)) => {
                OffsetDateTime::parse(s, &Rfc3339)
                    .map_or_else(|_| Self::Text(s.clone()), Self::Timestamp)
            }
            (AttributeKind::Number, serde_json::Value::Number(n)) if n.is_f64() => {
                Self::Float(n.as_f64().unwrap_or(f64::NAN))
            }
            _ => Self::from_json(json),
        }
    }

    //
    // Access
    //

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Walk a dotted path through nested maps.
    #[must_use]
    pub fn get_path<'a, I>(&self, segments: I) -> Option<&Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self;
        for segment in segments {
            match current {
                Self::Map(map) => current = map.get(segment)?,
                _ => return None,
            }
        }

        Some(current)
    }

    //
    // Comparison
    //

    /// Compare two values within one comparison family.
    ///
    /// Integers and floats widen to a common numeric family; a text value
    /// compared against a timestamp is parsed as RFC 3339. Values from
    /// different families are unordered (`None`).
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Text(b)) => OffsetDateTime::parse(b, &Rfc3339)
                .ok()
                .map(|b| a.cmp(&b)),
            (Self::Text(a), Self::Timestamp(b)) => OffsetDateTime::parse(a, &Rfc3339)
                .ok()
                .map(|a| a.cmp(b)),
            (Self::List(a), Self::List(b)) if a.len() == b.len() => {
                for (x, y) in a.iter().zip(b) {
                    match x.compare(y)? {
                        Ordering::Equal => {}
                        ord => return Some(ord),
                    }
                }
                Some(Ordering::Equal)
            }
            _ => None,
        }
    }

    /// Substring test for text, membership test for lists.
    #[must_use]
    pub fn contains(&self, needle: &Self) -> Option<bool> {
        match (self, needle) {
            (Self::Text(haystack), Self::Text(needle)) => Some(haystack.contains(needle.as_str())),
            (Self::List(items), needle) => Some(
                items
                    .iter()
                    .any(|item| item.compare(needle) == Some(Ordering::Equal)),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(ts) => match ts.format(&Rfc3339) {
                Ok(s) => f.write_str(&s),
                Err(_) => write!(f, "{ts}"),
            },
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}
