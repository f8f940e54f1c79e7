//! Attribute types, typed values, and attribute sets.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AttributeError;

/// The value type an attribute is registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Integer,
    Boolean,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        })
    }
}

/// A typed attribute value.
///
/// Values of different types never compare equal, so `Integer(8)` and
/// `String("8")` are distinct. Wire values are coerced to the registered
/// type before matching.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl AttributeValue {
    /// Shorthand for a string value.
    pub fn string(value: &str) -> Self {
        Self::String(value.to_owned())
    }

    pub fn value_type(&self) -> AttributeType {
        match self {
            Self::Boolean(_) => AttributeType::Boolean,
            Self::Integer(_) => AttributeType::Integer,
            Self::String(_) => AttributeType::String,
        }
    }

    /// Convert this value to `target`, parsing strings where needed.
    ///
    /// `name` only feeds the error message.
    ///
    /// # Errors
    /// Returns `AttributeError::Coercion` if the value cannot be represented
    /// as `target` (e.g. `"abc"` as an integer, or an integer as a boolean).
    pub fn coerce(&self, name: &str, target: AttributeType) -> Result<Self, AttributeError> {
        let fail = || AttributeError::Coercion {
            name: name.to_owned(),
            value: self.to_string(),
            expected: target,
        };
        match (self, target) {
            (Self::String(_), AttributeType::String)
            | (Self::Integer(_), AttributeType::Integer)
            | (Self::Boolean(_), AttributeType::Boolean) => Ok(self.clone()),
            (Self::Integer(_) | Self::Boolean(_), AttributeType::String) => {
                Ok(Self::String(self.to_string()))
            }
            (Self::String(s), AttributeType::Integer) => {
                s.trim().parse::<i64>().map(Self::Integer).map_err(|_| fail())
            }
            (Self::String(s), AttributeType::Boolean) => match s.trim() {
                "true" => Ok(Self::Boolean(true)),
                "false" => Ok(Self::Boolean(false)),
                _ => Err(fail()),
            },
            (Self::Integer(_), AttributeType::Boolean) | (Self::Boolean(_), AttributeType::Integer) => {
                Err(fail())
            }
        }
    }

    /// Order two values of the same type.
    ///
    /// Integers and booleans order naturally. Strings order only when both
    /// are dotted numeric versions (`"1.8"`, `"11.0.2"`); anything else is
    /// incomparable and yields `None`.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => compare_versions(a, b),
            _ => None,
        }
    }
}

fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    let left = numeric_segments(a)?;
    let right = numeric_segments(b)?;
    let len = left.len().max(right.len());
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => {}
            other => return Some(other),
        }
    }
    Some(Ordering::Equal)
}

fn numeric_segments(s: &str) -> Option<Vec<u64>> {
    if s.is_empty() {
        return None;
    }
    s.split('.').map(|seg| seg.parse::<u64>().ok()).collect()
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// A mapping from attribute name to typed value.
///
/// Keys are unique and iterate in lexicographic order, which is also the
/// presentation order used by diagnostics. Insertion order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
    values: BTreeMap<String, AttributeValue>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, name: &str, value: impl Into<AttributeValue>) -> Option<AttributeValue> {
        self.values.insert(name.to_owned(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(name, value)` pairs sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Return a copy of `self` with every entry of `other` laid on top.
    pub fn overlay(&self, other: &AttributeSet) -> AttributeSet {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            merged.insert(name, value.clone());
        }
        merged
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str("}")
    }
}

impl<K: AsRef<str>, V: Into<AttributeValue>> FromIterator<(K, V)> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k.as_ref(), v);
        }
        set
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn coerce_string_to_integer() {
        let v = AttributeValue::string("11").coerce("jvm", AttributeType::Integer).unwrap();
        assert_eq!(v, AttributeValue::Integer(11));
    }

    #[test]
    fn coerce_rejects_non_numeric() {
        let err = AttributeValue::string("eleven")
            .coerce("org.gradle.jvm.version", AttributeType::Integer)
            .unwrap_err()
            .to_string();
        assert!(err.contains("org.gradle.jvm.version"), "error was: {err}");
        assert!(err.contains("integer"), "error was: {err}");
    }

    #[test]
    fn coerce_integer_to_string() {
        let v = AttributeValue::Integer(8).coerce("x", AttributeType::String).unwrap();
        assert_eq!(v, AttributeValue::string("8"));
    }

    #[test]
    fn coerce_boolean_strings() {
        assert_eq!(
            AttributeValue::string("true").coerce("b", AttributeType::Boolean).unwrap(),
            AttributeValue::Boolean(true)
        );
        assert!(AttributeValue::string("yes")
            .coerce("b", AttributeType::Boolean)
            .is_err());
        assert!(AttributeValue::Integer(1)
            .coerce("b", AttributeType::Boolean)
            .is_err());
    }

    #[test]
    fn different_types_never_equal() {
        assert_ne!(AttributeValue::Integer(8), AttributeValue::string("8"));
    }

    #[test]
    fn compare_versions_segmentwise() {
        let a = AttributeValue::string("1.8");
        let b = AttributeValue::string("11");
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(
            AttributeValue::string("2.0").compare(&AttributeValue::string("2")),
            Some(Ordering::Equal)
        );
        assert_eq!(
            AttributeValue::string("java-api").compare(&AttributeValue::string("1")),
            None
        );
    }

    #[test]
    fn compare_mixed_types_is_none() {
        assert_eq!(
            AttributeValue::Integer(1).compare(&AttributeValue::Boolean(true)),
            None
        );
    }

    #[test]
    fn set_iterates_sorted_regardless_of_insertion() {
        let set = AttributeSet::new()
            .with("zeta", "z")
            .with("alpha", 1_i64)
            .with("mid", true);
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        assert_eq!(set.to_string(), "{alpha=1, mid=true, zeta=z}");
    }

    #[test]
    fn overlay_replaces_and_extends() {
        let base = AttributeSet::new()
            .with("org.gradle.usage", "java-runtime")
            .with("org.gradle.libraryelements", "jar");
        let top = AttributeSet::new().with("org.gradle.libraryelements", "classes");
        let merged = base.overlay(&top);
        assert_eq!(
            merged.get("org.gradle.libraryelements"),
            Some(&AttributeValue::string("classes"))
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn untagged_deserialize_picks_type() {
        #[derive(Deserialize)]
        struct Holder {
            a: AttributeValue,
            b: AttributeValue,
            c: AttributeValue,
        }
        let h: Holder = toml::from_str("a = 11\nb = \"java-api\"\nc = false").unwrap();
        assert_eq!(h.a, AttributeValue::Integer(11));
        assert_eq!(h.b, AttributeValue::string("java-api"));
        assert_eq!(h.c, AttributeValue::Boolean(false));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn attribute_value() -> impl Strategy<Value = AttributeValue> {
            prop_oneof![
                (-20i64..20).prop_map(AttributeValue::Integer),
                any::<bool>().prop_map(AttributeValue::Boolean),
                "[0-9]{1,2}(\\.[0-9]{1,2}){0,2}".prop_map(AttributeValue::String),
                "[a-z-]{1,6}".prop_map(AttributeValue::String),
            ]
        }

        proptest! {
            #[test]
            fn compare_is_antisymmetric(a in attribute_value(), b in attribute_value()) {
                prop_assert_eq!(a.compare(&b), b.compare(&a).map(Ordering::reverse));
            }

            #[test]
            fn comparable_values_compare_equal_to_themselves(a in attribute_value()) {
                if let Some(ord) = a.compare(&a) {
                    prop_assert_eq!(ord, Ordering::Equal);
                }
            }

            #[test]
            fn values_of_different_types_are_incomparable(
                i in -20i64..20,
                b in any::<bool>(),
            ) {
                let int = AttributeValue::Integer(i);
                let boolean = AttributeValue::Boolean(b);
                let text = AttributeValue::String(i.to_string());
                prop_assert_eq!(int.compare(&boolean), None);
                prop_assert_eq!(int.compare(&text), None);
                prop_assert_ne!(int, text);
            }
        }
    }
}
