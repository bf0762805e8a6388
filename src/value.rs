//! Host value model fed to the serializer.
//!
//! Collections are ordered `(Key, Value)` sequences; a "list" is just a
//! collection keyed by position, an "assoc" one keyed by name. Anything the
//! handlers cannot classify is carried as `Opaque` so the engine can report
//! it as unsupported instead of guessing.
use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

// --------------------------------- Types ---------------------------------- //

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    /// Numeral text, emitted as written (minus surrounding whitespace).
    ///
    /// No rewriting happens: `1.` or serde_json's `1e+100` are printed as-is
    /// even though Erlang reads neither as a float literal.
    Number(String),
    Str(String),
    Collection(Vec<(Key, Value)>),
    /// A host value with no Erlang counterpart; the label names it.
    Opaque(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Index(u64),
    Name(String),
}

impl Value {
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Collection(
            items.into_iter()
                .enumerate()
                .map(|(i, v)| (Key::Index(i as u64), v.into()))
                .collect()
        )
    }

    pub fn assoc<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Collection(
            entries.into_iter()
                .map(|(k, v)| (Key::Name(k.into()), v.into()))
                .collect()
        )
    }

    pub fn number(text: impl Into<String>) -> Self {
        Value::Number(text.into())
    }

    pub fn opaque(label: impl Into<String>) -> Self {
        Value::Opaque(label.into())
    }

    /// Convert a JSON document. Object member order is kept as-is.
    pub fn from_json(json: &serde_json::Value) -> Self {
        use serde_json::Value as J;
        match json {
            J::Null => Value::Nil,
            J::Bool(b) => Value::Bool(*b),
            J::Number(n) => Value::Number(n.to_string()),
            J::String(s) => Value::Str(s.clone()),
            J::Array(xs) => Value::list(xs.iter().map(Value::from_json)),
            J::Object(m) => Value::Collection(
                m.iter()
                    .map(|(k, v)| (Key::Name(k.clone()), Value::from_json(v)))
                    .collect()
            ),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Collection(_) => "collection",
            Value::Opaque(_) => "opaque",
        }
    }
}

impl Key {
    /// The key viewed as a standalone value (`is` rendering).
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Key::Index(i) => Cow::Owned(i.to_string()),
            Key::Name(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(s) => f.write_str(s),
        }
    }
}

// ------------------------------ Conversions ------------------------------- //

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self { Value::Number(n.to_string()) }
        })*
    };
}

from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        if f.is_finite() {
            Value::Number(f.to_string())
        } else {
            Value::Opaque(format!("non-finite float {f}"))
        }
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self { Value::from(f as f64) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Str(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::Str(s) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        match o {
            Some(v) => v.into(),
            None => Value::Nil,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(xs: Vec<T>) -> Self { Value::list(xs) }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self { Value::from_json(&json) }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self { Value::from_json(json) }
}

// ------------------------------- Utilities -------------------------------- //

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?\s*$")
        .expect("numeric literal regex")
});

/// True for strings a loosely-typed host would treat as numbers
/// (`"12"`, `" -1.5e3"`, `".5"`).
pub fn is_numeric(s: &str) -> bool {
    NUMERIC.is_match(s)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings() {
        for s in ["0", "12345", "-1", "+2.5", ".5", "1.", "1e10", " 42 ", "3.14E-2"] {
            assert!(is_numeric(s), "{s:?} should be numeric");
        }
        for s in ["", " ", "abc", "1a", "0x1A", "1e", "--1", ".", "1 2"] {
            assert!(!is_numeric(s), "{s:?} should not be numeric");
        }
    }

    #[test]
    fn json_objects_keep_member_order() {
        let v = Value::from(json!({"zeta": 1, "alpha": [true, null]}));
        let Value::Collection(entries) = v else { panic!("expected collection") };
        assert_eq!(entries[0].0, Key::Name("zeta".into()));
        assert_eq!(entries[1].0, Key::Name("alpha".into()));
        assert_eq!(
            entries[1].1,
            Value::Collection(vec![
                (Key::Index(0), Value::Bool(true)),
                (Key::Index(1), Value::Nil),
            ])
        );
    }

    #[test]
    fn floats_and_options() {
        assert_eq!(Value::from(2.5), Value::Number("2.5".into()));
        assert!(matches!(Value::from(f64::NAN), Value::Opaque(_)));
        assert_eq!(Value::from(None::<i32>), Value::Nil);
        assert_eq!(Value::from(Some("x")), Value::Str("x".into()));
    }

    #[test]
    fn key_text() {
        assert_eq!(Key::Index(7).text(), "7");
        assert_eq!(Key::Name("k".into()).text(), "k");
    }
}
