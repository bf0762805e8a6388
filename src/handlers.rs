//! Type handlers: one per value category.
//!
//! Each handler claims the values it understands (returning `None` for the
//! rest), extends the path with its own level, asks the scheme which target
//! type applies there, and renders accordingly. Children are never rendered
//! in-line: they come back as pending fragments for the engine's next round.
pub mod boolean;
pub mod collection;
pub mod item;
pub mod key;
pub mod null;
pub mod number;
pub mod string;

use std::borrow::Cow;

use crate::engine::Context;
use crate::error::SerializeError;
use crate::path::Path;
use crate::value::{Key, Value};

pub use string::{quote_atom, quote_string};

// --------------------------------- Types ---------------------------------- //

/// Borrowed view of whatever is being encoded: a document value or a
/// collection key standing in for one.
#[derive(Clone, Debug)]
pub(crate) enum Subject<'v> {
    Nil,
    Bool(bool),
    Number(Cow<'v, str>),
    Str(Cow<'v, str>),
    Collection(&'v [(Key, Value)]),
    Opaque(&'v str),
}

#[derive(Debug)]
pub(crate) enum Fragment<'v> {
    Text(String),
    Pending(Subject<'v>, Path),
}

#[derive(Debug)]
pub(crate) enum Rendered<'v> {
    Text(String),
    Parts(Vec<Fragment<'v>>),
}

pub(crate) trait Handler: Sync {
    fn serialize<'v>(
        &self,
        subject: &Subject<'v>,
        path: &Path,
        cx: &mut Context<'_>,
    ) -> Result<Option<Rendered<'v>>, SerializeError>;
}

/// A closed set of target type names for one category.
pub(crate) trait Target: Sized {
    fn parse(name: &str) -> Option<Self>;
}

/// Precedence order; the first handler to claim a value renders it.
const CHAIN: [&dyn Handler; 5] = [
    &null::Null,
    &boolean::Bool,
    &number::Number,
    &string::Str,
    &collection::Collection,
];

// ----------------------------- Implementation ----------------------------- //

impl<'v> From<&'v Value> for Subject<'v> {
    fn from(value: &'v Value) -> Self {
        match value {
            Value::Nil => Subject::Nil,
            Value::Bool(b) => Subject::Bool(*b),
            Value::Number(n) => Subject::Number(Cow::Borrowed(n)),
            Value::Str(s) => Subject::Str(Cow::Borrowed(s)),
            Value::Collection(entries) => Subject::Collection(entries),
            Value::Opaque(label) => Subject::Opaque(label),
        }
    }
}

impl<'v> From<&'v Key> for Subject<'v> {
    fn from(key: &'v Key) -> Self {
        match key {
            Key::Index(_) => Subject::Number(key.text()),
            Key::Name(_) => Subject::Str(key.text()),
        }
    }
}

impl Subject<'_> {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Subject::Nil => "nil",
            Subject::Bool(_) => "bool",
            Subject::Number(_) => "number",
            Subject::Str(_) => "string",
            Subject::Collection(_) => "collection",
            Subject::Opaque(_) => "opaque",
        }
    }
}

/// Run `subject` through the handler chain. `None` means no handler claims it.
pub(crate) fn dispatch<'v>(
    subject: &Subject<'v>,
    path: &Path,
    cx: &mut Context<'_>,
) -> Result<Option<Rendered<'v>>, SerializeError> {
    for handler in CHAIN {
        if let Some(rendered) = handler.serialize(subject, path, cx)? {
            return Ok(Some(rendered));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subjects_borrow_from_values_and_keys() {
        let opaque = Value::opaque("resource");
        assert!(matches!(Subject::from(&opaque), Subject::Opaque("resource")));

        let index = Key::Index(3);
        assert!(matches!(Subject::from(&index), Subject::Number(ref n) if n == "3"));
        let name = Key::Name("k".into());
        assert_eq!(Subject::from(&name).kind(), "string");
    }
}
