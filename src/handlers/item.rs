//! Collection entries.
//!
//! An entry first gets a key level (`#3` / `#"name"`, the kind tag, and the
//! skippable empty descriptor), then the scheme decides at `@keyvalue` whether
//! the entry is the bare value (`is`) or a `{key, value}` tuple (`keytuple`).
use super::{key, quote_string, Fragment, Subject, Target};
use crate::engine::Context;
use crate::error::SerializeError;
use crate::path::{KeyKind, Level, Path, Role};
use crate::value::{is_numeric, Key, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ItemTarget {
    Is,
    Keytuple,
}

impl Target for ItemTarget {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "is" => Some(Self::Is),
            "keytuple" => Some(Self::Keytuple),
            _ => None,
        }
    }
}

/// Entries keyed by position.
pub(crate) struct NumericItem;

/// Entries keyed by name.
pub(crate) struct AssocItem;

impl NumericItem {
    fn serialize<'v>(
        &self,
        literal: &str,
        key: &'v Key,
        value: &'v Value,
        path: &Path,
        cx: &mut Context<'_>,
    ) -> Result<Vec<Fragment<'v>>, SerializeError> {
        let level = Level::key(literal, KeyKind::Number);
        entry(level, key, value, path, cx)
    }
}

impl AssocItem {
    fn serialize<'v>(
        &self,
        name: &str,
        key: &'v Key,
        value: &'v Value,
        path: &Path,
        cx: &mut Context<'_>,
    ) -> Result<Vec<Fragment<'v>>, SerializeError> {
        let level = Level::key(&quote_string(name), KeyKind::String);
        entry(level, key, value, path, cx)
    }
}

/// Render one entry of the collection at `path`, picking the item handler by
/// key shape: positions and numeric-looking names (`"1"`, `"2.5"`) are
/// numeric items, every other name is an assoc item.
pub(crate) fn serialize<'v>(
    key: &'v Key,
    value: &'v Value,
    path: &Path,
    cx: &mut Context<'_>,
) -> Result<Vec<Fragment<'v>>, SerializeError> {
    match key {
        Key::Index(i) => NumericItem.serialize(&i.to_string(), key, value, path, cx),
        Key::Name(name) if is_numeric(name) => NumericItem.serialize(name, key, value, path, cx),
        Key::Name(name) => AssocItem.serialize(name, key, value, path, cx),
    }
}

fn entry<'v>(
    key_level: Level,
    key: &'v Key,
    value: &'v Value,
    path: &Path,
    cx: &mut Context<'_>,
) -> Result<Vec<Fragment<'v>>, SerializeError> {
    let key_path = path.push(key_level);
    let decide = key_path.push(Level::role(Role::KeyValue));
    let pending = Fragment::Pending(Subject::from(value), key_path.clone());

    let parts = match cx.resolve::<ItemTarget>(&decide)? {
        ItemTarget::Is => vec![pending],
        ItemTarget::Keytuple => vec![
            Fragment::Text("{".to_string()),
            key::serialize(key, &key_path, cx)?,
            Fragment::Text(", ".to_string()),
            pending,
            Fragment::Text("}".to_string()),
        ],
    };
    Ok(parts)
}
