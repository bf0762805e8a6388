use super::{quote_atom, quote_string, Fragment, Subject, Target};
use crate::engine::Context;
use crate::error::SerializeError;
use crate::path::{Level, Path, Role};
use crate::value::Key;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum KeyTarget {
    /// Encode the key like any other value found at this path.
    Is,
    Atom,
    String,
}

impl Target for KeyTarget {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "is" => Some(Self::Is),
            "atom" => Some(Self::Atom),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

/// The key half of a `{key, value}` entry. `key_path` ends at the entry's
/// key level; the decision is taken one level down, at `@key`.
pub(crate) fn serialize<'v>(
    key: &'v Key,
    key_path: &Path,
    cx: &mut Context<'_>,
) -> Result<Fragment<'v>, SerializeError> {
    let path = key_path.push(Level::role(Role::Key));
    let fragment = match cx.resolve::<KeyTarget>(&path)? {
        KeyTarget::Is => Fragment::Pending(Subject::from(key), path),
        KeyTarget::Atom => Fragment::Text(quote_atom(&key.text())),
        KeyTarget::String => Fragment::Text(quote_string(&key.text())),
    };
    Ok(fragment)
}
