use super::{item, Fragment, Handler, Rendered, Subject, Target};
use crate::engine::Context;
use crate::error::SerializeError;
use crate::path::{Level, Path};

/// Ordered collections, rendered as `[...]` or `{...}`.
pub(crate) struct Collection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CollectionTarget {
    List,
    Tuple,
}

impl Target for CollectionTarget {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "list" => Some(Self::List),
            "tuple" => Some(Self::Tuple),
            _ => None,
        }
    }
}

impl CollectionTarget {
    fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            Self::List => ("[", "]"),
            Self::Tuple => ("{", "}"),
        }
    }
}

impl Handler for Collection {
    fn serialize<'v>(
        &self,
        subject: &Subject<'v>,
        path: &Path,
        cx: &mut Context<'_>,
    ) -> Result<Option<Rendered<'v>>, SerializeError> {
        let Subject::Collection(entries) = subject else {
            return Ok(None);
        };
        let entries = *entries;
        let path = path.push(Level::value("array"));
        let (open, close) = cx.resolve::<CollectionTarget>(&path)?.delimiters();

        let mut parts = Vec::with_capacity(entries.len() * 2 + 2);
        parts.push(Fragment::Text(open.to_string()));
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 {
                parts.push(Fragment::Text(", ".to_string()));
            }
            parts.extend(item::serialize(key, value, &path, cx)?);
        }
        parts.push(Fragment::Text(close.to_string()));
        Ok(Some(Rendered::Parts(parts)))
    }
}
