use super::{quote_string, Handler, Rendered, Subject, Target};
use crate::engine::Context;
use crate::error::SerializeError;
use crate::path::{Level, Path};
use crate::value::is_numeric;

/// Native numbers (`::number`) and numeric-looking strings (`::numeric`).
///
/// A numeral keeps its text apart from surrounding whitespace; forms such as
/// `1.` or `1e+100` pass through unchanged.
pub(crate) struct Number;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NumberTarget {
    Number,
    String,
}

impl Target for NumberTarget {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

impl Handler for Number {
    fn serialize<'v>(
        &self,
        subject: &Subject<'v>,
        path: &Path,
        cx: &mut Context<'_>,
    ) -> Result<Option<Rendered<'v>>, SerializeError> {
        let (text, tag) = match subject {
            Subject::Number(text) => (text, "number"),
            Subject::Str(text) if is_numeric(text) => (text, "numeric"),
            _ => return Ok(None),
        };
        let path = path.push(Level::value(tag));
        let rendered = match cx.resolve::<NumberTarget>(&path)? {
            NumberTarget::Number => text.trim().to_string(),
            NumberTarget::String => quote_string(text),
        };
        Ok(Some(Rendered::Text(rendered)))
    }
}
