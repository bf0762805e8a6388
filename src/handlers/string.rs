use super::{Handler, Rendered, Subject, Target};
use crate::engine::Context;
use crate::error::SerializeError;
use crate::path::{Level, Path};

pub(crate) struct Str;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StringTarget {
    Atom,
    String,
}

impl Target for StringTarget {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "atom" => Some(Self::Atom),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

impl Handler for Str {
    fn serialize<'v>(
        &self,
        subject: &Subject<'v>,
        path: &Path,
        cx: &mut Context<'_>,
    ) -> Result<Option<Rendered<'v>>, SerializeError> {
        let Subject::Str(text) = subject else {
            return Ok(None);
        };
        let path = path.push(Level::value("string"));
        let rendered = match cx.resolve::<StringTarget>(&path)? {
            StringTarget::Atom => quote_atom(text),
            StringTarget::String => quote_string(text),
        };
        Ok(Some(Rendered::Text(rendered)))
    }
}

/// `ok` stays bare; anything else (`'Key'`, `'it\'s'`...) is single-quoted.
pub fn quote_atom(text: &str) -> String {
    if is_bare_atom(text) {
        return text.to_string();
    }
    quote(text, '\'')
}

pub fn quote_string(text: &str) -> String {
    quote(text, '"')
}

/// `^[a-z][a-zA-Z0-9_]*$`
fn is_bare_atom(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some('a'..='z'))
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Wrap in `delim`, backslash-escaping only `delim` and `\`.
fn quote(text: &str, delim: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(delim);
    for c in text.chars() {
        if c == delim || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(delim);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atoms() {
        assert_eq!(quote_atom("key"), "key");
        assert_eq!(quote_atom("snake_Case9"), "snake_Case9");
        assert_eq!(quote_atom("Key"), "'Key'");
        assert_eq!(quote_atom("_x"), "'_x'");
        assert_eq!(quote_atom("9lives"), "'9lives'");
        assert_eq!(quote_atom(""), "''");
        assert_eq!(quote_atom("with space"), "'with space'");
        assert_eq!(quote_atom("'"), r"'\''");
        assert_eq!(quote_atom(r"a\b"), r"'a\\b'");
        assert_eq!(quote_atom("é"), "'é'");
    }

    #[test]
    fn strings_escape_only_quote_and_backslash() {
        assert_eq!(quote_string("string"), "\"string\"");
        assert_eq!(quote_string("\""), r#""\"""#);
        assert_eq!(quote_string("\\"), r#""\\""#);
        assert_eq!(quote_string("it's"), "\"it's\"");
        assert_eq!(quote_string("a\nb"), "\"a\nb\"");
    }
}
