use super::{quote_atom, Handler, Rendered, Subject};
use crate::engine::Context;
use crate::error::SerializeError;
use crate::path::Path;

/// `nil`, always as an atom.
pub(crate) struct Null;

impl Handler for Null {
    fn serialize<'v>(
        &self,
        subject: &Subject<'v>,
        _path: &Path,
        _cx: &mut Context<'_>,
    ) -> Result<Option<Rendered<'v>>, SerializeError> {
        match subject {
            Subject::Nil => Ok(Some(Rendered::Text(quote_atom("nil")))),
            _ => Ok(None),
        }
    }
}
