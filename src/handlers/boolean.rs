use super::{quote_atom, Handler, Rendered, Subject};
use crate::engine::Context;
use crate::error::SerializeError;
use crate::path::Path;

/// `true` / `false` atoms; schemes cannot turn these into strings.
pub(crate) struct Bool;

impl Handler for Bool {
    fn serialize<'v>(
        &self,
        subject: &Subject<'v>,
        _path: &Path,
        _cx: &mut Context<'_>,
    ) -> Result<Option<Rendered<'v>>, SerializeError> {
        match subject {
            Subject::Bool(b) => {
                let text = if *b { "true" } else { "false" };
                Ok(Some(Rendered::Text(quote_atom(text))))
            }
            _ => Ok(None),
        }
    }
}
