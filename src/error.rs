use thiserror::Error;

/// Fatal serialization failures.
///
/// An unsupported (opaque) value is *not* an error: `serialize` returns
/// `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// No scheme entry matched and there is no default for this category.
    #[error("can not determine target type for current element in path `{path}`")]
    UnresolvedType { path: String },

    /// A scheme entry names a target type the matched category does not have.
    /// `pattern` is shown normalized, with its implicit leading `/`.
    #[error("undefined type `{target}` in scheme `{pattern} => {target}` (at `{path}`)")]
    UnknownTargetType {
        pattern: String,
        target: String,
        path: String,
    },

    #[error("invalid scheme pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
