//! Encode loosely-typed values as Erlang term text.
//!
//! Values become atoms, strings, numbers, lists and tuples. Which one is
//! decided per location by a *scheme*, an ordered set of path patterns:
//!
//! ```
//! use erlterm::{serialize, Scheme, Value};
//!
//! let v = Value::list([1, 2, 3]);
//! assert_eq!(serialize(&v, &Scheme::new()).unwrap().unwrap(), "[1, 2, 3]");
//!
//! let tuples = Scheme::from([("::array", "tuple")]);
//! assert_eq!(serialize(&v, &tuples).unwrap().unwrap(), "{1, 2, 3}");
//!
//! let kv = Value::assoc([("key", "value")]);
//! assert_eq!(serialize(&kv, &Scheme::new()).unwrap().unwrap(), r#"[{key, "value"}]"#);
//! ```
pub mod engine;
pub mod error;
pub mod handlers;
pub mod matcher;
pub mod path;
pub mod scheme;
pub mod value;

pub use engine::{Decision, Explanation, Serializer};
pub use error::SerializeError;
pub use path::{Level, Path};
pub use scheme::{Scheme, SchemeError};
pub use value::{Key, Value};

/// Serialize with the default scheme underneath `scheme`.
///
/// `Ok(None)` means the value holds something opaque that has no term form.
pub fn serialize(value: &Value, scheme: &Scheme) -> Result<Option<String>, SerializeError> {
    Serializer::new().serialize(value, scheme)
}
