//! Serialization schemes: ordered `pattern → target type` rules.
//!
//! Order matters, the first matching entry wins. Schemes are layered with
//! [`Scheme::layered`]: earlier layers take precedence on identical pattern
//! text, and the merged map keeps the position an entry was first seen at.
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every target type name some handler understands.
pub const KNOWN_TARGETS: &[&str] = &["list", "tuple", "atom", "string", "number", "is", "keytuple"];

static DEFAULTS: Lazy<Scheme> = Lazy::new(|| {
    Scheme::from([
        ("::string", "string"),
        ("::array", "list"),
        ("::number", "number"),
        ("::numeric", "number"),
        ("::array#::number@keyvalue", "is"),
        ("::array#::string@keyvalue", "keytuple"),
        ("::array#::number@key", "is"),
        ("::array#::string@key", "atom"),
    ])
});

// --------------------------------- Types ---------------------------------- //

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scheme {
    entries: IndexMap<String, String>,
}

#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("failed to read scheme file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("at JSON path {at} → {message}")]
    Json { at: String, message: String },

    #[error("malformed rule `{0}` (expected PATTERN=TYPE)")]
    MalformedRule(String),

    #[error("unknown target type `{target}` in scheme `{pattern} => {target}`")]
    UnknownTarget { pattern: String, target: String },

    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

// ----------------------------- Implementation ----------------------------- //

impl Scheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in rules every serializer falls back to.
    pub fn defaults() -> &'static Scheme {
        &DEFAULTS
    }

    /// Builder-style insert.
    pub fn with(mut self, pattern: impl Into<String>, target: impl Into<String>) -> Self {
        self.insert(pattern, target);
        self
    }

    /// Re-inserting a pattern replaces its target but keeps its position.
    pub fn insert(&mut self, pattern: impl Into<String>, target: impl Into<String>) -> Option<String> {
        self.entries.insert(pattern.into(), target.into())
    }

    pub fn get(&self, pattern: &str) -> Option<&str> {
        self.entries.get(pattern).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, t)| (p.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge layers, highest precedence first.
    pub fn layered<'a, I>(layers: I) -> Scheme
    where
        I: IntoIterator<Item = &'a Scheme>,
    {
        let mut out = Scheme::new();
        for layer in layers {
            for (pattern, target) in &layer.entries {
                if !out.entries.contains_key(pattern) {
                    out.entries.insert(pattern.clone(), target.clone());
                }
            }
        }
        out
    }

    /// Parse a JSON object `{"pattern": "type", ...}`; member order is kept.
    pub fn from_json_str(src: &str) -> Result<Scheme, SchemeError> {
        let mut de = serde_json::Deserializer::from_str(src);
        let scheme = serde_path_to_error::deserialize::<_, Scheme>(&mut de).map_err(|err| {
            SchemeError::Json {
                at: err.path().to_string(),
                message: err.into_inner().to_string(),
            }
        })?;
        // nothing but whitespace may follow the object
        de.end().map_err(|err| SchemeError::Json {
            at: "<end>".to_string(),
            message: err.to_string(),
        })?;
        Ok(scheme)
    }

    pub fn from_file(path: &Path) -> Result<Scheme, SchemeError> {
        let src = std::fs::read_to_string(path).map_err(|source| SchemeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Scheme::from_json_str(&src)
    }

    /// Split an inline `PATTERN=TYPE` rule. Splits on the last `=`, since
    /// key literals inside a pattern may contain one.
    pub fn parse_rule(rule: &str) -> Result<(String, String), SchemeError> {
        match rule.rsplit_once('=') {
            Some((pattern, target)) if !pattern.is_empty() && !target.trim().is_empty() => {
                Ok((pattern.to_string(), target.trim().to_string()))
            }
            _ => Err(SchemeError::MalformedRule(rule.to_string())),
        }
    }

    /// Eagerly check what `serialize` would otherwise only discover on the
    /// paths that happen to reach an entry: every pattern compiles and every
    /// target is known to at least one handler.
    pub fn validate(&self) -> Result<(), SchemeError> {
        for (pattern, target) in self.iter() {
            if !KNOWN_TARGETS.contains(&target) {
                return Err(SchemeError::UnknownTarget {
                    pattern: pattern.to_string(),
                    target: target.to_string(),
                });
            }
            crate::matcher::compile(pattern).map_err(|source| SchemeError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

impl<P: Into<String>, T: Into<String>> FromIterator<(P, T)> for Scheme {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut out = Scheme::new();
        for (p, t) in iter {
            out.insert(p, t);
        }
        out
    }
}

impl<P: Into<String>, T: Into<String>, const N: usize> From<[(P, T); N]> for Scheme {
    fn from(entries: [(P, T); N]) -> Self {
        entries.into_iter().collect()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layering_keeps_first_seen_position_and_precedence() {
        let call = Scheme::from([("::array#2/", "number"), ("::array", "list")]);
        let base = Scheme::from([("::array", "tuple"), ("::array#1/", "atom")]);
        let merged = Scheme::layered([&call, &base, Scheme::defaults()]);

        let patterns: Vec<&str> = merged.iter().map(|(p, _)| p).take(3).collect();
        assert_eq!(patterns, ["::array#2/", "::array", "::array#1/"]);
        assert_eq!(merged.get("::array"), Some("list"));
        assert_eq!(merged.get("::numeric"), Some("number"));
        assert_eq!(merged.len(), 2 + 1 + Scheme::defaults().len() - 1);
    }

    #[test]
    fn json_loading_preserves_order() {
        let s = Scheme::from_json_str(r#"{"::string": "atom", "::array": "tuple", "@key": "string"}"#).unwrap();
        let patterns: Vec<&str> = s.iter().map(|(p, _)| p).collect();
        assert_eq!(patterns, ["::string", "::array", "@key"]);
    }

    #[test]
    fn json_errors_carry_the_path() {
        let err = Scheme::from_json_str(r#"{"::string": 3}"#).unwrap_err();
        match err {
            SchemeError::Json { at, .. } => assert_eq!(at, "::string"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trailing_content_is_rejected() {
        let err = Scheme::from_json_str(r#"{"::array": "tuple"} garbage"#).unwrap_err();
        match err {
            SchemeError::Json { at, .. } => assert_eq!(at, "<end>"),
            other => panic!("unexpected error: {other}"),
        }
        let concatenated = r#"{"::array": "tuple"}{"::string": "atom"}"#;
        assert!(Scheme::from_json_str(concatenated).is_err());
        assert!(Scheme::from_json_str("{\"::array\": \"tuple\"}\n  \n").is_ok());
    }

    #[test]
    fn inline_rules() {
        assert_eq!(
            Scheme::parse_rule("::array#\"a=b\"@key=string").unwrap(),
            ("::array#\"a=b\"@key".to_string(), "string".to_string())
        );
        assert!(Scheme::parse_rule("::array").is_err());
        assert!(Scheme::parse_rule("=tuple").is_err());
        assert!(Scheme::parse_rule("::array=").is_err());
    }

    #[test]
    fn validation() {
        assert!(Scheme::defaults().validate().is_ok());
        let bad = Scheme::new().with("::numeric", "bla?");
        assert!(matches!(bad.validate(), Err(SchemeError::UnknownTarget { .. })));
    }
}
