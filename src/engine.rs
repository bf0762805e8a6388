//! The encoding engine.
//!
//! Encoding runs as a work queue rather than a recursive descent. The queue
//! holds finished text and `(value, path)` fragments still to be expanded.
//! One round walks the queue left to right: text is coalesced, and each
//! pending fragment goes through the handler chain exactly once, coming back
//! as text or as new pending children for the next round. Nesting depth turns
//! into a number of rounds, never into native stack frames.
use log::{debug, trace};

use crate::error::SerializeError;
use crate::handlers::{self, Fragment, Rendered, Subject, Target};
use crate::matcher::{self, Matcher};
use crate::path::Path;
use crate::scheme::Scheme;
use crate::value::Value;

// --------------------------------- Types ---------------------------------- //

/// Serializer with an instance-level base scheme.
///
/// The scheme in effect for one call is `call ∪ base ∪ defaults`, earlier
/// layers winning on identical pattern text.
#[derive(Clone, Debug)]
pub struct Serializer {
    base: Scheme,
    defaults: bool,
}

/// One scheme decision taken while encoding.
#[derive(Clone, Debug)]
pub struct Decision {
    pub path: Path,
    pub pattern: String,
    pub target: String,
}

#[derive(Clone, Debug)]
pub struct Explanation {
    pub output: String,
    pub decisions: Vec<Decision>,
}

/// Per-call state shared by the handlers.
pub(crate) struct Context<'s> {
    matcher: Matcher<'s>,
    decisions: Option<Vec<Decision>>,
}

// ----------------------------- Implementation ----------------------------- //

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer {
    pub fn new() -> Self {
        Self::with_scheme(Scheme::new())
    }

    pub fn with_scheme(base: Scheme) -> Self {
        Self { base, defaults: true }
    }

    /// No built-in rules: anything the schemes do not cover fails with
    /// [`SerializeError::UnresolvedType`].
    pub fn without_defaults(base: Scheme) -> Self {
        Self { base, defaults: false }
    }

    pub fn base(&self) -> &Scheme {
        &self.base
    }

    pub fn effective_scheme(&self, scheme: &Scheme) -> Scheme {
        if self.defaults {
            Scheme::layered([scheme, &self.base, Scheme::defaults()])
        } else {
            Scheme::layered([scheme, &self.base])
        }
    }

    /// Encode `value` as Erlang term text.
    ///
    /// Returns `Ok(None)` when the value (or anything nested in it) is opaque;
    /// no partial output is produced in that case.
    pub fn serialize(&self, value: &Value, scheme: &Scheme) -> Result<Option<String>, SerializeError> {
        let effective = self.effective_scheme(scheme);
        let mut cx = Context::new(&effective, false)?;
        encode(value, &mut cx)
    }

    /// Like [`serialize`](Self::serialize), also returning every scheme
    /// decision in the order it was taken.
    pub fn explain(&self, value: &Value, scheme: &Scheme) -> Result<Option<Explanation>, SerializeError> {
        let effective = self.effective_scheme(scheme);
        let mut cx = Context::new(&effective, true)?;
        let Some(output) = encode(value, &mut cx)? else {
            return Ok(None);
        };
        Ok(Some(Explanation {
            output,
            decisions: cx.decisions.unwrap_or_default(),
        }))
    }
}

impl<'s> Context<'s> {
    fn new(scheme: &'s Scheme, record: bool) -> Result<Self, SerializeError> {
        Ok(Self {
            matcher: Matcher::new(scheme)?,
            decisions: record.then(Vec::new),
        })
    }

    /// Target type the scheme assigns to `path`, parsed for category `T`.
    pub(crate) fn resolve<T: Target>(&mut self, path: &Path) -> Result<T, SerializeError> {
        let Some(rule) = self.matcher.find(path) else {
            return Err(SerializeError::UnresolvedType { path: path.to_string() });
        };
        let Some(target) = T::parse(rule.target) else {
            return Err(SerializeError::UnknownTargetType {
                pattern: matcher::normalize(rule.pattern),
                target: rule.target.to_string(),
                path: path.to_string(),
            });
        };
        trace!("`{path}` => {} ({})", rule.target, rule.pattern);
        if let Some(decisions) = &mut self.decisions {
            decisions.push(Decision {
                path: path.clone(),
                pattern: rule.pattern.to_string(),
                target: rule.target.to_string(),
            });
        }
        Ok(target)
    }
}

fn encode(root: &Value, cx: &mut Context<'_>) -> Result<Option<String>, SerializeError> {
    let mut queue = vec![Fragment::Pending(Subject::from(root), Path::new())];
    let mut rounds = 0usize;

    loop {
        rounds += 1;
        let mut next = Vec::with_capacity(queue.len());
        let mut buffer = String::new();
        let mut pending = 0usize;

        for fragment in queue {
            let (subject, path) = match fragment {
                Fragment::Text(text) => {
                    buffer.push_str(&text);
                    continue;
                }
                Fragment::Pending(subject, path) => (subject, path),
            };

            let Some(rendered) = handlers::dispatch(&subject, &path, cx)? else {
                match &subject {
                    Subject::Opaque(label) => debug!("unsupported value `{label}` at `{path}`"),
                    other => debug!("no handler claims {} value at `{path}`", other.kind()),
                }
                return Ok(None);
            };

            match rendered {
                Rendered::Text(text) => buffer.push_str(&text),
                Rendered::Parts(parts) => {
                    for part in parts {
                        match part {
                            Fragment::Text(text) => buffer.push_str(&text),
                            child @ Fragment::Pending(..) => {
                                // never leave an empty text fragment behind
                                if !buffer.is_empty() {
                                    next.push(Fragment::Text(std::mem::take(&mut buffer)));
                                }
                                next.push(child);
                                pending += 1;
                            }
                        }
                    }
                }
            }
        }

        trace!("round {rounds}: {pending} pending fragment(s)");
        if pending == 0 {
            debug!("serialized in {rounds} round(s), {} byte(s)", buffer.len());
            return Ok(Some(buffer));
        }
        if !buffer.is_empty() {
            next.push(Fragment::Text(buffer));
        }
        queue = next;
    }
}

// ------------------------------- Tests ------------------------------------ //
