//! Scheme matching over multi-descriptor paths.
//!
//! A pattern such as `/*/::array` or `::array#"lala"@key` is split into parts,
//! each starting at one of the delimiters `/`, `#`, `@`. Parts are compared
//! with path levels from the end backwards:
//!
//! - **match**: some descriptor of the level satisfies the part; both advance.
//! - **skip**: the level carries the empty descriptor; only the level advances.
//! - **nomatch**: neither; this branch dies.
//!
//! Both match and skip are explored (match first) on an explicit stack, and
//! each `(part, level)` state is visited once, so a pattern costs at most
//! `parts × levels` steps and no native recursion.
//!
//! Unanchored patterns succeed as soon as all their parts are consumed, which
//! is the same as trying every suffix of the path. Anchored patterns (leading
//! `/`) must also account for every remaining level, and only skippable levels
//! may be left over.
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SerializeError;
use crate::path::{Level, Path};
use crate::scheme::Scheme;

const DELIMITERS: [char; 3] = ['/', '#', '@'];

/// What `*` may stand for inside one part.
const WILDCARD: &str = "[^/#@]*";

/// Compiled patterns by exact pattern text. Append-only; entries are
/// immutable, so losing an insert race just drops an equal copy.
static CACHE: Lazy<RwLock<HashMap<String, Arc<Pattern>>>> = Lazy::new(Default::default);

// --------------------------------- Types ---------------------------------- //

#[derive(Debug)]
pub struct Pattern {
    text: String,
    anchored: bool,
    parts: Vec<Regex>,
}

/// The scheme entry that decided a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule<'s> {
    pub pattern: &'s str,
    pub target: &'s str,
}

/// A scheme with every pattern compiled, ready for repeated lookups.
pub struct Matcher<'s> {
    rules: Vec<(Arc<Pattern>, Rule<'s>)>,
}

// ----------------------------- Implementation ----------------------------- //

impl Pattern {
    fn compile(text: &str) -> Result<Self, regex::Error> {
        let parts = split_parts(text)
            .iter()
            .map(|part| part_regex(part))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            text: text.to_string(),
            anchored: text.starts_with('/'),
            parts,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn matches_path(&self, path: &Path) -> bool {
        self.matches(&path.levels())
    }

    /// `levels` runs from the root to the current value.
    pub fn matches(&self, levels: &[&Level]) -> bool {
        let n = self.parts.len();
        let m = levels.len();
        if n == 0 {
            return false;
        }

        // (parts left, levels left)
        let mut seen = HashSet::new();
        let mut stack = vec![(n, m)];

        while let Some((i, j)) = stack.pop() {
            if !seen.insert((i, j)) {
                continue;
            }

            if i == 0 {
                if !self.anchored || levels[..j].iter().all(|l| l.is_skippable()) {
                    return true;
                }
                continue;
            }
            if j == 0 {
                continue;
            }

            let level = levels[j - 1];
            if level.is_skippable() {
                stack.push((i, j - 1));
            }
            if self.part_matches(i - 1, level) {
                stack.push((i - 1, j - 1));
            }
        }
        false
    }

    fn part_matches(&self, part: usize, level: &Level) -> bool {
        let re = &self.parts[part];
        level.descriptors().iter().any(|d| re.is_match(d))
    }
}

impl<'s> Matcher<'s> {
    pub fn new(scheme: &'s Scheme) -> Result<Self, SerializeError> {
        let rules = scheme
            .iter()
            .map(|(pattern, target)| {
                let compiled = compile(pattern).map_err(|source| SerializeError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })?;
                Ok((compiled, Rule { pattern, target }))
            })
            .collect::<Result<Vec<_>, SerializeError>>()?;
        Ok(Self { rules })
    }

    /// First rule, in scheme order, whose pattern matches `path`.
    pub fn find(&self, path: &Path) -> Option<Rule<'s>> {
        let levels = path.levels();
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(&levels))
            .map(|(_, rule)| *rule)
    }
}

/// One-shot lookup; prefer [`Matcher`] when resolving many paths.
pub fn match_path<'s>(path: &Path, scheme: &'s Scheme) -> Result<Option<Rule<'s>>, SerializeError> {
    Ok(Matcher::new(scheme)?.find(path))
}

/// Compile `text`, going through the process-wide cache.
pub fn compile(text: &str) -> Result<Arc<Pattern>, regex::Error> {
    {
        let cache = CACHE.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(text) {
            return Ok(hit.clone());
        }
    }

    let compiled = Arc::new(Pattern::compile(text)?);
    trace!("compiled scheme pattern `{text}` into {} part(s)", compiled.len());

    let mut cache = CACHE.write().unwrap_or_else(PoisonError::into_inner);
    Ok(cache.entry(text.to_string()).or_insert(compiled).clone())
}

/// The pattern as the matcher reads it: `::array#1/` → `/::array#1/`.
pub fn normalize(text: &str) -> String {
    split_parts(text).concat()
}

// ------------------------------- Utilities -------------------------------- //

/// `::array#1/` → [`/::array`, `#1`, `/`]. Text before the first delimiter
/// reads as a value part.
fn split_parts(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut cur = String::new();
    for c in text.chars() {
        if DELIMITERS.contains(&c) && !cur.is_empty() {
            parts.push(std::mem::take(&mut cur));
        }
        cur.push(c);
    }
    if !cur.is_empty() {
        parts.push(cur);
    }
    if let Some(first) = parts.first_mut() {
        if !first.starts_with(&DELIMITERS[..]) {
            first.insert(0, '/');
        }
    }
    parts
}

fn part_regex(part: &str) -> Result<Regex, regex::Error> {
    let body = part
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(WILDCARD);
    Regex::new(&format!("^{body}$"))
}

// ------------------------------- Tests ------------------------------------ //
