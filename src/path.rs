//! Where a value sits inside the document being serialized.
//!
//! A path is a stack of levels, one per nesting step. Each level offers several
//! descriptors that are all valid names for that step at the same time: a list
//! element is `#3`, `#::number` and the empty (skippable) descriptor at once.
//! Scheme patterns pick whichever descriptor they like per level.
//!
//! Paths are persistent: `push` shares the parent chain and never touches the
//! receiver, so every pending fragment can own its path cheaply.
use std::fmt;
use std::sync::Arc;

/// Descriptor marking a level that may be skipped while matching.
pub const SKIP: &str = "";

/// Generic descriptor carried by every value level.
pub const ANY_VALUE: &str = "/";

// ---------------------------------- Level --------------------------------- //

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    descriptors: Vec<String>,
}

/// Which part of a collection entry is being decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Shape of the whole entry (`is` vs `keytuple`).
    KeyValue,
    /// Rendering of the key alone.
    Key,
}

/// Key kind tag used in key-level descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    Number,
    String,
}

impl Level {
    /// Returns `None` for an empty descriptor set.
    pub fn new<I, S>(descriptors: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let descriptors: Vec<String> = descriptors.into_iter().map(Into::into).collect();
        if descriptors.is_empty() {
            return None;
        }
        Some(Self { descriptors })
    }

    /// A value of type `tag`: `/::tag` or just `/`.
    pub fn value(tag: &str) -> Self {
        Self { descriptors: vec![format!("/::{tag}"), ANY_VALUE.to_string()] }
    }

    /// A collection key. `literal` is the key as it should appear after `#`
    /// (the bare numeral, or the double-quoted name).
    pub fn key(literal: &str, kind: KeyKind) -> Self {
        let tag = match kind {
            KeyKind::Number => "#::number",
            KeyKind::String => "#::string",
        };
        Self {
            descriptors: vec![format!("#{literal}"), tag.to_string(), SKIP.to_string()],
        }
    }

    pub fn role(role: Role) -> Self {
        let d = match role {
            Role::KeyValue => "@keyvalue",
            Role::Key => "@key",
        };
        Self { descriptors: vec![d.to_string()] }
    }

    pub fn descriptors(&self) -> &[String] {
        &self.descriptors
    }

    /// The most specific descriptor; used when printing a path.
    pub fn primary(&self) -> &str {
        &self.descriptors[0]
    }

    pub fn is_skippable(&self) -> bool {
        self.descriptors.iter().any(|d| d == SKIP)
    }
}

// ---------------------------------- Path ---------------------------------- //

#[derive(Clone, Default)]
pub struct Path {
    tail: Option<Arc<Frame>>,
    depth: usize,
}

struct Frame {
    level: Level,
    parent: Option<Arc<Frame>>,
}

// Unlink the chain by hand so dropping a very deep path does not recurse.
impl Drop for Frame {
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(frame) = next {
            match Arc::try_unwrap(frame) {
                Ok(mut owned) => next = owned.parent.take(),
                Err(_) => break,
            }
        }
    }
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: Level) -> Path {
        Path {
            tail: Some(Arc::new(Frame { level, parent: self.tail.clone() })),
            depth: self.depth + 1,
        }
    }

    /// The parent path, or `None` when already at the root.
    pub fn pop(&self) -> Option<Path> {
        let frame = self.tail.as_ref()?;
        Some(Path { tail: frame.parent.clone(), depth: self.depth - 1 })
    }

    pub fn len(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    pub fn last(&self) -> Option<&Level> {
        self.tail.as_deref().map(|f| &f.level)
    }

    /// Levels from the root to the current value.
    pub fn levels(&self) -> Vec<&Level> {
        let mut out = Vec::with_capacity(self.depth);
        let mut cur = self.tail.as_deref();
        while let Some(frame) = cur {
            out.push(&frame.level);
            cur = frame.parent.as_deref();
        }
        out.reverse();
        out
    }

    /// Every full path spelling: one descriptor per level, concatenated.
    ///
    /// The product grows as `3^depth` for nested collections; take what you
    /// need from the iterator rather than collecting it.
    pub fn variants(&self) -> Variants<'_> {
        let levels = self.levels();
        let picks = vec![0; levels.len()];
        Variants { levels, picks, done: false }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in self.levels() {
            f.write_str(level.primary())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.levels().iter().map(|l| l.descriptors()))
            .finish()
    }
}

// -------------------------------- Variants -------------------------------- //

/// Odometer over the descriptor choices of each level, last level fastest.
pub struct Variants<'p> {
    levels: Vec<&'p Level>,
    picks: Vec<usize>,
    done: bool,
}

impl Iterator for Variants<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let out: String = self.levels.iter()
            .zip(&self.picks)
            .map(|(level, &i)| level.descriptors()[i].as_str())
            .collect();

        // advance
        self.done = true;
        for i in (0..self.picks.len()).rev() {
            self.picks[i] += 1;
            if self.picks[i] < self.levels[i].descriptors().len() {
                self.done = false;
                break;
            }
            self.picks[i] = 0;
        }
        Some(out)
    }
}

// ------------------------------- Tests ------------------------------------ //
