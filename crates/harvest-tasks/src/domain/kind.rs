use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a task kind, e.g. `"basic"` or `"animal"`.
///
/// Kinds are open: the factory maps any registered name to a constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskKind(String);

impl TaskKind {
    pub const BASIC: &'static str = "basic";
    pub const ANIMAL: &'static str = "animal";
    pub const COLLECTION: &'static str = "collection";

    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn basic() -> Self {
        Self::new(Self::BASIC)
    }

    pub fn animal() -> Self {
        Self::new(Self::ANIMAL)
    }

    pub fn collection() -> Self {
        Self::new(Self::COLLECTION)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for TaskKind {
    fn default() -> Self {
        Self::basic()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskKind {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for TaskKind {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TaskKind {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
