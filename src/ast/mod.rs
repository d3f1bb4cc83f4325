//! Abstract Syntax Tree (AST) definitions for Lua source.
//!
//! Every node owns its children exclusively. Declarations carry a [`NodeId`]
//! so that side-channel metadata (doc comments) can refer to them without
//! owning them.

use serde::{Deserialize, Serialize};

mod expressions;
mod program;
mod statements;

pub use expressions::*;
pub use program::*;
pub use statements::*;

/// Span information for source location tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// Identity of a declaration node within one parsed [`Program`].
///
/// Ids are assigned in parse order starting at zero, so two parses of the
/// same text produce the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);
