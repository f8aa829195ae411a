//! # AST
//!
//! The definition of the Abstract Syntax Tree (AST)
//!
//! Every node is located, and comments are attached directly to the syntactic
//! position they were written at, so a formatter walking the tree can
//! reproduce the author's layout. Nodes are built exactly once during the
//! parse and owned by their parent, there is no sharing between nodes.

use crate::span::Span;
use std::fmt;
use thin_vec::ThinVec;

pub mod expression;
pub mod pattern;
mod prettyprint;
pub mod types;

pub use expression::Expression;
pub use pattern::Pattern;
pub use types::Type;

/// A source span wrapping a node payload
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
  /// The location of the node
  pub span: Span,
  /// The node itself
  pub value: T,
}
impl<T> Located<T> {
  /// Attach a location to a value
  pub fn new(span: Span, value: T) -> Self {
    Self { span, value }
  }
}

/// A single comment from the source
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
  /// Was this a `{- -}` comment rather than a `--` comment?
  pub is_block: bool,
  /// The text between the comment delimiters, exactly as written
  pub text: String,
  /// The location of the comment, including its delimiters
  pub span: Span,
}

/// A list of comments, in source order
pub type Comments = ThinVec<Comment>;

/// A value with the comments written immediately before and after it
///
/// Used for any syntactic position which may carry trivia, e.g. around `=`,
/// around `->`, or the items of a collection. The comment lists preserve
/// source order and are never deduplicated.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Commented<T> {
  /// Comments before the value
  pub before: Comments,
  /// The value itself
  pub value: T,
  /// Comments after the value
  pub after: Comments,
}
impl<T> Commented<T> {
  /// Attach surrounding comments to a value
  pub fn new(before: Comments, value: T, after: Comments) -> Self {
    Self {
      before,
      value,
      after,
    }
  }
}

/// Whether a region of source was written on one line or split across lines
///
/// Derived purely from whether a newline appeared inside the region as it was
/// parsed, never inferred afterwards.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiline {
  /// The whole region was written on a single line
  JoinAll,
  /// The region spanned more than one line
  SplitAll,
}
impl Multiline {
  pub(crate) fn from_split(is_split: bool) -> Self {
    if is_split { Self::SplitAll } else { Self::JoinAll }
  }
}
impl fmt::Display for Multiline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::JoinAll => write!(f, "JoinAll"),
      Self::SplitAll => write!(f, "SplitAll"),
    }
  }
}

/// The layout of a function application, recording where the first line break
/// fell relative to the function and its arguments
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMultiline {
  /// The application splits from the function onwards, every argument gets
  /// its own line
  FASplitFirst,
  /// The first argument stays joined with the function; the tag records
  /// whether the remaining arguments were split
  FAJoinFirst(Multiline),
}
impl fmt::Display for AppMultiline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::FASplitFirst => write!(f, "SplitFirst"),
      Self::FAJoinFirst(rest) => write!(f, "JoinFirst {rest}"),
    }
  }
}

/// A reference to a named thing
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref {
  /// A reference to a value, possibly qualified, e.g. `x`, `List.map`
  VarRef(ThinVec<String>, String),
  /// A reference to a constructor, possibly qualified, e.g. `Just`,
  /// `Maybe.Just`
  TagRef(ThinVec<String>, String),
  /// A reference to an operator, e.g. the `(+)` form
  OpRef(String),
}
impl fmt::Display for Ref {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::VarRef(qualifiers, name) | Self::TagRef(qualifiers, name) => {
        for qualifier in qualifiers {
          write!(f, "{qualifier}.")?;
        }
        write!(f, "{name}")
      }
      Self::OpRef(symbol) => write!(f, "({symbol})"),
    }
  }
}
