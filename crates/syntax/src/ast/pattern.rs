//! # Patterns

use super::{Commented, Comments, Located, Ref};
use crate::ast::expression::Literal;
use thin_vec::ThinVec;

/// A pattern, as written in case branches, lambda arguments, and the left
/// hand side of definitions
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
  /// The wildcard pattern `_`
  Anything,
  /// The unit pattern `()`, keeping any comments written inside it
  UnitPattern(Comments),
  /// A literal pattern, e.g. `1`, `"hello"`
  Literal(Literal),
  /// A variable binding, e.g. `x`
  VarPattern(String),
  /// A parenthesised operator, only meaningful as a definition head,
  /// e.g. the `(+)` in `(+) a b = add a b`
  OpPattern(String),
  /// A constructor applied to argument patterns, e.g. `Just x`
  Data(Ref, ThinVec<(Comments, Located<Pattern>)>),
  /// A tuple of patterns, e.g. `(x, y)`
  Tuple(ThinVec<Commented<Located<Pattern>>>),
  /// A list of patterns, e.g. `[x, y]`, keeping any comments written inside
  /// an empty one
  List(ThinVec<Commented<Located<Pattern>>>, Comments),
  /// A record destructuring, e.g. `{ x, y }`, keeping any comments written
  /// inside an empty one
  Record(ThinVec<Commented<Located<String>>>, Comments),
  /// An aliased pattern, e.g. `(x, y) as point`
  Alias(Alias),
  /// A flat chain of `::` cons patterns, e.g. `x :: rest`
  Cons(Cons),
  /// A parenthesised pattern, e.g. `(Just x)`
  Parens(Box<Commented<Located<Pattern>>>),
}

/// An aliased pattern, e.g. `(x, y) as point`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
  /// The pattern being aliased
  pub pattern: Box<Located<Pattern>>,
  /// Comments before the `as` keyword
  pub before_as: Comments,
  /// Comments after the `as` keyword
  pub after_as: Comments,
  /// The name the whole pattern is bound to
  pub name: Located<String>,
}

/// A flat chain of `::` cons patterns, e.g. `x :: y :: rest`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Cons {
  /// The first element pattern
  pub head: Box<Located<Pattern>>,
  /// The following patterns, each with the comments around its `::`
  pub rest: ThinVec<(Comments, Comments, Located<Pattern>)>,
}
