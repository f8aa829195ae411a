//! # Syntax
//! Parse source code into a trivia-preserving Abstract Syntax Tree
//!
//! A recursive descent parser for an indentation-sensitive functional
//! language. The tree keeps everything a formatter needs to reproduce the
//! author's intent: comments are attached to the exact syntactic position
//! they were written at, and every construct which could be laid out on one
//! line or many records which way it was actually written.
//!
//! Operator expressions are parsed as flat chains in source order, precedence
//! is deliberately left to a later pass with access to fixity declarations.
//!
//! Parsing is all or nothing: the first error wins and no tree is produced,
//! since a formatter must never guess at code it could not fully understand.

pub mod ast;
mod parser;
mod span;
mod tokeniser;

#[cfg(test)]
mod test;

use ast::expression::{Definition, Expr, TypeAnnotation};
use ast::Commented;

/// Parses a source code string as a single expression.
///
/// Comments before and after the expression are kept on the result. The
/// whole input must be consumed.
///
/// # Examples
/// ```
/// use fern_syntax::parse_expression;
/// let expression = parse_expression("5 + 3");
///
/// assert!(expression.is_ok());
/// ```
///
/// # Errors
/// If the source is not a single well-formed expression
pub fn parse_expression(source: &str) -> Result<Commented<Expr>, ParseError> {
  let mut parser = parser::Parser::new(source);
  let before = parser.comments();
  let expression = parser.expression(0)?;
  let after = parser.comments();
  parser.finish()?;
  Ok(Commented::new(before, expression, after))
}

/// Parses a source code string as a single value definition, e.g. `f x = x`.
///
/// # Examples
/// ```
/// use fern_syntax::parse_definition;
/// let definition = parse_definition("double x = x * 2");
///
/// assert!(definition.is_ok());
/// ```
///
/// # Errors
/// If the source is not a single well-formed definition
pub fn parse_definition(source: &str) -> Result<Commented<Definition>, ParseError> {
  let mut parser = parser::Parser::new(source);
  let before = parser.comments();
  let definition = parser.definition(0)?;
  let after = parser.comments();
  parser.finish()?;
  Ok(Commented::new(before, definition, after))
}

/// Parses a source code string as a single type annotation, e.g. `x : Int`.
///
/// # Examples
/// ```
/// use fern_syntax::parse_type_annotation;
/// let annotation = parse_type_annotation("map : (a -> b) -> List a -> List b");
///
/// assert!(annotation.is_ok());
/// ```
///
/// # Errors
/// If the source is not a single well-formed type annotation
pub fn parse_type_annotation(source: &str) -> Result<Commented<TypeAnnotation>, ParseError> {
  let mut parser = parser::Parser::new(source);
  let before = parser.comments();
  let annotation = parser.type_annotation(0)?;
  let after = parser.comments();
  parser.finish()?;
  Ok(Commented::new(before, annotation, after))
}

/// Get the tokens from a source code string
pub fn tokenise(source: &str) -> impl Iterator<Item = tokeniser::Token> + '_ {
  tokeniser::Tokeniser::from(source)
}

pub use parser::ParseError;
pub use span::{LineIndex, Span};
pub use tokeniser::{Token, TokenKind};
