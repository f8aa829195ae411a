//! # Expressions

use super::{AppMultiline, Comment, Commented, Comments, Located, Multiline, Pattern, Ref, Type};
use thin_vec::ThinVec;

/// A located expression
pub type Expr = Located<Expression>;

/// An expression, the main syntactic category of the language
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
  /// A literal value, e.g. `1`, `'a'`, `"hello"`, `True`
  Literal(Literal),
  /// A reference to a variable, constructor, or operator, e.g. `x`,
  /// `List.map`, `Just`, `(+)`
  Variable(Ref),
  /// A negated term, e.g. `-x`
  Negative(Box<Expr>),
  /// A range, e.g. `[1..10]`
  Range(Range),
  /// An explicit list, e.g. `[1, 2, 3]`
  List(List),
  /// A function applied to one or more arguments, e.g. `f x y`
  App(App),
  /// A flat chain of binary operators, e.g. `a + b * c`
  ///
  /// Precedence is deliberately not resolved here; a later pass
  /// re-associates the chain from a fixity table
  Binops(Binops),
  /// An if expression with possible `else if` clauses
  If(If),
  /// A case expression, e.g. `case x of ...`
  Case(Case),
  /// A let expression, e.g. `let x = 1 in x`
  Let(Let),
  /// A lambda, e.g. `\x -> x`
  Lambda(Lambda),
  /// A tuple, e.g. `(1, 2)`
  Tuple(Tuple),
  /// A tuple constructor function, e.g. `(,,)` builds 3-tuples
  TupleFunction(usize),
  /// A parenthesised expression, e.g. `(x)`
  Parens(Box<Commented<Expr>>),
  /// The unit value `()`, keeping any comments written inside it
  Unit(Comments),
  /// A record literal or record update, e.g. `{ x = 1 }`, `{ r | x = 1 }`
  Record(Record),
  /// A field access, e.g. `point.x`
  Access(Access),
  /// A field accessor function, e.g. `.x`
  AccessFunction(String),
  /// A raw GLSL shader block, e.g. `[glsl| ... |]`
  GlShader(String),
}

/// A literal value
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
  /// `True` or `False`
  Boolean(bool),
  /// An integer, e.g. `42`, `0xFF`
  IntNum(i64),
  /// A floating point number, e.g. `1.5`
  FloatNum(f64),
  /// A string, e.g. `"hello"`
  Str(String),
  /// A character, e.g. `'a'`
  Chr(char),
}

/// A range, e.g. `[1..10]`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
  /// The first value of the range
  pub start: Box<Commented<Expr>>,
  /// The final value of the range
  pub end: Box<Commented<Expr>>,
  /// Was the range written across multiple lines?
  pub multiline: Multiline,
}

/// An explicit list, e.g. `[1, 2, 3]`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct List {
  /// The items of the list, each with surrounding comments
  pub items: ThinVec<Commented<Expr>>,
  /// Comments inside an empty list, e.g. `[ {- nothing -} ]`
  pub trailing: Comments,
  /// Was the list written across multiple lines?
  pub multiline: Multiline,
}

/// A function applied to one or more arguments, e.g. `f x y`
///
/// Never constructed for a lone term: a term with no trailing arguments is
/// returned unwrapped.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct App {
  /// The function being applied
  pub function: Box<Expr>,
  /// The arguments, each with the comments between it and the previous term
  pub arguments: ThinVec<(Comments, Expr)>,
  /// Where the first line break fell, driving later layout decisions
  pub multiline: AppMultiline,
}

/// A flat chain of binary operators, e.g. `a + b * c`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Binops {
  /// The leftmost operand
  pub left: Box<Expr>,
  /// The operators and their right operands, in source order
  pub clauses: ThinVec<BinopsClause>,
  /// Did the whole chain span multiple lines?
  pub multiline: Multiline,
}

/// One operator and its right operand within a [`Binops`] chain
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct BinopsClause {
  /// Comments between the previous operand and the operator
  pub before_op: Comments,
  /// The operator itself
  pub operator: Located<Ref>,
  /// Comments between the operator and its right operand
  pub after_op: Comments,
  /// The right operand
  pub operand: Expr,
}

/// An if expression with possible `else if` clauses
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct If {
  /// The leading `if`/`then` clause
  pub first: IfClause,
  /// Further `else if`/`then` clauses, each with the comments between the
  /// `else` and `if` keywords
  pub rest: ThinVec<(Comments, IfClause)>,
  /// Comments between the final `else` and its expression
  pub after_else: Comments,
  /// The final else branch
  pub otherwise: Box<Expr>,
}

/// A condition and its then branch
///
/// The comments after the body are those written before the following `else`.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct IfClause {
  /// The condition, with the comments around it
  pub condition: Commented<Box<Expr>>,
  /// The then branch, with the comments around it
  pub body: Commented<Box<Expr>>,
}

/// A case expression, e.g. `case x of ...`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
  /// The value being matched on, with the comments around it
  pub scrutinee: Commented<Box<Expr>>,
  /// Did the region from `case` to `of` span multiple lines?
  pub multiline_scrutinee: bool,
  /// The branches, all aligned to the column of the first
  pub branches: ThinVec<CaseBranch>,
}

/// One branch of a [`Case`] expression
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch {
  /// Comments before the pattern
  pub before_pattern: Comments,
  /// The pattern being matched
  pub pattern: Located<Pattern>,
  /// Comments between the pattern and the `->`
  pub before_arrow: Comments,
  /// Comments between the `->` and the body
  pub after_arrow: Comments,
  /// The expression evaluated when the pattern matches
  pub body: Expr,
}

/// A let expression, e.g. `let x = 1 in x`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Let {
  /// The local declarations, with any comments between them kept in source
  /// order as pseudo-declarations
  pub declarations: ThinVec<LetDeclaration>,
  /// Comments between `in` and the body
  pub after_in: Comments,
  /// The body of the let
  pub body: Box<Expr>,
}

/// One declaration within a [`Let`] block
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum LetDeclaration {
  /// A value definition, e.g. `x = 1`
  Definition(Definition),
  /// A type annotation, e.g. `x : Int`
  Annotation(TypeAnnotation),
  /// A comment between declarations, kept so printers can place it among
  /// the real declarations in original order
  Comment(Comment),
}

/// A lambda, e.g. `\x -> x`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
  /// The argument patterns, each with the comments before it
  pub parameters: ThinVec<(Comments, Located<Pattern>)>,
  /// Comments between the last pattern and the `->`
  pub before_arrow: Comments,
  /// Comments between the `->` and the body
  pub after_arrow: Comments,
  /// The body of the lambda
  pub body: Box<Expr>,
  /// Did the whole lambda span multiple lines?
  pub multiline: bool,
}

/// A tuple, e.g. `(1, 2)`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
  /// The items of the tuple, each with surrounding comments
  pub items: ThinVec<Commented<Expr>>,
  /// Was the tuple written across multiple lines?
  pub multiline: Multiline,
}

/// A record literal or record update
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  /// The base record of an update, e.g. the `r` in `{ r | x = 1 }`
  pub base: Option<Commented<Located<String>>>,
  /// The fields of the record
  pub fields: ThinVec<RecordField>,
  /// Comments inside an empty record, e.g. `{ {- nothing -} }`
  pub trailing: Comments,
  /// Was the record written across multiple lines?
  pub multiline: Multiline,
}

/// One `name = value` pair of a [`Record`]
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
  /// Comments before the field name
  pub before_name: Comments,
  /// The field name
  pub name: Located<String>,
  /// Comments between the name and the `=`
  pub before_equals: Comments,
  /// Comments between the `=` and the value
  pub after_equals: Comments,
  /// The value of the field
  pub value: Expr,
  /// Comments between the value and the following `,` or `}`
  pub after_value: Comments,
}

/// A field access, e.g. `point.x`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Access {
  /// The record being accessed
  pub record: Box<Expr>,
  /// The field being read
  pub field: Located<String>,
}

/// A value definition, e.g. `f x = x + 1`
///
/// Arguments are only present when the head pattern is a plain variable or
/// an operator; destructuring definitions are always nullary.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
  /// The pattern being bound
  pub name: Located<Pattern>,
  /// The argument patterns, each with the comments before it
  pub arguments: ThinVec<(Comments, Located<Pattern>)>,
  /// Comments between the last pattern and the `=`
  pub before_equals: Comments,
  /// Comments between the `=` and the body
  pub after_equals: Comments,
  /// The body of the definition
  pub body: Box<Expr>,
}

/// A type annotation, e.g. `x : Int`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
  /// The name being annotated, a variable or a parenthesised operator
  pub name: Located<Ref>,
  /// Comments between the name and the `:`
  pub before_colon: Comments,
  /// Comments between the `:` and the type
  pub after_colon: Comments,
  /// The annotated type
  pub typ: Located<Type>,
}
