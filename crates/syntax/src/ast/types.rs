//! # Types

use super::{Commented, Comments, Located, Multiline, Ref};
use thin_vec::ThinVec;

/// A type expression, as written in type annotations
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
  /// The unit type `()`, keeping any comments written inside it
  UnitType(Comments),
  /// A type variable, e.g. `a`
  TypeVariable(String),
  /// A type constructor applied to arguments, e.g. `Maybe a`
  TypeConstruction(Ref, ThinVec<(Comments, Located<Type>)>),
  /// A tuple type, e.g. `(Int, String)`
  TupleType(ThinVec<Commented<Located<Type>>>),
  /// A record type, e.g. `{ x : Int }` or `{ r | x : Int }`
  RecordType(RecordType),
  /// A function type, a flat chain of `->` arrows
  FunctionType(FunctionType),
  /// A parenthesised type, e.g. `(List a)`
  Parens(Box<Commented<Located<Type>>>),
}

/// A record type, e.g. `{ x : Int }`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
  /// The base row variable of an extensible record, e.g. the `r` in
  /// `{ r | x : Int }`
  pub base: Option<Commented<Located<String>>>,
  /// The fields of the record type
  pub fields: ThinVec<TypeRecordField>,
  /// Comments inside an empty record type
  pub trailing: Comments,
  /// Was the record type written across multiple lines?
  pub multiline: Multiline,
}

/// One `name : Type` pair of a [`RecordType`]
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRecordField {
  /// Comments before the field name
  pub before_name: Comments,
  /// The field name
  pub name: Located<String>,
  /// Comments between the name and the `:`
  pub before_colon: Comments,
  /// Comments between the `:` and the field type
  pub after_colon: Comments,
  /// The type of the field
  pub value: Located<Type>,
  /// Comments between the field type and the following `,` or `}`
  pub after_value: Comments,
}

/// A function type, a flat chain of `->` arrows
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
  /// The first segment of the chain
  pub first: Box<Located<Type>>,
  /// The following segments, each with the comments around its `->`
  pub rest: ThinVec<(Comments, Comments, Located<Type>)>,
  /// Did the whole chain span multiple lines?
  pub multiline: Multiline,
}
