//! # Prettyprint
//!
//! Renders the tree as indented lines, one node per line, including every
//! captured comment and layout tag. Used by the snapshot tests and handy for
//! debugging; it is not the formatter's output.

use super::expression::{
  Definition, Expr, Expression, IfClause, LetDeclaration, Literal, TypeAnnotation,
};
use super::{Comment, Commented, Comments, Located, Pattern, Ref, Type};
use std::fmt;

fn pad(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
  for _ in 0..depth {
    write!(f, "  ")?;
  }
  Ok(())
}

fn write_comment(f: &mut fmt::Formatter<'_>, comment: &Comment, depth: usize) -> fmt::Result {
  pad(f, depth)?;
  writeln!(f, "Comment \"{}\"", comment.text)
}

fn write_comments(f: &mut fmt::Formatter<'_>, comments: &Comments, depth: usize) -> fmt::Result {
  for comment in comments {
    write_comment(f, comment, depth)?;
  }
  Ok(())
}

fn write_literal(f: &mut fmt::Formatter<'_>, literal: &Literal) -> fmt::Result {
  match literal {
    Literal::Boolean(true) => writeln!(f, "Boolean (True)"),
    Literal::Boolean(false) => writeln!(f, "Boolean (False)"),
    Literal::IntNum(value) => writeln!(f, "Number ({value})"),
    Literal::FloatNum(value) => writeln!(f, "Float ({value})"),
    Literal::Str(value) => writeln!(f, "String \"{value}\""),
    Literal::Chr(value) => writeln!(f, "Char '{value}'"),
  }
}

fn write_commented_expr(
  f: &mut fmt::Formatter<'_>,
  item: &Commented<Expr>,
  depth: usize,
) -> fmt::Result {
  write_comments(f, &item.before, depth)?;
  write_expr(f, &item.value, depth)?;
  write_comments(f, &item.after, depth)
}

fn write_expr(f: &mut fmt::Formatter<'_>, expression: &Expr, depth: usize) -> fmt::Result {
  pad(f, depth)?;
  match &expression.value {
    Expression::Literal(literal) => write_literal(f, literal),
    Expression::Variable(reference) => writeln!(f, "Variable ({reference})"),
    Expression::Negative(inner) => {
      writeln!(f, "Negative")?;
      write_expr(f, inner, depth + 1)
    }
    Expression::Range(range) => {
      writeln!(f, "Range ({})", range.multiline)?;
      write_commented_expr(f, &range.start, depth + 1)?;
      write_commented_expr(f, &range.end, depth + 1)
    }
    Expression::List(list) => {
      writeln!(f, "List ({})", list.multiline)?;
      for item in &list.items {
        write_commented_expr(f, item, depth + 1)?;
      }
      write_comments(f, &list.trailing, depth + 1)
    }
    Expression::App(app) => {
      writeln!(f, "App ({})", app.multiline)?;
      write_expr(f, &app.function, depth + 1)?;
      for (comments, argument) in &app.arguments {
        write_comments(f, comments, depth + 1)?;
        write_expr(f, argument, depth + 1)?;
      }
      Ok(())
    }
    Expression::Binops(binops) => {
      writeln!(f, "Binops ({})", binops.multiline)?;
      write_expr(f, &binops.left, depth + 1)?;
      for clause in &binops.clauses {
        write_comments(f, &clause.before_op, depth + 1)?;
        pad(f, depth + 1)?;
        match &clause.operator.value {
          Ref::OpRef(symbol) => writeln!(f, "Operator ({symbol})")?,
          other => writeln!(f, "Operator ({other})")?,
        }
        write_comments(f, &clause.after_op, depth + 1)?;
        write_expr(f, &clause.operand, depth + 1)?;
      }
      Ok(())
    }
    Expression::If(if_) => {
      writeln!(f, "If")?;
      write_if_clause(f, &if_.first, depth + 1)?;
      for (comments, clause) in &if_.rest {
        write_comments(f, comments, depth + 1)?;
        write_if_clause(f, clause, depth + 1)?;
      }
      pad(f, depth + 1)?;
      writeln!(f, "Else")?;
      write_comments(f, &if_.after_else, depth + 2)?;
      write_expr(f, &if_.otherwise, depth + 2)
    }
    Expression::Case(case) => {
      if case.multiline_scrutinee {
        writeln!(f, "Case (multiline)")?;
      } else {
        writeln!(f, "Case")?;
      }
      write_comments(f, &case.scrutinee.before, depth + 1)?;
      write_expr(f, &case.scrutinee.value, depth + 1)?;
      write_comments(f, &case.scrutinee.after, depth + 1)?;
      for branch in &case.branches {
        pad(f, depth + 1)?;
        writeln!(f, "Branch")?;
        write_comments(f, &branch.before_pattern, depth + 2)?;
        write_pattern(f, &branch.pattern, depth + 2)?;
        write_comments(f, &branch.before_arrow, depth + 2)?;
        write_comments(f, &branch.after_arrow, depth + 2)?;
        write_expr(f, &branch.body, depth + 2)?;
      }
      Ok(())
    }
    Expression::Let(let_) => {
      writeln!(f, "Let")?;
      for declaration in &let_.declarations {
        match declaration {
          LetDeclaration::Definition(definition) => {
            write_definition(f, definition, depth + 1)?;
          }
          LetDeclaration::Annotation(annotation) => {
            write_annotation(f, annotation, depth + 1)?;
          }
          LetDeclaration::Comment(comment) => write_comment(f, comment, depth + 1)?,
        }
      }
      pad(f, depth + 1)?;
      writeln!(f, "In")?;
      write_comments(f, &let_.after_in, depth + 2)?;
      write_expr(f, &let_.body, depth + 2)
    }
    Expression::Lambda(lambda) => {
      if lambda.multiline {
        writeln!(f, "Lambda (multiline)")?;
      } else {
        writeln!(f, "Lambda")?;
      }
      for (comments, parameter) in &lambda.parameters {
        write_comments(f, comments, depth + 1)?;
        write_pattern(f, parameter, depth + 1)?;
      }
      write_comments(f, &lambda.before_arrow, depth + 1)?;
      pad(f, depth + 1)?;
      writeln!(f, "Body")?;
      write_comments(f, &lambda.after_arrow, depth + 2)?;
      write_expr(f, &lambda.body, depth + 2)
    }
    Expression::Tuple(tuple) => {
      writeln!(f, "Tuple ({})", tuple.multiline)?;
      for item in &tuple.items {
        write_commented_expr(f, item, depth + 1)?;
      }
      Ok(())
    }
    Expression::TupleFunction(arity) => writeln!(f, "TupleFunction ({arity})"),
    Expression::Parens(inner) => {
      writeln!(f, "Parens")?;
      write_commented_expr(f, inner, depth + 1)
    }
    Expression::Unit(comments) => {
      writeln!(f, "Unit")?;
      write_comments(f, comments, depth + 1)
    }
    Expression::Record(record) => {
      writeln!(f, "Record ({})", record.multiline)?;
      if let Some(base) = &record.base {
        write_comments(f, &base.before, depth + 1)?;
        pad(f, depth + 1)?;
        writeln!(f, "Base ({})", base.value.value)?;
        write_comments(f, &base.after, depth + 1)?;
      }
      for field in &record.fields {
        write_comments(f, &field.before_name, depth + 1)?;
        pad(f, depth + 1)?;
        writeln!(f, "Field ({})", field.name.value)?;
        write_comments(f, &field.before_equals, depth + 2)?;
        write_comments(f, &field.after_equals, depth + 2)?;
        write_expr(f, &field.value, depth + 2)?;
        write_comments(f, &field.after_value, depth + 2)?;
      }
      write_comments(f, &record.trailing, depth + 1)
    }
    Expression::Access(access) => {
      writeln!(f, "Access ({})", access.field.value)?;
      write_expr(f, &access.record, depth + 1)
    }
    Expression::AccessFunction(name) => writeln!(f, "AccessFunction (.{name})"),
    Expression::GlShader(_) => writeln!(f, "Shader"),
  }
}

fn write_if_clause(f: &mut fmt::Formatter<'_>, clause: &IfClause, depth: usize) -> fmt::Result {
  pad(f, depth)?;
  writeln!(f, "Condition")?;
  write_comments(f, &clause.condition.before, depth + 1)?;
  write_expr(f, &clause.condition.value, depth + 1)?;
  write_comments(f, &clause.condition.after, depth + 1)?;
  pad(f, depth)?;
  writeln!(f, "Then")?;
  write_comments(f, &clause.body.before, depth + 1)?;
  write_expr(f, &clause.body.value, depth + 1)?;
  write_comments(f, &clause.body.after, depth + 1)
}

fn write_definition(
  f: &mut fmt::Formatter<'_>,
  definition: &Definition,
  depth: usize,
) -> fmt::Result {
  pad(f, depth)?;
  writeln!(f, "Definition")?;
  write_pattern(f, &definition.name, depth + 1)?;
  for (comments, argument) in &definition.arguments {
    write_comments(f, comments, depth + 1)?;
    write_pattern(f, argument, depth + 1)?;
  }
  write_comments(f, &definition.before_equals, depth + 1)?;
  pad(f, depth + 1)?;
  writeln!(f, "Body")?;
  write_comments(f, &definition.after_equals, depth + 2)?;
  write_expr(f, &definition.body, depth + 2)
}

fn write_annotation(
  f: &mut fmt::Formatter<'_>,
  annotation: &TypeAnnotation,
  depth: usize,
) -> fmt::Result {
  pad(f, depth)?;
  writeln!(f, "Annotation ({})", annotation.name.value)?;
  write_comments(f, &annotation.before_colon, depth + 1)?;
  write_comments(f, &annotation.after_colon, depth + 1)?;
  write_type(f, &annotation.typ, depth + 1)
}

fn write_pattern(
  f: &mut fmt::Formatter<'_>,
  pattern: &Located<Pattern>,
  depth: usize,
) -> fmt::Result {
  pad(f, depth)?;
  match &pattern.value {
    Pattern::Anything => writeln!(f, "Anything"),
    Pattern::UnitPattern(comments) => {
      writeln!(f, "UnitPattern")?;
      write_comments(f, comments, depth + 1)
    }
    Pattern::Literal(literal) => write_literal(f, literal),
    Pattern::VarPattern(name) => writeln!(f, "Pattern ({name})"),
    Pattern::OpPattern(symbol) => writeln!(f, "Pattern (({symbol}))"),
    Pattern::Data(reference, arguments) => {
      writeln!(f, "Data ({reference})")?;
      for (comments, argument) in arguments {
        write_comments(f, comments, depth + 1)?;
        write_pattern(f, argument, depth + 1)?;
      }
      Ok(())
    }
    Pattern::Tuple(items) => {
      writeln!(f, "TuplePattern")?;
      for item in items {
        write_comments(f, &item.before, depth + 1)?;
        write_pattern(f, &item.value, depth + 1)?;
        write_comments(f, &item.after, depth + 1)?;
      }
      Ok(())
    }
    Pattern::List(items, trailing) => {
      writeln!(f, "ListPattern")?;
      for item in items {
        write_comments(f, &item.before, depth + 1)?;
        write_pattern(f, &item.value, depth + 1)?;
        write_comments(f, &item.after, depth + 1)?;
      }
      write_comments(f, trailing, depth + 1)
    }
    Pattern::Record(fields, trailing) => {
      writeln!(f, "RecordPattern")?;
      for field in fields {
        write_comments(f, &field.before, depth + 1)?;
        pad(f, depth + 1)?;
        writeln!(f, "Field ({})", field.value.value)?;
        write_comments(f, &field.after, depth + 1)?;
      }
      write_comments(f, trailing, depth + 1)
    }
    Pattern::Alias(alias) => {
      writeln!(f, "Alias ({})", alias.name.value)?;
      write_comments(f, &alias.before_as, depth + 1)?;
      write_comments(f, &alias.after_as, depth + 1)?;
      write_pattern(f, &alias.pattern, depth + 1)
    }
    Pattern::Cons(cons) => {
      writeln!(f, "Cons")?;
      write_pattern(f, &cons.head, depth + 1)?;
      for (before, after, item) in &cons.rest {
        write_comments(f, before, depth + 1)?;
        write_comments(f, after, depth + 1)?;
        write_pattern(f, item, depth + 1)?;
      }
      Ok(())
    }
    Pattern::Parens(inner) => {
      writeln!(f, "Parens")?;
      write_comments(f, &inner.before, depth + 1)?;
      write_pattern(f, &inner.value, depth + 1)?;
      write_comments(f, &inner.after, depth + 1)
    }
  }
}

fn write_type(f: &mut fmt::Formatter<'_>, typ: &Located<Type>, depth: usize) -> fmt::Result {
  pad(f, depth)?;
  match &typ.value {
    Type::UnitType(comments) => {
      writeln!(f, "UnitType")?;
      write_comments(f, comments, depth + 1)
    }
    Type::TypeVariable(name) => writeln!(f, "TypeVariable ({name})"),
    Type::TypeConstruction(reference, arguments) => {
      writeln!(f, "TypeConstruction ({reference})")?;
      for (comments, argument) in arguments {
        write_comments(f, comments, depth + 1)?;
        write_type(f, argument, depth + 1)?;
      }
      Ok(())
    }
    Type::TupleType(items) => {
      writeln!(f, "TupleType")?;
      for item in items {
        write_comments(f, &item.before, depth + 1)?;
        write_type(f, &item.value, depth + 1)?;
        write_comments(f, &item.after, depth + 1)?;
      }
      Ok(())
    }
    Type::RecordType(record) => {
      writeln!(f, "RecordType ({})", record.multiline)?;
      if let Some(base) = &record.base {
        write_comments(f, &base.before, depth + 1)?;
        pad(f, depth + 1)?;
        writeln!(f, "Base ({})", base.value.value)?;
        write_comments(f, &base.after, depth + 1)?;
      }
      for field in &record.fields {
        write_comments(f, &field.before_name, depth + 1)?;
        pad(f, depth + 1)?;
        writeln!(f, "Field ({})", field.name.value)?;
        write_comments(f, &field.before_colon, depth + 2)?;
        write_comments(f, &field.after_colon, depth + 2)?;
        write_type(f, &field.value, depth + 2)?;
        write_comments(f, &field.after_value, depth + 2)?;
      }
      write_comments(f, &record.trailing, depth + 1)
    }
    Type::FunctionType(function) => {
      writeln!(f, "FunctionType ({})", function.multiline)?;
      write_type(f, &function.first, depth + 1)?;
      for (before, after, segment) in &function.rest {
        write_comments(f, before, depth + 1)?;
        write_comments(f, after, depth + 1)?;
        write_type(f, segment, depth + 1)?;
      }
      Ok(())
    }
    Type::Parens(inner) => {
      writeln!(f, "Parens")?;
      write_comments(f, &inner.before, depth + 1)?;
      write_type(f, &inner.value, depth + 1)?;
      write_comments(f, &inner.after, depth + 1)
    }
  }
}

impl fmt::Display for Located<Expression> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_expr(f, self, 0)
  }
}
impl fmt::Display for Commented<Located<Expression>> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_comments(f, &self.before, 0)?;
    write_expr(f, &self.value, 0)?;
    write_comments(f, &self.after, 0)
  }
}
impl fmt::Display for Located<Pattern> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_pattern(f, self, 0)
  }
}
impl fmt::Display for Located<Type> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_type(f, self, 0)
  }
}
impl fmt::Display for Definition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_definition(f, self, 0)
  }
}
impl fmt::Display for Commented<Definition> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_comments(f, &self.before, 0)?;
    write_definition(f, &self.value, 0)?;
    write_comments(f, &self.after, 0)
  }
}
impl fmt::Display for TypeAnnotation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_annotation(f, self, 0)
  }
}
impl fmt::Display for Commented<TypeAnnotation> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_comments(f, &self.before, 0)?;
    write_annotation(f, &self.value, 0)?;
    write_comments(f, &self.after, 0)
  }
}
