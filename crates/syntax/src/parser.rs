use crate::{
  ast::{
    AppMultiline, Comment, Commented, Comments, Located, Multiline, Pattern, Ref, Type,
    expression::*,
    pattern::{Alias, Cons},
    types::{FunctionType, RecordType, TypeRecordField},
  },
  span::{LineIndex, Span},
  tokeniser::{Token, TokenKind, Tokeniser},
};
use std::{error, fmt};
use thin_vec::ThinVec;

/// A recursive descent parser over the token stream.
///
/// Backtracking is explicit: alternatives which need lookahead run under
/// [`Parser::try_parse`], which fully rewinds the cursor on failure. Comments
/// are ordinary tokens, captured into the tree by [`Parser::comments`] at each
/// position which may carry them, so a rewound trial leaves no trace.
///
/// Indentation sensitivity is handled by passing a reference column through
/// every production: an item continuing a construct on a new line must start
/// at a column strictly greater than the reference.
pub(crate) struct Parser<'source> {
  source: &'source str,
  tokens: Vec<Token>,
  line_index: LineIndex,
  position: usize,
}

// Cursor plumbing
impl<'source> Parser<'source> {
  pub(crate) fn new(source: &'source str) -> Self {
    Self {
      source,
      tokens: Tokeniser::from(source).collect(),
      line_index: LineIndex::from_source(source),
      position: 0,
    }
  }

  fn current(&self) -> Token {
    self.tokens[self.position.min(self.tokens.len() - 1)]
  }

  fn peek(&self, offset: usize) -> Token {
    self.tokens[(self.position + offset).min(self.tokens.len() - 1)]
  }

  fn previous(&self) -> Token {
    self.tokens[self.position.saturating_sub(1)]
  }

  fn advance(&mut self) -> Token {
    let token = self.current();
    self.position += 1;
    token
  }

  fn check(&self, kind: TokenKind) -> bool {
    self.current().kind == kind
  }

  fn eat(&mut self, kind: TokenKind) -> Option<Token> {
    if self.check(kind) {
      Some(self.advance())
    } else {
      None
    }
  }

  fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
    if self.check(kind) {
      Ok(self.advance())
    } else {
      Err(self.error(expected))
    }
  }

  fn error(&self, expected: &'static str) -> ParseError {
    let token = self.current();
    ParseError {
      span: token.span(),
      expected,
      found: token.kind,
      committed: false,
    }
  }

  fn text(&self, token: Token) -> &'source str {
    token.span().source_text(self.source)
  }

  /// Run a sub-parser, fully rewinding the cursor if it fails.
  ///
  /// Comment capture happens through token consumption alone, so rewinding
  /// the position restores any comments the trial consumed.
  fn try_parse<T>(
    &mut self,
    parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
  ) -> Result<T, ParseError> {
    let saved = self.position;
    let result = parse(self);
    if result.is_err() {
      self.position = saved;
    }
    result
  }

  /// Consume any comment tokens at the current position, in source order
  pub(crate) fn comments(&mut self) -> Comments {
    let mut comments = ThinVec::new();
    loop {
      let token = self.current();
      match token.kind {
        TokenKind::LineComment => {
          let text = self.text(token)[2..].to_owned();
          comments.push(Comment {
            is_block: false,
            text,
            span: token.span(),
          });
        }
        TokenKind::BlockComment => {
          let raw = self.text(token);
          let text = raw[2..raw.len() - 2].to_owned();
          comments.push(Comment {
            is_block: true,
            text,
            span: token.span(),
          });
        }
        _ => break,
      }
      self.advance();
    }
    comments
  }

  fn is_multiline(&self, span: Span) -> bool {
    self.line_index.is_multiline(span)
  }

  /// Was there a line break between the end of one region and the start of
  /// the next?
  fn split_between(&self, first: Span, second: Span) -> bool {
    self.line_index.final_line(first) != self.line_index.line(second)
  }

  /// Check all input has been consumed
  pub(crate) fn finish(&mut self) -> Result<(), ParseError> {
    if self.check(TokenKind::EndOfFile) {
      Ok(())
    } else {
      Err(self.error("the end of the file"))
    }
  }
}

// Expressions
impl Parser<'_> {
  /// Parse any expression.
  ///
  /// Control flow expressions are recognised from their keyword; anything
  /// else is a chain of binary operators over applications. Once a keyword
  /// has been seen its expression must complete, failures are no longer
  /// recoverable by trying another alternative.
  pub(crate) fn expression(&mut self, indent: u32) -> Result<Expr, ParseError> {
    match self.current().kind {
      TokenKind::If => self.if_expression(indent).map_err(ParseError::commit),
      TokenKind::Case => self.case_expression(indent).map_err(ParseError::commit),
      TokenKind::Let => self.let_expression(indent).map_err(ParseError::commit),
      TokenKind::Backslash => self.lambda(indent).map_err(ParseError::commit),
      _ => {
        let left = self.app(indent)?;
        self.binops(left, indent)
      }
    }
  }

  /// Parse a flat chain of binary operators onto an already parsed operand.
  ///
  /// Control flow expressions are only permitted in the final right hand
  /// slot; once one is used the chain terminates. If no operator follows,
  /// the operand is returned unwrapped. Precedence is not resolved here,
  /// the clauses keep their source order.
  fn binops(&mut self, left: Expr, indent: u32) -> Result<Expr, ParseError> {
    let mut clauses: ThinVec<BinopsClause> = ThinVec::new();

    loop {
      let saved = self.position;
      let before_op = self.comments();
      let token = self.current();
      if token.kind != TokenKind::Operator || token.column <= indent {
        self.position = saved;
        break;
      }
      let operator_token = self.advance();
      let operator = Located::new(
        operator_token.span(),
        Ref::OpRef(self.text(operator_token).to_owned()),
      );
      let after_op = self.comments();

      // once the operator has been seen, a right operand must follow
      match self.try_parse(|p| p.app(indent)) {
        Ok(operand) => clauses.push(BinopsClause {
          before_op,
          operator,
          after_op,
          operand,
        }),
        Err(error) if error.is_committed() => return Err(error),
        Err(_) => {
          let operand = self.last_operand(indent)?;
          clauses.push(BinopsClause {
            before_op,
            operator,
            after_op,
            operand,
          });
          break;
        }
      }
    }

    if clauses.is_empty() {
      return Ok(left);
    }

    let end = clauses.last().map_or(left.span, |clause| clause.operand.span);
    let span = left.span.merge(end);
    let multiline = Multiline::from_split(self.is_multiline(span));

    Ok(Located::new(
      span,
      Expression::Binops(Binops {
        left: Box::new(left),
        clauses,
        multiline,
      }),
    ))
  }

  /// The final operand of an operator chain, the only slot where a control
  /// flow expression may appear
  fn last_operand(&mut self, indent: u32) -> Result<Expr, ParseError> {
    match self.current().kind {
      TokenKind::If | TokenKind::Case | TokenKind::Let | TokenKind::Backslash => {
        self.expression(indent)
      }
      _ => Err(self.error("an expression").commit()),
    }
  }

  /// Parse a term followed by any number of argument terms.
  ///
  /// A lone term is returned unchanged, an `App` node is only built when at
  /// least one argument follows. The layout tag records where the first
  /// line break fell.
  fn app(&mut self, indent: u32) -> Result<Expr, ParseError> {
    let function = self.term(indent)?;

    let mut arguments: ThinVec<(Comments, Expr)> = ThinVec::new();
    let mut first_gap_split = false;
    let mut first_multiline = false;
    let mut rest_split = false;
    let mut previous_end = function.span;

    loop {
      let saved = self.position;
      let comments = self.comments();
      let token = self.current();
      if token.kind == TokenKind::EndOfFile || token.column <= indent {
        self.position = saved;
        break;
      }
      match self.try_parse(|p| p.term(indent)) {
        Ok(argument) => {
          if arguments.is_empty() {
            first_gap_split = self.split_between(previous_end, argument.span);
            first_multiline = self.is_multiline(argument.span);
          } else if self.split_between(previous_end, argument.span)
            || self.is_multiline(argument.span)
          {
            rest_split = true;
          }
          previous_end = argument.span;
          arguments.push((comments, argument));
        }
        Err(error) if error.is_committed() => return Err(error),
        Err(_) => {
          self.position = saved;
          break;
        }
      }
    }

    if arguments.is_empty() {
      return Ok(function);
    }

    let multiline = if first_gap_split || first_multiline {
      AppMultiline::FASplitFirst
    } else if rest_split {
      AppMultiline::FAJoinFirst(Multiline::SplitAll)
    } else {
      AppMultiline::FAJoinFirst(Multiline::JoinAll)
    };

    let span = function.span.merge(previous_end);
    Ok(Located::new(
      span,
      Expression::App(App {
        function: Box::new(function),
        arguments,
        multiline,
      }),
    ))
  }
}

// Terms
impl Parser<'_> {
  /// Parse exactly one atomic or bracketed expression.
  ///
  /// Fails without consuming input if no alternative's leading token
  /// matches, so the caller can try a different production.
  fn term(&mut self, indent: u32) -> Result<Expr, ParseError> {
    let token = self.current();
    match token.kind {
      TokenKind::Number | TokenKind::String | TokenKind::Char => {
        let (span, literal) = self.literal_value()?;
        Ok(Located::new(span, Expression::Literal(literal)))
      }
      TokenKind::Shader => {
        let token = self.advance();
        let raw = self.text(token);
        // carriage returns are stripped from the raw shader source
        let contents = raw[6..raw.len() - 2].replace('\r', "");
        Ok(Located::new(token.span(), Expression::GlShader(contents)))
      }
      TokenKind::LeftSquare => self.list_or_range(indent),
      TokenKind::Dot => self.access_function(),
      TokenKind::Operator
        if self.text(token) == "-"
          && token.adjacent_to(self.peek(1))
          && self.negatable_context() =>
      {
        self.negative(indent)
      }
      TokenKind::LowerIdentifier | TokenKind::UpperIdentifier => {
        let variable = self.variable()?;
        self.accessible(variable)
      }
      TokenKind::LeftParen => {
        let parens = self.parenthesised(indent)?;
        self.accessible(parens)
      }
      TokenKind::LeftCurly => {
        let record = self.record(indent)?;
        self.accessible(record)
      }
      _ => Err(self.error("an expression")),
    }
  }

  /// A `-` is a negation rather than a binary operator when it doesn't
  /// directly follow something it could be subtracting from
  fn negatable_context(&self) -> bool {
    if self.position == 0 {
      return true;
    }
    let previous = self.previous();
    if !previous.adjacent_to(self.current()) {
      return true;
    }
    matches!(
      previous.kind,
      TokenKind::LeftParen
        | TokenKind::LeftSquare
        | TokenKind::LeftCurly
        | TokenKind::Comma
        | TokenKind::Operator
        | TokenKind::Equals
        | TokenKind::RightArrow
        | TokenKind::Colon
        | TokenKind::Pipe
        | TokenKind::DotDot
        | TokenKind::Backslash
    )
  }

  fn negative(&mut self, indent: u32) -> Result<Expr, ParseError> {
    let minus = self.advance();
    let operand = self.term(indent)?;
    let span = minus.span().merge(operand.span);
    Ok(Located::new(span, Expression::Negative(Box::new(operand))))
  }

  /// A field accessor function, e.g. `.x`
  fn access_function(&mut self) -> Result<Expr, ParseError> {
    let dot = self.current();
    let field = self.peek(1);
    if dot.adjacent_to(field) && field.kind == TokenKind::LowerIdentifier {
      self.advance();
      let field = self.advance();
      Ok(Located::new(
        dot.span().merge(field.span()),
        Expression::AccessFunction(self.text(field).to_owned()),
      ))
    } else {
      Err(self.error("an expression"))
    }
  }

  /// Allow any number of `.field` accesses to chain onto a term, provided
  /// the tokens are directly adjacent
  fn accessible(&mut self, base: Expr) -> Result<Expr, ParseError> {
    let mut base = base;
    loop {
      let dot = self.current();
      let field = self.peek(1);
      if dot.kind == TokenKind::Dot
        && self.previous().adjacent_to(dot)
        && dot.adjacent_to(field)
        && field.kind == TokenKind::LowerIdentifier
      {
        self.advance();
        let field = self.advance();
        let name = Located::new(field.span(), self.text(field).to_owned());
        let span = base.span.merge(field.span());
        base = Located::new(
          span,
          Expression::Access(Access {
            record: Box::new(base),
            field: name,
          }),
        );
      } else {
        break;
      }
    }
    Ok(base)
  }

  /// A variable, constructor, or qualified reference.
  ///
  /// Unqualified `True` and `False` resolve to boolean literals, this is a
  /// lexical special case rather than a semantic one.
  fn variable(&mut self) -> Result<Expr, ParseError> {
    let token = self.current();
    if token.kind == TokenKind::LowerIdentifier {
      self.advance();
      let name = self.text(token).to_owned();
      return Ok(Located::new(
        token.span(),
        Expression::Variable(Ref::VarRef(ThinVec::new(), name)),
      ));
    }

    let (span, reference) = self.qualified_reference()?;
    if let Ref::TagRef(qualifiers, name) = &reference {
      if qualifiers.is_empty() && name.as_str() == "True" {
        return Ok(Located::new(span, Expression::Literal(Literal::Boolean(true))));
      }
      if qualifiers.is_empty() && name.as_str() == "False" {
        return Ok(Located::new(
          span,
          Expression::Literal(Literal::Boolean(false)),
        ));
      }
    }
    Ok(Located::new(span, Expression::Variable(reference)))
  }

  /// A possibly qualified reference, e.g. `List.map`, `Maybe.Just`.
  ///
  /// The dots must be directly adjacent to the identifiers on both sides,
  /// `List . map` is not a qualified reference.
  fn qualified_reference(&mut self) -> Result<(Span, Ref), ParseError> {
    let first = self.expect(TokenKind::UpperIdentifier, "an identifier")?;
    let mut span = first.span();
    let mut qualifiers = ThinVec::new();
    let mut name = self.text(first).to_owned();

    loop {
      let dot = self.current();
      let next = self.peek(1);
      if dot.kind != TokenKind::Dot
        || !self.previous().adjacent_to(dot)
        || !dot.adjacent_to(next)
      {
        break;
      }
      match next.kind {
        TokenKind::UpperIdentifier => {
          self.advance();
          let token = self.advance();
          qualifiers.push(std::mem::replace(&mut name, self.text(token).to_owned()));
          span = span.merge(token.span());
        }
        TokenKind::LowerIdentifier => {
          self.advance();
          let token = self.advance();
          qualifiers.push(name);
          let reference = Ref::VarRef(qualifiers, self.text(token).to_owned());
          return Ok((span.merge(token.span()), reference));
        }
        _ => break,
      }
    }

    Ok((span, Ref::TagRef(qualifiers, name)))
  }

  /// A `[`-led term: a raw shader block is handled by the tokeniser, so
  /// this is either a range or an explicit list. A range is detected by
  /// trying its shape first and rewinding if no `..` appears.
  fn list_or_range(&mut self, indent: u32) -> Result<Expr, ParseError> {
    let open = self.advance();

    let saved = self.position;
    let trailing = self.comments();
    if let Some(close) = self.eat(TokenKind::RightSquare) {
      let span = open.span().merge(close.span());
      return Ok(Located::new(
        span,
        Expression::List(List {
          items: ThinVec::new(),
          trailing,
          multiline: Multiline::from_split(self.is_multiline(span)),
        }),
      ));
    }
    self.position = saved;

    match self.try_parse(|p| {
      let before = p.comments();
      let start = p.expression(indent)?;
      let after = p.comments();
      p.expect(TokenKind::DotDot, "..")?;
      Ok(Commented::new(before, start, after))
    }) {
      Ok(start) => {
        // the `..` commits this to being a range
        let before = self.comments();
        let end = self.expression(indent).map_err(ParseError::commit)?;
        let after = self.comments();
        let close = self
          .expect(TokenKind::RightSquare, "]")
          .map_err(ParseError::commit)?;
        let span = open.span().merge(close.span());
        Ok(Located::new(
          span,
          Expression::Range(Range {
            start: Box::new(start),
            end: Box::new(Commented::new(before, end, after)),
            multiline: Multiline::from_split(self.is_multiline(span)),
          }),
        ))
      }
      Err(error) if error.is_committed() => Err(error),
      Err(_) => {
        let mut items = ThinVec::new();
        loop {
          let before = self.comments();
          let item = self.expression(indent).map_err(ParseError::commit)?;
          let after = self.comments();
          items.push(Commented::new(before, item, after));
          if self.eat(TokenKind::Comma).is_none() {
            break;
          }
        }
        let close = self
          .expect(TokenKind::RightSquare, "]")
          .map_err(ParseError::commit)?;
        let span = open.span().merge(close.span());
        Ok(Located::new(
          span,
          Expression::List(List {
            items,
            trailing: ThinVec::new(),
            multiline: Multiline::from_split(self.is_multiline(span)),
          }),
        ))
      }
    }
  }

  /// A `(`-led term: an operator reference `(+)`, a tuple constructor
  /// function `(,,)`, the unit value `()`, a parenthesised expression, or
  /// a tuple
  fn parenthesised(&mut self, indent: u32) -> Result<Expr, ParseError> {
    let open = self.advance();

    if self.check(TokenKind::Operator) && self.peek(1).kind == TokenKind::RightParen {
      let operator = self.advance();
      let close = self.advance();
      return Ok(Located::new(
        open.span().merge(close.span()),
        Expression::Variable(Ref::OpRef(self.text(operator).to_owned())),
      ));
    }

    if self.check(TokenKind::Comma) {
      let mut commas = 0;
      while self.eat(TokenKind::Comma).is_some() {
        commas += 1;
      }
      let close = self
        .expect(TokenKind::RightParen, ")")
        .map_err(ParseError::commit)?;
      return Ok(Located::new(
        open.span().merge(close.span()),
        Expression::TupleFunction(commas + 1),
      ));
    }

    let comments = self.comments();
    if let Some(close) = self.eat(TokenKind::RightParen) {
      return Ok(Located::new(
        open.span().merge(close.span()),
        Expression::Unit(comments),
      ));
    }

    let mut items = ThinVec::new();
    let mut before = comments;
    loop {
      let item = self.expression(indent).map_err(ParseError::commit)?;
      let after = self.comments();
      items.push(Commented::new(before, item, after));
      if self.eat(TokenKind::Comma).is_none() {
        break;
      }
      before = self.comments();
    }
    let close = self
      .expect(TokenKind::RightParen, ")")
      .map_err(ParseError::commit)?;

    let span = open.span().merge(close.span());
    if items.len() == 1 {
      let item = items.remove(0);
      Ok(Located::new(span, Expression::Parens(Box::new(item))))
    } else {
      let multiline = Multiline::from_split(self.is_multiline(span));
      Ok(Located::new(span, Expression::Tuple(Tuple { items, multiline })))
    }
  }

  /// A record literal `{ x = 1 }` or record update `{ r | x = 1 }`
  fn record(&mut self, indent: u32) -> Result<Expr, ParseError> {
    let open = self.advance();
    let comments = self.comments();

    if let Some(close) = self.eat(TokenKind::RightCurly) {
      let span = open.span().merge(close.span());
      return Ok(Located::new(
        span,
        Expression::Record(Record {
          base: None,
          fields: ThinVec::new(),
          trailing: comments,
          multiline: Multiline::from_split(self.is_multiline(span)),
        }),
      ));
    }

    // a record update has a base name before a `|`
    let (base, mut before) = match self.try_parse(|p| {
      let name = p.expect(TokenKind::LowerIdentifier, "a record")?;
      let after = p.comments();
      p.expect(TokenKind::Pipe, "|")?;
      Ok((name, after))
    }) {
      Ok((name_token, after)) => {
        let name = Located::new(name_token.span(), self.text(name_token).to_owned());
        (Some(Commented::new(comments, name, after)), self.comments())
      }
      Err(_) => (None, comments),
    };

    let mut fields = ThinVec::new();
    loop {
      let name_token = self
        .expect(TokenKind::LowerIdentifier, "a field name")
        .map_err(ParseError::commit)?;
      let name = Located::new(name_token.span(), self.text(name_token).to_owned());
      let before_equals = self.comments();
      self
        .expect(TokenKind::Equals, "=")
        .map_err(ParseError::commit)?;
      let after_equals = self.comments();
      let value = self.expression(indent).map_err(ParseError::commit)?;
      let after_value = self.comments();
      fields.push(RecordField {
        before_name: before,
        name,
        before_equals,
        after_equals,
        value,
        after_value,
      });
      if self.eat(TokenKind::Comma).is_none() {
        break;
      }
      before = self.comments();
    }

    let close = self
      .expect(TokenKind::RightCurly, "}")
      .map_err(ParseError::commit)?;
    let span = open.span().merge(close.span());
    Ok(Located::new(
      span,
      Expression::Record(Record {
        base,
        fields,
        trailing: ThinVec::new(),
        multiline: Multiline::from_split(self.is_multiline(span)),
      }),
    ))
  }

  fn literal_value(&mut self) -> Result<(Span, Literal), ParseError> {
    let token = self.current();
    let literal = match token.kind {
      TokenKind::Number => self.number_literal(token)?,
      TokenKind::String => self.string_contents(token),
      TokenKind::Char => self.char_contents(token)?,
      _ => return Err(self.error("a literal")),
    };
    self.advance();
    Ok((token.span(), literal))
  }

  fn number_literal(&self, token: Token) -> Result<Literal, ParseError> {
    let raw = self.text(token);
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
      return i64::from_str_radix(hex, 16)
        .map(Literal::IntNum)
        .map_err(|_| self.error("a number"));
    }
    if raw.contains(['.', 'e', 'E']) {
      raw
        .parse()
        .map(Literal::FloatNum)
        .map_err(|_| self.error("a number"))
    } else {
      raw
        .parse()
        .map(Literal::IntNum)
        .map_err(|_| self.error("a number"))
    }
  }

  fn string_contents(&self, token: Token) -> Literal {
    let raw = self.text(token);
    let inner = if raw.starts_with("\"\"\"") && raw.len() >= 6 {
      &raw[3..raw.len() - 3]
    } else {
      &raw[1..raw.len() - 1]
    };
    Literal::Str(unescape(inner))
  }

  fn char_contents(&self, token: Token) -> Result<Literal, ParseError> {
    let raw = self.text(token);
    let inner = unescape(&raw[1..raw.len() - 1]);
    match inner.chars().next() {
      Some(character) => Ok(Literal::Chr(character)),
      None => Err(self.error("a character")),
    }
  }
}

// Control flow expressions
impl Parser<'_> {
  /// An if expression, e.g. `if a then b else c`.
  ///
  /// `else if` continues the clause list rather than nesting, and the
  /// comments before each `else` are held as the previous body's trailing
  /// comments.
  fn if_expression(&mut self, indent: u32) -> Result<Expr, ParseError> {
    let keyword = self.advance();
    let first = self.if_clause(indent)?;
    let mut rest = ThinVec::new();

    loop {
      self.expect(TokenKind::Else, "else")?;
      let comments = self.comments();
      if self.eat(TokenKind::If).is_some() {
        rest.push((comments, self.if_clause(indent)?));
      } else {
        let otherwise = self.expression(indent)?;
        let span = keyword.span().merge(otherwise.span);
        return Ok(Located::new(
          span,
          Expression::If(If {
            first,
            rest,
            after_else: comments,
            otherwise: Box::new(otherwise),
          }),
        ));
      }
    }
  }

  fn if_clause(&mut self, indent: u32) -> Result<IfClause, ParseError> {
    let before_condition = self.comments();
    let condition = self.expression(indent)?;
    let after_condition = self.comments();
    self.expect(TokenKind::Then, "then")?;
    let before_body = self.comments();
    let body = self.expression(indent)?;
    let after_body = self.comments();

    Ok(IfClause {
      condition: Commented::new(before_condition, Box::new(condition), after_condition),
      body: Commented::new(before_body, Box::new(body), after_body),
    })
  }

  /// A case expression. The first branch fixes the column all sibling
  /// branches must start at; anything at a different column ends the block.
  fn case_expression(&mut self, indent: u32) -> Result<Expr, ParseError> {
    let keyword = self.advance();
    let before = self.comments();
    let scrutinee = self.expression(indent)?;
    let after = self.comments();
    let of_token = self.expect(TokenKind::Of, "of")?;
    let multiline_scrutinee = self.is_multiline(keyword.span().merge(of_token.span()));

    let mut branches: ThinVec<CaseBranch> = ThinVec::new();
    let mut branch_column = None;
    loop {
      let saved = self.position;
      let before_pattern = self.comments();
      let token = self.current();
      match branch_column {
        None => {
          if token.kind == TokenKind::EndOfFile || token.column <= indent {
            return Err(self.error("a case branch"));
          }
          branch_column = Some(token.column);
        }
        Some(column) => {
          if token.kind == TokenKind::EndOfFile || token.column != column {
            self.position = saved;
            break;
          }
        }
      }

      let column = token.column;
      let pattern = self.pattern_expression(column)?;
      let before_arrow = self.comments();
      self.expect(TokenKind::RightArrow, "->")?;
      let after_arrow = self.comments();
      let body = self.expression(column)?;
      branches.push(CaseBranch {
        before_pattern,
        pattern,
        before_arrow,
        after_arrow,
        body,
      });
    }

    let end = branches.last().map_or(of_token.span(), |branch| branch.body.span);
    let span = keyword.span().merge(end);
    Ok(Located::new(
      span,
      Expression::Case(Case {
        scrutinee: Commented::new(before, Box::new(scrutinee), after),
        multiline_scrutinee,
        branches,
      }),
    ))
  }

  /// A let expression. Comments around and between the declarations are
  /// kept as pseudo-declarations in source order, so a printer can place
  /// them back where they were written.
  fn let_expression(&mut self, indent: u32) -> Result<Expr, ParseError> {
    let keyword = self.advance();
    let mut declarations: ThinVec<LetDeclaration> = ThinVec::new();
    for comment in self.comments() {
      declarations.push(LetDeclaration::Comment(comment));
    }

    let mut declaration_column = None;
    loop {
      let token = self.current();
      if token.kind == TokenKind::In || token.kind == TokenKind::EndOfFile {
        break;
      }
      match declaration_column {
        None => {
          if token.column <= indent {
            break;
          }
          declaration_column = Some(token.column);
        }
        Some(column) => {
          if token.column != column {
            break;
          }
        }
      }

      // a declaration is either a type annotation or a definition,
      // distinguished by whether a `:` follows the name
      let column = token.column;
      let declaration = match self.try_parse(|p| p.type_annotation(column)) {
        Ok(annotation) => LetDeclaration::Annotation(annotation),
        Err(error) if error.is_committed() => return Err(error),
        Err(_) => LetDeclaration::Definition(self.definition(column)?),
      };
      declarations.push(declaration);

      for comment in self.comments() {
        declarations.push(LetDeclaration::Comment(comment));
      }
    }

    if declaration_column.is_none() {
      return Err(self.error("a definition"));
    }
    self.expect(TokenKind::In, "in")?;
    let after_in = self.comments();
    let body = self.expression(indent)?;

    let span = keyword.span().merge(body.span);
    Ok(Located::new(
      span,
      Expression::Let(Let {
        declarations,
        after_in,
        body: Box::new(body),
      }),
    ))
  }

  /// A lambda, e.g. `\x y -> x`
  fn lambda(&mut self, indent: u32) -> Result<Expr, ParseError> {
    let backslash = self.advance();

    let mut parameters = ThinVec::new();
    loop {
      let saved = self.position;
      let comments = self.comments();
      let token = self.current();
      if token.kind == TokenKind::EndOfFile || token.column <= indent {
        self.position = saved;
        break;
      }
      match self.try_parse(|p| p.pattern_term(indent)) {
        Ok(pattern) => parameters.push((comments, pattern)),
        Err(error) if error.is_committed() => return Err(error),
        Err(_) => {
          self.position = saved;
          break;
        }
      }
    }
    if parameters.is_empty() {
      return Err(self.error("an argument pattern"));
    }

    let before_arrow = self.comments();
    self.expect(TokenKind::RightArrow, "->")?;
    let after_arrow = self.comments();
    let body = self.expression(indent)?;

    let span = backslash.span().merge(body.span);
    let multiline = self.is_multiline(span);
    Ok(Located::new(
      span,
      Expression::Lambda(Lambda {
        parameters,
        before_arrow,
        after_arrow,
        body: Box::new(body),
        multiline,
      }),
    ))
  }
}

// Definitions + Annotations
impl Parser<'_> {
  /// A value definition, e.g. `f x = x + 1`.
  ///
  /// Argument patterns are only solicited when the head is a plain variable
  /// or an operator; any other pattern shape is a nullary destructuring
  /// binding, even if more tokens could syntactically follow.
  pub(crate) fn definition(&mut self, indent: u32) -> Result<Definition, ParseError> {
    let name = self.pattern_term(indent)?;

    let mut arguments = ThinVec::new();
    if matches!(name.value, Pattern::VarPattern(_) | Pattern::OpPattern(_)) {
      loop {
        let saved = self.position;
        let comments = self.comments();
        let token = self.current();
        if token.kind == TokenKind::EndOfFile || token.column <= indent {
          self.position = saved;
          break;
        }
        match self.try_parse(|p| p.pattern_term(indent)) {
          Ok(pattern) => arguments.push((comments, pattern)),
          Err(error) if error.is_committed() => return Err(error),
          Err(_) => {
            self.position = saved;
            break;
          }
        }
      }
    }

    let before_equals = self.comments();
    self
      .expect(TokenKind::Equals, "=")
      .map_err(ParseError::commit)?;
    let after_equals = self.comments();
    let body = self.expression(indent).map_err(ParseError::commit)?;

    Ok(Definition {
      name,
      arguments,
      before_equals,
      after_equals,
      body: Box::new(body),
    })
  }

  /// A type annotation, e.g. `x : Int`. The name is a lowercase identifier
  /// or a parenthesised operator.
  pub(crate) fn type_annotation(&mut self, indent: u32) -> Result<TypeAnnotation, ParseError> {
    let name = self.annotation_name()?;
    let before_colon = self.comments();
    self.expect(TokenKind::Colon, ":")?;
    let after_colon = self.comments();
    let typ = self.type_expression(indent).map_err(ParseError::commit)?;

    Ok(TypeAnnotation {
      name,
      before_colon,
      after_colon,
      typ,
    })
  }

  fn annotation_name(&mut self) -> Result<Located<Ref>, ParseError> {
    let token = self.current();
    match token.kind {
      TokenKind::LowerIdentifier => {
        let token = self.advance();
        Ok(Located::new(
          token.span(),
          Ref::VarRef(ThinVec::new(), self.text(token).to_owned()),
        ))
      }
      TokenKind::LeftParen
        if self.peek(1).kind == TokenKind::Operator
          && self.peek(2).kind == TokenKind::RightParen =>
      {
        let open = self.advance();
        let operator = self.advance();
        let close = self.advance();
        Ok(Located::new(
          open.span().merge(close.span()),
          Ref::OpRef(self.text(operator).to_owned()),
        ))
      }
      _ => Err(self.error("a type annotation")),
    }
  }
}

// Patterns
impl Parser<'_> {
  /// A full pattern: constructor applications, a flat `::` chain, and a
  /// possible `as` alias
  pub(crate) fn pattern_expression(&mut self, indent: u32) -> Result<Located<Pattern>, ParseError> {
    let head = self.pattern_application(indent)?;

    let mut rest: ThinVec<(Comments, Comments, Located<Pattern>)> = ThinVec::new();
    loop {
      let saved = self.position;
      let before = self.comments();
      let token = self.current();
      if token.kind != TokenKind::Operator
        || self.text(token) != "::"
        || token.column <= indent
      {
        self.position = saved;
        break;
      }
      self.advance();
      let after = self.comments();
      let operand = self
        .pattern_application(indent)
        .map_err(ParseError::commit)?;
      rest.push((before, after, operand));
    }

    let pattern = if rest.is_empty() {
      head
    } else {
      let end = rest.last().map_or(head.span, |(_, _, pattern)| pattern.span);
      let span = head.span.merge(end);
      Located::new(
        span,
        Pattern::Cons(Cons {
          head: Box::new(head),
          rest,
        }),
      )
    };

    // an alias, e.g. `(x, y) as point`
    let saved = self.position;
    let before_as = self.comments();
    let token = self.current();
    if token.kind == TokenKind::LowerIdentifier
      && self.text(token) == "as"
      && token.column > indent
    {
      self.advance();
      let after_as = self.comments();
      let name_token = self
        .expect(TokenKind::LowerIdentifier, "a name")
        .map_err(ParseError::commit)?;
      let name = Located::new(name_token.span(), self.text(name_token).to_owned());
      let span = pattern.span.merge(name.span);
      return Ok(Located::new(
        span,
        Pattern::Alias(Alias {
          pattern: Box::new(pattern),
          before_as,
          after_as,
          name,
        }),
      ));
    }
    self.position = saved;
    Ok(pattern)
  }

  /// A constructor applied to argument patterns, or a bare pattern term
  fn pattern_application(&mut self, indent: u32) -> Result<Located<Pattern>, ParseError> {
    let token = self.current();
    if token.kind != TokenKind::UpperIdentifier {
      return self.pattern_term(indent);
    }

    let (mut span, reference) = self.qualified_reference()?;
    let Ref::TagRef(..) = &reference else {
      return Err(self.error("a pattern"));
    };

    let mut arguments = ThinVec::new();
    loop {
      let saved = self.position;
      let comments = self.comments();
      let token = self.current();
      if token.kind == TokenKind::EndOfFile || token.column <= indent {
        self.position = saved;
        break;
      }
      match self.try_parse(|p| p.pattern_term(indent)) {
        Ok(argument) => {
          span = span.merge(argument.span);
          arguments.push((comments, argument));
        }
        Err(error) if error.is_committed() => return Err(error),
        Err(_) => {
          self.position = saved;
          break;
        }
      }
    }

    Ok(Located::new(span, Pattern::Data(reference, arguments)))
  }

  /// A single pattern term
  pub(crate) fn pattern_term(&mut self, indent: u32) -> Result<Located<Pattern>, ParseError> {
    let token = self.current();
    match token.kind {
      TokenKind::Underscore => {
        let token = self.advance();
        Ok(Located::new(token.span(), Pattern::Anything))
      }
      TokenKind::Number | TokenKind::String | TokenKind::Char => {
        let (span, literal) = self.literal_value()?;
        Ok(Located::new(span, Pattern::Literal(literal)))
      }
      TokenKind::LowerIdentifier => {
        let token = self.advance();
        Ok(Located::new(
          token.span(),
          Pattern::VarPattern(self.text(token).to_owned()),
        ))
      }
      TokenKind::UpperIdentifier => {
        let (span, reference) = self.qualified_reference()?;
        let Ref::TagRef(..) = &reference else {
          return Err(self.error("a pattern"));
        };
        Ok(Located::new(span, Pattern::Data(reference, ThinVec::new())))
      }
      TokenKind::LeftParen => self.pattern_parens(indent),
      TokenKind::LeftSquare => self.pattern_list(indent),
      TokenKind::LeftCurly => self.pattern_record(),
      _ => Err(self.error("a pattern")),
    }
  }

  fn pattern_parens(&mut self, indent: u32) -> Result<Located<Pattern>, ParseError> {
    let open = self.advance();

    if self.check(TokenKind::Operator) && self.peek(1).kind == TokenKind::RightParen {
      let operator = self.advance();
      let close = self.advance();
      return Ok(Located::new(
        open.span().merge(close.span()),
        Pattern::OpPattern(self.text(operator).to_owned()),
      ));
    }

    let comments = self.comments();
    if let Some(close) = self.eat(TokenKind::RightParen) {
      return Ok(Located::new(
        open.span().merge(close.span()),
        Pattern::UnitPattern(comments),
      ));
    }

    let mut items = ThinVec::new();
    let mut before = comments;
    loop {
      let item = self.pattern_expression(indent).map_err(ParseError::commit)?;
      let after = self.comments();
      items.push(Commented::new(before, item, after));
      if self.eat(TokenKind::Comma).is_none() {
        break;
      }
      before = self.comments();
    }
    let close = self
      .expect(TokenKind::RightParen, ")")
      .map_err(ParseError::commit)?;

    let span = open.span().merge(close.span());
    if items.len() == 1 {
      let item = items.remove(0);
      Ok(Located::new(span, Pattern::Parens(Box::new(item))))
    } else {
      Ok(Located::new(span, Pattern::Tuple(items)))
    }
  }

  fn pattern_list(&mut self, indent: u32) -> Result<Located<Pattern>, ParseError> {
    let open = self.advance();

    let comments = self.comments();
    if let Some(close) = self.eat(TokenKind::RightSquare) {
      return Ok(Located::new(
        open.span().merge(close.span()),
        Pattern::List(ThinVec::new(), comments),
      ));
    }

    let mut items = ThinVec::new();
    let mut before = comments;
    loop {
      let item = self.pattern_expression(indent).map_err(ParseError::commit)?;
      let after = self.comments();
      items.push(Commented::new(before, item, after));
      if self.eat(TokenKind::Comma).is_none() {
        break;
      }
      before = self.comments();
    }
    let close = self
      .expect(TokenKind::RightSquare, "]")
      .map_err(ParseError::commit)?;

    Ok(Located::new(
      open.span().merge(close.span()),
      Pattern::List(items, ThinVec::new()),
    ))
  }

  fn pattern_record(&mut self) -> Result<Located<Pattern>, ParseError> {
    let open = self.advance();

    let comments = self.comments();
    if let Some(close) = self.eat(TokenKind::RightCurly) {
      return Ok(Located::new(
        open.span().merge(close.span()),
        Pattern::Record(ThinVec::new(), comments),
      ));
    }

    let mut fields = ThinVec::new();
    let mut before = comments;
    loop {
      let name_token = self
        .expect(TokenKind::LowerIdentifier, "a field name")
        .map_err(ParseError::commit)?;
      let name = Located::new(name_token.span(), self.text(name_token).to_owned());
      let after = self.comments();
      fields.push(Commented::new(before, name, after));
      if self.eat(TokenKind::Comma).is_none() {
        break;
      }
      before = self.comments();
    }
    let close = self
      .expect(TokenKind::RightCurly, "}")
      .map_err(ParseError::commit)?;

    Ok(Located::new(
      open.span().merge(close.span()),
      Pattern::Record(fields, ThinVec::new()),
    ))
  }
}

// Types
impl Parser<'_> {
  /// A full type expression: a flat chain of `->` arrows over type
  /// applications
  pub(crate) fn type_expression(&mut self, indent: u32) -> Result<Located<Type>, ParseError> {
    let first = self.type_application(indent)?;

    let mut rest: ThinVec<(Comments, Comments, Located<Type>)> = ThinVec::new();
    loop {
      let saved = self.position;
      let before = self.comments();
      let token = self.current();
      if token.kind != TokenKind::RightArrow || token.column <= indent {
        self.position = saved;
        break;
      }
      self.advance();
      let after = self.comments();
      let segment = self.type_application(indent).map_err(ParseError::commit)?;
      rest.push((before, after, segment));
    }

    if rest.is_empty() {
      return Ok(first);
    }
    let end = rest.last().map_or(first.span, |(_, _, segment)| segment.span);
    let span = first.span.merge(end);
    let multiline = Multiline::from_split(self.is_multiline(span));
    Ok(Located::new(
      span,
      Type::FunctionType(FunctionType {
        first: Box::new(first),
        rest,
        multiline,
      }),
    ))
  }

  /// A type constructor applied to argument types, or a bare type term
  fn type_application(&mut self, indent: u32) -> Result<Located<Type>, ParseError> {
    let token = self.current();
    if token.kind != TokenKind::UpperIdentifier {
      return self.type_term(indent);
    }

    let (mut span, reference) = self.qualified_reference()?;
    let Ref::TagRef(..) = &reference else {
      return Err(self.error("a type"));
    };

    let mut arguments = ThinVec::new();
    loop {
      let saved = self.position;
      let comments = self.comments();
      let token = self.current();
      if token.kind == TokenKind::EndOfFile || token.column <= indent {
        self.position = saved;
        break;
      }
      match self.try_parse(|p| p.type_term(indent)) {
        Ok(argument) => {
          span = span.merge(argument.span);
          arguments.push((comments, argument));
        }
        Err(error) if error.is_committed() => return Err(error),
        Err(_) => {
          self.position = saved;
          break;
        }
      }
    }

    Ok(Located::new(span, Type::TypeConstruction(reference, arguments)))
  }

  /// A single type term
  fn type_term(&mut self, indent: u32) -> Result<Located<Type>, ParseError> {
    let token = self.current();
    match token.kind {
      TokenKind::LowerIdentifier => {
        let token = self.advance();
        Ok(Located::new(
          token.span(),
          Type::TypeVariable(self.text(token).to_owned()),
        ))
      }
      TokenKind::UpperIdentifier => {
        let (span, reference) = self.qualified_reference()?;
        let Ref::TagRef(..) = &reference else {
          return Err(self.error("a type"));
        };
        Ok(Located::new(span, Type::TypeConstruction(reference, ThinVec::new())))
      }
      TokenKind::LeftParen => self.type_parens(indent),
      TokenKind::LeftCurly => self.type_record(indent),
      _ => Err(self.error("a type")),
    }
  }

  fn type_parens(&mut self, indent: u32) -> Result<Located<Type>, ParseError> {
    let open = self.advance();

    let comments = self.comments();
    if let Some(close) = self.eat(TokenKind::RightParen) {
      return Ok(Located::new(
        open.span().merge(close.span()),
        Type::UnitType(comments),
      ));
    }

    let mut items = ThinVec::new();
    let mut before = comments;
    loop {
      let item = self.type_expression(indent).map_err(ParseError::commit)?;
      let after = self.comments();
      items.push(Commented::new(before, item, after));
      if self.eat(TokenKind::Comma).is_none() {
        break;
      }
      before = self.comments();
    }
    let close = self
      .expect(TokenKind::RightParen, ")")
      .map_err(ParseError::commit)?;

    let span = open.span().merge(close.span());
    if items.len() == 1 {
      let item = items.remove(0);
      Ok(Located::new(span, Type::Parens(Box::new(item))))
    } else {
      Ok(Located::new(span, Type::TupleType(items)))
    }
  }

  fn type_record(&mut self, indent: u32) -> Result<Located<Type>, ParseError> {
    let open = self.advance();
    let comments = self.comments();

    if let Some(close) = self.eat(TokenKind::RightCurly) {
      let span = open.span().merge(close.span());
      return Ok(Located::new(
        span,
        Type::RecordType(RecordType {
          base: None,
          fields: ThinVec::new(),
          trailing: comments,
          multiline: Multiline::from_split(self.is_multiline(span)),
        }),
      ));
    }

    // an extensible record has a base row variable before a `|`
    let (base, mut before) = match self.try_parse(|p| {
      let name = p.expect(TokenKind::LowerIdentifier, "a record type")?;
      let after = p.comments();
      p.expect(TokenKind::Pipe, "|")?;
      Ok((name, after))
    }) {
      Ok((name_token, after)) => {
        let name = Located::new(name_token.span(), self.text(name_token).to_owned());
        (Some(Commented::new(comments, name, after)), self.comments())
      }
      Err(_) => (None, comments),
    };

    let mut fields = ThinVec::new();
    loop {
      let name_token = self
        .expect(TokenKind::LowerIdentifier, "a field name")
        .map_err(ParseError::commit)?;
      let name = Located::new(name_token.span(), self.text(name_token).to_owned());
      let before_colon = self.comments();
      self
        .expect(TokenKind::Colon, ":")
        .map_err(ParseError::commit)?;
      let after_colon = self.comments();
      let value = self.type_expression(indent).map_err(ParseError::commit)?;
      let after_value = self.comments();
      fields.push(TypeRecordField {
        before_name: before,
        name,
        before_colon,
        after_colon,
        value,
        after_value,
      });
      if self.eat(TokenKind::Comma).is_none() {
        break;
      }
      before = self.comments();
    }

    let close = self
      .expect(TokenKind::RightCurly, "}")
      .map_err(ParseError::commit)?;
    let span = open.span().merge(close.span());
    Ok(Located::new(
      span,
      Type::RecordType(RecordType {
        base,
        fields,
        trailing: ThinVec::new(),
        multiline: Multiline::from_split(self.is_multiline(span)),
      }),
    ))
  }
}

/// Decode the escape sequences of a string or character literal
fn unescape(raw: &str) -> String {
  let mut result = String::with_capacity(raw.len());
  let mut characters = raw.chars();

  while let Some(character) = characters.next() {
    if character != '\\' {
      result.push(character);
      continue;
    }
    match characters.next() {
      Some('n') => result.push('\n'),
      Some('t') => result.push('\t'),
      Some('r') => result.push('\r'),
      Some('0') => result.push('\0'),
      Some('u') => {
        let mut lookahead = characters.clone();
        if lookahead.next() == Some('{') {
          let mut value: u32 = 0;
          let mut digits = 0;
          let mut closed = false;
          for digit in lookahead.by_ref() {
            if digit == '}' {
              closed = digits > 0;
              break;
            }
            if digits == 8 {
              break;
            }
            match digit.to_digit(16) {
              Some(digit) => {
                value = value * 16 + digit;
                digits += 1;
              }
              None => break,
            }
          }
          if closed {
            result.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
            characters = lookahead;
            continue;
          }
        }
        result.push('u');
      }
      Some(other) => result.push(other),
      None => result.push('\\'),
    }
  }

  result
}

/// An error which arose during parsing
///
/// There is exactly one kind of failure: the parse didn't match at some
/// position, labelled with the construct that was expected there. The same
/// type covers a recoverable wrong-alternative failure and a fatal one; an
/// error becomes unrecoverable once a commit point (an operator lookahead, an
/// opened bracket, a control flow keyword) has been passed.
#[derive(Clone, Debug)]
pub struct ParseError {
  span: Span,
  expected: &'static str,
  found: TokenKind,
  committed: bool,
}
impl ParseError {
  /// The location of the error
  pub fn span(&self) -> Span {
    self.span
  }

  /// The construct that was expected, e.g. "an expression"
  #[must_use]
  pub fn expected(&self) -> &'static str {
    self.expected
  }

  /// The kind of token found instead
  #[must_use]
  pub fn found(&self) -> TokenKind {
    self.found
  }

  /// The error message describing what has gone wrong
  #[must_use]
  pub fn message(&self) -> String {
    format!("expected {} but got {}", self.expected, self.found)
  }

  fn commit(mut self) -> Self {
    self.committed = true;
    self
  }

  fn is_committed(&self) -> bool {
    self.committed
  }
}
impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message())
  }
}
impl error::Error for ParseError {}
