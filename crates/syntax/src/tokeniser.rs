use crate::span::Span;
use std::{fmt, iter};

/// Convert a string of source code into an [Iterator] of [Token]s
///
/// Whitespace is skipped, but comments are kept as tokens so the parser can
/// attach them to syntax tree positions. Every token records the line and
/// column it starts at, which the indentation-sensitive grammar relies on.
pub struct Tokeniser<'source> {
  /// The source code to tokenise
  source: &'source [u8],
  /// The current position in the source code
  position: usize,
  /// The line the current position is on, starting at 1
  line: u32,
  /// The position of the start of the current line
  line_start: usize,
  /// Has the final end of file token been produced?
  finished: bool,
}
impl<'source> From<&'source str> for Tokeniser<'source> {
  /// Create a new [Tokeniser] from a source code string
  ///
  /// # Panics
  /// Panics if the length of the source code is greater than `u32::MAX`
  fn from(value: &'source str) -> Self {
    assert!(value.len() < u32::MAX as usize);

    Self {
      source: value.as_ref(),
      position: 0,
      line: 1,
      line_start: 0,
      finished: false,
    }
  }
}
impl Tokeniser<'_> {
  /// Has the end of the source code been reached?
  fn is_end(&self, position: usize) -> bool {
    position >= self.source.len()
  }

  /// Move forwards over a region, keeping the line bookkeeping up to date
  fn advance_over(&mut self, length: usize) {
    let end = self.position + length;
    while self.position < end {
      if self.source[self.position] == b'\n' {
        self.line += 1;
        self.line_start = self.position + 1;
      }
      self.position += 1;
    }
  }

  /// Skip over spaces, tabs, carriage returns and newlines
  fn skip_whitespace(&mut self) {
    while !self.is_end(self.position)
      && matches!(self.source[self.position], b' ' | b'\t' | b'\r' | b'\n')
    {
      self.advance_over(1);
    }
  }

  /// Get the next token from the source code
  fn get_next_token(&self) -> (TokenKind, usize) {
    let character = self.source[self.position];
    let next_character = self.source.get(self.position + 1).copied();

    match character {
      // Comments
      b'-' if next_character == Some(b'-') => self.line_comment(),
      b'{' if next_character == Some(b'-') => self.block_comment(),

      // Values
      b'[' if self.source[self.position..].starts_with(b"[glsl|") => self.shader(),
      b'"' => self.string(),
      b'\'' => self.character(),
      b'0'..=b'9' => self.number(),
      b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

      // Brackets + Separators
      b'(' => (TokenKind::LeftParen, 1),
      b')' => (TokenKind::RightParen, 1),
      b'[' => (TokenKind::LeftSquare, 1),
      b']' => (TokenKind::RightSquare, 1),
      b'{' => (TokenKind::LeftCurly, 1),
      b'}' => (TokenKind::RightCurly, 1),
      b',' => (TokenKind::Comma, 1),

      // Lambdas, either a backslash or a lambda glyph
      b'\\' => (TokenKind::Backslash, 1),
      0xCE if next_character == Some(0xBB) => (TokenKind::Backslash, 2),

      // Operators, with the reserved symbols split out
      b'+' | b'-' | b'*' | b'/' | b'=' | b'.' | b'<' | b'>' | b':' | b'&' | b'|' | b'^' | b'?'
      | b'%' | b'!' => self.operator(),

      // Unknown character
      x if (x & 0b1111_0000) == 0b1111_0000 => (TokenKind::Unknown, 4),
      x if (x & 0b1110_0000) == 0b1110_0000 => (TokenKind::Unknown, 3),
      x if (x & 0b1100_0000) == 0b1100_0000 => (TokenKind::Unknown, 2),
      _ => (TokenKind::Unknown, 1),
    }
  }

  /// Skip to the end of a line comment (a newline)
  fn line_comment(&self) -> (TokenKind, usize) {
    let length = self.source[self.position..]
      .iter()
      .take_while(|c| **c != b'\n')
      .count();

    (TokenKind::LineComment, length)
  }

  /// Go to the end of a block comment, tracking nested `{- -}` pairs
  fn block_comment(&self) -> (TokenKind, usize) {
    let mut position = self.position + 2;
    let mut depth = 1_usize;

    while !self.is_end(position + 1) {
      match (self.source[position], self.source[position + 1]) {
        (b'{', b'-') => {
          depth += 1;
          position += 2;
        }
        (b'-', b'}') => {
          depth -= 1;
          position += 2;
          if depth == 0 {
            return (TokenKind::BlockComment, position - self.position);
          }
        }
        _ => position += 1,
      }
    }

    (TokenKind::UnterminatedComment, self.source.len() - self.position)
  }

  /// Go to the end of a `[glsl| ... |]` shader block
  fn shader(&self) -> (TokenKind, usize) {
    let mut position = self.position + 6;

    while !self.is_end(position + 1) {
      if self.source[position] == b'|' && self.source[position + 1] == b']' {
        return (TokenKind::Shader, position + 2 - self.position);
      }
      position += 1;
    }

    (TokenKind::UnterminatedShader, self.source.len() - self.position)
  }

  /// Go to the end of a string token, the closing quote
  ///
  /// Both plain `"..."` strings and `"""..."""` strings are recognised
  fn string(&self) -> (TokenKind, usize) {
    if self.source[self.position..].starts_with(b"\"\"\"") {
      return self.triple_quoted_string();
    }

    let mut position = self.position + 1;
    loop {
      // An escape at the end of input can put `position` past the buffer
      if self.is_end(position) || self.source[position] == b'\n' {
        break (
          TokenKind::UnterminatedString,
          position.min(self.source.len()) - self.position,
        );
      } else if self.source[position] == b'\\' {
        position += 2;
      } else if self.source[position] == b'"' {
        break (TokenKind::String, position - self.position + 1);
      } else {
        position += 1;
      }
    }
  }

  /// Go to the end of a `"""` string, which may span multiple lines
  fn triple_quoted_string(&self) -> (TokenKind, usize) {
    let mut position = self.position + 3;

    while !self.is_end(position) {
      if self.source[position] == b'\\' {
        position += 2;
      } else if self.source[position..].starts_with(b"\"\"\"") {
        return (TokenKind::String, position + 3 - self.position);
      } else {
        position += 1;
      }
    }

    (TokenKind::UnterminatedString, self.source.len() - self.position)
  }

  /// Go to the end of a character literal
  fn character(&self) -> (TokenKind, usize) {
    let mut position = self.position + 1;

    if self.is_end(position) {
      return (TokenKind::UnterminatedChar, 1);
    }

    if self.source[position] == b'\\' {
      position += 2;
    } else {
      position += utf8_length(self.source[position]);
    }

    if !self.is_end(position) && self.source[position] == b'\'' {
      (TokenKind::Char, position + 1 - self.position)
    } else {
      (
        TokenKind::UnterminatedChar,
        position.min(self.source.len()) - self.position,
      )
    }
  }

  /// Get a number token, either decimal (with possible fraction and
  /// exponent) or hexadecimal
  fn number(&self) -> (TokenKind, usize) {
    let mut position = self.position;

    // Hexadecimal
    if self.source[position] == b'0'
      && matches!(self.source.get(position + 1), Some(b'x' | b'X'))
      && matches!(self.source.get(position + 2), Some(c) if c.is_ascii_hexdigit())
    {
      position += 2;
      position += self.source[position..]
        .iter()
        .take_while(|c| c.is_ascii_hexdigit())
        .count();
      return (TokenKind::Number, position - self.position);
    }

    // Match numbers before the decimal point
    position += self.source[position..]
      .iter()
      .take_while(|c| c.is_ascii_digit())
      .count();

    // Match a decimal point followed by more digits
    if !self.is_end(position + 1)
      && self.source[position] == b'.'
      && self.source[position + 1].is_ascii_digit()
    {
      position += 1;
      position += self.source[position..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    }

    // Match an exponent
    if matches!(self.source.get(position), Some(b'e' | b'E')) {
      let mut exponent = position + 1;
      if matches!(self.source.get(exponent), Some(b'+' | b'-')) {
        exponent += 1;
      }
      if matches!(self.source.get(exponent), Some(c) if c.is_ascii_digit()) {
        position = exponent;
        position += self.source[position..]
          .iter()
          .take_while(|c| c.is_ascii_digit())
          .count();
      }
    }

    (TokenKind::Number, position - self.position)
  }

  /// Get an identifier token, a sequence of `[a-zA-Z0-9_']`
  fn identifier(&self) -> (TokenKind, usize) {
    let length = self.source[self.position..]
      .iter()
      .take_while(|c| c.is_ascii_alphanumeric() || **c == b'_' || **c == b'\'')
      .count();

    (self.identifier_type(length), length)
  }

  /// Determines the type of the identifier, is it a keyword, an uppercase
  /// identifier, a lowercase identifier, or a lone underscore
  fn identifier_type(&self, length: usize) -> TokenKind {
    match self.source[self.position] {
      b'c' if self.is_keyword(length, "case") => TokenKind::Case,
      b'e' if self.is_keyword(length, "else") => TokenKind::Else,
      b'i' if self.is_keyword(length, "if") => TokenKind::If,
      b'i' if self.is_keyword(length, "in") => TokenKind::In,
      b'l' if self.is_keyword(length, "let") => TokenKind::Let,
      b'o' if self.is_keyword(length, "of") => TokenKind::Of,
      b't' if self.is_keyword(length, "then") => TokenKind::Then,
      b'A'..=b'Z' => TokenKind::UpperIdentifier,
      b'_' if length == 1 => TokenKind::Underscore,
      _ => TokenKind::LowerIdentifier,
    }
  }

  /// Checks if the source of the current token is equal to a keyword
  fn is_keyword(&self, length: usize, keyword: &'static str) -> bool {
    let end = self.position + length;
    &self.source[self.position..end] == keyword.as_bytes()
  }

  /// Get a run of operator symbols, splitting out the reserved symbols
  fn operator(&self) -> (TokenKind, usize) {
    let length = self.source[self.position..]
      .iter()
      .take_while(|c| {
        matches!(
          c,
          b'+' | b'-'
            | b'*'
            | b'/'
            | b'='
            | b'.'
            | b'<'
            | b'>'
            | b':'
            | b'&'
            | b'|'
            | b'^'
            | b'?'
            | b'%'
            | b'!'
        )
      })
      .count();

    let kind = match &self.source[self.position..self.position + length] {
      b"=" => TokenKind::Equals,
      b"->" => TokenKind::RightArrow,
      b":" => TokenKind::Colon,
      b"|" => TokenKind::Pipe,
      b"." => TokenKind::Dot,
      b".." => TokenKind::DotDot,
      _ => TokenKind::Operator,
    };

    (kind, length)
  }
}
impl Iterator for Tokeniser<'_> {
  type Item = Token;

  fn next(&mut self) -> Option<Self::Item> {
    if self.finished {
      return None;
    }

    self.skip_whitespace();

    #[allow(clippy::cast_possible_truncation, reason = "source.len() < u32::MAX")]
    if self.is_end(self.position) {
      self.finished = true;
      return Some(Token {
        kind: TokenKind::EndOfFile,
        start: self.position as u32,
        length: 0,
        line: self.line,
        column: (self.position - self.line_start + 1) as u32,
      });
    }

    let (kind, length) = self.get_next_token();
    let start = self.position;
    let line = self.line;
    #[allow(clippy::cast_possible_truncation, reason = "source.len() < u32::MAX")]
    let column = (start - self.line_start + 1) as u32;
    self.advance_over(length);

    Some(Token {
      kind,
      start: u32::try_from(start).unwrap_or(u32::MAX),
      length: u32::try_from(length).unwrap_or(u32::MAX),
      line,
      column,
    })
  }
}
impl iter::FusedIterator for Tokeniser<'_> {}

/// The number of bytes in a UTF-8 character, from its leading byte
fn utf8_length(leading_byte: u8) -> usize {
  if (leading_byte & 0b1111_0000) == 0b1111_0000 {
    4
  } else if (leading_byte & 0b1110_0000) == 0b1110_0000 {
    3
  } else if (leading_byte & 0b1100_0000) == 0b1100_0000 {
    2
  } else {
    1
  }
}

/// A Token of source code, a lexeme of the language
///
/// With the type of token, the start position and length of the token in the
/// source code, and the line and column (both starting at 1) it begins at
#[derive(Clone, Copy, Debug, Default)]
pub struct Token {
  /// The type of the token
  pub kind: TokenKind,
  /// The byte index of the start of the token
  pub start: u32,
  /// The length of the token, in bytes
  pub length: u32,
  /// The line the token starts on, starting at 1
  pub line: u32,
  /// The column the token starts at, starting at 1
  pub column: u32,
}
impl Token {
  /// The location of the token
  #[must_use]
  pub fn span(self) -> Span {
    Span::new(self.start, self.start + self.length)
  }

  /// Does `other` start at the byte this token ends on?
  ///
  /// Used to tell `x.y` record access apart from `x .y` application, and a
  /// negation `-x` apart from a binary minus
  #[must_use]
  pub fn adjacent_to(self, other: Token) -> bool {
    self.start + self.length == other.start
  }
}

/// The type of a token
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub enum TokenKind {
  // Brackets
  /// `(`
  LeftParen,
  /// `)`
  RightParen,
  /// `[`
  LeftSquare,
  /// `]`
  RightSquare,
  /// `{`
  LeftCurly,
  /// `}`
  RightCurly,

  // Separators + Reserved Symbols
  /// `,`
  Comma,
  /// `.`
  Dot,
  /// `..`
  DotDot,
  /// `=`
  Equals,
  /// `->`
  RightArrow,
  /// `:`
  Colon,
  /// `|`
  Pipe,
  /// `\` or `λ`
  Backslash,
  /// `_`
  Underscore,

  // Operators
  /// A run of operator symbols, e.g. `+`, `==`, `::`, `|>`
  Operator,

  // Values
  /// An identifier starting with a lowercase letter or underscore
  LowerIdentifier,
  /// An identifier starting with an uppercase letter
  UpperIdentifier,
  /// A number, decimal or hexadecimal
  Number,
  /// A string, `"..."` or `"""..."""`
  String,
  /// A character, e.g. `'a'`
  Char,
  /// A raw shader block, `[glsl| ... |]`
  Shader,

  // Keywords
  /// `case`
  Case,
  /// `else`
  Else,
  /// `if`
  If,
  /// `in`
  In,
  /// `let`
  Let,
  /// `of`
  Of,
  /// `then`
  Then,

  // Comments
  /// A comment from `--` to the end of the line
  LineComment,
  /// A comment between `{-` and `-}`, possibly nested
  BlockComment,

  /// A token to indicate the end of the file
  EndOfFile,

  // Error
  /// An unknown character, not known to fit in a [`TokenKind`]
  #[default]
  Unknown,
  /// A string missing its closing quote
  UnterminatedString,
  /// A character literal missing its closing quote
  UnterminatedChar,
  /// A block comment missing its closing `-}`
  UnterminatedComment,
  /// A shader block missing its closing `|]`
  UnterminatedShader,
}
impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      // Brackets
      Self::LeftParen => write!(f, "("),
      Self::RightParen => write!(f, ")"),
      Self::LeftSquare => write!(f, "["),
      Self::RightSquare => write!(f, "]"),
      Self::LeftCurly => write!(f, "{{"),
      Self::RightCurly => write!(f, "}}"),

      // Separators + Reserved Symbols
      Self::Comma => write!(f, ","),
      Self::Dot => write!(f, "."),
      Self::DotDot => write!(f, ".."),
      Self::Equals => write!(f, "="),
      Self::RightArrow => write!(f, "->"),
      Self::Colon => write!(f, ":"),
      Self::Pipe => write!(f, "|"),
      Self::Backslash => write!(f, "\\"),
      Self::Underscore => write!(f, "_"),

      // Operators
      Self::Operator => write!(f, "Operator"),

      // Values
      Self::LowerIdentifier | Self::UpperIdentifier => write!(f, "Identifier"),
      Self::Number => write!(f, "Number"),
      Self::String => write!(f, "String"),
      Self::Char => write!(f, "Character"),
      Self::Shader => write!(f, "Shader Block"),

      // Keywords
      Self::Case => write!(f, "case"),
      Self::Else => write!(f, "else"),
      Self::If => write!(f, "if"),
      Self::In => write!(f, "in"),
      Self::Let => write!(f, "let"),
      Self::Of => write!(f, "of"),
      Self::Then => write!(f, "then"),

      // Comments
      Self::LineComment | Self::BlockComment => write!(f, "Comment"),

      Self::EndOfFile => write!(f, "End of File"),

      // Errors
      Self::Unknown => write!(f, "Unknown Character"),
      Self::UnterminatedString => write!(f, "Unterminated String"),
      Self::UnterminatedChar => write!(f, "Unterminated Character"),
      Self::UnterminatedComment => write!(f, "Unterminated Comment"),
      Self::UnterminatedShader => write!(f, "Unterminated Shader Block"),
    }
  }
}
