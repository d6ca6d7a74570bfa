//! Lexical analysis: hands out classified tokens one at a time.
//!
//! The lexer is pulled by the parser rather than producing a token vector up
//! front. It knows nothing about grammar beyond recognising operators,
//! literals and the reserved words. Newlines are significant and come back as
//! tokens of their own.

use std::fmt;

use tracing::trace;

use crate::error::{CompileError, CompileResult};
use crate::source::Source;

/// Sentinel returned once the cursor runs past the end of the text.
const EOF_CHAR: u8 = b'\0';

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  Eof,
  Newline,
  Number,
  Ident,
  Str,
  // Keywords.
  Label,
  Goto,
  Print,
  Input,
  Let,
  If,
  Then,
  EndIf,
  While,
  Repeat,
  EndWhile,
  // Operators.
  Eq,
  Plus,
  Minus,
  Asterisk,
  Slash,
  EqEq,
  NotEq,
  Lt,
  LtEq,
  Gt,
  GtEq,
}

impl TokenKind {
  /// Map a reserved word to its keyword kind. Matching is case-sensitive.
  pub fn keyword(text: &str) -> Option<Self> {
    let kind = match text {
      "LABEL" => Self::Label,
      "GOTO" => Self::Goto,
      "PRINT" => Self::Print,
      "INPUT" => Self::Input,
      "LET" => Self::Let,
      "IF" => Self::If,
      "THEN" => Self::Then,
      "ENDIF" => Self::EndIf,
      "WHILE" => Self::While,
      "REPEAT" => Self::Repeat,
      "ENDWHILE" => Self::EndWhile,
      _ => return None,
    };
    Some(kind)
  }

  pub fn is_comparison(self) -> bool {
    matches!(
      self,
      Self::EqEq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
    )
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Eof => "EOF",
      Self::Newline => "NEWLINE",
      Self::Number => "NUMBER",
      Self::Ident => "IDENT",
      Self::Str => "STRING",
      Self::Label => "LABEL",
      Self::Goto => "GOTO",
      Self::Print => "PRINT",
      Self::Input => "INPUT",
      Self::Let => "LET",
      Self::If => "IF",
      Self::Then => "THEN",
      Self::EndIf => "ENDIF",
      Self::While => "WHILE",
      Self::Repeat => "REPEAT",
      Self::EndWhile => "ENDWHILE",
      Self::Eq => "EQ",
      Self::Plus => "PLUS",
      Self::Minus => "MINUS",
      Self::Asterisk => "ASTERISK",
      Self::Slash => "SLASH",
      Self::EqEq => "EQEQ",
      Self::NotEq => "NOTEQ",
      Self::Lt => "LT",
      Self::LtEq => "LTEQ",
      Self::Gt => "GT",
      Self::GtEq => "GTEQ",
    }
  }
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// A classified slice of the source. String tokens carry their contents
/// without the surrounding quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
  pub text: &'a str,
  pub kind: TokenKind,
  pub loc: usize,
}

impl<'a> Token<'a> {
  pub fn new(text: &'a str, kind: TokenKind, loc: usize) -> Self {
    Self { text, kind, loc }
  }
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: &Token<'_>) -> String {
  match token.kind {
    TokenKind::Eof => "EOF".to_string(),
    TokenKind::Newline => "newline".to_string(),
    _ => token.text.to_string(),
  }
}

/// Character-level scanner over a [`Source`].
pub struct Lexer<'a> {
  source: &'a Source,
  bytes: &'a [u8],
  pos: usize,
  cur: u8,
}

impl<'a> Lexer<'a> {
  pub fn new(source: &'a Source) -> Self {
    let bytes = source.text().as_bytes();
    Self {
      source,
      bytes,
      pos: 0,
      cur: bytes.first().copied().unwrap_or(EOF_CHAR),
    }
  }

  pub fn source(&self) -> &'a Source {
    self.source
  }

  fn next_char(&mut self) {
    if self.pos < self.bytes.len() {
      self.pos += 1;
    }
    self.cur = self.bytes.get(self.pos).copied().unwrap_or(EOF_CHAR);
  }

  fn peek(&self) -> u8 {
    self.bytes.get(self.pos + 1).copied().unwrap_or(EOF_CHAR)
  }

  fn at_end(&self) -> bool {
    self.pos >= self.bytes.len()
  }

  fn skip_whitespace(&mut self) {
    while matches!(self.cur, b' ' | b'\t' | b'\r') {
      self.next_char();
    }
  }

  fn skip_comment(&mut self) {
    if self.cur == b'#' {
      while self.cur != b'\n' && !self.at_end() {
        self.next_char();
      }
    }
  }

  fn error(&self, loc: usize, message: impl Into<String>) -> CompileError {
    CompileError::lexical(self.source, loc, message)
  }

  /// The character under the cursor, for diagnostics. Handles multi-byte
  /// characters so messages never show a split code point.
  fn current_char(&self) -> char {
    self.source.text()[self.pos..].chars().next().unwrap_or('\0')
  }

  fn text(&self, start: usize, end: usize) -> &'a str {
    &self.source.text()[start..end]
  }

  /// Produce the next token. Keeps returning `Eof` once the input is
  /// exhausted.
  pub fn next_token(&mut self) -> CompileResult<Token<'a>> {
    self.skip_whitespace();
    self.skip_comment();

    let start = self.pos;
    if self.at_end() {
      return Ok(Token::new("", TokenKind::Eof, start));
    }

    let token = match self.cur {
      b'+' => self.single(TokenKind::Plus),
      b'-' => self.single(TokenKind::Minus),
      b'*' => self.single(TokenKind::Asterisk),
      b'/' => self.single(TokenKind::Slash),
      b'\n' => self.single(TokenKind::Newline),
      b'=' => self.maybe_two(TokenKind::Eq, TokenKind::EqEq),
      b'>' => self.maybe_two(TokenKind::Gt, TokenKind::GtEq),
      b'<' => self.maybe_two(TokenKind::Lt, TokenKind::LtEq),
      b'!' => {
        if self.peek() != b'=' {
          let got = match self.peek() {
            EOF_CHAR | b'\n' => String::new(),
            c => (c as char).to_string(),
          };
          return Err(self.error(start, format!("expected !=, got !{got}")));
        }
        self.next_char();
        self.next_char();
        Token::new(self.text(start, self.pos), TokenKind::NotEq, start)
      }
      b'"' => self.string()?,
      c if c.is_ascii_digit() => self.number()?,
      c if c.is_ascii_alphabetic() => self.ident(),
      _ => {
        let c = self.current_char();
        return Err(self.error(start, format!("unknown token: {c:?}")));
      }
    };

    trace!(kind = %token.kind, text = token.text, "token");
    Ok(token)
  }

  fn single(&mut self, kind: TokenKind) -> Token<'a> {
    let start = self.pos;
    self.next_char();
    Token::new(self.text(start, self.pos), kind, start)
  }

  /// One-character operator, or its two-character form when followed by `=`.
  fn maybe_two(&mut self, one: TokenKind, two: TokenKind) -> Token<'a> {
    if self.peek() != b'=' {
      return self.single(one);
    }
    let start = self.pos;
    self.next_char();
    self.next_char();
    Token::new(self.text(start, self.pos), two, start)
  }

  fn string(&mut self) -> CompileResult<Token<'a>> {
    let open = self.pos;
    self.next_char();
    let start = self.pos;

    while self.cur != b'"' {
      if self.at_end() {
        return Err(self.error(open, "unterminated string literal"));
      }
      // The contents are pasted into a printf format string.
      if matches!(self.cur, b'\r' | b'\n' | b'\t' | b'\\' | b'%') {
        let c = self.cur as char;
        return Err(self.error(self.pos, format!("illegal character in string: {c:?}")));
      }
      self.next_char();
    }

    let text = self.text(start, self.pos);
    self.next_char();
    Ok(Token::new(text, TokenKind::Str, open))
  }

  fn number(&mut self) -> CompileResult<Token<'a>> {
    let start = self.pos;
    while self.cur.is_ascii_digit() {
      self.next_char();
    }

    if self.cur == b'.' {
      self.next_char();
      if !self.cur.is_ascii_digit() {
        let got = match self.cur {
          EOF_CHAR | b'\n' => "end of line".to_string(),
          _ => format!("{:?}", self.current_char()),
        };
        return Err(self.error(self.pos, format!("illegal character in number: {got}")));
      }
      while self.cur.is_ascii_digit() {
        self.next_char();
      }
    }

    Ok(Token::new(self.text(start, self.pos), TokenKind::Number, start))
  }

  fn ident(&mut self) -> Token<'a> {
    let start = self.pos;
    while self.cur.is_ascii_alphanumeric() {
      self.next_char();
    }
    let text = self.text(start, self.pos);
    let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Ident);
    Token::new(text, kind, start)
  }
}

/// Lex the whole source into a vector terminated by an `Eof` token.
pub fn tokenize(source: &Source) -> CompileResult<Vec<Token<'_>>> {
  let mut lexer = Lexer::new(source);
  let mut tokens = Vec::new();
  loop {
    let token = lexer.next_token()?;
    let done = token.kind == TokenKind::Eof;
    tokens.push(token);
    if done {
      return Ok(tokens);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ErrorKind;
  use pretty_assertions::assert_eq;

  fn kinds(text: &str) -> Vec<TokenKind> {
    let source = Source::new("test.tt", text);
    tokenize(&source)
      .unwrap()
      .into_iter()
      .map(|token| token.kind)
      .collect()
  }

  fn lex_error(text: &str) -> CompileError {
    let source = Source::new("test.tt", text);
    tokenize(&source).unwrap_err()
  }

  #[test]
  fn classifies_operators() {
    use TokenKind::*;
    assert_eq!(
      kinds("+ - * / = == != < <= > >="),
      vec![
        Plus, Minus, Asterisk, Slash, Eq, EqEq, NotEq, Lt, LtEq, Gt, GtEq, Newline, Eof
      ]
    );
  }

  #[test]
  fn keywords_are_case_sensitive() {
    use TokenKind::*;
    assert_eq!(
      kinds("LET let Let WHILE ENDWHILE2"),
      vec![Let, Ident, Ident, While, Ident, Newline, Eof]
    );
  }

  #[test]
  fn token_text_is_a_source_slice() {
    let source = Source::new("test.tt", "LET foo1 = 12.5");
    let tokens = tokenize(&source).unwrap();
    let texts: Vec<&str> = tokens.iter().map(|token| token.text).collect();
    assert_eq!(texts, vec!["LET", "foo1", "=", "12.5", "\n", ""]);
    assert_eq!(tokens[1].loc, 4);
  }

  #[test]
  fn strings_drop_their_quotes() {
    let source = Source::new("test.tt", "PRINT \"hello, world!\"");
    let tokens = tokenize(&source).unwrap();
    assert_eq!(tokens[1].kind, TokenKind::Str);
    assert_eq!(tokens[1].text, "hello, world!");
    assert_eq!(describe_token(&tokens[1]), "hello, world!");
    assert_eq!(describe_token(&tokens[2]), "newline");
  }

  #[test]
  fn skips_whitespace_and_comments() {
    use TokenKind::*;
    assert_eq!(
      kinds("# a comment\n\t PRINT 1 \r # trailing\n"),
      vec![Newline, Print, Number, Newline, Newline, Eof]
    );
  }

  #[test]
  fn eof_is_idempotent() {
    let source = Source::new("test.tt", "");
    let mut lexer = Lexer::new(&source);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Newline);
    for _ in 0..3 {
      assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
  }

  #[test]
  fn rejects_lone_bang() {
    let err = lex_error("IF a ! b");
    assert_eq!(err.kind(), ErrorKind::Lexical);
    assert_eq!(err.message(), Some("expected !=, got ! "));
  }

  #[test]
  fn rejects_special_characters_in_strings() {
    for text in ["\"50%\"", "\"a\\b\"", "\"tab\there\"", "\"cr\rhere\"", "\"two\nlines\""] {
      let err = lex_error(text);
      assert_eq!(err.kind(), ErrorKind::Lexical, "{text:?}");
      assert!(
        err.message().unwrap().starts_with("illegal character in string"),
        "{text:?}"
      );
    }
  }

  #[test]
  fn rejects_unterminated_string() {
    let err = lex_error("PRINT \"never closed");
    assert_eq!(err.kind(), ErrorKind::Lexical);
  }

  #[test]
  fn rejects_trailing_decimal_point() {
    let err = lex_error("LET a = 12.");
    assert_eq!(err.kind(), ErrorKind::Lexical);
    assert_eq!(err.message(), Some("illegal character in number: end of line"));

    let err = lex_error("12.x");
    assert_eq!(err.message(), Some("illegal character in number: 'x'"));
  }

  #[test]
  fn rejects_unknown_characters() {
    let err = lex_error("LET a = (1)");
    assert_eq!(err.message(), Some("unknown token: '('"));
    let pos = err.position().unwrap();
    assert_eq!((pos.line, pos.column), (1, 9));

    let err = lex_error("LET é = 1");
    assert_eq!(err.message(), Some("unknown token: 'é'"));
  }
}
