//! Recursive-descent parser that emits C while it validates.
//!
//! There is no syntax tree: every grammar rule checks its tokens, records
//! whatever semantic facts it needs in the [`ParseContext`], and writes the
//! matching C fragment to the [`Emitter`] in the same step. The grammar is
//! LL(1), so the context only ever holds the current token plus one token of
//! lookahead pulled lazily from the lexer.
//!
//! ```text
//! program    ::= {nl} {statement}
//! statement  ::= "PRINT" (expression | string) nl
//!              | "IF" comparison "THEN" nl {statement} "ENDIF" nl
//!              | "WHILE" comparison "REPEAT" nl {statement} "ENDWHILE" nl
//!              | "LABEL" ident nl
//!              | "GOTO" ident nl
//!              | "LET" ident "=" expression nl
//!              | "INPUT" ident nl
//! comparison ::= expression (("==" | "!=" | ">" | ">=" | "<" | "<=") expression)+
//! expression ::= term {("+" | "-") term}
//! term       ::= unary {("*" | "/") unary}
//! unary      ::= ["+" | "-"] primary
//! primary    ::= number | ident
//! nl         ::= NEWLINE {NEWLINE}
//! ```

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::emitter::Emitter;
use crate::error::{CompileError, CompileResult};
use crate::source::Source;
use crate::tokenizer::{Lexer, Token, TokenKind, describe_token};

/// Deepest `IF`/`WHILE` nesting accepted before the parser gives up.
pub const MAX_NESTING: usize = 256;

/// Parse `source` and return the emitter holding the generated C.
pub fn parse(source: &Source) -> CompileResult<Emitter> {
  let mut ctx = ParseContext::new(source)?;
  let mut out = Emitter::new();
  program(&mut ctx, &mut out)?;

  info!(
    variables = ctx.symbols.len(),
    labels = ctx.labels_declared.len(),
    "parsed program"
  );
  Ok(out)
}

/// Token cursor plus the name sets gathered during one compilation. The sets
/// only ever grow.
pub struct ParseContext<'a> {
  lexer: Lexer<'a>,
  cur: Token<'a>,
  peek: Token<'a>,
  symbols: HashSet<&'a str>,
  labels_declared: HashSet<&'a str>,
  /// Jump targets, keyed to the location of their first `GOTO`.
  labels_gotoed: HashMap<&'a str, usize>,
  depth: usize,
}

impl<'a> ParseContext<'a> {
  /// Prime the current and lookahead tokens.
  pub fn new(source: &'a Source) -> CompileResult<Self> {
    let mut lexer = Lexer::new(source);
    let cur = lexer.next_token()?;
    let peek = lexer.next_token()?;
    Ok(Self {
      lexer,
      cur,
      peek,
      symbols: HashSet::new(),
      labels_declared: HashSet::new(),
      labels_gotoed: HashMap::new(),
      depth: 0,
    })
  }

  fn check(&self, kind: TokenKind) -> bool {
    self.cur.kind == kind
  }

  fn advance(&mut self) -> CompileResult<()> {
    self.cur = self.peek;
    self.peek = self.lexer.next_token()?;
    Ok(())
  }

  /// Consume the current token if it has the given kind, failing otherwise.
  fn expect(&mut self, kind: TokenKind) -> CompileResult<Token<'a>> {
    if !self.check(kind) {
      let got = describe_token(&self.cur);
      return Err(self.syntax_error(format!("expected {kind}, but got \"{got}\"")));
    }
    let token = self.cur;
    self.advance()?;
    Ok(token)
  }

  fn syntax_error(&self, message: impl Into<String>) -> CompileError {
    CompileError::syntax(self.lexer.source(), self.cur.loc, message)
  }

  fn semantic_error(&self, loc: usize, message: impl Into<String>) -> CompileError {
    CompileError::semantic(self.lexer.source(), loc, message)
  }

  /// Every `GOTO` target must be declared somewhere in the program. The
  /// earliest offending jump is reported.
  fn check_goto_targets(&self) -> CompileResult<()> {
    let missing = self
      .labels_gotoed
      .iter()
      .filter(|(label, _)| !self.labels_declared.contains(*label))
      .min_by_key(|(_, loc)| **loc);

    match missing {
      Some((label, loc)) => Err(self.semantic_error(
        *loc,
        format!("attempting to GOTO undeclared label: {label}"),
      )),
      None => Ok(()),
    }
  }
}

fn program(ctx: &mut ParseContext, out: &mut Emitter) -> CompileResult<()> {
  out.header_line("#include <stdio.h>");
  out.header_line("int main(void){");

  while ctx.check(TokenKind::Newline) {
    ctx.advance()?;
  }

  while !ctx.check(TokenKind::Eof) {
    statement(ctx, out)?;
  }

  ctx.check_goto_targets()?;

  out.emit_line("return 0;");
  out.emit_line("}");
  Ok(())
}

fn statement(ctx: &mut ParseContext, out: &mut Emitter) -> CompileResult<()> {
  let token = ctx.cur;
  debug!(kind = %token.kind, offset = token.loc, "statement");

  match token.kind {
    TokenKind::Print => {
      ctx.advance()?;
      if ctx.check(TokenKind::Str) {
        out.emit_line(&format!("printf(\"{}\\n\");", ctx.cur.text));
        ctx.advance()?;
      } else {
        out.emit("printf(\"%.2f\\n\", (float)(");
        expression(ctx, out)?;
        out.emit_line("));");
      }
    }
    TokenKind::If => {
      ctx.advance()?;
      out.emit("if(");
      comparison(ctx, out)?;
      ctx.expect(TokenKind::Then)?;
      nl(ctx)?;
      out.emit_line("){");
      block(ctx, out, TokenKind::EndIf)?;
      out.emit_line("}");
    }
    TokenKind::While => {
      ctx.advance()?;
      out.emit("while(");
      comparison(ctx, out)?;
      ctx.expect(TokenKind::Repeat)?;
      nl(ctx)?;
      out.emit_line("){");
      block(ctx, out, TokenKind::EndWhile)?;
      out.emit_line("}");
    }
    TokenKind::Label => {
      ctx.advance()?;
      let name = ctx.expect(TokenKind::Ident)?;
      if !ctx.labels_declared.insert(name.text) {
        return Err(ctx.semantic_error(
          name.loc,
          format!("label already declared: {}", name.text),
        ));
      }
      debug!(label = name.text, "declared label");
      // The empty statement keeps the label valid at the end of a block.
      out.emit_line(&format!("{}:;", name.text));
    }
    TokenKind::Goto => {
      ctx.advance()?;
      let name = ctx.expect(TokenKind::Ident)?;
      ctx.labels_gotoed.entry(name.text).or_insert(name.loc);
      out.emit_line(&format!("goto {};", name.text));
    }
    TokenKind::Let => {
      ctx.advance()?;
      let name = ctx.expect(TokenKind::Ident)?;
      out.emit(&format!("{} = ", name.text));
      ctx.expect(TokenKind::Eq)?;
      // Declared only after the right-hand side, so `LET a = a` is rejected
      // when `a` is new.
      expression(ctx, out)?;
      out.emit_line(";");
      declare(ctx, out, name.text);
    }
    TokenKind::Input => {
      ctx.advance()?;
      let name = ctx.expect(TokenKind::Ident)?;
      declare(ctx, out, name.text);
      let var = name.text;
      out.emit_line(&format!("if(0 == scanf(\"%f\", &{var})) {{"));
      out.emit_line(&format!("{var} = 0;"));
      out.emit_line("scanf(\"%*s\");");
      out.emit_line("}");
    }
    _ => {
      let got = describe_token(&token);
      return Err(ctx.syntax_error(format!("invalid statement at \"{got}\"")));
    }
  }

  nl(ctx)
}

/// Record a variable, adding its declaration to the header on first sight.
fn declare<'a>(ctx: &mut ParseContext<'a>, out: &mut Emitter, name: &'a str) {
  if ctx.symbols.insert(name) {
    debug!(variable = name, "declared variable");
    out.header_line(&format!("float {name};"));
  }
}

/// Statements up to and including `terminator`.
fn block(ctx: &mut ParseContext, out: &mut Emitter, terminator: TokenKind) -> CompileResult<()> {
  ctx.depth += 1;
  if ctx.depth > MAX_NESTING {
    return Err(ctx.syntax_error(format!("blocks nested deeper than {MAX_NESTING} levels")));
  }

  while !ctx.check(terminator) {
    if ctx.check(TokenKind::Eof) {
      return Err(ctx.syntax_error(format!("expected {terminator}, but reached end of input")));
    }
    statement(ctx, out)?;
  }
  ctx.depth -= 1;
  ctx.advance()
}

fn comparison(ctx: &mut ParseContext, out: &mut Emitter) -> CompileResult<()> {
  expression(ctx, out)?;

  if !ctx.cur.kind.is_comparison() {
    let got = describe_token(&ctx.cur);
    return Err(ctx.syntax_error(format!("expected comparison operator, but got \"{got}\"")));
  }

  while ctx.cur.kind.is_comparison() {
    binary_operator(ctx, out)?;
    expression(ctx, out)?;
  }
  Ok(())
}

fn expression(ctx: &mut ParseContext, out: &mut Emitter) -> CompileResult<()> {
  term(ctx, out)?;
  while matches!(ctx.cur.kind, TokenKind::Plus | TokenKind::Minus) {
    binary_operator(ctx, out)?;
    term(ctx, out)?;
  }
  Ok(())
}

fn term(ctx: &mut ParseContext, out: &mut Emitter) -> CompileResult<()> {
  unary(ctx, out)?;
  while matches!(ctx.cur.kind, TokenKind::Asterisk | TokenKind::Slash) {
    binary_operator(ctx, out)?;
    unary(ctx, out)?;
  }
  Ok(())
}

fn unary(ctx: &mut ParseContext, out: &mut Emitter) -> CompileResult<()> {
  if matches!(ctx.cur.kind, TokenKind::Plus | TokenKind::Minus) {
    out.emit(ctx.cur.text);
    ctx.advance()?;
  }
  primary(ctx, out)
}

fn primary(ctx: &mut ParseContext, out: &mut Emitter) -> CompileResult<()> {
  let token = ctx.cur;
  match token.kind {
    TokenKind::Number => {}
    TokenKind::Ident => {
      if !ctx.symbols.contains(token.text) {
        return Err(ctx.semantic_error(
          token.loc,
          format!("referencing variable before assignment: {}", token.text),
        ));
      }
    }
    _ => {
      let got = describe_token(&token);
      return Err(ctx.syntax_error(format!("unexpected token at \"{got}\"")));
    }
  }
  match token.kind {
    TokenKind::Number => out.emit(&float_literal(token.text)),
    _ => out.emit(token.text),
  }
  ctx.advance()
}

/// Spell a numeric literal as a C floating constant, so integer division
/// and octal prefixes never apply.
fn float_literal(text: &str) -> String {
  let (whole, frac) = text.split_once('.').unwrap_or((text, "0"));
  let whole = whole.trim_start_matches('0');
  let whole = if whole.is_empty() { "0" } else { whole };
  format!("{whole}.{frac}")
}

/// Operators are copied verbatim. Surrounding spaces keep `a - -b` from
/// turning into C's decrement operator.
fn binary_operator(ctx: &mut ParseContext, out: &mut Emitter) -> CompileResult<()> {
  out.emit(&format!(" {} ", ctx.cur.text));
  ctx.advance()
}

fn nl(ctx: &mut ParseContext) -> CompileResult<()> {
  ctx.expect(TokenKind::Newline)?;
  while ctx.check(TokenKind::Newline) {
    ctx.advance()?;
  }
  Ok(())
}
