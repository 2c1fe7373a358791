//! Recursive-descent parser producing the program AST.
//!
//! Statements are dispatched on up to three tokens of lookahead; binary
//! expressions use precedence climbing, with the comparison operators
//! deliberately sharing the additive level. Left associativity falls out of
//! raising the minimum precedence by one on each recursion.

use crate::error::{CompileError, CompileResult, ParseSnafu};
use crate::tokenizer::{Token, TokenKind, describe};

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
  Add,
  Sub,
  Mul,
  Div,
  Gt,
  Ge,
  Lt,
  Le,
  EqEq,
}

/// Primary expression: the operand level of the grammar.
#[derive(Debug, Clone)]
pub enum Term {
  IntLit(Token),
  Ident(Token),
  Paren(Box<Expr>),
  Neg(Box<Term>),
}

/// Expression tree: a term or a binary node over two sub-expressions.
#[derive(Debug, Clone)]
pub enum Expr {
  Term(Term),
  Binary {
    op: BinOp,
    lhs: Box<Expr>,
    rhs: Box<Expr>,
  },
}

impl Expr {
  pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }
}

/// Brace-delimited statement sequence.
#[derive(Debug, Clone)]
pub struct Scope {
  pub stmts: Vec<Stmt>,
}

/// Tail of an if-chain: an `elif` link or the terminating `else`.
#[derive(Debug, Clone)]
pub enum IfPred {
  Elif {
    cond: Expr,
    body: Scope,
    pred: Option<Box<IfPred>>,
  },
  Else {
    body: Scope,
  },
}

/// Statements of the language.
#[derive(Debug, Clone)]
pub enum Stmt {
  Exit(Expr),
  Let { ident: Token, expr: Expr },
  Assign { ident: Token, expr: Expr },
  Scope(Scope),
  If {
    cond: Expr,
    body: Scope,
    pred: Option<IfPred>,
  },
  Print(Expr),
}

/// Root node: the ordered statement list of one source file.
#[derive(Debug, Clone)]
pub struct Program {
  pub stmts: Vec<Stmt>,
}

/// Precedence level of a binary operator token, or `None` when the token is
/// not one. Comparisons sit on the additive level.
fn binary_precedence(kind: TokenKind) -> Option<u8> {
  match kind {
    TokenKind::Plus
    | TokenKind::Minus
    | TokenKind::Gt
    | TokenKind::Ge
    | TokenKind::Lt
    | TokenKind::Le
    | TokenKind::EqEq => Some(0),
    TokenKind::Star | TokenKind::Slash => Some(1),
    _ => None,
  }
}

fn binary_op(kind: TokenKind) -> BinOp {
  match kind {
    TokenKind::Plus => BinOp::Add,
    TokenKind::Minus => BinOp::Sub,
    TokenKind::Star => BinOp::Mul,
    TokenKind::Slash => BinOp::Div,
    TokenKind::Gt => BinOp::Gt,
    TokenKind::Ge => BinOp::Ge,
    TokenKind::Lt => BinOp::Lt,
    TokenKind::Le => BinOp::Le,
    TokenKind::EqEq => BinOp::EqEq,
    _ => unreachable!("not a binary operator"),
  }
}

/// Parse a full program; every token must be consumed.
pub fn parse(tokens: Vec<Token>) -> CompileResult<Program> {
  let mut stream = TokenStream::new(tokens);
  let mut stmts = Vec::new();

  while stream.peek(0).is_some() {
    match parse_stmt(&mut stream)? {
      Some(stmt) => stmts.push(stmt),
      None => return Err(stream.error_expected("statement")),
    }
  }

  Ok(Program { stmts })
}

// ----- Statement parsing -----
fn parse_stmt(stream: &mut TokenStream) -> CompileResult<Option<Stmt>> {
  if stream.peek_kind(0) == Some(TokenKind::Exit)
    && stream.peek_kind(1) == Some(TokenKind::OpenParen)
  {
    stream.advance();
    stream.advance();
    let expr = require_expr(stream)?;
    stream.expect(TokenKind::CloseParen)?;
    stream.expect(TokenKind::Semi)?;
    return Ok(Some(Stmt::Exit(expr)));
  }

  if stream.peek_kind(0) == Some(TokenKind::Let)
    && stream.peek_kind(1) == Some(TokenKind::Ident)
    && stream.peek_kind(2) == Some(TokenKind::Eq)
  {
    stream.advance();
    let ident = stream.advance();
    stream.advance();
    let expr = require_expr(stream)?;
    stream.expect(TokenKind::Semi)?;
    return Ok(Some(Stmt::Let { ident, expr }));
  }

  if stream.peek_kind(0) == Some(TokenKind::Ident) && stream.peek_kind(1) == Some(TokenKind::Eq) {
    let ident = stream.advance();
    stream.advance();
    let expr = require_expr(stream)?;
    stream.expect(TokenKind::Semi)?;
    return Ok(Some(Stmt::Assign { ident, expr }));
  }

  if stream.peek_kind(0) == Some(TokenKind::OpenCurly) {
    let Some(scope) = parse_scope(stream)? else {
      return Err(stream.error_expected("scope"));
    };
    return Ok(Some(Stmt::Scope(scope)));
  }

  if stream.try_consume(TokenKind::If) {
    stream.expect(TokenKind::OpenParen)?;
    let cond = require_expr(stream)?;
    stream.expect(TokenKind::CloseParen)?;
    let Some(body) = parse_scope(stream)? else {
      return Err(stream.error_expected("scope"));
    };
    let pred = parse_if_pred(stream)?;
    return Ok(Some(Stmt::If { cond, body, pred }));
  }

  if stream.peek_kind(0) == Some(TokenKind::Print)
    && stream.peek_kind(1) == Some(TokenKind::OpenParen)
  {
    stream.advance();
    stream.advance();
    let expr = require_expr(stream)?;
    stream.expect(TokenKind::CloseParen)?;
    stream.expect(TokenKind::Semi)?;
    return Ok(Some(Stmt::Print(expr)));
  }

  Ok(None)
}

fn parse_scope(stream: &mut TokenStream) -> CompileResult<Option<Scope>> {
  if !stream.try_consume(TokenKind::OpenCurly) {
    return Ok(None);
  }
  let mut stmts = Vec::new();
  while let Some(stmt) = parse_stmt(stream)? {
    stmts.push(stmt);
  }
  stream.expect(TokenKind::CloseCurly)?;
  Ok(Some(Scope { stmts }))
}

fn parse_if_pred(stream: &mut TokenStream) -> CompileResult<Option<IfPred>> {
  if stream.try_consume(TokenKind::Elif) {
    stream.expect(TokenKind::OpenParen)?;
    let cond = require_expr(stream)?;
    stream.expect(TokenKind::CloseParen)?;
    let Some(body) = parse_scope(stream)? else {
      return Err(stream.error_expected("scope"));
    };
    let pred = parse_if_pred(stream)?.map(Box::new);
    return Ok(Some(IfPred::Elif { cond, body, pred }));
  }

  if stream.try_consume(TokenKind::Else) {
    let Some(body) = parse_scope(stream)? else {
      return Err(stream.error_expected("scope"));
    };
    return Ok(Some(IfPred::Else { body }));
  }

  Ok(None)
}

// ----- Expression parsing -----
fn require_expr(stream: &mut TokenStream) -> CompileResult<Expr> {
  match parse_expr(stream, 0)? {
    Some(expr) => Ok(expr),
    None => Err(stream.error_expected("expression")),
  }
}

/// Precedence climb: parse a term, then fold binary operators whose
/// precedence is at least `min_prec` into a left-leaning tree.
fn parse_expr(stream: &mut TokenStream, min_prec: u8) -> CompileResult<Option<Expr>> {
  let Some(term) = parse_term(stream)? else {
    return Ok(None);
  };
  let mut lhs = Expr::Term(term);

  loop {
    let Some(prec) = stream.peek_kind(0).and_then(binary_precedence) else {
      break;
    };
    if prec < min_prec {
      break;
    }
    let op = binary_op(stream.advance().kind);
    let Some(rhs) = parse_expr(stream, prec + 1)? else {
      return Err(stream.error_expected("expression"));
    };
    lhs = Expr::binary(op, lhs, rhs);
  }

  Ok(Some(lhs))
}

fn parse_term(stream: &mut TokenStream) -> CompileResult<Option<Term>> {
  if let Some(int_lit) = stream.try_take(TokenKind::IntLit) {
    return Ok(Some(Term::IntLit(int_lit)));
  }

  if let Some(ident) = stream.try_take(TokenKind::Ident) {
    return Ok(Some(Term::Ident(ident)));
  }

  if stream.try_consume(TokenKind::OpenParen) {
    let expr = require_expr(stream)?;
    stream.expect(TokenKind::CloseParen)?;
    return Ok(Some(Term::Paren(Box::new(expr))));
  }

  if stream.try_consume(TokenKind::Minus) {
    let Some(term) = parse_term(stream)? else {
      return Err(stream.error_expected("term after unary '-'"));
    };
    return Ok(Some(Term::Neg(Box::new(term))));
  }

  Ok(None)
}

/// Lightweight cursor over the token vector.
struct TokenStream {
  tokens: Vec<Token>,
  pos: usize,
}

impl TokenStream {
  fn new(tokens: Vec<Token>) -> Self {
    Self { tokens, pos: 0 }
  }

  fn peek(&self, offset: usize) -> Option<&Token> {
    self.tokens.get(self.pos + offset)
  }

  fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
    self.peek(offset).map(|token| token.kind)
  }

  /// Consume the current token. Callers peek first, so running off the end
  /// is a parser bug.
  fn advance(&mut self) -> Token {
    let token = self.tokens[self.pos].clone();
    self.pos += 1;
    token
  }

  /// Consume the current token if it has the given kind.
  fn try_consume(&mut self, kind: TokenKind) -> bool {
    self.try_take(kind).is_some()
  }

  /// Consume and return the current token if it has the given kind.
  fn try_take(&mut self, kind: TokenKind) -> Option<Token> {
    if self.peek_kind(0) == Some(kind) {
      Some(self.advance())
    } else {
      None
    }
  }

  /// Consume a token of the given kind or fail with its description.
  fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
    match self.try_take(kind) {
      Some(token) => Ok(token),
      None => Err(self.error_expected(describe(kind))),
    }
  }

  /// Build the standard parse diagnostic, anchored at the line of the most
  /// recently consumed token.
  fn error_expected(&self, what: &str) -> CompileError {
    let line = if self.pos > 0 {
      self.tokens[self.pos - 1].line
    } else {
      self.tokens.first().map(|token| token.line).unwrap_or(1)
    };
    ParseSnafu { what, line }.build()
  }
}
