//! Lexical analysis: turns the raw source string into a vector of tokens.
//!
//! Single pass with one character of lookahead. Multi-character operators
//! are matched before their single-character prefixes, and a `-` glued
//! directly onto a digit run lexes as one signed literal rather than as an
//! operator. Every token records the 1-based line it started on.

use crate::error::{CompileResult, InvalidTokenSnafu};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Exit,
  Let,
  If,
  Elif,
  Else,
  Print,
  Ident,
  IntLit,
  Semi,
  OpenParen,
  CloseParen,
  OpenCurly,
  CloseCurly,
  Eq,
  EqEq,
  Plus,
  Star,
  Minus,
  Slash,
  Gt,
  Ge,
  Lt,
  Le,
}

/// Lexical unit: kind, source line, and the text payload carried by
/// identifiers and integer literals.
#[derive(Debug, Clone)]
pub struct Token {
  pub kind: TokenKind,
  pub line: usize,
  pub text: Option<String>,
}

impl Token {
  /// Convenience constructor to keep the `tokenize` loop readable.
  pub fn new(kind: TokenKind, line: usize) -> Self {
    Self {
      kind,
      line,
      text: None,
    }
  }

  pub fn with_text(kind: TokenKind, line: usize, text: impl Into<String>) -> Self {
    Self {
      kind,
      line,
      text: Some(text.into()),
    }
  }
}

/// Lex the input into a flat vector of tokens.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let bytes = input.as_bytes();
  let mut tokens = Vec::new();
  let mut line = 1;
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    let next = bytes.get(i + 1).copied();

    if c.is_ascii_alphabetic() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
      }
      tokens.push(match &input[start..i] {
        "exit" => Token::new(TokenKind::Exit, line),
        "let" => Token::new(TokenKind::Let, line),
        "if" => Token::new(TokenKind::If, line),
        "elif" => Token::new(TokenKind::Elif, line),
        "else" => Token::new(TokenKind::Else, line),
        "print" => Token::new(TokenKind::Print, line),
        ident => Token::with_text(TokenKind::Ident, line, ident),
      });
      continue;
    }

    // A `-` glued onto digits is part of the literal; with anything in
    // between it falls through to the operator arm below.
    if c == b'-' && next.is_some_and(|b| b.is_ascii_digit()) {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      tokens.push(Token::with_text(TokenKind::IntLit, line, &input[start..i]));
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      tokens.push(Token::with_text(TokenKind::IntLit, line, &input[start..i]));
      continue;
    }

    if c == b'/' && next == Some(b'/') {
      i += 2;
      while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
      }
      continue;
    }

    if c == b'/' && next == Some(b'*') {
      i += 2;
      while i < bytes.len() {
        if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
          i += 2;
          break;
        }
        if bytes[i] == b'\n' {
          line += 1;
        }
        i += 1;
      }
      // Hitting end-of-input before `*/` just ends the stream.
      continue;
    }

    let (kind, len) = match (c, next) {
      (b'>', Some(b'=')) => (TokenKind::Ge, 2),
      (b'<', Some(b'=')) => (TokenKind::Le, 2),
      (b'=', Some(b'=')) => (TokenKind::EqEq, 2),
      (b'(', _) => (TokenKind::OpenParen, 1),
      (b')', _) => (TokenKind::CloseParen, 1),
      (b'{', _) => (TokenKind::OpenCurly, 1),
      (b'}', _) => (TokenKind::CloseCurly, 1),
      (b';', _) => (TokenKind::Semi, 1),
      (b'=', _) => (TokenKind::Eq, 1),
      (b'+', _) => (TokenKind::Plus, 1),
      (b'*', _) => (TokenKind::Star, 1),
      (b'-', _) => (TokenKind::Minus, 1),
      (b'/', _) => (TokenKind::Slash, 1),
      (b'>', _) => (TokenKind::Gt, 1),
      (b'<', _) => (TokenKind::Lt, 1),
      (b'\n', _) => {
        line += 1;
        i += 1;
        continue;
      }
      _ if c.is_ascii_whitespace() => {
        i += 1;
        continue;
      }
      _ => return InvalidTokenSnafu.fail(),
    };
    tokens.push(Token::new(kind, line));
    i += len;
  }

  Ok(tokens)
}

/// Human-friendly token description used in parse diagnostics.
pub fn describe(kind: TokenKind) -> &'static str {
  match kind {
    TokenKind::Exit => "`exit`",
    TokenKind::Let => "`let`",
    TokenKind::If => "`if`",
    TokenKind::Elif => "`elif`",
    TokenKind::Else => "`else`",
    TokenKind::Print => "`print`",
    TokenKind::Ident => "identifier",
    TokenKind::IntLit => "int literal",
    TokenKind::Semi => "`;`",
    TokenKind::OpenParen => "`(`",
    TokenKind::CloseParen => "`)`",
    TokenKind::OpenCurly => "`{`",
    TokenKind::CloseCurly => "`}`",
    TokenKind::Eq => "`=`",
    TokenKind::EqEq => "`==`",
    TokenKind::Plus => "`+`",
    TokenKind::Star => "`*`",
    TokenKind::Minus => "`-`",
    TokenKind::Slash => "`/`",
    TokenKind::Gt => "`>`",
    TokenKind::Ge => "`>=`",
    TokenKind::Lt => "`<`",
    TokenKind::Le => "`<=`",
  }
}
