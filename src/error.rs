//! Shared error types used across the compilation pipeline.
//!
//! Every diagnostic is fatal: the pipeline stops at the first error and the
//! driver reports its `Display` text on stderr. The formats are fixed
//! one-liners keyed to the source line rather than a byte offset.

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

/// Fatal diagnostics produced by the tokenizer, parser, and generator.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  /// The tokenizer hit a character that starts no token.
  #[snafu(display("Invalid token"))]
  InvalidToken,

  /// The parser did not find a construct it required.
  #[snafu(display("[Parse Error] Expected {what} on line {line}"))]
  Parse { what: String, line: usize },

  /// A `let` reused a name that is already live.
  #[snafu(display("Identifier already used: {name}"))]
  Redeclared { name: String },

  /// A read or assignment referenced a name that was never declared.
  #[snafu(display("Undeclared identifier: {name}"))]
  Undeclared { name: String },
}
