//! Crate root: wires together the compilation pipeline.
//!
//! The stages are intentionally small and composable so they can be evolved
//! independently:
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `parser` owns all syntactic knowledge and returns the program AST.
//! - `codegen` lowers the AST into x86-64 NASM assembly, keeping a
//!   compile-time model of the runtime stack to address variables.
//! - `error` centralises the fatal diagnostics shared by the stages.

pub mod error;
pub mod parser;
pub mod tokenizer;

mod codegen;

pub use error::{CompileError, CompileResult};

/// Compile a source string into x86-64 NASM assembly.
pub fn generate_assembly(source: &str) -> CompileResult<String> {
  let tokens = tokenizer::tokenize(source)?;
  tracing::debug!(tokens = tokens.len(), "tokenized");
  let program = parser::parse(tokens)?;
  tracing::debug!(stmts = program.stmts.len(), "parsed");
  let asm = codegen::generate(&program)?;
  tracing::debug!(bytes = asm.len(), "generated assembly");
  Ok(asm)
}
