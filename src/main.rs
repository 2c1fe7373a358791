//! Command-line driver: compile a source file, then assemble and link it.
//!
//! Compiler diagnostics print verbatim on stderr with a non-zero exit;
//! driver failures (unreadable input, missing or failing toolchain) carry
//! context instead.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{self, Command};

use anyhow::{Context, Result, bail};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(about, version)]
struct Args {
  /// Source file to compile.
  path: PathBuf,

  /// Base name for the emitted artifacts: `<BASE>.asm`, `<BASE>.o`, `<BASE>`.
  #[arg(short, long, default_value = "out")]
  output: PathBuf,

  /// Stop after writing the assembly file.
  #[arg(long)]
  no_link: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let args = Args::parse();
  let source = fs::read_to_string(&args.path)
    .with_context(|| format!("could not read file: {}", args.path.display()))?;

  let asm = match lithc::generate_assembly(&source) {
    Ok(asm) => asm,
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  };

  let asm_path = args.output.with_extension("asm");
  fs::write(&asm_path, &asm)
    .with_context(|| format!("could not write {}", asm_path.display()))?;

  if !args.no_link {
    assemble_and_link(&asm_path, &args.output)?;
  }

  Ok(())
}

/// Assemble with nasm and link with ld, checking each exit status.
fn assemble_and_link(asm_path: &Path, out_exe: &Path) -> Result<()> {
  let obj_path = out_exe.with_extension("o");

  let status = Command::new("nasm")
    .arg("-felf64")
    .arg(asm_path)
    .arg("-o")
    .arg(&obj_path)
    .status()
    .context("failed to run nasm")?;
  if !status.success() {
    bail!("nasm failed on {}", asm_path.display());
  }

  let status = Command::new("ld")
    .arg(&obj_path)
    .arg("-o")
    .arg(out_exe)
    .status()
    .context("failed to run ld")?;
  if !status.success() {
    bail!("ld failed on {}", obj_path.display());
  }

  Ok(())
}
