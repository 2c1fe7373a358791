//! Code generation: lower the AST into x86-64 NASM assembly.
//!
//! The emitter is a stack machine: every expression leaves exactly one
//! 8-byte value on the runtime stack. A compile-time shadow of that stack
//! (`stack_size`, the flat `vars` list, per-scope checkpoints) resolves
//! identifiers to `rsp`-relative slots without a frame pointer. Name checks
//! also live here: `let` over a live name and any use of an unknown name
//! are fatal.

use crate::error::{CompileResult, RedeclaredSnafu, UndeclaredSnafu};
use crate::parser::{BinOp, Expr, IfPred, Program, Scope, Stmt, Term};
use crate::tokenizer::Token;

/// Emit assembly for a whole program, including the `print_int` routine.
pub fn generate(prog: &Program) -> CompileResult<String> {
  let mut generator = Generator::new();
  generator.emit_program(prog)?;
  Ok(generator.output)
}

/// Tracked local: name plus the shadow-stack depth recorded at its `let`.
struct Var {
  name: String,
  stack_loc: usize,
}

struct Generator {
  output: String,
  stack_size: usize,
  vars: Vec<Var>,
  scopes: Vec<usize>,
  label_count: usize,
}

impl Generator {
  fn new() -> Self {
    Self {
      output: String::new(),
      stack_size: 0,
      vars: Vec::new(),
      scopes: Vec::new(),
      label_count: 0,
    }
  }

  fn emit_program(&mut self, prog: &Program) -> CompileResult<()> {
    self.output.push_str("global _start\n_start:\n");
    for stmt in &prog.stmts {
      self.emit_stmt(stmt)?;
    }

    // Fallback exit when the program never calls exit itself.
    self.output.push_str("    mov rax, 60\n");
    self.output.push_str("    mov rdi, 0\n");
    self.output.push_str("    syscall\n");

    self.output.push_str(PRINT_INT);
    Ok(())
  }

  fn emit_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
    match stmt {
      Stmt::Exit(expr) => {
        self.emit_expr(expr)?;
        self.output.push_str("    mov rax, 60\n");
        self.pop("rdi");
        self.output.push_str("    syscall\n");
      }
      Stmt::Let { ident, expr } => {
        let name = token_name(ident);
        if self.vars.iter().any(|var| var.name == name) {
          return RedeclaredSnafu { name }.fail();
        }
        // The initializer's push becomes the variable's storage slot.
        self.vars.push(Var {
          name: name.to_string(),
          stack_loc: self.stack_size,
        });
        self.emit_expr(expr)?;
      }
      Stmt::Assign { ident, expr } => {
        let name = token_name(ident);
        let Some(stack_loc) = self.lookup(name) else {
          return UndeclaredSnafu { name }.fail();
        };
        self.emit_expr(expr)?;
        self.pop("rax");
        let offset = (self.stack_size - stack_loc - 1) * 8;
        self.output.push_str(&format!("    mov [rsp + {offset}], rax\n"));
      }
      Stmt::Scope(scope) => {
        self.output.push_str("    ;; scope\n");
        self.emit_scope(scope)?;
        self.output.push_str("    ;; /scope\n");
      }
      Stmt::If { cond, body, pred } => {
        self.emit_expr(cond)?;
        self.pop("rax");
        let skip = self.create_label();
        self.output.push_str("    test rax, rax\n");
        self.output.push_str(&format!("    jz {skip}\n"));
        self.emit_scope(body)?;
        if let Some(pred) = pred {
          let end = self.create_label();
          self.output.push_str(&format!("    jmp {end}\n"));
          self.output.push_str(&format!("{skip}:\n"));
          self.emit_if_pred(pred, &end)?;
          self.output.push_str(&format!("{end}:\n"));
        } else {
          self.output.push_str(&format!("{skip}:\n"));
        }
      }
      Stmt::Print(expr) => {
        self.emit_expr(expr)?;
        self.pop("rdi");
        self.output.push_str("    call print_int\n");
      }
    }
    Ok(())
  }

  fn emit_if_pred(&mut self, pred: &IfPred, end_label: &str) -> CompileResult<()> {
    match pred {
      IfPred::Elif { cond, body, pred } => {
        self.output.push_str("    ;; elif\n");
        self.emit_expr(cond)?;
        self.pop("rax");
        let skip = self.create_label();
        self.output.push_str("    test rax, rax\n");
        self.output.push_str(&format!("    jz {skip}\n"));
        self.emit_scope(body)?;
        self.output.push_str(&format!("    jmp {end_label}\n"));
        // The skip label lands here either way: a further link continues
        // the chain, otherwise control falls through to the end label.
        self.output.push_str(&format!("{skip}:\n"));
        if let Some(pred) = pred {
          self.emit_if_pred(pred, end_label)?;
        }
      }
      IfPred::Else { body } => {
        self.emit_scope(body)?;
      }
    }
    Ok(())
  }

  /// Scoped statements: record the live-variable count on entry, then
  /// discard everything declared inside with one stack adjustment on exit.
  fn emit_scope(&mut self, scope: &Scope) -> CompileResult<()> {
    self.begin_scope();
    for stmt in &scope.stmts {
      self.emit_stmt(stmt)?;
    }
    self.end_scope();
    Ok(())
  }

  fn emit_expr(&mut self, expr: &Expr) -> CompileResult<()> {
    match expr {
      Expr::Term(term) => self.emit_term(term),
      Expr::Binary { op, lhs, rhs } => self.emit_binary(*op, lhs, rhs),
    }
  }

  fn emit_term(&mut self, term: &Term) -> CompileResult<()> {
    match term {
      Term::IntLit(token) => {
        let value = token_name(token);
        self.output.push_str(&format!("    mov rax, {value}\n"));
        self.push("rax");
        Ok(())
      }
      Term::Ident(token) => {
        let name = token_name(token);
        let Some(stack_loc) = self.lookup(name) else {
          return UndeclaredSnafu { name }.fail();
        };
        // Newer pushes sit at lower addresses, so the slot distance is the
        // number of pushes since the variable's initializer.
        let offset = (self.stack_size - stack_loc - 1) * 8;
        self.push(&format!("QWORD [rsp + {offset}]"));
        Ok(())
      }
      Term::Paren(expr) => self.emit_expr(expr),
      Term::Neg(term) => {
        self.emit_term(term)?;
        self.pop("rax");
        self.output.push_str("    neg rax\n");
        self.push("rax");
        Ok(())
      }
    }
  }

  /// Arithmetic operands are evaluated RHS first so the two pops land the
  /// LHS in `rax` and the RHS in `rbx`; comparisons evaluate LHS first and
  /// pop in the opposite order to reach the same register assignment.
  fn emit_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> CompileResult<()> {
    match op {
      BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
        self.emit_expr(rhs)?;
        self.emit_expr(lhs)?;
        self.pop("rax");
        self.pop("rbx");
        match op {
          BinOp::Add => self.output.push_str("    add rax, rbx\n"),
          BinOp::Sub => self.output.push_str("    sub rax, rbx\n"),
          BinOp::Mul => self.output.push_str("    mul rbx\n"),
          BinOp::Div => self.output.push_str("    div rbx\n"),
          _ => unreachable!(),
        }
        self.push("rax");
      }
      BinOp::Gt | BinOp::Ge | BinOp::Lt | BinOp::Le | BinOp::EqEq => {
        self.emit_expr(lhs)?;
        self.emit_expr(rhs)?;
        self.pop("rbx");
        self.pop("rax");
        let cc = match op {
          BinOp::Gt => "g",
          BinOp::Ge => "ge",
          BinOp::Lt => "l",
          BinOp::Le => "le",
          BinOp::EqEq => "e",
          _ => unreachable!(),
        };
        self.output.push_str("    cmp rax, rbx\n");
        self.output.push_str(&format!("    set{cc} al\n"));
        self.output.push_str("    movzx rax, al\n");
        self.push("rax");
      }
    }
    Ok(())
  }

  fn lookup(&self, name: &str) -> Option<usize> {
    self
      .vars
      .iter()
      .find(|var| var.name == name)
      .map(|var| var.stack_loc)
  }

  fn push(&mut self, value: &str) {
    self.output.push_str(&format!("    push {value}\n"));
    self.stack_size += 1;
  }

  fn pop(&mut self, reg: &str) {
    self.output.push_str(&format!("    pop {reg}\n"));
    self.stack_size -= 1;
  }

  fn begin_scope(&mut self) {
    self.scopes.push(self.vars.len());
  }

  fn end_scope(&mut self) {
    let checkpoint = self.scopes.pop().unwrap_or(0);
    let pop_count = self.vars.len() - checkpoint;
    self.output.push_str(&format!("    add rsp, {}\n", pop_count * 8));
    self.stack_size -= pop_count;
    self.vars.truncate(checkpoint);
  }

  fn create_label(&mut self) -> String {
    let label = format!("label{}", self.label_count);
    self.label_count += 1;
    label
  }
}

/// Text payload of an identifier or literal token. The parser only builds
/// these nodes from tokens that carry one.
fn token_name(token: &Token) -> &str {
  token.text.as_deref().unwrap_or_default()
}

/// Decimal integer printer appended to every program. Writes an optional
/// sign, converts `rdi` by repeated division by 10 into a 32-byte scratch
/// buffer filled from the high end, then writes the digits and a newline
/// with `write` syscalls.
const PRINT_INT: &str = "\
print_int:
    push rbp
    mov rbp, rsp
    sub rsp, 32
    test rdi, rdi
    jns .positive
    mov byte [rsp], '-'
    mov rax, 1
    mov rsi, rsp
    mov rdx, 1
    push rdi
    mov rdi, 1
    syscall
    pop rdi
    neg rdi
.positive:
    test rdi, rdi
    jnz .non_zero
    mov byte [rsp], '0'
    mov rsi, rsp
    mov rcx, 1
    jmp .print
.non_zero:
    mov rax, rdi
    lea rsi, [rsp + 31]
    mov rcx, 0
.convert_loop:
    xor rdx, rdx
    mov r10, 10
    div r10
    add dl, '0'
    dec rsi
    mov [rsi], dl
    inc rcx
    test rax, rax
    jnz .convert_loop
.print:
    mov rax, 1
    mov rdi, 1
    mov rdx, rcx
    syscall
    mov byte [rsp], 10
    mov rax, 1
    mov rdi, 1
    mov rsi, rsp
    mov rdx, 1
    syscall
    mov rsp, rbp
    pop rbp
    ret
";
