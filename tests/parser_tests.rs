use lithc::parser::{self, BinOp, Expr, IfPred, Stmt, Term};
use lithc::tokenizer;

fn parse(source: &str) -> Vec<Stmt> {
  let tokens = tokenizer::tokenize(source).expect("lex should succeed");
  parser::parse(tokens).expect("parse should succeed").stmts
}

/// Parse a bare expression by wrapping it into an exit statement.
fn parse_expr(source: &str) -> Expr {
  match parse(&format!("exit({source});")).remove(0) {
    Stmt::Exit(expr) => expr,
    other => panic!("expected exit statement, got {other:?}"),
  }
}

fn binary(expr: &Expr) -> (BinOp, &Expr, &Expr) {
  match expr {
    Expr::Binary { op, lhs, rhs } => (*op, lhs, rhs),
    other => panic!("expected binary expression, got {other:?}"),
  }
}

fn int_value(expr: &Expr) -> &str {
  match expr {
    Expr::Term(Term::IntLit(token)) => token.text.as_deref().unwrap_or(""),
    other => panic!("expected int literal, got {other:?}"),
  }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
  let expr = parse_expr("1 + 2 * 3");
  let (op, lhs, rhs) = binary(&expr);
  assert_eq!(op, BinOp::Add);
  assert_eq!(int_value(lhs), "1");
  let (inner, l, r) = binary(rhs);
  assert_eq!(inner, BinOp::Mul);
  assert_eq!(int_value(l), "2");
  assert_eq!(int_value(r), "3");
}

#[test]
fn subtraction_is_left_associative() {
  let expr = parse_expr("1 - 2 - 3");
  let (op, lhs, rhs) = binary(&expr);
  assert_eq!(op, BinOp::Sub);
  assert_eq!(int_value(rhs), "3");
  let (inner, l, r) = binary(lhs);
  assert_eq!(inner, BinOp::Sub);
  assert_eq!(int_value(l), "1");
  assert_eq!(int_value(r), "2");
}

#[test]
fn parentheses_override_precedence() {
  let expr = parse_expr("(1 + 2) * 3");
  let (op, lhs, rhs) = binary(&expr);
  assert_eq!(op, BinOp::Mul);
  assert_eq!(int_value(rhs), "3");
  match lhs {
    Expr::Term(Term::Paren(inner)) => {
      let (inner_op, ..) = binary(inner);
      assert_eq!(inner_op, BinOp::Add);
    }
    other => panic!("expected parenthesised term, got {other:?}"),
  }
}

#[test]
fn unary_minus_binds_tighter_than_multiplication() {
  let expr = parse_expr("-x * 2");
  let (op, lhs, rhs) = binary(&expr);
  assert_eq!(op, BinOp::Mul);
  assert_eq!(int_value(rhs), "2");
  match lhs {
    Expr::Term(Term::Neg(term)) => match term.as_ref() {
      Term::Ident(token) => assert_eq!(token.text.as_deref(), Some("x")),
      other => panic!("expected identifier under negation, got {other:?}"),
    },
    other => panic!("expected negated term, got {other:?}"),
  }
}

#[test]
fn comparisons_share_the_additive_level() {
  // `a == b + c` folds left into `(a == b) + c`.
  let expr = parse_expr("a == b + c");
  let (op, lhs, _) = binary(&expr);
  assert_eq!(op, BinOp::Add);
  let (inner, ..) = binary(lhs);
  assert_eq!(inner, BinOp::EqEq);

  let expr = parse_expr("a < b + c");
  let (op, lhs, _) = binary(&expr);
  assert_eq!(op, BinOp::Add);
  let (inner, ..) = binary(lhs);
  assert_eq!(inner, BinOp::Lt);
}

#[test]
fn parses_all_statement_forms() {
  let stmts = parse("let x = 1; x = 2; { print(x); } if (x) { exit(x); } exit(0);");
  assert!(matches!(stmts[0], Stmt::Let { .. }));
  assert!(matches!(stmts[1], Stmt::Assign { .. }));
  assert!(matches!(stmts[2], Stmt::Scope(_)));
  assert!(matches!(stmts[3], Stmt::If { .. }));
  assert!(matches!(stmts[4], Stmt::Exit(_)));
}

#[test]
fn let_keeps_the_identifier_token() {
  let stmts = parse("let answer = 42;");
  let Stmt::Let { ident, .. } = &stmts[0] else {
    panic!("expected let statement");
  };
  assert_eq!(ident.text.as_deref(), Some("answer"));
  assert_eq!(ident.line, 1);
}

#[test]
fn if_chain_links_elif_then_else() {
  let stmts = parse("if (1) { exit(1); } elif (2) { exit(2); } else { exit(3); }");
  let Stmt::If { pred: Some(pred), .. } = &stmts[0] else {
    panic!("expected if statement with a chain");
  };
  let IfPred::Elif { pred: Some(tail), .. } = pred else {
    panic!("expected elif link");
  };
  assert!(matches!(tail.as_ref(), IfPred::Else { .. }));
}

#[test]
fn if_without_chain_has_no_pred() {
  let stmts = parse("if (1) { exit(1); }");
  assert!(matches!(stmts[0], Stmt::If { pred: None, .. }));
}

#[test]
fn nested_scopes_nest_in_the_tree() {
  let stmts = parse("{ { exit(0); } }");
  let Stmt::Scope(outer) = &stmts[0] else {
    panic!("expected scope statement");
  };
  assert!(matches!(outer.stmts[0], Stmt::Scope(_)));
}

#[test]
fn reports_missing_semicolon_with_line_number() {
  let tokens = tokenizer::tokenize("let x = 1;\nexit(x)").expect("lex should succeed");
  let err = parser::parse(tokens).expect_err("parse should fail");
  assert_eq!(err.to_string(), "[Parse Error] Expected `;` on line 2");
}

#[test]
fn reports_missing_expression() {
  let tokens = tokenizer::tokenize("exit();").expect("lex should succeed");
  let err = parser::parse(tokens).expect_err("parse should fail");
  assert_eq!(err.to_string(), "[Parse Error] Expected expression on line 1");
}

#[test]
fn reports_missing_close_paren() {
  let tokens = tokenizer::tokenize("exit(1;").expect("lex should succeed");
  let err = parser::parse(tokens).expect_err("parse should fail");
  assert_eq!(err.to_string(), "[Parse Error] Expected `)` on line 1");
}

#[test]
fn rejects_stray_tokens_between_statements() {
  let tokens = tokenizer::tokenize("exit(0); ;").expect("lex should succeed");
  let err = parser::parse(tokens).expect_err("parse should fail");
  assert_eq!(err.to_string(), "[Parse Error] Expected statement on line 1");
}

#[test]
fn requires_scope_after_if_condition() {
  let tokens = tokenizer::tokenize("if (1) exit(0);").expect("lex should succeed");
  let err = parser::parse(tokens).expect_err("parse should fail");
  assert_eq!(err.to_string(), "[Parse Error] Expected scope on line 1");
}

#[test]
fn requires_term_after_unary_minus() {
  let tokens = tokenizer::tokenize("exit(- );").expect("lex should succeed");
  let err = parser::parse(tokens).expect_err("parse should fail");
  assert_eq!(
    err.to_string(),
    "[Parse Error] Expected term after unary '-' on line 1"
  );
}

#[test]
fn missing_operand_mid_expression_is_reported() {
  let tokens = tokenizer::tokenize("exit(1 +\n);").expect("lex should succeed");
  let err = parser::parse(tokens).expect_err("parse should fail");
  assert_eq!(err.to_string(), "[Parse Error] Expected expression on line 1");
}

#[test]
fn empty_input_parses_to_an_empty_program() {
  let tokens = tokenizer::tokenize("").expect("lex should succeed");
  let program = parser::parse(tokens).expect("parse should succeed");
  assert!(program.stmts.is_empty());
}
