use nc_compiler::ast::{BinOp, DeclKind, Expr, JumpStmt, Stmt, TranslationUnit, VarDecl};
use nc_compiler::parse;

// ── Translation unit shape ───────────────────────────────────────────────

#[test]
fn two_function_program() {
    let unit = parse_ok(
        r#"
        int add(int a, int b) { return a + b; }
        int main() { int x; x = add(3, 4); return x; }
    "#,
    );

    let names: Vec<_> = unit.functions.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["add", "main"]);

    let main = unit.function("main").unwrap();
    assert_eq!(
        main.body.var_decls,
        vec![VarDecl { name: "x".to_string(), kind: DeclKind::Local }]
    );
    assert_eq!(
        main.body.statements,
        vec![
            Stmt::Expr(Expr::binary(
                BinOp::Assign,
                var("x"),
                Expr::Call { callee: "add".to_string(), args: vec![Expr::Number(3), Expr::Number(4)] },
            )),
            Stmt::Jump(JumpStmt::Return(var("x"))),
        ]
    );
}

#[test]
fn builtins_come_first_among_prototypes() {
    let unit = parse_ok("int g(int a);\nint main() { return 0; }");
    let protos: Vec<_> = unit.prototypes.iter().map(|p| (p.name.as_str(), p.arity())).collect();
    assert_eq!(protos, vec![("printnum", 1), ("inputnum", 0), ("g", 1)]);
    assert_eq!(unit.prototypes[2].line, 1);
}

#[test]
fn parameters_are_declared_before_locals() {
    let unit = parse_ok("int f(int p, int q) { int x; array a[3]; return x; }");
    let f = &unit.functions[0];
    let vars: Vec<_> = f.body.var_decls.iter().map(|v| (v.name.as_str(), v.kind)).collect();
    assert_eq!(
        vars,
        vec![("p", DeclKind::Param), ("q", DeclKind::Param), ("x", DeclKind::Local)]
    );
    assert_eq!(f.body.array_decls.len(), 1);
    assert_eq!(f.body.array_decls[0].size, 3);
}

#[test]
fn declarations_may_interleave() {
    let unit = parse_ok("int f() { array a[1]; int x; array b[2]; int y; return 0; }");
    let body = &unit.functions[0].body;
    assert_eq!(body.var_decls.len(), 2);
    assert_eq!(body.array_decls.len(), 2);
}

#[test]
fn prototype_enables_recursion() {
    let unit = parse_ok("int f(int n);\nint f(int n) { return f(n - 1); }");
    assert_eq!(unit.functions.len(), 1);
}

#[test]
fn statements_after_return_still_parse() {
    let unit = parse_ok("int f() { return 1; return 2; }");
    assert_eq!(unit.functions[0].body.statements.len(), 2);
}

#[test]
fn null_statements() {
    let unit = parse_ok("int f() { ; ; return 0; }");
    assert_eq!(
        unit.functions[0].body.statements,
        vec![Stmt::Null, Stmt::Null, Stmt::Jump(JumpStmt::Return(Expr::Number(0)))]
    );
}

#[test]
fn comments_are_ignored() {
    let unit = parse_ok("// header\nint f() { /* body */ return 0; } // done");
    assert_eq!(unit.functions.len(), 1);
}

// ── Expressions ──────────────────────────────────────────────────────────

#[test]
fn multiplication_binds_tighter() {
    let e = return_expr("int f(int a, int b) { return a + b * 2 - 1; }");
    let expected = Expr::binary(
        BinOp::Sub,
        Expr::binary(BinOp::Add, var("a"), Expr::binary(BinOp::Mul, var("b"), Expr::Number(2))),
        Expr::Number(1),
    );
    assert_eq!(e, expected);
}

#[test]
fn division_is_left_associative() {
    let e = return_expr("int f(int a, int b) { return a / b / 2; }");
    let expected = Expr::binary(
        BinOp::Div,
        Expr::binary(BinOp::Div, var("a"), var("b")),
        Expr::Number(2),
    );
    assert_eq!(e, expected);
}

#[test]
fn parentheses_group() {
    let e = return_expr("int f(int a) { return (a + 1) * 2; }");
    let expected = Expr::binary(
        BinOp::Mul,
        Expr::binary(BinOp::Add, var("a"), Expr::Number(1)),
        Expr::Number(2),
    );
    assert_eq!(e, expected);
}

#[test]
fn negative_literal() {
    assert_eq!(return_expr("int f() { return -5; }"), Expr::Number(-5));
    assert_eq!(
        return_expr("int f(int a) { return a - -5; }"),
        Expr::binary(BinOp::Sub, var("a"), Expr::Number(-5))
    );
}

#[test]
fn assignment_as_return_value() {
    let e = return_expr("int f() { int x; return x = 4; }");
    assert_eq!(e, Expr::binary(BinOp::Assign, var("x"), Expr::Number(4)));
}

#[test]
fn nested_calls() {
    let e = return_expr("int g(int a);\nint f() { return g(g(1) + 2); }");
    let inner = Expr::Call { callee: "g".to_string(), args: vec![Expr::Number(1)] };
    let expected = Expr::Call {
        callee: "g".to_string(),
        args: vec![Expr::binary(BinOp::Add, inner, Expr::Number(2))],
    };
    assert_eq!(e, expected);
}

#[test]
fn builtin_calls() {
    let e = return_expr("int f() { return inputnum(); }");
    assert_eq!(e, Expr::Call { callee: "inputnum".to_string(), args: vec![] });
}

// ── Bounds and increments ────────────────────────────────────────────────

#[test]
fn bound_and_increment_on_array() {
    let unit = parse_ok("int f() { array h[3]; h $ 7; h inc 1; return 0; }");
    let stmts = &unit.functions[0].body.statements;
    assert_eq!(
        stmts[0],
        Stmt::Expr(Expr::binary(BinOp::Bound, Expr::Array("h".to_string()), Expr::Number(7)))
    );
    assert_eq!(
        stmts[1],
        Stmt::Expr(Expr::binary(BinOp::Inc, Expr::Array("h".to_string()), Expr::Number(1)))
    );
}

#[test]
fn bound_accepts_constant_expressions() {
    let unit = parse_ok("int f() { int x; x $ 2 * 1000 + 5; return x; }");
    let Stmt::Expr(Expr::Binary { op: BinOp::Bound, rhs, .. }) = &unit.functions[0].body.statements[0] else {
        panic!("expected a bound statement");
    };
    assert_eq!(rhs.const_value(), Some(2005));
}

#[test]
fn constant_folding_gives_up_on_division_by_zero() {
    let e = Expr::binary(BinOp::Div, Expr::Number(1), Expr::Number(0));
    assert_eq!(e.const_value(), None);
    let e = Expr::binary(BinOp::Mul, Expr::Number(i64::MAX), Expr::Number(2));
    assert_eq!(e.const_value(), None);
}

#[test]
fn inc_is_an_ordinary_name_for_scalars() {
    let unit = parse_ok("int f() { int inc; inc = 1; return inc; }");
    assert_eq!(unit.functions[0].body.var_decls[0].name, "inc");
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn parse_ok(source: &str) -> TranslationUnit {
    parse(source).unwrap_or_else(|e| panic!("{} should parse: {}", source, e))
}

/// Expression of the last `return` in the last function.
fn return_expr(source: &str) -> Expr {
    let unit = parse_ok(source);
    let func = unit.functions.last().expect("a function");
    match func.body.statements.last() {
        Some(Stmt::Jump(JumpStmt::Return(e))) => e.clone(),
        other => panic!("expected a return, got {:?}", other),
    }
}

fn var(name: &str) -> Expr {
    Expr::Variable(name.to_string())
}
