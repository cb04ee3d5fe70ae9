use nc_compiler::ir::ir_generator::CodeGenError;
use nc_compiler::ir::Module;
use nc_compiler::{compile, compile_to_ir, CompileError, CompileOptions, SemanticErrorKind};

// ── Declarations ─────────────────────────────────────────────────────────

#[test]
fn duplicate_prototype() {
    let source = r#"
        int f(int a);
        int f(int a);
        int main() { return 0; }
    "#;
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::PrototypeRedefinition);
}

#[test]
fn prototype_after_definition_with_other_arity() {
    let source = r#"
        int f(int a) { return a; }
        int f(int a, int b);
    "#;
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::PrototypeRedefinition);
}

#[test]
fn prototype_after_definition_with_same_arity_is_accepted() {
    let source = r#"
        int f(int a) { return a; }
        int f(int a);
        int main() { return f(1); }
    "#;
    assert!(compile_to_ir(source).is_ok());
}

#[test]
fn builtin_cannot_be_redeclared() {
    let source = "int printnum(int i);";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::PrototypeRedefinition);
}

#[test]
fn definition_conflicting_with_prototype_arity() {
    let source = r#"
        int f(int a);
        int f(int a, int b) { return a; }
    "#;
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::FunctionRedefinition);
}

#[test]
fn definition_conflicting_with_earlier_definition_arity() {
    let source = r#"
        int f() { return 1; }
        int f(int a) { return a; }
    "#;
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::FunctionRedefinition);
}

#[test]
fn duplicate_parameter() {
    let source = "int f(int a, int a) { return a; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::ParameterRedefinition);
}

#[test]
fn variable_redefinition() {
    let source = "int f() { int x; int x; return 0; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::VariableRedefinition);
}

#[test]
fn local_shadowing_parameter() {
    let source = "int f(int x) { int x; return x; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::VariableRedefinition);
}

#[test]
fn array_redefinition() {
    let source = "int f() { array a[2]; array a[3]; return 0; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::ArrayRedefinition);
}

#[test]
fn array_clashing_with_variable() {
    let source = "int f() { int a; array a[3]; return 0; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::ArrayRedefinition);
}

#[test]
fn locals_do_not_leak_between_functions() {
    let source = r#"
        int f() { int x; array a[2]; return 0; }
        int g() { int a; array x[2]; return 0; }
    "#;
    assert!(compile_to_ir(source).is_ok());
}

// ── Uses ─────────────────────────────────────────────────────────────────

#[test]
fn undefined_variable() {
    let source = "int f() { return y; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::UndefinedVariable);
}

#[test]
fn assignment_to_undeclared_variable() {
    let source = "int f() { y = 1; return 0; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::UndefinedVariable);
}

#[test]
fn bound_on_undeclared_name() {
    let source = "int f() { y $ 4; return 0; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::UndefinedVariable);
}

#[test]
fn array_read_as_scalar() {
    let source = "int f() { array a[2]; return a; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::ArrayUsedAsVariable);
}

#[test]
fn array_assigned_as_scalar() {
    let source = "int f() { array a[2]; a = 1; return 0; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::ArrayUsedAsVariable);
}

#[test]
fn undefined_function() {
    let source = "int f() { return g(); }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::UndefinedFunction);
}

#[test]
fn self_recursion_needs_a_prototype() {
    let source = "int f(int n) { return f(n); }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::UndefinedFunction);
}

#[test]
fn argument_count_mismatch() {
    let source = r#"
        int add(int a, int b) { return a + b; }
        int main() { return add(1); }
    "#;
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::ArgumentCountMismatch);
}

#[test]
fn too_many_arguments_to_builtin() {
    let source = "int main() { return printnum(1, 2); }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::ArgumentCountMismatch);
}

#[test]
fn non_constant_bound() {
    let source = "int f(int n) { int x; x $ n; return x; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::NonConstantBound);
}

#[test]
fn missing_return() {
    let source = "int f() { int x; x = 1; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::MissingReturn);
}

#[test]
fn return_must_be_last() {
    let source = "int f() { return 1; ; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::MissingReturn);
}

#[test]
fn bound_annotation_has_no_value() {
    let source = "int f() { int x; return x $ 5; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::ValuelessExpression);
}

#[test]
fn increment_has_no_value() {
    let source = "int f() { array a[2]; printnum(a inc 0); return 0; }";
    assert_semantic_error(compile_to_ir(source), SemanticErrorKind::ValuelessExpression);
}

// ── Syntax and lexing ────────────────────────────────────────────────────

#[test]
fn return_without_expression() {
    let result = compile_to_ir("int f() { return; }");
    match result {
        Err(CompileError::Parse { line, found, message }) => {
            assert_eq!(line, 1);
            assert_eq!(found, "';'");
            assert!(message.contains("expression"), "unexpected message: {}", message);
        }
        other => panic!("Expected parse error, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_semicolon() {
    let result = compile_to_ir("int f() { return 1 }");
    assert!(matches!(result, Err(CompileError::Parse { .. })));
}

#[test]
fn prototype_followed_by_garbage() {
    // Conflicts with the earlier prototype, but is never a definition.
    let result = compile_to_ir("int f();\nint f(int a) x");
    match result {
        Err(CompileError::Parse { line, found, message }) => {
            assert_eq!(line, 2);
            assert_eq!(found, "'x'");
            assert_eq!(message, "expected ';' or '{'");
        }
        other => panic!("Expected parse error, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn empty_source_is_rejected() {
    assert!(matches!(compile_to_ir(""), Err(CompileError::Parse { .. })));
}

#[test]
fn unknown_character() {
    let result = compile_to_ir("int f() { return 1 % 2; }");
    assert!(matches!(result, Err(CompileError::Lexical(_))));
}

// ── Code generation ──────────────────────────────────────────────────────

#[test]
fn same_arity_redefinition_is_caught_by_codegen() {
    let source = r#"
        int f() { return 1; }
        int f() { return 2; }
    "#;
    match compile_to_ir(source) {
        Err(CompileError::CodeGen(CodeGenError::Redefinition { name, .. })) => assert_eq!(name, "f"),
        other => panic!("Expected redefinition, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn constant_index_past_the_end() {
    let source = "int f() { array a[2]; a inc 2; return 0; }";
    match compile_to_ir(source) {
        Err(CompileError::CodeGen(CodeGenError::IndexOutOfBounds { array, index, len })) => {
            assert_eq!((array.as_str(), index, len), ("a", 2, 2));
        }
        other => panic!("Expected out of bounds, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn negative_constant_index() {
    let source = "int f() { array a[2]; a inc -1; return 0; }";
    assert!(matches!(
        compile_to_ir(source),
        Err(CompileError::CodeGen(CodeGenError::IndexOutOfBounds { index: -1, .. }))
    ));
}

#[test]
fn linking_is_not_implemented() {
    let options = CompileOptions {
        link: Some("other.nc".into()),
        ..CompileOptions::default()
    };
    match compile("int main() { return 0; }", &options) {
        Err(CompileError::Link(message)) => assert!(message.contains("not implemented")),
        other => panic!("Expected link error, got: {:?}", other.map(|_| ())),
    }
}

// ── Error location accuracy ──────────────────────────────────────────────

#[test]
fn error_line_multiline() {
    let source = "int f() {\n  int x;\n  return y;\n}\n";
    match compile_to_ir(source) {
        Err(CompileError::Semantic { line, .. }) => assert_eq!(line, 3),
        other => panic!("Expected semantic error, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn semantic_error_display() {
    let err = compile_to_ir("int f() {\n return g();\n}").unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("SemanticError:UndefinedFunction (line 2)"), "{}", text);
}

// ── Helper ───────────────────────────────────────────────────────────────

fn assert_semantic_error(result: Result<Module, CompileError>, expected: SemanticErrorKind) {
    match result {
        Ok(_) => panic!("Expected {:?} error, but compilation succeeded", expected),
        Err(CompileError::Semantic { kind, .. }) => {
            assert_eq!(kind, expected);
        }
        Err(other) => panic!("Expected {:?} semantic error, got: {:?}", expected, other),
    }
}
