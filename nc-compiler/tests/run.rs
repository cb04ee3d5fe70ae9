use nc_compiler::backend::interp::{MAX_CELLS, MAX_DEPTH};
use nc_compiler::backend::{run, BufferHost, RuntimeError};
use nc_compiler::ir::Module;
use nc_compiler::{compile, CompileOptions};

// ── Results ──────────────────────────────────────────────────────────────

#[test]
fn two_function_program() {
    let source = r#"
        int add(int a, int b) { return a + b; }
        int main() { int x; x = add(3, 4); return x; }
    "#;
    assert_eq!(both(source, "main", &[], &[]), (7, 7));
}

#[test]
fn locals_start_at_zero() {
    let source = "int f() { int x; x $ 10; x = x + 1; return x; }";
    assert_eq!(both(source, "f", &[], &[]), (1, 1));
}

#[test]
fn arguments_from_the_caller() {
    let source = "int f(int a, int b) { return a - b * 2; }";
    assert_eq!(both(source, "f", &[10, 3], &[]), (4, 4));
}

#[test]
fn division_truncates_toward_zero() {
    let source = "int f(int a) { return a / 2; }";
    assert_eq!(both(source, "f", &[-7], &[]), (-3, -3));
}

#[test]
fn increments_count_up() {
    let source = r#"
        int f() {
            array h[3];
            h $ 10;
            h inc 1;
            h inc 1;
            h inc 2;
            return 0;
        }
    "#;
    assert_eq!(both(source, "f", &[], &[]), (0, 0));
}

#[test]
fn recursion_through_a_prototype() {
    let source = r#"
        int down(int n);
        int down(int n) { return n; }
        int main() { return down(9) + down(1); }
    "#;
    assert_eq!(both(source, "main", &[], &[]), (10, 10));
}

// ── Builtins ─────────────────────────────────────────────────────────────

#[test]
fn printnum_writes_output() {
    let module = compile_default("int main() { printnum(84); printnum(-1); return 0; }");
    let mut host = BufferHost::default();
    assert_eq!(run(&module, "main", &[], &mut host), Ok(0));
    assert_eq!(host.output, vec![84, -1]);
}

#[test]
fn inputnum_reads_input() {
    let module = compile_default("int main() { int x; x = inputnum(); return x * 3; }");
    let mut host = BufferHost::with_inputs([5]);
    assert_eq!(run(&module, "main", &[], &mut host), Ok(15));
    assert!(host.inputs.is_empty());
}

#[test]
fn running_out_of_input() {
    let module = compile_default("int main() { return inputnum(); }");
    let mut host = BufferHost::default();
    assert!(matches!(run(&module, "main", &[], &mut host), Err(RuntimeError::Input(_))));
}

// ── Runtime errors ───────────────────────────────────────────────────────

#[test]
fn division_by_zero() {
    let module = compile_default("int main() { int z; z = 0; return 10 / z; }");
    let result = run(&module, "main", &[], &mut BufferHost::default());
    assert_eq!(result, Err(RuntimeError::DivisionByZero("main".to_string())));
}

#[test]
fn runaway_recursion() {
    let source = r#"
        int f(int n);
        int f(int n) { return f(n + 1); }
        int main() { return f(0); }
    "#;
    let module = compile_default(source);
    let result = run(&module, "main", &[], &mut BufferHost::default());
    assert_eq!(result, Err(RuntimeError::StackOverflow(MAX_DEPTH)));
}

#[test]
fn index_out_of_bounds_at_runtime() {
    let module = compile_default("int f(int i) { array a[2]; a inc i; return 0; }");
    let result = run(&module, "f", &[5], &mut BufferHost::default());
    assert_eq!(
        result,
        Err(RuntimeError::IndexOutOfBounds { function: "f".to_string(), index: 5, len: 2 })
    );
}

#[test]
fn oversized_array_is_refused() {
    let module = compile_default("int main() { array a[4611686018427387904]; a inc 0; return 0; }");
    let result = run(&module, "main", &[], &mut BufferHost::default());
    assert_eq!(
        result,
        Err(RuntimeError::SlotTooLarge { function: "main".to_string(), len: 4_611_686_018_427_387_904 })
    );
}

#[test]
fn array_at_the_cell_limit_runs() {
    let source = format!("int main() {{ array a[{}]; a inc {}; return 1; }}", MAX_CELLS, MAX_CELLS - 1);
    assert_eq!(run(&compile_default(&source), "main", &[], &mut BufferHost::default()), Ok(1));

    let source = format!("int main() {{ array a[{}]; return 1; }}", MAX_CELLS + 1);
    let result = run(&compile_default(&source), "main", &[], &mut BufferHost::default());
    assert!(matches!(result, Err(RuntimeError::SlotTooLarge { len, .. }) if len == MAX_CELLS + 1));
}

#[test]
fn declared_but_never_defined() {
    let module = compile_default("int g(int a);\nint main() { return g(1); }");
    let result = run(&module, "main", &[], &mut BufferHost::default());
    assert_eq!(result, Err(RuntimeError::Unresolved("g".to_string())));
}

#[test]
fn unknown_entry_point() {
    let module = compile_default("int main() { return 0; }");
    let result = run(&module, "start", &[], &mut BufferHost::default());
    assert_eq!(result, Err(RuntimeError::UnknownFunction("start".to_string())));
}

#[test]
fn wrong_argument_count_for_entry() {
    let module = compile_default("int main() { return 0; }");
    let result = run(&module, "main", &[1], &mut BufferHost::default());
    assert!(matches!(result, Err(RuntimeError::Arity { expected: 0, found: 1, .. })));
}

// ── Narrowing and values ─────────────────────────────────────────────────

#[test]
fn violated_bound_wraps_at_32_bits() {
    // The annotation promises |x| <= 10; the input breaks that promise.
    let source = "int main() { int x; x $ 10; x = inputnum(); return x; }";
    assert_eq!(both(source, "main", &[], &[5_000_000_000]), (705_032_704, 5_000_000_000));
}

#[test]
fn wide_values_survive_narrowing() {
    let source = r#"
        int main() {
            int big;
            int small;
            big $ 3000000000;
            small $ 50;
            big = 2999999999;
            small = 49;
            return big + small;
        }
    "#;
    assert_eq!(both(source, "main", &[], &[]), (3_000_000_048, 3_000_000_048));
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn compile_default(source: &str) -> Module {
    nc_compiler::compile_to_ir(source).unwrap_or_else(|e| panic!("{} should compile: {}", source, e))
}

/// Result of `entry` with and without narrowing.
fn both(source: &str, entry: &str, args: &[i64], inputs: &[i64]) -> (i64, i64) {
    let mut results = [0; 2];
    for (slot, narrow) in results.iter_mut().zip([true, false]) {
        let options = CompileOptions { narrow, ..CompileOptions::default() };
        let module = compile(source, &options).unwrap_or_else(|e| panic!("{} should compile: {}", source, e));
        let mut host = BufferHost::with_inputs(inputs.iter().copied());
        *slot = run(&module, entry, args, &mut host).unwrap_or_else(|e| panic!("{} failed: {}", entry, e));
    }
    (results[0], results[1])
}
