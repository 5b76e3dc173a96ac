//! Tests for the code generator.

use pretty_assertions::assert_eq;

use crate::{
    api::ExecutionOptions,
    compiler::{CompileError, StructureErrorKind, SyntaxErrorKind, TreeTracer, compile, compile_traced},
    scanner::{Position, scan},
    stdlib::{BufferConsole, Registry, register_stdlib},
    values::{Store, Value},
    vm::{Code, ExecutionError, ExecutionErrorKind, LambdaEntry, Machine, RuntimeError},
};

fn compile_source(source: &str) -> Code {
    crate::test_utils::init_test_logging();
    let tokens = scan(source).unwrap();
    compile(&tokens).unwrap_or_else(|err| panic!("{source:?} failed to compile: {err}"))
}

fn listing(code: &Code) -> Vec<String> {
    code.instructions
        .iter()
        .map(|instruction| format!("{:?}", instruction))
        .collect()
}

fn syntax_error(source: &str) -> SyntaxErrorKind {
    let tokens = scan(source).unwrap();
    match compile(&tokens) {
        Err(CompileError::Syntax(err)) => err.kind,
        other => panic!("expected a syntax error for {source:?}, got {other:?}"),
    }
}

struct Run {
    result: Result<Option<Value>, ExecutionError>,
    store: Store,
    console: BufferConsole,
}

impl Run {
    fn value(&self) -> &Value {
        match &self.result {
            Ok(Some(value)) => value,
            other => panic!("expected a value, got {:?}", other),
        }
    }

    fn int(&self) -> i64 {
        self.value()
            .as_int()
            .unwrap_or_else(|| panic!("expected an Integer, got {:?}", self.value()))
    }

    fn global(&mut self, name: &str) -> Option<Value> {
        let name = self.store.name(name);
        self.store.get(&name).cloned()
    }
}

fn run(source: &str) -> Run {
    let code = compile_source(source);
    let mut registry = Registry::new();
    register_stdlib(&mut registry).unwrap();
    let mut store = Store::new();
    registry.seed(&mut store);
    let mut console = BufferConsole::new();
    let result = Machine::new(
        &code,
        &registry,
        &mut store,
        &mut console,
        &ExecutionOptions::default(),
    )
    .run();
    Run {
        result,
        store,
        console,
    }
}

// === Emission ===

#[test]
fn test_compile_simple_integer() {
    let code = compile_source("42");
    assert_eq!(listing(&code), ["Push(Int(42))", "End"]);
    assert_eq!(code.max_stack_size, 1);
}

#[test]
fn test_empty_program() {
    let code = compile_source("");
    assert_eq!(listing(&code), ["End"]);
    assert_eq!(code.max_stack_size, 0);
}

#[test]
fn test_precedence() {
    let code = compile_source("2 + 3 * 4");
    assert_eq!(
        listing(&code),
        [
            "Push(Int(2))",
            "Push(Int(3))",
            "Push(Int(4))",
            "Binary(*)",
            "Binary(+)",
            "End"
        ]
    );
    assert_eq!(code.max_stack_size, 3);

    let code = compile_source("2 * 3 + 4");
    assert_eq!(
        listing(&code),
        [
            "Push(Int(2))",
            "Push(Int(3))",
            "Binary(*)",
            "Push(Int(4))",
            "Binary(+)",
            "End"
        ]
    );
    assert_eq!(code.max_stack_size, 2);
}

#[test]
fn test_left_associativity() {
    let code = compile_source("10 - 3 - 2");
    assert_eq!(
        listing(&code),
        [
            "Push(Int(10))",
            "Push(Int(3))",
            "Binary(-)",
            "Push(Int(2))",
            "Binary(-)",
            "End"
        ]
    );
}

#[test]
fn test_assignment_chains_to_the_right() {
    let code = compile_source("a = b = 5");
    assert_eq!(
        listing(&code),
        ["Push(Var(a))", "Push(Var(b))", "Push(Int(5))", "Assign", "Assign", "End"]
    );
}

#[test]
fn test_prefix_binds_looser_than_index() {
    let code = compile_source("-x[0]");
    assert_eq!(
        listing(&code),
        ["Push(Var(x))", "Push(Int(0))", "Binary([])", "Unary(-)", "End"]
    );

    let code = compile_source("--1");
    assert_eq!(
        listing(&code),
        ["Push(Int(1))", "Unary(-)", "Unary(-)", "End"]
    );
}

#[test]
fn test_compound_and_negated_operators() {
    let code = compile_source("x += 1");
    assert_eq!(listing(&code), ["Push(Var(x))", "Push(Int(1))", "Assign(+)", "End"]);

    let code = compile_source("2 *-> x");
    assert_eq!(listing(&code), ["Push(Int(2))", "Push(Var(x))", "Insert(*)", "End"]);

    let code = compile_source("a !== b");
    assert_eq!(listing(&code), ["Push(Var(a))", "Push(Var(b))", "Binary(!==)", "End"]);
}

#[test]
fn test_field_sugar() {
    let code = compile_source("file.read");
    assert_eq!(
        listing(&code),
        ["Push(Var(file))", "Push(Str(\"read\"))", "Binary([])", "End"]
    );
}

#[test]
fn test_interpolation_compiles_like_concatenation() {
    assert_eq!(
        listing(&compile_source(r#""a{1+1}b""#)),
        listing(&compile_source(r#""a" + (1+1) + "b""#))
    );
}

#[test]
fn test_sequence_and_group() {
    let code = compile_source("1; 2;");
    assert_eq!(listing(&code), ["Push(Int(1))", "Ignore", "Push(Int(2))", "End"]);

    let code = compile_source("{}");
    assert_eq!(listing(&code), ["Push(None)", "End"]);
}

#[test]
fn test_if_emission() {
    let code = compile_source("if (c) 1 or 2");
    assert_eq!(
        listing(&code),
        [
            "Push(Label(L0))",
            "Push(Var(c))",
            "IfGoto",
            "Push(Int(1))",
            "Push(Label(L1))",
            "Goto",
            "Push(Int(2))",
            "End"
        ]
    );
    assert_eq!(code.labels, vec![6, 7]);
    assert_eq!(code.max_stack_size, 2);
}

#[test]
fn test_loop_emission() {
    let code = compile_source("as (x) 1");
    assert_eq!(
        listing(&code),
        [
            "Push(None)",
            "Push(Label(L1))",
            "Push(Var(x))",
            "IfGoto",
            "Ignore",
            "Push(Int(1))",
            "Push(Label(L0))",
            "Goto",
            "End"
        ]
    );
    assert_eq!(code.labels, vec![1, 8]);
}

#[test]
fn test_break_unwinds_pending_operands() {
    let code = compile_source("as (1) 1 + { break 2 }");
    assert_eq!(
        listing(&code),
        [
            "Push(None)",
            "Push(Label(L1))",
            "Push(Int(1))",
            "IfGoto",
            "Ignore",
            "Push(Int(1))",
            "Ignore",
            "Push(Int(2))",
            "Push(Label(L1))",
            "Goto",
            "Binary(+)",
            "Push(Label(L0))",
            "Goto",
            "End"
        ]
    );
    assert_eq!(run("as (1) 1 + { break 2 }").int(), 2);
}

#[test]
fn test_lambda_emission() {
    let code = compile_source("(n) => n");
    assert_eq!(
        listing(&code),
        [
            "Push(Label(L0))",
            "Goto",
            "Push(Var(<lambda0>.n))",
            "Insert",
            "Ignore",
            "Push(Var(<lambda0>.n))",
            "Return",
            "Push(Func(<lambda0>))",
            "End"
        ]
    );
    assert_eq!(code.labels, vec![7]);
    let entry = code.lambdas.values().next().copied();
    assert_eq!(
        entry,
        Some(LambdaEntry {
            entry: 2,
            params: 1
        })
    );
}

#[test]
fn test_call_emission() {
    let code = compile_source("f(1, 2)");
    assert_eq!(
        listing(&code),
        [
            "Push(Var(f))",
            "Push(Int(1))",
            "Push(Int(2))",
            "Eval(2, L0)",
            "Nop",
            "End"
        ]
    );
    assert_eq!(code.labels, vec![4]);
}

#[test]
fn test_names_resolve_innermost_first() {
    let code = compile_source("(x) => (y) => { loc z; x; y; z; ref x }");
    let listing = listing(&code);
    for expected in [
        "Push(Var(<lambda0>.x))",
        "Push(Var(<lambda1>.y))",
        "Push(Var(<lambda1>.z))",
        "Push(Var(x))",
    ] {
        assert!(
            listing.iter().any(|line| line == expected),
            "missing {expected} in {listing:#?}"
        );
    }
}

#[test]
fn test_instruction_locations() {
    let code = compile_source("1 +\n  2");
    let add = code
        .instructions
        .iter()
        .position(|i| format!("{:?}", i) == "Binary(+)")
        .unwrap();
    assert_eq!(code.location(add).position, Position { line: 1, column: 3 });
}

// === Errors ===

#[test]
fn test_jumps_outside_their_context() {
    assert_eq!(syntax_error("break"), SyntaxErrorKind::BreakOutsideLoop);
    assert_eq!(syntax_error("continue"), SyntaxErrorKind::ContinueOutsideLoop);
    assert_eq!(syntax_error("return 1"), SyntaxErrorKind::ReturnOutsideLambda);
    assert_eq!(
        syntax_error("as (1) (() => break)"),
        SyntaxErrorKind::BreakOutsideLoop
    );
}

#[test]
fn test_missing_parts() {
    assert_eq!(
        syntax_error("1 +"),
        SyntaxErrorKind::UnexpectedEnd {
            expected: "an operand".to_string()
        }
    );
    assert_eq!(
        syntax_error("(1"),
        SyntaxErrorKind::UnexpectedEnd {
            expected: "')'".to_string()
        }
    );
    assert_eq!(
        syntax_error("1 2"),
        SyntaxErrorKind::UnexpectedToken {
            expected: "';' or end of input".to_string(),
            found: "'2'".to_string()
        }
    );
    assert_eq!(
        syntax_error("if 1"),
        SyntaxErrorKind::UnexpectedToken {
            expected: "'('".to_string(),
            found: "'1'".to_string()
        }
    );
}

#[test]
fn test_quoted_strings_are_not_fields() {
    for source in [r#"a "b""#, r#"a "b{1}""#] {
        assert_eq!(
            syntax_error(source),
            SyntaxErrorKind::UnexpectedToken {
                expected: "';' or end of input".to_string(),
                found: "\"b\"".to_string()
            }
        );
    }
}

#[test]
fn test_operator_combinations() {
    assert_eq!(
        syntax_error("a !+ b"),
        SyntaxErrorKind::NotNegatable { op: "+".to_string() }
    );
    assert_eq!(
        syntax_error("a in= b"),
        SyntaxErrorKind::NotCompoundable {
            op: "in".to_string()
        }
    );
    assert_eq!(syntax_error("a !<= b"), SyntaxErrorKind::NegatedCompound);
}

#[test]
fn test_literal_errors() {
    assert_eq!(
        syntax_error("99999999999999999999"),
        SyntaxErrorKind::IntegerOverflow {
            text: "99999999999999999999".to_string()
        }
    );
}

#[test]
fn test_structure_error_diagnostic() {
    let err = crate::compiler::StructureError {
        kind: StructureErrorKind::UnplacedLabel { label: 3 },
        position: Position::START,
    };
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.code.as_deref(), Some("C001"));
    assert!(diagnostic.message.contains("L3"));
}

#[test]
fn test_parse_trace() {
    let tokens = scan("1 + 2").unwrap();
    let mut tracer = TreeTracer::new();
    compile_traced(&tokens, &mut tracer).unwrap();
    let rendered = tracer.render();
    assert!(rendered.starts_with("+ Program at 1:1 '1'\n"), "{rendered}");
    assert!(rendered.contains("- Jump at 1:1 '1'"), "{rendered}");
    assert!(rendered.contains("+ Tie at 1:3 '+'"), "{rendered}");
}

// === Execution ===

#[test]
fn test_loop_result_and_store() {
    let mut run = run("loc i = 0; as (i < 3) { i = i + 1 }");
    assert_eq!(run.int(), 3);
    assert_eq!(run.global("i").and_then(|v| v.as_int()), Some(3));
}

#[test]
fn test_loop_that_never_runs_is_none() {
    assert!(run("as (0) 1").value().is_none());
}

#[test]
fn test_break_with_value() {
    let run = run("loc i = 0; as (1) { i += 1; if (i == 5) break i * 10 }");
    assert_eq!(run.int(), 50);
}

#[test]
fn test_continue() {
    let run = run(
        "loc i = 0; loc n = 0; as (i < 5) { i += 1; if (i % 2 == 0) continue; n += 1 }; $n",
    );
    assert_eq!(run.int(), 3);
}

#[test]
fn test_return_from_lambda() {
    let run = run(r#"loc f = (x) => { if (x > 10) return "big"; "small" }; f(20) + f(1)"#);
    assert_eq!(run.value().as_str(), Some("bigsmall"));
}

#[test]
fn test_recursion_reading_locals_first() {
    let run = run("loc fact = (n) => if (n < 2) 1 or $n * fact(n - 1); fact(5)");
    assert_eq!(run.int(), 120);
}

#[test]
fn test_recursive_activations_share_locals() {
    let run = run("loc f = (n) => if (n > 0) { f(n - 1); $n } or 0; f(3)");
    assert_eq!(run.int(), 0);
}

#[test]
fn test_independent_calls_do_not_see_stale_locals() {
    let run = run("loc sq = (x) => $x * $x; sq(3); sq(4)");
    assert_eq!(run.int(), 16);
}

#[test]
fn test_builtin_call_through_field_sugar() {
    let run = run(r#"print("hi"); math.sqrt(16)"#);
    assert_eq!(run.value().as_float(), Some(4.0));
    assert_eq!(run.console.output(), "hi\n");
}

#[test]
fn test_lambda_arity_mismatch() {
    let run = run("loc f = (a, b) => a; f(1)");
    match &run.result {
        Err(ExecutionError {
            kind: ExecutionErrorKind::Runtime(RuntimeError::ArityMismatch { expected, found, .. }),
            ..
        }) => assert_eq!((*expected, *found), (2, 1)),
        other => panic!("expected an arity mismatch, got {:?}", other),
    }
}
