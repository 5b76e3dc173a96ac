mod cases;

use pretty_assertions::assert_eq;
use quill::{
    BufferConsole, Engine, EngineOptions, Error, ExecutionOptionsOverride,
    render_error_to_string_no_color,
};

fn message(source: &str) -> String {
    match cases::run(source, &[]).result {
        Err(err) => err.to_string(),
        Ok(rendered) => panic!("{source:?} unexpectedly produced {rendered:?}"),
    }
}

test_case!(
    unexpected_character,
    input: "1 @ 2",
    result: Err(Error::Lexical(_)),
);

test_case!(
    letter_inside_number,
    input: "12ab",
    result: Err(Error::Lexical(_)),
);

test_case!(
    bad_hex_escape,
    input: r#""\xZZ""#,
    result: Err(Error::Lexical(_)),
);

test_case!(
    missing_operand,
    input: "1 +",
    result: Err(Error::Syntax(_)),
);

test_case!(
    missing_parenthesis_after_if,
    input: "if 1 { 2 }",
    result: Err(Error::Syntax(_)),
);

test_case!(
    trailing_garbage,
    input: "1 2",
    result: Err(Error::Syntax(_)),
);

test_case!(
    negating_arithmetic,
    input: "1 !+ 2",
    result: Err(Error::Syntax(_)),
);

test_case!(
    undefined_variable,
    input: "$nope + 1",
    result: Err(Error::Interpretation(_)),
);

test_case!(
    none_operand,
    input: "1 + as (0) 1",
    result: Err(Error::Interpretation(_)),
);

test_case!(
    assigning_to_a_number,
    input: "1 = 2",
    result: Err(Error::Interpretation(_)),
);

test_case!(
    output_before_failure_is_kept,
    input: r#"print("before"); $nope"#,
    output: "before\n",
    result: Err(Error::Interpretation(_)),
);

#[test]
fn messages_carry_line_and_column() {
    assert_eq!(message("1 @ 2"), "1:3: unexpected character '@'");
    assert_eq!(message("loc zero = 0;\n10 / zero"), "2:4: division by zero");
    assert_eq!(message("if (1 { 2 }"), "1:7: expected ')', found '{'");
    assert_eq!(message("x = 1;\nbreak"), "2:1: 'break' outside of a loop");
    assert!(
        message("$nope + 1").ends_with("variable 'nope' is not defined"),
        "{}",
        message("$nope + 1")
    );
}

#[test]
fn step_limit() {
    let engine = Engine::with_stdlib(EngineOptions::default()).unwrap();
    let program = engine.compile("as (1) {}").unwrap();
    let overrides = ExecutionOptionsOverride {
        max_steps: Some(500),
        ..Default::default()
    };

    let err = program
        .execute_with(&mut BufferConsole::new(), &overrides)
        .unwrap_err();
    assert!(matches!(err, Error::Interpretation(_)));
    assert_eq!(err.to_diagnostic().code.as_deref(), Some("X001"));
}

#[test]
fn unbounded_recursion_hits_the_stack_limit() {
    let err = match cases::run("loc f = (n) => f(n + 1); f(0)", &[]).result {
        Err(err) => err,
        Ok(rendered) => panic!("recursion produced {rendered:?}"),
    };
    assert_eq!(err.to_diagnostic().code.as_deref(), Some("X001"));
}

#[test]
fn rendered_diagnostic_quotes_the_source() {
    let source = "loc zero = 0;\n10 / zero";
    let err = cases::run(source, &[]).result.unwrap_err();
    let rendered = render_error_to_string_no_color(source, &err);

    assert!(rendered.contains("division by zero"), "{rendered}");
    assert!(rendered.contains("10 / zero"), "{rendered}");
    assert!(rendered.contains("R001"), "{rendered}");
}

#[test]
fn rendered_lexical_error_on_a_multibyte_character() {
    for (source, code) in [("1 + €", "L001"), (r#""\x€""#, "L003")] {
        let err = cases::run(source, &[]).result.unwrap_err();
        assert!(matches!(err, Error::Lexical(_)), "{err:?}");
        let rendered = render_error_to_string_no_color(source, &err);
        assert!(rendered.contains('€'), "{rendered}");
        assert!(rendered.contains(code), "{rendered}");
    }
}
