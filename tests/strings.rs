mod cases;

use quill::Error;

test_case!(
    concatenation,
    input: r#""foo" + "bar""#,
    result: Ok("foobar"),
);

test_case!(
    concatenation_formats_numbers,
    input: r#""n=" + 5 + ", x=" + 1.5"#,
    result: Ok("n=5, x=1.5"),
);

test_case!(
    repetition,
    input: r#""ab" * 3"#,
    result: Ok("ababab"),
);

test_case!(
    character_at_index,
    input: r#""abc"[1]"#,
    result: Ok("b"),
);

test_case!(
    length_field,
    input: r#""hello".length"#,
    result: Ok("5"),
);

test_case!(
    index_out_of_bounds,
    input: r#""abc"[3]"#,
    result: Err(Error::Interpretation(_)),
);

test_case!(
    code_point_shifts,
    input: r#"("HAL" << 1) + " " + ("IBM" >> 1) + " " + ("b" - 1)"#,
    result: Ok("IBM HAL a"),
);

test_case!(
    lexicographic_comparison,
    input: r#"("abc" < "abd") + ("b" > "abc")"#,
    result: Ok("2"),
);

test_case!(
    escapes,
    input: r#""a\tb\x41\"\{""#,
    result: Ok("a\tbA\"{"),
);

test_case!(
    newline_escape,
    input: r#""one\ntwo""#,
    result: Ok("one\ntwo"),
);

// Interpolation

test_case!(
    interpolation,
    input: r#"loc n = 3; "n is {n}, twice {n * 2}!""#,
    result: Ok("n is 3, twice 6!"),
);

test_case!(
    interpolation_at_the_edges,
    input: r#""{1}{2}""#,
    result: Ok("12"),
);

test_case!(
    nested_interpolation,
    input: r#""a{"b{1 + 1}c"}d""#,
    result: Ok("ab2cd"),
);

test_case!(
    group_inside_interpolation,
    input: r#""v={ {1; 2} }""#,
    result: Ok("v=2"),
);

test_case!(
    custom_interpolation_delimiters,
    input: r#"`<>`"sum <1 + 2> {kept}""#,
    result: Ok("sum 3 {kept}"),
);

test_case!(
    unterminated_interpolation,
    input: r#""a{1"#,
    result: Err(Error::Lexical(_)),
);

// Raw strings

test_case!(
    raw_string_keeps_backslashes,
    input: r"`C:\temp\new`",
    result: Ok(r"C:\temp\new"),
);

test_case!(
    raw_string_escaped_backtick,
    input: r"`tick\`s`",
    result: Ok("tick`s"),
);

test_case!(
    raw_string_deindents_continuation_lines,
    input: "x = `first\n      second`",
    result: Ok("first\n second"),
);

test_case!(
    unterminated_string,
    input: r#""abc"#,
    result: Err(Error::Lexical(_)),
);

test_case!(
    empty_string_is_the_identity,
    input: r#"("" + "abc") + ("abc" + "")"#,
    result: Ok("abcabc"),
);
