mod cases;

use indoc::indoc;
use quill::Error;

test_case!(
    indexed_elements,
    input: "a[0] = 10; a[1] = 20; a[0] + a[1]",
    result: Ok("30"),
);

test_case!(
    element_reference_displays_its_name,
    input: "a[0]",
    result: Ok("a#I#0"),
);

test_case!(
    float_and_string_keys,
    input: r#"t[1.5] = "x"; t["k"] = "y"; t[1.5] + t.k"#,
    result: Ok("xy"),
);

test_case!(
    field_sugar,
    input: r#"person.name = "Ann"; person.age = 36; $person.name + " " + person.age"#,
    result: Ok("Ann 36"),
);

test_case!(
    field_reference_displays_its_name,
    input: "person.name",
    result: Ok("person#S#name"),
);

test_case!(
    computed_index,
    input: "loc i = 2; grid[i * 10] = 7; $grid[20]",
    result: Ok("7"),
);

test_case!(
    nested_elements,
    input: "m[1][2] = 5; (m has 1) + $m[1][2]",
    result: Ok("6"),
);

test_case!(
    has,
    input: "a[0] = 1; (a has 0) + (a has 9) + (a !has 9)",
    result: Ok("2"),
);

test_case!(
    holds,
    input: "a[0] = 10; a[1] = 20; (a holds 20) + (a holds 30) + (a !holds 30)",
    result: Ok("2"),
);

test_case!(
    in_finds_the_element,
    input: "a[0] = 10; a[1] = 20; 20 in a",
    result: Ok("a#I#1"),
);

test_case!(
    in_without_a_match_is_false,
    input: "a[0] = 10; (30 in a) + (10 !in a)",
    result: Ok("0"),
);

test_case!(
    element_found_by_in_can_be_updated,
    input: indoc! {"
        a[0] = 10;
        a[1] = 20;
        loc ref slot = 20 in a;
        $slot = 99;
        $a[1]
    "},
    result: Ok("99"),
);

test_case!(
    reference_binding,
    input: "target = 3; loc ref alias = target; $$alias + 1",
    result: Ok("4"),
);

test_case!(
    copy_binding,
    input: "target = 3; loc copy = target; target = 4; $copy",
    result: Ok("3"),
);

test_case!(
    building_a_list_in_a_loop,
    input: indoc! {"
        loc i = 0;
        as (i < 4) {
            squares[i] = i * i;
            i += 1
        };
        $squares[3] + var.size(squares)
    "},
    result: Ok("13"),
);

test_case!(
    dereferencing_a_missing_element,
    input: "a[0] = 1; $a[5]",
    result: Err(Error::Interpretation(_)),
);

test_case!(
    indexing_an_integer,
    input: "loc n = 1; $n[0]",
    result: Err(Error::Interpretation(_)),
);

test_case!(
    missing_closing_bracket,
    input: "a[0",
    result: Err(Error::Syntax(_)),
);

test_case!(
    field_without_a_name,
    input: "a. = 1",
    result: Err(Error::Lexical(_)),
);
