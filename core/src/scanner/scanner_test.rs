use pretty_assertions::assert_eq;

use super::*;

fn kinds(source: &str) -> Vec<(TokenKind, String)> {
    scan(source)
        .unwrap()
        .into_iter()
        .map(|t| (t.kind, t.text.to_string()))
        .collect()
}

fn texts(source: &str) -> Vec<String> {
    scan(source)
        .unwrap()
        .into_iter()
        .map(|t| t.text.to_string())
        .collect()
}

fn error(source: &str) -> LexicalErrorKind {
    scan(source).unwrap_err().kind
}

use TokenKind::{Float, Identifier, Integer, Separator};

fn tok(kind: TokenKind, text: &str) -> (TokenKind, String) {
    (kind, text.to_string())
}

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("1_000 2.5 7"),
        [tok(Integer, "1000"), tok(Float, "2.5"), tok(Integer, "7")]
    );
}

#[test]
fn test_separator_closes_and_opens_tokens() {
    assert_eq!(
        kinds("a+1*(b)"),
        [
            tok(Identifier, "a"),
            tok(Separator, "+"),
            tok(Integer, "1"),
            tok(Separator, "*"),
            tok(Separator, "("),
            tok(Identifier, "b"),
            tok(Separator, ")"),
        ]
    );
}

#[test]
fn test_two_char_operators() {
    assert_eq!(texts("a->b"), ["a", "->", "b"]);
    assert_eq!(texts("x==y"), ["x", "==", "y"]);
    assert_eq!(texts("() => 1"), ["(", ")", "=>", "1"]);
    assert_eq!(texts("a<<2>>1"), ["a", "<<", "2", ">>", "1"]);
    // The second character is re-dispatched when no pair matches.
    assert_eq!(texts("a=-1"), ["a", "=", "-", "1"]);
    assert_eq!(texts("x -= 1"), ["x", "-", "=", "1"]);
    assert_eq!(texts("a<b"), ["a", "<", "b"]);
}

#[test]
fn test_keywords_are_separators() {
    assert_eq!(
        kinds("if ifx loc"),
        [tok(Separator, "if"), tok(Identifier, "ifx"), tok(Separator, "loc")]
    );
    let tokens = scan("\"if\"").unwrap();
    assert!(!tokens[0].is("if"));
}

#[test]
fn test_field_tokens() {
    assert_eq!(
        kinds("file.read(p)"),
        [
            tok(Identifier, "file"),
            tok(TokenKind::String, "read"),
            tok(Separator, "("),
            tok(Identifier, "p"),
            tok(Separator, ")"),
        ]
    );
    assert_eq!(texts("a.b.c"), ["a", "b", "c"]);
    assert_eq!(error("a. b"), LexicalErrorKind::MissingFieldName);
}

#[test]
fn test_comments() {
    assert_eq!(texts("1 # one\n2 #"), ["1", "2"]);
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r#""a\nb\t\x41\"\\\{""#),
        [tok(TokenKind::String, "a\nb\tA\"\\{")]
    );
    assert_eq!(
        error(r#""\xZ1""#),
        LexicalErrorKind::InvalidHexEscape { found: 'Z' }
    );
}

#[test]
fn test_interpolation_matches_explicit_concatenation() {
    assert_eq!(kinds(r#""a{1+1}b""#), kinds(r#""a" + (1+1) + "b""#));
}

#[test]
fn test_interpolation_tracks_braces_and_nesting() {
    assert_eq!(
        texts(r#""x{ {1} }y""#),
        ["x", "+", "(", "{", "1", "}", ")", "+", "y"]
    );
    assert_eq!(
        texts(r#""a{"b{c}"}""#),
        ["a", "+", "(", "b", "+", "(", "c", ")", "+", "", ")", "+", ""]
    );
}

#[test]
fn test_raw_string_preamble_sets_delimiters() {
    assert_eq!(
        texts(r#"`<>`"sum <1+2> {x}""#),
        ["sum ", "+", "(", "1", "+", "2", ")", "+", " {x}"]
    );
}

#[test]
fn test_raw_strings() {
    assert_eq!(kinds(r"`a\nb`"), [tok(TokenKind::String, r"a\nb")]);
    assert_eq!(kinds(r"`tick\`s`"), [tok(TokenKind::String, "tick`s")]);
    // Two characters not followed by a quote are an ordinary raw string.
    assert_eq!(kinds("`ab` 1"), [tok(TokenKind::String, "ab"), tok(Integer, "1")]);
}

#[test]
fn test_raw_string_deindent() {
    assert_eq!(texts("x = `a\n    b`"), ["x", "=", "a\nb"]);
    assert_eq!(texts("x = `a\n      b`"), ["x", "=", "a\n b"]);
}

#[test]
fn test_positions() {
    let tokens = scan("a\n  bb + 1").unwrap();
    let positions: Vec<(u32, u32)> = tokens
        .iter()
        .map(|t| (t.position.line, t.position.column))
        .collect();
    assert_eq!(positions, [(1, 1), (2, 3), (2, 6), (2, 8)]);
    assert_eq!(tokens[1].span, Span::new(4, 6));
}

#[test]
fn test_errors() {
    assert_eq!(error("1a"), LexicalErrorKind::MalformedNumber { found: 'a' });
    assert_eq!(error("1.2.3"), LexicalErrorKind::MalformedNumber { found: '.' });
    assert_eq!(error("a @ b"), LexicalErrorKind::UnexpectedCharacter { found: '@' });
    assert_eq!(error("\"abc"), LexicalErrorKind::UnterminatedString);
    assert_eq!(error("`abc"), LexicalErrorKind::UnterminatedRawString);
    assert_eq!(error("\"a{1"), LexicalErrorKind::UnterminatedInterpolation);

    let err = scan("1 +\n  @").unwrap_err();
    assert_eq!((err.position.line, err.position.column), (2, 3));
}

#[test]
fn test_error_span_covers_the_whole_character() {
    let err = scan("1 + €").unwrap_err();
    assert_eq!(err.kind, LexicalErrorKind::UnexpectedCharacter { found: '€' });
    assert_eq!(err.span, Span::new(4, 7));

    let err = scan("\"\\x€\"").unwrap_err();
    assert_eq!(err.kind, LexicalErrorKind::InvalidHexEscape { found: '€' });
    assert_eq!(err.span, Span::new(3, 6));
}

#[test]
fn test_only_dotted_names_are_fields() {
    let fields: Vec<bool> = scan("a.b \"b{1}\" `c`")
        .unwrap()
        .iter()
        .map(Token::is_field)
        .collect();
    let mut expected = [false; 10];
    expected[1] = true;
    assert_eq!(fields, expected);
}
