use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_declaration() {
    assert_eq!(
        kinds("my_var int = 2 + 3;"),
        vec![
            TokenKind::Ident("my_var".into()),
            TokenKind::TypeName(Type::INT),
            TokenKind::Assign,
            TokenKind::Int(2),
            TokenKind::Plus,
            TokenKind::Int(3),
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_keywords_beat_identifiers() {
    assert_eq!(
        kinds("if iff elif def void while_ true"),
        vec![
            TokenKind::If,
            TokenKind::Ident("iff".into()),
            TokenKind::Elif,
            TokenKind::Def,
            TokenKind::Void,
            TokenKind::Ident("while_".into()),
            TokenKind::Bool(true),
        ]
    );
}

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("12 3.25 0"),
        vec![TokenKind::Int(12), TokenKind::Float(3.25), TokenKind::Int(0)]
    );
}

#[test]
fn test_two_character_operators() {
    assert_eq!(
        kinds("<= < == = != ! && || += %="),
        vec![
            TokenKind::Le,
            TokenKind::Lt,
            TokenKind::EqEq,
            TokenKind::Assign,
            TokenKind::NotEq,
            TokenKind::Bang,
            TokenKind::AndAnd,
            TokenKind::OrOr,
            TokenKind::PlusAssign,
            TokenKind::PercentAssign,
        ]
    );
}

#[test]
fn test_char_and_string_escapes() {
    assert_eq!(
        kinds(r#"'a' '\n' "hi\t\"x\"""#),
        vec![
            TokenKind::Char(b'a'),
            TokenKind::Char(b'\n'),
            TokenKind::Str(b"hi\t\"x\"".to_vec()),
        ]
    );
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("x // a comment\n// another\ny"),
        vec![TokenKind::Ident("x".into()), TokenKind::Ident("y".into())]
    );
}

#[test]
fn test_spans() {
    let tokens = lex("ab  +").unwrap();
    assert_eq!(tokens[0].span, Span(0..2));
    assert_eq!(tokens[1].span, Span(4..5));
}

#[test]
fn test_unexpected_character() {
    let err = lex("x = 1 @ 2;").unwrap_err();
    assert_eq!(err.span, Span(6..7));
    assert!(err.message.contains("@"), "{}", err.message);
}

#[test]
fn test_bad_escape_is_an_error() {
    assert!(lex(r"'\q'").is_err());
}
