//! Tokenizer built on `logos`.

use logos::Logos;
use thiserror::Error;

use crate::syntax::Span;
use crate::types::Type;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"([ \t\r\n\f]+|//[^\n]*)")]
pub enum TokenKind {
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("def")]
    Def,
    #[token("return")]
    Return,
    #[token("void")]
    Void,
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),

    #[token("bool", |_| Type::BOOL)]
    #[token("char", |_| Type::CHAR)]
    #[token("int", |_| Type::INT)]
    #[token("float", |_| Type::FLOAT)]
    #[token("str", |_| Type::STR)]
    TypeName(Type),

    #[regex("[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Ident(String),
    #[regex("[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),
    #[regex(r"'([^'\\\n]|\\.)'", |lex| char_literal(lex.slice()))]
    Char(u8),
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| string_literal(lex.slice()))]
    Str(Vec<u8>),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("%=")]
    PercentAssign,
    #[token("=")]
    Assign,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
}

impl TokenKind {
    /// Surface spelling of operator tokens, used to look up their tier.
    pub fn operator_spelling(&self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            EqEq => "==",
            NotEq => "!=",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            AndAnd => "&&",
            OrOr => "||",
            Bang => "!",
            _ => return None,
        })
    }

    /// The arithmetic operator behind a compound assignment like `+=`.
    pub fn compound_spelling(&self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            PlusAssign => "+",
            MinusAssign => "-",
            StarAssign => "*",
            SlashAssign => "/",
            PercentAssign => "%",
            _ => return None,
        })
    }

    pub fn describe(&self) -> String {
        use TokenKind::*;
        match self {
            Ident(name) => format!("identifier '{name}'"),
            Int(i) => format!("integer {i}"),
            Float(f) => format!("float {f}"),
            Char(c) => format!("character {:?}", *c as char),
            Str(_) => "string literal".to_owned(),
            Bool(b) => format!("'{b}'"),
            TypeName(ty) => format!("type '{ty}'"),
            If => "'if'".to_owned(),
            Elif => "'elif'".to_owned(),
            Else => "'else'".to_owned(),
            For => "'for'".to_owned(),
            While => "'while'".to_owned(),
            Def => "'def'".to_owned(),
            Return => "'return'".to_owned(),
            Void => "'void'".to_owned(),
            PlusAssign => "'+='".to_owned(),
            MinusAssign => "'-='".to_owned(),
            StarAssign => "'*='".to_owned(),
            SlashAssign => "'/='".to_owned(),
            PercentAssign => "'%='".to_owned(),
            Assign => "'='".to_owned(),
            LParen => "'('".to_owned(),
            RParen => "')'".to_owned(),
            LBracket => "'['".to_owned(),
            RBracket => "']'".to_owned(),
            LBrace => "'{'".to_owned(),
            RBrace => "'}'".to_owned(),
            Comma => "','".to_owned(),
            Semicolon => "';'".to_owned(),
            other => match other.operator_spelling() {
                Some(op) => format!("'{op}'"),
                None => format!("{other:?}"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

/// Splits `source` into tokens, failing on the first unrecognised input.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = Span(lexer.span());
        match result {
            Ok(kind) => tokens.push(Token { kind, span }),
            Err(()) => {
                return Err(LexError {
                    message: format!("Unexpected input {:?}", lexer.slice()),
                    span,
                });
            }
        }
    }
    tracing::debug!(count = tokens.len(), "Lexed source");
    Ok(tokens)
}

fn unescape(byte: u8) -> Option<u8> {
    Some(match byte {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'0' => 0,
        b'\\' => b'\\',
        b'\'' => b'\'',
        b'"' => b'"',
        _ => return None,
    })
}

fn unescape_bytes(body: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
    let mut bytes = body.iter().copied();
    while let Some(b) = bytes.next() {
        if b == b'\\' {
            out.push(unescape(bytes.next()?)?);
        } else {
            out.push(b);
        }
    }
    Some(out)
}

fn char_literal(slice: &str) -> Option<u8> {
    let body = &slice.as_bytes()[1..slice.len() - 1];
    match unescape_bytes(body)?.as_slice() {
        [b] if b.is_ascii() => Some(*b),
        _ => None,
    }
}

fn string_literal(slice: &str) -> Option<Vec<u8>> {
    unescape_bytes(&slice.as_bytes()[1..slice.len() - 1])
}

#[cfg(test)]
#[path = "lexer_test.rs"]
mod lexer_test;
