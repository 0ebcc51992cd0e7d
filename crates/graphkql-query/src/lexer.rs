//! Cypher lexer using logos

use graphkql_core::{Error, Result};
use logos::{Lexer, Logos};

/// Cypher tokens
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Clause keywords
    #[token("MATCH", ignore(ascii_case))]
    Match,

    #[token("OPTIONAL", ignore(ascii_case))]
    Optional,

    #[token("WHERE", ignore(ascii_case))]
    Where,

    #[token("RETURN", ignore(ascii_case))]
    Return,

    #[token("ORDER", ignore(ascii_case))]
    Order,

    #[token("BY", ignore(ascii_case))]
    By,

    #[token("SKIP", ignore(ascii_case))]
    Skip,

    #[token("LIMIT", ignore(ascii_case))]
    Limit,

    #[token("ASC", ignore(ascii_case))]
    #[token("ASCENDING", ignore(ascii_case))]
    Asc,

    #[token("DESC", ignore(ascii_case))]
    #[token("DESCENDING", ignore(ascii_case))]
    Desc,

    #[token("AS", ignore(ascii_case))]
    As,

    #[token("DISTINCT", ignore(ascii_case))]
    Distinct,

    // Clauses outside the supported subset, kept so the parser can name them
    #[token("CREATE", ignore(ascii_case))]
    Create,

    #[token("DELETE", ignore(ascii_case))]
    Delete,

    #[token("DETACH", ignore(ascii_case))]
    Detach,

    #[token("SET", ignore(ascii_case))]
    Set,

    #[token("REMOVE", ignore(ascii_case))]
    Remove,

    #[token("MERGE", ignore(ascii_case))]
    Merge,

    #[token("UNWIND", ignore(ascii_case))]
    Unwind,

    #[token("WITH", ignore(ascii_case))]
    With,

    #[token("UNION", ignore(ascii_case))]
    Union,

    #[token("CALL", ignore(ascii_case))]
    Call,

    // Boolean and predicate keywords
    #[token("AND", ignore(ascii_case))]
    And,

    #[token("OR", ignore(ascii_case))]
    Or,

    #[token("NOT", ignore(ascii_case))]
    Not,

    #[token("TRUE", ignore(ascii_case))]
    True,

    #[token("FALSE", ignore(ascii_case))]
    False,

    #[token("NULL", ignore(ascii_case))]
    Null,

    #[token("IS", ignore(ascii_case))]
    Is,

    #[token("IN", ignore(ascii_case))]
    In,

    #[token("CONTAINS", ignore(ascii_case))]
    Contains,

    #[token("STARTS", ignore(ascii_case))]
    Starts,

    #[token("ENDS", ignore(ascii_case))]
    Ends,

    // Symbols
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

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("|")]
    Pipe,

    #[token("..")]
    DoubleDot,

    #[token("=")]
    Equals,

    #[token("=~")]
    RegexMatch,

    #[token("<>")]
    NotEquals,

    #[token("!=")]
    NotEquals2,

    #[token("<")]
    LessThan,

    #[token("<=")]
    LessEquals,

    #[token(">")]
    GreaterThan,

    #[token(">=")]
    GreaterEquals,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    // Relationship arrows
    #[token("-->")]
    ArrowRight,

    #[token("<--")]
    ArrowLeft,

    #[token("--")]
    DoubleDash,

    #[token("->")]
    DashArrowRight,

    #[token("<-")]
    ArrowLeftDash,

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r#""([^"\\]|\\.)*""#, unescape)]
    #[regex(r#"'([^'\\]|\\.)*'"#, unescape)]
    String(String),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"`[^`]+`", |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    EscapedIdentifier(String),

    // Parameter
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Parameter(String),

    // Comment (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/", logos::skip)]
    BlockComment,
}

/// Strip the quotes from a string literal and resolve backslash escapes
fn unescape(lex: &mut Lexer<Token>) -> Option<String> {
    let raw = lex.slice();
    let body = &raw[1..raw.len() - 1];

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            other => out.push(other),
        }
    }
    Some(out)
}

impl Token {
    /// Check if this token names a clause outside the supported subset
    pub fn is_unsupported_clause(&self) -> bool {
        matches!(
            self,
            Token::Create
                | Token::Delete
                | Token::Detach
                | Token::Set
                | Token::Remove
                | Token::Merge
                | Token::Unwind
                | Token::With
                | Token::Union
                | Token::Call
        )
    }

    /// Name of an identifier token, including escaped identifiers
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) | Token::EscapedIdentifier(name) => Some(name),
            _ => None,
        }
    }
}

/// A token together with its source text and byte offset
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub text: String,
    pub position: usize,
}

/// Tokenize a Cypher query string
///
/// Fails on the first character sequence that is not a valid token.
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        let text = &input[span.clone()];
        match result {
            Ok(token) => tokens.push(SpannedToken {
                token,
                text: text.to_string(),
                position: span.start,
            }),
            Err(()) => {
                return Err(Error::syntax("unrecognized token", text, span.start));
            }
        }
    }
    Ok(tokens)
}
