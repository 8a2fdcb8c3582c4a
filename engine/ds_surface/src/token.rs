//! Lexer for the Dsp surface syntax.

use logos::Logos;

use crate::SurfaceError;

/// Raw Dsp token. Horizontal whitespace is skipped; newlines separate
/// rules and are kept.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
pub(crate) enum TokenKind {
    #[token("\n")]
    Newline,

    #[token("->")]
    Arrow,

    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    /// A name: letters, digits, underscores, and backticks, so canonical
    /// variables like `` `x `` pass through unchanged.
    #[regex(r"[A-Za-z0-9_`]+")]
    Symbol,

    /// An operator: a run of punctuation. `->` lexes as [`TokenKind::Arrow`].
    #[regex(r"[+\-*/~!<>=&|^%?.:@#$]+")]
    Operator,
}

/// A token with its source slice and byte offset.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub start: usize,
}

/// Lex the whole input, keeping newline tokens.
pub(crate) fn lex(input: &str) -> Result<Vec<Token<'_>>, SurfaceError> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                text: &input[span.start..span.end],
                start: span.start,
            }),
            Err(()) => {
                return Err(SurfaceError::at(input, span.start, "unexpected character"));
            }
        }
    }
    Ok(tokens)
}
