//! Byte-cursor parser for canonical DS text.
//!
//! The grammar is deterministic and total on well-formed input:
//!
//! ```text
//! term     := variable | item | list
//! list     := '(' (term (WS term)*)? ')'
//! variable := '`' NAME
//! item     := NAME
//! NAME     := one or more bytes other than whitespace, '(' and ')'
//! ```
//!
//! A backtick only starts a variable in leading position; later backticks
//! are ordinary name bytes, so `` `x` `` is the variable named ``x` ``.

use crate::{DsError, Term};

pub(crate) struct Parser<'src> {
    src: &'src [u8],
    pos: usize,
    line: u32,
    col: u32,
}

fn is_name_byte(byte: u8) -> bool {
    !byte.is_ascii_whitespace() && byte != b'(' && byte != b')'
}

impl<'src> Parser<'src> {
    pub(crate) fn new(text: &'src str) -> Self {
        Parser {
            src: text.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(byte)
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> DsError {
        DsError::Parse {
            line: self.line,
            col: self.col,
            message: message.into(),
        }
    }

    fn parse_name(&mut self) -> Result<String, DsError> {
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        // NAME bytes never split a UTF-8 sequence: every continuation byte
        // is a name byte.
        Ok(String::from_utf8_lossy(&self.src[start..self.pos]).into_owned())
    }

    /// Parse one term, leading whitespace allowed.
    pub(crate) fn parse_term(&mut self) -> Result<Term, DsError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("expected a term, found end of input")),
            Some(b'(') => {
                self.bump();
                let mut children = Vec::new();
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        None => return Err(self.error("unclosed list, expected `)`")),
                        Some(b')') => {
                            self.bump();
                            return Ok(Term::List(children));
                        }
                        Some(_) => children.push(self.parse_term()?),
                    }
                }
            }
            Some(b')') => Err(self.error("unexpected `)`")),
            Some(b'`') => {
                self.bump();
                match self.parse_name() {
                    Ok(name) => Ok(Term::Variable(name)),
                    Err(_) => Err(self.error("expected a name after the backtick")),
                }
            }
            Some(_) => Ok(Term::Item(self.parse_name()?)),
        }
    }

    /// Parse exactly one term spanning the whole input.
    pub(crate) fn parse_single(text: &str) -> Result<Term, DsError> {
        let mut parser = Parser::new(text);
        let term = parser.parse_term()?;
        parser.skip_whitespace();
        if !parser.at_eof() {
            return Err(parser.error("unexpected trailing input after term"));
        }
        Ok(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(name: &str) -> Term {
        Term::Item(name.to_owned())
    }

    fn var(name: &str) -> Term {
        Term::Variable(name.to_owned())
    }

    #[test]
    fn parses_item() {
        assert_eq!(Parser::parse_single("abc"), Ok(item("abc")));
    }

    #[test]
    fn parses_variable() {
        assert_eq!(Parser::parse_single("`abc"), Ok(var("abc")));
    }

    #[test]
    fn trailing_backtick_is_a_name_byte() {
        assert_eq!(Parser::parse_single("`x`"), Ok(var("x`")));
        assert_eq!(Parser::parse_single("a`b"), Ok(item("a`b")));
    }

    #[test]
    fn parses_empty_list() {
        assert_eq!(Parser::parse_single("()"), Ok(Term::List(Vec::new())));
    }

    #[test]
    fn parses_nested_list() {
        assert_eq!(
            Parser::parse_single("(f (g `x) a)"),
            Ok(Term::List(vec![
                item("f"),
                Term::List(vec![item("g"), var("x")]),
                item("a"),
            ]))
        );
    }

    #[test]
    fn whitespace_between_children_is_insignificant() {
        assert_eq!(
            Parser::parse_single("( a\n\tb   c )"),
            Parser::parse_single("(a b c)")
        );
    }

    #[test]
    fn rejects_bare_backtick() {
        let err = Parser::parse_single("`");
        assert!(matches!(err, Err(DsError::Parse { .. })));
    }

    #[test]
    fn rejects_unclosed_list() {
        assert!(matches!(
            Parser::parse_single("(a (b c)"),
            Err(DsError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_stray_close() {
        assert!(matches!(
            Parser::parse_single(")"),
            Err(DsError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_trailing_input() {
        assert!(matches!(
            Parser::parse_single("a b"),
            Err(DsError::Parse { .. })
        ));
    }

    #[test]
    fn error_positions_are_one_based() {
        let Err(DsError::Parse { line, col, .. }) = Parser::parse_single("(a\n   )extra") else {
            panic!("expected a parse error");
        };
        assert_eq!(line, 2);
        assert_eq!(col, 5);
    }
}
