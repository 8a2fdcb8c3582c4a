//! Dsp -> Ds: parse the surface syntax and render canonical lisp form.

use tracing::debug;

use crate::error::SurfaceError;
use crate::token::{lex, Token, TokenKind};

/// Narrowest separator line emitted on the Ds side.
const MIN_SEPARATOR: usize = 4;

/// A parsed surface expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Symbol(String),
    Unary(String, Box<Expr>),
    Binary(String, Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    Subscript(Box<Expr>, Vec<Expr>),
}

impl Expr {
    /// Render to canonical Ds text.
    fn to_ds(&self) -> String {
        match self {
            Expr::Symbol(name) => name.clone(),
            Expr::Unary(op, operand) => format!("(unary {op} {})", operand.to_ds()),
            Expr::Binary(op, left, right) => {
                format!("(binary {op} {} {})", left.to_ds(), right.to_ds())
            }
            Expr::Call(callee, args) => {
                let mut out = format!("(function {}", callee.to_ds());
                for arg in args {
                    out.push(' ');
                    out.push_str(&arg.to_ds());
                }
                out.push(')');
                out
            }
            Expr::Subscript(base, indices) => {
                let mut out = format!("(subscript {}", base.to_ds());
                for index in indices {
                    out.push(' ');
                    out.push_str(&index.to_ds());
                }
                out.push(')');
                out
            }
        }
    }
}

/// Cursor over one rule's tokens.
struct Cursor<'src, 'tok> {
    input: &'src str,
    tokens: &'tok [Token<'src>],
    pos: usize,
}

impl<'src, 'tok> Cursor<'src, 'tok> {
    fn new(input: &'src str, tokens: &'tok [Token<'src>]) -> Self {
        Cursor {
            input,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn bump(&mut self) -> Option<&Token<'src>> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn error_here(&self, message: impl Into<String>) -> SurfaceError {
        let offset = self
            .peek()
            .map_or(self.input.len(), |token| token.start);
        SurfaceError::at(self.input, offset, message)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), SurfaceError> {
        if self.peek_kind() == Some(kind) {
            self.bump();
            Ok(())
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    /// expr := prefix (OP expr)?  -- binary, right-nesting, no precedence.
    fn parse_expr(&mut self) -> Result<Expr, SurfaceError> {
        let left = self.parse_prefix()?;
        if self.peek_kind() == Some(TokenKind::Operator) {
            let op = self.bump().map_or(String::new(), |t| t.text.to_owned());
            let right = self.parse_expr()?;
            return Ok(Expr::Binary(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    /// prefix := OP prefix | postfix
    fn parse_prefix(&mut self) -> Result<Expr, SurfaceError> {
        if self.peek_kind() == Some(TokenKind::Operator) {
            let op = self.bump().map_or(String::new(), |t| t.text.to_owned());
            let operand = self.parse_prefix()?;
            return Ok(Expr::Unary(op, Box::new(operand)));
        }
        self.parse_postfix()
    }

    /// postfix := primary ('(' args ')' | '[' args ']')*
    fn parse_postfix(&mut self) -> Result<Expr, SurfaceError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::LParen) => {
                    self.bump();
                    let args = self.parse_args(TokenKind::RParen, "`)`")?;
                    expr = Expr::Call(Box::new(expr), args);
                }
                Some(TokenKind::LBracket) => {
                    self.bump();
                    let indices = self.parse_args(TokenKind::RBracket, "`]`")?;
                    expr = Expr::Subscript(Box::new(expr), indices);
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Comma-separated expressions up to the closing delimiter.
    fn parse_args(&mut self, close: TokenKind, what: &str) -> Result<Vec<Expr>, SurfaceError> {
        let mut args = Vec::new();
        if self.peek_kind() == Some(close) {
            self.bump();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.peek_kind() {
                Some(TokenKind::Comma) => {
                    self.bump();
                }
                Some(kind) if kind == close => {
                    self.bump();
                    return Ok(args);
                }
                _ => return Err(self.error_here(format!("expected `,` or {what}"))),
            }
        }
    }

    /// primary := SYMBOL | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Expr, SurfaceError> {
        match self.peek_kind() {
            Some(TokenKind::Symbol) => {
                let text = self.bump().map_or(String::new(), |t| t.text.to_owned());
                Ok(Expr::Symbol(text))
            }
            Some(TokenKind::LParen) => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            _ => Err(self.error_here("expected a term")),
        }
    }
}

/// Render one rule in canonical Ds form: stacked premises, a dash line as
/// wide as the widest premise (floor four), then the conclusion.
fn render_rule(premises: &[Expr], conclusion: &Expr) -> String {
    let premise_lines: Vec<String> = premises.iter().map(Expr::to_ds).collect();
    let width = premise_lines
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(MIN_SEPARATOR);
    let mut out = String::new();
    for line in &premise_lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&"-".repeat(width));
    out.push('\n');
    out.push_str(&conclusion.to_ds());
    out
}

/// Parse one rule's tokens: comma-separated premises, `->`, conclusion; or
/// a bare term (a fact); or `->` with no premises.
fn parse_rule(input: &str, tokens: &[Token<'_>]) -> Result<String, SurfaceError> {
    let mut cursor = Cursor::new(input, tokens);
    if cursor.peek_kind() == Some(TokenKind::Arrow) {
        cursor.bump();
        let conclusion = cursor.parse_expr()?;
        if cursor.peek().is_some() {
            return Err(cursor.error_here("expected end of rule"));
        }
        return Ok(render_rule(&[], &conclusion));
    }
    let mut premises = Vec::new();
    loop {
        let expr = cursor.parse_expr()?;
        match cursor.peek_kind() {
            Some(TokenKind::Comma) => {
                cursor.bump();
                premises.push(expr);
            }
            Some(TokenKind::Arrow) => {
                cursor.bump();
                premises.push(expr);
                let conclusion = cursor.parse_expr()?;
                if cursor.peek().is_some() {
                    return Err(cursor.error_here("expected end of rule"));
                }
                return Ok(render_rule(&premises, &conclusion));
            }
            None => {
                if premises.is_empty() {
                    // A bare term is a fact.
                    return Ok(render_rule(&[], &expr));
                }
                return Err(cursor.error_here("expected `->`"));
            }
            Some(_) => return Err(cursor.error_here("expected `,` or `->`")),
        }
    }
}

/// Convert a pool of Dsp rules (one per line) to canonical Ds, rule blocks
/// separated by blank lines.
pub fn parse(input: &str) -> Result<String, SurfaceError> {
    let tokens = lex(input)?;
    let mut blocks = Vec::new();
    for line in tokens.split(|token| token.kind == TokenKind::Newline) {
        if line.is_empty() {
            continue;
        }
        blocks.push(parse_rule(input, line)?);
    }
    debug!(rules = blocks.len(), "translated dsp pool");
    Ok(blocks.join("\n\n"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_rule() {
        assert_eq!(parse("a -> b").unwrap(), "a\n----\nb");
    }

    #[test]
    fn multiple_premises() {
        assert_eq!(parse("a, b -> c").unwrap(), "a\nb\n----\nc");
    }

    #[test]
    fn bare_fact() {
        assert_eq!(parse("a").unwrap(), "----\na");
    }

    #[test]
    fn fact_with_leading_arrow() {
        assert_eq!(parse(" -> b").unwrap(), "----\nb");
    }

    #[test]
    fn function_call() {
        assert_eq!(
            parse("f(x, y) -> z").unwrap(),
            "(function f x y)\n----------------\nz"
        );
    }

    #[test]
    fn nullary_function_call() {
        assert_eq!(parse("f() -> z").unwrap(), "(function f)\n------------\nz");
    }

    #[test]
    fn subscript() {
        assert_eq!(
            parse("a[i, j] -> b").unwrap(),
            "(subscript a i j)\n-----------------\nb"
        );
    }

    #[test]
    fn binary_operator() {
        assert_eq!(
            parse("(x + y) -> z").unwrap(),
            "(binary + x y)\n--------------\nz"
        );
    }

    #[test]
    fn unary_operator() {
        assert_eq!(parse("(- x) -> y").unwrap(), "(unary - x)\n-----------\ny");
        assert_eq!(parse("~a -> b").unwrap(), "(unary ~ a)\n-----------\nb");
    }

    #[test]
    fn unparenthesised_binary_chains() {
        assert_eq!(
            parse("(a + b) * c, d[i] -> f(g, h)").unwrap(),
            "(binary * (binary + a b) c)\n(subscript d i)\n---------------------------\n(function f g h)"
        );
    }

    #[test]
    fn variables_pass_through() {
        assert_eq!(parse("`x -> `y").unwrap(), "`x\n----\n`y");
    }

    #[test]
    fn multiple_rules_are_blank_line_separated() {
        assert_eq!(
            parse("a -> b\n\nc -> d").unwrap(),
            "a\n----\nb\n\nc\n----\nd"
        );
    }

    #[test]
    fn missing_conclusion_is_an_error() {
        assert!(parse("a, b").is_err());
        assert!(parse("a ->").is_err());
    }

    #[test]
    fn unbalanced_parens_are_an_error() {
        let error = parse("f(a -> b").unwrap_err();
        assert!(error.to_string().contains("expected"));
    }

    #[test]
    fn error_carries_position() {
        let SurfaceError::Parse { line, col, .. } = parse("a -> b\n\nc -> )").unwrap_err();
        assert_eq!(line, 3);
        assert_eq!(col, 6);
    }
}
