//! Ds -> Dsp: read canonical lisp form and render the surface syntax.
//!
//! The reader here is deliberately self-contained -- the bridge translates
//! strings to strings and does not depend on the engine's term model.

use tracing::debug;

use crate::error::SurfaceError;

/// Minimal Ds tree: a symbol or a list, with the byte offset it started at.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DsTerm {
    start: usize,
    node: DsNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DsNode {
    Symbol(String),
    List(Vec<DsTerm>),
}

struct Reader<'src> {
    input: &'src str,
    src: &'src [u8],
    pos: usize,
}

fn is_symbol_byte(byte: u8) -> bool {
    !byte.is_ascii_whitespace() && byte != b'(' && byte != b')'
}

impl<'src> Reader<'src> {
    fn new(input: &'src str) -> Self {
        Reader {
            input,
            src: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> SurfaceError {
        SurfaceError::at(self.input, offset, message)
    }

    fn read_symbol(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_symbol_byte) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }

    fn read_term(&mut self) -> Result<DsTerm, SurfaceError> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek() {
            None => Err(self.error(start, "expected a term, found end of input")),
            Some(b'(') => {
                self.pos += 1;
                let mut children = Vec::new();
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        None => return Err(self.error(start, "unclosed list, expected `)`")),
                        Some(b')') => {
                            self.pos += 1;
                            return Ok(DsTerm {
                                start,
                                node: DsNode::List(children),
                            });
                        }
                        Some(_) => children.push(self.read_term()?),
                    }
                }
            }
            Some(b')') => Err(self.error(start, "unexpected `)`")),
            Some(_) => Ok(DsTerm {
                start,
                node: DsNode::Symbol(self.read_symbol()),
            }),
        }
    }

}

fn is_separator(term: &DsTerm) -> bool {
    match &term.node {
        DsNode::Symbol(name) => !name.is_empty() && name.bytes().all(|byte| byte == b'-'),
        DsNode::List(_) => false,
    }
}

/// Render one Ds term in the surface syntax.
fn render(input: &str, term: &DsTerm) -> Result<String, SurfaceError> {
    let children = match &term.node {
        DsNode::Symbol(name) => return Ok(name.clone()),
        DsNode::List(children) => children,
    };
    let head = children.first().and_then(|child| match &child.node {
        DsNode::Symbol(name) => Some(name.as_str()),
        DsNode::List(_) => None,
    });
    match head {
        Some("binary") if children.len() == 4 => {
            let op = operator(input, &children[1])?;
            let left = render(input, &children[2])?;
            let right = render(input, &children[3])?;
            Ok(format!("({left} {op} {right})"))
        }
        Some("unary") if children.len() == 3 => {
            let op = operator(input, &children[1])?;
            let operand = render(input, &children[2])?;
            Ok(format!("{op} {operand}"))
        }
        Some("function") if children.len() >= 2 => {
            let callee = render(input, &children[1])?;
            let args = arguments(input, &children[2..])?;
            Ok(format!("{callee}({args})"))
        }
        Some("subscript") if children.len() >= 3 => {
            let base = render(input, &children[1])?;
            let indices = arguments(input, &children[2..])?;
            Ok(format!("{base}[{indices}]"))
        }
        _ => Err(SurfaceError::at(
            input,
            term.start,
            "list has no surface form (expected binary, unary, function or subscript)",
        )),
    }
}

fn operator(input: &str, term: &DsTerm) -> Result<String, SurfaceError> {
    match &term.node {
        DsNode::Symbol(name) => Ok(name.clone()),
        DsNode::List(_) => Err(SurfaceError::at(
            input,
            term.start,
            "operator must be a symbol",
        )),
    }
}

fn arguments(input: &str, terms: &[DsTerm]) -> Result<String, SurfaceError> {
    let rendered = terms
        .iter()
        .map(|term| render(input, term))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rendered.join(", "))
}

/// Convert a pool of canonical Ds rules (blank-line separated blocks) to
/// Dsp, one rule per output line.
pub fn unparse(input: &str) -> Result<String, SurfaceError> {
    let mut rules = Vec::new();
    for (block, offset) in blocks(input) {
        let mut reader = Reader::new(input);
        reader.pos = offset;
        let end = offset + block.len();
        let terms = {
            let mut terms = Vec::new();
            loop {
                reader.skip_whitespace();
                if reader.pos >= end {
                    break;
                }
                let term = reader.read_term()?;
                if is_separator(&term) {
                    continue;
                }
                terms.push(term);
            }
            terms
        };
        let Some((conclusion, premises)) = terms.split_last() else {
            continue;
        };
        let premise_list = premises
            .iter()
            .map(|premise| render(input, premise))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");
        let conclusion = render(input, conclusion)?;
        if premise_list.is_empty() {
            rules.push(format!(" -> {conclusion}"));
        } else {
            rules.push(format!("{premise_list} -> {conclusion}"));
        }
    }
    debug!(rules = rules.len(), "translated ds pool");
    Ok(rules.join("\n"))
}

/// Blank-line separated blocks of the input, with their byte offsets.
fn blocks(input: &str) -> Vec<(&str, usize)> {
    let mut out = Vec::new();
    let mut offset = 0;
    let mut block_start: Option<usize> = None;
    for line in input.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(start) = block_start.take() {
                out.push((&input[start..offset], start));
            }
        } else if block_start.is_none() {
            block_start = Some(offset);
        }
        offset += line.len();
    }
    if let Some(start) = block_start {
        out.push((&input[start..], start));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_rule() {
        assert_eq!(unparse("a\nb\n----\nc").unwrap(), "a, b -> c");
    }

    #[test]
    fn fact_unparses_with_leading_arrow() {
        assert_eq!(unparse("----\na").unwrap(), " -> a");
    }

    #[test]
    fn function_shape() {
        assert_eq!(unparse("(function f a b)\n----\nc").unwrap(), "f(a, b) -> c");
        assert_eq!(unparse("(function f)\n----\nc").unwrap(), "f() -> c");
    }

    #[test]
    fn subscript_shape() {
        assert_eq!(unparse("(subscript a i j)\n----\nb").unwrap(), "a[i, j] -> b");
    }

    #[test]
    fn binary_shape() {
        assert_eq!(unparse("(binary + a b)\n----\nc").unwrap(), "(a + b) -> c");
    }

    #[test]
    fn unary_shape_follows_the_contract() {
        assert_eq!(unparse("(unary - x)\n----\ny").unwrap(), "- x -> y");
    }

    #[test]
    fn nested_shapes() {
        assert_eq!(
            unparse("(binary * (binary + a b) c)\n(subscript d i)\n----\n(function f g h)")
                .unwrap(),
            "(a + b) * c, d[i] -> f(g, h)"
        );
    }

    #[test]
    fn multiple_rules_one_per_line() {
        assert_eq!(
            unparse("a\n----\nb\n\nc\n----\nd").unwrap(),
            "a -> b\nc -> d"
        );
    }

    #[test]
    fn separator_of_any_width_is_skipped() {
        assert_eq!(unparse("a\n----------\nb").unwrap(), "a -> b");
    }

    #[test]
    fn plain_lists_have_no_surface_form() {
        let error = unparse("(a b c)\n----\nd").unwrap_err();
        assert!(error.to_string().contains("no surface form"));
    }

    #[test]
    fn operator_must_be_a_symbol() {
        assert!(unparse("(binary (x) a b)\n----\nc").is_err());
    }

    #[test]
    fn error_positions_point_into_the_input() {
        let SurfaceError::Parse { line, .. } = unparse("a\n----\n(b (c)").unwrap_err();
        assert_eq!(line, 3);
    }
}
