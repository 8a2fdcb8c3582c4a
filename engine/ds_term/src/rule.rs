//! The DS rule model: premises followed by one conclusion.

use crate::parser::Parser;
use crate::{buffer, DsError, Term};

/// Narrowest separator line the renderer emits.
const MIN_SEPARATOR: usize = 4;

/// A deduction rule: zero or more premises and a conclusion.
///
/// A rule of length zero is a fact. The canonical rendering puts each
/// premise on its own line, then a line of `-` characters, then the
/// conclusion, every line newline-terminated:
///
/// ```text
/// (! (! `x))
/// ----------
/// `x
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Rule {
    /// Premises then conclusion; never empty.
    terms: Vec<Term>,
}

impl Rule {
    /// Build a rule from premises and a conclusion.
    pub fn from_parts(premises: Vec<Term>, conclusion: Term) -> Rule {
        let mut terms = premises;
        terms.push(conclusion);
        Rule { terms }
    }

    /// Build a fact: a rule with no premises.
    pub fn fact(conclusion: Term) -> Rule {
        Rule {
            terms: vec![conclusion],
        }
    }

    /// Parse a rule from text.
    ///
    /// The input is a whitespace-separated sequence of terms; separator
    /// lines (a standalone token of four or more `-`) are skipped. The last
    /// term is the conclusion, so a single term parses as a fact and
    /// `"p q"` parses as the one-premise rule `p -> q`.
    pub fn parse(text: &str) -> Result<Rule, DsError> {
        let mut parser = Parser::new(text);
        let mut terms = Vec::new();
        loop {
            parser.skip_whitespace();
            if parser.at_eof() {
                break;
            }
            let term = parser.parse_term()?;
            if is_separator(&term) {
                continue;
            }
            terms.push(term);
        }
        if terms.is_empty() {
            return Err(parser.error("expected at least one term"));
        }
        Ok(Rule { terms })
    }

    /// Parse a rule from raw bytes holding canonical text.
    pub fn from_bytes(bytes: &[u8]) -> Result<Rule, DsError> {
        let text = std::str::from_utf8(bytes).map_err(|_| DsError::Parse {
            line: 1,
            col: 1,
            message: "input is not valid UTF-8".to_owned(),
        })?;
        Rule::parse(text)
    }

    /// Parse with an explicit rendering budget.
    pub fn parse_with(text: &str, limit: usize) -> Result<Rule, DsError> {
        let rule = Rule::parse(text)?;
        let needed = rule.rendered_len();
        if needed > limit {
            return Err(DsError::BufferTooSmall {
                needed,
                capacity: limit,
            });
        }
        Ok(rule)
    }

    /// Copy a rule, re-serialising through an explicit budget.
    pub fn copy_with(&self, limit: usize) -> Result<Rule, DsError> {
        let needed = self.rendered_len();
        if needed > limit {
            return Err(DsError::BufferTooSmall {
                needed,
                capacity: limit,
            });
        }
        Ok(self.clone())
    }

    /// Number of premises.
    pub fn len(&self) -> usize {
        self.terms.len() - 1
    }

    /// True when the rule has no premises.
    pub fn is_fact(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th premise; out of range is the type-error kind.
    pub fn premise(&self, index: usize) -> Result<&Term, DsError> {
        self.premises().get(index).ok_or(DsError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// All premises in order.
    pub fn premises(&self) -> &[Term] {
        &self.terms[..self.terms.len() - 1]
    }

    /// The conclusion.
    pub fn conclusion(&self) -> &Term {
        // The terms vector is never empty.
        &self.terms[self.terms.len() - 1]
    }

    /// The rule with premise `index` removed. Out of range is an error.
    pub fn without_premise(&self, index: usize) -> Result<Rule, DsError> {
        self.premise(index)?;
        let mut terms = self.terms.clone();
        terms.remove(index);
        Ok(Rule { terms })
    }

    fn separator_width(&self) -> usize {
        self.premises()
            .iter()
            .map(Term::rendered_len)
            .max()
            .unwrap_or(0)
            .max(MIN_SEPARATOR)
    }

    /// Width in bytes of the canonical rendering.
    pub fn rendered_len(&self) -> usize {
        let premise_lines: usize = self
            .premises()
            .iter()
            .map(|premise| premise.rendered_len() + 1)
            .sum();
        premise_lines + self.separator_width() + 1 + self.conclusion().rendered_len() + 1
    }

    /// Canonical text, bounded by the ambient ceiling.
    pub fn text(&self) -> Result<String, DsError> {
        self.text_with(buffer::capacity())
    }

    /// Canonical text, bounded by an explicit byte limit.
    pub fn text_with(&self, limit: usize) -> Result<String, DsError> {
        let needed = self.rendered_len();
        if needed > limit {
            return Err(DsError::BufferTooSmall {
                needed,
                capacity: limit,
            });
        }
        let mut out = String::with_capacity(needed);
        for premise in self.premises() {
            premise.write_into(&mut out);
            out.push('\n');
        }
        for _ in 0..self.separator_width() {
            out.push('-');
        }
        out.push('\n');
        self.conclusion().write_into(&mut out);
        out.push('\n');
        Ok(out)
    }

    /// Ground every premise and the conclusion with `dict`.
    ///
    /// `None` when any member fails or the grounded rule would exceed the
    /// ambient ceiling.
    pub fn ground(&self, dict: &Term, scope: Option<&str>) -> Option<Rule> {
        let terms = self
            .terms
            .iter()
            .map(|term| term.ground(dict, scope))
            .collect::<Option<Vec<_>>>()?;
        let rule = Rule { terms };
        if rule.rendered_len() > buffer::capacity() {
            return None;
        }
        Some(rule)
    }

    /// Plug `other`'s conclusion into this rule's first premise.
    ///
    /// Matches the first premise against `other`'s conclusion; on success
    /// the bindings instantiate this rule, the consumed premise is dropped,
    /// and `other`'s own premises are carried in front:
    ///
    /// ```text
    /// (modus ponens) (`p -> `q), `p |- `q
    ///              @          |- ((! (! `x)) -> `x)
    ///              = (! (! `x)) |- `x
    /// ```
    ///
    /// `None` when this rule is a fact, the match fails, or a budget is
    /// exceeded.
    pub fn matches(&self, other: &Rule) -> Option<Rule> {
        if self.is_fact() {
            return None;
        }
        let dict = self.terms[0].matches(other.conclusion(), None, None)?;
        let shortened = Rule {
            terms: self.terms[1..].to_vec(),
        };
        let instantiated = shortened.ground(&dict, None)?;
        let carried = other.ground(&dict, None)?;
        let mut terms = carried.premises().to_vec();
        terms.extend(instantiated.terms);
        let result = Rule { terms };
        if result.rendered_len() > buffer::capacity() {
            return None;
        }
        Some(result)
    }
}

fn is_separator(term: &Term) -> bool {
    match term {
        Term::Item(name) => {
            name.len() >= MIN_SEPARATOR && name.bytes().all(|byte| byte == b'-')
        }
        _ => false,
    }
}
