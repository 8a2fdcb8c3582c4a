//! The DS term model.

use crate::parser::Parser;
use crate::{buffer, DsError};

/// A term of the DS language: a variable, an item, or a list.
///
/// Terms are value types: equality and hashing are structural and
/// independent of how a term was constructed. Matching on the enum is the
/// variant extractor -- there is no fourth case.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Term {
    /// A binding site, written `` `name ``.
    Variable(String),
    /// A bare symbol, written `name`.
    Item(String),
    /// An ordered, possibly empty sequence of terms, written `(a b c)`.
    List(Vec<Term>),
}

impl Term {
    /// Parse a single term from canonical text.
    ///
    /// The whole input must be one term; trailing non-whitespace is an
    /// error. Deterministic and total on well-formed input.
    pub fn parse(text: &str) -> Result<Term, DsError> {
        Parser::parse_single(text)
    }

    /// Parse a single term from raw bytes holding canonical text.
    pub fn from_bytes(bytes: &[u8]) -> Result<Term, DsError> {
        let text = std::str::from_utf8(bytes).map_err(|_| DsError::Parse {
            line: 1,
            col: 1,
            message: "input is not valid UTF-8".to_owned(),
        })?;
        Term::parse(text)
    }

    /// Parse with an explicit rendering budget.
    ///
    /// Fails with [`DsError::BufferTooSmall`] when the parsed term's
    /// canonical rendering would not fit `limit` bytes.
    pub fn parse_with(text: &str, limit: usize) -> Result<Term, DsError> {
        let term = Term::parse(text)?;
        let needed = term.rendered_len();
        if needed > limit {
            return Err(DsError::BufferTooSmall {
                needed,
                capacity: limit,
            });
        }
        Ok(term)
    }

    /// Copy a term, re-serialising through an explicit budget.
    pub fn copy_with(&self, limit: usize) -> Result<Term, DsError> {
        let needed = self.rendered_len();
        if needed > limit {
            return Err(DsError::BufferTooSmall {
                needed,
                capacity: limit,
            });
        }
        Ok(self.clone())
    }

    /// Width in bytes of the canonical rendering, without allocating.
    pub fn rendered_len(&self) -> usize {
        match self {
            Term::Variable(name) => 1 + name.len(),
            Term::Item(name) => name.len(),
            Term::List(children) => {
                let inner: usize = children.iter().map(Term::rendered_len).sum();
                2 + inner + children.len().saturating_sub(1)
            }
        }
    }

    pub(crate) fn write_into(&self, out: &mut String) {
        match self {
            Term::Variable(name) => {
                out.push('`');
                out.push_str(name);
            }
            Term::Item(name) => out.push_str(name),
            Term::List(children) => {
                out.push('(');
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        out.push(' ');
                    }
                    child.write_into(out);
                }
                out.push(')');
            }
        }
    }

    /// Canonical text, bounded by the ambient ceiling.
    ///
    /// Fails rather than truncates when the rendering exceeds the active
    /// [`buffer::capacity`].
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
        self.write_into(&mut out);
        Ok(out)
    }

    /// True when the term contains no variables at any depth.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Item(_) => true,
            Term::List(children) => children.iter().all(Term::is_ground),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn text_round_trips() {
        for text in ["a", "`a", "()", "(a b c)", "(f (g `x) ())"] {
            let term = Term::parse(text).unwrap();
            assert_eq!(term.text().unwrap(), text);
        }
    }

    #[test]
    fn rendered_len_matches_text() {
        for text in ["a", "`ab", "()", "(a b c)", "((a) (b `c) ())"] {
            let term = Term::parse(text).unwrap();
            assert_eq!(term.rendered_len(), term.text().unwrap().len());
        }
    }

    #[test]
    fn equality_is_structural() {
        let a = Term::parse("(a b c)").unwrap();
        let b = Term::List(vec![
            Term::Item("a".into()),
            Term::Item("b".into()),
            Term::Item("c".into()),
        ]);
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn variable_and_item_are_distinct() {
        assert_ne!(Term::parse("a").unwrap(), Term::parse("`a").unwrap());
    }

    #[test]
    fn text_fails_under_tight_ceiling() {
        let term = Term::parse("(a b c)").unwrap();
        let _guard = crate::buffer::scoped(4);
        assert_eq!(
            term.text(),
            Err(DsError::BufferTooSmall {
                needed: 7,
                capacity: 4
            })
        );
    }

    #[test]
    fn from_bytes_parses_canonical_text() {
        assert_eq!(
            Term::from_bytes(b"(a b c)"),
            Ok(Term::parse("(a b c)").unwrap())
        );
        assert!(matches!(
            Term::from_bytes(&[0xff, 0xfe]),
            Err(DsError::Parse { .. })
        ));
    }

    #[test]
    fn parse_with_enforces_budget() {
        assert!(Term::parse_with("(a b c)", 7).is_ok());
        assert!(matches!(
            Term::parse_with("(a b c)", 6),
            Err(DsError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn copy_with_enforces_budget() {
        let term = Term::parse("(a b c)").unwrap();
        assert_eq!(term.copy_with(16), Ok(term.clone()));
        assert!(matches!(
            term.copy_with(4),
            Err(DsError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn is_ground() {
        assert!(Term::parse("(a (b) c)").unwrap().is_ground());
        assert!(!Term::parse("(a (`b) c)").unwrap().is_ground());
    }

    fn term_strategy() -> impl Strategy<Value = Term> {
        let name = "[a-z][a-z0-9_-]{0,6}";
        let leaf = prop_oneof![
            name.prop_map(Term::Item),
            name.prop_map(Term::Variable),
        ];
        leaf.prop_recursive(4, 48, 5, |inner| {
            prop::collection::vec(inner, 0..5).prop_map(Term::List)
        })
    }

    proptest! {
        #[test]
        fn parse_inverts_text(term in term_strategy()) {
            let text = term.text_with(usize::MAX).unwrap();
            prop_assert_eq!(Term::parse(&text).unwrap(), term);
        }

        #[test]
        fn rendered_len_is_exact(term in term_strategy()) {
            let text = term.text_with(usize::MAX).unwrap();
            prop_assert_eq!(term.rendered_len(), text.len());
        }
    }
}
