//! Forward-search engine over DS rules and facts.
//!
//! A [`Search`] holds a knowledge base of deduplicated rules (length >= 1)
//! and facts (length 0) and derives the deductive closure of the base,
//! streaming every newly derived rule to a caller-supplied predicate.
//!
//! Admission is governed by two byte budgets: `limit_size` bounds the
//! canonical rendering of any single admitted or derived rule, and
//! `buffer_size` is the scratch ceiling applied to every substitution and
//! serialisation performed while searching. Oversize input is not an
//! error -- `add` returns `false` and mid-search overruns silently drop
//! the derivation.

mod search;

pub use search::Search;
