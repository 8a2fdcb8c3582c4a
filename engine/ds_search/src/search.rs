//! The knowledge base and its resolution loop.

use std::collections::VecDeque;

use ds_term::{buffer, Rule};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

/// Forward-search engine: admission, deduplication, fixed-point resolution.
///
/// Derivation order is deterministic given admission order: the worklist of
/// (rule, fact) pairs is FIFO and every admitted item is enumerated exactly
/// once against all partners that existed when it was admitted.
pub struct Search {
    /// Ceiling on the canonical rendering of any admitted or derived rule.
    limit_size: usize,
    /// Scratch ceiling for substitution and serialisation during search.
    buffer_size: usize,
    rules: Vec<Rule>,
    facts: Vec<Rule>,
    /// Canonical renderings of admitted rules and facts, for dedup.
    rule_keys: FxHashSet<String>,
    fact_keys: FxHashSet<String>,
    /// Pending (rule index, fact index) resolution pairs.
    worklist: VecDeque<(usize, usize)>,
}

impl Search {
    /// Create an engine with the given budgets.
    pub fn new(limit_size: usize, buffer_size: usize) -> Search {
        Search {
            limit_size,
            buffer_size,
            rules: Vec::new(),
            facts: Vec::new(),
            rule_keys: FxHashSet::default(),
            fact_keys: FxHashSet::default(),
            worklist: VecDeque::new(),
        }
    }

    /// Ceiling for single-rule renderings in the next cycle.
    pub fn set_limit_size(&mut self, limit_size: usize) {
        self.limit_size = limit_size;
    }

    /// Scratch ceiling for the next cycle.
    pub fn set_buffer_size(&mut self, buffer_size: usize) {
        self.buffer_size = buffer_size;
    }

    /// Discard the knowledge base and pending work; keep the budgets.
    pub fn reset(&mut self) {
        self.rules.clear();
        self.facts.clear();
        self.rule_keys.clear();
        self.fact_keys.clear();
        self.worklist.clear();
    }

    /// Parse `text` as a rule and admit it.
    ///
    /// Returns `true` only on a new admission: unparsable text, a rendering
    /// wider than either budget, and duplicates all return `false`.
    pub fn add(&mut self, text: &str) -> bool {
        match Rule::parse(text) {
            Ok(rule) => self.admit(rule),
            Err(error) => {
                debug!(%error, "rejecting unparsable input");
                false
            }
        }
    }

    /// Drive resolution to a fixed point, delivering each newly derived
    /// rule to `callback` right after it is admitted.
    ///
    /// A `true` return from the callback stops the search before any
    /// further derivation. Returns the number of callback invocations.
    /// Dropped derivations -- failed matches, budget overruns, duplicates
    /// -- are never delivered.
    pub fn execute<F>(&mut self, mut callback: F) -> usize
    where
        F: FnMut(&Rule) -> bool,
    {
        let _scratch = buffer::scoped(self.buffer_size);
        let mut delivered = 0usize;
        while let Some((rule_index, fact_index)) = self.worklist.pop_front() {
            let rule = self.rules[rule_index].clone();
            let fact = self.facts[fact_index].clone();
            for (index, premise) in rule.premises().iter().enumerate() {
                let Some(dict) = premise.matches(fact.conclusion(), None, None) else {
                    continue;
                };
                let Some(grounded) = rule.ground(&dict, None) else {
                    trace!("substitution exceeded the scratch budget");
                    continue;
                };
                if grounded.rendered_len() > self.limit_size {
                    debug!(
                        size = grounded.rendered_len(),
                        limit = self.limit_size,
                        "dropping derivation over the size limit"
                    );
                    continue;
                }
                let Ok(derived) = grounded.without_premise(index) else {
                    continue;
                };
                if self.admit(derived.clone()) {
                    delivered += 1;
                    if callback(&derived) {
                        return delivered;
                    }
                }
            }
        }
        delivered
    }

    /// Admit a rule or fact: budget check, dedup, and pairing with the
    /// pre-existing opposite-kind set.
    fn admit(&mut self, rule: Rule) -> bool {
        let Ok(key) = rule.text_with(self.buffer_size) else {
            debug!(buffer = self.buffer_size, "rejecting rule wider than the scratch budget");
            return false;
        };
        if key.len() > self.limit_size {
            debug!(
                size = key.len(),
                limit = self.limit_size,
                "rejecting oversize rule"
            );
            return false;
        }
        if rule.is_fact() {
            if !self.fact_keys.insert(key) {
                return false;
            }
            let fact_index = self.facts.len();
            self.facts.push(rule);
            for rule_index in 0..self.rules.len() {
                self.worklist.push_back((rule_index, fact_index));
            }
        } else {
            if !self.rule_keys.insert(key) {
                return false;
            }
            let rule_index = self.rules.len();
            self.rules.push(rule);
            for fact_index in 0..self.facts.len() {
                self.worklist.push_back((rule_index, fact_index));
            }
        }
        true
    }
}

impl Default for Search {
    fn default() -> Search {
        Search::new(1000, 10_000)
    }
}
