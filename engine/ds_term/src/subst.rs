//! Substitution over terms: `ground`, `rename`, and `matches`.
//!
//! A substitution dictionary is itself a term: a list whose children are
//! all lists, each encoding one binding. Two binding shapes exist:
//!
//! - unscoped, `(var value)` -- the first element must be a variable;
//! - scoped, `(from to var value)` -- `from` and `to` are items naming the
//!   scope the binding applies in and the scope its value is read in.
//!
//! A lookup in scope `s` consults scoped bindings whose `from` is `s` and
//! falls back to unscoped bindings. An ill-shaped binding anywhere poisons
//! the whole dictionary: the operation returns `None` even when the bad
//! binding would never be consulted.

use crate::{buffer, Term};

/// One validated binding, borrowed from the dictionary term.
enum Binding<'dict> {
    Unscoped {
        var: &'dict str,
        value: &'dict Term,
    },
    Scoped {
        from: &'dict str,
        to: &'dict str,
        var: &'dict str,
        value: &'dict Term,
    },
}

/// Validate a dictionary term into its bindings. `None` on any shape
/// violation.
fn bindings(dict: &Term) -> Option<Vec<Binding<'_>>> {
    let Term::List(entries) = dict else {
        return None;
    };
    entries
        .iter()
        .map(|entry| {
            let Term::List(parts) = entry else {
                return None;
            };
            match parts.as_slice() {
                [Term::Variable(var), value] => Some(Binding::Unscoped {
                    var: var.as_str(),
                    value,
                }),
                [Term::Item(from), Term::Item(to), Term::Variable(var), value] => {
                    Some(Binding::Scoped {
                        from: from.as_str(),
                        to: to.as_str(),
                        var: var.as_str(),
                        value,
                    })
                }
                _ => None,
            }
        })
        .collect()
}

/// Replace one variable, chaining through scopes.
///
/// A scoped hit re-grounds its value in the binding's target scope. The
/// walk over (scope, variable) states is deterministic, so any chain longer
/// than the number of scoped bindings has revisited a state and will never
/// terminate; `chain_budget` cuts it off.
fn resolve(
    name: &str,
    bindings: &[Binding<'_>],
    scope: Option<&str>,
    chain_budget: usize,
) -> Option<Term> {
    if let Some(current) = scope {
        for binding in bindings {
            if let Binding::Scoped {
                from,
                to,
                var,
                value,
            } = binding
            {
                if *from == current && *var == name {
                    if chain_budget == 0 {
                        return None;
                    }
                    return ground_rec(value, bindings, Some(*to), chain_budget - 1);
                }
            }
        }
    }
    for binding in bindings {
        if let Binding::Unscoped { var, value } = binding {
            if *var == name {
                // One pass only: the substituted value is taken verbatim.
                return Some((*value).clone());
            }
        }
    }
    Some(Term::Variable(name.to_owned()))
}

fn ground_rec(
    term: &Term,
    bindings: &[Binding<'_>],
    scope: Option<&str>,
    chain_budget: usize,
) -> Option<Term> {
    match term {
        Term::Item(_) => Some(term.clone()),
        Term::Variable(name) => resolve(name, bindings, scope, chain_budget),
        Term::List(children) => children
            .iter()
            .map(|child| ground_rec(child, bindings, scope, chain_budget))
            .collect::<Option<Vec<_>>>()
            .map(Term::List),
    }
}

fn rename_rec(term: &Term, prefix: &str, suffix: &str) -> Term {
    match term {
        Term::Item(_) => term.clone(),
        Term::Variable(name) => Term::Variable(format!("{prefix}{name}{suffix}")),
        Term::List(children) => Term::List(
            children
                .iter()
                .map(|child| rename_rec(child, prefix, suffix))
                .collect(),
        ),
    }
}

/// Walk `a` and `b` in parallel, recording what each variable of `a` stands
/// for. Conflicting rebindings fail.
fn match_rec(a: &Term, b: &Term, recorded: &mut Vec<(String, Term)>) -> Option<()> {
    match (a, b) {
        (Term::Variable(name), _) => {
            if let Some((_, bound)) = recorded.iter().find(|(var, _)| var.as_str() == name) {
                if bound == b {
                    Some(())
                } else {
                    None
                }
            } else {
                recorded.push((name.clone(), b.clone()));
                Some(())
            }
        }
        (Term::Item(x), Term::Item(y)) if x == y => Some(()),
        (Term::List(xs), Term::List(ys)) if xs.len() == ys.len() => {
            for (x, y) in xs.iter().zip(ys) {
                match_rec(x, y, recorded)?;
            }
            Some(())
        }
        _ => None,
    }
}

/// `None` when the rendering exceeds the ambient ceiling -- the in-band
/// resource failure of the substitution operations.
fn fits_ambient(term: Term) -> Option<Term> {
    if term.rendered_len() > buffer::capacity() {
        return None;
    }
    Some(term)
}

impl Term {
    /// Ground this term: replace every variable by its value in `dict`.
    ///
    /// Items and list structure are preserved; unbound variables stay as
    /// they are. `None` on an ill-shaped dictionary, on a scope cycle, or
    /// when the result would exceed the ambient ceiling.
    pub fn ground(&self, dict: &Term, scope: Option<&str>) -> Option<Term> {
        let bindings = bindings(dict)?;
        let scoped_count = bindings
            .iter()
            .filter(|b| matches!(b, Binding::Scoped { .. }))
            .count();
        let result = ground_rec(self, &bindings, scope, scoped_count)?;
        fits_ambient(result)
    }

    /// Rename every variable with the prefixes and suffixes in `rho`.
    ///
    /// `rho` has the shape `((prefix...) (suffix...))`, both lists
    /// all-items and possibly empty. Each list concatenates in reverse
    /// order, which is what makes successive renames compose by
    /// concatenation. `None` on a malformed `rho` or on overflow.
    pub fn rename(&self, rho: &Term) -> Option<Term> {
        let Term::List(parts) = rho else {
            return None;
        };
        let [Term::List(prefixes), Term::List(suffixes)] = parts.as_slice() else {
            return None;
        };
        let joined = |items: &[Term]| -> Option<String> {
            let mut out = String::new();
            for item in items.iter().rev() {
                let Term::Item(name) = item else {
                    return None;
                };
                out.push_str(name);
            }
            Some(out)
        };
        let prefix = joined(prefixes)?;
        let suffix = joined(suffixes)?;
        let result = rename_rec(self, &prefix, &suffix);
        fits_ambient(result)
    }

    /// Compute the substitution that takes this term to `b`.
    ///
    /// The result is itself a term: the dictionary of recorded bindings in
    /// first-recorded order. When both scopes are supplied each binding is
    /// emitted in the scoped 4-element shape. `None` when the terms do not
    /// match or the dictionary would exceed the ambient ceiling.
    pub fn matches(
        &self,
        b: &Term,
        scope_a: Option<&str>,
        scope_b: Option<&str>,
    ) -> Option<Term> {
        let mut recorded = Vec::new();
        match_rec(self, b, &mut recorded)?;
        let entries = recorded
            .into_iter()
            .map(|(var, value)| match (scope_a, scope_b) {
                (Some(from), Some(to)) => Term::List(vec![
                    Term::Item(from.to_owned()),
                    Term::Item(to.to_owned()),
                    Term::Variable(var),
                    value,
                ]),
                _ => Term::List(vec![Term::Variable(var), value]),
            })
            .collect();
        let dict = Term::List(entries);
        if dict.rendered_len() > buffer::capacity() {
            return None;
        }
        Some(dict)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(text: &str) -> Term {
        Term::parse(text).unwrap()
    }

    #[test]
    fn ground_simple() {
        assert_eq!(t("`a").ground(&t("((`a b))"), None), Some(t("b")));
    }

    #[test]
    fn ground_preserves_structure() {
        assert_eq!(
            t("(f `x (g `x a))").ground(&t("((`x (h c)))"), None),
            Some(t("(f (h c) (g (h c) a))"))
        );
    }

    #[test]
    fn ground_is_one_pass() {
        // The substituted value is not re-substituted.
        assert_eq!(t("`a").ground(&t("((`a `b) (`b c))"), None), Some(t("`b")));
    }

    #[test]
    fn ground_leaves_unbound_variables() {
        assert_eq!(t("(`x `y)").ground(&t("((`x a))"), None), Some(t("(a `y)")));
    }

    #[test]
    fn ground_rejects_malformed_binding() {
        // Five elements: neither binding shape.
        assert_eq!(t("`a").ground(&t("((`a b c d e))"), None), None);
        // First element of an unscoped binding must be a variable.
        assert_eq!(t("`a").ground(&t("((a b))"), None), None);
        // Scoped binding without item tags.
        assert_eq!(t("`a").ground(&t("((`x y `a b))"), None), None);
        // The dictionary must be a list of lists.
        assert_eq!(t("`a").ground(&t("(a)"), None), None);
        assert_eq!(t("`a").ground(&t("a"), None), None);
    }

    #[test]
    fn malformed_binding_poisons_unused_lookups() {
        // `a has a fine unscoped binding, but the later entry is ill-shaped.
        assert_eq!(t("`a").ground(&t("((`a b) (c))"), None), None);
    }

    #[test]
    fn ground_scope_chains_through_target_scope() {
        let dict = t("((x y `a `b) (y x `b `c))");
        assert_eq!(t("`a").ground(&dict, Some("x")), Some(t("`c")));
    }

    #[test]
    fn ground_scope_falls_back_to_unscoped() {
        let dict = t("((x y `a `b) (`c d))");
        assert_eq!(t("`c").ground(&dict, Some("x")), Some(t("d")));
    }

    #[test]
    fn ground_scope_cycle_is_cut() {
        assert_eq!(t("`a").ground(&t("((x x `a `a))"), Some("x")), None);
    }

    #[test]
    fn ground_overflow_returns_none() {
        let _guard = crate::buffer::scoped(4);
        assert_eq!(t("`a").ground(&t("((`a (b c d e)))"), None), None);
    }

    #[test]
    fn ground_on_ground_term_is_identity() {
        let term = t("(f (g a) b)");
        assert_eq!(term.ground(&t("((`x y))"), None), Some(term.clone()));
    }

    #[test]
    fn rename_prefix_and_suffix() {
        assert_eq!(
            t("`x").rename(&t("((pre_) (_suf))")),
            Some(t("`pre_x_suf"))
        );
    }

    #[test]
    fn rename_empty_affixes() {
        assert_eq!(t("(`x a)").rename(&t("(() ())")), Some(t("(`x a)")));
    }

    #[test]
    fn rename_composes_by_reverse_concatenation() {
        let term = t("(f `x `y)");
        let once = t("((p1) (s1))");
        let then = t("((p2) (s2))");
        let combined = t("((p1 p2) (s2 s1))");
        let sequential = term.rename(&once).unwrap().rename(&then).unwrap();
        assert_eq!(Some(sequential), term.rename(&combined));
    }

    #[test]
    fn rename_rejects_malformed_shape() {
        assert_eq!(t("`x").rename(&t("((a))")), None);
        assert_eq!(t("`x").rename(&t("((a) (b) (c))")), None);
        assert_eq!(t("`x").rename(&t("((`a) (b))")), None);
        assert_eq!(t("`x").rename(&t("a")), None);
    }

    #[test]
    fn match_binds_variables() {
        assert_eq!(
            t("(f `x a)").matches(&t("(f b a)"), None, None),
            Some(t("((`x b))"))
        );
    }

    #[test]
    fn match_requires_identical_items() {
        assert_eq!(t("(f a)").matches(&t("(g a)"), None, None), None);
    }

    #[test]
    fn match_requires_equal_lengths() {
        assert_eq!(t("(f a)").matches(&t("(f a b)"), None, None), None);
    }

    #[test]
    fn match_conflicting_rebinding_fails() {
        assert_eq!(t("(`x `x)").matches(&t("(a b)"), None, None), None);
        assert_eq!(
            t("(`x `x)").matches(&t("(a a)"), None, None),
            Some(t("((`x a))"))
        );
    }

    #[test]
    fn match_variable_captures_whole_subterm() {
        assert_eq!(
            t("`x").matches(&t("(f a (g b))"), None, None),
            Some(t("((`x (f a (g b))))"))
        );
    }

    #[test]
    fn match_with_scopes_emits_scoped_bindings() {
        assert_eq!(
            t("(f `x)").matches(&t("(f b)"), Some("s"), Some("u")),
            Some(t("((s u `x b))"))
        );
    }

    #[test]
    fn match_soundness() {
        let a = t("(f `x (g `y a))");
        let b = t("(f one (g (two) a))");
        let dict = a.matches(&b, None, None).unwrap();
        assert_eq!(a.ground(&dict, None), Some(b));
    }
}
