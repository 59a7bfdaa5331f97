//! Generic algorithms over whole trees.

use std::{
    collections::{HashMap, HashSet},
    convert::Infallible,
    sync::Arc,
};

use crate::{
    ast::{Hole, Term, TermKind, Variable},
    traverse::{fold_post_order, walk_post_order},
};

/// Rebuilds `term` bottom-up. Every node is first reconstructed from its
/// rebuilt children, then replaced by `rewrite` applied to it.
/// `rewrite` is applied exactly once per node, innermost first.
pub fn transform(term: &Term, rewrite: &mut impl FnMut(Term) -> Term) -> Term {
    let result = fold_post_order(term, &mut |node, children: Vec<Term>| {
        let rebuilt = if children.is_empty() {
            node.clone()
        } else {
            node.with_children(children.into_iter().map(Arc::new))
        };
        Ok::<_, Infallible>(rewrite(rebuilt))
    });
    match result {
        Ok(term) => term,
        Err(never) => match never {},
    }
}

/// Replaces every variable that is a key of `mapping` by its value.
pub fn substitute<V>(term: &Term, mapping: &HashMap<Variable, V>) -> Term
where
    V: Clone + Into<Term>,
{
    transform(term, &mut |node| match &node {
        Term::Var(var) => mapping.get(var).cloned().map_or(node, Into::into),
        _ => node,
    })
}

/// Replaces every hole bound in `bindings` by its bound term.
pub fn instantiate(pattern: &Term, bindings: &HashMap<Hole, Term>) -> Term {
    transform(pattern, &mut |node| match &node {
        Term::Hole(hole) => bindings.get(hole).cloned().unwrap_or(node),
        _ => node,
    })
}

/// All distinct subterms of `term` with the given constructor.
pub fn collect_by_kind(term: &Term, kind: TermKind) -> HashSet<Term> {
    let mut found = HashSet::new();
    let _ = walk_post_order(term, &mut |node: &Term| {
        if node.kind() == kind {
            found.insert(node.clone());
        }
        Ok::<_, Infallible>(())
    });
    found
}

pub fn collect_variables(term: &Term) -> HashSet<Variable> {
    let mut found = HashSet::new();
    let _ = walk_post_order(term, &mut |node: &Term| {
        if let Term::Var(var) = node {
            found.insert(var.clone());
        }
        Ok::<_, Infallible>(())
    });
    found
}

pub fn collect_holes(term: &Term) -> HashSet<Hole> {
    let mut found = HashSet::new();
    let _ = walk_post_order(term, &mut |node: &Term| {
        if let Term::Hole(hole) = node {
            found.insert(hole.clone());
        }
        Ok::<_, Infallible>(())
    });
    found
}
