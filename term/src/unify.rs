//! One-directional syntactic unification of patterns against ground terms.

use std::collections::HashMap;

use derive_more as dm;

use crate::{
    ast::{Hole, Term},
    traverse::{Descent, PreOrderVisitor, walk_pre_order},
    typing::type_of,
};

/// The terms that the holes of a pattern resolved to.
pub type Unifier = HashMap<Hole, Term>;

#[derive(Debug, Clone, PartialEq, Eq, dm::Display, dm::Error)]
pub enum UnifyError {
    /// Holes may only appear in the pattern.
    #[display("hole {hole} found in the concrete term")]
    HoleInConcrete { hole: Hole },
}

/// Matches `pattern` against `concrete`.
///
/// Returns `Ok(None)` if they do not match, and the binding of every hole of
/// the pattern otherwise. All occurrences of the same hole must bind to equal
/// terms.
pub fn unify(pattern: &Term, concrete: &Term) -> Result<Option<Unifier>, UnifyError> {
    let mut matcher = Matcher {
        pending: vec![concrete],
        unifier: Unifier::new(),
        failed: false,
        error: None,
    };
    let _ = walk_pre_order(pattern, &mut matcher);

    if let Some(error) = matcher.error {
        return Err(error);
    }
    Ok((!matcher.failed).then_some(matcher.unifier))
}

/// Walks the pattern in pre-order while popping the concrete counterpart of
/// every pattern node from `pending`.
struct Matcher<'c> {
    pending: Vec<&'c Term>,
    unifier: Unifier,
    failed: bool,
    error: Option<UnifyError>,
}

impl Matcher<'_> {
    fn fail(&mut self) -> Descent {
        self.failed = true;
        Descent::Halt
    }

    fn bind(&mut self, hole: &Hole, concrete: &Term) -> bool {
        if !hole.class.admits(concrete) {
            return false;
        }
        if type_of(concrete).ok() != Some(hole.ty) {
            return false;
        }
        match self.unifier.get(hole) {
            Some(bound) => bound == concrete,
            None => {
                self.unifier.insert(hole.clone(), concrete.clone());
                true
            }
        }
    }
}

impl<'p> PreOrderVisitor<'p> for Matcher<'_> {
    fn visit(&mut self, pattern: &'p Term) -> Descent {
        if self.failed || self.error.is_some() {
            return Descent::Halt;
        }

        let Some(concrete) = self.pending.pop() else {
            return self.fail();
        };

        if let Term::Hole(hole) = concrete {
            self.error = Some(UnifyError::HoleInConcrete { hole: hole.clone() });
            return Descent::Halt;
        }

        let same_constructor = match (pattern, concrete) {
            (Term::Hole(hole), _) => {
                if let Some(nested) = first_hole(concrete) {
                    self.error = Some(UnifyError::HoleInConcrete {
                        hole: nested.clone(),
                    });
                    return Descent::Halt;
                }
                return if self.bind(hole, concrete) {
                    Descent::Skip
                } else {
                    self.fail()
                };
            }
            (Term::Const(_) | Term::Var(_), _) => {
                return if pattern == concrete {
                    Descent::Skip
                } else {
                    self.fail()
                };
            }
            (Term::Unary { op: p, .. }, Term::Unary { op: c, .. }) => p == c,
            (Term::Binary { op: p, .. }, Term::Binary { op: c, .. }) => p == c,
            (Term::Ite { .. }, Term::Ite { .. }) => true,
            (
                Term::Apply {
                    func: p_func,
                    args: p_args,
                },
                Term::Apply {
                    func: c_func,
                    args: c_args,
                },
            ) => p_func == c_func && p_args.len() == c_args.len(),
            _ => false,
        };
        if !same_constructor {
            return self.fail();
        }

        // The pattern's children are walked left to right, so the concrete
        // children are pushed right to left.
        self.pending
            .extend(concrete.children().into_iter().rev().map(|child| &**child));
        Descent::Children
    }
}

fn first_hole(term: &Term) -> Option<&Hole> {
    match term {
        Term::Hole(hole) => Some(hole),
        _ => term.children().into_iter().find_map(|child| first_hole(child)),
    }
}
