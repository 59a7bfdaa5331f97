//! The two traversal disciplines over terms.
//!
//! Post-order walks fire a node's handler after all of its children have been
//! processed. Pre-order walks fire the handler first and let it decide which
//! children are walked next, and in which order.

use core::ops::ControlFlow;

use crate::ast::Term;

/// Receives nodes in post-order.
pub trait Visitor<'t> {
    type Error;

    fn visit(&mut self, term: &'t Term) -> Result<(), Self::Error>;
}

impl<'t, F, E> Visitor<'t> for F
where
    F: FnMut(&'t Term) -> Result<(), E>,
{
    type Error = E;

    #[inline]
    fn visit(&mut self, term: &'t Term) -> Result<(), E> {
        self(term)
    }
}

/// Visits every node of `term`, children (left to right) before parents.
/// The walk stops at the first error.
pub fn walk_post_order<'t, V>(term: &'t Term, visitor: &mut V) -> Result<(), V::Error>
where
    V: Visitor<'t> + ?Sized,
{
    for child in term.children() {
        walk_post_order(child, visitor)?;
    }
    visitor.visit(term)
}

/// Combines the results of the children of every node into the result of the
/// node, bottom-up.
pub fn fold_post_order<T, E>(
    term: &Term,
    combine: &mut impl FnMut(&Term, Vec<T>) -> Result<T, E>,
) -> Result<T, E> {
    let children = term
        .children()
        .into_iter()
        .map(|child| fold_post_order(child, combine))
        .collect::<Result<Vec<_>, _>>()?;
    combine(term, children)
}

/// What a pre-order walk does after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descent {
    /// Walk the children left to right.
    Children,
    /// Walk the children right to left.
    ChildrenReversed,
    /// Do not walk the children of this node.
    Skip,
    /// Stop the whole walk.
    Halt,
}

/// Receives nodes in pre-order and steers the walk.
pub trait PreOrderVisitor<'t> {
    fn visit(&mut self, term: &'t Term) -> Descent;
}

pub fn walk_pre_order<'t, V>(term: &'t Term, visitor: &mut V) -> ControlFlow<()>
where
    V: PreOrderVisitor<'t> + ?Sized,
{
    match visitor.visit(term) {
        Descent::Children => {
            for child in term.children() {
                walk_pre_order(child, visitor)?;
            }
        }
        Descent::ChildrenReversed => {
            for child in term.children().into_iter().rev() {
                walk_pre_order(child, visitor)?;
            }
        }
        Descent::Skip => {}
        Descent::Halt => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Variable;

    fn sample() -> Term {
        // (a + (b * 2)) < c
        Term::less(
            Term::add(
                Variable::int("a"),
                Term::mul(Variable::int("b"), Term::int(2)),
            ),
            Variable::int("c"),
        )
    }

    #[test]
    fn post_order_visits_children_first() {
        let term = sample();
        let mut seen = Vec::new();
        walk_post_order(&term, &mut |t: &Term| {
            seen.push(t.to_string());
            Ok::<_, ()>(())
        })
        .unwrap();
        assert_eq!(
            seen,
            ["a", "b", "2", "(b * 2)", "(a + (b * 2))", "c", term.to_string().as_str()]
        );
    }

    #[test]
    fn post_order_stops_at_first_error() {
        let term = sample();
        let mut count = 0;
        let result = walk_post_order(&term, &mut |t: &Term| {
            count += 1;
            if matches!(t, Term::Const(_)) { Err(t.clone()) } else { Ok(()) }
        });
        assert_eq!(result, Err(Term::int(2)));
        assert_eq!(count, 3);
    }

    #[test]
    fn fold_combines_children() {
        let depth = fold_post_order(&sample(), &mut |_, children: Vec<usize>| {
            Ok::<_, ()>(children.into_iter().max().map_or(1, |d| d + 1))
        });
        assert_eq!(depth, Ok(4));
    }

    struct Recorder {
        seen: Vec<String>,
        descent: fn(&Term) -> Descent,
    }

    impl<'t> PreOrderVisitor<'t> for Recorder {
        fn visit(&mut self, term: &'t Term) -> Descent {
            self.seen.push(term.to_string());
            (self.descent)(term)
        }
    }

    #[test]
    fn pre_order_follows_the_requested_descent() {
        let term = sample();
        let mut recorder = Recorder {
            seen: Vec::new(),
            descent: |t| match t {
                Term::Binary { .. } if t.to_string().starts_with("(b") => Descent::Skip,
                _ => Descent::ChildrenReversed,
            },
        };
        assert!(walk_pre_order(&term, &mut recorder).is_continue());
        assert_eq!(
            recorder.seen,
            [term.to_string().as_str(), "c", "(a + (b * 2))", "(b * 2)", "a"]
        );
    }

    #[test]
    fn pre_order_halts() {
        let term = sample();
        let mut recorder = Recorder {
            seen: Vec::new(),
            descent: |t| {
                if matches!(t, Term::Var(_)) {
                    Descent::Halt
                } else {
                    Descent::Children
                }
            },
        };
        assert!(walk_pre_order(&term, &mut recorder).is_break());
        assert_eq!(recorder.seen.last().map(String::as_str), Some("a"));
        assert_eq!(recorder.seen.len(), 3);
    }
}
