use std::collections::HashSet;

use itertools::Either;
use z3::{
    Context, Goal, Model, SatResult, Solver, Tactic,
    ast::{self, Ast},
};

use common::{log_debug, log_trace};
use term::{
    Assignment, BitVector, Constant, Term, TermRef, Type, Variable,
    transform::collect_variables, typing::type_of,
};

use super::{BVExt, decode::Decoder, encode::Compiler, marshal::Marshaller, node::AstNode};
use crate::{SolverError, config::InterpolationConfig};

/// A single top-level query against a context that lives only as long as the
/// query does.
pub(crate) struct Query<'ctx> {
    context: &'ctx Context,
    solver: Solver<'ctx>,
    marshaller: Marshaller,
}

impl<'ctx> Query<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        Self {
            context,
            solver: Solver::new(context),
            marshaller: Marshaller::default(),
        }
    }

    pub fn compile(&mut self, clauses: &[TermRef]) -> Result<Vec<ast::Bool<'ctx>>, SolverError> {
        let mut compiler = Compiler::new(self.context, &mut self.marshaller);
        clauses
            .iter()
            .map(|clause| compiler.compile_clause(clause))
            .collect()
    }

    pub fn assert_all(&self, asts: &[ast::Bool<'ctx>]) {
        for ast in asts {
            self.solver.assert(ast);
        }
    }

    /// Checks the asserted clauses and extracts a model if they are satisfiable.
    pub fn check(&self) -> Result<Option<Assignment>, SolverError> {
        let result = self.solver.check();
        log_debug!("Z3 answered {result:?}");
        match result {
            SatResult::Sat => self.model().map(Some),
            SatResult::Unsat => Ok(None),
            SatResult::Unknown => Err(self.unknown()),
        }
    }

    /// Checks the asserted clauses under `assumptions`; an unsatisfiable
    /// outcome yields the assumptions found in the core, in their order.
    pub fn check_with_core(
        &mut self,
        assumptions: &[TermRef],
    ) -> Result<Either<Assignment, Vec<TermRef>>, SolverError> {
        let asts = self.compile(assumptions)?;
        let trackers = asts
            .iter()
            .map(|ast| {
                let tracker = ast::Bool::fresh_const(self.context, "track");
                self.solver.assert(&tracker.implies(ast));
                tracker
            })
            .collect::<Vec<_>>();

        let result = self.solver.check_assumptions(&trackers);
        log_debug!("Z3 answered {result:?} under {} assumptions", trackers.len());
        match result {
            SatResult::Sat => self.model().map(Either::Left),
            SatResult::Unsat => {
                let core = self.solver.get_unsat_core();
                let conflicting = trackers
                    .iter()
                    .zip(assumptions)
                    .filter(|(tracker, _)| core.contains(*tracker))
                    .map(|(_, assumption)| assumption.clone())
                    .collect::<Vec<_>>();
                log_debug!(
                    "Unsat core has {} of {} assumptions",
                    conflicting.len(),
                    assumptions.len()
                );
                Ok(Either::Right(conflicting))
            }
            SatResult::Unknown => Err(self.unknown()),
        }
    }

    /// Computes an interpolant of two jointly unsatisfiable groups. The
    /// strongest one, `left` projected onto the shared variables, is tried
    /// first. When its projection cannot be expressed as a term (e.g. it
    /// needs integer `mod`), the weakest one, the negated projection of
    /// `right`, is returned instead.
    pub fn interpolant(
        &self,
        (left, left_asts): (&[TermRef], &[ast::Bool<'ctx>]),
        (right, right_asts): (&[TermRef], &[ast::Bool<'ctx>]),
        config: &InterpolationConfig,
    ) -> Result<Term, SolverError> {
        let left_vars = variables(left);
        let right_vars = variables(right);
        let interpolant = match self.project(left_asts, &left_vars, &right_vars, config) {
            Err(SolverError::Unsupported { construct }) => {
                log_debug!("Falling back to the weakest interpolant, projection has {construct}");
                self.project(right_asts, &right_vars, &left_vars, config)
                    .map(Term::not)?
            }
            result => result?,
        };
        log_debug!("Interpolant: {interpolant}");
        Ok(interpolant)
    }

    /// Eliminates the variables in `vars` but not in `kept` from the
    /// conjunction of `asts` and decodes what the tactic leaves.
    fn project(
        &self,
        asts: &[ast::Bool<'ctx>],
        vars: &HashSet<Variable>,
        kept: &HashSet<Variable>,
        config: &InterpolationConfig,
    ) -> Result<Term, SolverError> {
        let ctx = self.context;
        let conjunction = ast::Bool::and(ctx, &asts.iter().collect::<Vec<_>>());
        let bounds = vars
            .difference(kept)
            .map(|var| self.declared(var))
            .collect::<Result<Vec<_>, _>>()?;
        log_trace!("Eliminating {} local variables", bounds.len());
        let projected = if bounds.is_empty() {
            conjunction
        } else {
            let bounds = bounds.iter().map(AstNode::ast).collect::<Vec<_>>();
            ast::exists_const(ctx, &bounds, &[], &conjunction)
        };

        let mut tactic = Tactic::new(ctx, &config.tactic);
        if config.simplify {
            tactic = tactic.and_then(&Tactic::new(ctx, "simplify"));
        }
        let goal = Goal::new(ctx, false, false, false);
        goal.assert(&projected);
        let subgoals = tactic
            .apply(&goal, None)
            .map_err(SolverError::backend)?
            .list_subgoals()
            .map(|subgoal| {
                let formulas = subgoal.get_formulas::<ast::Bool>();
                ast::Bool::and(ctx, &formulas.iter().collect::<Vec<_>>())
            })
            .collect::<Vec<_>>();
        let mut result = ast::Bool::or(ctx, &subgoals.iter().collect::<Vec<_>>());
        if config.simplify {
            result = result.simplify();
        }
        Decoder::new(&self.marshaller).decode(&ast::Dynamic::from_ast(&result))
    }

    /// Re-declares a variable that already appears in the query.
    fn declared(&self, var: &Variable) -> Result<AstNode<'ctx>, SolverError> {
        self.marshaller
            .entries()
            .find(|(known, _)| *known == var)
            .map(|(_, name)| AstNode::constant(self.context, name, var.ty()))
            .ok_or_else(|| SolverError::backend(format!("variable {var} was never declared")))
    }

    fn model(&self) -> Result<Assignment, SolverError> {
        let model = self
            .solver
            .get_model()
            .ok_or_else(|| SolverError::backend("no model for a satisfiable query"))?;
        log_trace!("Reading {} values from the model", self.marshaller.len());
        self.marshaller
            .entries()
            .map(|(var, name)| {
                let node = AstNode::constant(self.context, name, var.ty());
                Ok((var.clone(), evaluate(&model, &node, var.ty())?))
            })
            .collect()
    }

    fn unknown(&self) -> SolverError {
        SolverError::Unknown {
            reason: self
                .solver
                .get_reason_unknown()
                .unwrap_or_else(|| "no reason given".to_owned()),
        }
    }

    /// Encodes `term` and decodes the result right away.
    pub fn round_trip(&mut self, term: &Term) -> Result<Term, SolverError> {
        type_of(term)?;
        let node = Compiler::new(self.context, &mut self.marshaller).compile(term)?;
        Decoder::new(&self.marshaller).decode(&node.dyn_ast())
    }
}

fn evaluate<'ctx>(
    model: &Model<'ctx>,
    node: &AstNode<'ctx>,
    ty: Type,
) -> Result<Constant, SolverError> {
    let undecodable = || SolverError::backend(format!("model value of `{node}` is not a numeral"));
    let value = match node {
        AstNode::Bool(ast) => model
            .eval(ast, true)
            .and_then(|value| value.as_bool())
            .map(Constant::Bool),
        AstNode::Int(ast) => model
            .eval(ast, true)
            .and_then(|value| value.as_i64())
            .map(Constant::Int),
        AstNode::BitVector(ast) => {
            let width = ty.bv_width().ok_or_else(undecodable)?;
            model
                .eval(ast, true)
                .and_then(|value| value.as_u128())
                .map(|bits| BitVector::new(bits, width).into())
        }
    };
    value.ok_or_else(undecodable)
}

fn variables(clauses: &[TermRef]) -> HashSet<Variable> {
    clauses
        .iter()
        .flat_map(|clause| collect_variables(clause))
        .collect()
}
