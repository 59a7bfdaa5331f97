use itertools::Itertools;
use z3::ast::{self, Ast};
use z3_sys::{AstKind, DeclKind as DK, SortKind};

use term::{BinaryOp, Term};

use super::{BVExt, marshal::Marshaller};
use crate::SolverError;

/// Reconstructs terms from backend terms, recovering variables through the
/// marshaller of the query that produced them.
pub(crate) struct Decoder<'m> {
    marshaller: &'m Marshaller,
}

impl<'m> Decoder<'m> {
    pub fn new(marshaller: &'m Marshaller) -> Self {
        Self { marshaller }
    }

    pub fn decode(&self, ast: &ast::Dynamic) -> Result<Term, SolverError> {
        match ast.kind() {
            AstKind::Numeral => return self.numeral(ast),
            AstKind::App => {}
            AstKind::Quantifier => {
                return Err(SolverError::unsupported(format!("quantifier `{ast}`")));
            }
            kind => return Err(SolverError::unsupported(format!("{kind:?} `{ast}`"))),
        }

        let decl = ast.decl();
        let kind = decl.kind();
        let args = ast.children();

        let term = match kind {
            DK::TRUE => Term::bool(true),
            DK::FALSE => Term::bool(false),
            DK::UNINTERPRETED if args.is_empty() => {
                let name = decl.name();
                let var = self.marshaller.variable(&name).ok_or_else(|| {
                    SolverError::backend(format!("undeclared constant `{name}`"))
                })?;
                Term::Var(var.clone())
            }
            DK::UNINTERPRETED => {
                return Err(SolverError::unsupported(format!(
                    "uninterpreted function application `{ast}`"
                )));
            }

            DK::AND => self.fold(&args, Term::and, Some(Term::bool(true)))?,
            DK::OR => self.fold(&args, Term::or, Some(Term::bool(false)))?,
            DK::NOT => Term::not(self.single(&args)?),
            DK::IMPLIES => self.fold_right(&args, Term::implies)?,
            DK::IFF => self.chain(&args, Term::iff)?,
            DK::XOR => self.fold(&args, |a, b| Term::not(Term::iff(a, b)), None)?,
            DK::ITE => {
                let [cond, then, otherwise] = self.operands(&args)?;
                Term::ite(cond, then, otherwise)
            }
            DK::EQ => self.chain(&args, equality(&args))?,
            DK::DISTINCT => {
                let equal = equality(&args);
                self.decode_all(&args)?
                    .iter()
                    .tuple_combinations()
                    .map(|(a, b)| Term::not(equal(a.clone(), b.clone())))
                    .reduce(Term::and)
                    .ok_or_else(|| SolverError::backend(format!("malformed `{ast}`")))?
            }

            DK::ADD => self.fold(&args, Term::add, None)?,
            DK::SUB => self.fold(&args, Term::sub, None)?,
            DK::UMINUS => Term::minus(self.single(&args)?),
            DK::MUL => self.fold(&args, Term::mul, None)?,
            DK::IDIV => self.binary(&args, BinaryOp::Div)?,
            DK::LE => self.binary(&args, BinaryOp::LessOrEqual)?,
            DK::LT => self.binary(&args, BinaryOp::Less)?,
            DK::GE => self.binary(&args, BinaryOp::GreaterOrEqual)?,
            DK::GT => self.binary(&args, BinaryOp::Greater)?,

            DK::BNEG => Term::bv_neg(self.single(&args)?),
            DK::BNOT => Term::bv_not(self.single(&args)?),
            DK::BADD => self.fold(&args, Term::bv_add, None)?,
            DK::BSUB => self.fold(&args, Term::bv_sub, None)?,
            DK::BMUL => self.fold(&args, Term::bv_mul, None)?,
            DK::BAND => self.fold(&args, Term::bv_and, None)?,
            DK::BOR => self.fold(&args, Term::bv_or, None)?,
            DK::BXOR => self.fold(&args, Term::bv_xor, None)?,
            DK::BSDIV => self.binary(&args, BinaryOp::BVSignedDiv)?,
            DK::BUDIV => self.binary(&args, BinaryOp::BVUnsignedDiv)?,
            DK::BSREM => self.binary(&args, BinaryOp::BVSignedRem)?,
            DK::BUREM => self.binary(&args, BinaryOp::BVUnsignedRem)?,
            DK::BSMOD => self.binary(&args, BinaryOp::BVSignedMod)?,
            DK::BNAND => self.binary(&args, BinaryOp::BVNand)?,
            DK::BNOR => self.binary(&args, BinaryOp::BVNor)?,
            DK::BXNOR => self.binary(&args, BinaryOp::BVXnor)?,
            DK::BSHL => self.binary(&args, BinaryOp::BVShl)?,
            DK::BLSHR => self.binary(&args, BinaryOp::BVLogicalShr)?,
            DK::BASHR => self.binary(&args, BinaryOp::BVArithmeticShr)?,
            DK::SLT => self.binary(&args, BinaryOp::BVSignedLess)?,
            DK::SLEQ => self.binary(&args, BinaryOp::BVSignedLessOrEqual)?,
            DK::SGT => self.binary(&args, BinaryOp::BVSignedGreater)?,
            DK::SGEQ => self.binary(&args, BinaryOp::BVSignedGreaterOrEqual)?,
            DK::ULT => self.binary(&args, BinaryOp::BVUnsignedLess)?,
            DK::ULEQ => self.binary(&args, BinaryOp::BVUnsignedLessOrEqual)?,
            DK::UGT => self.binary(&args, BinaryOp::BVUnsignedGreater)?,
            DK::UGEQ => self.binary(&args, BinaryOp::BVUnsignedGreaterOrEqual)?,
            DK::ZERO_EXT => {
                Term::zero_extend(self.single(&args)?, extension_width(ast, &args)?)
            }
            DK::SIGN_EXT => {
                Term::sign_extend(self.single(&args)?, extension_width(ast, &args)?)
            }

            _ => {
                return Err(SolverError::unsupported(format!("{kind:?} in `{ast}`")));
            }
        };
        Ok(term)
    }

    fn numeral(&self, ast: &ast::Dynamic) -> Result<Term, SolverError> {
        let invalid = || SolverError::backend(format!("numeral `{ast}` is out of range"));
        match ast.sort_kind() {
            SortKind::Int => ast
                .as_int()
                .and_then(|int| int.as_i64())
                .map(Term::int)
                .ok_or_else(invalid),
            SortKind::BV => {
                let bv = ast.as_bv().ok_or_else(invalid)?;
                let bits = bv.as_u128().ok_or_else(invalid)?;
                Ok(Term::bv(bits, bv.get_size()))
            }
            _ => Err(SolverError::unsupported(format!("numeral `{ast}`"))),
        }
    }

    fn single(&self, args: &[ast::Dynamic]) -> Result<Term, SolverError> {
        let [arg] = self.operands(args)?;
        Ok(arg)
    }

    fn binary(&self, args: &[ast::Dynamic], op: BinaryOp) -> Result<Term, SolverError> {
        let [left, right] = self.operands(args)?;
        Ok(Term::Binary {
            op,
            left: left.into(),
            right: right.into(),
        })
    }

    fn decode_all(&self, args: &[ast::Dynamic]) -> Result<Vec<Term>, SolverError> {
        args.iter().map(|arg| self.decode(arg)).collect()
    }

    fn operands<const N: usize>(&self, args: &[ast::Dynamic]) -> Result<[Term; N], SolverError> {
        let terms = self.decode_all(args)?;
        <[Term; N]>::try_from(terms).map_err(|terms| {
            SolverError::backend(format!("expected {N} operands, found {}", terms.len()))
        })
    }

    /// Folds an n-ary application to the left; `empty` is the result for no
    /// operands, if any.
    fn fold(
        &self,
        args: &[ast::Dynamic],
        combine: fn(Term, Term) -> Term,
        empty: Option<Term>,
    ) -> Result<Term, SolverError> {
        let mut terms = args.iter().map(|arg| self.decode(arg));
        match terms.next() {
            None => empty.ok_or_else(|| SolverError::backend("application without operands")),
            Some(first) => terms.try_fold(first?, |acc, next| Ok(combine(acc, next?))),
        }
    }

    /// Folds a right-associative application such as `(=> a b c)`, which
    /// stands for `a => (b => c)`.
    fn fold_right(
        &self,
        args: &[ast::Dynamic],
        combine: fn(Term, Term) -> Term,
    ) -> Result<Term, SolverError> {
        let mut terms = self.decode_all(args)?;
        let last = terms
            .pop()
            .ok_or_else(|| SolverError::backend("application without operands"))?;
        Ok(terms.into_iter().rev().fold(last, |acc, term| combine(term, acc)))
    }

    /// Decodes a chainable relation such as `(= a b c)` as the conjunction of
    /// `relate` over adjacent operands.
    fn chain(
        &self,
        args: &[ast::Dynamic],
        relate: fn(Term, Term) -> Term,
    ) -> Result<Term, SolverError> {
        self.decode_all(args)?
            .windows(2)
            .map(|pair| relate(pair[0].clone(), pair[1].clone()))
            .reduce(Term::and)
            .ok_or_else(|| SolverError::backend("chain with fewer than two operands"))
    }
}

/// Equality over booleans is decoded as `Iff`.
fn equality(args: &[ast::Dynamic]) -> fn(Term, Term) -> Term {
    let is_bool = args
        .first()
        .is_some_and(|arg| matches!(arg.sort_kind(), SortKind::Bool));
    if is_bool { Term::iff } else { Term::equal }
}

fn extension_width(ast: &ast::Dynamic, args: &[ast::Dynamic]) -> Result<u32, SolverError> {
    let size = |node: &ast::Dynamic| node.as_bv().map(|bv| bv.get_size());
    size(ast)
        .zip(args.first().and_then(size))
        .and_then(|(extended, original)| extended.checked_sub(original))
        .ok_or_else(|| SolverError::backend(format!("malformed extension `{ast}`")))
}
