//! Translation-unit-wide AST indices
//!
//! Built once per translation unit, before any expansion is evaluated. Each
//! index is a set of statement ids; membership tests against these sets are
//! what the property evaluator runs on.

use macrosight_ast::{Ast, StmtId, StmtKind, UnaryOp};
use std::collections::HashSet;

/// The prebuilt index sets
#[derive(Debug, Default)]
pub struct TuIndices {
    /// Every reference to a declaration
    pub all_decl_refs: HashSet<StmtId>,
    /// References to declarations with local storage
    pub local_decl_refs: HashSet<StmtId>,
    /// Assignments and pre/post increment/decrement
    pub side_effect_exprs: HashSet<StmtId>,
    /// The modified operand of each side-effecting expression
    pub side_effect_lhs: HashSet<StmtId>,
    /// Unary address-of expressions
    pub address_of_exprs: HashSet<StmtId>,
    /// Operands of `?:`, `&&`, and `||`
    pub short_circuit_operands: HashSet<StmtId>,
    /// Expressions whose type is declared at local scope
    pub locally_typed_exprs: HashSet<StmtId>,
}

impl TuIndices {
    pub fn build(ast: &Ast) -> Self {
        let mut idx = Self::default();

        for sid in ast.stmt_ids() {
            let stmt = ast.stmt(sid);
            match &stmt.kind {
                StmtKind::DeclRef(d) => {
                    idx.all_decl_refs.insert(sid);
                    if ast.decl(*d).has_local_storage() {
                        idx.local_decl_refs.insert(sid);
                    }
                }
                StmtKind::Binary { op, lhs, rhs } => {
                    if op.is_assignment() {
                        idx.side_effect_exprs.insert(sid);
                        idx.side_effect_lhs.insert(*lhs);
                    }
                    if op.is_short_circuit() {
                        idx.short_circuit_operands.insert(*lhs);
                        idx.short_circuit_operands.insert(*rhs);
                    }
                }
                StmtKind::Unary { op, operand } => {
                    if op.is_increment_or_decrement() {
                        idx.side_effect_exprs.insert(sid);
                        idx.side_effect_lhs.insert(*operand);
                    }
                    if *op == UnaryOp::AddressOf {
                        idx.address_of_exprs.insert(sid);
                    }
                }
                StmtKind::Conditional {
                    then_expr,
                    else_expr,
                    ..
                } => {
                    idx.short_circuit_operands.insert(*then_expr);
                    idx.short_circuit_operands.insert(*else_expr);
                }
                _ => {}
            }

            if stmt.is_expr()
                && !matches!(
                    stmt.kind,
                    StmtKind::ImplicitCast(_) | StmtKind::ImplicitValueInit
                )
                && ast.has_local_type(stmt.ty)
            {
                idx.locally_typed_exprs.insert(sid);
            }
        }

        idx
    }
}

/// The modified operand of a side-effecting expression, if it has one
pub fn modified_operand(ast: &Ast, e: StmtId) -> Option<StmtId> {
    match &ast.stmt(e).kind {
        StmtKind::Binary { op, lhs, .. } if op.is_assignment() => Some(*lhs),
        StmtKind::Unary { op, operand } if op.is_increment_or_decrement() => Some(*operand),
        _ => None,
    }
}

/// Strip parentheses and implicit casts, the uniform pre-filter applied
/// before identity comparisons against aligned statements.
pub fn skip_implicit_and_parens(ast: &Ast, mut e: StmtId) -> StmtId {
    loop {
        match &ast.stmt(e).kind {
            StmtKind::Paren(inner) | StmtKind::ImplicitCast(inner) => e = *inner,
            _ => return e,
        }
    }
}
