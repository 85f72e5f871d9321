//! Structural integer-constant-expression test

use crate::decl::DeclKind;
use crate::stmt::StmtKind;
use crate::{Ast, StmtId};

/// Whether an expression satisfies the C grammar for integer constant
/// expressions: integer and character literals, enumeration constants,
/// `sizeof`, and the constant operators over them. References to objects,
/// calls, assignments, and comma expressions disqualify the whole tree.
pub fn is_integer_constant_expr(ast: &Ast, e: StmtId) -> bool {
    let mut stack = vec![e];
    while let Some(cur) = stack.pop() {
        match &ast.stmt(cur).kind {
            StmtKind::IntLiteral(_) | StmtKind::CharLiteral(_) => {}
            StmtKind::SizeOf(_) => {}
            StmtKind::ImplicitValueInit => {}
            StmtKind::DeclRef(d) => {
                if !matches!(ast.decl(*d).kind, DeclKind::EnumConstant { .. }) {
                    return false;
                }
            }
            StmtKind::Paren(inner) | StmtKind::ImplicitCast(inner) | StmtKind::Cast(inner) => {
                stack.push(*inner)
            }
            StmtKind::Unary { op, operand } => {
                use crate::stmt::UnaryOp::*;
                match op {
                    Plus | Minus | BitNot | LogicalNot => stack.push(*operand),
                    _ => return false,
                }
            }
            StmtKind::Binary { op, lhs, rhs } => {
                if op.is_assignment() || *op == crate::stmt::BinaryOp::Comma {
                    return false;
                }
                stack.push(*lhs);
                stack.push(*rhs);
            }
            StmtKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                stack.push(*cond);
                stack.push(*then_expr);
                stack.push(*else_expr);
            }
            _ => return false,
        }
    }
    true
}
