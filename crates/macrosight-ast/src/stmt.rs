//! Statement and expression nodes
//!
//! Expressions are statements, as in the host AST, so both live in one arena
//! under a single kind enum; [`StmtKind::is_expr`] separates them.

use crate::{Ast, DeclId, StmtId, TypeId};
use macrosight_core::SourceRange;
use serde::{Deserialize, Serialize};

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    LogicalNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    AddressOf,
    Deref,
}

impl UnaryOp {
    pub fn is_increment_or_decrement(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
    Assign,
    MulAssign,
    DivAssign,
    RemAssign,
    AddAssign,
    SubAssign,
    ShlAssign,
    ShrAssign,
    BitAndAssign,
    BitXorAssign,
    BitOrAssign,
    Comma,
}

impl BinaryOp {
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::MulAssign
                | BinaryOp::DivAssign
                | BinaryOp::RemAssign
                | BinaryOp::AddAssign
                | BinaryOp::SubAssign
                | BinaryOp::ShlAssign
                | BinaryOp::ShrAssign
                | BinaryOp::BitAndAssign
                | BinaryOp::BitXorAssign
                | BinaryOp::BitOrAssign
        )
    }

    /// `&&` and `||`, the short-circuiting operators
    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }
}

/// Statement and expression kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    // Expressions
    IntLiteral(i64),
    FloatLiteral(f64),
    CharLiteral(i64),
    StringLiteral(String),
    DeclRef(DeclId),
    Paren(StmtId),
    ImplicitCast(StmtId),
    Cast(StmtId),
    ImplicitValueInit,
    Unary {
        op: UnaryOp,
        operand: StmtId,
    },
    Binary {
        op: BinaryOp,
        lhs: StmtId,
        rhs: StmtId,
    },
    Conditional {
        cond: StmtId,
        then_expr: StmtId,
        else_expr: StmtId,
    },
    Call {
        callee: StmtId,
        args: Vec<StmtId>,
    },
    Member {
        base: StmtId,
        member: String,
        arrow: bool,
    },
    Index {
        base: StmtId,
        index: StmtId,
    },
    SizeOf(Option<StmtId>),
    InitList(Vec<StmtId>),

    // Statements
    Compound(Vec<StmtId>),
    DeclStmt(Vec<DeclId>),
    If {
        cond: StmtId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        cond: StmtId,
        body: StmtId,
    },
    DoWhile {
        body: StmtId,
        cond: StmtId,
    },
    For {
        init: Option<StmtId>,
        cond: Option<StmtId>,
        inc: Option<StmtId>,
        body: StmtId,
    },
    Switch {
        cond: StmtId,
        body: StmtId,
    },
    Case {
        value: StmtId,
        body: StmtId,
    },
    Default(StmtId),
    Return(Option<StmtId>),
    Break,
    Continue,
    Goto(String),
    Label {
        name: String,
        body: StmtId,
    },
    Null,
}

impl StmtKind {
    pub fn is_expr(&self) -> bool {
        matches!(
            self,
            StmtKind::IntLiteral(_)
                | StmtKind::FloatLiteral(_)
                | StmtKind::CharLiteral(_)
                | StmtKind::StringLiteral(_)
                | StmtKind::DeclRef(_)
                | StmtKind::Paren(_)
                | StmtKind::ImplicitCast(_)
                | StmtKind::Cast(_)
                | StmtKind::ImplicitValueInit
                | StmtKind::Unary { .. }
                | StmtKind::Binary { .. }
                | StmtKind::Conditional { .. }
                | StmtKind::Call { .. }
                | StmtKind::Member { .. }
                | StmtKind::Index { .. }
                | StmtKind::SizeOf(_)
                | StmtKind::InitList(_)
        )
    }
}

/// One statement or expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub range: SourceRange,
    /// The expression's type; `None` for non-expressions and for
    /// expressions the host could not type
    pub ty: Option<TypeId>,
}

impl Stmt {
    pub fn is_expr(&self) -> bool {
        self.kind.is_expr()
    }
}

impl Ast {
    /// Direct children of a statement, in source order.
    ///
    /// Matches the host's statement traversal: a declaration statement
    /// yields the initializers of its declarations.
    pub fn children(&self, id: StmtId) -> Vec<StmtId> {
        match &self.stmt(id).kind {
            StmtKind::IntLiteral(_)
            | StmtKind::FloatLiteral(_)
            | StmtKind::CharLiteral(_)
            | StmtKind::StringLiteral(_)
            | StmtKind::DeclRef(_)
            | StmtKind::ImplicitValueInit
            | StmtKind::SizeOf(None)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Goto(_)
            | StmtKind::Null => Vec::new(),
            StmtKind::Paren(inner)
            | StmtKind::ImplicitCast(inner)
            | StmtKind::Cast(inner)
            | StmtKind::SizeOf(Some(inner)) => vec![*inner],
            StmtKind::Unary { operand, .. } => vec![*operand],
            StmtKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            StmtKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => vec![*cond, *then_expr, *else_expr],
            StmtKind::Call { callee, args } => {
                let mut out = vec![*callee];
                out.extend(args.iter().copied());
                out
            }
            StmtKind::Member { base, .. } => vec![*base],
            StmtKind::Index { base, index } => vec![*base, *index],
            StmtKind::InitList(inits) => inits.clone(),
            StmtKind::Compound(body) => body.clone(),
            StmtKind::DeclStmt(decls) => decls
                .iter()
                .filter_map(|d| self.decl(*d).initializer())
                .collect(),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut out = vec![*cond, *then_branch];
                out.extend(else_branch.iter().copied());
                out
            }
            StmtKind::While { cond, body } => vec![*cond, *body],
            StmtKind::DoWhile { body, cond } => vec![*body, *cond],
            StmtKind::For {
                init,
                cond,
                inc,
                body,
            } => {
                let mut out = Vec::new();
                out.extend(init.iter().copied());
                out.extend(cond.iter().copied());
                out.extend(inc.iter().copied());
                out.push(*body);
                out
            }
            StmtKind::Switch { cond, body } => vec![*cond, *body],
            StmtKind::Case { value, body } => vec![*value, *body],
            StmtKind::Default(body) | StmtKind::Label { body, .. } => vec![*body],
            StmtKind::Return(value) => value.iter().copied().collect(),
        }
    }
}
