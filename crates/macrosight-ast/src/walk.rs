//! AST traversal utilities
//!
//! All walks use explicit queues; translation units can nest deeply enough
//! that recursion is not an option.

use crate::decl::DeclKind;
use crate::stmt::StmtKind;
use crate::ty::Type;
use crate::{Ast, DeclId, StmtId, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Collect a statement and all of its transitive children, breadth-first
pub fn subtrees(ast: &Ast, st: StmtId) -> HashSet<StmtId> {
    let mut out = HashSet::new();
    let mut queue = VecDeque::from([st]);
    while let Some(cur) = queue.pop_front() {
        if out.insert(cur) {
            queue.extend(ast.children(cur));
        }
    }
    out
}

/// Whether `needle` appears in the subtree rooted at `haystack`
pub fn in_tree(ast: &Ast, needle: StmtId, haystack: StmtId) -> bool {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([haystack]);
    while let Some(cur) = queue.pop_front() {
        if cur == needle {
            return true;
        }
        if seen.insert(cur) {
            queue.extend(ast.children(cur));
        }
    }
    false
}

/// A statement or declaration, as the parent map sees them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRef {
    Stmt(StmtId),
    Decl(DeclId),
}

/// Child-to-parent index over the whole translation unit, built once.
///
/// The chain runs through declarations: a variable's initializer has the
/// variable as its parent, the variable has its declaration statement, an
/// enumerator has its enum, and an array bound written in a declarator has
/// the declaration carrying that type.
#[derive(Debug, Default)]
pub struct ParentMap {
    parents: HashMap<NodeRef, NodeRef>,
}

impl ParentMap {
    pub fn new(ast: &Ast) -> Self {
        let mut parents = HashMap::new();

        for sid in ast.stmt_ids() {
            if let StmtKind::DeclStmt(decls) = &ast.stmt(sid).kind {
                for d in decls {
                    parents.insert(NodeRef::Decl(*d), NodeRef::Stmt(sid));
                }
                continue;
            }
            for child in ast.children(sid) {
                parents.insert(NodeRef::Stmt(child), NodeRef::Stmt(sid));
            }
        }

        for did in ast.decl_ids() {
            let parent = NodeRef::Decl(did);
            let decl = ast.decl(did);
            if let Some(init) = decl.initializer() {
                parents.insert(NodeRef::Stmt(init), parent);
            }
            if let Some(ty) = decl.ty() {
                for bound in array_size_exprs(ast, ty) {
                    parents.insert(NodeRef::Stmt(bound), parent);
                }
            }
            match &decl.kind {
                DeclKind::Function { params, body, .. } => {
                    for p in params {
                        parents.insert(NodeRef::Decl(*p), parent);
                    }
                    if let Some(body) = body {
                        parents.insert(NodeRef::Stmt(*body), parent);
                    }
                }
                DeclKind::Field {
                    bit_width: Some(bw),
                    ..
                } => {
                    parents.insert(NodeRef::Stmt(*bw), parent);
                }
                DeclKind::Record { fields, .. } => {
                    for f in fields {
                        parents.insert(NodeRef::Decl(*f), parent);
                    }
                }
                DeclKind::Enum { enumerators, .. } => {
                    for e in enumerators {
                        parents.insert(NodeRef::Decl(*e), parent);
                    }
                }
                _ => {}
            }
        }

        Self { parents }
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.parents.get(&node).copied()
    }
}

/// Array bound expressions written anywhere in a declarator's type
fn array_size_exprs(ast: &Ast, ty: TypeId) -> Vec<StmtId> {
    let mut out = Vec::new();
    let mut stack = vec![ty];
    let mut steps = 0usize;
    while let Some(t) = stack.pop() {
        steps += 1;
        if steps > ast.types.len() + 1 {
            break;
        }
        match ast.ty(t) {
            Type::Pointer(inner)
            | Type::Elaborated(inner)
            | Type::Qualified { inner, .. }
            | Type::Typedef {
                underlying: inner, ..
            } => stack.push(*inner),
            Type::Array {
                element, size_expr, ..
            } => {
                out.extend(size_expr.iter().copied());
                stack.push(*element);
            }
            _ => {}
        }
    }
    out
}

/// Whether the statement sits under a construct whose operand must be an
/// integer constant expression: a case label, an enum body, a bit-field
/// width, or an array bound.
pub fn is_descendant_of_ice_context(ast: &Ast, parents: &ParentMap, st: StmtId) -> bool {
    let mut queue = VecDeque::new();
    queue.extend(parents.parent(NodeRef::Stmt(st)));
    let mut seen = HashSet::new();
    while let Some(cur) = queue.pop_front() {
        if !seen.insert(cur) {
            continue;
        }
        match cur {
            NodeRef::Stmt(s) => {
                if matches!(ast.stmt(s).kind, StmtKind::Case { .. }) {
                    return true;
                }
            }
            NodeRef::Decl(d) => {
                let decl = ast.decl(d);
                match &decl.kind {
                    DeclKind::Enum { .. } => return true,
                    DeclKind::Field {
                        bit_width: Some(_), ..
                    } => return true,
                    DeclKind::Var { ty, .. } => {
                        if matches!(ast.canonical_node(*ty), Type::Array { .. }) {
                            return true;
                        }
                    }
                    _ => {}
                }
            }
        }
        queue.extend(parents.parent(cur));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AstBuilder;
    use crate::decl::{Decl, DeclScope, StorageClass};
    use crate::ty::BuiltinType;
    use macrosight_core::{SourceLocation, SourceRange};

    fn r(a: u32, b: u32) -> SourceRange {
        SourceRange::new(SourceLocation(a), SourceLocation(b))
    }

    #[test]
    fn test_subtrees_and_in_tree() {
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);
        let one = b.expr(StmtKind::IntLiteral(1), r(1, 1), int);
        let two = b.expr(StmtKind::IntLiteral(2), r(3, 3), int);
        let sum = b.expr(
            StmtKind::Binary {
                op: crate::stmt::BinaryOp::Add,
                lhs: one,
                rhs: two,
            },
            r(1, 3),
            int,
        );
        let other = b.expr(StmtKind::IntLiteral(9), r(5, 5), int);
        let ast = b.finish();

        let subs = subtrees(&ast, sum);
        assert_eq!(subs.len(), 3);
        assert!(subs.contains(&sum) && subs.contains(&one) && subs.contains(&two));
        assert!(in_tree(&ast, one, sum));
        assert!(!in_tree(&ast, other, sum));
    }

    #[test]
    fn test_ice_context_case_label() {
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);
        let value = b.expr(StmtKind::IntLiteral(3), r(10, 10), int);
        let body = b.stmt(StmtKind::Break, r(12, 12));
        let case = b.stmt(StmtKind::Case { value, body }, r(8, 12));
        let cond = b.expr(StmtKind::IntLiteral(0), r(5, 5), int);
        let switch = b.stmt(StmtKind::Switch { cond, body: case }, r(1, 13));
        let ast = b.finish();
        let pm = ParentMap::new(&ast);

        assert!(is_descendant_of_ice_context(&ast, &pm, value));
        assert!(!is_descendant_of_ice_context(&ast, &pm, cond));
        assert!(!is_descendant_of_ice_context(&ast, &pm, switch));
    }

    #[test]
    fn test_ice_context_enum_and_array_bound() {
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);

        // enum { A = X }
        let x = b.expr(StmtKind::IntLiteral(4), r(20, 20), int);
        let constant = b.push_decl(Decl {
            kind: DeclKind::EnumConstant {
                name: "A".into(),
                init: Some(x),
            },
            range: r(18, 20),
            name_loc: SourceLocation(18),
            scope: DeclScope::File,
        });
        b.push_decl(Decl {
            kind: DeclKind::Enum {
                name: None,
                enumerators: vec![constant],
            },
            range: r(15, 21),
            name_loc: SourceLocation(15),
            scope: DeclScope::File,
        });

        // int a[N];
        let n = b.expr(StmtKind::IntLiteral(8), r(30, 30), int);
        let arr = b.array_of_expr(int, Some(8), Some(n));
        b.push_decl(Decl {
            kind: DeclKind::Var {
                name: "a".into(),
                ty: arr,
                storage: StorageClass::None,
                init: None,
            },
            range: r(25, 31),
            name_loc: SourceLocation(29),
            scope: DeclScope::Block,
        });

        let ast = b.finish();
        let pm = ParentMap::new(&ast);
        assert!(is_descendant_of_ice_context(&ast, &pm, x));
        assert!(is_descendant_of_ice_context(&ast, &pm, n));
    }

    #[test]
    fn test_parent_map_runs_through_decl_stmt() {
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);
        let init = b.expr(StmtKind::IntLiteral(0), r(5, 5), int);
        let var = b.push_decl(Decl {
            kind: DeclKind::Var {
                name: "x".into(),
                ty: int,
                storage: StorageClass::None,
                init: Some(init),
            },
            range: r(1, 5),
            name_loc: SourceLocation(3),
            scope: DeclScope::Block,
        });
        let ds = b.stmt(StmtKind::DeclStmt(vec![var]), r(1, 6));
        let ast = b.finish();
        let pm = ParentMap::new(&ast);

        assert_eq!(pm.parent(NodeRef::Stmt(init)), Some(NodeRef::Decl(var)));
        assert_eq!(pm.parent(NodeRef::Decl(var)), Some(NodeRef::Stmt(ds)));
        assert_eq!(pm.parent(NodeRef::Stmt(ds)), None);
        // The declaration statement's traversal children are the inits
        assert_eq!(ast.children(ds), vec![init]);
    }
}
