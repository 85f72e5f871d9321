//! Programmatic construction of the AST arenas
//!
//! The builder is the host-facing surface: a front end (or a test) pushes
//! nodes and receives ids to wire them together with.

use crate::decl::Decl;
use crate::stmt::{Stmt, StmtKind};
use crate::ty::{BuiltinType, Qualifiers, Type};
use crate::{Ast, DeclId, StmtId, TypeId, TypeLoc, TypeLocId};
use macrosight_core::SourceRange;

/// Incrementally builds an [`Ast`]
#[derive(Debug, Default)]
pub struct AstBuilder {
    ast: Ast,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Ast {
        self.ast
    }

    pub fn push_stmt(&mut self, s: Stmt) -> StmtId {
        let id = StmtId(self.ast.stmts.len() as u32);
        self.ast.stmts.push(s);
        id
    }

    pub fn push_decl(&mut self, d: Decl) -> DeclId {
        let id = DeclId(self.ast.decls.len() as u32);
        self.ast.decls.push(d);
        id
    }

    pub fn push_type(&mut self, t: Type) -> TypeId {
        let id = TypeId(self.ast.types.len() as u32);
        self.ast.types.push(t);
        id
    }

    pub fn push_type_loc(&mut self, tl: TypeLoc) -> TypeLocId {
        let id = TypeLocId(self.ast.type_locs.len() as u32);
        self.ast.type_locs.push(tl);
        id
    }

    /// A typed expression
    pub fn expr(&mut self, kind: StmtKind, range: SourceRange, ty: TypeId) -> StmtId {
        self.push_stmt(Stmt {
            kind,
            range,
            ty: Some(ty),
        })
    }

    /// A statement, or an expression the host could not type
    pub fn stmt(&mut self, kind: StmtKind, range: SourceRange) -> StmtId {
        self.push_stmt(Stmt {
            kind,
            range,
            ty: None,
        })
    }

    pub fn builtin(&mut self, b: BuiltinType) -> TypeId {
        self.push_type(Type::Builtin(b))
    }

    pub fn pointer_to(&mut self, pointee: TypeId) -> TypeId {
        self.push_type(Type::Pointer(pointee))
    }

    pub fn array_of(&mut self, element: TypeId, size: Option<u64>) -> TypeId {
        self.array_of_expr(element, size, None)
    }

    pub fn array_of_expr(
        &mut self,
        element: TypeId,
        size: Option<u64>,
        size_expr: Option<StmtId>,
    ) -> TypeId {
        self.push_type(Type::Array {
            element,
            size,
            size_expr,
        })
    }

    pub fn function_type(&mut self, ret: TypeId, params: Vec<TypeId>, variadic: bool) -> TypeId {
        self.push_type(Type::Function {
            ret,
            params,
            variadic,
        })
    }

    pub fn typedef_type(&mut self, decl: DeclId, underlying: TypeId) -> TypeId {
        self.push_type(Type::Typedef { decl, underlying })
    }

    pub fn tag_type(&mut self, decl: DeclId) -> TypeId {
        self.push_type(Type::Tag(decl))
    }

    pub fn elaborated(&mut self, inner: TypeId) -> TypeId {
        self.push_type(Type::Elaborated(inner))
    }

    pub fn qualified(&mut self, inner: TypeId, quals: Qualifiers) -> TypeId {
        self.push_type(Type::Qualified { quals, inner })
    }
}
