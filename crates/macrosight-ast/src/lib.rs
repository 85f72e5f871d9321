//! Macrosight AST
//!
//! The host front end's view of the post-expansion translation unit:
//! statements (expressions included), declarations, type locations, and
//! types, each stored in its own arena and addressed by index. Macrosight
//! never parses C; a host constructs these arenas (usually through
//! [`AstBuilder`]) and serializes them into the translation-unit dump.

pub mod builder;
pub mod decl;
pub mod ice;
pub mod stmt;
pub mod ty;
pub mod walk;

pub use builder::AstBuilder;
pub use decl::{Decl, DeclKind, DeclScope, StorageClass, TagKind};
pub use ice::is_integer_constant_expr;
pub use stmt::{BinaryOp, Stmt, StmtKind, UnaryOp};
pub use ty::{BuiltinType, Qualifiers, Type};
pub use walk::{in_tree, is_descendant_of_ice_context, subtrees, NodeRef, ParentMap};

use macrosight_core::SourceRange;
use serde::{Deserialize, Serialize};

/// A statement (or expression) id
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StmtId(pub u32);

/// A declaration id
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DeclId(pub u32);

/// A type-location id
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TypeLocId(pub u32);

/// A type id
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TypeId(pub u32);

/// A span of source text occupied by a type specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeLoc {
    pub ty: TypeId,
    pub range: SourceRange,
}

/// An AST node a macro expansion can align with: a declaration, a statement,
/// or a type location. At most one variant applies to any given root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AstRoot {
    Stmt(StmtId),
    Decl(DeclId),
    TypeLoc(TypeLocId),
}

impl AstRoot {
    pub fn stmt(self) -> Option<StmtId> {
        match self {
            AstRoot::Stmt(id) => Some(id),
            _ => None,
        }
    }

    pub fn decl(self) -> Option<DeclId> {
        match self {
            AstRoot::Decl(id) => Some(id),
            _ => None,
        }
    }

    pub fn type_loc(self) -> Option<TypeLocId> {
        match self {
            AstRoot::TypeLoc(id) => Some(id),
            _ => None,
        }
    }
}

/// Arena storage for one translation unit's AST
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ast {
    pub stmts: Vec<Stmt>,
    pub decls: Vec<Decl>,
    pub type_locs: Vec<TypeLoc>,
    pub types: Vec<Type>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.0 as usize]
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.0 as usize]
    }

    pub fn type_loc(&self, id: TypeLocId) -> &TypeLoc {
        &self.type_locs[id.0 as usize]
    }

    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    /// All statement ids, in arena order
    pub fn stmt_ids(&self) -> impl Iterator<Item = StmtId> {
        (0..self.stmts.len() as u32).map(StmtId)
    }

    /// All declaration ids, in arena order
    pub fn decl_ids(&self) -> impl Iterator<Item = DeclId> {
        (0..self.decls.len() as u32).map(DeclId)
    }

    /// All type-location ids, in arena order
    pub fn type_loc_ids(&self) -> impl Iterator<Item = TypeLocId> {
        (0..self.type_locs.len() as u32).map(TypeLocId)
    }

    /// Spelling range of an alignment root
    pub fn root_range(&self, root: AstRoot) -> SourceRange {
        match root {
            AstRoot::Stmt(id) => self.stmt(id).range,
            AstRoot::Decl(id) => self.decl(id).range,
            AstRoot::TypeLoc(id) => self.type_loc(id).range,
        }
    }
}
