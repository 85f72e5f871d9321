//! Declaration nodes

use crate::{DeclId, StmtId, TypeId};
use macrosight_core::{SourceLocation, SourceRange};
use serde::{Deserialize, Serialize};

/// Storage class written on a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StorageClass {
    #[default]
    None,
    Static,
    Extern,
    Register,
}

/// The context a declaration appears in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeclScope {
    /// Translation-unit scope
    #[default]
    File,
    /// Inside a function body (parameters included)
    Block,
    /// Inside a struct, union, or enum
    Member,
}

/// Struct or union
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagKind {
    Struct,
    Union,
}

/// Declaration kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclKind {
    Var {
        name: String,
        ty: TypeId,
        storage: StorageClass,
        init: Option<StmtId>,
    },
    Function {
        name: String,
        ty: TypeId,
        params: Vec<DeclId>,
        body: Option<StmtId>,
    },
    Field {
        name: String,
        ty: TypeId,
        bit_width: Option<StmtId>,
    },
    Record {
        name: Option<String>,
        tag: TagKind,
        fields: Vec<DeclId>,
    },
    Enum {
        name: Option<String>,
        enumerators: Vec<DeclId>,
    },
    EnumConstant {
        name: String,
        init: Option<StmtId>,
    },
    Typedef {
        name: String,
        underlying: TypeId,
    },
}

/// One declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    pub kind: DeclKind,
    /// Full extent of the declaration
    pub range: SourceRange,
    /// Location of the declared name
    pub name_loc: SourceLocation,
    pub scope: DeclScope,
}

impl Decl {
    /// The declared name; `None` for anonymous tags
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Var { name, .. }
            | DeclKind::Function { name, .. }
            | DeclKind::Field { name, .. }
            | DeclKind::EnumConstant { name, .. }
            | DeclKind::Typedef { name, .. } => Some(name),
            DeclKind::Record { name, .. } | DeclKind::Enum { name, .. } => name.as_deref(),
        }
    }

    /// A variable with automatic storage duration
    pub fn has_local_storage(&self) -> bool {
        match &self.kind {
            DeclKind::Var { storage, .. } => {
                self.scope == DeclScope::Block
                    && matches!(storage, StorageClass::None | StorageClass::Register)
            }
            _ => false,
        }
    }

    /// Declared at translation-unit scope
    pub fn at_file_scope(&self) -> bool {
        self.scope == DeclScope::File
    }

    /// The declared entity's type, where it has one
    pub fn ty(&self) -> Option<TypeId> {
        match &self.kind {
            DeclKind::Var { ty, .. }
            | DeclKind::Function { ty, .. }
            | DeclKind::Field { ty, .. } => Some(*ty),
            DeclKind::Typedef { underlying, .. } => Some(*underlying),
            DeclKind::Record { .. } | DeclKind::Enum { .. } | DeclKind::EnumConstant { .. } => None,
        }
    }

    /// Initializer or enumerator value expression, if any
    pub fn initializer(&self) -> Option<StmtId> {
        match &self.kind {
            DeclKind::Var { init, .. } | DeclKind::EnumConstant { init, .. } => *init,
            _ => None,
        }
    }
}
