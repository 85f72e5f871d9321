//! The C type algebra
//!
//! Enough type structure to answer the questions property evaluation asks:
//! what tag or typedef a type ultimately names, whether any type reachable
//! through pointers and arrays is anonymous or locally declared or declared
//! after a given location, and how a type prints once sugar and qualifiers
//! are stripped.

use crate::decl::DeclKind;
use crate::{Ast, DeclId, StmtId, TypeId};
use macrosight_core::{SourceLocation, SourceMap};
use serde::{Deserialize, Serialize};

/// Builtin C types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuiltinType {
    Void,
    Bool,
    Char,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
}

impl BuiltinType {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Void => "void",
            BuiltinType::Bool => "_Bool",
            BuiltinType::Char => "char",
            BuiltinType::SChar => "signed char",
            BuiltinType::UChar => "unsigned char",
            BuiltinType::Short => "short",
            BuiltinType::UShort => "unsigned short",
            BuiltinType::Int => "int",
            BuiltinType::UInt => "unsigned int",
            BuiltinType::Long => "long",
            BuiltinType::ULong => "unsigned long",
            BuiltinType::LongLong => "long long",
            BuiltinType::ULongLong => "unsigned long long",
            BuiltinType::Float => "float",
            BuiltinType::Double => "double",
            BuiltinType::LongDouble => "long double",
        }
    }
}

/// Type qualifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Qualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
}

impl std::fmt::Display for Qualifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.is_const, self.is_volatile) {
            (true, true) => write!(f, "const volatile"),
            (true, false) => write!(f, "const"),
            (false, true) => write!(f, "volatile"),
            (false, false) => Ok(()),
        }
    }
}

/// Type nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Builtin(BuiltinType),
    Pointer(TypeId),
    Array {
        element: TypeId,
        size: Option<u64>,
        /// The written bound expression, when the host kept it
        size_expr: Option<StmtId>,
    },
    Function {
        ret: TypeId,
        params: Vec<TypeId>,
        variadic: bool,
    },
    /// A typedef name; `underlying` is what it abbreviates
    Typedef {
        decl: DeclId,
        underlying: TypeId,
    },
    /// A struct, union, or enum type; the declaration holds the tag kind
    Tag(DeclId),
    /// `struct Foo` written with its keyword; sugar over the tag type
    Elaborated(TypeId),
    Qualified {
        quals: Qualifiers,
        inner: TypeId,
    },
}

impl Ast {
    /// Resolve typedef, elaborated, and qualifier sugar down to the
    /// structural type node.
    pub fn canonical_node(&self, t: TypeId) -> &Type {
        let mut cur = t;
        for _ in 0..=self.types.len() {
            match self.ty(cur) {
                Type::Typedef { underlying, .. } => cur = *underlying,
                Type::Elaborated(inner) => cur = *inner,
                Type::Qualified { inner, .. } => cur = *inner,
                other => return other,
            }
        }
        self.ty(cur)
    }

    /// If the type is canonically a pointer or array, its pointee or element
    /// exactly as written (sugar preserved).
    pub fn pointee_or_element(&self, t: TypeId) -> Option<TypeId> {
        match self.canonical_node(t) {
            Type::Pointer(p) => Some(*p),
            Type::Array { element, .. } => Some(*element),
            _ => None,
        }
    }

    /// Unwrap pointers and arrays to the innermost element, then apply the
    /// predicate. The unwrap order is load-bearing: typedef and elaborated
    /// sugar survives the descent and is only consulted by the predicate.
    pub fn is_in_type<F>(&self, t: Option<TypeId>, pred: F) -> bool
    where
        F: Fn(&Ast, TypeId) -> bool,
    {
        let Some(mut cur) = t else {
            return false;
        };
        for _ in 0..=self.types.len() {
            match self.pointee_or_element(cur) {
                Some(element) => cur = element,
                None => break,
            }
        }
        pred(self, cur)
    }

    /// The declaration a type names: a typedef's own declaration, a tag's
    /// declaration, or whatever an elaborated type resolves to.
    pub fn type_decl_of(&self, t: TypeId) -> Option<DeclId> {
        let mut cur = t;
        for _ in 0..=self.types.len() {
            match self.ty(cur) {
                Type::Typedef { decl, .. } => return Some(*decl),
                Type::Tag(d) => return Some(*d),
                Type::Elaborated(inner) => cur = *inner,
                Type::Qualified { inner, .. } => cur = *inner,
                _ => return None,
            }
        }
        None
    }

    /// Whether any type reachable through the unwrap descent was declared
    /// after `loc` in translation-unit order.
    pub fn has_type_defined_after(
        &self,
        t: Option<TypeId>,
        sm: &SourceMap,
        loc: SourceLocation,
    ) -> bool {
        self.is_in_type(t, |ast, t| {
            let Some(d) = ast.type_decl_of(t) else {
                return false;
            };
            let name_loc = ast.decl(d).name_loc;
            if name_loc.is_invalid() {
                return false;
            }
            let floc = sm.file_loc(name_loc);
            if floc.is_invalid() {
                return false;
            }
            sm.is_before_in_tu(loc, floc)
        })
    }

    /// Whether any type reachable through the unwrap descent is anonymous
    pub fn has_anonymous_type(&self, t: Option<TypeId>) -> bool {
        self.is_in_type(t, |ast, t| {
            let Some(d) = ast.type_decl_of(t) else {
                return false;
            };
            ast.decl(d).name().map_or(true, str::is_empty)
        })
    }

    /// Whether any type reachable through the unwrap descent is declared at
    /// other than translation-unit scope
    pub fn has_local_type(&self, t: Option<TypeId>) -> bool {
        self.is_in_type(t, |ast, t| {
            let Some(d) = ast.type_decl_of(t) else {
                return false;
            };
            !ast.decl(d).at_file_scope()
        })
    }

    /// Canonically `void`
    pub fn is_void_type(&self, t: TypeId) -> bool {
        matches!(self.canonical_node(t), Type::Builtin(BuiltinType::Void))
    }

    /// Print the canonical, top-level-unqualified form of a type, the shape
    /// type signatures are built from.
    pub fn type_signature(&self, t: TypeId) -> String {
        let mut cur = t;
        for _ in 0..=self.types.len() {
            match self.ty(cur) {
                Type::Qualified { inner, .. } => cur = *inner,
                Type::Typedef { underlying, .. } => cur = *underlying,
                Type::Elaborated(inner) => cur = *inner,
                _ => break,
            }
        }
        self.fmt_canonical(cur, "")
    }

    fn tag_string(&self, d: DeclId) -> String {
        let decl = self.decl(d);
        let (keyword, name) = match &decl.kind {
            DeclKind::Record {
                name,
                tag: crate::decl::TagKind::Struct,
                ..
            } => ("struct", name.as_deref()),
            DeclKind::Record { name, .. } => ("union", name.as_deref()),
            DeclKind::Enum { name, .. } => ("enum", name.as_deref()),
            _ => return decl.name().unwrap_or("<unknown>").to_string(),
        };
        match name {
            Some(n) if !n.is_empty() => format!("{} {}", keyword, n),
            _ => format!("{} (anonymous)", keyword),
        }
    }

    fn fmt_canonical(&self, t: TypeId, declarator: &str) -> String {
        let join = |base: &str, decl: &str| {
            if decl.is_empty() {
                base.to_string()
            } else {
                format!("{} {}", base, decl)
            }
        };
        match self.ty(t) {
            Type::Builtin(b) => join(b.name(), declarator),
            Type::Tag(d) => join(&self.tag_string(*d), declarator),
            Type::Pointer(p) => {
                let d = format!("*{}", declarator);
                if matches!(
                    self.canonical_node(*p),
                    Type::Function { .. } | Type::Array { .. }
                ) {
                    self.fmt_canonical(*p, &format!("({})", d))
                } else {
                    self.fmt_canonical(*p, &d)
                }
            }
            Type::Array { element, size, .. } => {
                let d = match size {
                    Some(n) => format!("{}[{}]", declarator, n),
                    None => format!("{}[]", declarator),
                };
                self.fmt_canonical(*element, &d)
            }
            Type::Function {
                ret,
                params,
                variadic,
            } => {
                let mut ps: Vec<String> =
                    params.iter().map(|p| self.type_signature(*p)).collect();
                if *variadic {
                    ps.push("...".to_string());
                } else if ps.is_empty() {
                    ps.push("void".to_string());
                }
                let d = format!("{}({})", declarator, ps.join(", "));
                self.fmt_canonical(*ret, &d)
            }
            Type::Typedef { underlying, .. } => self.fmt_canonical(*underlying, declarator),
            Type::Elaborated(inner) => self.fmt_canonical(*inner, declarator),
            Type::Qualified { quals, inner } => {
                if matches!(self.canonical_node(*inner), Type::Pointer(_)) {
                    let d = if declarator.is_empty() {
                        quals.to_string()
                    } else {
                        format!("{} {}", quals, declarator)
                    };
                    self.fmt_canonical(*inner, &d)
                } else {
                    format!("{} {}", quals, self.fmt_canonical(*inner, declarator))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AstBuilder;
    use crate::decl::{Decl, DeclScope, TagKind};
    use macrosight_core::SourceRange;

    fn anon_record(b: &mut AstBuilder, name: Option<&str>, scope: DeclScope) -> DeclId {
        b.push_decl(Decl {
            kind: DeclKind::Record {
                name: name.map(str::to_string),
                tag: TagKind::Struct,
                fields: Vec::new(),
            },
            range: SourceRange::invalid(),
            name_loc: SourceLocation::INVALID,
            scope,
        })
    }

    #[test]
    fn test_builtin_and_pointer_printing() {
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);
        let uint = b.builtin(BuiltinType::UInt);
        let pint = b.pointer_to(int);
        let ppint = b.pointer_to(pint);
        let ast = b.finish();
        assert_eq!(ast.type_signature(int), "int");
        assert_eq!(ast.type_signature(uint), "unsigned int");
        assert_eq!(ast.type_signature(pint), "int *");
        assert_eq!(ast.type_signature(ppint), "int **");
    }

    #[test]
    fn test_array_and_function_pointer_printing() {
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);
        let arr = b.array_of(int, Some(4));
        let f = b.function_type(int, vec![int, int], false);
        let fp = b.pointer_to(f);
        let ast = b.finish();
        assert_eq!(ast.type_signature(arr), "int [4]");
        assert_eq!(ast.type_signature(fp), "int (*)(int, int)");
    }

    #[test]
    fn test_tag_and_qualifier_printing() {
        let mut b = AstBuilder::new();
        let point = anon_record(&mut b, Some("Point"), DeclScope::File);
        let tag = b.tag_type(point);
        let cchar = {
            let c = b.builtin(BuiltinType::Char);
            b.qualified(c, Qualifiers { is_const: true, is_volatile: false })
        };
        let pcchar = b.pointer_to(cchar);
        let ast = b.finish();
        assert_eq!(ast.type_signature(tag), "struct Point");
        assert_eq!(ast.type_signature(pcchar), "const char *");
        // Top-level qualifiers are stripped
        assert_eq!(ast.type_signature(cchar), "char");
    }

    #[test]
    fn test_typedef_resolution_in_signature() {
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);
        let td_decl = b.push_decl(Decl {
            kind: DeclKind::Typedef {
                name: "myint".into(),
                underlying: int,
            },
            range: SourceRange::invalid(),
            name_loc: SourceLocation::INVALID,
            scope: DeclScope::File,
        });
        let td = b.typedef_type(td_decl, int);
        let ast = b.finish();
        assert_eq!(ast.type_signature(td), "int");
    }

    #[test]
    fn test_unwrap_order_skips_sugar_on_the_way_down() {
        // typedef int *IntPtr, with the typedef declared locally: the
        // pointer descent must pass straight through the typedef, so no
        // local type is found at the element.
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);
        let pint = b.pointer_to(int);
        let td_decl = b.push_decl(Decl {
            kind: DeclKind::Typedef {
                name: "IntPtr".into(),
                underlying: pint,
            },
            range: SourceRange::invalid(),
            name_loc: SourceLocation::INVALID,
            scope: DeclScope::Block,
        });
        let td = b.typedef_type(td_decl, pint);
        let ast = b.finish();
        assert!(!ast.has_local_type(Some(td)));
        // A pointer to the locally-declared struct, by contrast, is found.
        let mut b = AstBuilder::new();
        let local = anon_record(&mut b, Some("s"), DeclScope::Block);
        let tag = b.tag_type(local);
        let ptag = b.pointer_to(tag);
        let ast = b.finish();
        assert!(ast.has_local_type(Some(ptag)));
    }

    #[test]
    fn test_anonymous_type_detection() {
        let mut b = AstBuilder::new();
        let anon = anon_record(&mut b, None, DeclScope::File);
        let tag = b.tag_type(anon);
        let parr = b.array_of(tag, Some(2));
        let ast = b.finish();
        assert!(ast.has_anonymous_type(Some(tag)));
        assert!(ast.has_anonymous_type(Some(parr)));
        assert!(!ast.has_anonymous_type(None));
        assert_eq!(ast.type_signature(tag), "struct (anonymous)");
    }

    #[test]
    fn test_void_detection() {
        let mut b = AstBuilder::new();
        let void = b.builtin(BuiltinType::Void);
        let pvoid = b.pointer_to(void);
        let ast = b.finish();
        assert!(ast.is_void_type(void));
        assert!(!ast.is_void_type(pvoid));
    }
}
