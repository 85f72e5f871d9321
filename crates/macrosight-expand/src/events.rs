//! Macro definitions and the preprocessor event stream

use macrosight_core::{SourceLocation, SourceRange, Token};
use serde::{Deserialize, Serialize};

/// Reference to a macro's point of definition.
///
/// Created when the preprocessor first sees the `#define`; immortal for the
/// rest of the translation unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MacroDefId(pub u32);

/// One `#define`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroDefinition {
    pub name: String,
    /// Object-like (`#define N 10`) as opposed to function-like
    pub object_like: bool,
    /// Parameter names, empty for object-like macros
    pub parameters: Vec<String>,
    /// Location of the defined name
    pub definition_loc: SourceLocation,
    /// Extent of the whole definition
    pub definition_range: SourceRange,
    /// Replacement-list tokens
    pub tokens: Vec<Token>,
}

impl MacroDefinition {
    pub fn is_object_like(&self) -> bool {
        self.object_like
    }

    pub fn is_function_like(&self) -> bool {
        !self.object_like
    }
}

/// All macro definitions seen in the translation unit, in definition order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MacroTable {
    defs: Vec<MacroDefinition>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, def: MacroDefinition) -> MacroDefId {
        let id = MacroDefId(self.defs.len() as u32);
        self.defs.push(def);
        id
    }

    pub fn get(&self, id: MacroDefId) -> Option<&MacroDefinition> {
        self.defs.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MacroDefId, &MacroDefinition)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, d)| (MacroDefId(i as u32), d))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// A file named by an include directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedFile {
    /// Name as written in the directive
    pub name: String,
    /// Resolved on-disk path; empty when resolution failed
    pub real_path: String,
}

/// One preprocessor callback, in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PpEvent {
    /// A `#define` was processed
    MacroDefined { name: String, def: MacroDefId },
    /// An identifier was examined by `#if`/`#ifdef`/`#ifndef`/`defined`
    InspectedByConditional { name: String },
    /// An `#include` directive; `file` is `None` when the file was not found
    InclusionDirective {
        hash_loc: SourceLocation,
        file: Option<IncludedFile>,
    },
    /// A macro invocation opened. Nested expansions arrive between this
    /// event and the matching `ExpansionEnd`.
    ExpansionBegin {
        def: MacroDefId,
        spelling_range: SourceRange,
        /// Tokens written for each comma-separated argument
        args: Vec<Vec<Token>>,
    },
    /// The innermost open invocation of `def` closed
    ExpansionEnd { def: MacroDefId },
}
