//! The translation-unit dump
//!
//! Everything a host front end hands over for one translation unit: the
//! source map, the macro definition table, the preprocessor event stream,
//! and the post-expansion AST.

use macrosight_ast::Ast;
use macrosight_core::{Error, Result, SourceMap};
use macrosight_expand::{MacroTable, PpEvent};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One translation unit as seen by the host front end
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub source_map: SourceMap,
    pub macros: MacroTable,
    pub events: Vec<PpEvent>,
    pub ast: Ast,
}

impl TranslationUnit {
    /// Parse a dump from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Dump(e.to_string()))
    }

    /// Load a dump file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize back to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Dump(e.to_string()))
    }
}
