//! Preprocessor event consumer
//!
//! Replays the host's callback stream: records macro definitions (latest
//! definition per name wins), the identifiers inspected by preprocessor
//! conditionals, and include directives, and drives the expansion forest.
//! The observer never fails; events it cannot track are dropped.

use crate::events::{IncludedFile, MacroDefId, MacroTable, PpEvent};
use crate::forest::ExpansionForest;
use macrosight_core::SourceLocation;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// A buffered `#include`, kept for the global-include audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub hash_loc: SourceLocation,
    pub file: Option<IncludedFile>,
}

/// Consumes the preprocessor event stream
#[derive(Debug, Default)]
pub struct PpObserver {
    /// Latest definition per macro name
    definitions: BTreeMap<String, MacroDefId>,
    /// Names examined by `#if`-family directives
    inspected: BTreeSet<String>,
    includes: Vec<IncludeDirective>,
    forest: ExpansionForest,
}

impl PpObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay the whole stream, then close out the forest
    pub fn process(&mut self, table: &MacroTable, events: &[PpEvent]) {
        for event in events {
            self.handle(table, event);
        }
        self.forest.finish();
    }

    fn handle(&mut self, table: &MacroTable, event: &PpEvent) {
        match event {
            PpEvent::MacroDefined { name, def } => {
                if table.get(*def).is_none() {
                    warn!(name = %name, "definition event for unknown macro dropped");
                    return;
                }
                self.definitions.insert(name.clone(), *def);
            }
            PpEvent::InspectedByConditional { name } => {
                self.inspected.insert(name.clone());
            }
            PpEvent::InclusionDirective { hash_loc, file } => {
                self.includes.push(IncludeDirective {
                    hash_loc: *hash_loc,
                    file: file.clone(),
                });
            }
            PpEvent::ExpansionBegin {
                def,
                spelling_range,
                args,
            } => {
                self.forest
                    .begin_expansion(table, *def, *spelling_range, args.clone());
            }
            PpEvent::ExpansionEnd { def } => {
                self.forest.end_expansion(table, *def);
            }
        }
    }

    /// Latest definition per name, name-ordered
    pub fn definitions(&self) -> &BTreeMap<String, MacroDefId> {
        &self.definitions
    }

    /// Whether the preprocessor inspected this name in a conditional
    pub fn was_inspected(&self, name: &str) -> bool {
        self.inspected.contains(name)
    }

    /// Inspected names in sorted order
    pub fn inspected_names(&self) -> impl Iterator<Item = &str> {
        self.inspected.iter().map(String::as_str)
    }

    /// Buffered include directives, in directive order
    pub fn includes(&self) -> &[IncludeDirective] {
        &self.includes
    }

    pub fn forest(&self) -> &ExpansionForest {
        &self.forest
    }

    pub fn forest_mut(&mut self) -> &mut ExpansionForest {
        &mut self.forest
    }
}
