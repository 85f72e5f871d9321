//! Macrosight Analysis Engine
//!
//! Correlates the macro expansion forest with the post-expansion AST and
//! evaluates, for every top-level invocation, the properties that matter
//! when deciding whether a macro could be rewritten as a function, constant,
//! or inline procedure.
//!
//! ## Modules
//!
//! - `tu` - The translation-unit dump handed over by the host front end
//! - `align` - Spelling-range alignment of expansions against the AST
//! - `indices` - Translation-unit-wide AST index sets
//! - `evaluator` - Per-invocation property computation
//! - `includes` - The global-include audit
//! - `record` - Output record types
//! - `emit` - Text emission and record parsing

pub mod align;
pub mod emit;
pub mod evaluator;
pub mod includes;
pub mod indices;
pub mod record;
pub mod tu;

pub use record::{InvocationRecord, OutputRecord};
pub use tu::TranslationUnit;

use macrosight_ast::ParentMap;
use macrosight_core::config::Config;
use macrosight_core::{Error, Result};
use macrosight_expand::PpObserver;
use regex::Regex;
use tracing::debug;

/// Drives one translation unit through the full pipeline: observe the
/// preprocessor events, align the forest against the AST, build the index
/// sets, and evaluate every expansion.
pub struct Analyzer {
    config: Config,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Analyze a translation unit and produce its output records, in
    /// emission order.
    pub fn analyze(&self, tu: &TranslationUnit) -> Result<Vec<OutputRecord>> {
        let filter = match &self.config.analysis.macro_filter {
            Some(pattern) => Some(
                Regex::new(pattern)
                    .map_err(|e| Error::Config(format!("bad macro filter: {}", e)))?,
            ),
            None => None,
        };

        let mut observer = PpObserver::new();
        observer.process(&tu.macros, &tu.events);
        debug!(expansions = observer.forest().len(), "event stream replayed");

        align::align_forest(observer.forest_mut(), &tu.macros, &tu.ast, &tu.source_map);

        let parents = ParentMap::new(&tu.ast);
        let indices = indices::TuIndices::build(&tu.ast);

        let mut out = Vec::new();

        // Definition records, name-ordered
        for (name, def_id) in observer.definitions() {
            let Some(def) = tu.macros.get(*def_id) else {
                continue;
            };
            let (valid, location) = match tu.source_map.try_full_source_loc(def.definition_loc)
            {
                Ok(loc) => (true, loc),
                Err(e) => (false, e.to_string()),
            };
            out.push(OutputRecord::Definition {
                name: name.clone(),
                valid,
                location,
            });
        }

        // Names the preprocessor inspected, sorted
        for name in observer.inspected_names() {
            out.push(OutputRecord::InspectedByCpp {
                name: name.to_string(),
            });
        }

        // Include audit, directive order
        out.extend(includes::audit_includes(
            observer.includes(),
            &tu.ast,
            &tu.source_map,
        ));

        // One record or marker per expansion, source order
        let forest = observer.forest();
        for id in forest.ids() {
            let node = forest.node(id);
            if !node.valid {
                continue;
            }
            if let Some(f) = &filter {
                if !f.is_match(&node.name) {
                    continue;
                }
            }
            if node.depth != 0 || node.in_macro_arg {
                if self.config.analysis.emit_markers {
                    out.push(if node.depth != 0 {
                        OutputRecord::NestedInvocation {
                            name: node.name.clone(),
                        }
                    } else {
                        OutputRecord::InvokedInMacroArgument {
                            name: node.name.clone(),
                        }
                    });
                }
                continue;
            }
            out.push(OutputRecord::TopLevelInvocation(Box::new(
                evaluator::evaluate_top_level(tu, &indices, &parents, &observer, forest, id),
            )));
        }

        Ok(out)
    }

    /// Analyze and render straight to the canonical text format
    pub fn analyze_to_string(&self, tu: &TranslationUnit) -> Result<String> {
        let records = self.analyze(tu)?;
        Ok(records.iter().map(emit::output_to_string).collect())
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
