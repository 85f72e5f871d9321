//! Macrosight Expansion Tracking
//!
//! Consumes the preprocessor event stream recorded by a host front end and
//! builds the expansion forest: one node per macro invocation, parent links
//! following nesting, sibling order following source order.
//!
//! ## Modules
//!
//! - `events` - Macro definition table and the preprocessor event stream
//! - `observer` - Event consumer: definitions, inspected names, includes
//! - `forest` - The expansion forest and its in-flight stack

pub mod events;
pub mod forest;
pub mod observer;

pub use events::{IncludedFile, MacroDefId, MacroDefinition, MacroTable, PpEvent};
pub use forest::{ExpansionArgument, ExpansionForest, ExpansionId, ExpansionNode};
pub use observer::{IncludeDirective, PpObserver};
