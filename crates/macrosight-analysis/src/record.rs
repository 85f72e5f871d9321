//! Output records
//!
//! One [`InvocationRecord`] per top-level macro invocation, plus the marker
//! and ancillary line kinds. Field order in the record struct is emission
//! order and must not be rearranged.

use serde::{Deserialize, Serialize};

/// Everything reported about one top-level macro invocation.
///
/// Booleans default to `false` and strings to empty; evaluation only ever
/// upgrades fields it could actually compute, so a partially-failed record
/// is still well-formed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub name: String,
    pub definition_location: String,
    pub invocation_location: String,
    pub ast_kind: String,
    pub type_signature: String,

    pub invocation_depth: u32,
    pub num_ast_roots: u32,
    pub num_arguments: u32,

    pub has_stringification: bool,
    pub has_token_pasting: bool,
    pub has_aligned_arguments: bool,
    /// Declared but never computed; always `false`.
    /// TODO: compare the macro name against the declaration names collected
    /// for the include audit.
    pub has_same_name_as_other_declaration: bool,

    pub does_expansion_have_control_flow_stmt: bool,

    pub does_body_reference_macro_defined_after_macro: bool,
    pub does_body_reference_decl_declared_after_macro: bool,
    pub does_body_contain_decl_ref_expr: bool,
    pub does_subexpression_expanded_from_body_have_local_type: bool,
    pub does_subexpression_expanded_from_body_have_type_defined_after_macro: bool,

    pub does_any_argument_have_side_effects: bool,
    pub does_any_argument_contain_decl_ref_expr: bool,

    pub is_hygienic: bool,
    pub is_definition_location_valid: bool,
    pub is_invocation_location_valid: bool,
    pub is_object_like: bool,
    pub is_invoked_in_macro_argument: bool,
    pub is_name_present_in_cpp_conditional: bool,
    pub is_expansion_ice: bool,

    pub is_expansion_type_null: bool,
    pub is_expansion_type_anonymous: bool,
    pub is_expansion_type_local_type: bool,
    pub is_expansion_type_defined_after_macro: bool,
    pub is_expansion_type_void: bool,

    pub is_any_argument_type_null: bool,
    pub is_any_argument_type_anonymous: bool,
    pub is_any_argument_type_local_type: bool,
    pub is_any_argument_type_defined_after_macro: bool,
    pub is_any_argument_type_void: bool,

    pub is_invoked_where_modifiable_value_required: bool,
    pub is_invoked_where_addressable_value_required: bool,
    pub is_invoked_where_ice_required: bool,

    pub is_any_argument_expanded_where_modifiable_value_required: bool,
    pub is_any_argument_expanded_where_addressable_value_required: bool,
    pub is_any_argument_conditionally_evaluated: bool,
    pub is_any_argument_never_expanded: bool,
    pub is_any_argument_not_an_expression: bool,
}

/// One line or block of analyzer output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputRecord {
    /// A `#define` seen by the preprocessor
    Definition {
        name: String,
        valid: bool,
        /// Full path of the definition, or the error that prevented
        /// resolving one
        location: String,
    },
    /// An identifier examined by a preprocessor conditional
    InspectedByCpp { name: String },
    /// An include directive and whether it is global
    Include { global: bool, filename: String },
    /// Marker for an invocation nested inside another expansion
    NestedInvocation { name: String },
    /// Marker for an invocation written inside a macro argument
    InvokedInMacroArgument { name: String },
    /// Full record for a top-level invocation
    TopLevelInvocation(Box<InvocationRecord>),
}
