//! Record emission and parsing
//!
//! The text format is one block per top-level invocation and one line per
//! marker or ancillary record, with a stable key order inside blocks. The
//! parser inverts the block format so emitted records round-trip.

use crate::record::{InvocationRecord, OutputRecord};
use macrosight_core::{Error, Result};
use std::io::Write;

fn bool_str(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

/// The record's entries in emission order
fn entries(rec: &InvocationRecord) -> (Vec<(&'static str, &str)>, Vec<(&'static str, u32)>, Vec<(&'static str, bool)>) {
    let strings: Vec<(&'static str, &str)> = vec![
        ("Name", &rec.name),
        ("DefinitionLocation", &rec.definition_location),
        ("InvocationLocation", &rec.invocation_location),
        ("ASTKind", &rec.ast_kind),
        ("TypeSignature", &rec.type_signature),
    ];
    let ints = vec![
        ("InvocationDepth", rec.invocation_depth),
        ("NumASTRoots", rec.num_ast_roots),
        ("NumArguments", rec.num_arguments),
    ];
    let bools = vec![
        ("HasStringification", rec.has_stringification),
        ("HasTokenPasting", rec.has_token_pasting),
        ("HasAlignedArguments", rec.has_aligned_arguments),
        (
            "HasSameNameAsOtherDeclaration",
            rec.has_same_name_as_other_declaration,
        ),
        (
            "DoesExpansionHaveControlFlowStmt",
            rec.does_expansion_have_control_flow_stmt,
        ),
        (
            "DoesBodyReferenceMacroDefinedAfterMacro",
            rec.does_body_reference_macro_defined_after_macro,
        ),
        (
            "DoesBodyReferenceDeclDeclaredAfterMacro",
            rec.does_body_reference_decl_declared_after_macro,
        ),
        ("DoesBodyContainDeclRefExpr", rec.does_body_contain_decl_ref_expr),
        (
            "DoesSubexpressionExpandedFromBodyHaveLocalType",
            rec.does_subexpression_expanded_from_body_have_local_type,
        ),
        (
            "DoesSubexpressionExpandedFromBodyHaveTypeDefinedAfterMacro",
            rec.does_subexpression_expanded_from_body_have_type_defined_after_macro,
        ),
        (
            "DoesAnyArgumentHaveSideEffects",
            rec.does_any_argument_have_side_effects,
        ),
        (
            "DoesAnyArgumentContainDeclRefExpr",
            rec.does_any_argument_contain_decl_ref_expr,
        ),
        ("IsHygienic", rec.is_hygienic),
        ("IsDefinitionLocationValid", rec.is_definition_location_valid),
        ("IsInvocationLocationValid", rec.is_invocation_location_valid),
        ("IsObjectLike", rec.is_object_like),
        ("IsInvokedInMacroArgument", rec.is_invoked_in_macro_argument),
        (
            "IsNamePresentInCPPConditional",
            rec.is_name_present_in_cpp_conditional,
        ),
        ("IsExpansionICE", rec.is_expansion_ice),
        ("IsExpansionTypeNull", rec.is_expansion_type_null),
        ("IsExpansionTypeAnonymous", rec.is_expansion_type_anonymous),
        ("IsExpansionTypeLocalType", rec.is_expansion_type_local_type),
        (
            "IsExpansionTypeDefinedAfterMacro",
            rec.is_expansion_type_defined_after_macro,
        ),
        ("IsExpansionTypeVoid", rec.is_expansion_type_void),
        ("IsAnyArgumentTypeNull", rec.is_any_argument_type_null),
        ("IsAnyArgumentTypeAnonymous", rec.is_any_argument_type_anonymous),
        ("IsAnyArgumentTypeLocalType", rec.is_any_argument_type_local_type),
        (
            "IsAnyArgumentTypeDefinedAfterMacro",
            rec.is_any_argument_type_defined_after_macro,
        ),
        ("IsAnyArgumentTypeVoid", rec.is_any_argument_type_void),
        (
            "IsInvokedWhereModifiableValueRequired",
            rec.is_invoked_where_modifiable_value_required,
        ),
        (
            "IsInvokedWhereAddressableValueRequired",
            rec.is_invoked_where_addressable_value_required,
        ),
        ("IsInvokedWhereICERequired", rec.is_invoked_where_ice_required),
        (
            "IsAnyArgumentExpandedWhereModifiableValueRequired",
            rec.is_any_argument_expanded_where_modifiable_value_required,
        ),
        (
            "IsAnyArgumentExpandedWhereAddressableValueRequired",
            rec.is_any_argument_expanded_where_addressable_value_required,
        ),
        (
            "IsAnyArgumentConditionallyEvaluated",
            rec.is_any_argument_conditionally_evaluated,
        ),
        ("IsAnyArgumentNeverExpanded", rec.is_any_argument_never_expanded),
        (
            "IsAnyArgumentNotAnExpression",
            rec.is_any_argument_not_an_expression,
        ),
    ];
    (strings, ints, bools)
}

/// Render one invocation record as its text block
pub fn record_to_string(rec: &InvocationRecord) -> String {
    let (strings, ints, bools) = entries(rec);
    let mut out = String::from("Top level invocation\t{\n");
    for (k, v) in &strings {
        out.push_str(&format!("    \"{}\" : \"{}\",\n", k, v));
    }
    for (k, v) in &ints {
        out.push_str(&format!("    \"{}\" : {},\n", k, v));
    }
    for (i, (k, v)) in bools.iter().enumerate() {
        let sep = if i == bools.len() - 1 { "" } else { "," };
        out.push_str(&format!("    \"{}\" : {}{}\n", k, bool_str(*v), sep));
    }
    out.push_str(" }\n");
    out
}

/// Render any output record as text
pub fn output_to_string(record: &OutputRecord) -> String {
    match record {
        OutputRecord::Definition {
            name,
            valid,
            location,
        } => format!("Definition\t{}\t{}\t{}\n", name, bool_str(*valid), location),
        OutputRecord::InspectedByCpp { name } => format!("InspectedByCPP\t{}\n", name),
        OutputRecord::Include { global, filename } => {
            format!("Include\t{}\t{}\n", bool_str(*global), filename)
        }
        OutputRecord::NestedInvocation { name } => format!("Nested Invocation\t{}\n", name),
        OutputRecord::InvokedInMacroArgument { name } => {
            format!("Invoked In Macro Argument\t{}\n", name)
        }
        OutputRecord::TopLevelInvocation(rec) => record_to_string(rec),
    }
}

/// Write the whole output stream
pub fn write_records<W: Write>(w: &mut W, records: &[OutputRecord]) -> std::io::Result<()> {
    for record in records {
        w.write_all(output_to_string(record).as_bytes())?;
    }
    Ok(())
}

/// Parse one invocation-record block produced by [`record_to_string`]
pub fn parse_record(text: &str) -> Result<InvocationRecord> {
    let mut rec = InvocationRecord::default();
    let mut saw_header = false;

    for line in text.lines() {
        let line = line.trim_end();
        if line.starts_with("Top level invocation") {
            saw_header = true;
            continue;
        }
        let trimmed = line.trim();
        if trimmed == "}" || trimmed.is_empty() {
            continue;
        }
        let Some((raw_key, raw_value)) = trimmed.split_once(" : ") else {
            return Err(Error::Other(format!("malformed record line: {}", line)));
        };
        let key = raw_key.trim().trim_matches('"');
        let value = raw_value.trim().trim_end_matches(',');
        set_field(&mut rec, key, value)?;
    }

    if !saw_header {
        return Err(Error::Other("missing record header".to_string()));
    }
    Ok(rec)
}

fn set_field(rec: &mut InvocationRecord, key: &str, value: &str) -> Result<()> {
    let as_string = || value.trim_matches('"').to_string();
    let as_int = || {
        value
            .parse::<u32>()
            .map_err(|_| Error::Other(format!("bad integer for {}: {}", key, value)))
    };
    let as_bool = || match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::Other(format!("bad boolean for {}: {}", key, value))),
    };

    match key {
        "Name" => rec.name = as_string(),
        "DefinitionLocation" => rec.definition_location = as_string(),
        "InvocationLocation" => rec.invocation_location = as_string(),
        "ASTKind" => rec.ast_kind = as_string(),
        "TypeSignature" => rec.type_signature = as_string(),
        "InvocationDepth" => rec.invocation_depth = as_int()?,
        "NumASTRoots" => rec.num_ast_roots = as_int()?,
        "NumArguments" => rec.num_arguments = as_int()?,
        "HasStringification" => rec.has_stringification = as_bool()?,
        "HasTokenPasting" => rec.has_token_pasting = as_bool()?,
        "HasAlignedArguments" => rec.has_aligned_arguments = as_bool()?,
        "HasSameNameAsOtherDeclaration" => {
            rec.has_same_name_as_other_declaration = as_bool()?
        }
        "DoesExpansionHaveControlFlowStmt" => {
            rec.does_expansion_have_control_flow_stmt = as_bool()?
        }
        "DoesBodyReferenceMacroDefinedAfterMacro" => {
            rec.does_body_reference_macro_defined_after_macro = as_bool()?
        }
        "DoesBodyReferenceDeclDeclaredAfterMacro" => {
            rec.does_body_reference_decl_declared_after_macro = as_bool()?
        }
        "DoesBodyContainDeclRefExpr" => rec.does_body_contain_decl_ref_expr = as_bool()?,
        "DoesSubexpressionExpandedFromBodyHaveLocalType" => {
            rec.does_subexpression_expanded_from_body_have_local_type = as_bool()?
        }
        "DoesSubexpressionExpandedFromBodyHaveTypeDefinedAfterMacro" => {
            rec.does_subexpression_expanded_from_body_have_type_defined_after_macro = as_bool()?
        }
        "DoesAnyArgumentHaveSideEffects" => {
            rec.does_any_argument_have_side_effects = as_bool()?
        }
        "DoesAnyArgumentContainDeclRefExpr" => {
            rec.does_any_argument_contain_decl_ref_expr = as_bool()?
        }
        "IsHygienic" => rec.is_hygienic = as_bool()?,
        "IsDefinitionLocationValid" => rec.is_definition_location_valid = as_bool()?,
        "IsInvocationLocationValid" => rec.is_invocation_location_valid = as_bool()?,
        "IsObjectLike" => rec.is_object_like = as_bool()?,
        "IsInvokedInMacroArgument" => rec.is_invoked_in_macro_argument = as_bool()?,
        "IsNamePresentInCPPConditional" => {
            rec.is_name_present_in_cpp_conditional = as_bool()?
        }
        "IsExpansionICE" => rec.is_expansion_ice = as_bool()?,
        "IsExpansionTypeNull" => rec.is_expansion_type_null = as_bool()?,
        "IsExpansionTypeAnonymous" => rec.is_expansion_type_anonymous = as_bool()?,
        "IsExpansionTypeLocalType" => rec.is_expansion_type_local_type = as_bool()?,
        "IsExpansionTypeDefinedAfterMacro" => {
            rec.is_expansion_type_defined_after_macro = as_bool()?
        }
        "IsExpansionTypeVoid" => rec.is_expansion_type_void = as_bool()?,
        "IsAnyArgumentTypeNull" => rec.is_any_argument_type_null = as_bool()?,
        "IsAnyArgumentTypeAnonymous" => rec.is_any_argument_type_anonymous = as_bool()?,
        "IsAnyArgumentTypeLocalType" => rec.is_any_argument_type_local_type = as_bool()?,
        "IsAnyArgumentTypeDefinedAfterMacro" => {
            rec.is_any_argument_type_defined_after_macro = as_bool()?
        }
        "IsAnyArgumentTypeVoid" => rec.is_any_argument_type_void = as_bool()?,
        "IsInvokedWhereModifiableValueRequired" => {
            rec.is_invoked_where_modifiable_value_required = as_bool()?
        }
        "IsInvokedWhereAddressableValueRequired" => {
            rec.is_invoked_where_addressable_value_required = as_bool()?
        }
        "IsInvokedWhereICERequired" => rec.is_invoked_where_ice_required = as_bool()?,
        "IsAnyArgumentExpandedWhereModifiableValueRequired" => {
            rec.is_any_argument_expanded_where_modifiable_value_required = as_bool()?
        }
        "IsAnyArgumentExpandedWhereAddressableValueRequired" => {
            rec.is_any_argument_expanded_where_addressable_value_required = as_bool()?
        }
        "IsAnyArgumentConditionallyEvaluated" => {
            rec.is_any_argument_conditionally_evaluated = as_bool()?
        }
        "IsAnyArgumentNeverExpanded" => rec.is_any_argument_never_expanded = as_bool()?,
        "IsAnyArgumentNotAnExpression" => {
            rec.is_any_argument_not_an_expression = as_bool()?
        }
        _ => return Err(Error::Other(format!("unknown record key: {}", key))),
    }
    Ok(())
}
