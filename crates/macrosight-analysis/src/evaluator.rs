//! Per-expansion property evaluation
//!
//! Walks the subtrees hanging off a top-level expansion's aligned roots,
//! queries the prebuilt translation-unit indices, and fills in the
//! invocation record. Evaluation never aborts a record: anything that
//! cannot be computed keeps its default.

use crate::indices::{modified_operand, skip_implicit_and_parens, TuIndices};
use crate::record::InvocationRecord;
use crate::tu::TranslationUnit;
use macrosight_ast::walk::{is_descendant_of_ice_context, subtrees, ParentMap};
use macrosight_ast::{in_tree, is_integer_constant_expr, AstRoot, StmtId, StmtKind};
use macrosight_expand::{ExpansionForest, ExpansionId, PpObserver};
use std::collections::HashSet;
use tracing::debug;

pub(crate) fn evaluate_top_level(
    tu: &TranslationUnit,
    indices: &TuIndices,
    parents: &ParentMap,
    observer: &PpObserver,
    forest: &ExpansionForest,
    id: ExpansionId,
) -> InvocationRecord {
    let node = forest.node(id);
    let ast = &tu.ast;
    let sm = &tu.source_map;

    let mut rec = InvocationRecord {
        name: node.name.clone(),
        invocation_depth: node.depth,
        num_ast_roots: node.ast_roots.len() as u32,
        num_arguments: node.arguments.len() as u32,
        has_stringification: node.has_stringification,
        has_token_pasting: node.has_token_paste,
        is_invoked_in_macro_argument: node.in_macro_arg,
        is_name_present_in_cpp_conditional: observer.was_inspected(&node.name),
        ..Default::default()
    };

    let Some(def) = tu.macros.get(node.def) else {
        return rec;
    };
    rec.is_object_like = def.is_object_like();

    debug!(name = %rec.name, "evaluating top-level invocation");

    // Identity and location
    if let Ok(loc) = sm.try_full_source_loc(def.definition_loc) {
        rec.is_definition_location_valid = true;
        rec.definition_location = loc;
    }
    if let Ok(loc) = sm.try_full_source_loc(node.spelling_range.begin) {
        rec.is_invocation_location_valid = true;
        rec.invocation_location = loc;
    }

    let def_loc = sm.file_loc(def.definition_loc);

    // Whether any macro this one expands was defined after this one
    rec.does_body_reference_macro_defined_after_macro =
        forest.descendants(id).iter().any(|desc| {
            tu.macros
                .get(forest.node(*desc).def)
                .is_some_and(|d| sm.is_before_in_tu(def_loc, d.definition_loc))
        });

    // AST kind of the aligned root
    let aligned_stmt = node.aligned_root.and_then(AstRoot::stmt);
    match node.aligned_root {
        Some(AstRoot::Stmt(st)) => {
            debug!("aligns with a stmt");
            let kind = if ast.stmt(st).is_expr() { "Expr" } else { "Stmt" };
            rec.ast_kind = kind.to_string();
        }
        Some(AstRoot::Decl(_)) => {
            debug!("aligns with a decl");
            rec.ast_kind = "Decl".to_string();
        }
        Some(AstRoot::TypeLoc(tl)) => {
            debug!("aligns with a type loc");
            rec.ast_kind = "TypeLoc".to_string();
            let ty = ast.type_loc(tl).ty;
            rec.is_expansion_type_defined_after_macro =
                ast.has_type_defined_after(Some(ty), sm, def_loc);
        }
        None => {}
    }

    // An argument is aligned when its aligned roots account for every
    // expansion of the corresponding parameter in the body
    rec.has_aligned_arguments = node
        .arguments
        .iter()
        .all(|a| a.aligned_roots.len() == a.expected_expansions);

    // Statements expanded from arguments
    let mut arg_stmts: HashSet<StmtId> = HashSet::new();
    if rec.has_aligned_arguments {
        debug!("collecting argument subtrees");
        for arg in &node.arguments {
            for root in &arg.aligned_roots {
                if let Some(st) = root.stmt() {
                    arg_stmts.extend(subtrees(ast, st));
                }
            }
        }

        let in_args = |st: StmtId| arg_stmts.contains(&st);

        rec.does_any_argument_have_side_effects =
            indices.side_effect_exprs.iter().any(|e| in_args(*e));

        rec.does_any_argument_contain_decl_ref_expr =
            indices.all_decl_refs.iter().any(|e| in_args(*e));

        // A side effect written outside the macro whose modified operand
        // came from one of this macro's arguments
        rec.is_any_argument_expanded_where_modifiable_value_required =
            indices.side_effect_exprs.iter().any(|e| {
                !in_args(*e)
                    && modified_operand(ast, *e)
                        .map(|lhs| skip_implicit_and_parens(ast, lhs))
                        .is_some_and(in_args)
            });

        rec.is_any_argument_expanded_where_addressable_value_required =
            indices.address_of_exprs.iter().any(|u| {
                !in_args(*u)
                    && modified_operand_of_unary(ast, *u)
                        .map(|op| skip_implicit_and_parens(ast, op))
                        .is_some_and(in_args)
            });

        debug!("checking if any argument is conditionally evaluated");
        rec.is_any_argument_conditionally_evaluated = arg_stmts.iter().any(|arg_st| {
            indices
                .short_circuit_operands
                .iter()
                .any(|operand| in_tree(ast, *arg_st, *operand))
        });

        // Per-argument facts off the first aligned root
        for arg in &node.arguments {
            rec.is_any_argument_never_expanded |= arg.aligned_roots.is_empty();
            let Some(first) = arg.aligned_roots.first() else {
                continue;
            };
            let expr = first.stmt().filter(|st| ast.stmt(*st).is_expr());
            rec.is_any_argument_not_an_expression |= expr.is_none();
            let Some(e) = expr else {
                continue;
            };
            let ty = ast.stmt(e).ty;
            rec.is_any_argument_type_null |= ty.is_none();
            if let Some(t) = ty {
                rec.is_any_argument_type_void = ast.is_void_type(t);
                rec.is_any_argument_type_anonymous = ast.has_anonymous_type(Some(t));
                rec.is_any_argument_type_local_type = ast.has_local_type(Some(t));
            }
            rec.is_any_argument_type_defined_after_macro |=
                ast.has_type_defined_after(ty, sm, def_loc);
        }
    }

    // Statements expanded from the body
    let mut body_stmts: HashSet<StmtId> = HashSet::new();
    if let (Some(st), true) = (aligned_stmt, rec.has_aligned_arguments) {
        debug!("collecting body subtrees");
        body_stmts = subtrees(ast, st);
        for arg_st in &arg_stmts {
            body_stmts.remove(arg_st);
        }

        let in_body = |s: StmtId| body_stmts.contains(&s);

        rec.does_body_reference_decl_declared_after_macro =
            indices.all_decl_refs.iter().any(|dre| {
                if !in_body(*dre) {
                    return false;
                }
                match &ast.stmt(*dre).kind {
                    StmtKind::DeclRef(d) => {
                        let decl_loc = sm.file_loc(ast.decl(*d).name_loc);
                        sm.is_before_in_tu(def_loc, decl_loc)
                    }
                    _ => false,
                }
            });

        rec.does_body_contain_decl_ref_expr =
            indices.all_decl_refs.iter().any(|e| in_body(*e));

        rec.does_subexpression_expanded_from_body_have_local_type =
            indices.locally_typed_exprs.iter().any(|e| in_body(*e));

        rec.does_subexpression_expanded_from_body_have_type_defined_after_macro =
            body_stmts.iter().any(|s| {
                let stmt = ast.stmt(*s);
                stmt.is_expr() && ast.has_type_defined_after(stmt.ty, sm, def_loc)
            });

        rec.is_hygienic = !indices.local_decl_refs.iter().any(|e| in_body(*e));

        rec.is_invoked_where_modifiable_value_required = indices
            .side_effect_lhs
            .iter()
            .any(|lhs| skip_implicit_and_parens(ast, *lhs) == st);

        rec.is_invoked_where_addressable_value_required =
            indices.address_of_exprs.iter().any(|u| {
                modified_operand_of_unary(ast, *u)
                    .map(|op| skip_implicit_and_parens(ast, op))
                    == Some(st)
            });

        rec.is_invoked_where_ice_required = is_descendant_of_ice_context(ast, parents, st);

        // Type signature
        let mut signature = "void".to_string();
        if ast.stmt(st).is_expr() {
            let ty = ast.stmt(st).ty;
            rec.is_expansion_type_null = ty.is_some();
            if let Some(t) = ty {
                rec.is_expansion_type_void = ast.is_void_type(t);
                rec.is_expansion_type_anonymous = ast.has_anonymous_type(Some(t));
                rec.is_expansion_type_local_type = ast.has_local_type(Some(t));
                signature = ast.type_signature(t);
            }
            rec.is_expansion_type_defined_after_macro =
                ast.has_type_defined_after(ty, sm, def_loc);
            rec.is_expansion_ice = is_integer_constant_expr(ast, st);
        }

        let parenthesized = def.is_function_like()
            && (rec.ast_kind == "Stmt" || rec.ast_kind == "Expr");
        if parenthesized {
            signature.push('(');
        }
        debug!("iterating arguments");
        for (i, arg) in node.arguments.iter().enumerate() {
            if i != 0 {
                signature.push_str(", ");
            }
            let Some(first) = arg.aligned_roots.first() else {
                continue;
            };
            let Some(e) = first.stmt().filter(|s| ast.stmt(*s).is_expr()) else {
                continue;
            };
            let arg_ty = match ast.stmt(e).ty {
                Some(t) => ast.type_signature(t),
                None => "<Null>".to_string(),
            };
            signature.push_str(&arg_ty);
        }
        if parenthesized {
            signature.push(')');
        }
        rec.type_signature = signature;
    }

    // Control flow anywhere in the expansion
    rec.does_expansion_have_control_flow_stmt =
        body_stmts.iter().chain(arg_stmts.iter()).any(|s| {
            matches!(
                ast.stmt(*s).kind,
                StmtKind::Return(_) | StmtKind::Break | StmtKind::Continue | StmtKind::Goto(_)
            )
        });

    rec
}

/// Operand of a unary expression, for address-of stripping
fn modified_operand_of_unary(ast: &macrosight_ast::Ast, u: StmtId) -> Option<StmtId> {
    match &ast.stmt(u).kind {
        StmtKind::Unary { operand, .. } => Some(*operand),
        _ => None,
    }
}
