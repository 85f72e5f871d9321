//! AST alignment
//!
//! Attaches to every expansion node the AST roots whose spelling range
//! exactly matches the expansion's, and to every argument the roots matching
//! its token span. Ranges are compared at file level only; macro-internal
//! locations are resolved through the source map's spelling links first.

use macrosight_ast::{Ast, AstRoot, StmtKind};
use macrosight_core::{SourceMap, SourceRange};
use macrosight_expand::{ExpansionForest, MacroTable};
use std::collections::HashMap;
use tracing::debug;

/// Lookup from file-level (begin, end) spelling ranges to the AST roots
/// occupying exactly that range. Statements are indexed before declarations,
/// before type locations, so lookups preserve the search order.
pub struct SpellingIndex {
    map: HashMap<(u32, u32), Vec<AstRoot>>,
}

impl SpellingIndex {
    pub fn build(ast: &Ast, sm: &SourceMap) -> Self {
        let mut map: HashMap<(u32, u32), Vec<AstRoot>> = HashMap::new();
        let mut add = |range: SourceRange, root: AstRoot| {
            let begin = sm.file_loc(range.begin);
            let end = sm.file_loc(range.end);
            if begin.is_valid() && end.is_valid() {
                map.entry((begin.0, end.0)).or_default().push(root);
            }
        };

        for sid in ast.stmt_ids() {
            let stmt = ast.stmt(sid);
            // Implicit nodes never count as spelled source
            if matches!(
                stmt.kind,
                StmtKind::ImplicitCast(_) | StmtKind::ImplicitValueInit
            ) {
                continue;
            }
            add(stmt.range, AstRoot::Stmt(sid));
        }
        for did in ast.decl_ids() {
            add(ast.decl(did).range, AstRoot::Decl(did));
        }
        for tid in ast.type_loc_ids() {
            add(ast.type_loc(tid).range, AstRoot::TypeLoc(tid));
        }

        Self { map }
    }

    /// All roots whose spelling range equals `range`
    pub fn roots_at(&self, sm: &SourceMap, range: SourceRange) -> &[AstRoot] {
        let begin = sm.file_loc(range.begin);
        let end = sm.file_loc(range.end);
        if begin.is_invalid() || end.is_invalid() {
            return &[];
        }
        self.map
            .get(&(begin.0, end.0))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Populate `ast_roots`, `aligned_root`, and per-argument `aligned_roots`
/// on every valid node of the forest.
pub fn align_forest(
    forest: &mut ExpansionForest,
    table: &MacroTable,
    ast: &Ast,
    sm: &SourceMap,
) {
    let index = SpellingIndex::build(ast, sm);

    let ids: Vec<_> = forest.ids().collect();
    for id in ids {
        let node = forest.node(id);
        if !node.valid {
            continue;
        }
        let has_body = table
            .get(node.def)
            .is_some_and(|d| !d.tokens.is_empty());
        if !has_body {
            continue;
        }

        debug!(name = %node.name, "aligning expansion");
        let roots: Vec<AstRoot> = index.roots_at(sm, node.spelling_range).to_vec();
        let aligned = (roots.len() == 1).then(|| roots[0]);
        let arg_roots: Vec<Vec<AstRoot>> = node
            .arguments
            .iter()
            .map(|arg| match arg.token_span() {
                Some(span) => index.roots_at(sm, span).to_vec(),
                None => Vec::new(),
            })
            .collect();

        let node = forest.node_mut(id);
        node.ast_roots = roots;
        node.aligned_root = aligned;
        for (arg, roots) in node.arguments.iter_mut().zip(arg_roots) {
            arg.aligned_roots = roots;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrosight_ast::{AstBuilder, BuiltinType, StmtKind};
    use macrosight_core::{SourceLocation, SourceMap, Token};
    use macrosight_expand::{MacroDefId, MacroDefinition, MacroTable};

    fn loc(n: u32) -> SourceLocation {
        SourceLocation(n)
    }

    fn range(a: u32, b: u32) -> SourceRange {
        SourceRange::new(loc(a), loc(b))
    }

    fn source_map() -> SourceMap {
        let mut sm = SourceMap::new();
        sm.add_file("test.c", Some("/src/test.c".into()), 200, vec![0]);
        sm
    }

    fn one_macro() -> (MacroTable, MacroDefId) {
        let mut t = MacroTable::new();
        let id = t.push(MacroDefinition {
            name: "M".into(),
            object_like: true,
            parameters: vec![],
            definition_loc: loc(100),
            definition_range: range(100, 110),
            tokens: vec![Token::literal("1", loc(108))],
        });
        (t, id)
    }

    #[test]
    fn test_unique_match_aligns() {
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);
        let lit = b.expr(StmtKind::IntLiteral(1), range(10, 10), int);
        let ast = b.finish();
        let sm = source_map();
        let (table, def) = one_macro();

        let mut forest = ExpansionForest::new();
        let id = forest
            .begin_expansion(&table, def, range(10, 10), vec![])
            .unwrap();
        forest.end_expansion(&table, def);
        align_forest(&mut forest, &table, &ast, &sm);

        let node = forest.node(id);
        assert_eq!(node.ast_roots, vec![AstRoot::Stmt(lit)]);
        assert_eq!(node.aligned_root, Some(AstRoot::Stmt(lit)));
    }

    #[test]
    fn test_ambiguous_match_leaves_aligned_root_unset() {
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);
        let inner = b.expr(StmtKind::IntLiteral(1), range(10, 12), int);
        b.expr(StmtKind::Paren(inner), range(10, 12), int);
        let ast = b.finish();
        let sm = source_map();
        let (table, def) = one_macro();

        let mut forest = ExpansionForest::new();
        let id = forest
            .begin_expansion(&table, def, range(10, 12), vec![])
            .unwrap();
        forest.end_expansion(&table, def);
        align_forest(&mut forest, &table, &ast, &sm);

        let node = forest.node(id);
        assert_eq!(node.ast_roots.len(), 2);
        assert_eq!(node.aligned_root, None);
    }

    #[test]
    fn test_zero_matches_is_not_fatal() {
        let ast = AstBuilder::new().finish();
        let sm = source_map();
        let (table, def) = one_macro();

        let mut forest = ExpansionForest::new();
        let id = forest
            .begin_expansion(&table, def, range(10, 12), vec![])
            .unwrap();
        forest.end_expansion(&table, def);
        align_forest(&mut forest, &table, &ast, &sm);

        let node = forest.node(id);
        assert!(node.ast_roots.is_empty());
        assert_eq!(node.aligned_root, None);
    }

    #[test]
    fn test_empty_definition_tokens_skips_alignment() {
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);
        b.expr(StmtKind::IntLiteral(1), range(10, 10), int);
        let ast = b.finish();
        let sm = source_map();

        let mut table = MacroTable::new();
        let def = table.push(MacroDefinition {
            name: "EMPTY".into(),
            object_like: true,
            parameters: vec![],
            definition_loc: loc(100),
            definition_range: range(100, 105),
            tokens: vec![],
        });

        let mut forest = ExpansionForest::new();
        let id = forest
            .begin_expansion(&table, def, range(10, 10), vec![])
            .unwrap();
        forest.end_expansion(&table, def);
        align_forest(&mut forest, &table, &ast, &sm);

        assert!(forest.node(id).ast_roots.is_empty());
    }

    #[test]
    fn test_implicit_casts_are_excluded() {
        let mut b = AstBuilder::new();
        let int = b.builtin(BuiltinType::Int);
        let lit = b.expr(StmtKind::IntLiteral(1), range(10, 10), int);
        b.expr(StmtKind::ImplicitCast(lit), range(10, 10), int);
        let ast = b.finish();
        let sm = source_map();
        let (table, def) = one_macro();

        let mut forest = ExpansionForest::new();
        let id = forest
            .begin_expansion(&table, def, range(10, 10), vec![])
            .unwrap();
        forest.end_expansion(&table, def);
        align_forest(&mut forest, &table, &ast, &sm);

        // Only the literal matches; the implicit cast wrapping it does not
        let node = forest.node(id);
        assert_eq!(node.ast_roots, vec![AstRoot::Stmt(lit)]);
        assert_eq!(node.aligned_root, Some(AstRoot::Stmt(lit)));
    }
}
