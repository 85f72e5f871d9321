//! The macro expansion forest
//!
//! One node per invocation. Parent links follow nesting, sibling order
//! follows source order, and an in-flight stack tracks the expansions the
//! preprocessor currently has open. Nodes are owned by the forest; every
//! other component holds ids.

use crate::events::{MacroDefId, MacroTable};
use macrosight_ast::AstRoot;
use macrosight_core::token::{count_identifier_uses, has_stringification, has_token_paste};
use macrosight_core::{SourceRange, Token};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// An expansion node id
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ExpansionId(pub u32);

/// One written argument of a macro invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpansionArgument {
    /// The tokens as written at the invocation site
    pub tokens: Vec<Token>,
    /// How many times the corresponding parameter occurs in the macro body,
    /// which is how many times this argument is expanded
    pub expected_expansions: usize,
    /// AST nodes whose spelling range equals this argument's token span
    pub aligned_roots: Vec<AstRoot>,
}

impl ExpansionArgument {
    /// File-level span of the written tokens, if any were written
    pub fn token_span(&self) -> Option<SourceRange> {
        let first = self.tokens.first()?;
        let last = self.tokens.last()?;
        Some(SourceRange::new(first.loc, last.loc))
    }
}

/// One macro invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionNode {
    /// The definition this invocation expands
    pub def: MacroDefId,
    /// Name of the expanded macro
    pub name: String,
    /// The source range the programmer wrote. For a nested invocation this
    /// lies inside the parent macro's definition.
    pub spelling_range: SourceRange,
    /// 0 for top-level, +1 per nesting level
    pub depth: u32,
    pub parent: Option<ExpansionId>,
    pub children: Vec<ExpansionId>,
    pub arguments: Vec<ExpansionArgument>,
    /// AST nodes whose spelling range equals this expansion's
    pub ast_roots: Vec<AstRoot>,
    /// The unique aligned root, when exactly one exists
    pub aligned_root: Option<AstRoot>,
    pub has_stringification: bool,
    pub has_token_paste: bool,
    /// Whether this invocation was written inside an enclosing invocation's
    /// argument list
    pub in_macro_arg: bool,
    /// Cleared when construction of this node was aborted; invalid nodes are
    /// skipped by evaluation
    pub valid: bool,
}

/// Forest of completed expansions plus the stack of in-flight ones
#[derive(Debug, Default)]
pub struct ExpansionForest {
    nodes: Vec<ExpansionNode>,
    stack: Vec<ExpansionId>,
    roots: Vec<ExpansionId>,
}

impl ExpansionForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an expansion. The new node becomes a child of the expansion
    /// currently on top of the stack, or a new root when the stack is empty.
    pub fn begin_expansion(
        &mut self,
        table: &MacroTable,
        def: MacroDefId,
        spelling_range: SourceRange,
        args: Vec<Vec<Token>>,
    ) -> Option<ExpansionId> {
        let Some(definition) = table.get(def) else {
            warn!(def = def.0, "expansion of unknown macro definition dropped");
            return None;
        };

        let id = ExpansionId(self.nodes.len() as u32);
        let parent = self.stack.last().copied();
        let in_arg_of = |node: &ExpansionNode| {
            node.arguments.iter().any(|a| {
                a.token_span()
                    .is_some_and(|span| span.contains(spelling_range.begin))
            })
        };
        let (depth, in_macro_arg) = match parent {
            Some(pid) => {
                let p = self.node(pid);
                (p.depth + 1, p.in_macro_arg || in_arg_of(p))
            }
            // Argument pre-expansions can arrive after their enclosing
            // invocation has already closed; they show up as new top-level
            // expansions spelled inside the previous root's argument tokens.
            None => (
                0,
                self.roots
                    .last()
                    .is_some_and(|rid| in_arg_of(self.node(*rid))),
            ),
        };

        self.nodes.push(ExpansionNode {
            def,
            name: definition.name.clone(),
            spelling_range,
            depth,
            parent,
            children: Vec::new(),
            arguments: args
                .into_iter()
                .map(|tokens| ExpansionArgument {
                    tokens,
                    expected_expansions: 0,
                    aligned_roots: Vec::new(),
                })
                .collect(),
            ast_roots: Vec::new(),
            aligned_root: None,
            has_stringification: false,
            has_token_paste: false,
            in_macro_arg,
            valid: true,
        });

        match parent {
            Some(pid) => self.nodes[pid.0 as usize].children.push(id),
            None => self.roots.push(id),
        }
        self.stack.push(id);
        Some(id)
    }

    /// Close the innermost open expansion of `def`, freezing its derived
    /// flags and per-argument expansion counts.
    ///
    /// A close that does not match the top of the stack aborts the nodes
    /// above the match (they stay in the forest, marked invalid); a close
    /// that matches nothing on the stack is dropped.
    pub fn end_expansion(&mut self, table: &MacroTable, def: MacroDefId) -> bool {
        let Some(pos) = self
            .stack
            .iter()
            .rposition(|id| self.node(*id).def == def)
        else {
            warn!(def = def.0, "orphan expansion close dropped");
            return false;
        };

        while self.stack.len() > pos + 1 {
            if let Some(abandoned) = self.stack.pop() {
                self.nodes[abandoned.0 as usize].valid = false;
                warn!(
                    name = %self.node(abandoned).name,
                    "expansion closed out of order, subtree abandoned"
                );
            }
        }

        if let Some(id) = self.stack.pop() {
            self.finalize(table, id);
        }
        true
    }

    /// Abort anything still open once the event stream ends
    pub fn finish(&mut self) {
        while let Some(id) = self.stack.pop() {
            self.nodes[id.0 as usize].valid = false;
            warn!(name = %self.node(id).name, "expansion never closed, marked invalid");
        }
    }

    fn finalize(&mut self, table: &MacroTable, id: ExpansionId) {
        let Some(def) = table.get(self.node(id).def) else {
            return;
        };
        let has_string = has_stringification(&def.tokens);
        let has_paste = has_token_paste(&def.tokens);
        let counts: Vec<usize> = def
            .parameters
            .iter()
            .map(|p| count_identifier_uses(&def.tokens, p))
            .collect();

        let node = &mut self.nodes[id.0 as usize];
        node.has_stringification = has_string;
        node.has_token_paste = has_paste;
        for (i, arg) in node.arguments.iter_mut().enumerate() {
            arg.expected_expansions = counts.get(i).copied().unwrap_or(0);
        }
    }

    pub fn node(&self, id: ExpansionId) -> &ExpansionNode {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: ExpansionId) -> &mut ExpansionNode {
        &mut self.nodes[id.0 as usize]
    }

    /// All node ids in the order their expansions began (source order)
    pub fn ids(&self) -> impl Iterator<Item = ExpansionId> {
        (0..self.nodes.len() as u32).map(ExpansionId)
    }

    /// Top-level expansions, in source order
    pub fn roots(&self) -> &[ExpansionId] {
        &self.roots
    }

    /// Depth-first descendants of a node, the node itself excluded
    pub fn descendants(&self, id: ExpansionId) -> Vec<ExpansionId> {
        let mut out = Vec::new();
        let mut stack: Vec<ExpansionId> =
            self.node(id).children.iter().rev().copied().collect();
        while let Some(cur) = stack.pop() {
            out.push(cur);
            stack.extend(self.node(cur).children.iter().rev().copied());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MacroDefinition;
    use macrosight_core::{SourceLocation, Token};

    fn loc(n: u32) -> SourceLocation {
        SourceLocation(n)
    }

    fn range(a: u32, b: u32) -> SourceRange {
        SourceRange::new(loc(a), loc(b))
    }

    fn table() -> (MacroTable, MacroDefId, MacroDefId) {
        let mut t = MacroTable::new();
        // #define SQUARE(x) ((x)*(x))
        let square = t.push(MacroDefinition {
            name: "SQUARE".into(),
            object_like: false,
            parameters: vec!["x".into()],
            definition_loc: loc(100),
            definition_range: range(100, 120),
            tokens: vec![
                Token::punct("(", loc(110)),
                Token::punct("(", loc(111)),
                Token::ident("x", loc(112)),
                Token::punct(")", loc(113)),
                Token::punct("*", loc(114)),
                Token::punct("(", loc(115)),
                Token::ident("x", loc(116)),
                Token::punct(")", loc(117)),
                Token::punct(")", loc(118)),
            ],
        });
        // #define ONE 1
        let one = t.push(MacroDefinition {
            name: "ONE".into(),
            object_like: true,
            parameters: vec![],
            definition_loc: loc(130),
            definition_range: range(130, 135),
            tokens: vec![Token::literal("1", loc(134))],
        });
        (t, square, one)
    }

    #[test]
    fn test_top_level_and_nested_structure() {
        let (t, square, one) = table();
        let mut f = ExpansionForest::new();

        let outer = f
            .begin_expansion(&t, square, range(10, 22), vec![vec![Token::ident("ONE", loc(17))]])
            .unwrap();
        let inner = f.begin_expansion(&t, one, range(17, 17), vec![]).unwrap();
        assert!(f.end_expansion(&t, one));
        assert!(f.end_expansion(&t, square));

        assert_eq!(f.node(outer).depth, 0);
        assert!(f.node(outer).parent.is_none());
        assert_eq!(f.node(inner).depth, 1);
        assert_eq!(f.node(inner).parent, Some(outer));
        assert_eq!(f.node(outer).children, vec![inner]);
        assert_eq!(f.roots(), &[outer]);
        assert_eq!(f.descendants(outer), vec![inner]);
        assert!(f.descendants(inner).is_empty());
    }

    #[test]
    fn test_in_macro_arg_inheritance() {
        let (t, square, one) = table();
        let mut f = ExpansionForest::new();

        // SQUARE(ONE): the inner invocation is written inside the argument
        let outer = f
            .begin_expansion(&t, square, range(10, 22), vec![vec![Token::ident("ONE", loc(17))]])
            .unwrap();
        let inner = f.begin_expansion(&t, one, range(17, 17), vec![]).unwrap();
        f.end_expansion(&t, one);
        f.end_expansion(&t, square);

        assert!(!f.node(outer).in_macro_arg);
        assert!(f.node(inner).in_macro_arg);
    }

    #[test]
    fn test_finalize_counts_and_flags() {
        let (t, square, _) = table();
        let mut f = ExpansionForest::new();
        let id = f
            .begin_expansion(
                &t,
                square,
                range(10, 22),
                vec![vec![Token::ident("i", loc(17)), Token::punct("+", loc(19)), Token::literal("1", loc(21))]],
            )
            .unwrap();
        f.end_expansion(&t, square);

        let node = f.node(id);
        assert_eq!(node.arguments.len(), 1);
        assert_eq!(node.arguments[0].expected_expansions, 2);
        assert!(!node.has_stringification);
        assert!(!node.has_token_paste);
        assert_eq!(
            node.arguments[0].token_span(),
            Some(range(17, 21))
        );
    }

    #[test]
    fn test_stringification_flag() {
        let mut t = MacroTable::new();
        let def = t.push(MacroDefinition {
            name: "STR".into(),
            object_like: false,
            parameters: vec!["x".into()],
            definition_loc: loc(100),
            definition_range: range(100, 110),
            tokens: vec![Token::punct("#", loc(105)), Token::ident("x", loc(106))],
        });
        let mut f = ExpansionForest::new();
        let id = f
            .begin_expansion(&t, def, range(10, 15), vec![vec![Token::ident("y", loc(14))]])
            .unwrap();
        f.end_expansion(&t, def);
        assert!(f.node(id).has_stringification);
        assert!(!f.node(id).has_token_paste);
    }

    #[test]
    fn test_argument_pre_expansion_after_parent_closed() {
        let (t, square, one) = table();
        let mut f = ExpansionForest::new();

        // SQUARE(ONE) where ONE's expansion is reported after SQUARE closed
        let outer = f
            .begin_expansion(&t, square, range(10, 22), vec![vec![Token::ident("ONE", loc(17))]])
            .unwrap();
        f.end_expansion(&t, square);
        let late = f.begin_expansion(&t, one, range(17, 19), vec![]).unwrap();
        f.end_expansion(&t, one);

        assert_eq!(f.node(late).depth, 0);
        assert!(f.node(late).in_macro_arg);
        assert!(!f.node(outer).in_macro_arg);
        assert_eq!(f.roots().len(), 2);
    }

    #[test]
    fn test_out_of_order_close_aborts_subtree() {
        let (t, square, one) = table();
        let mut f = ExpansionForest::new();

        let outer = f.begin_expansion(&t, square, range(10, 22), vec![vec![]]).unwrap();
        let inner = f.begin_expansion(&t, one, range(17, 17), vec![]).unwrap();
        // Close the outer macro while the inner one is still open
        assert!(f.end_expansion(&t, square));
        assert!(!f.node(inner).valid);
        assert!(f.node(outer).valid);
        // Orphan close is dropped
        assert!(!f.end_expansion(&t, one));
    }

    #[test]
    fn test_finish_invalidates_unclosed() {
        let (t, square, _) = table();
        let mut f = ExpansionForest::new();
        let id = f.begin_expansion(&t, square, range(10, 22), vec![vec![]]).unwrap();
        f.finish();
        assert!(!f.node(id).valid);
    }
}
