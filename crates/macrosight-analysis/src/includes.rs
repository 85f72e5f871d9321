//! Global-include audit
//!
//! Classifies every include directive as global or local. A directive is
//! local when the included file cannot be identified, when the including
//! file was itself pulled in at local scope, or when the `#` sits inside a
//! collected declaration range. Local verdicts feed forward: files included
//! locally taint directives written inside them.

use crate::record::OutputRecord;
use macrosight_ast::Ast;
use macrosight_core::{SourceMap, SourceRange};
use macrosight_expand::IncludeDirective;
use std::collections::HashSet;

pub(crate) fn audit_includes(
    includes: &[IncludeDirective],
    ast: &Ast,
    sm: &SourceMap,
) -> Vec<OutputRecord> {
    // File-level extents of every declaration
    let decl_ranges: Vec<SourceRange> = ast
        .decl_ids()
        .map(|d| {
            let r = ast.decl(d).range;
            SourceRange::new(sm.file_loc(r.begin), sm.file_loc(r.end))
        })
        .filter(SourceRange::is_valid)
        .collect();

    let mut local_includes: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for directive in includes {
        let (global, filename) = classify(directive, &decl_ranges, sm, &local_includes);
        if !global {
            local_includes.insert(filename.clone());
        }
        out.push(OutputRecord::Include { global, filename });
    }

    out
}

fn classify(
    directive: &IncludeDirective,
    decl_ranges: &[SourceRange],
    sm: &SourceMap,
    local_includes: &HashSet<String>,
) -> (bool, String) {
    let Some(file) = &directive.file else {
        return (false, "<null>".to_string());
    };
    let included = file.real_path.clone();
    if included.is_empty() {
        return (false, included);
    }
    if directive.hash_loc.is_invalid() {
        return (false, included);
    }

    // Identify the file the directive was written in
    let hash_floc = sm.file_loc(directive.hash_loc);
    let Some(idx) = sm.file_index(hash_floc) else {
        return (false, included);
    };
    let including = &sm.files()[idx];
    let Some(entry) = &including.entry else {
        return (false, included);
    };
    if entry.real_path.is_empty() {
        return (false, included);
    }

    // A file included at local scope taints everything it includes
    if local_includes.contains(&entry.real_path) {
        return (false, included);
    }

    // The directive must not sit inside any declaration
    if decl_ranges.iter().any(|r| r.contains(hash_floc)) {
        return (false, included);
    }

    (true, included)
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrosight_ast::decl::{Decl, DeclKind, DeclScope, StorageClass};
    use macrosight_ast::AstBuilder;
    use macrosight_core::{SourceLocation, SourceMap};
    use macrosight_expand::IncludedFile;

    fn loc(n: u32) -> SourceLocation {
        SourceLocation(n)
    }

    fn setup() -> (Ast, SourceMap) {
        let mut b = AstBuilder::new();
        let int = b.builtin(macrosight_ast::BuiltinType::Int);
        // A declaration spanning offsets 40..60
        b.push_decl(Decl {
            kind: DeclKind::Var {
                name: "table".into(),
                ty: int,
                storage: StorageClass::Static,
                init: None,
            },
            range: SourceRange::new(loc(40), loc(60)),
            name_loc: loc(45),
            scope: DeclScope::File,
        });
        let mut sm = SourceMap::new();
        sm.add_file("main.c", Some("/src/main.c".into()), 100, vec![0]);
        sm.add_file("inner.h", Some("/src/inner.h".into()), 50, vec![0]);
        (b.finish(), sm)
    }

    fn dir(at: u32, path: &str) -> IncludeDirective {
        IncludeDirective {
            hash_loc: loc(at),
            file: Some(IncludedFile {
                name: path.to_string(),
                real_path: path.to_string(),
            }),
        }
    }

    #[test]
    fn test_global_include() {
        let (ast, sm) = setup();
        let records = audit_includes(&[dir(5, "/usr/include/stdio.h")], &ast, &sm);
        assert_eq!(
            records,
            vec![OutputRecord::Include {
                global: true,
                filename: "/usr/include/stdio.h".to_string()
            }]
        );
    }

    #[test]
    fn test_include_inside_declaration_is_local() {
        let (ast, sm) = setup();
        let records = audit_includes(&[dir(50, "/src/table.h")], &ast, &sm);
        assert_eq!(
            records,
            vec![OutputRecord::Include {
                global: false,
                filename: "/src/table.h".to_string()
            }]
        );
    }

    #[test]
    fn test_local_taint_propagates() {
        let (ast, sm) = setup();
        // inner.h is included inside a declaration, so an include written
        // inside inner.h (offsets 101..150) is local too
        let records = audit_includes(
            &[dir(50, "/src/inner.h"), dir(110, "/src/deep.h")],
            &ast,
            &sm,
        );
        assert_eq!(
            records,
            vec![
                OutputRecord::Include {
                    global: false,
                    filename: "/src/inner.h".to_string()
                },
                OutputRecord::Include {
                    global: false,
                    filename: "/src/deep.h".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_missing_file_is_null() {
        let (ast, sm) = setup();
        let records = audit_includes(
            &[IncludeDirective {
                hash_loc: loc(5),
                file: None,
            }],
            &ast,
            &sm,
        );
        assert_eq!(
            records,
            vec![OutputRecord::Include {
                global: false,
                filename: "<null>".to_string()
            }]
        );
    }
}
