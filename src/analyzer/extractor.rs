//! Import extraction from JS/TS syntax trees.
//!
//! Recognizes five constructs:
//! - Static imports: `import { foo } from './bar'`, default, namespace and
//!   side-effect forms
//! - Dynamic imports: `import('./module')`
//! - CommonJS require calls: `const x = require('./mod')`, destructured forms
//! - Re-exports: `export { a } from './mod'`, `export * from './mod'`
//!
//! Anything else is recursed into; emission order follows source position.

use thiserror::Error;
use tree_sitter::{Language, Node, Parser};

use crate::types::{ImportKind, ImportRecord};

/// The four grammar dialects the extractor understands, keyed by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceDialect {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
}

impl SourceDialect {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ts" | "mts" | "cts" => Some(SourceDialect::TypeScript),
            "tsx" => Some(SourceDialect::Tsx),
            "js" | "mjs" | "cjs" => Some(SourceDialect::JavaScript),
            "jsx" => Some(SourceDialect::Jsx),
            _ => None,
        }
    }

    fn grammar(&self) -> Language {
        match self {
            SourceDialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceDialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            // The JavaScript grammar already covers JSX syntax.
            SourceDialect::JavaScript | SourceDialect::Jsx => {
                tree_sitter_javascript::LANGUAGE.into()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: .{0}")]
    UnsupportedFileType(String),
    #[error("grammar rejected by parser: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("parser produced no syntax tree")]
    ParseFailed,
}

/// Extract import records from `content`, picking the dialect by extension
/// (lowercased). Fails for extensions outside the four-dialect matrix.
pub fn extract_from_source(content: &str, ext: &str) -> Result<Vec<ImportRecord>, ExtractError> {
    let ext = ext.to_lowercase();
    let dialect = SourceDialect::from_extension(&ext)
        .ok_or_else(|| ExtractError::UnsupportedFileType(ext.clone()))?;
    extract_imports(content, dialect)
}

/// Extract import records from `content` with an explicit dialect.
pub fn extract_imports(
    content: &str,
    dialect: SourceDialect,
) -> Result<Vec<ImportRecord>, ExtractError> {
    let mut parser = Parser::new();
    parser.set_language(&dialect.grammar())?;
    let tree = parser
        .parse(content, None)
        .ok_or(ExtractError::ParseFailed)?;

    let mut records = Vec::new();
    collect(tree.root_node(), content.as_bytes(), &mut records);
    Ok(records)
}

fn collect(node: Node, src: &[u8], out: &mut Vec<ImportRecord>) {
    match node.kind() {
        "import_statement" => {
            handle_import_statement(node, src, out);
            return;
        }
        "export_statement" => {
            // Only re-exports carry a source; a plain export may still wrap
            // a declaration containing require calls, so recurse otherwise.
            if node.child_by_field_name("source").is_some() {
                handle_reexport_statement(node, src, out);
                return;
            }
        }
        "call_expression" => {
            handle_call_expression(node, src, out);
        }
        _ => {}
    }

    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            collect(child, src, out);
        }
    }
}

fn handle_import_statement(node: Node, src: &[u8], out: &mut Vec<ImportRecord>) {
    let Some(source) = node
        .child_by_field_name("source")
        .and_then(|n| string_literal(n, src))
    else {
        return;
    };
    if source.is_empty() {
        return;
    }

    let mut record = ImportRecord::new(source, ImportKind::StaticEsm, line_of(node));

    for i in 0..node.named_child_count() {
        let Some(child) = node.named_child(i) else {
            continue;
        };
        if child.kind() != "import_clause" {
            continue;
        }
        for j in 0..child.named_child_count() {
            let Some(spec) = child.named_child(j) else {
                continue;
            };
            match spec.kind() {
                // Bare default import identifier.
                "identifier" => {
                    if let Some(name) = node_text(spec, src) {
                        record.specifiers.push(name);
                    }
                }
                "named_imports" => collect_named_imports(spec, src, &mut record.specifiers),
                "namespace_import" => {
                    if let Some(name) = first_identifier_text(spec, src) {
                        record.specifiers.push(format!("* as {}", name));
                    }
                }
                _ => {}
            }
        }
    }

    out.push(record);
}

fn collect_named_imports(node: Node, src: &[u8], specifiers: &mut Vec<String>) {
    for i in 0..node.named_child_count() {
        let Some(spec) = node.named_child(i) else {
            continue;
        };
        if spec.kind() != "import_specifier" {
            continue;
        }
        let text = spec
            .child_by_field_name("alias")
            .and_then(|n| node_text(n, src))
            .or_else(|| {
                spec.child_by_field_name("name")
                    .and_then(|n| node_text(n, src))
            })
            .or_else(|| first_identifier_text(spec, src));
        if let Some(text) = text {
            specifiers.push(text);
        }
    }
}

fn handle_reexport_statement(node: Node, src: &[u8], out: &mut Vec<ImportRecord>) {
    let Some(source) = node
        .child_by_field_name("source")
        .and_then(|n| string_literal(n, src))
    else {
        return;
    };
    if source.is_empty() {
        return;
    }

    let mut record = ImportRecord::new(source, ImportKind::Reexport, line_of(node));

    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else {
            continue;
        };
        match child.kind() {
            "*" => record.specifiers.push("*".to_string()),
            "export_clause" => {
                for j in 0..child.named_child_count() {
                    let Some(spec) = child.named_child(j) else {
                        continue;
                    };
                    if spec.kind() != "export_specifier" {
                        continue;
                    }
                    let text = spec
                        .child_by_field_name("name")
                        .and_then(|n| node_text(n, src))
                        .or_else(|| first_identifier_text(spec, src));
                    if let Some(text) = text {
                        record.specifiers.push(text);
                    }
                }
            }
            _ => {}
        }
    }

    out.push(record);
}

fn handle_call_expression(node: Node, src: &[u8], out: &mut Vec<ImportRecord>) {
    let Some(callee) = node.child_by_field_name("function") else {
        return;
    };

    match callee.kind() {
        // Dynamic import: `import('./module')`. Non-literal arguments are
        // unresolvable and skipped.
        "import" => {
            if let Some(source) = first_string_argument(node, src)
                && !source.is_empty()
            {
                out.push(ImportRecord::new(
                    source,
                    ImportKind::DynamicEsm,
                    line_of(node),
                ));
            }
        }
        "identifier" => {
            if node_text(callee, src).as_deref() != Some("require") {
                return;
            }
            let Some(source) = first_string_argument(node, src) else {
                return;
            };
            if source.is_empty() {
                return;
            }
            let mut record = ImportRecord::new(source, ImportKind::CommonJsRequire, line_of(node));
            collect_require_bindings(node, src, &mut record.specifiers);
            out.push(record);
        }
        _ => {}
    }
}

/// Binding names introduced by the declarator enclosing a require call:
/// `const NAME = require(..)` and `const { a, b: c } = require(..)`.
/// A standalone `require(..)` statement introduces none.
fn collect_require_bindings(call: Node, src: &[u8], specifiers: &mut Vec<String>) {
    let Some(parent) = call.parent() else {
        return;
    };
    if parent.kind() != "variable_declarator" {
        return;
    }
    let Some(name) = parent.child_by_field_name("name") else {
        return;
    };
    match name.kind() {
        "identifier" => {
            if let Some(text) = node_text(name, src) {
                specifiers.push(text);
            }
        }
        "object_pattern" => {
            for i in 0..name.named_child_count() {
                let Some(prop) = name.named_child(i) else {
                    continue;
                };
                match prop.kind() {
                    "shorthand_property_identifier_pattern" => {
                        if let Some(text) = node_text(prop, src) {
                            specifiers.push(text);
                        }
                    }
                    // `{ original: renamed }` binds the renamed target.
                    "pair_pattern" => {
                        if let Some(text) = prop
                            .child_by_field_name("value")
                            .and_then(|n| node_text(n, src))
                        {
                            specifiers.push(text);
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn first_string_argument(call: Node, src: &[u8]) -> Option<String> {
    let args = call.child_by_field_name("arguments")?;
    let first = args.named_child(0)?;
    string_literal(first, src)
}

/// Unquote a string literal node. Template literals with interpolations are
/// non-resolvable and yield `None`.
fn string_literal(node: Node, src: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => node_text(node, src).map(|t| strip_quotes(&t)),
        "template_string" => {
            for i in 0..node.named_child_count() {
                if let Some(child) = node.named_child(i)
                    && child.kind() == "template_substitution"
                {
                    return None;
                }
            }
            node_text(node, src).map(|t| strip_quotes(&t))
        }
        _ => None,
    }
}

fn strip_quotes(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && matches!(first, b'"' | b'\'' | b'`') {
            return raw[1..raw.len() - 1].to_string();
        }
    }
    raw.to_string()
}

fn node_text(node: Node, src: &[u8]) -> Option<String> {
    node.utf8_text(src).ok().map(|t| t.to_string())
}

fn first_identifier_text(node: Node, src: &[u8]) -> Option<String> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i)
            && child.kind() == "identifier"
        {
            return node_text(child, src);
        }
    }
    None
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImportKind;

    fn extract(content: &str) -> Vec<ImportRecord> {
        extract_imports(content, SourceDialect::TypeScript).expect("extraction")
    }

    #[test]
    fn static_import_forms() {
        let records = extract(
            r#"
import Default from './a';
import { one, two as renamed } from './b';
import * as ns from './c';
import './side-effect.css';
"#,
        );

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].source, "./a");
        assert_eq!(records[0].kind, ImportKind::StaticEsm);
        assert_eq!(records[0].specifiers, vec!["Default"]);
        assert_eq!(records[0].line, 2);

        assert_eq!(records[1].specifiers, vec!["one", "renamed"]);
        assert_eq!(records[2].specifiers, vec!["* as ns"]);
        assert_eq!(records[3].source, "./side-effect.css");
        assert!(records[3].specifiers.is_empty());
    }

    #[test]
    fn default_and_named_combined() {
        let records = extract("import App, { helper } from './app';");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].specifiers, vec!["App", "helper"]);
    }

    #[test]
    fn dynamic_import_string_literal() {
        let records = extract("const mod = await import('./lazy');");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, ImportKind::DynamicEsm);
        assert_eq!(records[0].source, "./lazy");
        assert!(records[0].specifiers.is_empty());
    }

    #[test]
    fn dynamic_import_plain_template_accepted() {
        let records = extract("import(`./widgets`);");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "./widgets");
    }

    #[test]
    fn dynamic_import_interpolated_template_skipped() {
        let records = extract("import(`./widgets/${name}`);");
        assert!(records.is_empty());
    }

    #[test]
    fn dynamic_import_computed_argument_skipped() {
        let records = extract("import(modulePath);");
        assert!(records.is_empty());
    }

    #[test]
    fn require_with_identifier_binding() {
        let records = extract("const fs = require('./fs-shim');");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, ImportKind::CommonJsRequire);
        assert_eq!(records[0].specifiers, vec!["fs"]);
    }

    #[test]
    fn require_with_destructured_bindings() {
        let records = extract("const { a, b: c, d } = require('./utils');");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].specifiers, vec!["a", "c", "d"]);
    }

    #[test]
    fn standalone_require_has_no_bindings() {
        let records = extract("require('./register');");
        assert_eq!(records.len(), 1);
        assert!(records[0].specifiers.is_empty());
    }

    #[test]
    fn require_with_computed_argument_skipped() {
        let records = extract("const x = require(name);");
        assert!(records.is_empty());
    }

    #[test]
    fn reexport_named_and_star() {
        let records = extract(
            r#"
export { foo, bar } from './module';
export * from './other';
"#,
        );

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, ImportKind::Reexport);
        assert_eq!(records[0].specifiers, vec!["foo", "bar"]);
        assert_eq!(records[1].specifiers, vec!["*"]);
    }

    #[test]
    fn plain_export_is_not_a_record() {
        let records = extract("export const value = 1;");
        assert!(records.is_empty());
    }

    #[test]
    fn duplicate_statements_produce_duplicate_records() {
        let records = extract("import './a';\nimport './a';\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, records[1].source);
        assert_eq!(records[0].line, 1);
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn emission_follows_source_order() {
        let records = extract(
            r#"import './first';
const lazy = () => import('./second');
export * from './third';
"#,
        );
        let sources: Vec<_> = records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["./first", "./second", "./third"]);
    }

    #[test]
    fn tsx_component_syntax_parses() {
        let records = extract_imports(
            r#"
import { Button } from './button';
export const App = () => <Button label="go" />;
"#,
            SourceDialect::Tsx,
        )
        .expect("tsx extraction");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "./button");
    }

    #[test]
    fn jsx_component_syntax_parses() {
        let records = extract_imports(
            "import { Panel } from './panel';\nconst el = <Panel />;\n",
            SourceDialect::Jsx,
        )
        .expect("jsx extraction");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn require_inside_conditional_branch_still_counts() {
        let records = extract(
            r#"
if (process.env.LEGACY) {
    const legacy = require('./legacy');
}
"#,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].specifiers, vec!["legacy"]);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = extract_from_source("select 1;", "sql").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFileType(_)));
        assert!(err.to_string().contains("unsupported file type"));
    }

    #[test]
    fn extension_mapping_covers_the_matrix() {
        assert_eq!(
            SourceDialect::from_extension("mts"),
            Some(SourceDialect::TypeScript)
        );
        assert_eq!(
            SourceDialect::from_extension("cjs"),
            Some(SourceDialect::JavaScript)
        );
        assert_eq!(SourceDialect::from_extension("tsx"), Some(SourceDialect::Tsx));
        assert_eq!(SourceDialect::from_extension("jsx"), Some(SourceDialect::Jsx));
        assert_eq!(SourceDialect::from_extension("rs"), None);
    }
}
