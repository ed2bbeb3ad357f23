//! Syntactic extraction: file contents -> a classified `ParseResult`.
//!
//! Grounded in the teacher's tree-sitter visitor (`py_imports.rs`), but
//! reworked for this domain: the teacher records the *names bound into
//! scope* (useful for counting); this module records the *top-level module
//! a runtime would need to import*, which differs for `from X import Y`
//! (we want `X`, not `Y`) and ignores aliases entirely (`import X as A`
//! still needs `X` installed, not `A`).

use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::dsn::detect_driver_hint;
use crate::error::Warning;
use crate::types::{top_level_module, ParseResult};

/// A parser is not `Sync`; each parse-pool worker owns one.
pub fn create_parser() -> Parser {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .expect("bundled tree-sitter-python grammar is always loadable");
    parser
}

/// Reads, decodes, and parses one file, consulting neither the parse cache
/// nor the filesystem beyond a single read — caching is the caller's job
/// (the Parser is a pure function of file contents, per spec.md §4.2).
pub fn parse_path(parser: &mut Parser, path: &Path) -> (ParseResult, Vec<Warning>) {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(err) => {
            return (
                ParseResult::default(),
                vec![Warning::new(
                    crate::error::ErrorKind::FilesystemPermission,
                    path.display().to_string(),
                    err.to_string(),
                )],
            );
        }
    };
    let mut warnings = Vec::new();
    let source = decode_source(&bytes, path, &mut warnings);
    let Some(source) = source else { return (ParseResult::default(), warnings) };

    let source = if is_notebook(path) {
        match extract_notebook_source(&source) {
            Ok(joined) => joined,
            Err(err) => {
                warnings.push(Warning::new(
                    crate::error::ErrorKind::MalformedInput,
                    path.display().to_string(),
                    format!("invalid notebook JSON: {err}"),
                ));
                return (ParseResult::default(), warnings);
            }
        }
    } else {
        source
    };

    let (result, parse_warnings) = parse_source(parser, &source);
    warnings.extend(parse_warnings);
    (result, warnings)
}

fn is_notebook(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("ipynb")
}

fn decode_source(bytes: &[u8], path: &Path, warnings: &mut Vec<Warning>) -> Option<String> {
    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Some(s),
        Err(_) => {
            // retry as Latin-1: every byte maps to a Unicode scalar 1:1.
            let latin1: String = bytes.iter().map(|&b| b as char).collect();
            Some(latin1)
        }
    }
    .or_else(|| {
        warnings.push(Warning::new(
            crate::error::ErrorKind::MalformedInput,
            path.display().to_string(),
            "file is not valid UTF-8 or Latin-1",
        ));
        None
    })
}

/// Concatenates every code cell's source with blank-line separators so the
/// syntax tree visitor can walk notebooks the same way it walks `.py` files.
fn extract_notebook_source(contents: &str) -> Result<String, serde_json::Error> {
    #[derive(serde::Deserialize)]
    struct Notebook {
        cells: Vec<Cell>,
    }
    #[derive(serde::Deserialize)]
    struct Cell {
        cell_type: String,
        #[serde(default)]
        source: CellSource,
    }
    #[derive(serde::Deserialize, Default)]
    #[serde(untagged)]
    enum CellSource {
        #[default]
        Empty,
        Lines(Vec<String>),
        Joined(String),
    }

    let notebook: Notebook = serde_json::from_str(contents)?;
    let mut joined = String::new();
    for cell in notebook.cells {
        if cell.cell_type != "code" {
            continue;
        }
        match cell.source {
            CellSource::Lines(lines) => joined.push_str(&lines.concat()),
            CellSource::Joined(s) => joined.push_str(&s),
            CellSource::Empty => {}
        }
        joined.push_str("\n\n");
    }
    Ok(joined)
}

/// Pre-filter plus tree-sitter visitor over already-decoded source text.
fn parse_source(parser: &mut Parser, source: &str) -> (ParseResult, Vec<Warning>) {
    if !source.contains("import") {
        return (ParseResult::default(), Vec::new());
    }

    let Some(tree) = parser.parse(source, None) else {
        return (
            ParseResult::default(),
            vec![Warning::new(crate::error::ErrorKind::MalformedInput, "<source>", "tree-sitter failed to produce a tree")],
        );
    };

    let mut result = ParseResult::default();
    let mut warnings = Vec::new();
    visit(tree.root_node(), source, false, &mut result, &mut warnings);
    scan_for_dsn_hints(source, &mut result, &mut warnings);
    (result, warnings)
}

/// `in_type_checking` is the only context the visitor threads through the
/// recursion: per spec.md §9, both arms of a `try/except` contribute as
/// Runtime by default, so no separate try-context flag is needed.
fn visit(node: Node, source: &str, in_type_checking: bool, result: &mut ParseResult, warnings: &mut Vec<Warning>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_statement" => collect_import_statement(child, source, in_type_checking, result),
            "import_from_statement" => collect_import_from(child, source, in_type_checking, result),
            "if_statement" => {
                let child_in_type_checking = in_type_checking || is_type_checking_guard(child, source);
                visit_if_branches(child, source, child_in_type_checking, in_type_checking, result, warnings);
                continue;
            }
            "call" => {
                collect_dynamic_import(child, source, result);
                visit(child, source, in_type_checking, result, warnings);
            }
            _ => visit(child, source, in_type_checking, result, warnings),
        }
    }
}

/// An `if TYPE_CHECKING:` (or `if typing.TYPE_CHECKING:`) consequence block
/// is Typing context; the `elif`/`else` arms are not, since the negation of
/// "type-checking mode" is ordinary runtime.
fn visit_if_branches(
    if_node: Node,
    source: &str,
    consequence_in_type_checking: bool,
    ambient_in_type_checking: bool,
    result: &mut ParseResult,
    warnings: &mut Vec<Warning>,
) {
    if let Some(consequence) = if_node.child_by_field_name("consequence") {
        visit(consequence, source, consequence_in_type_checking, result, warnings);
    }
    let mut cursor = if_node.walk();
    for child in if_node.children(&mut cursor) {
        if child.kind() == "elif_clause" || child.kind() == "else_clause" {
            visit(child, source, ambient_in_type_checking, result, warnings);
        }
    }
}

fn is_type_checking_guard(if_node: Node, source: &str) -> bool {
    let Some(condition) = if_node.child_by_field_name("condition") else { return false };
    node_refers_to_type_checking(condition, source)
}

fn node_refers_to_type_checking(node: Node, source: &str) -> bool {
    match node.kind() {
        "identifier" => node.utf8_text(source.as_bytes()) == Ok("TYPE_CHECKING"),
        "attribute" => node
            .child_by_field_name("attribute")
            .and_then(|a| a.utf8_text(source.as_bytes()).ok())
            == Some("TYPE_CHECKING"),
        _ => false,
    }
}

fn collect_import_statement(node: Node, source: &str, in_type_checking: bool, result: &mut ParseResult) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let module = match child.kind() {
            "dotted_name" => child.utf8_text(source.as_bytes()).ok(),
            "aliased_import" => child
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(source.as_bytes()).ok()),
            _ => None,
        };
        if let Some(module) = module {
            insert_classified(result, top_level_module(module), in_type_checking);
        }
    }
}

fn collect_import_from(node: Node, source: &str, in_type_checking: bool, result: &mut ParseResult) {
    let Some(module_node) = node.child_by_field_name("module_name") else { return };
    if module_node.kind() == "relative_import" {
        // `from .local import x` — relative imports are never resolved.
        return;
    }
    let Ok(module) = module_node.utf8_text(source.as_bytes()) else { return };
    insert_classified(result, top_level_module(module), in_type_checking);
}

fn insert_classified(result: &mut ParseResult, module: &str, in_type_checking: bool) {
    if module.is_empty() {
        return;
    }
    if in_type_checking {
        result.typing.insert(module.to_string());
    } else {
        result.runtime.insert(module.to_string());
    }
}

const DYNAMIC_IMPORT_CALLEES: &[&str] = &["import_module", "__import__"];

/// Recognizes `import_module("x")`, `importlib.import_module("x")`, and
/// `__import__("x")` where the first positional argument is a string
/// literal.
fn collect_dynamic_import(call_node: Node, source: &str, result: &mut ParseResult) {
    let Some(function) = call_node.child_by_field_name("function") else { return };
    let is_dynamic_callee = match function.kind() {
        "identifier" => function
            .utf8_text(source.as_bytes())
            .map(|name| DYNAMIC_IMPORT_CALLEES.contains(&name))
            .unwrap_or(false),
        "attribute" => function
            .child_by_field_name("attribute")
            .and_then(|a| a.utf8_text(source.as_bytes()).ok())
            .map(|name| DYNAMIC_IMPORT_CALLEES.contains(&name))
            .unwrap_or(false),
        _ => false,
    };
    if !is_dynamic_callee {
        return;
    }
    let Some(args) = call_node.child_by_field_name("arguments") else { return };
    let mut cursor = args.walk();
    for arg in args.children(&mut cursor) {
        if arg.kind() == "string" {
            if let Some(literal) = string_literal_content(arg, source) {
                let module = top_level_module(&literal);
                if !module.is_empty() {
                    result.dynamic.insert(module.to_string());
                }
            }
            return;
        }
        if arg.kind() != "(" && arg.kind() != ")" {
            // first positional argument is not a string literal
            return;
        }
    }
}

fn string_literal_content(string_node: Node, source: &str) -> Option<String> {
    let mut cursor = string_node.walk();
    for child in string_node.children(&mut cursor) {
        if child.kind() == "string_content" {
            return child.utf8_text(source.as_bytes()).ok().map(str::to_string);
        }
    }
    None
}

/// String literals aren't walked individually by the import visitor (DSN
/// hints can appear anywhere, including far from any import statement), so
/// this runs a second, regex-based pass over the raw source text.
fn scan_for_dsn_hints(source: &str, result: &mut ParseResult, warnings: &mut Vec<Warning>) {
    for literal in extract_string_literals(source) {
        let (driver, warning) = detect_driver_hint(&literal);
        if let Some(driver) = driver {
            result.runtime.insert(driver);
        }
        if let Some(warning) = warning {
            warnings.push(warning);
        }
    }
}

/// A cheap, deliberately approximate string-literal scanner: it only needs
/// to find candidate substrings for the DSN regex, not produce a faithful
/// tokenization (the tree-sitter visitor already handles real semantics).
fn extract_string_literals(source: &str) -> Vec<String> {
    let mut literals = Vec::new();
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let quote = bytes[i];
        if quote == b'"' || quote == b'\'' {
            let start = i + 1;
            let mut j = start;
            while j < bytes.len() && bytes[j] != quote {
                if bytes[j] == b'\\' {
                    j += 1;
                }
                j += 1;
            }
            if j <= bytes.len() {
                literals.push(source[start..j.min(source.len())].to_string());
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }
    literals
}
