//! The insertion pipeline.
//!
//! `loader -> adapter -> classifier -> resolver -> (transform) -> message`.
//! Every call starts from the full text; nothing is cached between calls.

use serde::Serialize;

use crate::classify::{classify, CheckContext, Category, Classification, Selection};
use crate::config::Config;
use crate::dialect;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::message::{self, MessageInput};
use crate::resolve::{self, Placement};
use crate::syntax::{parse_unit, NodeId, NodeKind, SyntaxTree};
use crate::transform::{self, EditRegion, TransformResult};

/// One insertion request.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    pub text: &'a str,
    /// File extension selecting the dialect (`ts`, `.vue`, ...).
    pub extension: &'a str,
    pub selection: Selection,
    /// Shown in the message when file names are enabled.
    pub file_name: Option<&'a str>,
    /// Enclosing class name; derived from the tree when absent.
    pub class_name: Option<&'a str>,
    /// Enclosing function name; derived from the tree when absent.
    pub function_name: Option<&'a str>,
}

impl<'a> Request<'a> {
    pub fn new(text: &'a str, extension: &'a str, selection: Selection) -> Self {
        Self {
            text,
            extension,
            selection,
            file_name: None,
            class_name: None,
            function_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: &'a str) -> Self {
        self.file_name = Some(file_name);
        self
    }
}

/// How the document changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Edit {
    /// Insert `text` at byte `offset`.
    Insert { offset: usize, text: String },
    /// Replace a region with part of a rewritten document.
    Transform(TransformResult),
}

/// Result of [`insert_log`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// `None` when no checker matched and the default placement was used.
    pub category: Option<Category>,
    /// Line holding the new statement, in the edited document.
    pub insertion_line: usize,
    /// The log statement without indentation.
    pub statement: String,
    pub edit: Edit,
}

impl Resolution {
    /// Apply the edit to the text it was computed from.
    pub fn apply(&self, original: &str) -> String {
        match &self.edit {
            Edit::Insert { offset, text } => {
                let mut out = String::with_capacity(original.len() + text.len());
                out.push_str(&original[..*offset]);
                out.push_str(text);
                out.push_str(&original[*offset..]);
                out
            }
            Edit::Transform(result) => result.edit_region.apply(original, &result.new_text),
        }
    }

    pub fn transformed_text(&self) -> Option<&str> {
        match &self.edit {
            Edit::Transform(result) => Some(&result.new_text),
            Edit::Insert { .. } => None,
        }
    }

    pub fn edit_region(&self) -> Option<EditRegion> {
        match &self.edit {
            Edit::Transform(result) => Some(result.edit_region),
            Edit::Insert { .. } => None,
        }
    }
}

/// Category and line without building a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Located {
    pub category: Option<Category>,
    pub insertion_line: usize,
    /// The function body has to be rewritten before inserting.
    pub needs_transform: bool,
}

struct Analysis {
    doc: Document,
    tree: SyntaxTree,
    classification: Option<Classification>,
    placement: Placement,
}

fn analyze(text: &str, extension: &str, selection: &Selection) -> Result<Analysis> {
    if selection.value().is_empty() {
        return Err(Error::EmptySelection);
    }
    let doc = Document::new(text);
    if selection.line >= doc.line_count() {
        return Err(Error::SelectionOutOfRange {
            line: selection.line,
            line_count: doc.line_count(),
        });
    }

    let unit = dialect::load_at(text, extension, Some(selection.line))?;
    let tree = parse_unit(&unit, text).map_err(|e| e.at_selection(selection.line))?;

    let ctx = CheckContext::new(&tree, &doc, selection);
    let classification = classify(&ctx);
    let placement = match &classification {
        Some(c) => resolve::resolve(c.category, &c.result, &tree, &doc, selection),
        None => resolve::default_placement(&doc, selection),
    };
    tracing::debug!(
        category = classification.as_ref().map(|c| c.category.as_str()).unwrap_or("none"),
        placement = ?placement,
        "resolved insertion point"
    );

    Ok(Analysis {
        doc,
        tree,
        classification,
        placement,
    })
}

/// First line inside the block a rewrite will create for `owner`.
fn rewrite_line(tree: &SyntaxTree, owner: NodeId) -> usize {
    tree.child_by_field(owner, "body")
        .map(|body| tree.span(body).start_line + 1)
        .unwrap_or_else(|| tree.span(owner).end_line + 1)
}

/// Classify the selection and resolve its insertion line.
pub fn classify_only(text: &str, extension: &str, selection: &Selection) -> Result<Located> {
    let analysis = analyze(text, extension, selection)?;
    let category = analysis.classification.map(|c| c.category);
    Ok(match analysis.placement {
        Placement::Line { line, .. } => Located {
            category,
            insertion_line: line,
            needs_transform: false,
        },
        Placement::RewriteBody { owner } => Located {
            category,
            insertion_line: rewrite_line(&analysis.tree, owner),
            needs_transform: true,
        },
    })
}

/// Resolve where a log statement for the selection goes and build it.
pub fn insert_log(request: &Request, config: &Config) -> Result<Resolution> {
    let selection = &request.selection;
    let analysis = analyze(request.text, request.extension, selection)?;
    let tree = &analysis.tree;
    let doc = &analysis.doc;

    let category = analysis.classification.as_ref().map(|c| c.category);
    let value = analysis
        .classification
        .as_ref()
        .and_then(|c| c.result.meta("path"))
        .unwrap_or_else(|| selection.value())
        .to_string();

    let scope_node = analysis
        .classification
        .as_ref()
        .and_then(|c| c.result.node)
        .or_else(|| {
            selection
                .locate(doc)
                .and_then(|(start, end)| tree.smallest_containing(start, end))
        });
    let (derived_class, derived_function) = scope_node
        .map(|node| enclosing_scopes(tree, node))
        .unwrap_or((None, None));
    let class_name = request.class_name.map(str::to_string).or(derived_class);
    let function_name = request.function_name.map(str::to_string).or(derived_function);

    let statement_for = |line: usize| {
        message::build(
            config,
            &MessageInput {
                value: &value,
                file_name: request.file_name,
                line,
                class_name: class_name.as_deref(),
                function_name: function_name.as_deref(),
            },
        )
    };

    let (line, indent) = match analysis.placement {
        Placement::Line { line, indent } => (line, indent),
        Placement::RewriteBody { owner } => {
            let line = rewrite_line(tree, owner);
            let statement = statement_for(line);
            if let Some(result) = transform::rewrite_body(tree, doc, owner, &statement) {
                return Ok(Resolution {
                    category,
                    insertion_line: result.statement_line,
                    statement,
                    edit: Edit::Transform(result),
                });
            }
            (
                (selection.line + 1).min(doc.line_count()),
                doc.indentation(selection.line).to_string(),
            )
        }
    };

    let blank_before = usize::from(config.insert_empty_line_before);
    let statement = statement_for(line + blank_before);
    let (offset, text) = insertion_text(doc, line, &indent, &statement, config);

    Ok(Resolution {
        category,
        insertion_line: line + blank_before,
        statement,
        edit: Edit::Insert { offset, text },
    })
}

/// Byte offset and text inserting `statement` as a new line before `line`.
fn insertion_text(
    doc: &Document,
    line: usize,
    indent: &str,
    statement: &str,
    config: &Config,
) -> (usize, String) {
    let mut text = String::new();
    if config.insert_empty_line_before {
        text.push('\n');
    }
    text.push_str(indent);
    text.push_str(statement);
    text.push('\n');
    if config.insert_empty_line_after {
        text.push('\n');
    }

    if line < doc.line_count() {
        return (doc.line_start(line), text);
    }
    // Past the last line of a document without a trailing newline.
    let mut appended = String::from("\n");
    appended.push_str(text.trim_end_matches('\n'));
    (doc.text().len(), appended)
}

/// Names of the class and function enclosing `node` (inclusive).
pub fn enclosing_scopes(tree: &SyntaxTree, node: NodeId) -> (Option<String>, Option<String>) {
    let chain: Vec<NodeId> = std::iter::once(node).chain(tree.ancestors(node)).collect();

    let function = chain
        .iter()
        .filter(|n| tree.kind(**n).is_function())
        .find_map(|f| function_name(tree, *f));
    let class = chain
        .iter()
        .filter(|n| matches!(tree.kind(**n), NodeKind::ClassDeclaration | NodeKind::ClassExpression))
        .find_map(|c| tree.child_by_field(*c, "name"))
        .map(|name| tree.text(name).to_string());

    (class, function)
}

fn function_name(tree: &SyntaxTree, function: NodeId) -> Option<String> {
    if let Some(name) = tree.child_by_field(function, "name") {
        return Some(tree.text(name).to_string());
    }
    let parent = tree.parent(function)?;
    let named = match tree.kind(parent) {
        NodeKind::VariableDeclarator | NodeKind::FieldDefinition => {
            tree.child_by_field(parent, "name").or_else(|| tree.child_by_field(parent, "property"))
        }
        NodeKind::Pair => tree.child_by_field(parent, "key"),
        NodeKind::AssignmentExpression => tree.child_by_field(parent, "left"),
        _ => None,
    }?;
    Some(tree.text(named).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str, line: usize, value: &str) -> Resolution {
        let req = Request::new(text, "ts", Selection::new(line, value));
        insert_log(&req, &Config::default()).expect("should resolve")
    }

    #[test]
    fn test_insert_after_declaration_with_indent() {
        let text = "class Cart {\n  total(items) {\n    const sum = items.length;\n    return sum;\n  }\n}\n";
        let resolution = request(text, 2, "sum");
        assert_eq!(resolution.insertion_line, 3);
        assert_eq!(
            resolution.statement,
            "console.log(\"🚀 ~ Cart ~ total ~ line: 4 ~ sum:\", sum);"
        );
        let edited = resolution.apply(text);
        let lines: Vec<&str> = edited.lines().collect();
        assert_eq!(lines[3], format!("    {}", resolution.statement));
        assert_eq!(lines[4], "    return sum;");
    }

    #[test]
    fn test_explicit_scopes_override_derived() {
        let text = "function outer() {\n  const a = 1;\n}\n";
        let mut req = Request::new(text, "js", Selection::new(1, "a"));
        req.function_name = Some("custom");
        let resolution = insert_log(&req, &Config::default()).unwrap();
        assert!(resolution.statement.contains("~ custom ~"), "{}", resolution.statement);
    }

    #[test]
    fn test_blank_lines_around_statement() {
        let config = Config {
            insert_empty_line_before: true,
            insert_empty_line_after: true,
            ..Config::default()
        };
        let text = "const a = 1;\nnext();\n";
        let req = Request::new(text, "js", Selection::new(0, "a"));
        let resolution = insert_log(&req, &config).unwrap();
        assert_eq!(resolution.insertion_line, 2);
        let edited = resolution.apply(text);
        let lines: Vec<&str> = edited.lines().collect();
        assert_eq!(lines[1], "");
        assert!(lines[2].starts_with("console.log("));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "next();");
    }

    #[test]
    fn test_append_without_trailing_newline() {
        let text = "const a = 1;";
        let resolution = request(text, 0, "a");
        let edited = resolution.apply(text);
        assert_eq!(edited, format!("const a = 1;\n{}", resolution.statement));
    }

    #[test]
    fn test_nested_key_logs_full_path() {
        let text = "const cfg = {\n  db: {\n    host: 'x',\n  },\n};\n";
        let resolution = request(text, 2, "host");
        assert_eq!(resolution.category, Some(Category::PropertyAccessAssignment));
        assert!(resolution.statement.ends_with(", cfg.db.host);"), "{}", resolution.statement);
        assert_eq!(resolution.insertion_line, 5);
    }

    #[test]
    fn test_selection_validation() {
        let req = Request::new("a;\n", "js", Selection::new(5, "a"));
        assert!(matches!(
            insert_log(&req, &Config::default()),
            Err(Error::SelectionOutOfRange { line: 5, .. })
        ));
        let req = Request::new("a;\n", "js", Selection::new(0, "  "));
        assert_eq!(insert_log(&req, &Config::default()), Err(Error::EmptySelection));
    }

    #[test]
    fn test_loop_variable_stays_in_scope() {
        let text = "for (let i = 0; i < 3; i++) {\n  run(i);\n}\n";
        let resolution = request(text, 0, "i");
        assert_eq!(resolution.insertion_line, 1);
        let edited = resolution.apply(text);
        assert_eq!(
            edited,
            "for (let i = 0; i < 3; i++) {\n  console.log(\"🚀 ~ line: 2 ~ i:\", i);\n  run(i);\n}\n"
        );

        let text = "for (const item of items) use(item);\n";
        let resolution = request(text, 0, "item");
        assert_eq!(resolution.insertion_line, 1);
        assert_eq!(
            resolution.apply(text),
            "for (const item of items) {\n  console.log(\"🚀 ~ line: 2 ~ item:\", item);\n  use(item);\n}\n"
        );
    }

    #[test]
    fn test_selection_outside_script_block() {
        let text = "<template>\n  <p>{{ a }}</p>\n</template>\n<script>\nconst a = 1;\n</script>\n";
        let req = Request::new(text, "vue", Selection::new(1, "a"));
        assert_eq!(
            insert_log(&req, &Config::default()),
            Err(Error::Parse(crate::error::ParseError::NoScriptBlock {
                dialect: "vue".to_string()
            }))
        );
    }

    #[test]
    fn test_classify_only_reports_transform() {
        let located =
            classify_only("const f = (x) => x;\n", "js", &Selection::new(0, "x")).unwrap();
        assert_eq!(located.category, Some(Category::FunctionParameter));
        assert!(located.needs_transform);
        assert_eq!(located.insertion_line, 1);
    }
}
