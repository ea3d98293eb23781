//! Insertion line resolution.
//!
//! Maps a classified selection to the line where a new statement can be
//! inserted so that the selected value is already defined and the file stays
//! syntactically valid. Every category has a fixed placement rule; the only
//! case that cannot be expressed as a line is a function parameter or loop
//! variable whose body has no line to insert on, which is handed to the
//! transformation engine.

pub mod scan;

use crate::classify::{Category, CheckResult, Selection};
use crate::document::Document;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

/// Where the new statement goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Insert before `line`, indented with `indent`.
    Line { line: usize, indent: String },
    /// The body of `owner` (a function or loop) has to be rewritten to
    /// make room.
    RewriteBody { owner: NodeId },
}

impl Placement {
    /// Target line, if the placement is a plain line insertion.
    pub fn line(&self) -> Option<usize> {
        match self {
            Placement::Line { line, .. } => Some(*line),
            Placement::RewriteBody { .. } => None,
        }
    }
}

/// Placement for a classified selection.
pub fn resolve(
    category: Category,
    result: &CheckResult,
    tree: &SyntaxTree,
    doc: &Document,
    selection: &Selection,
) -> Placement {
    let Some(node) = result.node else {
        return default_placement(doc, selection);
    };

    let placement = match category {
        Category::FunctionParameter => body_start(tree, doc, node, selection),
        Category::WithinConditionBlock => before_statement(tree, doc, outermost_if(tree, node)),
        Category::WithinReturnStatement => before_statement(tree, doc, node),
        _ => match loop_header_owner(tree, node) {
            Some(owner) => body_start(tree, doc, owner, selection),
            None if category == Category::WanderingExpression => {
                match tree.statement_anchor(node) {
                    Some(anchor) => after_statement(tree, doc, anchor),
                    None => after_text_statement(doc, selection),
                }
            }
            None => after_statement(tree, doc, node),
        },
    };

    clamp(placement, doc)
}

/// Line after the selection, used when nothing matched.
pub fn default_placement(doc: &Document, selection: &Selection) -> Placement {
    clamp(
        Placement::Line {
            line: selection.line + 1,
            indent: doc.indentation(selection.line).to_string(),
        },
        doc,
    )
}

fn clamp(placement: Placement, doc: &Document) -> Placement {
    match placement {
        Placement::Line { line, indent } => Placement::Line {
            line: line.min(doc.line_count()),
            indent,
        },
        other => other,
    }
}

/// Line after the statement holding `node`.
fn after_statement(tree: &SyntaxTree, doc: &Document, node: NodeId) -> Placement {
    let Some(anchor) = tree.statement_anchor(node) else {
        let span = tree.span(node);
        return Placement::Line {
            line: span.end_line + 1,
            indent: doc.indentation(span.start_line).to_string(),
        };
    };
    let span = tree.span(anchor);
    let scanned = scan::statement_end_line(doc, span.start_byte);
    Placement::Line {
        line: scanned.max(span.end_line) + 1,
        indent: doc.indentation(span.start_line).to_string(),
    }
}

/// Line after the statement starting on the selection line, by text alone.
fn after_text_statement(doc: &Document, selection: &Selection) -> Placement {
    let start = doc.line_start(selection.line) + doc.first_non_whitespace(selection.line);
    Placement::Line {
        line: scan::statement_end_line(doc, start) + 1,
        indent: doc.indentation(selection.line).to_string(),
    }
}

/// The first line of the statement holding `node`.
fn before_statement(tree: &SyntaxTree, doc: &Document, node: NodeId) -> Placement {
    let anchor = tree.statement_anchor(node).unwrap_or(node);
    let line = tree.span(anchor).start_line;
    Placement::Line {
        line,
        indent: doc.indentation(line).to_string(),
    }
}

/// The head of an `else if` chain.
fn outermost_if(tree: &SyntaxTree, mut node: NodeId) -> NodeId {
    while let Some(parent) = tree.parent(node) {
        if tree.kind(parent) != NodeKind::ElseClause {
            break;
        }
        match tree.parent(parent) {
            Some(outer) if tree.kind(outer) == NodeKind::IfStatement => node = outer,
            _ => break,
        }
    }
    node
}

/// The loop whose header (`for (let i ...`, `for (const x of ...`) declares
/// `node`. Such names are only in scope inside the loop body.
fn loop_header_owner(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    for current in std::iter::once(node).chain(tree.ancestors(node)) {
        let parent = tree.parent(current)?;
        let kind = tree.kind(parent);
        if kind == NodeKind::LoopStatement {
            return matches!(tree.node(current).field, Some("initializer") | Some("left"))
                .then_some(parent);
        }
        if kind.is_statement_list() || kind.is_function() {
            return None;
        }
    }
    None
}

/// First line inside the body of a function or loop.
///
/// Only multi-line blocks have such a line; expression bodies, brace-less
/// statements, empty blocks and one-line blocks need a rewrite.
fn body_start(
    tree: &SyntaxTree,
    doc: &Document,
    owner: NodeId,
    selection: &Selection,
) -> Placement {
    let Some(body) = tree.child_by_field(owner, "body") else {
        return default_placement(doc, selection);
    };
    let span = tree.span(body);
    let has_statements = tree.named_children(body).next().is_some();

    if tree.kind(body) != NodeKind::StatementBlock
        || !has_statements
        || span.start_line == span.end_line
    {
        return Placement::RewriteBody { owner };
    }

    let line = span.start_line + 1;
    let indent = if doc.line_text(line).trim().is_empty() || line >= span.end_line {
        format!("{}{}", doc.indentation(tree.span(owner).start_line), doc.indent_unit())
    } else {
        doc.indentation(line).to_string()
    };
    Placement::Line { line, indent }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::test_support::fixture;
    use crate::classify::{classify, CheckContext};

    fn place(text: &str, ext: &str, line: usize, value: &str) -> (Option<Category>, Placement) {
        let fx = fixture(text, ext);
        let selection = Selection::new(line, value);
        let ctx = CheckContext::new(&fx.tree, &fx.doc, &selection);
        match classify(&ctx) {
            Some(c) => {
                let placement = resolve(c.category, &c.result, &fx.tree, &fx.doc, &selection);
                (Some(c.category), placement)
            }
            None => (None, default_placement(&fx.doc, &selection)),
        }
    }

    #[test]
    fn test_after_multiline_array() {
        let text = "function f() {\n  const list = [\n    1,\n    2,\n  ];\n  use(list);\n}\n";
        let (category, placement) = place(text, "js", 1, "list");
        assert_eq!(category, Some(Category::ArrayAssignment));
        assert_eq!(
            placement,
            Placement::Line {
                line: 5,
                indent: "  ".to_string()
            }
        );
    }

    #[test]
    fn test_condition_lifts_to_else_if_head() {
        let text = "if (a) {\n  x();\n} else if (user.ok) {\n  y();\n}\n";
        let (category, placement) = place(text, "js", 2, "user.ok");
        assert_eq!(category, Some(Category::WithinConditionBlock));
        assert_eq!(placement.line(), Some(0));
    }

    #[test]
    fn test_return_inserts_before() {
        let text = "function f(o) {\n  return o.value;\n}\n";
        let (category, placement) = place(text, "js", 1, "o.value");
        assert_eq!(category, Some(Category::WithinReturnStatement));
        assert_eq!(placement.line(), Some(1));
    }

    #[test]
    fn test_parameter_with_multiline_body() {
        let text = "function greet(name) {\n  say(name);\n}\n";
        let (category, placement) = place(text, "js", 0, "name");
        assert_eq!(category, Some(Category::FunctionParameter));
        assert_eq!(
            placement,
            Placement::Line {
                line: 1,
                indent: "  ".to_string()
            }
        );
    }

    #[test]
    fn test_parameter_needing_rewrite() {
        for text in [
            "const double = (x) => x * 2;\n",
            "function greet(name) {}\n",
            "function greet(name) { say(name); }\n",
        ] {
            let (_, placement) = place(text, "js", 0, if text.contains("x") { "x" } else { "name" });
            assert!(
                matches!(placement, Placement::RewriteBody { .. }),
                "{text} should need a rewrite"
            );
        }
    }

    #[test]
    fn test_loop_variable_logged_inside_body() {
        let text = "for (let i = 0; i < 3; i++) {\n  run(i);\n}\n";
        let (category, placement) = place(text, "js", 0, "i");
        assert_eq!(category, Some(Category::PrimitiveAssignment));
        assert_eq!(
            placement,
            Placement::Line {
                line: 1,
                indent: "  ".to_string()
            }
        );

        let text = "function f(rows) {\n  for (const [key, row] of rows) {\n    use(row);\n  }\n}\n";
        let (_, placement) = place(text, "js", 1, "row");
        assert_eq!(
            placement,
            Placement::Line {
                line: 2,
                indent: "    ".to_string()
            }
        );
    }

    #[test]
    fn test_loop_without_body_line_needs_rewrite() {
        for text in [
            "for (let i = 0; i < 3; i++) run(i);\n",
            "for (const item of items) { use(item); }\n",
        ] {
            let value = if text.contains("item") { "item" } else { "i" };
            let (_, placement) = place(text, "ts", 0, value);
            assert!(
                matches!(placement, Placement::RewriteBody { .. }),
                "{text} should need a rewrite"
            );
        }
    }

    #[test]
    fn test_loop_body_declarations_still_go_after() {
        let text = "for (const x of xs) {\n  const y = x * 2;\n  use(y);\n}\n";
        let (category, placement) = place(text, "js", 1, "y");
        assert_eq!(category, Some(Category::BinaryExpressionAssignment));
        assert_eq!(placement.line(), Some(2));
    }

    #[test]
    fn test_bodiless_signature_uses_default_line() {
        let text = "abstract class Repo {\n  abstract find(id: string): Item;\n}\n";
        let (category, placement) = place(text, "ts", 1, "id");
        assert_eq!(category, Some(Category::FunctionParameter));
        assert_eq!(placement.line(), Some(2));
    }

    #[test]
    fn test_clamped_to_line_count() {
        let text = "const a = 1;";
        let (_, placement) = place(text, "js", 0, "a");
        assert_eq!(placement.line(), Some(1));
    }

    #[test]
    fn test_unmatched_defaults_to_next_line() {
        let text = "a();\nb();\nc();\n";
        let (category, placement) = place(text, "js", 0, "nothing");
        assert_eq!(category, None);
        assert_eq!(placement.line(), Some(1));
    }
}
