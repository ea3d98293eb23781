//! Body rewriting.
//!
//! When a parameter (or a loop variable) has to be logged but its function
//! (or loop) offers no line inside the body, the body is rewritten into a
//! multi-line block that starts with the new statement. Expression bodies
//! keep their expression verbatim as the block's return value; brace-less
//! loop bodies keep their statement verbatim.

pub mod diff;

use serde::Serialize;

pub use diff::{minimal_edit, EditRegion};

use crate::document::Document;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

/// Rewritten document plus the region that changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    pub new_text: String,
    pub edit_region: EditRegion,
    /// Line (in the new text) holding the inserted statement.
    pub statement_line: usize,
}

/// Rewrite the body of `owner` (a function or loop) so that `statement` is
/// its first line.
///
/// Returns `None` when `owner` has no body.
pub fn rewrite_body(
    tree: &SyntaxTree,
    doc: &Document,
    owner: NodeId,
    statement: &str,
) -> Option<TransformResult> {
    let body = tree.child_by_field(owner, "body")?;
    let span = tree.span(body);
    let base = doc.indentation(tree.span(owner).start_line);
    let inner = format!("{}{}", base, doc.indent_unit());

    let replacement = if tree.kind(body) == NodeKind::StatementBlock {
        let text = tree.text(body);
        let content = text
            .strip_prefix('{')
            .and_then(|t| t.strip_suffix('}'))
            .unwrap_or("")
            .trim();
        if content.is_empty() {
            format!("{{\n{inner}{statement}\n{base}}}")
        } else {
            format!("{{\n{inner}{statement}\n{inner}{content}\n{base}}}")
        }
    } else if tree.kind(owner).is_function() {
        format!(
            "{{\n{inner}{statement}\n{inner}return {};\n{base}}}",
            tree.text(body)
        )
    } else {
        match tree.text(body).trim() {
            ";" => format!("{{\n{inner}{statement}\n{base}}}"),
            kept => format!("{{\n{inner}{statement}\n{inner}{kept}\n{base}}}"),
        }
    };

    let original = doc.text();
    let mut new_text = String::with_capacity(original.len() + replacement.len());
    new_text.push_str(&original[..span.start_byte]);
    new_text.push_str(&replacement);
    new_text.push_str(&original[span.end_byte..]);

    let edit_region = minimal_edit(original, &new_text);
    tracing::debug!(
        start = edit_region.start_offset,
        end = edit_region.end_offset_in_original,
        "rewrote body"
    );

    Some(TransformResult {
        new_text,
        edit_region,
        statement_line: span.start_line + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::test_support::fixture;

    fn rewrite_where(text: &str, ext: &str, pred: impl Fn(NodeKind) -> bool) -> TransformResult {
        let fx = fixture(text, ext);
        let owner = fx
            .tree
            .ids()
            .find(|id| pred(fx.tree.kind(*id)))
            .expect("owner");
        rewrite_body(&fx.tree, &fx.doc, owner, "log(x);").expect("rewritten")
    }

    fn rewrite(text: &str, ext: &str) -> TransformResult {
        rewrite_where(text, ext, |k| k.is_function())
    }

    fn rewrite_loop(text: &str, ext: &str) -> TransformResult {
        rewrite_where(text, ext, |k| k == NodeKind::LoopStatement)
    }

    #[test]
    fn test_expression_body_becomes_block() {
        let result = rewrite("const double = (x) => x * 2;\n", "js");
        assert_eq!(
            result.new_text,
            "const double = (x) => {\n  log(x);\n  return x * 2;\n};\n"
        );
        assert_eq!(result.statement_line, 1);
    }

    #[test]
    fn test_parenthesized_object_body_kept_verbatim() {
        let result = rewrite("const wrap = (x) => ({ x });\n", "js");
        assert!(result.new_text.contains("return ({ x });"), "{}", result.new_text);
    }

    #[test]
    fn test_empty_block() {
        let result = rewrite("function greet(x) {}\n", "js");
        assert_eq!(result.new_text, "function greet(x) {\n  log(x);\n}\n");
    }

    #[test]
    fn test_one_line_block_expanded() {
        let result = rewrite("  function f(x) { go(x); }\n", "js");
        assert_eq!(
            result.new_text,
            "  function f(x) {\n    log(x);\n    go(x);\n  }\n"
        );
    }

    #[test]
    fn test_braceless_loop_body_wrapped() {
        let result = rewrite_loop("  for (let i = 0; i < n; i++) run(i);\n", "js");
        assert_eq!(
            result.new_text,
            "  for (let i = 0; i < n; i++) {\n    log(x);\n    run(i);\n  }\n"
        );
        assert_eq!(result.statement_line, 1);
    }

    #[test]
    fn test_one_line_loop_block_expanded() {
        let result = rewrite_loop("for (const x of xs) { use(x); }\n", "ts");
        assert_eq!(result.new_text, "for (const x of xs) {\n  log(x);\n  use(x);\n}\n");
    }

    #[test]
    fn test_edit_region_matches_rewrite() {
        let original = "const double = (x) => x * 2;\n";
        let result = rewrite(original, "js");
        assert_eq!(
            result.edit_region.apply(original, &result.new_text),
            result.new_text
        );
        assert!(result.edit_region.start_offset >= "const double = (x) => ".len());
    }
}
