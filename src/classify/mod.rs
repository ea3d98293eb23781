//! Construct classification.
//!
//! A selection (line + selected text) is matched against an ordered table of
//! checkers, most structurally specific first. The first checker that
//! matches decides the [`Category`]; the order of [`CHECKERS`] is the only
//! precedence rule between overlapping constructs.
//!
//! Checkers are plain functions with one shared signature. None of them can
//! fail: when a checker cannot classify a selection it reports unmatched and
//! the next one is tried.

mod assignment;
mod fallback;
mod parameter;
mod property;
mod scope;
pub mod sites;

use std::collections::BTreeMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::document::Document;
use crate::syntax::{NodeId, Span, SyntaxTree};

lazy_static! {
    /// Identifiers and property paths such as `a`, `this.x`, `a?.b[0]!`.
    static ref SIMPLE_PATH: Regex = Regex::new(
        r"^[A-Za-z_$#][\w$]*(?:(?:\?\.|\.)[A-Za-z_$#][\w$]*|(?:\?\.)?\[[^\[\]]+\]|!)*$"
    ).unwrap();
}

/// Syntactic shape surrounding a selected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ArrayAssignment,
    ObjectLiteral,
    PrimitiveAssignment,
    BinaryExpressionAssignment,
    TernaryAssignment,
    TemplateStringAssignment,
    FunctionParameter,
    NamedFunctionAssignment,
    FunctionCallAssignment,
    PropertyAccessAssignment,
    PropertyPathRead,
    PropertyMethodCall,
    WithinConditionBlock,
    WithinReturnStatement,
    WanderingExpression,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ArrayAssignment => "array_assignment",
            Category::ObjectLiteral => "object_literal",
            Category::PrimitiveAssignment => "primitive_assignment",
            Category::BinaryExpressionAssignment => "binary_expression_assignment",
            Category::TernaryAssignment => "ternary_assignment",
            Category::TemplateStringAssignment => "template_string_assignment",
            Category::FunctionParameter => "function_parameter",
            Category::NamedFunctionAssignment => "named_function_assignment",
            Category::FunctionCallAssignment => "function_call_assignment",
            Category::PropertyAccessAssignment => "property_access_assignment",
            Category::PropertyPathRead => "property_path_read",
            Category::PropertyMethodCall => "property_method_call",
            Category::WithinConditionBlock => "within_condition_block",
            Category::WithinReturnStatement => "within_return_statement",
            Category::WanderingExpression => "wandering_expression",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The user's chosen line and the literal text they selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// 0-indexed document line.
    pub line: usize,
    pub text: String,
}

impl Selection {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }

    /// Selected text without surrounding whitespace.
    pub fn value(&self) -> &str {
        self.text.trim()
    }

    /// Whether the selection is an identifier or property path that can be
    /// matched by name.
    pub fn is_simple(&self) -> bool {
        SIMPLE_PATH.is_match(self.value())
    }

    /// Byte range of the selected text in the document.
    ///
    /// Prefers an occurrence starting on the selection line, then one
    /// spanning it, then one on an adjacent line. Word-like selections only
    /// match at identifier boundaries.
    pub fn locate(&self, doc: &Document) -> Option<(usize, usize)> {
        let needle = self.value();
        if needle.is_empty() {
            return None;
        }
        let text = doc.text();
        let bytes = text.as_bytes();
        let word_start = needle.chars().next().map(is_ident_char).unwrap_or(false);
        let word_end = needle.chars().last().map(is_ident_char).unwrap_or(false);

        let mut best: Option<(u8, usize)> = None;
        for (start, _) in text.match_indices(needle) {
            let end = start + needle.len();
            if word_start && start > 0 && is_ident_byte(bytes[start - 1]) {
                continue;
            }
            if word_end && end < bytes.len() && is_ident_byte(bytes[end]) {
                continue;
            }

            let first = doc.position_at(start).line;
            let last = doc.position_at(end).line;
            let rank = if first == self.line {
                0
            } else if first < self.line && self.line <= last {
                1
            } else if first.abs_diff(self.line) == 1 || last.abs_diff(self.line) == 1 {
                2
            } else {
                continue;
            };

            if best.map(|(r, _)| rank < r).unwrap_or(true) {
                best = Some((rank, start));
            }
            if rank == 0 {
                break;
            }
        }

        best.map(|(_, start)| (start, start + needle.len()))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// Outcome of one checker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub matched: bool,
    pub node: Option<NodeId>,
    /// Derived facts, e.g. `path` for a resolved dotted property path.
    pub metadata: BTreeMap<String, String>,
}

impl CheckResult {
    pub fn unmatched() -> Self {
        Self::default()
    }

    pub fn hit(node: NodeId) -> Self {
        Self {
            matched: true,
            node: Some(node),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Everything a checker may look at.
pub struct CheckContext<'a> {
    pub tree: &'a SyntaxTree,
    pub doc: &'a Document,
    pub selection: &'a Selection,
    /// Document range of the selected text, when it could be located.
    pub located: Option<(usize, usize)>,
    /// Exact span to match instead of comparing names. Set for complex
    /// multi-token selections.
    pub span_override: Option<(usize, usize)>,
}

impl<'a> CheckContext<'a> {
    pub fn new(tree: &'a SyntaxTree, doc: &'a Document, selection: &'a Selection) -> Self {
        let located = selection.locate(doc);
        let span_override = if selection.is_simple() { None } else { located };
        Self {
            tree,
            doc,
            selection,
            located,
            span_override,
        }
    }

    /// Whether `node` denotes the selected value.
    pub fn is_target(&self, node: NodeId) -> bool {
        match self.span_override {
            Some((start, end)) => {
                let span = self.tree.span(node);
                span.start_byte == start && span.end_byte == end
            }
            None => squash(self.tree.text(node)) == squash(self.selection.value()),
        }
    }

    /// Whether a span covers the selection line.
    pub fn on_selection_line(&self, span: &Span) -> bool {
        span.contains_line(self.selection.line)
    }

    /// Named nodes denoting the selection and covering its line, outermost
    /// first.
    pub fn targets(&self) -> Vec<NodeId> {
        self.tree
            .ids()
            .filter(|id| {
                let kind = self.tree.kind(*id);
                !matches!(
                    kind,
                    crate::syntax::NodeKind::Token | crate::syntax::NodeKind::Comment
                ) && self.on_selection_line(&self.tree.span(*id))
                    && self.is_target(*id)
            })
            .collect()
    }
}

fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Shared checker signature.
pub type Checker = fn(&CheckContext) -> CheckResult;

/// Checkers in priority order.
pub const CHECKERS: &[(Category, Checker)] = &[
    (Category::ArrayAssignment, assignment::array_assignment),
    (Category::ObjectLiteral, assignment::object_literal),
    (Category::PrimitiveAssignment, assignment::primitive_assignment),
    (Category::BinaryExpressionAssignment, assignment::binary_expression),
    (Category::TernaryAssignment, assignment::ternary),
    (Category::TemplateStringAssignment, assignment::template_string),
    (Category::FunctionParameter, parameter::function_parameter),
    (Category::NamedFunctionAssignment, assignment::named_function),
    (Category::FunctionCallAssignment, assignment::function_call),
    (Category::PropertyAccessAssignment, property::property_access_assignment),
    (Category::PropertyPathRead, property::property_path_read),
    (Category::PropertyMethodCall, property::property_method_call),
    (Category::WithinConditionBlock, scope::within_condition_block),
    (Category::WithinReturnStatement, scope::within_return_statement),
    (Category::WanderingExpression, fallback::wandering_expression),
];

/// The checker that claimed a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub result: CheckResult,
}

/// Run the checkers in order and return the first match.
pub fn classify(ctx: &CheckContext) -> Option<Classification> {
    for (category, checker) in CHECKERS {
        let result = checker(ctx);
        if result.matched {
            tracing::debug!(category = %category, line = ctx.selection.line, "selection classified");
            return Some(Classification {
                category: *category,
                result,
            });
        }
    }
    tracing::debug!(line = ctx.selection.line, "no checker matched selection");
    None
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::dialect;
    use crate::syntax::parse_unit;

    pub struct Fixture {
        pub doc: Document,
        pub tree: SyntaxTree,
    }

    pub fn fixture(text: &str, ext: &str) -> Fixture {
        let unit = dialect::load(text, ext).expect("should load");
        let tree = parse_unit(&unit, text).expect("should parse");
        Fixture {
            doc: Document::new(text),
            tree,
        }
    }

    /// Run one checker against a selection.
    pub fn check(fx: &Fixture, checker: Checker, line: usize, value: &str) -> CheckResult {
        let selection = Selection::new(line, value);
        let ctx = CheckContext::new(&fx.tree, &fx.doc, &selection);
        checker(&ctx)
    }

    /// Category chosen by the full table.
    pub fn category(text: &str, ext: &str, line: usize, value: &str) -> Option<Category> {
        let fx = fixture(text, ext);
        let selection = Selection::new(line, value);
        let ctx = CheckContext::new(&fx.tree, &fx.doc, &selection);
        classify(&ctx).map(|c| c.category)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::category;
    use super::*;

    #[test]
    fn test_simple_paths() {
        for text in ["a", "this.value", "a?.b", "items[0].name", "user!", "$el", "#priv"] {
            assert!(Selection::new(0, text).is_simple(), "{text} should be simple");
        }
        for text in ["{ a, b }", "a + b", "fn()", "a ? b : c"] {
            assert!(!Selection::new(0, text).is_simple(), "{text} should be complex");
        }
    }

    #[test]
    fn test_locate_prefers_selection_line_and_word_boundaries() {
        let doc = Document::new("const max = 1;\nconst x = max;\n");
        let sel = Selection::new(1, "x");
        let (start, end) = sel.locate(&doc).expect("located");
        assert_eq!(&doc.text()[start..end], "x");
        assert_eq!(doc.position_at(start).line, 1);
        assert!(Selection::new(1, "nothing").locate(&doc).is_none());
    }

    #[test]
    fn test_locate_adjacent_line() {
        let doc = Document::new("foo(\n  bar\n);\n");
        let sel = Selection::new(0, "bar");
        let (start, _) = sel.locate(&doc).expect("located");
        assert_eq!(doc.position_at(start).line, 1);
    }

    #[test]
    fn test_checker_order_is_fixed() {
        let order: Vec<Category> = CHECKERS.iter().map(|(c, _)| *c).collect();
        assert_eq!(order.len(), 15);
        assert_eq!(order[0], Category::ArrayAssignment);
        assert_eq!(order[14], Category::WanderingExpression);
    }

    #[test]
    fn test_ternary_guarded_object_is_ternary() {
        let text = "const opts = flag ? { a: 1 } : { b: 2 };\n";
        assert_eq!(category(text, "ts", 0, "opts"), Some(Category::TernaryAssignment));
    }

    #[test]
    fn test_destructuring_pattern_by_span() {
        let text = "const { a, b } = load();\n";
        assert_eq!(
            category(text, "ts", 0, "{ a, b }"),
            Some(Category::NamedFunctionAssignment)
        );
    }

    #[test]
    fn test_unmatched_selection() {
        assert_eq!(category("const a = 1;\n", "ts", 0, "zzz"), None);
    }
}
