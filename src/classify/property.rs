//! Checkers for property paths: writes, reads and method receivers.

use super::assignment::chain_contains_call;
use super::sites::{assignment_sites, crosses_function, sides, site_value};
use super::{CheckContext, CheckResult};
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

/// Statement kinds after which a property read can be logged.
fn is_plain_statement(tree: &SyntaxTree, anchor: NodeId) -> bool {
    match tree.kind(anchor) {
        NodeKind::ExpressionStatement | NodeKind::VariableDeclaration => true,
        NodeKind::ExportStatement => tree
            .named_children(anchor)
            .any(|c| tree.kind(c) == NodeKind::VariableDeclaration),
        _ => false,
    }
}

/// Writes to a property path, declarations initialized from a plain
/// property path, and keys nested inside an assigned object literal.
pub fn property_access_assignment(ctx: &CheckContext) -> CheckResult {
    let tree = ctx.tree;

    for site in assignment_sites(ctx) {
        if site.destructured {
            continue;
        }
        if tree.kind(site.target).is_member_access() {
            return CheckResult::hit(site.host);
        }
        if let Some(value) = site_value(ctx, &site) {
            if tree.kind(value).is_member_access() && !chain_contains_call(tree, value) {
                return CheckResult::hit(site.host);
            }
        }
    }

    for pair in tree.ids().filter(|id| tree.kind(*id) == NodeKind::Pair) {
        let Some(key) = tree.child_by_field(pair, "key") else {
            continue;
        };
        if !ctx.is_target(key) || !ctx.on_selection_line(&tree.span(key)) {
            continue;
        }
        if let Some((host, path)) = nested_key_path(tree, pair) {
            return CheckResult::hit(host).with_meta("path", path);
        }
    }

    CheckResult::unmatched()
}

/// Walk from a pair up through enclosing object literals to the assignment
/// that owns the outermost one, building `root.a.b.key`.
fn nested_key_path(tree: &SyntaxTree, pair: NodeId) -> Option<(NodeId, String)> {
    let mut keys = Vec::new();
    let mut current = pair;

    loop {
        let key = tree.child_by_field(current, "key")?;
        keys.push(key_segment(tree, key)?);

        let object = tree.parent(current)?;
        if tree.kind(object) != NodeKind::ObjectLiteral {
            return None;
        }
        let outer = tree.parent(object)?;
        match tree.kind(outer) {
            NodeKind::Pair => current = outer,
            NodeKind::ParenthesizedExpression | NodeKind::TypeCast => {
                let host = tree.parent(outer)?;
                return finish_path(tree, host, keys);
            }
            _ => return finish_path(tree, outer, keys),
        }
    }
}

fn finish_path(tree: &SyntaxTree, host: NodeId, keys: Vec<String>) -> Option<(NodeId, String)> {
    let (left, _) = sides(tree, host)?;
    let left = tree.unwrap_transparent(left);
    if !matches!(
        tree.kind(left),
        NodeKind::Identifier | NodeKind::MemberExpression | NodeKind::SubscriptExpression
    ) {
        return None;
    }
    let mut path = tree.text(left).to_string();
    for segment in keys.iter().rev() {
        path.push_str(segment);
    }
    Some((host, path))
}

/// Accessor for one object key: `.name` or `["odd-key"]`.
fn key_segment(tree: &SyntaxTree, key: NodeId) -> Option<String> {
    let text = tree.text(key);
    match tree.kind(key) {
        NodeKind::PropertyIdentifier | NodeKind::Identifier => Some(format!(".{}", text)),
        NodeKind::String => {
            let inner = text.trim_matches(|c| c == '"' || c == '\'');
            if is_identifier(inner) {
                Some(format!(".{}", inner))
            } else {
                Some(format!("[{}]", text))
            }
        }
        NodeKind::Number => Some(format!("[{}]", text)),
        _ => None,
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Whether `node` is the callee receiver in `node.method(...)`.
fn is_call_receiver(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    let member = tree.parent(node)?;
    if tree.kind(member) != NodeKind::MemberExpression || tree.node(node).field != Some("object") {
        return None;
    }
    let call = tree.parent(member)?;
    if tree.kind(call) == NodeKind::CallExpression && tree.node(member).field == Some("function") {
        Some(call)
    } else {
        None
    }
}

/// A property path read as the whole value of a plain statement.
pub fn property_path_read(ctx: &CheckContext) -> CheckResult {
    let tree = ctx.tree;

    for node in ctx.targets() {
        if !tree.kind(node).is_member_access() {
            continue;
        }
        if is_call_receiver(tree, node).is_some() {
            continue;
        }
        let Some(parent) = tree.parent(node) else {
            continue;
        };
        let whole_value = match tree.kind(parent) {
            NodeKind::ExpressionStatement => true,
            NodeKind::VariableDeclarator => tree.node(node).field == Some("value"),
            NodeKind::AssignmentExpression | NodeKind::AugmentedAssignment => {
                tree.node(node).field == Some("right")
            }
            _ => false,
        };
        if !whole_value {
            continue;
        }
        let Some(anchor) = tree.statement_anchor(node) else {
            continue;
        };
        if is_plain_statement(tree, anchor) && !crosses_function(tree, node, anchor) {
            return CheckResult::hit(node);
        }
    }

    CheckResult::unmatched()
}

/// The receiver of a method call made at statement level.
pub fn property_method_call(ctx: &CheckContext) -> CheckResult {
    let tree = ctx.tree;

    for node in ctx.targets() {
        let Some(call) = is_call_receiver(tree, node) else {
            continue;
        };
        let Some(anchor) = tree.statement_anchor(call) else {
            continue;
        };
        if is_plain_statement(tree, anchor) && !crosses_function(tree, call, anchor) {
            return CheckResult::hit(call);
        }
    }

    CheckResult::unmatched()
}
