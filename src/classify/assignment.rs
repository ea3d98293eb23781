//! Checkers keyed on the value assigned to the selection.

use super::sites::{assignment_sites, site_value, AssignmentSite};
use super::{CheckContext, CheckResult};
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

/// First site whose value satisfies `pred`.
fn first_site(
    ctx: &CheckContext,
    pred: impl Fn(&CheckContext, &AssignmentSite) -> bool,
) -> CheckResult {
    assignment_sites(ctx)
        .into_iter()
        .find(|site| pred(ctx, site))
        .map(|site| CheckResult::hit(site.host))
        .unwrap_or_default()
}

fn value_kind(ctx: &CheckContext, site: &AssignmentSite) -> Option<NodeKind> {
    site_value(ctx, site).map(|v| ctx.tree.kind(v))
}

/// A destructured binding whose default is a conditional. Such sites belong
/// to [`ternary`] whatever the right-hand side is.
fn has_ternary_default(ctx: &CheckContext, site: &AssignmentSite) -> bool {
    site.default
        .map(|d| ctx.tree.kind(ctx.tree.unwrap_transparent(d)) == NodeKind::TernaryExpression)
        .unwrap_or(false)
}

/// Value kind for the checkers ordered before [`ternary`].
fn plain_value_kind(ctx: &CheckContext, site: &AssignmentSite) -> Option<NodeKind> {
    if has_ternary_default(ctx, site) {
        return None;
    }
    value_kind(ctx, site)
}

pub fn array_assignment(ctx: &CheckContext) -> CheckResult {
    first_site(ctx, |ctx, site| plain_value_kind(ctx, site) == Some(NodeKind::ArrayLiteral))
}

pub fn object_literal(ctx: &CheckContext) -> CheckResult {
    first_site(ctx, |ctx, site| plain_value_kind(ctx, site) == Some(NodeKind::ObjectLiteral))
}

/// Literals, bare names and unary forms; also declarations without a value.
pub fn primitive_assignment(ctx: &CheckContext) -> CheckResult {
    first_site(ctx, |ctx, site| {
        if has_ternary_default(ctx, site) {
            return false;
        }
        primitive_value(ctx, site)
    })
}

fn primitive_value(ctx: &CheckContext, site: &AssignmentSite) -> bool {
    match value_kind(ctx, site) {
        None => ctx.tree.kind(site.host) == NodeKind::VariableDeclarator,
        Some(kind) => {
            kind.is_literal()
                || matches!(
                    kind,
                    NodeKind::Identifier
                        | NodeKind::This
                        | NodeKind::UnaryExpression
                        | NodeKind::UpdateExpression
                )
        }
    }
}

pub fn binary_expression(ctx: &CheckContext) -> CheckResult {
    first_site(ctx, |ctx, site| plain_value_kind(ctx, site) == Some(NodeKind::BinaryExpression))
}

/// Conditional values, including conditionals passed straight into a call
/// and conditional destructuring defaults.
pub fn ternary(ctx: &CheckContext) -> CheckResult {
    first_site(ctx, |ctx, site| {
        let tree = ctx.tree;
        if has_ternary_default(ctx, site) {
            return true;
        }
        let Some(value) = site_value(ctx, site) else {
            return false;
        };
        match tree.kind(value) {
            NodeKind::TernaryExpression => true,
            NodeKind::CallExpression | NodeKind::NewExpression => {
                has_ternary_argument(tree, value)
            }
            _ => false,
        }
    })
}

fn has_ternary_argument(tree: &SyntaxTree, call: NodeId) -> bool {
    tree.child_by_field(call, "arguments")
        .filter(|args| tree.kind(*args) == NodeKind::Arguments)
        .map(|args| {
            tree.named_children(args)
                .any(|arg| tree.kind(tree.unwrap_transparent(arg)) == NodeKind::TernaryExpression)
        })
        .unwrap_or(false)
}

/// Template literals and tagged templates.
pub fn template_string(ctx: &CheckContext) -> CheckResult {
    first_site(ctx, |ctx, site| {
        let Some(value) = site_value(ctx, site) else {
            return false;
        };
        match ctx.tree.kind(value) {
            NodeKind::TemplateString => true,
            NodeKind::CallExpression => is_tagged_template(ctx.tree, value),
            _ => false,
        }
    })
}

fn is_tagged_template(tree: &SyntaxTree, call: NodeId) -> bool {
    tree.child_by_field(call, "arguments")
        .map(|args| tree.kind(args) == NodeKind::TemplateString)
        .unwrap_or(false)
}

/// Calls of a bare function name, and function or class values.
pub fn named_function(ctx: &CheckContext) -> CheckResult {
    first_site(ctx, |ctx, site| {
        let tree = ctx.tree;
        let Some(value) = site_value(ctx, site) else {
            return false;
        };
        match tree.kind(value) {
            NodeKind::FunctionExpression | NodeKind::ArrowFunction | NodeKind::ClassExpression => {
                true
            }
            NodeKind::CallExpression => tree
                .child_by_field(value, "function")
                .map(|callee| tree.kind(tree.unwrap_transparent(callee)) == NodeKind::Identifier)
                .unwrap_or(false),
            NodeKind::NewExpression => tree
                .child_by_field(value, "constructor")
                .map(|ctor| tree.kind(tree.unwrap_transparent(ctor)) == NodeKind::Identifier)
                .unwrap_or(false),
            _ => false,
        }
    })
}

/// Member-chain calls, constructor calls on paths, and property reads off a
/// call result.
pub fn function_call(ctx: &CheckContext) -> CheckResult {
    first_site(ctx, |ctx, site| {
        let tree = ctx.tree;
        let Some(value) = site_value(ctx, site) else {
            return false;
        };
        match tree.kind(value) {
            NodeKind::CallExpression | NodeKind::NewExpression => true,
            NodeKind::MemberExpression | NodeKind::SubscriptExpression => {
                chain_contains_call(tree, value)
            }
            _ => false,
        }
    })
}

/// Whether a property chain has a call somewhere along its receivers.
pub fn chain_contains_call(tree: &SyntaxTree, mut node: NodeId) -> bool {
    loop {
        node = tree.unwrap_transparent(node);
        match tree.kind(node) {
            NodeKind::CallExpression | NodeKind::NewExpression => return true,
            NodeKind::MemberExpression | NodeKind::SubscriptExpression => {
                match tree.child_by_field(node, "object") {
                    Some(object) => node = object,
                    None => return false,
                }
            }
            _ => return false,
        }
    }
}
