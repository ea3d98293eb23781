//! Function parameter checker.

use super::sites::pattern_bindings;
use super::{CheckContext, CheckResult};
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

/// Names bound by a function's parameter list.
pub fn parameter_names(tree: &SyntaxTree, function: NodeId) -> Vec<NodeId> {
    if let Some(params) = tree.child_by_field(function, "parameters") {
        return tree
            .named_children(params)
            .flat_map(|p| pattern_bindings(tree, p))
            .map(|b| b.name)
            .collect();
    }
    // Single unparenthesized arrow parameter.
    tree.child_by_field(function, "parameter")
        .map(|p| pattern_bindings(tree, p).into_iter().map(|b| b.name).collect())
        .unwrap_or_default()
}

/// Functions and bodiless signatures (overloads, abstract and interface
/// methods) both bind parameters.
fn binds_parameters(kind: NodeKind) -> bool {
    kind.is_function() || kind == NodeKind::FunctionSignature
}

/// The innermost function whose parameter list binds the selection.
///
/// A signature without a body is still claimed here, so its parameters never
/// fall through to the fallback checker; the resolver gives it the default
/// placement.
pub fn function_parameter(ctx: &CheckContext) -> CheckResult {
    let tree = ctx.tree;
    let mut best: Option<(NodeId, NodeId)> = None;

    for function in tree.ids().filter(|id| binds_parameters(tree.kind(*id))) {
        if !ctx.on_selection_line(&tree.span(function)) {
            continue;
        }
        let hit = parameter_names(tree, function)
            .into_iter()
            .find(|name| ctx.is_target(*name) && ctx.on_selection_line(&tree.span(*name)));
        let Some(name) = hit else {
            continue;
        };
        let narrower = best
            .map(|(f, _)| tree.span(function).len() < tree.span(f).len())
            .unwrap_or(true);
        if narrower {
            best = Some((function, name));
        }
    }

    match best {
        Some((function, name)) => {
            CheckResult::hit(function).with_meta("parameter", tree.text(name))
        }
        None => CheckResult::unmatched(),
    }
}
