//! Assignment sites and pattern bindings shared by the checkers.

use super::CheckContext;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

/// A declarator or assignment whose left side denotes the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentSite {
    /// The declarator or assignment expression.
    pub host: NodeId,
    /// The matched name, path or pattern on the left side.
    pub target: NodeId,
    /// Right-hand side, absent for `let x;`.
    pub value: Option<NodeId>,
    /// Target was found inside a destructuring pattern.
    pub destructured: bool,
    /// Default value attached to the matched binding (`{ a = 1 }`).
    pub default: Option<NodeId>,
}

/// A name introduced by a binding pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub name: NodeId,
    pub default: Option<NodeId>,
}

/// Every name bound by `pattern`, with its default value if any.
pub fn pattern_bindings(tree: &SyntaxTree, pattern: NodeId) -> Vec<Binding> {
    let mut out = Vec::new();
    collect_bindings(tree, pattern, None, &mut out);
    out
}

fn collect_bindings(
    tree: &SyntaxTree,
    node: NodeId,
    default: Option<NodeId>,
    out: &mut Vec<Binding>,
) {
    match tree.kind(node) {
        NodeKind::Identifier | NodeKind::ShorthandPatternProperty | NodeKind::This => {
            out.push(Binding { name: node, default })
        }
        NodeKind::ObjectPattern | NodeKind::ArrayPattern | NodeKind::RestPattern => {
            for child in tree.named_children(node) {
                collect_bindings(tree, child, None, out);
            }
        }
        NodeKind::PairPattern => {
            if let Some(value) = tree.child_by_field(node, "value") {
                collect_bindings(tree, value, None, out);
            }
        }
        NodeKind::AssignmentPattern | NodeKind::ShorthandAssignmentPattern => {
            let right = tree.child_by_field(node, "right");
            if let Some(left) = tree.child_by_field(node, "left") {
                collect_bindings(tree, left, right, out);
            }
        }
        NodeKind::Parameter => {
            let value = tree.child_by_field(node, "value");
            if let Some(pattern) = tree.child_by_field(node, "pattern") {
                collect_bindings(tree, pattern, value, out);
            }
        }
        _ => {}
    }
}

/// Left side and right side of a declarator or assignment.
pub fn sides(tree: &SyntaxTree, host: NodeId) -> Option<(NodeId, Option<NodeId>)> {
    match tree.kind(host) {
        NodeKind::VariableDeclarator => {
            let name = tree.child_by_field(host, "name")?;
            Some((name, tree.child_by_field(host, "value")))
        }
        NodeKind::AssignmentExpression | NodeKind::AugmentedAssignment => {
            let left = tree.child_by_field(host, "left")?;
            Some((left, tree.child_by_field(host, "right")))
        }
        _ => None,
    }
}

/// Assignment sites on the selection line whose target is the selection.
pub fn assignment_sites(ctx: &CheckContext) -> Vec<AssignmentSite> {
    let tree = ctx.tree;
    let mut sites = Vec::new();

    for host in tree.ids() {
        let Some((left, value)) = sides(tree, host) else {
            continue;
        };
        let lhs = tree.unwrap_transparent(left);

        if matches!(tree.kind(lhs), NodeKind::ObjectPattern | NodeKind::ArrayPattern) {
            if ctx.is_target(lhs) && ctx.on_selection_line(&tree.span(lhs)) {
                sites.push(AssignmentSite {
                    host,
                    target: lhs,
                    value,
                    destructured: true,
                    default: None,
                });
                continue;
            }
            for binding in pattern_bindings(tree, lhs) {
                if ctx.is_target(binding.name) && ctx.on_selection_line(&tree.span(binding.name)) {
                    sites.push(AssignmentSite {
                        host,
                        target: binding.name,
                        value,
                        destructured: true,
                        default: binding.default,
                    });
                }
            }
        } else if ctx.is_target(lhs) && ctx.on_selection_line(&tree.span(lhs)) {
            sites.push(AssignmentSite {
                host,
                target: lhs,
                value,
                destructured: false,
                default: None,
            });
        }
    }

    sites
}

/// The site's value with wrappers and `await` removed.
pub fn site_value(ctx: &CheckContext, site: &AssignmentSite) -> Option<NodeId> {
    site.value.map(|v| ctx.tree.unwrap_value(v))
}

/// Whether a node lies inside a function body nested below `outer`.
pub fn crosses_function(tree: &SyntaxTree, node: NodeId, outer: NodeId) -> bool {
    tree.ancestors(node)
        .take_while(|a| *a != outer)
        .any(|a| tree.kind(a).is_function())
}
