//! Checkers for selections inside an `if` test or a `return`.

use super::{CheckContext, CheckResult};
use crate::syntax::{NodeId, NodeKind};

/// The `if` statement whose condition contains the selection.
///
/// Loop tests and conditional-expression tests do not count.
pub fn within_condition_block(ctx: &CheckContext) -> CheckResult {
    let tree = ctx.tree;

    for node in ctx.targets() {
        let mut child = node;
        for ancestor in tree.ancestors(node) {
            let kind = tree.kind(ancestor);
            if kind.is_function() || kind.is_statement_list() {
                break;
            }
            if kind == NodeKind::IfStatement {
                if tree.node(child).field == Some("condition") {
                    return CheckResult::hit(ancestor);
                }
                break;
            }
            child = ancestor;
        }
    }

    CheckResult::unmatched()
}

/// The `return` statement holding the selection, within the same function.
pub fn within_return_statement(ctx: &CheckContext) -> CheckResult {
    for node in ctx.targets() {
        if let Some(ret) = enclosing_return(ctx, node) {
            return CheckResult::hit(ret);
        }
    }

    CheckResult::unmatched()
}

fn enclosing_return(ctx: &CheckContext, node: NodeId) -> Option<NodeId> {
    let tree = ctx.tree;
    for ancestor in std::iter::once(node).chain(tree.ancestors(node)) {
        let kind = tree.kind(ancestor);
        if kind == NodeKind::ReturnStatement {
            return Some(ancestor);
        }
        if kind.is_function() || kind.is_statement_list() {
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::test_support::{check, fixture};

    #[test]
    fn test_if_condition_only() {
        let text = "if (user.isAdmin && ready) {\n  user.isAdmin;\n}\nwhile (user.isAdmin) {}\nconst v = user.isAdmin ? 1 : 2;\n";
        let fx = fixture(text, "js");
        let result = check(&fx, within_condition_block, 0, "user.isAdmin");
        assert!(result.matched);
        let node = result.node.expect("if");
        assert_eq!(fx.tree.kind(node), NodeKind::IfStatement);
        assert!(!check(&fx, within_condition_block, 1, "user.isAdmin").matched);
        assert!(!check(&fx, within_condition_block, 3, "user.isAdmin").matched);
        assert!(!check(&fx, within_condition_block, 4, "user.isAdmin").matched);
    }

    #[test]
    fn test_return_without_crossing_functions() {
        let text = "function f(a) {\n  return a.total;\n}\nfunction g() {\n  return () => b.total;\n}\n";
        let fx = fixture(text, "js");
        assert!(check(&fx, within_return_statement, 1, "a.total").matched);
        assert!(!check(&fx, within_return_statement, 4, "b.total").matched);
    }
}
