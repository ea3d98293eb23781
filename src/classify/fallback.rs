//! Last-resort checker: any occurrence of the selected text near the
//! selection line.

use super::{CheckContext, CheckResult};

pub fn wandering_expression(ctx: &CheckContext) -> CheckResult {
    let Some((start, end)) = ctx.located else {
        return CheckResult::unmatched();
    };
    match ctx.tree.smallest_containing(start, end) {
        Some(node) => CheckResult::hit(node),
        None => CheckResult::unmatched(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::test_support::{category, check, fixture};
    use crate::classify::Category;
    use crate::syntax::NodeKind;

    #[test]
    fn test_argument_falls_through_to_fallback() {
        let text = "render(props.title, 2);\n";
        assert_eq!(
            category(text, "js", 0, "props.title"),
            Some(Category::WanderingExpression)
        );
        let fx = fixture(text, "js");
        let node = check(&fx, wandering_expression, 0, "props.title").node.expect("node");
        assert_eq!(fx.tree.kind(node), NodeKind::MemberExpression);
    }

    #[test]
    fn test_text_absent_near_line() {
        let fx = fixture("a;\nb;\nc;\nd;\n", "js");
        assert!(!check(&fx, wandering_expression, 0, "d").matched);
        assert!(check(&fx, wandering_expression, 2, "d").matched);
    }
}
