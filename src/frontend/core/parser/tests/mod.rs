//! Parser tests

mod declarations;

use super::*;

/// Parse `source` and fail the test on any error
pub(super) fn parse_ok(source: &str) -> Vec<Node> {
    let (nodes, errors) = parse_all(source);
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    nodes
}

/// The wrapped expression of the single anonymous form in `source`
pub(super) fn anon_expr(source: &str) -> Expr {
    let nodes = parse_ok(source);
    match nodes.as_slice() {
        [Node::Anon(anon)] => anon.expr.clone(),
        other => panic!("expected one anonymous expression, got {:?}", other),
    }
}

/// Render an expression fully parenthesized
pub(super) fn render(expr: &Expr) -> String {
    match expr {
        Expr::IntLiteral { value, .. } => value.to_string(),
        Expr::FloatLiteral { value, .. } => format!("{:?}", value),
        Expr::Variable { name, .. } => name.clone(),
        Expr::BinaryOp { op, lhs, rhs, .. } => {
            format!("({} {} {})", render(lhs), op.symbol(), render(rhs))
        }
        Expr::Call { callee, args, .. } => {
            let args: Vec<String> = args.iter().map(render).collect();
            format!("{}({})", callee, args.join(", "))
        }
        Expr::Conditional {
            condition,
            then_branch,
            else_branch,
            ..
        } => format!(
            "if {} then {} else {}",
            render(condition),
            render(then_branch),
            render(else_branch)
        ),
        Expr::EndOfInput => "<eof>".to_string(),
    }
}
