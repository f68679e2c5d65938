//! ASCII tree rendering of expressions
//!
//! ```text
//! └── BINARY_OP(+)
//!     ├── NUMBER(2)
//!     └── BINARY_OP(*)
//!         ├── NUMBER(3)
//!         └── NUMBER(4)
//! ```

use crate::ast::Expr;

/// Render `expr` as a box-drawing tree, one line per node
pub fn render(expr: &Expr) -> String {
    let mut lines = Vec::new();
    render_node(expr, "", true, &mut lines);
    lines.join("\n")
}

fn render_node(expr: &Expr, prefix: &str, is_last: bool, lines: &mut Vec<String>) {
    let connector = if is_last { "└── " } else { "├── " };
    lines.push(format!("{}{}{}", prefix, connector, label(expr)));

    let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
    let children = children(expr);
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        render_node(child, &child_prefix, i + 1 == count, lines);
    }
}

fn label(expr: &Expr) -> String {
    match expr {
        Expr::Number(n) => format!("NUMBER({})", n),
        Expr::Variable(name) => format!("VARIABLE({})", name),
        Expr::Unary { op, .. } => format!("UNARY_OP({})", op.symbol()),
        Expr::Binary { op, .. } => format!("BINARY_OP({})", op.symbol()),
        Expr::Assign { name, .. } => format!("ASSIGNMENT({})", name),
    }
}

fn children(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::Number(_) | Expr::Variable(_) => Vec::new(),
        Expr::Unary { operand, .. } => vec![operand.as_ref()],
        Expr::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        Expr::Assign { value, .. } => vec![value.as_ref()],
    }
}
