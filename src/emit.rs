//! Renders an [`Expr`] as a NumPy/SciPy expression string.
//!
//! This is a pure, total function: every node kind has a rendering, so
//! `emit` never fails. Parenthesization is driven by a simple per-operator
//! precedence so that `emit` round-trips through a hypothetical parser
//! without inserting parentheses around atoms.

use crate::expr::{BinaryOp, Expr, TernaryOp, UnaryOp};

/// Binding power used only to decide when a child needs parentheses; not a
/// general grammar.
fn precedence(e: &Expr) -> u8 {
    match e {
        Expr::Leaf(_) | Expr::IdentityLeaf(_) | Expr::LiteralScalar(_) => 10,
        Expr::Branch1(UnaryOp::Transpose, _) => 9,
        Expr::Branch1(UnaryOp::Inverse | UnaryOp::Chol, _) => 10,
        Expr::Branch1(UnaryOp::Negate, _) => 3,
        Expr::Branch2(BinaryOp::Product | BinaryOp::ScalarProduct, _, _) => 5,
        Expr::Branch2(BinaryOp::Sum, _, _) => 2,
        Expr::Branch2(BinaryOp::LinSolve | BinaryOp::CholSolve, _, _) => 10,
        Expr::Branch3(TernaryOp::TernaryProduct, ..) => 5,
        Expr::Let { .. } => 0,
    }
}

fn emit_child(e: &Expr, min_prec: u8) -> String {
    let s = emit(e);
    if precedence(e) < min_prec {
        format!("({s})")
    } else {
        s
    }
}

/// Renders `expr` as an executable NumPy/SciPy expression.
pub fn emit(expr: &Expr) -> String {
    match expr {
        Expr::Leaf(name) => name.to_string(),
        Expr::IdentityLeaf(n) => format!("np.eye({n})"),
        Expr::LiteralScalar(x) => format!("{}", x.into_inner()),
        Expr::Branch1(UnaryOp::Inverse, t) => format!("np.linalg.inv({})", emit(t)),
        Expr::Branch1(UnaryOp::Transpose, t) => format!("{}.T", emit_child(t, 9)),
        Expr::Branch1(UnaryOp::Negate, t) => format!("-{}", emit_child(t, 4)),
        Expr::Branch1(UnaryOp::Chol, t) => format!("np.linalg.cholesky({})", emit(t)),
        Expr::Branch2(BinaryOp::Product, l, r) => {
            format!("np.dot({}, {})", emit(l), emit(r))
        }
        Expr::Branch2(BinaryOp::ScalarProduct, l, r) => {
            format!("{} * {}", emit_child(l, 5), emit_child(r, 5))
        }
        Expr::Branch2(BinaryOp::Sum, l, r) => {
            format!("{} + {}", emit_child(l, 2), emit_child(r, 3))
        }
        Expr::Branch2(BinaryOp::LinSolve, l, r) => {
            format!("np.linalg.solve({}, {})", emit(l), emit(r))
        }
        Expr::Branch2(BinaryOp::CholSolve, l, r) => {
            format!("scipy.linalg.cho_solve(({}, True), {})", emit(l), emit(r))
        }
        Expr::Branch3(TernaryOp::TernaryProduct, a, b, c) => {
            format!("np.linalg.multi_dot([{}, {}, {}])", emit(a), emit(b), emit(c))
        }
        Expr::Let { name, rhs, body, .. } => {
            format!("(lambda {name}: {})({})", emit(body), emit(rhs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_emits_its_name() {
        assert_eq!(emit(&Expr::leaf('A')), "A");
    }

    #[test]
    fn product_emits_np_dot() {
        let e = Expr::product(Expr::leaf('A'), Expr::leaf('B'));
        assert_eq!(emit(&e), "np.dot(A, B)");
    }

    #[test]
    fn inverse_emits_np_linalg_inv() {
        let e = Expr::inverse(Expr::leaf('A'));
        assert_eq!(emit(&e), "np.linalg.inv(A)");
    }

    #[test]
    fn transpose_is_postfix() {
        let e = Expr::transpose(Expr::leaf('A'));
        assert_eq!(emit(&e), "A.T");
    }

    #[test]
    fn negate_parenthesizes_a_sum_operand() {
        let e = Expr::negate(Expr::sum(Expr::leaf('A'), Expr::leaf('B')));
        assert_eq!(emit(&e), "-(A + B)");
    }

    #[test]
    fn sum_of_products_needs_no_parens() {
        let e = Expr::sum(
            Expr::product(Expr::leaf('A'), Expr::leaf('B')),
            Expr::leaf('C'),
        );
        assert_eq!(emit(&e), "np.dot(A, B) + C");
    }

    #[test]
    fn ternary_product_emits_multi_dot() {
        let e = Expr::ternary_product(Expr::leaf('A'), Expr::leaf('B'), Expr::leaf('C'));
        assert_eq!(emit(&e), "np.linalg.multi_dot([A, B, C])");
    }

    #[test]
    fn identity_leaf_emits_np_eye() {
        assert_eq!(emit(&Expr::identity(5)), "np.eye(5)");
    }
}
