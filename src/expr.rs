//! The typed expression tree.
//!
//! `Expr` is the sum type every other component walks: shape inference
//! recurses over it to produce a [`crate::matrix::Matrix`], the preprocessor
//! rewrites it locally, and the rewriter enumerates whole trees reachable
//! from it. Structural equality and a total, deterministic ordering are
//! required for the tabu set and for breaking ties between equal-cost trees
//! (see [`crate::rewrite`]); deriving `Eq`/`Hash`/`Ord` on the tree gives us
//! both for free, since every leaf field (`char`, `usize`, `bool`,
//! `OrderedFloat<f64>`) is already totally ordered.

use ordered_float::OrderedFloat;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unary operators, i.e. `Branch1(op, child)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOp {
    Inverse,
    Transpose,
    Negate,
    Chol,
}

/// Binary operators, i.e. `Branch2(op, left, right)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinaryOp {
    Product,
    ScalarProduct,
    Sum,
    LinSolve,
    CholSolve,
}

/// Ternary operators, i.e. `Branch3(op, a, b, c)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TernaryOp {
    TernaryProduct,
}

/// A linear-algebra expression.
///
/// `Let(name, rhs, is_temp, body)` shadows `name` within `body` only;
/// `is_temp` is not interpreted anywhere in this crate, it is carried through
/// purely as an annotation for the (out of scope) code emitter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    Leaf(char),
    IdentityLeaf(usize),
    LiteralScalar(OrderedFloat<f64>),
    Branch1(UnaryOp, Box<Expr>),
    Branch2(BinaryOp, Box<Expr>, Box<Expr>),
    Branch3(TernaryOp, Box<Expr>, Box<Expr>, Box<Expr>),
    Let {
        name: char,
        rhs: Box<Expr>,
        is_temp: bool,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn leaf(name: char) -> Self {
        Expr::Leaf(name)
    }

    pub fn identity(n: usize) -> Self {
        Expr::IdentityLeaf(n)
    }

    pub fn scalar(x: f64) -> Self {
        Expr::LiteralScalar(OrderedFloat(x))
    }

    pub fn inverse(e: Expr) -> Self {
        Expr::Branch1(UnaryOp::Inverse, Box::new(e))
    }

    pub fn transpose(e: Expr) -> Self {
        Expr::Branch1(UnaryOp::Transpose, Box::new(e))
    }

    pub fn negate(e: Expr) -> Self {
        Expr::Branch1(UnaryOp::Negate, Box::new(e))
    }

    pub fn chol(e: Expr) -> Self {
        Expr::Branch1(UnaryOp::Chol, Box::new(e))
    }

    pub fn product(l: Expr, r: Expr) -> Self {
        Expr::Branch2(BinaryOp::Product, Box::new(l), Box::new(r))
    }

    pub fn scalar_product(alpha: Expr, m: Expr) -> Self {
        Expr::Branch2(BinaryOp::ScalarProduct, Box::new(alpha), Box::new(m))
    }

    pub fn sum(l: Expr, r: Expr) -> Self {
        Expr::Branch2(BinaryOp::Sum, Box::new(l), Box::new(r))
    }

    pub fn lin_solve(a: Expr, b: Expr) -> Self {
        Expr::Branch2(BinaryOp::LinSolve, Box::new(a), Box::new(b))
    }

    pub fn chol_solve(a: Expr, b: Expr) -> Self {
        Expr::Branch2(BinaryOp::CholSolve, Box::new(a), Box::new(b))
    }

    pub fn ternary_product(a: Expr, b: Expr, c: Expr) -> Self {
        Expr::Branch3(
            TernaryOp::TernaryProduct,
            Box::new(a),
            Box::new(b),
            Box::new(c),
        )
    }

    pub fn let_(name: char, rhs: Expr, is_temp: bool, body: Expr) -> Self {
        Expr::Let {
            name,
            rhs: Box::new(rhs),
            is_temp,
            body: Box::new(body),
        }
    }

    /// `true` if `self` is syntactically `Transpose(of)`.
    pub fn is_transpose_of(&self, of: &Expr) -> bool {
        matches!(self, Expr::Branch1(UnaryOp::Transpose, inner) if inner.as_ref() == of)
    }

    /// `true` if `self` is syntactically `Inverse(of)`.
    pub fn is_inverse_of(&self, of: &Expr) -> bool {
        matches!(self, Expr::Branch1(UnaryOp::Inverse, inner) if inner.as_ref() == of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality_ignores_identity() {
        let a = Expr::product(Expr::leaf('A'), Expr::leaf('B'));
        let b = Expr::product(Expr::leaf('A'), Expr::leaf('B'));
        assert_eq!(a, b);
    }

    #[test]
    fn transpose_pattern_detection() {
        let a = Expr::leaf('A');
        let at = Expr::transpose(Expr::leaf('A'));
        assert!(at.is_transpose_of(&a));
        assert!(!a.is_transpose_of(&at));
    }

    #[test]
    fn ordering_is_total_and_deterministic() {
        let a = Expr::leaf('A');
        let b = Expr::leaf('B');
        assert!(a < b);
        assert_eq!(a.cmp(&a.clone()), std::cmp::Ordering::Equal);
    }
}
