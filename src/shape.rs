//! Shape and property inference.
//!
//! `descriptor_of` recurses structurally over an [`Expr`] and a
//! [`SymbolTable`] to produce the [`Matrix`] descriptor of any
//! sub-expression, or the first [`MError`] encountered. This is the one pass
//! every other component (preprocessing, the cost model, the rewriter)
//! consults. Each arm below checks sizes, checks property prerequisites, and
//! computes the output size and property set, in that order.

use crate::error::MError;
use crate::expr::{BinaryOp, Expr, TernaryOp, UnaryOp};
use crate::matrix::{MProperty, Matrix, PropertySet};
use crate::preamble::SymbolTable;

pub fn descriptor_of(expr: &Expr, table: &SymbolTable) -> Result<Matrix, MError> {
    match expr {
        Expr::Leaf(name) => table.get(name).cloned().ok_or(MError::UnboundName(*name)),
        Expr::IdentityLeaf(n) => Ok(Matrix::identity(*n)),
        Expr::LiteralScalar(_) => Ok(Matrix::scalar()),
        Expr::Branch1(op, t) => descriptor_branch1(*op, t, table),
        Expr::Branch2(op, l, r) => descriptor_branch2(*op, l, r, table),
        Expr::Branch3(TernaryOp::TernaryProduct, a, b, c) => descriptor_branch3(a, b, c, table),
        Expr::Let { name, rhs, body, .. } => {
            let rhs_descr = descriptor_of(rhs, table)?;
            let mut inner = table.clone();
            inner.insert(*name, rhs_descr);
            descriptor_of(body, &inner)
        }
    }
}

fn descriptor_branch1(op: UnaryOp, t: &Expr, table: &SymbolTable) -> Result<Matrix, MError> {
    let m = descriptor_of(t, table)?;
    match op {
        UnaryOp::Inverse => {
            if !m.is_square() {
                return Err(MError::invalid_op("Inverse", m));
            }
            let props = m.props.restrict_to([
                MProperty::Diagonal,
                MProperty::Symmetric,
                MProperty::PosDef,
                MProperty::LowerTriangular,
            ]);
            Ok(Matrix::new(m.rows, m.cols, props))
        }
        UnaryOp::Transpose => {
            let props = m
                .props
                .restrict_to([MProperty::Diagonal, MProperty::Symmetric, MProperty::PosDef]);
            Ok(Matrix::new(m.cols, m.rows, props))
        }
        UnaryOp::Negate => {
            if !m.is_square() {
                return Err(MError::invalid_op("Negate", m));
            }
            let props = m.props.restrict_to([MProperty::Diagonal, MProperty::Symmetric]);
            Ok(Matrix::new(m.rows, m.cols, props))
        }
        UnaryOp::Chol => {
            if !m.is_square() {
                return Err(MError::invalid_op("Chol", m));
            }
            if !m.props.contains(MProperty::PosDef) {
                return Err(MError::wrong_properties1("Chol", m.props, t));
            }
            let mut props = PropertySet::new();
            props.insert(MProperty::LowerTriangular);
            if m.props.contains(MProperty::Diagonal) {
                props.insert(MProperty::Diagonal);
            }
            Ok(Matrix::new(m.rows, m.cols, props))
        }
    }
}

fn descriptor_branch2(op: BinaryOp, l: &Expr, r: &Expr, table: &SymbolTable) -> Result<Matrix, MError> {
    let lm = descriptor_of(l, table)?;
    let rm = descriptor_of(r, table)?;
    match op {
        BinaryOp::Product => {
            if lm.cols != rm.rows {
                return Err(MError::size_mismatch("Product", lm, rm, l, r));
            }
            let props = product_props(l, &lm, r, &rm);
            Ok(Matrix::new(lm.rows, rm.cols, props))
        }
        BinaryOp::ScalarProduct => {
            if !(lm.rows == 1 && lm.cols == 1) {
                // Kept as `Product` in the diagnostic to match the reference
                // implementation's labeling, even though the node is a
                // ScalarProduct internally.
                return Err(MError::size_mismatch("Product", lm, rm, l, r));
            }
            let props = rm
                .props
                .restrict_to([MProperty::Symmetric, MProperty::Diagonal, MProperty::LowerTriangular]);
            Ok(Matrix::new(rm.rows, rm.cols, props))
        }
        BinaryOp::Sum => {
            if lm.rows != rm.rows || lm.cols != rm.cols {
                return Err(MError::size_mismatch("Sum", lm, rm, l, r));
            }
            let props = lm.props.intersect(rm.props).restrict_to([
                MProperty::Diagonal,
                MProperty::Symmetric,
                MProperty::PosDef,
                MProperty::LowerTriangular,
            ]);
            Ok(Matrix::new(lm.rows, lm.cols, props))
        }
        BinaryOp::LinSolve => {
            if !lm.is_square() || lm.rows != rm.rows {
                return Err(MError::size_mismatch("LinSolve", lm, rm, l, r));
            }
            Ok(Matrix::new(lm.cols, rm.cols, PropertySet::new()))
        }
        BinaryOp::CholSolve => {
            if !lm.is_square() || lm.rows != rm.rows {
                return Err(MError::size_mismatch("CholSolve", lm, rm, l, r));
            }
            if !lm.props.contains(MProperty::LowerTriangular) {
                return Err(MError::wrong_properties("CholSolve", lm.props, rm.props, l, r));
            }
            Ok(Matrix::new(lm.cols, rm.cols, PropertySet::new()))
        }
    }
}

fn descriptor_branch3(a: &Expr, b: &Expr, c: &Expr, table: &SymbolTable) -> Result<Matrix, MError> {
    let am = descriptor_of(a, table)?;
    let bm = descriptor_of(b, table)?;
    let cm = descriptor_of(c, table)?;
    if am.cols != bm.rows || bm.cols != cm.rows {
        return Err(MError::size_mismatch_tern("TernaryProduct", am, bm, cm));
    }
    let props = ternary_product_props(a, &am, b, &bm, c, &cm);
    Ok(Matrix::new(am.rows, cm.cols, props))
}

/// Property inference for `Product(l, r)`: the closed intersection of
/// `Diagonal`/`LowerTriangular`, plus a syntactic positive-definiteness test
/// on `l == Transpose(r)` or `r == Transpose(l)`. A positive PD test also
/// implies `Symmetric`, to preserve the descriptor invariant that `PosDef`
/// never appears without it.
fn product_props(l: &Expr, lm: &Matrix, r: &Expr, rm: &Matrix) -> PropertySet {
    let mut closed = lm
        .props
        .intersect(rm.props)
        .restrict_to([MProperty::Diagonal, MProperty::LowerTriangular]);
    if l.is_transpose_of(r) || r.is_transpose_of(l) {
        closed.insert(MProperty::PosDef);
        closed.insert(MProperty::Symmetric);
    }
    closed
}

/// Property inference for `TernaryProduct(a, b, c)`: the closed
/// intersection across all three operands, as if reduced to two sequential
/// products, plus the five syntactic positive-definiteness patterns on
/// `(a, b, c)`.
fn ternary_product_props(
    a: &Expr,
    am: &Matrix,
    b: &Expr,
    bm: &Matrix,
    c: &Expr,
    cm: &Matrix,
) -> PropertySet {
    let closed = am
        .props
        .intersect(bm.props)
        .intersect(cm.props)
        .restrict_to([MProperty::Diagonal, MProperty::LowerTriangular]);

    let b_posdef = bm.props.contains(MProperty::PosDef);
    let pd = (a.is_transpose_of(c) && b_posdef)
        || (c.is_transpose_of(a) && b_posdef)
        || (a.is_inverse_of(c) && b_posdef)
        || (c.is_inverse_of(a) && b_posdef)
        || (am.props.contains(MProperty::PosDef) && b_posdef && a == c);

    if pd {
        closed.union(PropertySet::from_props([MProperty::PosDef, MProperty::Symmetric]))
    } else {
        closed
    }
}
