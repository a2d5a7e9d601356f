//! Preprocessing: identity-leaf size inference and scalar-product
//! reclassification.
//!
//! Runs once, before the rewriter ever sees the tree, so that every later
//! pass can assume `Leaf('I')` never occurs and that `Product` nodes with a
//! 1x1 operand are already tagged `ScalarProduct`. Both normalizations are
//! purely local: a `Branch2` looks only at its own two (already-preprocessed)
//! children.

use crate::error::MError;
use crate::expr::{BinaryOp, Expr};
use crate::matrix::Matrix;
use crate::preamble::SymbolTable;
use crate::shape::descriptor_of;

/// Runs the preprocessor and rejects any `Leaf('I')` that survived without
/// being resolved to a concrete [`Expr::IdentityLeaf`]: an identity leaf
/// with no contextual size is illegal.
pub fn preprocess(expr: Expr, table: &SymbolTable) -> Result<Expr, MError> {
    let out = preprocess_rec(expr, table)?;
    if contains_bare_identity(&out) {
        return Err(MError::AnalysisError(
            "identity leaf 'I' has no contextual size".to_string(),
        ));
    }
    Ok(out)
}

fn contains_bare_identity(e: &Expr) -> bool {
    match e {
        Expr::Leaf(c) => *c == 'I',
        Expr::IdentityLeaf(_) | Expr::LiteralScalar(_) => false,
        Expr::Branch1(_, t) => contains_bare_identity(t),
        Expr::Branch2(_, l, r) => contains_bare_identity(l) || contains_bare_identity(r),
        Expr::Branch3(_, a, b, c) => {
            contains_bare_identity(a) || contains_bare_identity(b) || contains_bare_identity(c)
        }
        Expr::Let { rhs, body, .. } => contains_bare_identity(rhs) || contains_bare_identity(body),
    }
}

fn preprocess_rec(expr: Expr, table: &SymbolTable) -> Result<Expr, MError> {
    match expr {
        Expr::Leaf(_) | Expr::IdentityLeaf(_) | Expr::LiteralScalar(_) => Ok(expr),
        Expr::Branch1(op, t) => {
            let t2 = preprocess_rec(*t, table)?;
            Ok(Expr::Branch1(op, Box::new(t2)))
        }
        Expr::Branch2(op, l, r) => {
            let l2 = preprocess_rec(*l, table)?;
            let r2 = preprocess_rec(*r, table)?;
            let (l3, r3) = infer_identity(op, l2, r2, table)?;
            reclassify_scalar_product(op, l3, r3, table)
        }
        Expr::Branch3(..) => Err(MError::AnalysisError(
            "a ternary product may not appear in parser input".to_string(),
        )),
        Expr::Let { name, rhs, is_temp, body } => {
            let rhs2 = preprocess_rec(*rhs, table)?;
            let descr = descriptor_of(&rhs2, table)?;
            let mut inner = table.clone();
            inner.insert(name, descr);
            let body2 = preprocess_rec(*body, &inner)?;
            Ok(Expr::Let {
                name,
                rhs: Box::new(rhs2),
                is_temp,
                body: Box::new(body2),
            })
        }
    }
}

fn is_bare_i(e: &Expr) -> bool {
    matches!(e, Expr::Leaf(c) if *c == 'I')
}

/// Replaces a `Leaf('I')` operand of a `Branch2` with an [`Expr::IdentityLeaf`]
/// of the size dictated by the operator and the side it appears on.
fn infer_identity(op: BinaryOp, l: Expr, r: Expr, table: &SymbolTable) -> Result<(Expr, Expr), MError> {
    match (is_bare_i(&l), is_bare_i(&r)) {
        (true, true) => Err(MError::AnalysisError(
            "identity leaf 'I' on both sides of an operator cannot be sized".to_string(),
        )),
        (false, false) => Ok((l, r)),
        (true, false) => {
            let m = descriptor_of(&r, table)?;
            let n = identity_size_left(op, &m)?;
            Ok((Expr::IdentityLeaf(n), r))
        }
        (false, true) => {
            let m = descriptor_of(&l, table)?;
            let n = identity_size_right(op, &m)?;
            Ok((l, Expr::IdentityLeaf(n)))
        }
    }
}

fn identity_size_right(op: BinaryOp, m: &Matrix) -> Result<usize, MError> {
    match op {
        BinaryOp::Product => Ok(m.cols),
        BinaryOp::Sum => Ok(m.rows),
        BinaryOp::LinSolve | BinaryOp::CholSolve => Ok(m.rows),
        BinaryOp::ScalarProduct => Err(MError::AnalysisError(
            "identity leaf 'I' is not valid as a scalar-product operand".to_string(),
        )),
    }
}

fn identity_size_left(op: BinaryOp, m: &Matrix) -> Result<usize, MError> {
    match op {
        BinaryOp::Product => Ok(m.rows),
        BinaryOp::Sum => Ok(m.rows),
        BinaryOp::LinSolve | BinaryOp::CholSolve => Ok(m.cols),
        BinaryOp::ScalarProduct => Err(MError::AnalysisError(
            "identity leaf 'I' is not valid as a scalar-product operand".to_string(),
        )),
    }
}

/// Reclassifies `Product(l, r)` into `ScalarProduct` when one operand's
/// shape is 1x1. Non-`Product` operators pass through unchanged, so
/// this is idempotent: a `ScalarProduct` node is never revisited.
fn reclassify_scalar_product(op: BinaryOp, l: Expr, r: Expr, table: &SymbolTable) -> Result<Expr, MError> {
    if op != BinaryOp::Product {
        return Ok(Expr::Branch2(op, Box::new(l), Box::new(r)));
    }
    let lm = descriptor_of(&l, table)?;
    if lm.rows == 1 && lm.cols == 1 {
        return Ok(Expr::Branch2(BinaryOp::ScalarProduct, Box::new(l), Box::new(r)));
    }
    let rm = descriptor_of(&r, table)?;
    if rm.rows == 1 && rm.cols == 1 {
        return Ok(Expr::Branch2(BinaryOp::ScalarProduct, Box::new(r), Box::new(l)));
    }
    Ok(Expr::Branch2(BinaryOp::Product, Box::new(l), Box::new(r)))
}
