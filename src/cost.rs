//! The FLOP cost model.
//!
//! `flops` assigns every node a non-negative integer cost by combining its
//! own arithmetic work (computed from the shapes of its children, via
//! [`descriptor_of`]) with the recursive cost of those children. All
//! divisions are truncating integer division, as specified.

use crate::error::MError;
use crate::expr::{BinaryOp, Expr, TernaryOp, UnaryOp};
use crate::matrix::MProperty;
use crate::preamble::SymbolTable;
use crate::shape::descriptor_of;

pub fn flops(expr: &Expr, table: &SymbolTable) -> Result<u64, MError> {
    match expr {
        Expr::Leaf(_) | Expr::LiteralScalar(_) => Ok(0),
        Expr::IdentityLeaf(n) => Ok((*n as u64) * (*n as u64)),
        Expr::Branch1(op, t) => flops_branch1(*op, t, table),
        Expr::Branch2(op, l, r) => flops_branch2(*op, l, r, table),
        Expr::Branch3(TernaryOp::TernaryProduct, a, b, c) => {
            // flops(TernaryProduct(a,b,c)) = flops(Product(Product(a,b), c)).
            let ab = Expr::product((**a).clone(), (**b).clone());
            let full = Expr::product(ab, (**c).clone());
            flops(&full, table)
        }
        Expr::Let { name, rhs, body, .. } => {
            let f_rhs = flops(rhs, table)?;
            let descr = descriptor_of(rhs, table)?;
            let mut inner = table.clone();
            inner.insert(*name, descr);
            let f_body = flops(body, &inner)?;
            Ok(f_rhs + f_body + 1)
        }
    }
}

fn flops_branch1(op: UnaryOp, t: &Expr, table: &SymbolTable) -> Result<u64, MError> {
    let f_t = flops(t, table)?;
    match op {
        UnaryOp::Transpose => Ok(f_t + 1),
        UnaryOp::Negate => Ok(f_t),
        UnaryOp::Inverse => {
            let m = descriptor_of(t, table)?;
            let r = m.rows as u64;
            let cost = if m.props.contains(MProperty::LowerTriangular) {
                (r * r + r) / 2
            } else {
                (3 * r * r * r) / 4
            };
            Ok(cost + f_t)
        }
        UnaryOp::Chol => {
            let m = descriptor_of(t, table)?;
            let r = m.rows as u64;
            Ok(r * r * r / 3 + f_t)
        }
    }
}

fn flops_branch2(op: BinaryOp, l: &Expr, r: &Expr, table: &SymbolTable) -> Result<u64, MError> {
    let f_l = flops(l, table)?;
    let f_r = flops(r, table)?;
    let lm = descriptor_of(l, table)?;
    let rm = descriptor_of(r, table)?;
    let cost = match op {
        BinaryOp::Product => {
            let (r1, c1, c2) = (lm.rows as u64, lm.cols as u64, rm.cols as u64);
            r1 * c2 * (2 * c1 - 1)
        }
        BinaryOp::ScalarProduct => (rm.rows as u64) * (rm.cols as u64),
        BinaryOp::Sum => (lm.rows as u64) * (lm.cols as u64),
        BinaryOp::LinSolve => {
            let (rr, cc) = (lm.rows as u64, rm.cols as u64);
            2 * (rr * rr * rr / 3 + cc * rr * rr)
        }
        BinaryOp::CholSolve => {
            let (rr, cc) = (lm.rows as u64, rm.cols as u64);
            2 * cc * rr * rr
        }
    };
    Ok(cost + f_l + f_r)
}
