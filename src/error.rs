//! The error taxonomy shared by every analysis pass.
//!
//! Every fallible operation in this crate returns `Result<_, MError>`; the
//! first error encountered on any path aborts the enclosing computation and
//! is surfaced unchanged; there is no recovery or partial result.

use derive_more::{Display, Error};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::matrix::{Matrix, PropertySet};

/// The full error taxonomy for preamble resolution, shape/property
/// inference, preprocessing, cost estimation, and rewriting.
#[derive(Debug, Display, Error, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MError {
    #[display("{op}: incompatible operand shapes {m1} and {m2} (in `{t1:?}` and `{t2:?}`)")]
    SizeMismatch {
        op: String,
        m1: Matrix,
        m2: Matrix,
        t1: Box<Expr>,
        t2: Box<Expr>,
    },

    #[display("{op}: operand shapes {m1}, {m2}, {m3} do not chain")]
    SizeMismatchTern {
        op: String,
        m1: Matrix,
        m2: Matrix,
        m3: Matrix,
    },

    #[display("{op} is not defined on a {m}")]
    InvalidOp { op: String, m: Matrix },

    #[display("{op}: properties {p1} / {p2} do not satisfy the operator's prerequisite (in `{t1:?}` and `{t2:?}`)")]
    WrongProperties {
        op: String,
        p1: PropertySet,
        p2: PropertySet,
        t1: Box<Expr>,
        t2: Box<Expr>,
    },

    #[display("{op}: properties {p} do not satisfy the operator's prerequisite (in `{t:?}`)")]
    WrongProperties1 {
        op: String,
        p: PropertySet,
        t: Box<Expr>,
    },

    #[display("unbound name '{_0}'")]
    UnboundName(char),

    #[display("bad dimension token '{_0}'")]
    BadDimension(String),

    #[display("analysis error: {_0}")]
    AnalysisError(String),

    #[display("parser error: {_0}")]
    ParserError(String),
}

impl MError {
    pub fn size_mismatch(op: impl Into<String>, m1: Matrix, m2: Matrix, t1: &Expr, t2: &Expr) -> Self {
        MError::SizeMismatch {
            op: op.into(),
            m1,
            m2,
            t1: Box::new(t1.clone()),
            t2: Box::new(t2.clone()),
        }
    }

    pub fn size_mismatch_tern(op: impl Into<String>, m1: Matrix, m2: Matrix, m3: Matrix) -> Self {
        MError::SizeMismatchTern {
            op: op.into(),
            m1,
            m2,
            m3,
        }
    }

    pub fn invalid_op(op: impl Into<String>, m: Matrix) -> Self {
        MError::InvalidOp { op: op.into(), m }
    }

    pub fn wrong_properties(
        op: impl Into<String>,
        p1: PropertySet,
        p2: PropertySet,
        t1: &Expr,
        t2: &Expr,
    ) -> Self {
        MError::WrongProperties {
            op: op.into(),
            p1,
            p2,
            t1: Box::new(t1.clone()),
            t2: Box::new(t2.clone()),
        }
    }

    pub fn wrong_properties1(op: impl Into<String>, p: PropertySet, t: &Expr) -> Self {
        MError::WrongProperties1 {
            op: op.into(),
            p,
            t: Box::new(t.clone()),
        }
    }
}
