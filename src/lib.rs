//! Compile-time optimizer for linear-algebra expressions: given a symbolic
//! expression tree over matrix/vector operands and their structural
//! properties, finds an equivalent tree with the lowest [`cost::flops`]
//! estimate reachable by the [`rewrite`] rule set.

pub mod cost;
pub mod emit;
pub mod error;
pub mod expr;
pub mod matrix;
pub mod preamble;
pub mod preprocess;
pub mod rewrite;
pub mod shape;

#[cfg(test)]
pub mod tests;

pub use cost::flops;
pub use emit::emit;
pub use error::MError;
pub use expr::{BinaryOp, Expr, TernaryOp, UnaryOp};
pub use matrix::{MProperty, Matrix, PropertySet};
pub use preamble::{resolve_preamble, MatrixSym, PreambleLine, SymbolTable};
pub use preprocess::preprocess;
pub use rewrite::optimize;
pub use shape::descriptor_of;
