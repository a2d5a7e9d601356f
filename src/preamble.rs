//! Resolution of preamble declarations into a [`SymbolTable`].
//!
//! The surface parser (out of scope) turns the preamble into an ordered list
//! of [`PreambleLine`]s; this module is the one contract it must satisfy.
//! Dimensions are either decimal literals or single-letter references into
//! the symbol declarations collected from `SymbolLine`s; everything else is
//! a [`MError::BadDimension`].

use std::collections::HashMap;

use crate::error::MError;
use crate::matrix::{Matrix, PropertySet};

/// Maps a single-character matrix name to its resolved descriptor.
pub type SymbolTable = HashMap<char, Matrix>;

/// The unresolved shape of a `MatrixLine` declaration: each dimension is
/// still a raw token (`"100"`, `"n"`, ...) until [`resolve_preamble`] runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixSym {
    pub dim1: String,
    pub dim2: String,
    pub props: PropertySet,
}

impl MatrixSym {
    pub fn new(dim1: impl Into<String>, dim2: impl Into<String>, props: PropertySet) -> Self {
        Self {
            dim1: dim1.into(),
            dim2: dim2.into(),
            props,
        }
    }
}

/// One line of the preamble, already split by the parser into its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreambleLine {
    MatrixLine(char, MatrixSym),
    SymbolLine(char, usize),
    BlankLine,
}

/// Resolves a preamble into a [`SymbolTable`].
///
/// `SymbolLine`s are collected first (duplicate names last-writer-wins),
/// then each `MatrixLine`'s dimensions are resolved against them. Duplicate
/// `MatrixLine` names are also last-writer-wins, since the result is a
/// mapping keyed by name.
pub fn resolve_preamble(lines: &[PreambleLine]) -> Result<SymbolTable, MError> {
    let mut symbols: HashMap<char, usize> = HashMap::new();
    for line in lines {
        if let PreambleLine::SymbolLine(name, n) = line {
            symbols.insert(*name, *n);
        }
    }

    let mut table = SymbolTable::new();
    for line in lines {
        if let PreambleLine::MatrixLine(name, sym) = line {
            let rows = resolve_dim(&sym.dim1, &symbols)?;
            let cols = resolve_dim(&sym.dim2, &symbols)?;
            table.insert(*name, Matrix::new(rows, cols, sym.props));
        }
    }
    Ok(table)
}

fn resolve_dim(token: &str, symbols: &HashMap<char, usize>) -> Result<usize, MError> {
    if let Ok(n) = token.parse::<usize>() {
        return Ok(n);
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            symbols.get(&c).copied().ok_or(MError::UnboundName(c))
        }
        _ => Err(MError::BadDimension(token.to_string())),
    }
}
