//! Matrix descriptors and the structural-property bitset.
//!
//! A [`Matrix`] is the static type of a sub-expression: a row count, a column
//! count, and a set of the four [`MProperty`] flags the analysis tracks.
//! Properties are represented as a small bitset ([`PropertySet`]) rather than
//! a `HashSet` so that intersection/union are single bitwise ops and the type
//! is cheap to embed in every descriptor and error value.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A structural property of a matrix.
///
/// Rendered in the canonical order `Symmetric, PosDef, Diagonal,
/// LowerTriangular` whenever a [`PropertySet`] is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MProperty {
    Symmetric,
    PosDef,
    Diagonal,
    LowerTriangular,
}

impl MProperty {
    const ALL_IN_ORDER: [MProperty; 4] = [
        MProperty::Symmetric,
        MProperty::PosDef,
        MProperty::Diagonal,
        MProperty::LowerTriangular,
    ];

    fn bit(self) -> u8 {
        match self {
            MProperty::Symmetric => 0b0001,
            MProperty::PosDef => 0b0010,
            MProperty::Diagonal => 0b0100,
            MProperty::LowerTriangular => 0b1000,
        }
    }
}

impl fmt::Display for MProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MProperty::Symmetric => "symmetric",
            MProperty::PosDef => "posdef",
            MProperty::Diagonal => "diag",
            MProperty::LowerTriangular => "lower_triangular",
        };
        f.write_str(s)
    }
}

/// A bitset over the four [`MProperty`] flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertySet(u8);

impl PropertySet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn contains(&self, p: MProperty) -> bool {
        self.0 & p.bit() != 0
    }

    pub fn insert(&mut self, p: MProperty) {
        self.0 |= p.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn intersect(&self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Keeps only the flags in `allowed`, dropping the rest.
    pub fn restrict_to(&self, allowed: impl IntoIterator<Item = MProperty>) -> Self {
        let mask = allowed.into_iter().fold(0u8, |acc, p| acc | p.bit());
        Self(self.0 & mask)
    }

    pub fn from_props(props: impl IntoIterator<Item = MProperty>) -> Self {
        let mut set = Self::new();
        for p in props {
            set.insert(p);
        }
        set
    }

    pub fn iter(&self) -> impl Iterator<Item = MProperty> + '_ {
        MProperty::ALL_IN_ORDER
            .into_iter()
            .filter(move |p| self.contains(*p))
    }
}

impl fmt::Display for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, p) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str("}")
    }
}

/// The static shape and structural properties of a sub-expression.
///
/// Invariants (enforced by construction, never by a runtime check):
/// - `Diagonal` or `Symmetric` implies `rows == cols`.
/// - `PosDef` implies `rows == cols` and `Symmetric`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub props: PropertySet,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize, props: PropertySet) -> Self {
        Self { rows, cols, props }
    }

    /// The descriptor of an `n`×`n` identity matrix: symmetric, positive
    /// definite, diagonal, and (trivially) lower triangular.
    pub fn identity(n: usize) -> Self {
        Self::new(
            n,
            n,
            PropertySet::from_props([
                MProperty::Symmetric,
                MProperty::PosDef,
                MProperty::Diagonal,
                MProperty::LowerTriangular,
            ]),
        )
    }

    /// The descriptor of a 1×1 scalar literal.
    pub fn scalar() -> Self {
        Self::new(
            1,
            1,
            PropertySet::from_props([
                MProperty::Symmetric,
                MProperty::Diagonal,
                MProperty::LowerTriangular,
            ]),
        )
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}", self.rows, self.cols, self.props)
    }
}
