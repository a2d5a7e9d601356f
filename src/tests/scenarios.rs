//! End-to-end coverage of the six worked scenarios: preamble resolution
//! feeds preprocessing, which feeds both the cost model and the rewriter,
//! whose output is finally rendered by the emitter.

use std::collections::HashMap;

use rstest::rstest;
use rstest_reuse::{apply, template};

use crate::error::MError;
use crate::expr::Expr;
use crate::matrix::{MProperty, Matrix, PropertySet};
use crate::preamble::{resolve_preamble, MatrixSym, PreambleLine, SymbolTable};
use crate::preprocess::preprocess;
use crate::rewrite::optimize;
use crate::shape::descriptor_of;

fn table(entries: &[(char, Matrix)]) -> SymbolTable {
    let mut t = HashMap::new();
    for (name, m) in entries {
        t.insert(*name, m.clone());
    }
    t
}

#[rstest]
fn s1_vector_matrix_chain_associates_right() {
    let t = table(&[
        ('A', Matrix::new(1000, 1000, PropertySet::new())),
        ('B', Matrix::new(1000, 1000, PropertySet::new())),
        ('x', Matrix::new(1000, 1, PropertySet::new())),
    ]);
    let seed = Expr::product(Expr::product(Expr::leaf('A'), Expr::leaf('B')), Expr::leaf('x'));
    let seed = preprocess(seed, &t).unwrap();
    let (cost, best) = optimize(&seed, &t).unwrap();
    let expected = Expr::product(Expr::leaf('A'), Expr::product(Expr::leaf('B'), Expr::leaf('x')));
    assert_eq!(best, expected);
    assert_eq!(cost, 3_998_000);
    assert_eq!(crate::emit::emit(&best), "np.dot(A, np.dot(B, x))");

    // Rewriting must preserve shape: the seed and the winner describe the
    // same matrix.
    let seed_descr = descriptor_of(&seed, &t).unwrap();
    let best_descr = descriptor_of(&best, &t).unwrap();
    assert_eq!((seed_descr.rows, seed_descr.cols), (best_descr.rows, best_descr.cols));
}

#[rstest]
fn s2_transpose_product_infers_posdef_and_symmetric() {
    let lines = vec![
        PreambleLine::SymbolLine('n', 100),
        PreambleLine::SymbolLine('m', 50),
        PreambleLine::MatrixLine('A', MatrixSym::new("n", "m", PropertySet::new())),
    ];
    let t = resolve_preamble(&lines).unwrap();
    let e = Expr::product(Expr::transpose(Expr::leaf('A')), Expr::leaf('A'));
    let m = descriptor_of(&e, &t).unwrap();
    assert_eq!((m.rows, m.cols), (50, 50));
    assert!(m.props.contains(MProperty::PosDef));
    assert!(m.props.contains(MProperty::Symmetric));
}

#[rstest]
fn s3_common_factor_is_reachable_and_no_worse() {
    let t = table(&[
        ('A', Matrix::new(50, 50, PropertySet::new())),
        ('B', Matrix::new(50, 50, PropertySet::new())),
        ('C', Matrix::new(50, 50, PropertySet::new())),
    ]);
    let seed = Expr::sum(
        Expr::product(Expr::leaf('A'), Expr::leaf('B')),
        Expr::product(Expr::leaf('A'), Expr::leaf('C')),
    );
    let seed_cost = crate::cost::flops(&seed, &t).unwrap();
    let (cost, best) = optimize(&seed, &t).unwrap();
    assert!(cost <= seed_cost);
    let factored = Expr::product(Expr::leaf('A'), Expr::sum(Expr::leaf('B'), Expr::leaf('C')));
    assert_eq!(best, factored);
}

#[rstest]
fn s4_inverse_of_lower_triangular_is_cheap() {
    let t = table(&[(
        'L',
        Matrix::new(100, 100, PropertySet::from_props([MProperty::LowerTriangular])),
    )]);
    let e = Expr::inverse(Expr::leaf('L'));
    let cost = crate::cost::flops(&e, &t).unwrap();
    assert_eq!(cost, (100 * 100 + 100) / 2);
}

#[template]
#[rstest]
fn inverse_cost_template(#[values(10, 64, 100)] r: usize) {}

#[apply(inverse_cost_template)]
fn inverse_of_lower_triangular_halves_the_cubic_term(r: usize) {
    let t = table(&[('L', Matrix::new(r, r, PropertySet::from_props([MProperty::LowerTriangular])))]);
    let cost = crate::cost::flops(&Expr::inverse(Expr::leaf('L')), &t).unwrap();
    assert_eq!(cost, ((r * r + r) / 2) as u64);
}

#[apply(inverse_cost_template)]
fn inverse_of_a_dense_matrix_uses_the_cubic_formula(r: usize) {
    let t = table(&[('L', Matrix::new(r, r, PropertySet::new()))]);
    let cost = crate::cost::flops(&Expr::inverse(Expr::leaf('L')), &t).unwrap();
    assert_eq!(cost, (3 * r * r * r / 4) as u64);
}

#[rstest]
fn s5_chol_solve_requires_lower_triangular_factor() {
    let t = table(&[
        ('A', Matrix::new(3, 3, PropertySet::from_props([MProperty::Symmetric]))),
        ('B', Matrix::new(3, 2, PropertySet::new())),
    ]);
    let e = Expr::chol_solve(Expr::leaf('A'), Expr::leaf('B'));
    let err = descriptor_of(&e, &t).unwrap_err();
    assert!(matches!(err, MError::WrongProperties { .. }));
}

#[rstest]
fn s6_unbound_preamble_symbol_is_reported() {
    let lines = vec![
        PreambleLine::SymbolLine('n', 100),
        PreambleLine::MatrixLine('A', MatrixSym::new("m", "n", PropertySet::new())),
    ];
    let err = resolve_preamble(&lines).unwrap_err();
    assert_eq!(err, MError::UnboundName('m'));
}

#[rstest]
fn full_pipeline_resolves_preprocesses_optimizes_and_emits() {
    let lines = vec![
        PreambleLine::MatrixLine('A', MatrixSym::new("200", "200", PropertySet::new())),
        PreambleLine::MatrixLine('B', MatrixSym::new("200", "200", PropertySet::new())),
        PreambleLine::MatrixLine('x', MatrixSym::new("200", "1", PropertySet::new())),
    ];
    let table = resolve_preamble(&lines).unwrap();
    let raw = Expr::product(
        Expr::product(Expr::leaf('A'), Expr::leaf('B')),
        Expr::product(Expr::leaf('I'), Expr::leaf('x')),
    );
    let pre = preprocess(raw, &table).unwrap();
    let (cost, best) = optimize(&pre, &table).unwrap();
    let naive_cost = crate::cost::flops(&pre, &table).unwrap();
    assert!(cost <= naive_cost);
    let rendered = crate::emit::emit(&best);
    assert!(rendered.contains("np.dot"));
}
