use std::collections::HashMap;

use matrizer::{optimize, preprocess, Expr, Matrix, PropertySet, SymbolTable};

fn main() {
    divan::main();
}

fn chain_table(n: usize) -> SymbolTable {
    let mut t: SymbolTable = HashMap::new();
    for name in ['A', 'B', 'C', 'D'] {
        t.insert(name, Matrix::new(n, n, PropertySet::new()));
    }
    t.insert('x', Matrix::new(n, 1, PropertySet::new()));
    t
}

fn matrix_chain(n: usize) -> Expr {
    Expr::product(
        Expr::product(Expr::leaf('A'), Expr::leaf('B')),
        Expr::product(Expr::leaf('C'), Expr::product(Expr::leaf('D'), Expr::leaf('x'))),
    )
}

#[divan::bench(args = [10, 50, 100])]
fn optimize_matrix_chain(n: usize) {
    let table = chain_table(n);
    let expr = preprocess(matrix_chain(n), &table).unwrap();
    divan::black_box(optimize(&divan::black_box(expr), &table).unwrap());
}
