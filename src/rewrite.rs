//! The rewriter: rule set, zipper-based traversal, tabu-bounded BFS search,
//! and cost-based selection.
//!
//! The four rules below only ever regroup or redistribute `Product`/`Sum`
//! nodes, which keeps the leaf multiset and node count fixed across a
//! rewrite; that is what makes the reachable set (the *rewrite closure*)
//! finite for every input tree, so the breadth-first search below always
//! terminates. A closure-size cap is still enforced defensively: on the
//! current rule set it is never hit by a well-formed input, but an
//! accidental future rule that breaks termination should fail loudly rather
//! than exhaust memory.

use std::collections::{HashSet, VecDeque};

use crate::cost::flops;
use crate::error::MError;
use crate::expr::{BinaryOp, Expr};
use crate::preamble::SymbolTable;

/// Default cap on the number of distinct trees the search may visit before
/// giving up. Generous relative to any input this engine's rule set
/// produces in practice; see [`optimize_with_closure_cap`] to override it.
pub const DEFAULT_MAX_CLOSURE: usize = 200_000;

/// One step back toward the root from a focused sub-expression: the sibling
/// data needed to rebuild the parent once the focus has been rewritten.
#[derive(Debug, Clone)]
enum Crumb {
    Unary(crate::expr::UnaryOp),
    BinLeft(BinaryOp, Expr),
    BinRight(BinaryOp, Expr),
    TernA(crate::expr::TernaryOp, Expr, Expr),
    TernB(crate::expr::TernaryOp, Expr, Expr),
    TernC(crate::expr::TernaryOp, Expr, Expr),
    LetRhs(char, bool, Expr),
    LetBody(char, Expr, bool),
}

/// A breadcrumb path from a focused sub-expression back to the root:
/// `path[0]` rebuilds the immediate parent, `path[1]` the grandparent, and
/// so on. Rebuilding the whole tree is folding `rebuild_one` over the path.
type Path = Vec<Crumb>;

fn rebuild_one(focus: Expr, crumb: Crumb) -> Expr {
    match crumb {
        Crumb::Unary(op) => Expr::Branch1(op, Box::new(focus)),
        Crumb::BinLeft(op, right) => Expr::Branch2(op, Box::new(focus), Box::new(right)),
        Crumb::BinRight(op, left) => Expr::Branch2(op, Box::new(left), Box::new(focus)),
        Crumb::TernA(op, b, c) => Expr::Branch3(op, Box::new(focus), Box::new(b), Box::new(c)),
        Crumb::TernB(op, a, c) => Expr::Branch3(op, Box::new(a), Box::new(focus), Box::new(c)),
        Crumb::TernC(op, a, b) => Expr::Branch3(op, Box::new(a), Box::new(b), Box::new(focus)),
        Crumb::LetRhs(name, is_temp, body) => Expr::Let {
            name,
            rhs: Box::new(focus),
            is_temp,
            body: Box::new(body),
        },
        Crumb::LetBody(name, rhs, is_temp) => Expr::Let {
            name,
            rhs: Box::new(rhs),
            is_temp,
            body: Box::new(focus),
        },
    }
}

fn rebuild(focus: Expr, path: &Path) -> Expr {
    path.iter().cloned().fold(focus, rebuild_one)
}

/// Walks every position in `expr` (every node, leaves included), recording
/// each sub-expression alongside the path back to the root.
fn collect_positions(expr: &Expr, path: &Path, out: &mut Vec<(Expr, Path)>) {
    out.push((expr.clone(), path.clone()));
    match expr {
        Expr::Leaf(_) | Expr::IdentityLeaf(_) | Expr::LiteralScalar(_) => {}
        Expr::Branch1(op, t) => {
            let mut p = vec![Crumb::Unary(*op)];
            p.extend(path.iter().cloned());
            collect_positions(t, &p, out);
        }
        Expr::Branch2(op, l, r) => {
            let mut pl = vec![Crumb::BinLeft(*op, (**r).clone())];
            pl.extend(path.iter().cloned());
            collect_positions(l, &pl, out);

            let mut pr = vec![Crumb::BinRight(*op, (**l).clone())];
            pr.extend(path.iter().cloned());
            collect_positions(r, &pr, out);
        }
        Expr::Branch3(op, a, b, c) => {
            let mut pa = vec![Crumb::TernA(*op, (**b).clone(), (**c).clone())];
            pa.extend(path.iter().cloned());
            collect_positions(a, &pa, out);

            let mut pb = vec![Crumb::TernB(*op, (**a).clone(), (**c).clone())];
            pb.extend(path.iter().cloned());
            collect_positions(b, &pb, out);

            let mut pc = vec![Crumb::TernC(*op, (**a).clone(), (**b).clone())];
            pc.extend(path.iter().cloned());
            collect_positions(c, &pc, out);
        }
        Expr::Let { name, rhs, is_temp, body } => {
            let mut pr = vec![Crumb::LetRhs(*name, *is_temp, (**body).clone())];
            pr.extend(path.iter().cloned());
            collect_positions(rhs, &pr, out);

            let mut pb = vec![Crumb::LetBody(*name, (**rhs).clone(), *is_temp)];
            pb.extend(path.iter().cloned());
            collect_positions(body, &pb, out);
        }
    }
}

type Rule = fn(&Expr) -> Option<Expr>;

fn assoc_mult_left(e: &Expr) -> Option<Expr> {
    if let Expr::Branch2(BinaryOp::Product, l, r) = e {
        if let Expr::Branch2(BinaryOp::Product, ll, lc) = l.as_ref() {
            return Some(Expr::product(
                (**ll).clone(),
                Expr::product((**lc).clone(), (**r).clone()),
            ));
        }
    }
    None
}

fn assoc_mult_right(e: &Expr) -> Option<Expr> {
    if let Expr::Branch2(BinaryOp::Product, l, r) = e {
        if let Expr::Branch2(BinaryOp::Product, rc, rr) = r.as_ref() {
            return Some(Expr::product(
                Expr::product((**l).clone(), (**rc).clone()),
                (**rr).clone(),
            ));
        }
    }
    None
}

fn common_factor_left(e: &Expr) -> Option<Expr> {
    if let Expr::Branch2(BinaryOp::Sum, l, r) = e {
        if let (Expr::Branch2(BinaryOp::Product, l1, l2), Expr::Branch2(BinaryOp::Product, r1, r2)) =
            (l.as_ref(), r.as_ref())
        {
            if l1 == r1 {
                return Some(Expr::product(
                    (**l1).clone(),
                    Expr::sum((**l2).clone(), (**r2).clone()),
                ));
            }
        }
    }
    None
}

fn common_factor_right(e: &Expr) -> Option<Expr> {
    if let Expr::Branch2(BinaryOp::Sum, l, r) = e {
        if let (Expr::Branch2(BinaryOp::Product, l1, l2), Expr::Branch2(BinaryOp::Product, r1, r2)) =
            (l.as_ref(), r.as_ref())
        {
            if l2 == r2 {
                return Some(Expr::product(
                    Expr::sum((**l1).clone(), (**r1).clone()),
                    (**l2).clone(),
                ));
            }
        }
    }
    None
}

const RULES: &[Rule] = &[
    assoc_mult_left,
    assoc_mult_right,
    common_factor_left,
    common_factor_right,
];

/// Every whole tree reachable from `root` by applying exactly one rule at
/// exactly one position.
fn rewrites_of(root: &Expr) -> Vec<Expr> {
    let mut positions = Vec::new();
    collect_positions(root, &Vec::new(), &mut positions);

    let mut out = Vec::new();
    for (focus, path) in &positions {
        for rule in RULES {
            if let Some(new_focus) = rule(focus) {
                out.push(rebuild(new_focus, path));
            }
        }
    }
    out
}

/// Optimizes `expr` under `table`, using [`DEFAULT_MAX_CLOSURE`] as the
/// search-space cap.
pub fn optimize(expr: &Expr, table: &SymbolTable) -> Result<(u64, Expr), MError> {
    optimize_with_closure_cap(expr, table, DEFAULT_MAX_CLOSURE)
}

/// Optimizes `expr` under `table`: explores the full rewrite closure with a
/// tabu set (breadth-first, deterministic insertion order), then returns the
/// minimum-[`flops`] tree, ties broken by `Expr`'s derived structural
/// ordering, so selection is deterministic.
pub fn optimize_with_closure_cap(
    expr: &Expr,
    table: &SymbolTable,
    max_closure: usize,
) -> Result<(u64, Expr), MError> {
    let mut seen_order: Vec<Expr> = vec![expr.clone()];
    let mut seen_set: HashSet<Expr> = HashSet::new();
    seen_set.insert(expr.clone());

    let mut queue: VecDeque<Expr> = VecDeque::new();
    queue.push_back(expr.clone());

    while let Some(t) = queue.pop_front() {
        for g in rewrites_of(&t) {
            if !seen_set.contains(&g) {
                if seen_set.len() >= max_closure {
                    return Err(MError::AnalysisError("search space exceeded".to_string()));
                }
                seen_set.insert(g.clone());
                seen_order.push(g.clone());
                queue.push_back(g);
            }
        }
    }

    let mut best: Option<(u64, Expr)> = None;
    for g in seen_order {
        let cost = flops(&g, table)?;
        best = Some(match best {
            None => (cost, g),
            Some((best_cost, best_tree)) => {
                if cost < best_cost || (cost == best_cost && g < best_tree) {
                    (cost, g)
                } else {
                    (best_cost, best_tree)
                }
            }
        });
    }
    Ok(best.expect("the tabu set always contains the seed expression"))
}
