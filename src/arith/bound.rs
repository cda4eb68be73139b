//! Interval bounds of integer index expressions.
//!
//! Every free variable ranges over an inclusive interval (its declared
//! bounds unless overridden). The analyzer propagates intervals bottom-up
//! through `+ - * / % min max` and reports the resulting lower and upper
//! bound of the expression. `None` on a side means "unbounded": the side is
//! unknown, overflowed, or the expression is not integer index arithmetic.

use std::collections::HashMap;

use crate::ir::expr::{BinaryOp, ExprId, ExprNode};
use crate::ir::module::ModuleExpr;
use crate::visit::collect_nodes;

/// An inclusive integer interval with optionally open sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
}

impl Interval {
    pub fn new(lower: Option<i64>, upper: Option<i64>) -> Self {
        Self { lower, upper }
    }

    pub fn point(value: i64) -> Self {
        Self::new(Some(value), Some(value))
    }

    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    fn as_point(&self) -> Option<i64> {
        match (self.lower, self.upper) {
            (Some(l), Some(u)) if l == u => Some(l),
            _ => None,
        }
    }
}

/// Computes bounds of expressions over a fixed set of variable intervals.
#[derive(Debug, Default, Clone)]
pub struct BoundAnalyzer {
    var_intervals: HashMap<String, Interval>,
}

impl BoundAnalyzer {
    pub fn new(var_intervals: HashMap<String, Interval>) -> Self {
        Self { var_intervals }
    }

    /// An analyzer whose intervals are the declared bounds of every variable
    /// occurring in `expr`.
    pub fn from_free_vars(module: &ModuleExpr, expr: ExprId) -> Self {
        let mut var_intervals = HashMap::new();
        for id in collect_nodes(module, expr, |_, n| n.as_var().is_some()) {
            if let Some(var) = module.node(id).as_var() {
                var_intervals.insert(
                    var.name.clone(),
                    Interval::new(var.lower_bound, var.upper_bound),
                );
            }
        }
        Self { var_intervals }
    }

    pub fn lower_bound(&self, module: &ModuleExpr, expr: ExprId) -> Option<i64> {
        self.bound(module, expr).lower
    }

    pub fn upper_bound(&self, module: &ModuleExpr, expr: ExprId) -> Option<i64> {
        self.bound(module, expr).upper
    }

    pub fn bound(&self, module: &ModuleExpr, expr: ExprId) -> Interval {
        match module.node(expr) {
            ExprNode::IntImm(v) => Interval::point(*v),
            ExprNode::Var(var) => self
                .var_intervals
                .get(&var.name)
                .copied()
                .unwrap_or_else(|| Interval::new(var.lower_bound, var.upper_bound)),
            ExprNode::Binary(b) => {
                if b.op.is_comparison() {
                    return Interval::new(Some(0), Some(1));
                }
                let lhs = self.bound(module, b.lhs);
                let rhs = self.bound(module, b.rhs);
                combine(b.op, lhs, rhs)
            }
            _ => Interval::unbounded(),
        }
    }
}

fn both(a: Option<i64>, b: Option<i64>, f: impl Fn(i64, i64) -> Option<i64>) -> Option<i64> {
    match (a, b) {
        (Some(x), Some(y)) => f(x, y),
        _ => None,
    }
}

fn combine(op: BinaryOp, lhs: Interval, rhs: Interval) -> Interval {
    match op {
        BinaryOp::Add => Interval::new(
            both(lhs.lower, rhs.lower, i64::checked_add),
            both(lhs.upper, rhs.upper, i64::checked_add),
        ),
        BinaryOp::Sub => Interval::new(
            both(lhs.lower, rhs.upper, i64::checked_sub),
            both(lhs.upper, rhs.lower, i64::checked_sub),
        ),
        BinaryOp::Mul => mul(lhs, rhs),
        BinaryOp::Div => match rhs.as_point() {
            Some(c) if c > 0 => Interval::new(
                lhs.lower.and_then(|l| l.checked_div(c)),
                lhs.upper.and_then(|u| u.checked_div(c)),
            ),
            Some(c) if c < 0 => Interval::new(
                lhs.upper.and_then(|u| u.checked_div(c)),
                lhs.lower.and_then(|l| l.checked_div(c)),
            ),
            _ => Interval::unbounded(),
        },
        BinaryOp::Mod => match rhs.as_point() {
            Some(c) if c > 0 => match (lhs.lower, lhs.upper) {
                (Some(l), Some(u)) if l >= 0 && u < c => Interval::new(Some(l), Some(u)),
                (Some(l), _) if l >= 0 => Interval::new(Some(0), Some(c - 1)),
                _ => Interval::new(Some(-(c - 1)), Some(c - 1)),
            },
            _ => Interval::unbounded(),
        },
        BinaryOp::Min => Interval::new(
            both(lhs.lower, rhs.lower, |a, b| Some(a.min(b))),
            match (lhs.upper, rhs.upper) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
        ),
        BinaryOp::Max => Interval::new(
            match (lhs.lower, rhs.lower) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            },
            both(lhs.upper, rhs.upper, |a, b| Some(a.max(b))),
        ),
        _ => Interval::unbounded(),
    }
}

fn mul(lhs: Interval, rhs: Interval) -> Interval {
    let scale = |iv: Interval, c: i64| -> Interval {
        if c == 0 {
            return Interval::point(0);
        }
        let lo = iv.lower.and_then(|l| l.checked_mul(c));
        let hi = iv.upper.and_then(|u| u.checked_mul(c));
        if c > 0 {
            Interval::new(lo, hi)
        } else {
            Interval::new(hi, lo)
        }
    };
    if let Some(c) = rhs.as_point() {
        return scale(lhs, c);
    }
    if let Some(c) = lhs.as_point() {
        return scale(rhs, c);
    }
    match (lhs.lower, lhs.upper, rhs.lower, rhs.upper) {
        (Some(a), Some(b), Some(c), Some(d)) => {
            let corners = [a.checked_mul(c), a.checked_mul(d), b.checked_mul(c), b.checked_mul(d)];
            if corners.iter().any(Option::is_none) {
                return Interval::unbounded();
            }
            let values: Vec<i64> = corners.iter().flatten().copied().collect();
            Interval::new(values.iter().min().copied(), values.iter().max().copied())
        }
        _ => Interval::unbounded(),
    }
}
