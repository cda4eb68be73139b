//! Integer arithmetic simplification of index expressions.
//!
//! `ArithSimplifier` rewrites bottom-up and applies, per binary node:
//!
//! **A. Constant folding.** Both operands literal integers:
//! - `c1 op c2 → c` for `+ - * / % min max` and comparisons (`0`/`1`).
//!   Division and modulo by zero are left alone.
//!
//! **B. Identities.** One operand neutral or absorbing:
//! - `x + 0 → x`  |  `0 + x → x`  |  `x - 0 → x`
//! - `x * 1 → x`  |  `1 * x → x`  |  `x * 0 → 0`  |  `0 * x → 0`
//! - `x / 1 → x`  |  `x % 1 → 0`
//! - `x - x → 0`  |  `min(x, x) → x`  |  `max(x, x) → x`
//!
//! **C. Constant reassociation:**
//! - `(x + c1) + c2 → x + (c1 + c2)`  |  `(x + c1) - c2 → x + (c1 - c2)`
//!
//! Rewrites allocate new nodes and splice them into the parent; the tree is
//! edited in place, so run it on a copy if the original must survive.

use crate::ir::equal::structural_eq;
use crate::ir::expr::{BinaryOp, ExprId, ExprNode};
use crate::ir::module::ModuleExpr;
use crate::mutate::{walk_mut, IrMutator};

pub struct ArithSimplifier;

impl IrMutator for ArithSimplifier {
    fn mutate(&mut self, module: &mut ModuleExpr, id: ExprId) -> ExprId {
        walk_mut(self, module, id);
        simplify_node(module, id)
    }
}

/// Simplifies the tree rooted at `id` and returns its new root.
pub fn simplify(module: &mut ModuleExpr, id: ExprId) -> ExprId {
    ArithSimplifier.mutate(module, id)
}

/// Folds two integer constants. Returns `None` when the result is undefined
/// or overflows.
pub fn fold_int(op: BinaryOp, a: i64, b: i64) -> Option<i64> {
    let v = match op {
        BinaryOp::Add => a.checked_add(b)?,
        BinaryOp::Sub => a.checked_sub(b)?,
        BinaryOp::Mul => a.checked_mul(b)?,
        BinaryOp::Div => a.checked_div(b)?,
        BinaryOp::Mod => a.checked_rem(b)?,
        BinaryOp::Min => a.min(b),
        BinaryOp::Max => a.max(b),
        BinaryOp::Lt => (a < b) as i64,
        BinaryOp::Le => (a <= b) as i64,
        BinaryOp::Gt => (a > b) as i64,
        BinaryOp::Ge => (a >= b) as i64,
        BinaryOp::Eq => (a == b) as i64,
        BinaryOp::Ne => (a != b) as i64,
        BinaryOp::And => (a != 0 && b != 0) as i64,
        BinaryOp::Or => (a != 0 || b != 0) as i64,
    };
    Some(v)
}

fn simplify_node(module: &mut ModuleExpr, id: ExprId) -> ExprId {
    let (op, lhs, rhs) = match module.node(id) {
        ExprNode::Binary(b) => (b.op, b.lhs, b.rhs),
        _ => return id,
    };
    let lc = module.node(lhs).as_int();
    let rc = module.node(rhs).as_int();

    // Case A: both operands known.
    if let (Some(a), Some(b)) = (lc, rc) {
        if let Some(v) = fold_int(op, a, b) {
            return module.make_int(v);
        }
        return id;
    }

    // Case B: identities.
    match (op, lc, rc) {
        (BinaryOp::Add, Some(0), _) | (BinaryOp::Mul, Some(1), _) => return rhs,
        (BinaryOp::Add, _, Some(0))
        | (BinaryOp::Sub, _, Some(0))
        | (BinaryOp::Mul, _, Some(1))
        | (BinaryOp::Div, _, Some(1)) => return lhs,
        (BinaryOp::Mul, Some(0), _) | (BinaryOp::Mul, _, Some(0)) | (BinaryOp::Mod, _, Some(1)) => {
            return module.make_int(0);
        }
        _ => {}
    }
    if structural_eq(module, lhs, rhs) {
        match op {
            BinaryOp::Sub => return module.make_int(0),
            BinaryOp::Min | BinaryOp::Max => return lhs,
            _ => {}
        }
    }

    // Case C: fold a trailing constant into an inner `x + c1`.
    if let (BinaryOp::Add | BinaryOp::Sub, Some(c2)) = (op, rc) {
        if let ExprNode::Binary(inner) = module.node(lhs) {
            if inner.op == BinaryOp::Add {
                let (x, c1_id) = (inner.lhs, inner.rhs);
                if let Some(c1) = module.node(c1_id).as_int() {
                    let combined = if op == BinaryOp::Add {
                        c1.checked_add(c2)
                    } else {
                        c1.checked_sub(c2)
                    };
                    if let Some(c) = combined {
                        if c == 0 {
                            return x;
                        }
                        let c = module.make_int(c);
                        return module.make_add(x, c);
                    }
                }
            }
        }
    }
    id
}
