//! Structural equality between IR subtrees.
//!
//! Two subtrees are equal when they have the same shape, the same node
//! payloads and pairwise-equal children. Tensors are compared by name only;
//! their shapes and buffers take no part in the comparison. Schedule blocks
//! compare their names and iteration variables but not their cached buffer
//! ranges.

use crate::ir::expr::{ExprId, ExprNode};
use crate::ir::module::ModuleExpr;

/// True if the subtrees at `a` and `b` are structurally identical.
pub fn structural_eq(module: &ModuleExpr, a: ExprId, b: ExprId) -> bool {
    if a == b {
        return true;
    }
    let (na, nb) = (module.node(a), module.node(b));
    let same_payload = match (na, nb) {
        (ExprNode::IntImm(x), ExprNode::IntImm(y)) => x == y,
        (ExprNode::FloatImm(x), ExprNode::FloatImm(y)) => x.to_bits() == y.to_bits(),
        (ExprNode::Var(x), ExprNode::Var(y)) => x.name == y.name,
        (ExprNode::Tensor(x), ExprNode::Tensor(y)) => x.name == y.name,
        (ExprNode::Binary(x), ExprNode::Binary(y)) => x.op == y.op,
        (ExprNode::Load(x), ExprNode::Load(y)) => x.indices.len() == y.indices.len(),
        (ExprNode::Store(x), ExprNode::Store(y)) => x.indices.len() == y.indices.len(),
        (ExprNode::Call(x), ExprNode::Call(y)) => {
            x.name == y.name
                && x.read_args.len() == y.read_args.len()
                && x.write_args.len() == y.write_args.len()
        }
        (ExprNode::Block(x), ExprNode::Block(y)) => x.stmts.len() == y.stmts.len(),
        (ExprNode::For(x), ExprNode::For(y)) => {
            x.loop_var.name == y.loop_var.name
                && x.for_type == y.for_type
                && x.device_api == y.device_api
        }
        (ExprNode::IfThenElse(x), ExprNode::IfThenElse(y)) => {
            x.false_case.is_some() == y.false_case.is_some()
        }
        (ExprNode::ScheduleBlock(x), ExprNode::ScheduleBlock(y)) => {
            x.name == y.name && x.iter_vars == y.iter_vars
        }
        (ExprNode::ScheduleBlockRealize(x), ExprNode::ScheduleBlockRealize(y)) => {
            x.iter_values.len() == y.iter_values.len()
        }
        _ => false,
    };
    if !same_payload {
        return false;
    }
    let (ca, cb) = (na.children(), nb.children());
    ca.len() == cb.len()
        && ca
            .into_iter()
            .zip(cb)
            .all(|(x, y)| structural_eq(module, x, y))
}
