//! Tree rewriters.
//!
//! An `IrMutator` maps a node id to the id that should take its place in
//! the parent. The default implementation rewrites children in place via
//! `walk_mut` and keeps the node itself. Mutators edit the tree they are
//! given; callers that must keep the original run them on an `ir_copy`.

pub mod var_map;

pub use var_map::MappingVarToExprMutator;

use crate::ir::expr::ExprId;
use crate::ir::module::ModuleExpr;

pub trait IrMutator {
    /// Returns the replacement for `id`.
    fn mutate(&mut self, module: &mut ModuleExpr, id: ExprId) -> ExprId {
        walk_mut(self, module, id);
        id
    }
}

/// Rewrites every child of `id` through `mutator`, writing changed ids back
/// into their slots.
pub fn walk_mut<M: IrMutator + ?Sized>(mutator: &mut M, module: &mut ModuleExpr, id: ExprId) {
    let children = module.node(id).children();
    let rewritten: Vec<ExprId> = children
        .iter()
        .map(|&child| mutator.mutate(module, child))
        .collect();
    if rewritten == children {
        return;
    }
    for (slot, new_child) in module.node_mut(id).children_mut().into_iter().zip(rewritten) {
        *slot = new_child;
    }
}
