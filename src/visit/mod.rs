//! Read-only walkers over the schedule IR.
//!
//! `IrVisitor` is the shared traversal protocol: `walk` calls `visit`
//! before a node's children (pre-order) and `leave` after them. Returning
//! `false` from `visit` prunes the subtree.

pub mod find;

pub use find::{FindBlockParent, FindBlocksVisitor, FindLoopsVisitor};

use crate::ir::expr::{ExprId, ExprNode};
use crate::ir::module::ModuleExpr;

pub trait IrVisitor {
    /// Called before `id`'s children. Return `false` to skip them.
    fn visit(&mut self, module: &ModuleExpr, id: ExprId) -> bool;

    /// Called after `id`'s children, only if `visit` returned `true`.
    fn leave(&mut self, _module: &ModuleExpr, _id: ExprId) {}
}

/// Drives `visitor` over the subtree rooted at `id`.
pub fn walk<V: IrVisitor + ?Sized>(visitor: &mut V, module: &ModuleExpr, id: ExprId) {
    if !visitor.visit(module, id) {
        return;
    }
    for child in module.node(id).children() {
        walk(visitor, module, child);
    }
    visitor.leave(module, id);
}

struct NodeCollector<F> {
    pred: F,
    found: Vec<ExprId>,
    first_only: bool,
}

impl<F: FnMut(ExprId, &ExprNode) -> bool> IrVisitor for NodeCollector<F> {
    fn visit(&mut self, module: &ModuleExpr, id: ExprId) -> bool {
        if self.first_only && !self.found.is_empty() {
            return false;
        }
        let node = module.node(id);
        if (self.pred)(id, node) {
            self.found.push(id);
        }
        // Tensor nodes are leaves; nothing behind them is part of the tree.
        !matches!(node, ExprNode::Tensor(_))
    }
}

/// Collects every node under (and including) `root` accepted by `pred`, in
/// pre-order.
pub fn collect_nodes<F>(module: &ModuleExpr, root: ExprId, pred: F) -> Vec<ExprId>
where
    F: FnMut(ExprId, &ExprNode) -> bool,
{
    let mut collector = NodeCollector {
        pred,
        found: Vec::new(),
        first_only: false,
    };
    walk(&mut collector, module, root);
    collector.found
}

/// The first node in pre-order under `root` accepted by `pred`.
pub fn find_first<F>(module: &ModuleExpr, root: ExprId, pred: F) -> Option<ExprId>
where
    F: FnMut(ExprId, &ExprNode) -> bool,
{
    let mut collector = NodeCollector {
        pred,
        found: Vec::new(),
        first_only: true,
    };
    walk(&mut collector, module, root);
    collector.found.into_iter().next()
}

/// True if node `target` is reachable from `root`.
pub fn contains(module: &ModuleExpr, root: ExprId, target: ExprId) -> bool {
    find_first(module, root, |id, _| id == target).is_some()
}
