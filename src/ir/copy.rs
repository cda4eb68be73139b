//! Deep copy of IR subtrees.

use crate::ir::expr::ExprId;
use crate::ir::module::ModuleExpr;

/// Copies the subtree rooted at `id` into fresh nodes and returns the new
/// root.
///
/// The copy shares no node with the source, so rewriting it in place never
/// affects the original tree. Nodes reachable along several paths (a tensor
/// reused by many loads, say) are copied once per path.
pub fn ir_copy(module: &mut ModuleExpr, id: ExprId) -> ExprId {
    let mut node = module.node(id).clone();
    let children = node.children();
    let copied: Vec<ExprId> = children.into_iter().map(|c| ir_copy(module, c)).collect();
    for (slot, new_child) in node.children_mut().into_iter().zip(copied) {
        *slot = new_child;
    }
    module.alloc(node)
}
