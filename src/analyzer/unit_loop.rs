use tracing::debug;

use crate::analyzer::get_block_name;
use crate::error::AnalyzerError;
use crate::ir::expr::{DeviceApi, ExprId, ExprNode};
use crate::ir::module::ModuleExpr;
use crate::ir::var::Var;
use crate::visit::FindBlockParent;

/// Prefix of the inductor names of inserted unit loops.
pub const UNIT_LOOP_PREFIX: &str = "ix";

enum Slot {
    Stmt(usize),
    ForBody,
    ScheduleBlockBody,
}

/// Wraps `block` in a serial loop `for (ix_N, 0, 1)` and returns the loop.
///
/// The loop replaces the block in its nearest enclosing `Block`, or becomes
/// the new body of the `For` or `ScheduleBlock` whose body was the block.
/// The old occupant of that slot is moved into a single-statement `Block`
/// under the new loop.
pub fn add_unit_loop(module: &mut ModuleExpr, block: ExprId) -> Result<ExprId, AnalyzerError> {
    let block_name = get_block_name(module, block)?.to_owned();

    let mut finder = FindBlockParent::new(&block_name);
    for &tree in module.exprs() {
        if finder.search(module, tree).is_some() {
            break;
        }
    }
    let not_found = || AnalyzerError::ParentNotFound {
        name: block_name.clone(),
    };
    let parent = finder.target().ok_or_else(not_found)?;

    let (slot, occupant) = match module.node(parent) {
        ExprNode::Block(b) => {
            let index = b
                .stmts
                .iter()
                .position(|&s| module.realize_name(s) == Some(block_name.as_str()))
                .ok_or_else(not_found)?;
            (Slot::Stmt(index), b.stmts[index])
        }
        ExprNode::For(f) => (Slot::ForBody, f.body),
        ExprNode::ScheduleBlock(sb) => (Slot::ScheduleBlockBody, sb.body),
        _ => return Err(not_found()),
    };

    let loop_var = Var::new(module.fresh_name(UNIT_LOOP_PREFIX));
    debug!(
        "add_unit_loop: wrapping '{}' under {} ({}) in loop {}",
        block_name,
        parent,
        module.node(parent).kind_name(),
        loop_var
    );
    let body = module.make_block(vec![occupant]);
    let unit_loop = module.make_serial_for(loop_var, 1, DeviceApi::Unknown, body);

    match (slot, module.node_mut(parent)) {
        (Slot::Stmt(index), ExprNode::Block(b)) => b.stmts[index] = unit_loop,
        (Slot::ForBody, ExprNode::For(f)) => f.body = unit_loop,
        (Slot::ScheduleBlockBody, ExprNode::ScheduleBlock(sb)) => sb.body = unit_loop,
        _ => return Err(not_found()),
    }
    Ok(unit_loop)
}
