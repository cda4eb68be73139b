//! Query and transformation primitives over schedule IR.
//!
//! Every operation takes the owning `ModuleExpr` plus node ids and either
//! returns derived facts or edits the module in place. A violated IR
//! invariant is reported as an `AnalyzerError`; the only operation that
//! answers `false` instead of failing on an unexpected shape is
//! `is_broadcast_sblock`.
//!
//! Layout:
//! - `locate`   : finding blocks, loops, roots and the loop device
//! - `unit_loop`: wrapping a block in a `[0, 1)` loop
//! - `query`    : stores, consumers, iteration values, classification
//! - `buffer`   : read/write buffer-range inference

pub mod buffer;
pub mod locate;
pub mod query;
pub mod unit_loop;

pub use buffer::{analyze_schedule_block_read_write_buffer, indices_to_vars};
pub use locate::{
    get_all_blocks, get_block, get_block_name, get_child_blocks, get_device_api, get_loops,
    get_loops_by_name, get_root_block, get_root_sblock, has_block,
};
pub use query::{
    collect_var_to_for_map, get_consumer_loads_and_sblocks, get_consumer_sblocks,
    get_iter_values_of_access, get_iter_var_to_value_of_sblock, get_reduce_iter_vars,
    get_store_of_sblock, get_store_tensor_of_sblock, is_broadcast_sblock, is_reduction_sblock,
    replace_var_with_expr,
};
pub use unit_loop::add_unit_loop;

use crate::error::AnalyzerError;
use crate::ir::expr::{ExprId, ScheduleBlock, ScheduleBlockRealize};
use crate::ir::module::ModuleExpr;

/// Builds the error for a node of the wrong variant, with a dump of the node.
pub(crate) fn unexpected_node(
    module: &ModuleExpr,
    id: ExprId,
    expected: &'static str,
) -> AnalyzerError {
    AnalyzerError::UnexpectedNode {
        expected,
        found: module.node(id).kind_name(),
        dump: module.display(id).to_string(),
    }
}

/// Resolves a block handle to its realize and the schedule block it wraps.
pub(crate) fn realize_parts(
    module: &ModuleExpr,
    block: ExprId,
) -> Result<(&ScheduleBlockRealize, &ScheduleBlock), AnalyzerError> {
    let realize = module
        .node(block)
        .as_realize()
        .ok_or_else(|| unexpected_node(module, block, "ScheduleBlockRealize"))?;
    let sblock = module
        .node(realize.schedule_block)
        .as_schedule_block()
        .ok_or_else(|| unexpected_node(module, realize.schedule_block, "ScheduleBlock"))?;
    Ok((realize, sblock))
}
