use tracing::trace;

use crate::analyzer::unexpected_node;
use crate::arith::BoundAnalyzer;
use crate::error::AnalyzerError;
use crate::ir::expr::{ExprId, ExprNode};
use crate::ir::module::ModuleExpr;
use crate::ir::var::{BufferRange, Var};
use crate::visit::{collect_nodes, find_first};

/// Prefix of range variables describing a computed index.
pub const EXPR_RANGE_PREFIX: &str = "expr";
/// Prefix of range variables describing a constant index; the constant is
/// appended, e.g. `constant3_0`.
pub const CONSTANT_RANGE_PREFIX: &str = "constant";

/// Describes each index as a variable whose bounds cover the positions it
/// can take.
///
/// - an integer literal `c`, or a float literal with integral value `c`,
///   becomes a fresh variable bounded by `[c, c]`;
/// - a bare variable is reused as is;
/// - anything else becomes a fresh variable bounded by the expression's
///   interval over its free variables, flagged as a reduction axis if any
///   of them is one.
pub fn indices_to_vars(module: &mut ModuleExpr, indices: &[ExprId]) -> Vec<Var> {
    let mut result = Vec::with_capacity(indices.len());
    for &index in indices {
        let node = module.node(index);
        let var = match (node.as_const_int(), node) {
            (Some(c), _) => {
                let name = module.fresh_name(&format!("{}{}", CONSTANT_RANGE_PREFIX, c));
                Var::with_bounds(name, c, c)
            }
            (None, ExprNode::Var(v)) => v.clone(),
            (None, _) => {
                let analyzer = BoundAnalyzer::from_free_vars(module, index);
                let bound = analyzer.bound(module, index);
                let is_reduce = find_first(module, index, |_, node| {
                    node.as_var().is_some_and(|v| v.is_reduce_axis)
                })
                .is_some();
                Var {
                    name: module.fresh_name(EXPR_RANGE_PREFIX),
                    lower_bound: bound.lower,
                    upper_bound: bound.upper,
                    is_reduce_axis: is_reduce,
                }
            }
        };
        result.push(var);
    }
    result
}

/// Fills the read and write buffer ranges of the `ScheduleBlock` node
/// `sblock` from the loads and stores in its body.
///
/// Does nothing if either list is already populated.
pub fn analyze_schedule_block_read_write_buffer(
    module: &mut ModuleExpr,
    sblock: ExprId,
) -> Result<(), AnalyzerError> {
    let body = match module.node(sblock) {
        ExprNode::ScheduleBlock(sb) => {
            if !sb.read_buffers.is_empty() || !sb.write_buffers.is_empty() {
                trace!("buffer ranges of '{}' already computed", sb.name);
                return Ok(());
            }
            sb.body
        }
        _ => return Err(unexpected_node(module, sblock, "ScheduleBlock")),
    };

    let accesses = collect_nodes(module, body, |_, node| {
        matches!(node, ExprNode::Load(_) | ExprNode::Store(_))
    });
    let mut read_buffers = Vec::new();
    let mut write_buffers = Vec::new();
    for access in accesses {
        let (tensor, indices, is_write) = match module.node(access) {
            ExprNode::Load(load) => (load.tensor, load.indices.clone(), false),
            ExprNode::Store(store) => (store.tensor, store.indices.clone(), true),
            _ => continue,
        };
        let buffer = module
            .node(tensor)
            .as_tensor()
            .map(|t| t.buffer.clone())
            .ok_or_else(|| AnalyzerError::NotTensor {
                dump: module.display(access).to_string(),
            })?;
        let range = BufferRange::new(buffer, indices_to_vars(module, &indices));
        trace!("{} {}", if is_write { "write" } else { "read" }, range);
        if is_write {
            write_buffers.push(range);
        } else {
            read_buffers.push(range);
        }
    }

    if let ExprNode::ScheduleBlock(sb) = module.node_mut(sblock) {
        sb.read_buffers = read_buffers;
        sb.write_buffers = write_buffers;
    }
    Ok(())
}
