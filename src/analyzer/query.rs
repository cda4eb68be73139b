use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::analyzer::{get_block_name, get_loops, realize_parts, unexpected_node};
use crate::arith::simplify;
use crate::error::AnalyzerError;
use crate::ir::copy::ir_copy;
use crate::ir::expr::{ExprId, ExprNode};
use crate::ir::module::ModuleExpr;
use crate::ir::name::{is_reduce_init_tensor_name, original_reduce_tensor_name};
use crate::ir::var::{Tensor, Var};
use crate::mutate::{IrMutator, MappingVarToExprMutator};
use crate::visit::collect_nodes;

// ---------------------------------------------------------------------------
// Stores and consumers
// ---------------------------------------------------------------------------

/// The single `Store` inside `block`.
pub fn get_store_of_sblock(module: &ModuleExpr, block: ExprId) -> Result<ExprId, AnalyzerError> {
    let (_, sblock) = realize_parts(module, block)?;
    let stores = collect_nodes(module, block, |_, node| node.as_store().is_some());
    match stores.as_slice() {
        [store] => Ok(*store),
        _ => Err(AnalyzerError::StoreCount {
            name: sblock.name.clone(),
            count: stores.len(),
        }),
    }
}

/// The tensor written by the single `Store` inside `block`.
pub fn get_store_tensor_of_sblock(
    module: &ModuleExpr,
    block: ExprId,
) -> Result<&Tensor, AnalyzerError> {
    let store_id = get_store_of_sblock(module, block)?;
    let store = module
        .node(store_id)
        .as_store()
        .ok_or_else(|| unexpected_node(module, store_id, "Store"))?;
    module
        .node(store.tensor)
        .as_tensor()
        .ok_or_else(|| AnalyzerError::NotTensor {
            dump: module.display(store_id).to_string(),
        })
}

fn is_tensor_named(module: &ModuleExpr, id: ExprId, name: &str) -> bool {
    module
        .node(id)
        .as_tensor()
        .is_some_and(|t| t.name == name)
}

/// The blocks under `root` that read the tensor `block` writes.
///
/// A block reads a tensor if its body loads from it or passes it as a read
/// argument of a call. `block` and `root` themselves are never reported.
///
/// A reduction-initialization block (explicitly tagged, or writing a
/// `<name>__reduce_init` tensor) has exactly one consumer: the reduction
/// block it initializes.
pub fn get_consumer_sblocks(
    module: &ModuleExpr,
    block: ExprId,
    root: ExprId,
) -> Result<Vec<ExprId>, AnalyzerError> {
    let (_, sblock) = realize_parts(module, block)?;
    realize_parts(module, root)?;
    let store_tensor_name = get_store_tensor_of_sblock(module, block)?.name.as_str();

    let reduce_target = match &sblock.reduce_init_of {
        Some(target) => Some(target.as_str()),
        None if is_reduce_init_tensor_name(store_tensor_name) => {
            Some(original_reduce_tensor_name(store_tensor_name))
        }
        None => None,
    };
    if let Some(consumer_name) = reduce_target {
        let found = collect_nodes(module, root, |id, _| {
            module.realize_name(id) == Some(consumer_name)
        });
        debug!(
            "get_consumer_sblocks: '{}' initializes '{}', {} match(es)",
            sblock.name,
            consumer_name,
            found.len()
        );
        return match found.as_slice() {
            [consumer] => Ok(vec![*consumer]),
            _ => Err(AnalyzerError::ReduceConsumerCount {
                name: consumer_name.to_owned(),
                count: found.len(),
            }),
        };
    }

    let candidates = collect_nodes(module, root, |id, node| {
        node.as_realize().is_some() && id != block && id != root
    });
    let mut consumers = Vec::new();
    for candidate in candidates {
        let (_, candidate_block) = realize_parts(module, candidate)?;
        let reads = collect_nodes(module, candidate_block.body, |_, node| match node {
            ExprNode::Load(load) => is_tensor_named(module, load.tensor, store_tensor_name),
            ExprNode::Call(call) => call
                .read_args
                .iter()
                .any(|&arg| is_tensor_named(module, arg, store_tensor_name)),
            _ => false,
        });
        if !reads.is_empty() {
            trace!(
                "get_consumer_sblocks: '{}' reads '{}'",
                candidate_block.name,
                store_tensor_name
            );
            consumers.push(candidate);
        }
    }
    Ok(consumers)
}

/// Pairs every load of the tensor `block` writes with the consumer block it
/// occurs in.
pub fn get_consumer_loads_and_sblocks(
    module: &ModuleExpr,
    block: ExprId,
    root: ExprId,
) -> Result<Vec<(ExprId, ExprId)>, AnalyzerError> {
    realize_parts(module, root)?;
    let consumers = get_consumer_sblocks(module, block, root)?;
    let store_tensor_name = get_store_tensor_of_sblock(module, block)?.name.as_str();
    let mut loads_and_blocks = Vec::new();
    for consumer in consumers {
        let loads = collect_nodes(module, consumer, |_, node| {
            node.as_load()
                .is_some_and(|load| is_tensor_named(module, load.tensor, store_tensor_name))
        });
        loads_and_blocks.extend(loads.into_iter().map(|load| (load, consumer)));
    }
    Ok(loads_and_blocks)
}

// ---------------------------------------------------------------------------
// Loops and iteration values
// ---------------------------------------------------------------------------

/// For each block, maps the inductor of every enclosing loop to that loop,
/// keyed by block name.
pub fn collect_var_to_for_map(
    module: &ModuleExpr,
    blocks: &[ExprId],
) -> Result<HashMap<String, HashMap<Var, ExprId>>, AnalyzerError> {
    let mut for_map: HashMap<String, HashMap<Var, ExprId>> = HashMap::new();
    for &block in blocks {
        let block_name = get_block_name(module, block)?;
        for for_id in get_loops(module, block)? {
            let Some(f) = module.node(for_id).as_for() else {
                return Err(unexpected_node(module, for_id, "For"));
            };
            trace!("for_map.insert: <{}, {}>", block_name, f.loop_var.name);
            for_map
                .entry(block_name.to_owned())
                .or_default()
                .insert(f.loop_var.clone(), for_id);
        }
    }
    Ok(for_map)
}

/// Maps each iteration variable of `block` to the value bound to it at the
/// realize site.
pub fn get_iter_var_to_value_of_sblock(
    module: &ModuleExpr,
    block: ExprId,
) -> Result<HashMap<Var, ExprId>, AnalyzerError> {
    let (realize, sblock) = realize_parts(module, block)?;
    if realize.iter_values.len() != sblock.iter_vars.len() {
        return Err(AnalyzerError::SizeMismatch {
            what: "iteration values of a realize",
            expected: sblock.iter_vars.len(),
            found: realize.iter_values.len(),
        });
    }
    Ok(sblock
        .iter_vars
        .iter()
        .cloned()
        .zip(realize.iter_values.iter().copied())
        .collect())
}

/// Returns a copy of `source` with each of `vars` replaced by the
/// corresponding expression of `targets`.
///
/// Every occurrence receives its own copy of the target, so the result
/// shares no nodes with `source` or `targets`.
pub fn replace_var_with_expr(
    module: &mut ModuleExpr,
    source: ExprId,
    vars: &[Var],
    targets: &[ExprId],
) -> Result<ExprId, AnalyzerError> {
    if vars.len() != targets.len() {
        return Err(AnalyzerError::SizeMismatch {
            what: "variable substitution",
            expected: vars.len(),
            found: targets.len(),
        });
    }
    let copied = ir_copy(module, source);
    if vars.is_empty() {
        return Ok(copied);
    }
    let mut mapping = HashMap::new();
    for (var, &target) in vars.iter().zip(targets) {
        // v -> v is a no-op.
        if module.node(target).as_var() == Some(var) {
            continue;
        }
        mapping.insert(var.name.clone(), target);
    }
    trace!(
        "replace_var_with_expr: {} of {} variable(s) mapped",
        mapping.len(),
        vars.len()
    );
    if mapping.is_empty() {
        return Ok(copied);
    }
    Ok(MappingVarToExprMutator::new(mapping).mutate(module, copied))
}

/// The indices of a `Load` or `Store` rewritten in terms of `block`'s
/// realize-site values and simplified.
pub fn get_iter_values_of_access(
    module: &mut ModuleExpr,
    load_or_store: ExprId,
    block: ExprId,
) -> Result<Vec<ExprId>, AnalyzerError> {
    let indices = match module.node(load_or_store) {
        ExprNode::Load(load) => load.indices.clone(),
        ExprNode::Store(store) => store.indices.clone(),
        _ => return Err(unexpected_node(module, load_or_store, "Load or Store")),
    };
    let (realize, sblock) = realize_parts(module, block)?;
    let iter_vars = sblock.iter_vars.clone();
    let iter_values = realize.iter_values.clone();

    let mut result = Vec::with_capacity(indices.len());
    for index in indices {
        let value = replace_var_with_expr(module, index, &iter_vars, &iter_values)?;
        result.push(simplify(module, value));
    }
    Ok(result)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The iteration variables of `block` flagged as reduction axes.
pub fn get_reduce_iter_vars(
    module: &ModuleExpr,
    block: ExprId,
) -> Result<HashSet<Var>, AnalyzerError> {
    let (_, sblock) = realize_parts(module, block)?;
    Ok(sblock
        .iter_vars
        .iter()
        .filter(|v| v.is_reduce_axis)
        .cloned()
        .collect())
}

pub fn is_reduction_sblock(module: &ModuleExpr, block: ExprId) -> Result<bool, AnalyzerError> {
    let (_, sblock) = realize_parts(module, block)?;
    Ok(sblock.iter_vars.iter().any(|v| v.is_reduce_axis))
}

/// True if `block` copies a load into a store of higher dimensionality.
///
/// The stored value must be a bare `Load`. Each load index must be either a
/// literal zero facing a non-zero store index (a broadcast dimension) or a
/// variable that also indexes the store at the same or a later position.
/// After discounting broadcast dimensions the store must still have more
/// indices than the load. Any other index shape answers `false`.
pub fn is_broadcast_sblock(module: &ModuleExpr, block: ExprId) -> Result<bool, AnalyzerError> {
    realize_parts(module, block)?;
    let store_id = get_store_of_sblock(module, block)?;
    let store = module
        .node(store_id)
        .as_store()
        .ok_or_else(|| unexpected_node(module, store_id, "Store"))?;
    let Some(load) = module.node(store.value).as_load() else {
        return Ok(false);
    };

    let is_zero = |id: ExprId| module.node(id).is_zero();
    let mut zero_load_indices = 0;
    for (i, &load_index) in load.indices.iter().enumerate() {
        if is_zero(load_index) && i < store.indices.len() && !is_zero(store.indices[i]) {
            zero_load_indices += 1;
            continue;
        }
        let mut found = false;
        for &store_index in store.indices.iter().skip(i) {
            let (Some(load_var), Some(store_var)) = (
                module.node(load_index).as_var(),
                module.node(store_index).as_var(),
            ) else {
                return Ok(false);
            };
            if load_var.name == store_var.name {
                found = true;
                break;
            }
        }
        if !found {
            return Ok(false);
        }
    }
    Ok(load.indices.len() - zero_load_indices < store.indices.len())
}
