use tracing::{debug, trace};

use crate::analyzer::{realize_parts, unexpected_node};
use crate::error::AnalyzerError;
use crate::ir::expr::{DeviceApi, ExprId, ExprNode};
use crate::ir::module::ModuleExpr;
use crate::visit::{contains, find_first, FindBlocksVisitor, FindLoopsVisitor};

/// True if some function contains a block named `block_name`.
///
/// Functions are searched in order and the first one holding the name
/// decides; two blocks with that name inside it are an error.
pub fn has_block(module: &ModuleExpr, block_name: &str) -> Result<bool, AnalyzerError> {
    for &tree in module.exprs() {
        let found = FindBlocksVisitor::new(Some(block_name)).find(module, tree);
        if !found.is_empty() {
            if found.len() > 1 {
                return Err(AnalyzerError::DuplicateBlock {
                    name: block_name.to_owned(),
                });
            }
            return Ok(true);
        }
    }
    Ok(false)
}

/// Returns the realize of the block named `block_name`.
pub fn get_block(module: &ModuleExpr, block_name: &str) -> Result<ExprId, AnalyzerError> {
    for &tree in module.exprs() {
        let found = FindBlocksVisitor::new(Some(block_name)).find(module, tree);
        match found.as_slice() {
            [] => continue,
            [block] => {
                trace!("get_block: '{}' resolved to {} in {}", block_name, block, tree);
                return Ok(*block);
            }
            _ => {
                return Err(AnalyzerError::DuplicateBlock {
                    name: block_name.to_owned(),
                })
            }
        }
    }
    Err(AnalyzerError::BlockNotFound {
        name: block_name.to_owned(),
    })
}

/// Every outermost schedule block of every function, in function order.
pub fn get_all_blocks(module: &ModuleExpr) -> Result<Vec<ExprId>, AnalyzerError> {
    let mut result = Vec::new();
    for &tree in module.exprs() {
        result.extend(FindBlocksVisitor::new(None).find(module, tree));
    }
    if result.is_empty() {
        return Err(AnalyzerError::NoBlocks);
    }
    Ok(result)
}

/// The loops enclosing `block`, outermost first.
///
/// The block is located by name. It must occur in exactly one function; a
/// block that occurs outside any loop yields an empty list, and one that
/// occurs in no function is `BlockNotFound`.
pub fn get_loops(module: &ModuleExpr, block: ExprId) -> Result<Vec<ExprId>, AnalyzerError> {
    let block_name = get_block_name(module, block)?;
    let mut result: Option<Vec<ExprId>> = None;
    for &tree in module.exprs() {
        if let Some(loops) = FindLoopsVisitor::new(block_name).find(module, tree) {
            if result.is_some() {
                return Err(AnalyzerError::BlockInMultipleTrees {
                    name: block_name.to_owned(),
                });
            }
            result = Some(loops);
        }
    }
    let loops = result.ok_or_else(|| AnalyzerError::BlockNotFound {
        name: block_name.to_owned(),
    })?;
    debug!("get_loops: '{}' is nested in {} loop(s)", block_name, loops.len());
    Ok(loops)
}

/// `get_loops` for the block named `block_name`.
pub fn get_loops_by_name(
    module: &ModuleExpr,
    block_name: &str,
) -> Result<Vec<ExprId>, AnalyzerError> {
    let block = get_block(module, block_name)?;
    get_loops(module, block)
}

/// The outermost schedule blocks nested under a loop or a block.
pub fn get_child_blocks(module: &ModuleExpr, expr: ExprId) -> Result<Vec<ExprId>, AnalyzerError> {
    match module.node(expr) {
        ExprNode::ScheduleBlockRealize(_) | ExprNode::For(_) => {
            Ok(FindBlocksVisitor::new(None).find(module, expr))
        }
        _ => Err(unexpected_node(module, expr, "ScheduleBlockRealize or For")),
    }
}

/// The root realize of a function's top-level tree.
pub fn get_root_sblock(module: &ModuleExpr, tree: ExprId) -> Result<ExprId, AnalyzerError> {
    let block = module
        .node(tree)
        .as_block()
        .ok_or_else(|| AnalyzerError::MalformedRoot {
            detail: format!(
                "top-level tree must be a Block, found {}",
                module.node(tree).kind_name()
            ),
        })?;
    let [root] = block.stmts.as_slice() else {
        return Err(AnalyzerError::MalformedRoot {
            detail: format!(
                "root block must have exactly one statement, found {}",
                block.stmts.len()
            ),
        });
    };
    if module.node(*root).as_realize().is_none() {
        return Err(AnalyzerError::MalformedRoot {
            detail: format!(
                "root statement must be a ScheduleBlockRealize, found {}",
                module.node(*root).kind_name()
            ),
        });
    }
    Ok(*root)
}

/// The root realize of the function whose tree contains the node `expr`.
pub fn get_root_block(module: &ModuleExpr, expr: ExprId) -> Result<ExprId, AnalyzerError> {
    for &tree in module.exprs() {
        if contains(module, tree, expr) {
            return get_root_sblock(module, tree);
        }
    }
    Err(AnalyzerError::ExprNotFound {
        dump: module.display(expr).to_string(),
    })
}

/// The device of the first loop in the first function.
pub fn get_device_api(module: &ModuleExpr) -> Result<DeviceApi, AnalyzerError> {
    let first = module.exprs().first().ok_or(AnalyzerError::NoLoops)?;
    let for_id = find_first(module, *first, |_, node| node.as_for().is_some())
        .ok_or(AnalyzerError::NoLoops)?;
    match module.node(for_id) {
        ExprNode::For(f) => Ok(f.device_api),
        _ => Err(AnalyzerError::NoLoops),
    }
}

/// The name of the schedule block wrapped by the realize `block`.
pub fn get_block_name(module: &ModuleExpr, block: ExprId) -> Result<&str, AnalyzerError> {
    let (_, sblock) = realize_parts(module, block)?;
    Ok(sblock.name.as_str())
}
