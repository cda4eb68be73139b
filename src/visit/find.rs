//! Schedule-structure visitors: blocks by name, loops enclosing a block and
//! the structural parent of a block.
//!
//! These walk only statement structure (blocks, loops, branches, schedule
//! blocks). Index and value expressions never contain schedule blocks, so
//! they are pruned.

use crate::ir::expr::{ExprId, ExprNode};
use crate::ir::module::ModuleExpr;
use crate::visit::{walk, IrVisitor};

fn is_structural(node: &ExprNode) -> bool {
    matches!(
        node,
        ExprNode::Block(_)
            | ExprNode::For(_)
            | ExprNode::IfThenElse(_)
            | ExprNode::ScheduleBlock(_)
            | ExprNode::ScheduleBlockRealize(_)
    )
}

// ---------------------------------------------------------------------------
// FindBlocksVisitor
// ---------------------------------------------------------------------------

/// Collects schedule-block realizes.
///
/// A realize that binds no iteration values (a function root) is treated as
/// a container: it is searched but never reported. The node the search
/// starts from is never reported either.
///
/// Without a name filter the visitor reports the outermost blocks under the
/// start node and does not look inside them. With a filter it searches the
/// whole subtree and reports every realize carrying that name, so callers
/// can detect duplicates.
pub struct FindBlocksVisitor<'a> {
    block_name: Option<&'a str>,
    start: Option<ExprId>,
    result: Vec<ExprId>,
}

impl<'a> FindBlocksVisitor<'a> {
    pub fn new(block_name: Option<&'a str>) -> Self {
        Self {
            block_name,
            start: None,
            result: Vec::new(),
        }
    }

    /// Runs the search from `start` and returns the realizes found, in
    /// program order.
    pub fn find(mut self, module: &ModuleExpr, start: ExprId) -> Vec<ExprId> {
        self.start = Some(start);
        walk(&mut self, module, start);
        self.result
    }
}

impl IrVisitor for FindBlocksVisitor<'_> {
    fn visit(&mut self, module: &ModuleExpr, id: ExprId) -> bool {
        let node = module.node(id);
        if !is_structural(node) {
            return false;
        }
        if Some(id) == self.start {
            return true;
        }
        let Some(realize) = node.as_realize() else {
            return true;
        };
        if realize.iter_values.is_empty() {
            return true;
        }
        let name = module.realize_name(id);
        match self.block_name {
            None => {
                self.result.push(id);
                false
            }
            Some(wanted) => {
                if name == Some(wanted) {
                    self.result.push(id);
                }
                true
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FindLoopsVisitor
// ---------------------------------------------------------------------------

/// Finds the `For` nodes enclosing the first block named `block_name`,
/// outermost first.
///
/// Returns `None` if the block does not occur under the start node, and
/// `Some(vec![])` if it occurs outside any loop.
pub struct FindLoopsVisitor<'a> {
    block_name: &'a str,
    father_loops: Vec<ExprId>,
    result: Option<Vec<ExprId>>,
}

impl<'a> FindLoopsVisitor<'a> {
    pub fn new(block_name: &'a str) -> Self {
        Self {
            block_name,
            father_loops: Vec::new(),
            result: None,
        }
    }

    pub fn find(mut self, module: &ModuleExpr, start: ExprId) -> Option<Vec<ExprId>> {
        walk(&mut self, module, start);
        self.result
    }
}

impl IrVisitor for FindLoopsVisitor<'_> {
    fn visit(&mut self, module: &ModuleExpr, id: ExprId) -> bool {
        if self.result.is_some() {
            return false;
        }
        let node = module.node(id);
        match node {
            ExprNode::For(_) => {
                self.father_loops.push(id);
                true
            }
            ExprNode::ScheduleBlockRealize(realize) => {
                if !realize.iter_values.is_empty()
                    && module.realize_name(id) == Some(self.block_name)
                {
                    self.result = Some(self.father_loops.clone());
                    return false;
                }
                true
            }
            other => is_structural(other),
        }
    }

    fn leave(&mut self, module: &ModuleExpr, id: ExprId) {
        if module.node(id).as_for().is_some() {
            self.father_loops.pop();
        }
    }
}

// ---------------------------------------------------------------------------
// FindBlockParent
// ---------------------------------------------------------------------------

/// Finds the nearest `Block`, `For` or `ScheduleBlock` that holds the realize
/// named `block_name` as a direct statement or body. Stops at the first
/// match.
pub struct FindBlockParent<'a> {
    block_name: &'a str,
    target: Option<ExprId>,
}

impl<'a> FindBlockParent<'a> {
    pub fn new(block_name: &'a str) -> Self {
        Self {
            block_name,
            target: None,
        }
    }

    /// Searches `start`; a parent found by an earlier call is kept, so one
    /// visitor can be run over several trees in turn.
    pub fn search(&mut self, module: &ModuleExpr, start: ExprId) -> Option<ExprId> {
        if self.target.is_none() {
            walk(self, module, start);
        }
        self.target
    }

    pub fn target(&self) -> Option<ExprId> {
        self.target
    }

    fn is_target(&self, module: &ModuleExpr, id: ExprId) -> bool {
        module.realize_name(id) == Some(self.block_name)
    }
}

impl IrVisitor for FindBlockParent<'_> {
    fn visit(&mut self, module: &ModuleExpr, id: ExprId) -> bool {
        if self.target.is_some() {
            return false;
        }
        let node = module.node(id);
        let holds_target = match node {
            ExprNode::Block(block) => block.stmts.iter().any(|&s| self.is_target(module, s)),
            ExprNode::For(f) => self.is_target(module, f.body),
            ExprNode::ScheduleBlock(sb) => self.is_target(module, sb.body),
            other => return is_structural(other),
        };
        if holds_target {
            self.target = Some(id);
            return false;
        }
        true
    }
}
