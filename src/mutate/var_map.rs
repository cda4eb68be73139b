use std::collections::HashMap;

use crate::ir::copy::ir_copy;
use crate::ir::expr::{ExprId, ExprNode};
use crate::ir::module::ModuleExpr;
use crate::mutate::{walk_mut, IrMutator};

/// Replaces every `Var` node whose name is a key of the mapping with a
/// fresh copy of the mapped expression.
///
/// Loop inductors and declared iteration variables are binders, not
/// references, and are left alone.
pub struct MappingVarToExprMutator {
    mapping: HashMap<String, ExprId>,
}

impl MappingVarToExprMutator {
    pub fn new(mapping: HashMap<String, ExprId>) -> Self {
        Self { mapping }
    }
}

impl IrMutator for MappingVarToExprMutator {
    fn mutate(&mut self, module: &mut ModuleExpr, id: ExprId) -> ExprId {
        if let ExprNode::Var(var) = module.node(id) {
            let target = self.mapping.get(&var.name).copied();
            return match target {
                Some(target) => ir_copy(module, target),
                None => id,
            };
        }
        walk_mut(self, module, id);
        id
    }
}
