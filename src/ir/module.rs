use crate::ir::expr::{
    Binary, BinaryOp, Block, Call, DeviceApi, ExprId, ExprNode, For, ForType, IfThenElse, Load,
    ScheduleBlock, ScheduleBlockRealize, Store,
};
use crate::ir::name::NameGenerator;
use crate::ir::var::{Tensor, Var};

/// Name given to the container schedule block at the top of every tree.
pub const ROOT_BLOCK_NAME: &str = "root";

/// The owning container of a set of lowered functions.
///
/// Nodes live in a flat arena indexed by `ExprId`; `exprs` lists the
/// top-level tree of each function in order. Every top-level tree is a
/// single-statement `Block` whose statement is the function's root
/// `ScheduleBlockRealize`.
///
/// Invariants:
/// - `ExprId(n)` always indexes `nodes[n]`; nodes are never removed.
/// - No node stores a reference to its parent. Parent relations are
///   recomputed by walking down from `exprs`.
#[derive(Debug, Default, Clone)]
pub struct ModuleExpr {
    pub name: String,
    nodes: Vec<ExprNode>,
    exprs: Vec<ExprId>,
    names: NameGenerator,
}

impl ModuleExpr {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            exprs: Vec::new(),
            names: NameGenerator::new(),
        }
    }

    /// The top-level trees, one per function, in registration order.
    pub fn exprs(&self) -> &[ExprId] {
        &self.exprs
    }

    /// Registers `root` as the top-level tree of a new function.
    pub fn add_expr(&mut self, root: ExprId) {
        self.exprs.push(root);
    }

    /// Returns the node behind `id`.
    ///
    /// Panics if `id` was not allocated by this module.
    pub fn node(&self, id: ExprId) -> &ExprNode {
        &self.nodes[id.0 as usize]
    }

    /// Mutable access for passes that rewrite nodes in place.
    pub fn node_mut(&mut self, id: ExprId) -> &mut ExprNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Number of allocated nodes, live or orphaned.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Appends a node to the arena and reserves every name it introduces.
    pub fn alloc(&mut self, node: ExprNode) -> ExprId {
        match &node {
            ExprNode::Var(v) => self.names.reserve(&v.name),
            ExprNode::Tensor(t) => {
                self.names.reserve(&t.name);
                self.names.reserve(&t.buffer.name);
            }
            ExprNode::For(f) => self.names.reserve(&f.loop_var.name),
            ExprNode::ScheduleBlock(sb) => {
                self.names.reserve(&sb.name);
                for var in &sb.iter_vars {
                    self.names.reserve(&var.name);
                }
                for range in sb.read_buffers.iter().chain(&sb.write_buffers) {
                    self.names.reserve(&range.buffer.name);
                    for var in &range.ranges {
                        self.names.reserve(&var.name);
                    }
                }
            }
            _ => {}
        }
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// The schedule-block name behind a realize, or `None` if `id` is not a
    /// realize wrapping a `ScheduleBlock`.
    pub fn realize_name(&self, id: ExprId) -> Option<&str> {
        let realize = self.node(id).as_realize()?;
        self.node(realize.schedule_block)
            .as_schedule_block()
            .map(|sb| sb.name.as_str())
    }

    /// Returns a name of the form `<prefix>_<n>` unused anywhere in this
    /// module, and reserves it.
    pub fn fresh_name(&mut self, prefix: &str) -> String {
        self.names.fresh(prefix)
    }

    // ---- Constructors -----------------------------------------------------

    pub fn make_int(&mut self, value: i64) -> ExprId {
        self.alloc(ExprNode::IntImm(value))
    }

    pub fn make_float(&mut self, value: f64) -> ExprId {
        self.alloc(ExprNode::FloatImm(value))
    }

    pub fn make_var(&mut self, var: Var) -> ExprId {
        self.alloc(ExprNode::Var(var))
    }

    pub fn make_tensor(&mut self, tensor: Tensor) -> ExprId {
        self.alloc(ExprNode::Tensor(tensor))
    }

    pub fn make_binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.alloc(ExprNode::Binary(Binary { op, lhs, rhs }))
    }

    pub fn make_add(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.make_binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn make_sub(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.make_binary(BinaryOp::Sub, lhs, rhs)
    }

    pub fn make_mul(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.make_binary(BinaryOp::Mul, lhs, rhs)
    }

    pub fn make_load(&mut self, tensor: ExprId, indices: Vec<ExprId>) -> ExprId {
        self.alloc(ExprNode::Load(Load { tensor, indices }))
    }

    pub fn make_store(&mut self, tensor: ExprId, value: ExprId, indices: Vec<ExprId>) -> ExprId {
        self.alloc(ExprNode::Store(Store {
            tensor,
            value,
            indices,
        }))
    }

    pub fn make_call(
        &mut self,
        name: impl Into<String>,
        read_args: Vec<ExprId>,
        write_args: Vec<ExprId>,
    ) -> ExprId {
        self.alloc(ExprNode::Call(Call {
            name: name.into(),
            read_args,
            write_args,
        }))
    }

    pub fn make_block(&mut self, stmts: Vec<ExprId>) -> ExprId {
        self.alloc(ExprNode::Block(Block { stmts }))
    }

    pub fn make_for(
        &mut self,
        loop_var: Var,
        min: ExprId,
        extent: ExprId,
        for_type: ForType,
        device_api: DeviceApi,
        body: ExprId,
    ) -> ExprId {
        self.alloc(ExprNode::For(For {
            loop_var,
            min,
            extent,
            for_type,
            device_api,
            body,
        }))
    }

    /// A serial loop `for (var, 0, extent)` on `device_api`.
    pub fn make_serial_for(
        &mut self,
        loop_var: Var,
        extent: i64,
        device_api: DeviceApi,
        body: ExprId,
    ) -> ExprId {
        let min = self.make_int(0);
        let extent = self.make_int(extent);
        self.make_for(loop_var, min, extent, ForType::Serial, device_api, body)
    }

    pub fn make_if(
        &mut self,
        condition: ExprId,
        true_case: ExprId,
        false_case: Option<ExprId>,
    ) -> ExprId {
        self.alloc(ExprNode::IfThenElse(IfThenElse {
            condition,
            true_case,
            false_case,
        }))
    }

    pub fn make_schedule_block(
        &mut self,
        name: impl Into<String>,
        iter_vars: Vec<Var>,
        body: ExprId,
    ) -> ExprId {
        self.alloc(ExprNode::ScheduleBlock(ScheduleBlock {
            name: name.into(),
            iter_vars,
            body,
            read_buffers: Vec::new(),
            write_buffers: Vec::new(),
            reduce_init_of: None,
        }))
    }

    pub fn make_realize(&mut self, iter_values: Vec<ExprId>, schedule_block: ExprId) -> ExprId {
        self.alloc(ExprNode::ScheduleBlockRealize(ScheduleBlockRealize {
            iter_values,
            schedule_block,
        }))
    }

    /// Builds a named compute block and its realize in one step. Returns the
    /// realize.
    pub fn make_compute_block(
        &mut self,
        name: impl Into<String>,
        iter_vars: Vec<Var>,
        iter_values: Vec<ExprId>,
        body: ExprId,
    ) -> ExprId {
        let sblock = self.make_schedule_block(name, iter_vars, body);
        self.make_realize(iter_values, sblock)
    }

    /// Wraps `stmts` in the root schedule block of a new function, registers
    /// the resulting tree and returns its top-level `Block`.
    pub fn add_function_body(&mut self, stmts: Vec<ExprId>) -> ExprId {
        let body = self.make_block(stmts);
        let root_block = self.make_schedule_block(ROOT_BLOCK_NAME, Vec::new(), body);
        let root = self.make_realize(Vec::new(), root_block);
        let top = self.make_block(vec![root]);
        self.add_expr(top);
        top
    }
}
