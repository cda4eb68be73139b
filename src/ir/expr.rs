use serde::{Deserialize, Serialize};

use crate::ir::var::{BufferRange, Tensor, Var};

/// An opaque index identifying a node within a `ModuleExpr`.
///
/// Invariant: `ExprId(n)` is only valid within the `ModuleExpr` that
/// allocated it. Ids are never reused, so an id names one physical node for
/// the lifetime of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExprId(pub u32);

impl std::fmt::Display for ExprId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%e{}", self.0)
    }
}

/// Binary arithmetic and comparison operators on index/scalar expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Truncating integer division.
    Div,
    Mod,
    Min,
    Max,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    /// True for operators that yield a boolean.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
                | BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::And
                | BinaryOp::Or
        )
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        f.write_str(s)
    }
}

/// How a loop is executed by code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForType {
    #[default]
    Serial,
    Parallel,
    Vectorized,
    Unrolled,
    GpuBlock,
    GpuThread,
}

impl std::fmt::Display for ForType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ForType::Serial => "serial",
            ForType::Parallel => "parallel",
            ForType::Vectorized => "vectorize",
            ForType::Unrolled => "unroll",
            ForType::GpuBlock => "thread_bind[blockIdx]",
            ForType::GpuThread => "thread_bind[threadIdx]",
        };
        f.write_str(s)
    }
}

/// Device a loop nest is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceApi {
    /// Not yet decided; the device of synthetic loops.
    #[default]
    Unknown,
    Host,
    X86,
    Arm,
    Cuda,
    Hip,
    Sycl,
}

impl std::fmt::Display for DeviceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeviceApi::Unknown => "unk",
            DeviceApi::Host => "host",
            DeviceApi::X86 => "x86",
            DeviceApi::Arm => "arm",
            DeviceApi::Cuda => "cuda",
            DeviceApi::Hip => "hip",
            DeviceApi::Sycl => "sycl",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub op: BinaryOp,
    pub lhs: ExprId,
    pub rhs: ExprId,
}

/// A read of one element of `tensor`.
#[derive(Debug, Clone)]
pub struct Load {
    /// Normally a `Tensor` node.
    pub tensor: ExprId,
    pub indices: Vec<ExprId>,
}

/// A write of `value` into one element of `tensor`.
#[derive(Debug, Clone)]
pub struct Store {
    /// Normally a `Tensor` node; analyses that need the tensor reject
    /// anything else.
    pub tensor: ExprId,
    pub value: ExprId,
    pub indices: Vec<ExprId>,
}

/// An opaque call. Tensors passed in `read_args` count as reads of those
/// tensors for consumer analysis.
#[derive(Debug, Clone)]
pub struct Call {
    pub name: String,
    pub read_args: Vec<ExprId>,
    pub write_args: Vec<ExprId>,
}

/// An ordered sequence of statements.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub stmts: Vec<ExprId>,
}

/// A loop over `[min, min + extent)`.
#[derive(Debug, Clone)]
pub struct For {
    pub loop_var: Var,
    pub min: ExprId,
    pub extent: ExprId,
    pub for_type: ForType,
    pub device_api: DeviceApi,
    pub body: ExprId,
}

#[derive(Debug, Clone)]
pub struct IfThenElse {
    pub condition: ExprId,
    pub true_case: ExprId,
    pub false_case: Option<ExprId>,
}

/// A named single-store computation unit.
///
/// Invariants:
/// - `body` contains exactly one `Store`.
/// - `name` is unique among the schedule blocks of one `ModuleExpr`.
/// - `read_buffers`/`write_buffers` are derived; they are filled lazily by
///   `analyzer::analyze_schedule_block_read_write_buffer` and never edited
///   by hand.
#[derive(Debug, Clone)]
pub struct ScheduleBlock {
    pub name: String,
    pub iter_vars: Vec<Var>,
    pub body: ExprId,
    pub read_buffers: Vec<BufferRange>,
    pub write_buffers: Vec<BufferRange>,
    /// When set, this block zero-initializes the accumulator of the named
    /// reduction block. Blocks built without it fall back to the
    /// `__reduce_init` tensor-name convention.
    pub reduce_init_of: Option<String>,
}

/// Binds a `ScheduleBlock`'s iteration variables to concrete index
/// expressions at its call site.
///
/// Invariant: `schedule_block` is a `ScheduleBlock` node declaring exactly
/// `iter_values.len()` iteration variables.
#[derive(Debug, Clone)]
pub struct ScheduleBlockRealize {
    pub iter_values: Vec<ExprId>,
    pub schedule_block: ExprId,
}

/// A node of the schedule IR.
///
/// Children are referenced by `ExprId`; no node refers to its parent.
#[derive(Debug, Clone)]
pub enum ExprNode {
    IntImm(i64),
    FloatImm(f64),
    Var(Var),
    Tensor(Tensor),
    Binary(Binary),
    Load(Load),
    Store(Store),
    Call(Call),
    Block(Block),
    For(For),
    IfThenElse(IfThenElse),
    ScheduleBlock(ScheduleBlock),
    ScheduleBlockRealize(ScheduleBlockRealize),
}

impl ExprNode {
    /// Short variant name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ExprNode::IntImm(_) => "IntImm",
            ExprNode::FloatImm(_) => "FloatImm",
            ExprNode::Var(_) => "Var",
            ExprNode::Tensor(_) => "Tensor",
            ExprNode::Binary(_) => "Binary",
            ExprNode::Load(_) => "Load",
            ExprNode::Store(_) => "Store",
            ExprNode::Call(_) => "Call",
            ExprNode::Block(_) => "Block",
            ExprNode::For(_) => "For",
            ExprNode::IfThenElse(_) => "IfThenElse",
            ExprNode::ScheduleBlock(_) => "ScheduleBlock",
            ExprNode::ScheduleBlockRealize(_) => "ScheduleBlockRealize",
        }
    }

    /// Child ids in evaluation order.
    ///
    /// The order here and in `children_mut` is identical; mutators rely on
    /// it to write rewritten children back by position.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            ExprNode::IntImm(_)
            | ExprNode::FloatImm(_)
            | ExprNode::Var(_)
            | ExprNode::Tensor(_) => Vec::new(),
            ExprNode::Binary(b) => vec![b.lhs, b.rhs],
            ExprNode::Load(l) => std::iter::once(l.tensor)
                .chain(l.indices.iter().copied())
                .collect(),
            ExprNode::Store(s) => [s.tensor, s.value]
                .into_iter()
                .chain(s.indices.iter().copied())
                .collect(),
            ExprNode::Call(c) => c
                .read_args
                .iter()
                .chain(c.write_args.iter())
                .copied()
                .collect(),
            ExprNode::Block(b) => b.stmts.clone(),
            ExprNode::For(f) => vec![f.min, f.extent, f.body],
            ExprNode::IfThenElse(i) => {
                let mut out = vec![i.condition, i.true_case];
                out.extend(i.false_case);
                out
            }
            ExprNode::ScheduleBlock(sb) => vec![sb.body],
            ExprNode::ScheduleBlockRealize(r) => r
                .iter_values
                .iter()
                .copied()
                .chain(std::iter::once(r.schedule_block))
                .collect(),
        }
    }

    /// Mutable child slots, in the same order as `children`.
    pub fn children_mut(&mut self) -> Vec<&mut ExprId> {
        match self {
            ExprNode::IntImm(_)
            | ExprNode::FloatImm(_)
            | ExprNode::Var(_)
            | ExprNode::Tensor(_) => Vec::new(),
            ExprNode::Binary(b) => vec![&mut b.lhs, &mut b.rhs],
            ExprNode::Load(l) => std::iter::once(&mut l.tensor)
                .chain(l.indices.iter_mut())
                .collect(),
            ExprNode::Store(s) => [&mut s.tensor, &mut s.value]
                .into_iter()
                .chain(s.indices.iter_mut())
                .collect(),
            ExprNode::Call(c) => c.read_args.iter_mut().chain(c.write_args.iter_mut()).collect(),
            ExprNode::Block(b) => b.stmts.iter_mut().collect(),
            ExprNode::For(f) => vec![&mut f.min, &mut f.extent, &mut f.body],
            ExprNode::IfThenElse(i) => {
                let mut out = vec![&mut i.condition, &mut i.true_case];
                out.extend(i.false_case.as_mut());
                out
            }
            ExprNode::ScheduleBlock(sb) => vec![&mut sb.body],
            ExprNode::ScheduleBlockRealize(r) => r
                .iter_values
                .iter_mut()
                .chain(std::iter::once(&mut r.schedule_block))
                .collect(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ExprNode::IntImm(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&Var> {
        match self {
            ExprNode::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            ExprNode::Tensor(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_load(&self) -> Option<&Load> {
        match self {
            ExprNode::Load(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_store(&self) -> Option<&Store> {
        match self {
            ExprNode::Store(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            ExprNode::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_for(&self) -> Option<&For> {
        match self {
            ExprNode::For(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_schedule_block(&self) -> Option<&ScheduleBlock> {
        match self {
            ExprNode::ScheduleBlock(sb) => Some(sb),
            _ => None,
        }
    }

    pub fn as_realize(&self) -> Option<&ScheduleBlockRealize> {
        match self {
            ExprNode::ScheduleBlockRealize(r) => Some(r),
            _ => None,
        }
    }

    /// The value of an integer literal, or of a float literal holding an
    /// integral value that fits in `i64`.
    pub fn as_const_int(&self) -> Option<i64> {
        match self {
            ExprNode::IntImm(v) => Some(*v),
            ExprNode::FloatImm(v)
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 =>
            {
                Some(*v as i64)
            }
            _ => None,
        }
    }

    /// True for a literal equal to zero.
    pub fn is_zero(&self) -> bool {
        match self {
            ExprNode::IntImm(v) => *v == 0,
            ExprNode::FloatImm(v) => *v == 0.0,
            _ => false,
        }
    }
}
