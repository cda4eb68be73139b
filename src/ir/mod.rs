pub mod copy;
pub mod equal;
pub mod expr;
pub mod module;
pub mod name;
pub mod printer;
pub mod serial;
pub mod var;

pub use copy::ir_copy;
pub use equal::structural_eq;
pub use expr::{
    Binary, BinaryOp, Block, Call, DeviceApi, ExprId, ExprNode, For, ForType, IfThenElse, Load,
    ScheduleBlock, ScheduleBlockRealize, Store,
};
pub use module::{ModuleExpr, ROOT_BLOCK_NAME};
pub use name::NameGenerator;
pub use printer::emit_module_text;
pub use serial::{module_from_json, module_to_json};
pub use var::{Buffer, BufferRange, Tensor, Var};
