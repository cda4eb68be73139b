//! JSON form of a `ModuleExpr`.
//!
//! ## Document format
//!
//! ```text
//! { "name": <string>, "functions": [<expr>, ...] }
//! ```
//!
//! Each `<expr>` is an object tagged by `"kind"`:
//! `int`, `float`, `var`, `tensor`, `binary`, `load`, `store`, `call`,
//! `block`, `for`, `if`, `schedule_block`, `schedule_block_realize`.
//! Children are nested objects, so a document is a plain tree; importing
//! allocates fresh nodes for every object it reads.
//!
//! Example:
//!
//! ```text
//! { "kind": "for",
//!   "loop_var": { "name": "i" },
//!   "min": { "kind": "int", "value": 0 },
//!   "extent": { "kind": "int", "value": 32 },
//!   "body": { "kind": "block", "stmts": [] } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SerialError;
use crate::ir::expr::{BinaryOp, DeviceApi, ExprId, ExprNode, ForType, ScheduleBlock};
use crate::ir::module::ModuleExpr;
use crate::ir::var::{BufferRange, Tensor, Var};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDoc {
    pub name: String,
    #[serde(default)]
    pub functions: Vec<ExprDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprDoc {
    Int {
        value: i64,
    },
    Float {
        value: f64,
    },
    Var(Var),
    Tensor(Tensor),
    Binary {
        op: BinaryOp,
        lhs: Box<ExprDoc>,
        rhs: Box<ExprDoc>,
    },
    Load {
        tensor: Box<ExprDoc>,
        #[serde(default)]
        indices: Vec<ExprDoc>,
    },
    Store {
        tensor: Box<ExprDoc>,
        value: Box<ExprDoc>,
        #[serde(default)]
        indices: Vec<ExprDoc>,
    },
    Call {
        name: String,
        #[serde(default)]
        read_args: Vec<ExprDoc>,
        #[serde(default)]
        write_args: Vec<ExprDoc>,
    },
    Block {
        #[serde(default)]
        stmts: Vec<ExprDoc>,
    },
    For {
        loop_var: Var,
        min: Box<ExprDoc>,
        extent: Box<ExprDoc>,
        #[serde(default)]
        for_type: ForType,
        #[serde(default)]
        device_api: DeviceApi,
        body: Box<ExprDoc>,
    },
    If {
        condition: Box<ExprDoc>,
        true_case: Box<ExprDoc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        false_case: Option<Box<ExprDoc>>,
    },
    ScheduleBlock {
        name: String,
        #[serde(default)]
        iter_vars: Vec<Var>,
        body: Box<ExprDoc>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        read_buffers: Vec<BufferRange>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        write_buffers: Vec<BufferRange>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reduce_init_of: Option<String>,
    },
    ScheduleBlockRealize {
        #[serde(default)]
        iter_values: Vec<ExprDoc>,
        schedule_block: Box<ExprDoc>,
    },
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Parses a JSON module document.
pub fn module_from_json(text: &str) -> Result<ModuleExpr, SerialError> {
    let doc: ModuleDoc = serde_json::from_str(text)?;
    import_module(&doc)
}

/// Builds a module from a parsed document, one function per entry.
pub fn import_module(doc: &ModuleDoc) -> Result<ModuleExpr, SerialError> {
    let mut module = ModuleExpr::new(doc.name.clone());
    for function in &doc.functions {
        let root = import_expr(&mut module, function)?;
        module.add_expr(root);
    }
    Ok(module)
}

fn import_all(module: &mut ModuleExpr, docs: &[ExprDoc]) -> Result<Vec<ExprId>, SerialError> {
    docs.iter().map(|d| import_expr(module, d)).collect()
}

/// Allocates the tree described by `doc` and returns its root.
pub fn import_expr(module: &mut ModuleExpr, doc: &ExprDoc) -> Result<ExprId, SerialError> {
    let id = match doc {
        ExprDoc::Int { value } => module.make_int(*value),
        ExprDoc::Float { value } => module.make_float(*value),
        ExprDoc::Var(var) => module.make_var(var.clone()),
        ExprDoc::Tensor(tensor) => module.make_tensor(tensor.clone()),
        ExprDoc::Binary { op, lhs, rhs } => {
            let lhs = import_expr(module, lhs)?;
            let rhs = import_expr(module, rhs)?;
            module.make_binary(*op, lhs, rhs)
        }
        ExprDoc::Load { tensor, indices } => {
            let tensor = import_expr(module, tensor)?;
            let indices = import_all(module, indices)?;
            module.make_load(tensor, indices)
        }
        ExprDoc::Store {
            tensor,
            value,
            indices,
        } => {
            let tensor = import_expr(module, tensor)?;
            let value = import_expr(module, value)?;
            let indices = import_all(module, indices)?;
            module.make_store(tensor, value, indices)
        }
        ExprDoc::Call {
            name,
            read_args,
            write_args,
        } => {
            let read_args = import_all(module, read_args)?;
            let write_args = import_all(module, write_args)?;
            module.make_call(name.clone(), read_args, write_args)
        }
        ExprDoc::Block { stmts } => {
            let stmts = import_all(module, stmts)?;
            module.make_block(stmts)
        }
        ExprDoc::For {
            loop_var,
            min,
            extent,
            for_type,
            device_api,
            body,
        } => {
            let min = import_expr(module, min)?;
            let extent = import_expr(module, extent)?;
            let body = import_expr(module, body)?;
            module.make_for(loop_var.clone(), min, extent, *for_type, *device_api, body)
        }
        ExprDoc::If {
            condition,
            true_case,
            false_case,
        } => {
            let condition = import_expr(module, condition)?;
            let true_case = import_expr(module, true_case)?;
            let false_case = match false_case {
                Some(doc) => Some(import_expr(module, doc)?),
                None => None,
            };
            module.make_if(condition, true_case, false_case)
        }
        ExprDoc::ScheduleBlock {
            name,
            iter_vars,
            body,
            read_buffers,
            write_buffers,
            reduce_init_of,
        } => {
            let body = import_expr(module, body)?;
            // Cached buffer ranges go through `alloc` so their names are reserved.
            module.alloc(ExprNode::ScheduleBlock(ScheduleBlock {
                name: name.clone(),
                iter_vars: iter_vars.clone(),
                body,
                read_buffers: read_buffers.clone(),
                write_buffers: write_buffers.clone(),
                reduce_init_of: reduce_init_of.clone(),
            }))
        }
        ExprDoc::ScheduleBlockRealize {
            iter_values,
            schedule_block,
        } => {
            let ExprDoc::ScheduleBlock { name, iter_vars, .. } = schedule_block.as_ref() else {
                return Err(SerialError::Structure {
                    detail: "a schedule_block_realize must wrap a schedule_block".into(),
                });
            };
            if iter_vars.len() != iter_values.len() {
                return Err(SerialError::Structure {
                    detail: format!(
                        "block '{}' declares {} iteration variable(s) but its realize binds {}",
                        name,
                        iter_vars.len(),
                        iter_values.len()
                    ),
                });
            }
            let iter_values = import_all(module, iter_values)?;
            let schedule_block = import_expr(module, schedule_block)?;
            module.make_realize(iter_values, schedule_block)
        }
    };
    Ok(id)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Serializes every function of `module` as a pretty-printed document.
pub fn module_to_json(module: &ModuleExpr) -> Result<String, SerialError> {
    Ok(serde_json::to_string_pretty(&export_module(module))?)
}

pub fn export_module(module: &ModuleExpr) -> ModuleDoc {
    ModuleDoc {
        name: module.name.clone(),
        functions: module
            .exprs()
            .iter()
            .map(|&root| export_expr(module, root))
            .collect(),
    }
}

fn export_all(module: &ModuleExpr, ids: &[ExprId]) -> Vec<ExprDoc> {
    ids.iter().map(|&id| export_expr(module, id)).collect()
}

/// The document form of the subtree rooted at `id`.
pub fn export_expr(module: &ModuleExpr, id: ExprId) -> ExprDoc {
    let boxed = |id: ExprId| Box::new(export_expr(module, id));
    match module.node(id) {
        ExprNode::IntImm(value) => ExprDoc::Int { value: *value },
        ExprNode::FloatImm(value) => ExprDoc::Float { value: *value },
        ExprNode::Var(var) => ExprDoc::Var(var.clone()),
        ExprNode::Tensor(tensor) => ExprDoc::Tensor(tensor.clone()),
        ExprNode::Binary(b) => ExprDoc::Binary {
            op: b.op,
            lhs: boxed(b.lhs),
            rhs: boxed(b.rhs),
        },
        ExprNode::Load(l) => ExprDoc::Load {
            tensor: boxed(l.tensor),
            indices: export_all(module, &l.indices),
        },
        ExprNode::Store(s) => ExprDoc::Store {
            tensor: boxed(s.tensor),
            value: boxed(s.value),
            indices: export_all(module, &s.indices),
        },
        ExprNode::Call(c) => ExprDoc::Call {
            name: c.name.clone(),
            read_args: export_all(module, &c.read_args),
            write_args: export_all(module, &c.write_args),
        },
        ExprNode::Block(b) => ExprDoc::Block {
            stmts: export_all(module, &b.stmts),
        },
        ExprNode::For(f) => ExprDoc::For {
            loop_var: f.loop_var.clone(),
            min: boxed(f.min),
            extent: boxed(f.extent),
            for_type: f.for_type,
            device_api: f.device_api,
            body: boxed(f.body),
        },
        ExprNode::IfThenElse(i) => ExprDoc::If {
            condition: boxed(i.condition),
            true_case: boxed(i.true_case),
            false_case: i.false_case.map(boxed),
        },
        ExprNode::ScheduleBlock(sb) => ExprDoc::ScheduleBlock {
            name: sb.name.clone(),
            iter_vars: sb.iter_vars.clone(),
            body: boxed(sb.body),
            read_buffers: sb.read_buffers.clone(),
            write_buffers: sb.write_buffers.clone(),
            reduce_init_of: sb.reduce_init_of.clone(),
        },
        ExprNode::ScheduleBlockRealize(r) => ExprDoc::ScheduleBlockRealize {
            iter_values: export_all(module, &r.iter_values),
            schedule_block: boxed(r.schedule_block),
        },
    }
}
