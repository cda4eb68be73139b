//! IR pretty-printer.
//!
//! Emits a human-readable text form of a subtree or a whole module. Output
//! is deterministic: statements in program order, functions in registration
//! order. Used for error context and by the CLI `dump` command.

use std::fmt::{self, Write};

use crate::ir::expr::{BinaryOp, ExprId, ExprNode};
use crate::ir::module::ModuleExpr;

/// `Display` adapter returned by `ModuleExpr::display`.
pub struct ExprDisplay<'a> {
    module: &'a ModuleExpr,
    id: ExprId,
}

impl ModuleExpr {
    /// Formats the subtree rooted at `id`.
    pub fn display(&self, id: ExprId) -> ExprDisplay<'_> {
        ExprDisplay { module: self, id }
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        emit_stmt(&mut out, self.module, self.id, 0)?;
        f.write_str(out.trim_end_matches('\n'))
    }
}

/// Emits a full text dump of every function in the module.
pub fn emit_module_text(module: &ModuleExpr) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "// module: {}", module.name)?;
    for (i, &root) in module.exprs().iter().enumerate() {
        writeln!(out, "\n// function {}", i)?;
        emit_stmt(&mut out, module, root, 0)?;
    }
    Ok(out)
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn is_statement(node: &ExprNode) -> bool {
    matches!(
        node,
        ExprNode::Block(_)
            | ExprNode::For(_)
            | ExprNode::IfThenElse(_)
            | ExprNode::ScheduleBlock(_)
            | ExprNode::ScheduleBlockRealize(_)
            | ExprNode::Store(_)
    )
}

fn emit_stmt(out: &mut String, module: &ModuleExpr, id: ExprId, level: usize) -> fmt::Result {
    let node = module.node(id);
    match node {
        ExprNode::Block(block) => {
            indent(out, level);
            out.push_str("{\n");
            for &stmt in &block.stmts {
                emit_stmt(out, module, stmt, level + 1)?;
            }
            indent(out, level);
            out.push_str("}\n");
        }
        ExprNode::For(f) => {
            indent(out, level);
            write!(out, "{} for ({}, ", f.for_type, f.loop_var.name)?;
            emit_expr(out, module, f.min)?;
            out.push_str(", ");
            emit_expr(out, module, f.extent)?;
            out.push_str(")\n");
            emit_body(out, module, f.body, level)?;
        }
        ExprNode::IfThenElse(ite) => {
            indent(out, level);
            out.push_str("if (");
            emit_expr(out, module, ite.condition)?;
            out.push_str(")\n");
            emit_body(out, module, ite.true_case, level)?;
            if let Some(false_case) = ite.false_case {
                indent(out, level);
                out.push_str("else\n");
                emit_body(out, module, false_case, level)?;
            }
        }
        ExprNode::ScheduleBlock(sb) => {
            indent(out, level);
            writeln!(out, "ScheduleBlock({})", sb.name)?;
            emit_body(out, module, sb.body, level)?;
        }
        ExprNode::ScheduleBlockRealize(realize) => {
            match module.node(realize.schedule_block).as_schedule_block() {
                Some(sb) => {
                    indent(out, level);
                    writeln!(out, "ScheduleBlock({})", sb.name)?;
                    indent(out, level);
                    out.push_str("{\n");
                    if !sb.iter_vars.is_empty() || !realize.iter_values.is_empty() {
                        indent(out, level + 1);
                        let names: Vec<&str> =
                            sb.iter_vars.iter().map(|v| v.name.as_str()).collect();
                        write!(out, "{} = axis.bind(", names.join(", "))?;
                        emit_list(out, module, &realize.iter_values)?;
                        out.push_str(")\n");
                    }
                    match module.node(sb.body) {
                        ExprNode::Block(block) => {
                            for &stmt in &block.stmts {
                                emit_stmt(out, module, stmt, level + 1)?;
                            }
                        }
                        _ => emit_stmt(out, module, sb.body, level + 1)?,
                    }
                    indent(out, level);
                    out.push_str("}\n");
                }
                None => {
                    indent(out, level);
                    out.push_str("realize(");
                    emit_list(out, module, &realize.iter_values)?;
                    out.push_str(")\n");
                    emit_body(out, module, realize.schedule_block, level)?;
                }
            }
        }
        ExprNode::Store(store) => {
            indent(out, level);
            emit_expr(out, module, store.tensor)?;
            out.push('[');
            emit_list(out, module, &store.indices)?;
            out.push_str("] = ");
            emit_expr(out, module, store.value)?;
            out.push('\n');
        }
        _ => {
            indent(out, level);
            emit_expr(out, module, id)?;
            out.push('\n');
        }
    }
    Ok(())
}

/// Emits a loop/branch body, adding braces when the body is not a block.
fn emit_body(out: &mut String, module: &ModuleExpr, id: ExprId, level: usize) -> fmt::Result {
    if module.node(id).as_block().is_some() {
        return emit_stmt(out, module, id, level);
    }
    indent(out, level);
    out.push_str("{\n");
    emit_stmt(out, module, id, level + 1)?;
    indent(out, level);
    out.push_str("}\n");
    Ok(())
}

fn emit_list(out: &mut String, module: &ModuleExpr, ids: &[ExprId]) -> fmt::Result {
    for (i, &id) in ids.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        emit_expr(out, module, id)?;
    }
    Ok(())
}

fn emit_expr(out: &mut String, module: &ModuleExpr, id: ExprId) -> fmt::Result {
    match module.node(id) {
        ExprNode::IntImm(v) => write!(out, "{}", v)?,
        ExprNode::FloatImm(v) => write!(out, "{:?}f", v)?,
        ExprNode::Var(v) => out.push_str(&v.name),
        ExprNode::Tensor(t) => out.push_str(&t.name),
        ExprNode::Binary(b) => {
            if matches!(b.op, BinaryOp::Min | BinaryOp::Max) {
                write!(out, "{}(", b.op)?;
                emit_expr(out, module, b.lhs)?;
                out.push_str(", ");
                emit_expr(out, module, b.rhs)?;
                out.push(')');
            } else {
                out.push('(');
                emit_expr(out, module, b.lhs)?;
                write!(out, " {} ", b.op)?;
                emit_expr(out, module, b.rhs)?;
                out.push(')');
            }
        }
        ExprNode::Load(load) => {
            emit_expr(out, module, load.tensor)?;
            out.push('[');
            emit_list(out, module, &load.indices)?;
            out.push(']');
        }
        ExprNode::Call(call) => {
            write!(out, "{}(", call.name)?;
            let args: Vec<ExprId> = call
                .read_args
                .iter()
                .chain(&call.write_args)
                .copied()
                .collect();
            emit_list(out, module, &args)?;
            out.push(')');
        }
        node if is_statement(node) => {
            // Statement in expression position: print it inline on one line.
            let mut nested = String::new();
            emit_stmt(&mut nested, module, id, 0)?;
            out.push_str(&nested.split_whitespace().collect::<Vec<_>>().join(" "));
        }
        _ => out.push_str("<?>"),
    }
    Ok(())
}
