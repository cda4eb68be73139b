//! Structural query and mutation layer over a loop-schedule tensor IR.
//!
//! A lowered function is a tree of loops, blocks and *schedule blocks*:
//! named single-store computation units whose iteration variables are bound
//! to index expressions at a realize site. Scheduling passes (tiling,
//! fusion, vectorization) drive their rewrites through the primitives here.
//!
//! ```text
//! ModuleExpr (arena of ExprNode, one top-level tree per function)
//!   → visit::*     read-only walkers (blocks by name, enclosing loops, parents)
//!   → mutate::*    rewriters (variable substitution)
//!   → arith::*     index simplification and interval bounds
//!   → analyzer::*  block lookup, unit loops, consumers, classification,
//!                  buffer-range inference
//! ```
//!
//! Every top-level tree is a single-statement `Block` holding the function's
//! root realize. Schedule-block names are unique within a module.

pub mod analyzer;
pub mod arith;
pub mod cli;
pub mod error;
pub mod ir;
pub mod mutate;
pub mod visit;

pub use error::{AnalyzerError, Error, SerialError};
pub use ir::{ExprId, ExprNode, ModuleExpr};
