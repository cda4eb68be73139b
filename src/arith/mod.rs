//! Integer arithmetic over index expressions: simplification and interval
//! bounds.

pub mod bound;
pub mod simplify;

pub use bound::{BoundAnalyzer, Interval};
pub use simplify::{fold_int, simplify, ArithSimplifier};
