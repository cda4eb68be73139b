use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A named scalar symbol: loop inductor, block iteration variable, or a
/// synthetic variable describing one dimension of a buffer range.
///
/// Bounds are inclusive; `None` means unbounded on that side.
///
/// Identity is the name: two `Var`s with the same name compare equal and
/// hash identically regardless of bounds or reduction flag. Names are kept
/// unique per `ModuleExpr` by its `NameGenerator`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Var {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<i64>,
    /// Set on iteration variables that are accumulated over.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_reduce_axis: bool,
}

impl Var {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower_bound: None,
            upper_bound: None,
            is_reduce_axis: false,
        }
    }

    /// A variable ranging over `[lower, upper]`.
    pub fn with_bounds(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self {
            name: name.into(),
            lower_bound: Some(lower),
            upper_bound: Some(upper),
            is_reduce_axis: false,
        }
    }

    /// A variable ranging over `[0, extent - 1]`, the usual shape of an
    /// iteration variable declared with an extent.
    pub fn with_extent(name: impl Into<String>, extent: i64) -> Self {
        Self::with_bounds(name, 0, extent - 1)
    }

    /// Marks this variable as a reduction axis.
    pub fn reduce(mut self) -> Self {
        self.is_reduce_axis = true;
        self
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Var {}

impl Hash for Var {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Backing storage of a tensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buffer {
    pub name: String,
    #[serde(default)]
    pub shape: Vec<i64>,
}

/// A named multi-dimensional value read by `Load` and written by `Store`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tensor {
    pub name: String,
    #[serde(default)]
    pub shape: Vec<i64>,
    pub buffer: Buffer,
}

impl Tensor {
    /// A tensor bound to its own buffer, named `_<name>`.
    pub fn new(name: impl Into<String>, shape: Vec<i64>) -> Self {
        let name = name.into();
        let buffer = Buffer {
            name: format!("_{}", name),
            shape: shape.clone(),
        };
        Self { name, shape, buffer }
    }
}

/// The inferred access footprint of one buffer: one synthetic variable per
/// indexed dimension whose bounds cover the accessed positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferRange {
    pub buffer: Buffer,
    pub ranges: Vec<Var>,
}

impl BufferRange {
    pub fn new(buffer: Buffer, ranges: Vec<Var>) -> Self {
        Self { buffer, ranges }
    }
}

impl std::fmt::Display for BufferRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[", self.buffer.name)?;
        for (i, var) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let lo = var.lower_bound.map_or_else(|| "-inf".to_owned(), |b| b.to_string());
            let hi = var.upper_bound.map_or_else(|| "+inf".to_owned(), |b| b.to_string());
            write!(f, "{}:[{}, {}]", var.name, lo, hi)?;
        }
        f.write_str("]")
    }
}
