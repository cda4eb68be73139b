//! Naming conventions shared with the lowering stages.
//!
//! Two conventions are relied on outside this crate:
//!
//! - the reduction-init suffix: the zero-initialization half of a split
//!   reduction writes a tensor named `<original>__reduce_init`;
//! - unique synthetic names: loop inductors and buffer-range variables are
//!   named `<prefix>_<n>` and never collide with a name already present in
//!   the same module.

use std::collections::{HashMap, HashSet};

/// Suffix marking a reduction's zero-initialization tensor.
pub const REDUCE_INIT_SUFFIX: &str = "__reduce_init";

/// Name of the tensor written by the initialization block of `name`.
pub fn reduce_init_tensor_name(name: &str) -> String {
    format!("{}{}", name, REDUCE_INIT_SUFFIX)
}

/// True if `name` is `<original>__reduce_init` with a non-empty original.
pub fn is_reduce_init_tensor_name(name: &str) -> bool {
    name.len() > REDUCE_INIT_SUFFIX.len() && name.ends_with(REDUCE_INIT_SUFFIX)
}

/// Strips the reduction-init suffix. Names without it are returned unchanged.
pub fn original_reduce_tensor_name(name: &str) -> &str {
    if is_reduce_init_tensor_name(name) {
        &name[..name.len() - REDUCE_INIT_SUFFIX.len()]
    } else {
        name
    }
}

/// Collision-free name source for one compilation unit.
///
/// Every name the module sees (variables, tensors, buffers, blocks) is
/// reserved as nodes are allocated, so `fresh` never returns a name that
/// already occurs in the module.
#[derive(Debug, Default, Clone)]
pub struct NameGenerator {
    used: HashSet<String>,
    counters: HashMap<String, u32>,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as taken.
    pub fn reserve(&mut self, name: &str) {
        if !self.used.contains(name) {
            self.used.insert(name.to_owned());
        }
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Returns `<prefix>_<n>` for the smallest per-prefix counter value that
    /// is not already taken, and reserves it.
    pub fn fresh(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_owned()).or_insert(0);
        loop {
            let candidate = format!("{}_{}", prefix, counter);
            *counter += 1;
            if !self.used.contains(&candidate) {
                self.used.insert(candidate.clone());
                return candidate;
            }
        }
    }
}
