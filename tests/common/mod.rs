//! Builder-constructed modules shared by the integration tests.

#![allow(dead_code)]

use schedule_ir::ir::{DeviceApi, ExprId, ModuleExpr, Tensor, Var};

pub fn var(m: &mut ModuleExpr, v: &Var) -> ExprId {
    m.make_var(v.clone())
}

pub fn int(m: &mut ModuleExpr, value: i64) -> ExprId {
    m.make_int(value)
}

pub fn load(m: &mut ModuleExpr, tensor: &Tensor, indices: Vec<ExprId>) -> ExprId {
    let t = m.make_tensor(tensor.clone());
    m.make_load(t, indices)
}

pub fn store(m: &mut ModuleExpr, tensor: &Tensor, value: ExprId, indices: Vec<ExprId>) -> ExprId {
    let t = m.make_tensor(tensor.clone());
    m.make_store(t, value, indices)
}

/// `for (name, 0, extent) { stmts }` on the host. The inductor is bounded
/// by the loop range.
pub fn host_loop(m: &mut ModuleExpr, inductor: &Var, extent: i64, stmts: Vec<ExprId>) -> ExprId {
    let body = m.make_block(stmts);
    m.make_serial_for(inductor.clone(), extent, DeviceApi::Host, body)
}

/// A named block whose body is `{ stmt }`.
pub fn block(
    m: &mut ModuleExpr,
    name: &str,
    iter_vars: Vec<Var>,
    iter_values: Vec<ExprId>,
    stmt: ExprId,
) -> ExprId {
    let body = m.make_block(vec![stmt]);
    m.make_compute_block(name, iter_vars, iter_values, body)
}

/// Handles into the module built by `elementwise_module`.
pub struct Elementwise {
    pub module: ModuleExpr,
    pub top: ExprId,
    pub outer: ExprId,
    pub inner: ExprId,
    pub block: ExprId,
    pub store: ExprId,
    pub load_a: ExprId,
}

/// ```text
/// serial for (i, 0, 32)
///   serial for (j, 0, 16)
///     ScheduleBlock(C)
///       vi, vj = axis.bind(i, j)
///       C[vi, vj] = (A[vi, vj] + B[vi, vj])
/// ```
pub fn elementwise_module() -> Elementwise {
    let mut m = ModuleExpr::new("elementwise");
    let a = Tensor::new("A", vec![32, 16]);
    let b = Tensor::new("B", vec![32, 16]);
    let c = Tensor::new("C", vec![32, 16]);
    let i = Var::with_extent("i", 32);
    let j = Var::with_extent("j", 16);
    let vi = Var::with_extent("vi", 32);
    let vj = Var::with_extent("vj", 16);

    let idx = |m: &mut ModuleExpr| vec![var(m, &vi), var(m, &vj)];
    let ia = idx(&mut m);
    let load_a = load(&mut m, &a, ia);
    let ib = idx(&mut m);
    let load_b = load(&mut m, &b, ib);
    let sum = m.make_add(load_a, load_b);
    let ic = idx(&mut m);
    let store = store(&mut m, &c, sum, ic);

    let values = vec![var(&mut m, &i), var(&mut m, &j)];
    let block = block(&mut m, "C", vec![vi.clone(), vj.clone()], values, store);
    let inner = host_loop(&mut m, &j, 16, vec![block]);
    let outer = host_loop(&mut m, &i, 32, vec![inner]);
    let top = m.add_function_body(vec![outer]);
    Elementwise {
        module: m,
        top,
        outer,
        inner,
        block,
        store,
        load_a,
    }
}

/// Handles into the module built by `chain_module`.
pub struct Chain {
    pub module: ModuleExpr,
    pub top: ExprId,
    pub b: ExprId,
    pub c: ExprId,
    pub d: ExprId,
    pub load_b_in_c: ExprId,
}

/// Three blocks over `i` in separate loops:
///
/// ```text
/// B[vi] = A[vi] * 2
/// C[vi] = B[vi] + 1
/// D[vi] = exp(B)
/// ```
pub fn chain_module() -> Chain {
    let mut m = ModuleExpr::new("chain");
    let ta = Tensor::new("A", vec![8]);
    let tb = Tensor::new("B", vec![8]);
    let tc = Tensor::new("C", vec![8]);
    let td = Tensor::new("D", vec![8]);
    let i0 = Var::with_extent("i0", 8);
    let i1 = Var::with_extent("i1", 8);
    let i2 = Var::with_extent("i2", 8);
    let vi = Var::with_extent("vi", 8);

    // B
    let idx = vec![var(&mut m, &vi)];
    let la = load(&mut m, &ta, idx);
    let two = int(&mut m, 2);
    let value = m.make_mul(la, two);
    let idx = vec![var(&mut m, &vi)];
    let st = store(&mut m, &tb, value, idx);
    let values = vec![var(&mut m, &i0)];
    let b = block(&mut m, "B", vec![vi.clone()], values, st);
    let loop_b = host_loop(&mut m, &i0, 8, vec![b]);

    // C
    let idx = vec![var(&mut m, &vi)];
    let load_b_in_c = load(&mut m, &tb, idx);
    let one = int(&mut m, 1);
    let value = m.make_add(load_b_in_c, one);
    let idx = vec![var(&mut m, &vi)];
    let st = store(&mut m, &tc, value, idx);
    let values = vec![var(&mut m, &i1)];
    let c = block(&mut m, "C", vec![vi.clone()], values, st);
    let loop_c = host_loop(&mut m, &i1, 8, vec![c]);

    // D
    let arg = m.make_tensor(tb.clone());
    let value = m.make_call("exp", vec![arg], Vec::new());
    let idx = vec![var(&mut m, &vi)];
    let st = store(&mut m, &td, value, idx);
    let values = vec![var(&mut m, &i2)];
    let d = block(&mut m, "D", vec![vi.clone()], values, st);
    let loop_d = host_loop(&mut m, &i2, 8, vec![d]);

    let top = m.add_function_body(vec![loop_b, loop_c, loop_d]);
    Chain {
        module: m,
        top,
        b,
        c,
        d,
        load_b_in_c,
    }
}

/// Handles into the module built by `reduction_module`.
pub struct Reduction {
    pub module: ModuleExpr,
    pub top: ExprId,
    pub init: ExprId,
    pub reduce: ExprId,
}

/// A row sum split into its initialization and accumulation halves:
///
/// ```text
/// serial for (i, 0, 8)
///   ScheduleBlock(sum__reduce_init)
///     sum__reduce_init[vi] = 0
///   serial for (k, 0, 4)
///     ScheduleBlock(sum)
///       vi, vk = axis.bind(i, k)       // vk is a reduction axis
///       sum[vi] = (sum[vi] + A[vi, vk])
/// ```
pub fn reduction_module() -> Reduction {
    let mut m = ModuleExpr::new("reduction");
    let ta = Tensor::new("A", vec![8, 4]);
    let tsum = Tensor::new("sum", vec![8]);
    let tinit = Tensor::new("sum__reduce_init", vec![8]);
    let i = Var::with_extent("i", 8);
    let k = Var::with_extent("k", 4);
    let vi = Var::with_extent("vi", 8);
    let vk = Var::with_extent("vk", 4).reduce();

    let zero = m.make_float(0.0);
    let idx = vec![var(&mut m, &vi)];
    let st = store(&mut m, &tinit, zero, idx);
    let values = vec![var(&mut m, &i)];
    let init = block(&mut m, "sum__reduce_init", vec![vi.clone()], values, st);

    let idx = vec![var(&mut m, &vi)];
    let acc = load(&mut m, &tsum, idx);
    let idx = vec![var(&mut m, &vi), var(&mut m, &vk)];
    let la = load(&mut m, &ta, idx);
    let value = m.make_add(acc, la);
    let idx = vec![var(&mut m, &vi)];
    let st = store(&mut m, &tsum, value, idx);
    let values = vec![var(&mut m, &i), var(&mut m, &k)];
    let reduce = block(&mut m, "sum", vec![vi.clone(), vk.clone()], values, st);
    let k_loop = host_loop(&mut m, &k, 4, vec![reduce]);
    let i_loop = host_loop(&mut m, &i, 8, vec![init, k_loop]);
    let top = m.add_function_body(vec![i_loop]);
    Reduction {
        module: m,
        top,
        init,
        reduce,
    }
}

/// A module with one block per function, named after the function.
pub fn two_function_module(names: [&str; 2]) -> (ModuleExpr, [ExprId; 2]) {
    let mut m = ModuleExpr::new("two_functions");
    let mut blocks = [ExprId(0); 2];
    for (n, name) in names.iter().enumerate() {
        let out = Tensor::new(format!("out{}", n), vec![4]);
        let i = Var::with_extent(format!("f{}_i", n), 4);
        let vi = Var::with_extent(format!("f{}_vi", n), 4);
        let one = int(&mut m, 1);
        let idx = vec![var(&mut m, &vi)];
        let st = store(&mut m, &out, one, idx);
        let values = vec![var(&mut m, &i)];
        let b = block(&mut m, name, vec![vi], values, st);
        let l = host_loop(&mut m, &i, 4, vec![b]);
        m.add_function_body(vec![l]);
        blocks[n] = b;
    }
    (m, blocks)
}

/// A single block copying `A[load_indices]` into `C[store_indices]`, where
/// indices are given as variable names or numeric literals (`"0"` is an
/// integer, `"0.0"` a float).
pub fn copy_block_module(store_indices: &[&str], load_indices: &[&str]) -> (ModuleExpr, ExprId) {
    let mut m = ModuleExpr::new("copy");
    let ta = Tensor::new("A", vec![]);
    let tc = Tensor::new("C", vec![]);
    let mut iter_vars: Vec<Var> = Vec::new();
    for name in store_indices.iter().chain(load_indices) {
        if name.parse::<f64>().is_err() && !iter_vars.iter().any(|v| v.name == *name) {
            iter_vars.push(Var::with_extent(*name, 16));
        }
    }
    let index = |m: &mut ModuleExpr, name: &str| {
        if let Ok(c) = name.parse::<i64>() {
            m.make_int(c)
        } else if let Ok(c) = name.parse::<f64>() {
            m.make_float(c)
        } else {
            m.make_var(Var::with_extent(name, 16))
        }
    };
    let li: Vec<ExprId> = load_indices.iter().map(|n| index(&mut m, *n)).collect();
    let value = load(&mut m, &ta, li);
    let si: Vec<ExprId> = store_indices.iter().map(|n| index(&mut m, *n)).collect();
    let st = store(&mut m, &tc, value, si);
    let values: Vec<ExprId> = iter_vars.iter().map(|_| m.make_int(0)).collect();
    let b = block(&mut m, "C", iter_vars, values, st);
    m.add_function_body(vec![b]);
    (m, b)
}
