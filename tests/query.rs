//! Tests for store, consumer and iteration-value queries.

mod common;

use std::collections::HashMap;

use common::*;
use schedule_ir::analyzer::{
    collect_var_to_for_map, get_all_blocks, get_block, get_consumer_loads_and_sblocks,
    get_consumer_sblocks, get_iter_values_of_access, get_iter_var_to_value_of_sblock, get_loops,
    get_root_block, get_store_of_sblock, get_store_tensor_of_sblock, replace_var_with_expr,
};
use schedule_ir::ir::{structural_eq, ExprNode, ModuleExpr, Tensor, Var};
use schedule_ir::visit::collect_nodes;
use schedule_ir::{AnalyzerError, ExprId};

fn text(m: &ModuleExpr, id: ExprId) -> String {
    m.display(id).to_string()
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

#[test]
fn test_get_store_of_sblock() {
    let e = elementwise_module();
    assert_eq!(get_store_of_sblock(&e.module, e.block).unwrap(), e.store);
    let tensor = get_store_tensor_of_sblock(&e.module, e.block).unwrap();
    assert_eq!(tensor.name, "C");
    assert_eq!(tensor.buffer.name, "_C");
}

#[test]
fn test_get_store_requires_exactly_one_store() {
    let mut m = ModuleExpr::new("two_stores");
    let t = Tensor::new("T", vec![2]);
    let one = int(&mut m, 1);
    let i0 = vec![int(&mut m, 0)];
    let s0 = store(&mut m, &t, one, i0);
    let two = int(&mut m, 2);
    let i1 = vec![int(&mut m, 1)];
    let s1 = store(&mut m, &t, two, i1);
    let body = m.make_block(vec![s0, s1]);
    let values = vec![int(&mut m, 0)];
    let b = m.make_compute_block("T", vec![Var::with_extent("v", 1)], values, body);
    m.add_function_body(vec![b]);

    match get_store_of_sblock(&m, b) {
        Err(AnalyzerError::StoreCount { name, count }) => {
            assert_eq!(name, "T");
            assert_eq!(count, 2);
        }
        other => panic!("expected StoreCount, got {:?}", other),
    }

    let empty_body = m.make_block(vec![]);
    let values = vec![int(&mut m, 0)];
    let empty = m.make_compute_block("E", vec![Var::with_extent("w", 1)], values, empty_body);
    assert!(matches!(
        get_store_of_sblock(&m, empty),
        Err(AnalyzerError::StoreCount { count: 0, .. })
    ));
}

#[test]
fn test_get_store_tensor_not_tensor() {
    let mut m = ModuleExpr::new("not_tensor");
    let target = m.make_var(Var::new("scratch"));
    let one = int(&mut m, 1);
    let st = m.make_store(target, one, vec![]);
    let values = vec![int(&mut m, 0)];
    let b = block(&mut m, "S", vec![Var::with_extent("v", 1)], values, st);
    m.add_function_body(vec![b]);
    assert!(matches!(
        get_store_tensor_of_sblock(&m, b),
        Err(AnalyzerError::NotTensor { .. })
    ));
}

// ---------------------------------------------------------------------------
// Consumers
// ---------------------------------------------------------------------------

#[test]
fn test_consumers_by_load_and_call() {
    let c = chain_module();
    let root = get_root_block(&c.module, c.b).unwrap();
    assert_eq!(get_consumer_sblocks(&c.module, c.b, root).unwrap(), vec![c.c, c.d]);
    assert!(get_consumer_sblocks(&c.module, c.c, root).unwrap().is_empty());
    assert!(get_consumer_sblocks(&c.module, c.d, root).unwrap().is_empty());
}

#[test]
fn test_consumer_loads_and_blocks() {
    let c = chain_module();
    let root = get_root_block(&c.module, c.b).unwrap();
    let pairs = get_consumer_loads_and_sblocks(&c.module, c.b, root).unwrap();
    // D reads B only through a call argument, so it contributes no load.
    assert_eq!(pairs, vec![(c.load_b_in_c, c.c)]);
}

#[test]
fn test_consumers_of_self_reading_block() {
    let r = reduction_module();
    let root = get_root_block(&r.module, r.reduce).unwrap();
    // `sum` loads its own accumulator; it is never its own consumer.
    assert!(get_consumer_sblocks(&r.module, r.reduce, root).unwrap().is_empty());
}

#[test]
fn test_reduce_init_consumer_by_name() {
    let r = reduction_module();
    let root = get_root_block(&r.module, r.init).unwrap();
    assert_eq!(get_consumer_sblocks(&r.module, r.init, root).unwrap(), vec![r.reduce]);

    // The accumulation block loads `sum`, not `sum__reduce_init`.
    let pairs = get_consumer_loads_and_sblocks(&r.module, r.init, root).unwrap();
    assert!(pairs.is_empty());
}

#[test]
fn test_reduce_init_consumer_by_tag() {
    let mut m = ModuleExpr::new("tagged");
    let acc = Tensor::new("acc_zero", vec![4]);
    let zero = int(&mut m, 0);
    let idx = vec![int(&mut m, 0)];
    let st = store(&mut m, &acc, zero, idx);
    let values = vec![int(&mut m, 0)];
    let init = block(&mut m, "acc_zero", vec![Var::with_extent("v0", 1)], values, st);

    let out = Tensor::new("acc", vec![4]);
    let one = int(&mut m, 1);
    let idx = vec![int(&mut m, 0)];
    let st = store(&mut m, &out, one, idx);
    let values = vec![int(&mut m, 0)];
    let reduce = block(&mut m, "acc", vec![Var::with_extent("v1", 1).reduce()], values, st);
    let top = m.add_function_body(vec![init, reduce]);

    let sb = m.node(init).as_realize().unwrap().schedule_block;
    if let ExprNode::ScheduleBlock(sb) = m.node_mut(sb) {
        sb.reduce_init_of = Some("acc".to_owned());
    }
    let root = get_root_block(&m, top).unwrap();
    assert_eq!(get_consumer_sblocks(&m, init, root).unwrap(), vec![reduce]);
}

#[test]
fn test_reduce_init_without_consumer_fails() {
    let mut m = ModuleExpr::new("orphan_init");
    let t = Tensor::new("x__reduce_init", vec![1]);
    let zero = int(&mut m, 0);
    let st = store(&mut m, &t, zero, vec![]);
    let values = vec![int(&mut m, 0)];
    let init = block(&mut m, "x__reduce_init", vec![Var::with_extent("v", 1)], values, st);
    let top = m.add_function_body(vec![init]);
    let root = get_root_block(&m, top).unwrap();
    match get_consumer_sblocks(&m, init, root) {
        Err(AnalyzerError::ReduceConsumerCount { name, count }) => {
            assert_eq!(name, "x");
            assert_eq!(count, 0);
        }
        other => panic!("expected ReduceConsumerCount, got {:?}", other),
    }
}

#[test]
fn test_consumers_require_realizes() {
    let c = chain_module();
    assert!(matches!(
        get_consumer_sblocks(&c.module, c.b, c.top),
        Err(AnalyzerError::UnexpectedNode { .. })
    ));
}

// ---------------------------------------------------------------------------
// Loop maps and iteration values
// ---------------------------------------------------------------------------

#[test]
fn test_collect_var_to_for_map() {
    let r = reduction_module();
    let blocks = get_all_blocks(&r.module).unwrap();
    let map = collect_var_to_for_map(&r.module, &blocks).unwrap();
    let loops = get_loops(&r.module, r.reduce).unwrap();

    assert_eq!(map.len(), 2);
    assert_eq!(map["sum__reduce_init"].len(), 1);
    assert_eq!(map["sum__reduce_init"][&Var::new("i")], loops[0]);
    assert_eq!(map["sum"][&Var::new("i")], loops[0]);
    assert_eq!(map["sum"][&Var::new("k")], loops[1]);
}

#[test]
fn test_collect_var_to_for_map_skips_loopless_blocks() {
    let (m, b) = copy_block_module(&["i"], &["i"]);
    let map = collect_var_to_for_map(&m, &[b]).unwrap();
    assert!(map.is_empty());
}

#[test]
fn test_iter_var_to_value() {
    let e = elementwise_module();
    let map = get_iter_var_to_value_of_sblock(&e.module, e.block).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(text(&e.module, map[&Var::new("vi")]), "i");
    assert_eq!(text(&e.module, map[&Var::new("vj")]), "j");
}

#[test]
fn test_iter_var_to_value_size_mismatch() {
    let mut m = ModuleExpr::new("mismatch");
    let t = Tensor::new("T", vec![1]);
    let one = int(&mut m, 1);
    let st = store(&mut m, &t, one, vec![]);
    let sb = m.make_schedule_block("T", vec![Var::new("a"), Var::new("b")], st);
    let value = int(&mut m, 0);
    let realize = m.make_realize(vec![value], sb);
    match get_iter_var_to_value_of_sblock(&m, realize) {
        Err(AnalyzerError::SizeMismatch {
            expected, found, ..
        }) => {
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("expected SizeMismatch, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Substitution
// ---------------------------------------------------------------------------

#[test]
fn test_replace_empty_mapping_copies() {
    let mut e = elementwise_module();
    let copy = replace_var_with_expr(&mut e.module, e.store, &[], &[]).unwrap();
    assert_ne!(copy, e.store);
    assert!(structural_eq(&e.module, copy, e.store));
}

#[test]
fn test_replace_identity_mapping_is_noop() {
    let mut e = elementwise_module();
    let vi = Var::with_extent("vi", 32);
    let target = e.module.make_var(vi.clone());
    let once = replace_var_with_expr(&mut e.module, e.store, &[vi.clone()], &[target]).unwrap();
    let twice = replace_var_with_expr(&mut e.module, once, &[vi], &[target]).unwrap();
    assert!(structural_eq(&e.module, once, e.store));
    assert!(structural_eq(&e.module, twice, once));
}

#[test]
fn test_replace_substitutes_every_occurrence() {
    let mut e = elementwise_module();
    let i = e.module.make_var(Var::new("i"));
    let two = e.module.make_int(2);
    let scaled = e.module.make_mul(i, two);
    let replaced =
        replace_var_with_expr(&mut e.module, e.store, &[Var::new("vi")], &[scaled]).unwrap();
    assert_eq!(
        text(&e.module, replaced),
        "C[(i * 2), vj] = (A[(i * 2), vj] + B[(i * 2), vj])"
    );
    // The source is left untouched.
    assert_eq!(text(&e.module, e.store), "C[vi, vj] = (A[vi, vj] + B[vi, vj])");
}

#[test]
fn test_replace_shares_no_nodes() {
    let mut e = elementwise_module();
    let i = e.module.make_var(Var::new("i"));
    let one = e.module.make_int(1);
    let target = e.module.make_add(i, one);
    let replaced =
        replace_var_with_expr(&mut e.module, e.store, &[Var::new("vi")], &[target]).unwrap();

    let source_nodes = collect_nodes(&e.module, e.store, |_, _| true);
    let result_nodes = collect_nodes(&e.module, replaced, |_, _| true);
    for id in &result_nodes {
        assert!(!source_nodes.contains(id), "result shares {} with the source", id);
        assert!(*id != target && *id != i && *id != one, "result shares {} with the target", id);
    }
}

#[test]
fn test_replace_length_mismatch() {
    let mut e = elementwise_module();
    assert!(matches!(
        replace_var_with_expr(&mut e.module, e.store, &[Var::new("vi")], &[]),
        Err(AnalyzerError::SizeMismatch { .. })
    ));
}

#[test]
fn test_replace_var_root() {
    let mut m = ModuleExpr::new("root_var");
    let x = m.make_var(Var::new("x"));
    let seven = m.make_int(7);
    let replaced = replace_var_with_expr(&mut m, x, &[Var::new("x")], &[seven]).unwrap();
    assert_eq!(m.node(replaced).as_int(), Some(7));
    assert_ne!(replaced, seven);
}

// ---------------------------------------------------------------------------
// get_iter_values_of_access
// ---------------------------------------------------------------------------

#[test]
fn test_iter_values_of_store_and_load() {
    let mut e = elementwise_module();
    let values = get_iter_values_of_access(&mut e.module, e.store, e.block).unwrap();
    let printed: Vec<String> = values.iter().map(|&v| text(&e.module, v)).collect();
    assert_eq!(printed, vec!["i", "j"]);

    let values = get_iter_values_of_access(&mut e.module, e.load_a, e.block).unwrap();
    let printed: Vec<String> = values.iter().map(|&v| text(&e.module, v)).collect();
    assert_eq!(printed, vec!["i", "j"]);
}

#[test]
fn test_iter_values_are_simplified() {
    let mut m = ModuleExpr::new("offsets");
    let t_in = Tensor::new("In", vec![64]);
    let t_out = Tensor::new("Out", vec![64]);
    let vi = Var::with_extent("vi", 8);
    let i = Var::with_extent("i", 8);

    // Out[vi * 1 + 0] = In[(vi + 2) - 2]
    let v = var(&mut m, &vi);
    let one = int(&mut m, 1);
    let zero = int(&mut m, 0);
    let scaled = m.make_mul(v, one);
    let store_index = m.make_add(scaled, zero);
    let v = var(&mut m, &vi);
    let two = int(&mut m, 2);
    let shifted = m.make_add(v, two);
    let two = int(&mut m, 2);
    let load_index = m.make_sub(shifted, two);
    let value = load(&mut m, &t_in, vec![load_index]);
    let st = store(&mut m, &t_out, value, vec![store_index]);

    // Bound value: i * 4
    let iv = var(&mut m, &i);
    let four = int(&mut m, 4);
    let bound = m.make_mul(iv, four);
    let b = block(&mut m, "Out", vec![vi], vec![bound], st);
    let l = host_loop(&mut m, &i, 8, vec![b]);
    m.add_function_body(vec![l]);

    let values = get_iter_values_of_access(&mut m, st, b).unwrap();
    assert_eq!(text(&m, values[0]), "(i * 4)");
    let ld = m.node(st).as_store().unwrap().value;
    let values = get_iter_values_of_access(&mut m, ld, b).unwrap();
    assert_eq!(text(&m, values[0]), "(i * 4)");
}

#[test]
fn test_iter_values_of_access_rejects_other_nodes() {
    let mut e = elementwise_module();
    let top = e.top;
    let block = e.block;
    assert!(matches!(
        get_iter_values_of_access(&mut e.module, top, block),
        Err(AnalyzerError::UnexpectedNode { .. })
    ));
}

#[test]
fn test_get_block_after_queries_unchanged() {
    let mut e = elementwise_module();
    let before = text(&e.module, e.top);
    let _ = get_iter_values_of_access(&mut e.module, e.store, e.block).unwrap();
    let _: HashMap<_, _> = get_iter_var_to_value_of_sblock(&e.module, e.block).unwrap();
    assert_eq!(text(&e.module, e.top), before);
    assert_eq!(get_block(&e.module, "C").unwrap(), e.block);
}
