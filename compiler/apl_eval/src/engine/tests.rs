#![allow(clippy::unwrap_used, reason = "tests unwrap known-good values")]

use super::scheduler::slices;
use super::*;
use apl_value::{Complex, Shape};
use pretty_assertions::assert_eq;

fn engine() -> ScalarEngine {
    ScalarEngine::new(EvalConfig::default()).unwrap()
}

fn parallel_engine() -> ScalarEngine {
    ScalarEngine::new(EvalConfig::default().with_parallel(4, 8)).unwrap()
}

fn ints(items: &[i64]) -> ValueP {
    ValueP::new(Value::ints(items))
}

fn scalar(v: i64) -> ValueP {
    ValueP::scalar(Cell::Int(v))
}

fn matrix(rows: usize, cols: usize, items: &[i64]) -> ValueP {
    let shape = Shape::new(&[rows, cols]).unwrap();
    ValueP::new(Value::from_cells(shape, items.iter().copied().map(Cell::Int).collect()).unwrap())
}

fn nested(items: Vec<ValueP>) -> ValueP {
    ValueP::new(Value::vector(items.into_iter().map(Cell::Pointer).collect()))
}

fn sub(v: &ValueP, i: usize) -> ValueP {
    match &v.ravel()[i] {
        Cell::Pointer(p) => p.clone(),
        other => panic!("expected a nested element, got {other}"),
    }
}

// Monadic

#[test]
fn monadic_applies_to_every_cell() {
    let z = engine().eval_b(ScalarFn::Minus, &ints(&[1, -2, 3])).unwrap();
    assert_eq!(z.ravel(), Value::ints(&[-1, 2, -3]).ravel());
}

#[test]
fn monadic_recurses_into_nested_cells() {
    let b = ValueP::new(Value::vector(vec![
        Cell::Int(4),
        Cell::Pointer(ints(&[1, 2])),
        Cell::Int(-5),
    ]));
    let z = engine().eval_b(ScalarFn::Stile, &b).unwrap();
    assert_eq!(z.ravel()[0], Cell::Int(4));
    assert_eq!(z.ravel()[2], Cell::Int(5));
    assert_eq!(sub(&z, 1).ravel(), Value::ints(&[1, 2]).ravel());
    assert_eq!(z.depth(), 2);
}

#[test]
fn monadic_empty_uses_fill_rule() {
    let b = ValueP::new(Value::string(""));
    let z = engine().eval_b(ScalarFn::Minus, &b).unwrap();
    assert!(z.is_empty());
    assert_eq!(z.first(), &Cell::Char(' '));
}

#[test]
fn monadic_error_is_reported() {
    let b = ints(&[1, 0, 2]);
    let err = engine().eval_b(ScalarFn::Divide, &b).unwrap_err();
    assert_eq!(err.code, ErrorCode::Domain);
}

#[test]
fn missing_valence_is_domain() {
    let err = engine().eval_b(ScalarFn::And, &ints(&[1])).unwrap_err();
    assert_eq!(err.code, ErrorCode::Domain);
    let err = engine().eval_ab(&scalar(1), ScalarFn::Tilde, &scalar(1)).unwrap_err();
    assert_eq!(err.code, ErrorCode::Domain);
}

// Dyadic

#[test]
fn scalar_plus_scalar_matches_cell_op() {
    let z = engine().eval_ab(&scalar(2), ScalarFn::Times, &scalar(21)).unwrap();
    assert!(z.is_scalar());
    assert_eq!(z.first(), &Cell::Int(42));
}

#[test]
fn matrix_plus_scalar_extends_the_scalar() {
    let a = matrix(2, 3, &[1, 2, 3, 4, 5, 6]);
    let z = engine().eval_ab(&a, ScalarFn::Plus, &scalar(10)).unwrap();
    assert_eq!(z.shape().extents(), &[2, 3]);
    assert_eq!(z.ravel(), Value::ints(&[11, 12, 13, 14, 15, 16]).ravel());
}

#[test]
fn scalar_on_the_left_extends_too() {
    let z = engine().eval_ab(&scalar(10), ScalarFn::Minus, &ints(&[1, 2])).unwrap();
    assert_eq!(z.ravel(), Value::ints(&[9, 8]).ravel());
}

#[test]
fn one_element_vector_does_not_extend() {
    let err = engine().eval_ab(&ints(&[1]), ScalarFn::Plus, &ints(&[1, 2])).unwrap_err();
    assert_eq!(err.code, ErrorCode::Length);
}

#[test]
fn conformability_errors() {
    let err = engine().eval_ab(&ints(&[1, 2]), ScalarFn::Plus, &ints(&[1, 2, 3])).unwrap_err();
    assert_eq!(err.code, ErrorCode::Length);
    let err = engine()
        .eval_ab(&ints(&[1, 2]), ScalarFn::Plus, &matrix(1, 2, &[1, 2]))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Rank);
}

#[test]
fn empty_plus_empty_is_empty_numeric() {
    let e = ValueP::new(Value::vector(vec![]));
    let z = engine().eval_ab(&e, ScalarFn::Plus, &e).unwrap();
    assert_eq!(z.shape().extents(), &[0]);
    assert_eq!(z.first(), &Cell::Int(0));
}

#[test]
fn empty_result_never_calls_the_primitive() {
    // ÷ on 0 would be a DOMAIN error if it were ever applied.
    let e = ValueP::new(Value::vector(vec![]));
    let z = engine().eval_ab(&scalar(0), ScalarFn::Divide, &e).unwrap();
    assert!(z.is_empty());
    let z = engine().eval_b(ScalarFn::Divide, &e).unwrap();
    assert!(z.is_empty());
}

#[test]
fn empty_operands_must_still_conform() {
    let e = ValueP::new(Value::vector(vec![]));
    let err = engine().eval_ab(&e, ScalarFn::Plus, &ints(&[1])).unwrap_err();
    assert_eq!(err.code, ErrorCode::Length);
    let err = engine().eval_fill_ab(&e, &ints(&[1])).unwrap_err();
    assert_eq!(err.code, ErrorCode::Length);
}

#[test]
fn fill_prototype_follows_the_nonscalar_operand() {
    let chars = ValueP::new(Value::string(""));
    let z = engine().eval_fill_ab(&chars, &scalar(1)).unwrap();
    assert_eq!(z.first(), &Cell::Char(' '));
    let z = engine().eval_fill_ab(&scalar(1), &chars).unwrap();
    assert_eq!(z.first(), &Cell::Char(' '));
}

#[test]
fn nested_plus_scalar_adds_inside() {
    let a = nested(vec![ints(&[1, 2]), ints(&[3, 4])]);
    let z = engine().eval_ab(&a, ScalarFn::Plus, &scalar(1)).unwrap();
    assert_eq!(z.shape().extents(), &[2]);
    assert_eq!(sub(&z, 0).ravel(), Value::ints(&[2, 3]).ravel());
    assert_eq!(sub(&z, 1).ravel(), Value::ints(&[4, 5]).ravel());
}

#[test]
fn simple_cell_extends_into_nested_cell() {
    let a = ints(&[10, 20]);
    let b = nested(vec![ints(&[1, 2, 3]), ints(&[4])]);
    let z = engine().eval_ab(&a, ScalarFn::Plus, &b).unwrap();
    assert_eq!(sub(&z, 0).ravel(), Value::ints(&[11, 12, 13]).ravel());
    assert_eq!(sub(&z, 1).ravel(), Value::ints(&[24]).ravel());
}

#[test]
fn both_nested_conform_per_level() {
    let a = nested(vec![ints(&[1, 2]), scalar(100)]);
    let b = nested(vec![ints(&[10, 20]), ints(&[1, 2, 3])]);
    let z = engine().eval_ab(&a, ScalarFn::Plus, &b).unwrap();
    assert_eq!(sub(&z, 0).ravel(), Value::ints(&[11, 22]).ravel());
    assert_eq!(sub(&z, 1).ravel(), Value::ints(&[101, 102, 103]).ravel());

    let bad = nested(vec![ints(&[1, 2, 3]), ints(&[1])]);
    let err = engine().eval_ab(&a, ScalarFn::Plus, &bad).unwrap_err();
    assert_eq!(err.code, ErrorCode::Length);
}

#[test]
fn deeply_nested_values_unroll_breadth_first() {
    let mut v = ints(&[1, 2]);
    for _ in 0..50 {
        v = ValueP::new(Value::vector(vec![Cell::Pointer(v), Cell::Int(0)]));
    }
    let z = engine().eval_b(ScalarFn::Minus, &v).unwrap();
    assert_eq!(z.depth(), v.depth());
    let mut inner = z;
    for _ in 0..50 {
        assert_eq!(inner.ravel()[1], Cell::Int(0));
        inner = sub(&inner, 0);
    }
    assert_eq!(inner.ravel(), Value::ints(&[-1, -2]).ravel());
}

#[test]
fn very_deep_result_is_freed_without_recursion() {
    let handle = std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(|| {
            let mut v = scalar(1);
            for _ in 0..200_000 {
                v = ValueP::new(Value::scalar(Cell::Pointer(v)));
            }
            let z = engine().eval_b(ScalarFn::Minus, &v).unwrap();
            let depth = z.depth();
            drop(z);
            drop(v);
            depth
        })
        .unwrap();
    assert_eq!(handle.join().unwrap(), 200_000);
}

#[test]
fn empty_nested_element_becomes_its_prototype() {
    let b = nested(vec![ValueP::new(Value::string("")), ints(&[1])]);
    let z = engine().eval_ab(&scalar(1), ScalarFn::Plus, &b).unwrap();
    let empty = sub(&z, 0);
    assert!(empty.is_empty());
    assert_eq!(empty.first(), &Cell::Char(' '));
    assert_eq!(sub(&z, 1).ravel(), Value::ints(&[2]).ravel());
}

#[test]
fn complex_results_flow_through() {
    let z = engine().eval_b(ScalarFn::Log, &ints(&[-1])).unwrap();
    assert!(matches!(z.first(), Cell::Complex(Complex { .. })));
}

// Axis

#[test]
fn axis_maps_vector_onto_matrix_rows() {
    let m = matrix(2, 3, &[1, 2, 3, 4, 5, 6]);
    let v = ints(&[10, 20]);
    let x = Value::scalar(Cell::Int(1));
    let z = engine().eval_axb(&m, ScalarFn::Plus, Some(&x), &v).unwrap();
    assert_eq!(z.shape().extents(), &[2, 3]);
    assert_eq!(z.ravel(), Value::ints(&[11, 12, 13, 24, 25, 26]).ravel());
}

#[test]
fn axis_maps_vector_onto_matrix_columns() {
    let m = matrix(2, 3, &[1, 2, 3, 4, 5, 6]);
    let v = ints(&[100, 200, 300]);
    let x = Value::scalar(Cell::Int(2));
    // Lower-rank operand on the left: V - [2] M.
    let z = engine().eval_axb(&v, ScalarFn::Minus, Some(&x), &m).unwrap();
    assert_eq!(z.ravel(), Value::ints(&[99, 198, 297, 96, 195, 294]).ravel());
}

#[test]
fn axis_respects_index_origin() {
    let zero = ScalarEngine::new(EvalConfig::default().with_io(0)).unwrap();
    let m = matrix(2, 3, &[1, 2, 3, 4, 5, 6]);
    let x = Value::scalar(Cell::Int(0));
    let z = zero.eval_axb(&m, ScalarFn::Times, Some(&x), &ints(&[1, 2])).unwrap();
    assert_eq!(z.ravel(), Value::ints(&[1, 2, 3, 8, 10, 12]).ravel());
}

#[test]
fn axis_errors() {
    let e = engine();
    let m = matrix(2, 3, &[1, 2, 3, 4, 5, 6]);
    let v = ints(&[1, 2]);

    let out_of_range = Value::scalar(Cell::Int(3));
    let err = e.eval_axb(&m, ScalarFn::Plus, Some(&out_of_range), &v).unwrap_err();
    assert_eq!(err.code, ErrorCode::Axis);

    let fractional = Value::scalar(Cell::Float(1.5));
    let err = e.eval_axb(&m, ScalarFn::Plus, Some(&fractional), &v).unwrap_err();
    assert_eq!(err.code, ErrorCode::Axis);

    let repeated = Value::ints(&[1, 1]);
    let err = e.eval_axb(&m, ScalarFn::Plus, Some(&repeated), &m).unwrap_err();
    assert_eq!(err.code, ErrorCode::Axis);

    let two = Value::ints(&[1, 2]);
    let err = e.eval_axb(&m, ScalarFn::Plus, Some(&two), &v).unwrap_err();
    assert_eq!(err.code, ErrorCode::Rank);

    let wrong_axis = Value::scalar(Cell::Int(2));
    let err = e.eval_axb(&m, ScalarFn::Plus, Some(&wrong_axis), &v).unwrap_err();
    assert_eq!(err.code, ErrorCode::Length);

    let matrix_axis = Value::from_cells(Shape::new(&[1, 1]).unwrap(), vec![Cell::Int(1)]).unwrap();
    let err = e.eval_axb(&m, ScalarFn::Plus, Some(&matrix_axis), &v).unwrap_err();
    assert_eq!(err.code, ErrorCode::Axis);
}

#[test]
fn axis_with_scalar_or_no_list_is_plain_dyadic() {
    let m = matrix(2, 3, &[1, 2, 3, 4, 5, 6]);
    let bogus = Value::scalar(Cell::Int(9));
    let z = engine().eval_axb(&m, ScalarFn::Plus, Some(&bogus), &scalar(1)).unwrap();
    assert_eq!(z.ravel(), Value::ints(&[2, 3, 4, 5, 6, 7]).ravel());
    let err = engine().eval_axb(&m, ScalarFn::Plus, None, &ints(&[1, 2])).unwrap_err();
    assert_eq!(err.code, ErrorCode::Rank);
}

#[test]
fn axis_order_does_not_permute_operands() {
    // X is a set: [2 1] pairs B's axes with A's axes in ascending order.
    let a = matrix(2, 3, &[0, 0, 0, 0, 0, 0]);
    let b = matrix(3, 2, &[1, 2, 3, 4, 5, 6]);
    let err = engine()
        .eval_axb(&a, ScalarFn::Plus, Some(&Value::ints(&[2, 1])), &b)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Length);
}

#[test]
fn axis_list_order_gives_same_result() {
    let a = matrix(2, 3, &[10, 20, 30, 40, 50, 60]);
    let b = matrix(2, 3, &[1, 2, 3, 4, 5, 6]);
    let e = engine();
    let forward = e.eval_axb(&a, ScalarFn::Plus, Some(&Value::ints(&[1, 2])), &b).unwrap();
    let reversed = e.eval_axb(&a, ScalarFn::Plus, Some(&Value::ints(&[2, 1])), &b).unwrap();
    assert!(forward.identical(&reversed));
    assert_eq!(forward.ravel(), Value::ints(&[11, 22, 33, 44, 55, 66]).ravel());
}

#[test]
fn axis_list_parsing() {
    let x = Value::ints(&[3, 1]);
    let axes = AxisList::from_value(&x, 1, 3).unwrap();
    assert_eq!(axes.axes(), &[0, 2]);
    assert_eq!(axes.len(), 2);
    let empty = AxisList::from_value(&Value::vector(vec![]), 1, 3).unwrap();
    assert!(empty.is_empty());
}

// Identity

#[test]
fn identity_cells() {
    let e = engine();
    assert_eq!(e.identity_cell(ScalarFn::Plus).unwrap(), Cell::Int(0));
    assert_eq!(e.identity_cell(ScalarFn::Times).unwrap(), Cell::Int(1));
    assert_eq!(e.identity_cell(ScalarFn::DownStile).unwrap(), Cell::Float(f64::MAX));
    assert_eq!(e.identity_cell(ScalarFn::Circle).unwrap_err().code, ErrorCode::Domain);
}

#[test]
fn identity_fun_drops_the_reduced_axis() {
    let b = ValueP::new(Value::from_shape(Shape::new(&[3, 0]).unwrap()));
    let z = engine().eval_identity_fun(&b, 1, ScalarFn::Times).unwrap();
    assert_eq!(z.shape().extents(), &[3]);
    assert_eq!(z.ravel(), Value::ints(&[1, 1, 1]).ravel());
    let err = engine().eval_identity_fun(&b, 2, ScalarFn::Times).unwrap_err();
    assert_eq!(err.code, ErrorCode::Axis);
}

#[test]
fn identity_fun_of_strict_comparison_is_zero() {
    let b = ValueP::new(Value::vector(vec![]));
    let z = engine().eval_identity_fun(&b, 0, ScalarFn::Less).unwrap();
    assert!(z.is_scalar());
    assert_eq!(z.first(), &Cell::Int(0));
}

#[test]
fn identity_fun_on_nested_prototype() {
    let proto = ints(&[0, 0]);
    let b = ValueP::new(
        Value::from_cells(Shape::new(&[2, 0]).unwrap(), vec![Cell::Pointer(proto)]).unwrap(),
    );
    let z = engine().eval_identity_fun(&b, 1, ScalarFn::Plus).unwrap();
    assert_eq!(z.shape().extents(), &[2]);
    assert_eq!(sub(&z, 0).ravel(), Value::ints(&[0, 0]).ravel());
    assert_eq!(sub(&z, 1).shape().extents(), &[2]);
}

// Limits

#[test]
fn result_size_limit_is_ws_full() {
    let small = ScalarEngine::new(EvalConfig::default().with_max_cells(4)).unwrap();
    let err = small.eval_b(ScalarFn::Minus, &ints(&[1, 2, 3, 4, 5])).unwrap_err();
    assert_eq!(err.code, ErrorCode::WsFull);
    assert!(small.eval_b(ScalarFn::Minus, &ints(&[1, 2, 3, 4])).is_ok());

    // Nested levels are checked too.
    let b = nested(vec![ints(&[1, 2, 3, 4, 5])]);
    let err = small.eval_b(ScalarFn::Minus, &b).unwrap_err();
    assert_eq!(err.code, ErrorCode::WsFull);
}

#[test]
fn invalid_config_is_rejected() {
    let err = ScalarEngine::new(EvalConfig::default().with_io(5));
    assert!(matches!(err, Err(ConfigError::IndexOrigin(5))));
}

// Parallel

#[test]
fn slices_cover_the_range_in_order() {
    assert_eq!(slices(10, 4), vec![0..3, 3..6, 6..9, 9..10]);
    assert_eq!(slices(3, 8), vec![0..1, 1..2, 2..3]);
    assert_eq!(slices(0, 4), Vec::<std::ops::Range<usize>>::new());
}

#[test]
fn parallel_matches_sequential() {
    let items: Vec<i64> = (0..1000).collect();
    let b = ints(&items);
    let seq = engine().eval_ab(&scalar(3), ScalarFn::Times, &b).unwrap();
    let par = parallel_engine().eval_ab(&scalar(3), ScalarFn::Times, &b).unwrap();
    assert!(seq.identical(&par));
}

#[test]
fn parallel_nested_matches_sequential() {
    let items: Vec<ValueP> = (0..40).map(|i| ints(&[i, i + 1, i + 2])).collect();
    let b = nested(items);
    let seq = engine().eval_b(ScalarFn::Minus, &b).unwrap();
    let par = parallel_engine().eval_b(ScalarFn::Minus, &b).unwrap();
    assert!(seq.identical(&par));
}

#[test]
fn parallel_reports_the_first_error() {
    let mut items: Vec<i64> = (1..=100).collect();
    items[30] = 0;
    items[70] = 0;
    let b = ints(&items);
    let seq = engine().eval_ab(&scalar(1), ScalarFn::Divide, &b).unwrap_err();
    let par = parallel_engine().eval_ab(&scalar(1), ScalarFn::Divide, &b).unwrap_err();
    assert_eq!(seq, par);
    assert_eq!(par.code, ErrorCode::Domain);
}
