#![allow(clippy::unwrap_used, reason = "tests unwrap known-good values")]

use super::*;
use crate::complex::Complex;
use pretty_assertions::assert_eq;

fn nested(items: Vec<Value>) -> Value {
    Value::vector(items.into_iter().map(|v| Cell::Pointer(ValueP::new(v))).collect())
}

// Construction

#[test]
fn scalar_has_one_cell_and_rank_zero() {
    let v = Value::scalar(Cell::Int(5));
    assert_eq!(v.rank(), 0);
    assert_eq!(v.element_count(), 1);
    assert_eq!(v.ravel(), &[Cell::Int(5)]);
    assert!(v.is_complete());
}

#[test]
fn empty_value_keeps_one_prototype_cell() {
    let v = Value::vector(vec![]);
    assert!(v.is_empty());
    assert_eq!(v.element_count(), 0);
    assert_eq!(v.nz_element_count(), 1);
    assert_eq!(v.first(), &Cell::Int(0));
}

#[test]
fn from_shape_is_zero_filled() {
    let v = Value::from_shape(Shape::new(&[2, 3]).unwrap());
    assert_eq!(v.nz_element_count(), 6);
    assert!(v.ravel().iter().all(|c| *c == Cell::Int(0)));
}

#[test]
fn from_cells_checks_length() {
    let shape = Shape::new(&[2, 2]).unwrap();
    assert_eq!(
        Value::from_cells(shape.clone(), vec![Cell::Int(1); 3]).unwrap_err(),
        ErrorCode::Length
    );
    assert!(Value::from_cells(shape, vec![Cell::Int(1); 4]).is_ok());
}

#[test]
fn strings_are_character_vectors() {
    let v = Value::string("abc");
    assert!(v.is_char_string());
    assert_eq!(v.element_count(), 3);
    let empty = Value::string("");
    assert!(empty.is_char_string());
    assert_eq!(empty.first(), &Cell::Char(' '));
    let bytes = Value::from_bytes(b"hi");
    assert_eq!(bytes.ravel(), &[Cell::Char('h'), Cell::Char('i')]);
}

#[test]
fn vector_of_len_is_numeric() {
    let v = Value::vector_of_len(4);
    assert_eq!(v.shape().extents(), &[4]);
    assert!(!v.is_char_string());
}

// Structure

#[test]
fn depth_of_simple_and_nested_values() {
    assert_eq!(Value::scalar(Cell::Int(1)).depth(), 0);
    assert_eq!(Value::ints(&[1, 2]).depth(), 1);
    let n = nested(vec![Value::ints(&[1, 2]), Value::ints(&[3])]);
    assert_eq!(n.depth(), 2);
    let enclosed = Value::scalar(Cell::Pointer(ValueP::new(Value::ints(&[1]))));
    assert_eq!(enclosed.depth(), 2);
}

#[test]
fn simple_and_nested_classification() {
    assert!(Value::ints(&[1, 2]).is_simple());
    assert!(Value::scalar(Cell::Int(1)).is_simple_scalar());
    let n = nested(vec![Value::ints(&[1])]);
    assert!(!n.is_simple());
}

#[test]
fn prototype_mirrors_first_element() {
    let v = Value::vector(vec![Cell::Char('x'), Cell::Int(3)]);
    assert_eq!(v.prototype().ravel(), &[Cell::Char(' ')]);

    let n = nested(vec![Value::vector(vec![Cell::Int(7), Cell::Char('a')])]);
    let proto = n.prototype();
    assert_eq!(proto.shape().extents(), &[2]);
    assert_eq!(proto.ravel(), &[Cell::Int(0), Cell::Char(' ')]);
}

#[test]
fn to_proto_keeps_shape_and_clears_leaves() {
    let mut v = Value::vector(vec![
        Cell::Float(2.5),
        Cell::Complex(Complex::new(1.0, 1.0)),
        Cell::Char('q'),
    ]);
    v.to_proto();
    assert_eq!(v.ravel(), &[Cell::Int(0), Cell::Int(0), Cell::Char(' ')]);
}

// Cloning

#[test]
fn clone_is_deep_and_independent() {
    let inner = ValueP::new(Value::ints(&[1, 2]));
    let original = Value::vector(vec![Cell::Pointer(inner.clone()), Cell::Int(3)]);
    let mut copy = original.clone_deep();

    assert_eq!(copy, original);
    assert_ne!(copy.id(), original.id());
    let Cell::Pointer(copied_inner) = copy.first() else {
        panic!("expected a nested element");
    };
    assert!(!copied_inner.ptr_eq(&inner));

    copy.set_cell(1, Cell::Int(99)).unwrap();
    assert_eq!(original.ravel()[1], Cell::Int(3));
}

#[test]
fn identical_distinguishes_float_bits() {
    let a = Value::vector(vec![Cell::Float(0.0)]);
    let b = Value::vector(vec![Cell::Float(-0.0)]);
    assert_eq!(a, b);
    assert!(!a.identical(&b));
    assert!(a.identical(&a.clone_deep()));
}

#[test]
fn make_mut_clones_only_when_shared() {
    let mut p = ValueP::new(Value::ints(&[1, 2, 3]));
    let id = p.id();
    p.make_mut().set_cell(0, Cell::Int(10)).unwrap();
    assert_eq!(p.id(), id);

    let other = p.clone();
    p.make_mut().set_cell(0, Cell::Int(20)).unwrap();
    assert_ne!(p.id(), id);
    assert_eq!(other.ravel()[0], Cell::Int(10));
    assert_eq!(p.ravel()[0], Cell::Int(20));
}

// Registry

#[test]
fn values_register_and_unregister() {
    let v = Value::ints(&[1]);
    let id = v.id();
    assert!(is_live(id));
    let entry = live_entry(id).unwrap();
    assert!(entry.complete);
    assert_eq!(entry.cells, 1);
    assert!(entry.created_at.file().ends_with("tests.rs"));
    drop(v);
    assert!(!is_live(id));
}

#[test]
fn partial_value_is_incomplete_until_checked() {
    let mut v = Value::partial(Shape::vector(2));
    assert!(!v.is_complete());
    let report = sweep(std::iter::empty());
    assert!(report.is_incomplete(v.id()));

    v.set_cell(0, Cell::Int(1)).unwrap();
    v.set_cell(1, Cell::Int(2)).unwrap();
    v.check().unwrap();
    assert!(live_entry(v.id()).unwrap().complete);
    let report = sweep(std::iter::empty());
    assert!(!report.is_incomplete(v.id()));
}

#[test]
fn sweep_reports_unrooted_values_as_stale() {
    let inner = ValueP::new(Value::ints(&[1, 2]));
    let rooted = Binding::bound("X", ValueP::new(Value::vector(vec![Cell::Pointer(inner.clone())])));
    let loose = Value::ints(&[9]);

    let report = sweep([&rooted]);
    let root_id = rooted.value().unwrap().id();
    assert!(!report.is_stale(root_id));
    assert!(!report.is_stale(inner.id()));
    assert!(report.is_stale(loose.id()));
    assert!(report.reachable >= 2);
}

#[test]
fn sweep_visits_shared_values_once_and_unmarks() {
    let shared = ValueP::new(Value::ints(&[1]));
    let outer = Value::vector(vec![Cell::Pointer(shared.clone()), Cell::Pointer(shared.clone())]);
    let root = Binding::bound("Y", ValueP::new(outer));

    let report = sweep([&root]);
    assert_eq!(report.reachable, 2);
    assert!(!shared.flags().contains(ValueFlags::MARKED));
}

/// `⊂⊂…⊂1`, `levels` enclosures deep.
fn chain(levels: usize) -> ValueP {
    let mut v = ValueP::scalar(Cell::Int(1));
    for _ in 0..levels {
        v = ValueP::new(Value::scalar(Cell::Pointer(v)));
    }
    v
}

#[test]
fn deep_chain_drops_and_compares_on_a_small_stack() {
    let handle = std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(|| {
            let a = chain(200_000);
            let b = chain(200_000);
            assert_eq!(a.depth(), 200_000);
            assert!(*a == *b);
            let id = a.id();
            drop(a);
            drop(b);
            !is_live(id)
        })
        .unwrap();
    assert!(handle.join().unwrap());
}

#[test]
fn dropping_keeps_sub_values_that_are_still_shared() {
    let inner = ValueP::new(Value::ints(&[1, 2]));
    let outer = ValueP::new(Value::scalar(Cell::Pointer(inner.clone())));
    drop(outer);
    assert!(is_live(inner.id()));
    assert_eq!(inner.ravel(), Value::ints(&[1, 2]).ravel());
}

// Bindings

#[test]
fn isolate_copies_shared_value_before_write() {
    let value = ValueP::new(Value::ints(&[1, 2, 3]));
    let mut x = Binding::bound("X", value.clone());
    x.isolate().unwrap().set_cell(1, Cell::Int(7)).unwrap();

    assert_eq!(value.ravel()[1], Cell::Int(2));
    assert_eq!(x.value().unwrap().ravel()[1], Cell::Int(7));
    assert!(x.value().unwrap().flags().contains(ValueFlags::ASSIGNED));
}

#[test]
fn isolate_of_unbound_name_is_value_error() {
    let mut x = Binding::new("X");
    assert_eq!(x.isolate().unwrap_err().code, ErrorCode::NoValue);
}

#[test]
fn selective_assignment_writes_referenced_elements() {
    let mut x = Binding::bound("X", ValueP::new(Value::ints(&[1, 2, 3, 4])));
    let lvals = x.lval_value().unwrap();
    let targets = Value::vector(vec![lvals.ravel()[1].clone(), lvals.ravel()[3].clone()]);

    x.assign_selected(&targets, &Value::ints(&[20, 40])).unwrap();
    assert_eq!(x.value().unwrap().ravel(), Value::ints(&[1, 20, 3, 40]).ravel());

    x.assign_selected(&targets, &Value::scalar(Cell::Int(0))).unwrap();
    assert_eq!(x.value().unwrap().ravel(), Value::ints(&[1, 0, 3, 0]).ravel());
}

#[test]
fn selective_assignment_after_rebind_is_stale() {
    let mut x = Binding::bound("X", ValueP::new(Value::ints(&[1, 2])));
    let target = Value::vector(vec![Cell::Lval(x.lval(0).unwrap())]);
    x.assign(ValueP::new(Value::ints(&[5, 6])));

    let err = x.assign_selected(&target, &Value::scalar(Cell::Int(0))).unwrap_err();
    assert_eq!(err.code, ErrorCode::NoValue);
    assert_eq!(x.value().unwrap().ravel(), Value::ints(&[5, 6]).ravel());
}

#[test]
fn selective_assignment_checks_shapes() {
    let mut x = Binding::bound("X", ValueP::new(Value::ints(&[1, 2, 3])));
    let targets = x.lval_value().unwrap();
    let err = x.assign_selected(&targets, &Value::ints(&[1, 2])).unwrap_err();
    assert_eq!(err.code, ErrorCode::Length);
    assert_eq!(x.lval(3).unwrap_err().code, ErrorCode::Index);
}

fn bound_matrix() -> Binding {
    let cells = (1..=6).map(Cell::Int).collect();
    Binding::bound(
        "M",
        ValueP::new(Value::from_cells(Shape::new(&[2, 3]).unwrap(), cells).unwrap()),
    )
}

#[test]
fn indexed_assignment_checks_shapes_and_indices() {
    let mut m = bound_matrix();
    let rows = Value::ints(&[1, 2]);

    let two_by_two = Value::from_cells(Shape::new(&[2, 2]).unwrap(), vec![Cell::Int(0); 4]).unwrap();
    let err = m.assign_indexed(&[Some(&rows), None], &two_by_two, 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::Length);

    let err = m.assign_indexed(&[Some(&rows), None], &Value::ints(&[7, 8, 9]), 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::Rank);

    let past_end = Value::scalar(Cell::Int(3));
    let err = m
        .assign_indexed(&[Some(&past_end), None], &Value::scalar(Cell::Int(0)), 1)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Index);

    assert_eq!(m.value().unwrap().ravel(), Value::ints(&[1, 2, 3, 4, 5, 6]).ravel());
}

#[test]
fn indexed_assignment_isolates_a_shared_value() {
    let shared = ValueP::new(Value::ints(&[1, 2, 3]));
    let mut x = Binding::bound("X", shared.clone());
    let second = Value::scalar(Cell::Int(2));
    x.assign_indexed(&[Some(&second)], &Value::scalar(Cell::Int(20)), 1).unwrap();

    assert_eq!(shared.ravel(), Value::ints(&[1, 2, 3]).ravel());
    assert_eq!(x.value().unwrap().ravel(), Value::ints(&[1, 20, 3]).ravel());
    assert!(!x.value().unwrap().ptr_eq(&shared));
}
