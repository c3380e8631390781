#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::errors::EvalErrorKind;
use crate::frame::{FrameDescriptor, SlotIndex};
use crate::value::{ArrayValue, Value};
use pretty_assertions::assert_eq;

fn empty_frame() -> Frame {
    Frame::allocate(&FrameDescriptor::empty())
}

fn int(n: i64) -> IntNode {
    IntNode::literal(n)
}

fn int_op(op: IntOp, a: i64, b: i64) -> EvalResult<i64> {
    IntNode::binary(op, int(a), int(b)).eval(&mut empty_frame())
}

/// A boolean operand that fails if it is ever evaluated.
fn poisoned() -> BoolNode {
    BoolNode::compare_int(
        CompareOp::Eq,
        IntNode::binary(IntOp::Div, int(1), int(0)),
        int(0),
    )
}

fn int_array(items: &[i64]) -> RefNode {
    RefNode::array(Type::Int, items.iter().map(|n| Node::Int(int(*n))).collect())
}

// Arithmetic

#[test]
fn integer_arithmetic() {
    assert_eq!(int_op(IntOp::Add, 2, 3).unwrap(), 5);
    assert_eq!(int_op(IntOp::Sub, 2, 3).unwrap(), -1);
    assert_eq!(int_op(IntOp::Mul, -4, 3).unwrap(), -12);
    assert_eq!(int_op(IntOp::Div, 7, 2).unwrap(), 3);
    assert_eq!(int_op(IntOp::Div, -7, 2).unwrap(), -3);
    assert_eq!(int_op(IntOp::Rem, 7, 3).unwrap(), 1);
    assert_eq!(int_op(IntOp::Pow, 2, 10).unwrap(), 1024);
    assert_eq!(int_op(IntOp::Pow, 5, 0).unwrap(), 1);
    assert_eq!(int_op(IntOp::Pow, -1, 1 << 40).unwrap(), 1);
}

#[test]
fn integer_arithmetic_is_checked() {
    assert_eq!(
        int_op(IntOp::Add, i64::MAX, 1).unwrap_err(),
        EvalErrorKind::IntegerOverflow {
            operation: "addition"
        }
    );
    assert_eq!(
        int_op(IntOp::Div, 1, 0).unwrap_err(),
        EvalErrorKind::DivisionByZero
    );
    assert_eq!(
        int_op(IntOp::Rem, 1, 0).unwrap_err(),
        EvalErrorKind::DivisionByZero
    );
    assert_eq!(
        int_op(IntOp::Div, i64::MIN, -1).unwrap_err(),
        EvalErrorKind::IntegerOverflow {
            operation: "division"
        }
    );
    assert_eq!(
        int_op(IntOp::Pow, 2, 64).unwrap_err(),
        EvalErrorKind::IntegerOverflow {
            operation: "exponentiation"
        }
    );
    assert!(matches!(
        int_op(IntOp::Pow, 2, -1).unwrap_err().kind,
        EvalErrorKind::DomainError { .. }
    ));
    assert_eq!(
        IntNode::neg(int(i64::MIN))
            .eval(&mut empty_frame())
            .unwrap_err(),
        EvalErrorKind::IntegerOverflow {
            operation: "negation"
        }
    );
}

#[test]
fn float_arithmetic_follows_ieee() {
    let eval = |op, a, b| {
        FloatNode::binary(op, FloatNode::literal(a), FloatNode::literal(b))
            .eval(&mut empty_frame())
            .unwrap()
    };
    assert_eq!(eval(FloatOp::Add, 0.5, 0.25), 0.75);
    assert_eq!(eval(FloatOp::Pow, 2.0, 3.0), 8.0);
    assert_eq!(eval(FloatOp::Div, 1.0, 0.0), f64::INFINITY);
    assert_eq!(
        FloatNode::neg(FloatNode::literal(1.5))
            .eval(&mut empty_frame())
            .unwrap(),
        -1.5
    );
}

// Logic

#[test]
fn comparisons() {
    let cmp = |op, a, b| {
        BoolNode::compare_int(op, int(a), int(b))
            .eval(&mut empty_frame())
            .unwrap()
    };
    assert!(cmp(CompareOp::Lt, 1, 2));
    assert!(cmp(CompareOp::Le, 2, 2));
    assert!(!cmp(CompareOp::Gt, 2, 2));
    assert!(cmp(CompareOp::Ge, 3, 2));
    assert!(cmp(CompareOp::Eq, 3, 3));
    assert!(cmp(CompareOp::Ne, 3, 2));

    let nan = BoolNode::compare_float(
        CompareOp::Eq,
        FloatNode::literal(f64::NAN),
        FloatNode::literal(f64::NAN),
    );
    assert!(!nan.eval(&mut empty_frame()).unwrap());
}

#[test]
fn logic_operators() {
    let eval = |op, a, b| {
        BoolNode::logic(op, BoolNode::literal(a), BoolNode::literal(b))
            .eval(&mut empty_frame())
            .unwrap()
    };
    assert!(eval(LogicOp::Xor, true, false));
    assert!(!eval(LogicOp::Xor, true, true));
    assert!(eval(LogicOp::Eq, false, false));
    assert!(eval(LogicOp::Ne, true, false));
    assert!(!BoolNode::not(BoolNode::literal(true))
        .eval(&mut empty_frame())
        .unwrap());
}

#[test]
fn and_or_short_circuit() {
    let and = BoolNode::and(BoolNode::literal(false), poisoned());
    assert!(!and.eval(&mut empty_frame()).unwrap());

    let or = BoolNode::or(BoolNode::literal(true), poisoned());
    assert!(or.eval(&mut empty_frame()).unwrap());

    let evaluated = BoolNode::and(BoolNode::literal(true), poisoned());
    assert_eq!(
        evaluated.eval(&mut empty_frame()).unwrap_err(),
        EvalErrorKind::DivisionByZero
    );
}

#[test]
fn conditional_evaluates_one_branch() {
    let pick = |test| {
        IntNode::if_then_else(
            BoolNode::literal(test),
            int(1),
            IntNode::binary(IntOp::Div, int(1), int(0)),
        )
        .eval(&mut empty_frame())
    };
    assert_eq!(pick(true).unwrap(), 1);
    assert!(pick(false).is_err());
}

// Let and bindings

#[test]
fn let_bindings_see_earlier_bindings() {
    let mut desc = FrameDescriptor::builder();
    let a = desc.add_slot("a", Type::Int);
    let b = desc.add_slot("b", Type::Int);
    let desc = desc.build();

    let node = IntNode::let_in(
        vec![
            Binding::new(&desc, a, int(20)),
            Binding::new(&desc, b, IntNode::add(IntNode::read(&desc, a), int(1))),
        ],
        IntNode::mul(IntNode::read(&desc, b), int(2)),
    );
    let mut frame = Frame::allocate(&desc);
    assert_eq!(node.eval(&mut frame).unwrap(), 42);
    assert_eq!(frame.read_int(a), 20);
}

#[test]
fn a_binding_is_its_own_result() {
    let mut desc = FrameDescriptor::builder();
    let a = desc.add_slot("a", Type::Int);
    let xs = desc.add_slot("xs", Type::array(Type::Int));
    let desc = desc.build();
    let mut frame = Frame::allocate(&desc);

    let bound = Binding::new(&desc, a, IntNode::add(int(40), int(2)));
    assert_eq!(bound.eval(&mut frame).unwrap(), Value::Int(42));
    assert_eq!(frame.read_int(a), 42);

    let array = Binding::new(&desc, xs, int_array(&[1, 2]));
    assert_eq!(
        array.eval(&mut frame).unwrap(),
        Value::Array(ArrayValue::from_ints(vec![1, 2]))
    );
    assert_eq!(frame.read_value(xs), Value::Array(ArrayValue::from_ints(vec![1, 2])));

    let failing = Binding::new(&desc, a, IntNode::binary(IntOp::Div, int(1), int(0)));
    assert_eq!(failing.eval(&mut frame).unwrap_err(), EvalErrorKind::DivisionByZero);
    assert_eq!(frame.read_int(a), 42);
}

#[test]
fn node_types_are_declared() {
    assert_eq!(Node::from(int(1)).ty(), Type::Int);
    assert_eq!(Node::from(BoolNode::literal(true)).ty(), Type::Bool);
    assert_eq!(Node::from(int_array(&[1])).ty(), Type::array(Type::Int));
    assert_eq!(
        Node::from(int_array(&[1])).representation(),
        slate_types::Representation::Reference
    );
    let range = RefNode::range(RangeLiteral::float(None, None, None));
    assert_eq!(range.ty(), Type::range(Type::Float));
}

#[test]
#[should_panic(expected = "internal evaluator defect")]
fn binding_of_wrong_type_is_a_defect() {
    let mut desc = FrameDescriptor::builder();
    let a = desc.add_slot("a", Type::Int);
    let desc = desc.build();
    Binding::new(&desc, a, BoolNode::literal(true));
}

#[test]
#[should_panic(expected = "internal evaluator defect")]
fn mismatched_branches_are_a_defect() {
    RefNode::if_then_else(
        BoolNode::literal(true),
        int_array(&[1]),
        RefNode::array(Type::Float, vec![]),
    );
}

// Sequences

#[test]
fn array_literal_and_index() {
    let node = IntNode::index(Index::new(int_array(&[4, 5, 6]), int(2)));
    assert_eq!(node.eval(&mut empty_frame()).unwrap(), 5);

    let outside = IntNode::index(Index::new(int_array(&[1, 2]), int(5)));
    assert_eq!(
        outside.eval(&mut empty_frame()).unwrap_err(),
        EvalErrorKind::IndexOutOfBounds { index: 5, len: 2 }
    );
}

#[test]
fn slice_node_produces_view() {
    let slicer = RefNode::range(RangeLiteral::int(Some(int(2)), None, None));
    let node = RefNode::slice(int_array(&[1, 2, 3]), slicer);
    let value = node.eval(&mut empty_frame()).unwrap();
    assert!(matches!(value, Value::Slice(_)));
    assert_eq!(value, Value::Array(ArrayValue::from_ints(vec![2, 3])));
}

#[test]
fn range_literal_with_zero_step_fails() {
    let node = RefNode::range(RangeLiteral::int(Some(int(1)), Some(int(3)), Some(int(0))));
    assert_eq!(
        node.eval(&mut empty_frame()).unwrap_err(),
        EvalErrorKind::ZeroStep
    );
}

#[test]
fn nested_arrays_index_to_references() {
    let rows = RefNode::array(
        Type::array(Type::Int),
        vec![Node::from(int_array(&[1, 2])), Node::from(int_array(&[3]))],
    );
    let row = RefNode::index(Index::new(rows, int(2)));
    let cell = IntNode::index(Index::new(row, int(1)));
    assert_eq!(cell.eval(&mut empty_frame()).unwrap(), 3);
}

#[test]
#[should_panic(expected = "internal evaluator defect")]
fn slicing_with_a_float_range_is_a_defect() {
    RefNode::slice(
        int_array(&[1]),
        RefNode::range(RangeLiteral::float(None, None, None)),
    );
}

#[test]
#[should_panic(expected = "internal evaluator defect")]
fn reading_a_slot_of_another_category_is_a_defect() {
    let mut desc = FrameDescriptor::builder();
    let a = desc.add_slot("a", Type::Float);
    let desc = desc.build();
    IntNode::read(&desc, a);
}

#[test]
fn slot_reads() {
    let mut desc = FrameDescriptor::builder();
    let xs = desc.add_slot("xs", Type::array(Type::Int));
    let desc = desc.build();
    let mut frame = Frame::allocate(&desc);
    frame.write_reference(xs, Value::Array(ArrayValue::from_ints(vec![7])));
    let node = IntNode::index(Index::new(RefNode::read(&desc, xs), int(1)));
    assert_eq!(node.eval(&mut frame).unwrap(), 7);
    assert_eq!(SlotIndex::new(0), xs);
}
