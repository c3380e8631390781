#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::call::{CallTarget, UserFunction};
use crate::nodes::{IntNode, Node};
use crate::value::FunctionValue;
use pretty_assertions::assert_eq;
use slate_types::Type;
use smallvec::smallvec;

fn thunk_type() -> Type {
    Type::function(Type::Int, vec![])
}

/// `() -> x` where `x` is captured: closure slot 0, call-frame slot 0.
fn read_captured() -> Rc<CallTarget> {
    let mut closure = FrameDescriptor::builder();
    let captured = closure.add_slot("x", Type::Int);
    let closure = closure.build();
    let mut frame = FrameDescriptor::builder();
    let x = frame.add_slot("x", Type::Int);
    let frame = frame.build();
    CallTarget::user(UserFunction {
        name: Some("read_x".to_string()),
        ty: thunk_type(),
        body: Node::Int(IntNode::read(&frame, x)),
        frame,
        params: vec![],
        closure,
        disclosure: vec![SlotBinding::new(captured, x)],
    })
}

fn enclosing() -> (Rc<FrameDescriptor>, SlotIndex) {
    let mut builder = FrameDescriptor::builder();
    let x = builder.add_slot("x", Type::Int);
    (builder.build(), x)
}

#[test]
fn nothing_to_capture_allocates_nothing() {
    let (desc, _) = enclosing();
    let encloser = Encloser::new(&desc, FrameDescriptor::empty(), vec![]);
    assert!(encloser.capture(&Frame::allocate(&desc)).is_none());
}

#[test]
fn capture_is_a_snapshot() {
    let (desc, x) = enclosing();
    let target = read_captured();
    let layout = Rc::clone(target.closure_descriptor().unwrap());
    let encloser = Encloser::new(&desc, layout, vec![SlotBinding::new(x, SlotIndex::new(0))]);

    let mut frame = Frame::allocate(&desc);
    frame.write_int(x, 10);
    let closure = encloser.capture(&frame).unwrap();
    frame.write_int(x, 20);

    assert_eq!(closure.frame().read_int(SlotIndex::new(0)), 10);
    let f = FunctionValue::new(target, Some(closure));
    assert_eq!(f.call(smallvec![]).unwrap(), crate::Value::Int(10));
}

#[test]
fn instantiations_are_independent() {
    let (desc, x) = enclosing();
    let target = read_captured();
    let layout = Rc::clone(target.closure_descriptor().unwrap());
    let encloser = Encloser::new(&desc, layout, vec![SlotBinding::new(x, SlotIndex::new(0))]);

    let mut frame = Frame::allocate(&desc);
    frame.write_int(x, 1);
    let first = FunctionValue::new(Rc::clone(&target), encloser.capture(&frame));
    frame.write_int(x, 2);
    let second = FunctionValue::new(Rc::clone(&target), encloser.capture(&frame));

    assert!(Rc::ptr_eq(first.target(), second.target()));
    assert!(!first.same_instance(&second));
    assert!(first.same_instance(&first.clone()));
    assert_eq!(first.call(smallvec![]).unwrap(), crate::Value::Int(1));
    assert_eq!(second.call(smallvec![]).unwrap(), crate::Value::Int(2));
}

#[test]
fn disclose_restores_captured_slots() {
    let (desc, x) = enclosing();
    let mut source = Frame::allocate(&desc);
    source.write_int(x, 5);
    let encloser = Encloser::new(&desc, Rc::clone(&desc), vec![SlotBinding::new(x, x)]);
    let closure = encloser.capture(&source).unwrap();

    let discloser = Discloser::new(&desc, &desc, vec![SlotBinding::new(x, x)]);
    let mut call_frame = Frame::allocate(&desc);
    discloser.disclose(Some(&closure), &mut call_frame);
    assert_eq!(call_frame.read_int(x), 5);
}

#[test]
#[should_panic(expected = "has no closure")]
fn missing_closure_is_a_defect() {
    let (desc, x) = enclosing();
    let discloser = Discloser::new(&desc, &desc, vec![SlotBinding::new(x, x)]);
    discloser.disclose(None, &mut Frame::allocate(&desc));
}

#[test]
#[should_panic(expected = "captures nothing")]
fn unexpected_closure_is_a_defect() {
    let (desc, _) = enclosing();
    let discloser = Discloser::new(&desc, &desc, vec![]);
    discloser.disclose(Some(&Closure::allocate(&desc)), &mut Frame::allocate(&desc));
}

/// `() -> 1` whose closure layout holds the function itself.
fn self_capturing() -> (Rc<CallTarget>, SlotIndex) {
    let ty = Type::function(Type::Int, vec![]);
    let mut closure = FrameDescriptor::builder();
    let own = closure.add_slot("f", ty.clone());
    let closure = closure.build();
    let mut frame = FrameDescriptor::builder();
    let f = frame.add_slot("f", ty.clone());
    let frame = frame.build();
    let target = CallTarget::user(UserFunction {
        name: Some("f".to_string()),
        ty,
        body: Node::Int(IntNode::literal(1)),
        frame,
        params: vec![],
        closure,
        disclosure: vec![SlotBinding::new(own, f)],
    });
    (target, own)
}

#[test]
fn recursive_capture_allocates_lazily_without_a_cycle() {
    let (target, own) = self_capturing();
    let mut desc = FrameDescriptor::builder();
    let slot = desc.add_slot("f", target.ty().clone());
    let desc = desc.build();

    let mut frame = Frame::allocate(&desc);
    frame.write_function(slot, FunctionValue::plain(Rc::clone(&target)));
    capture_recursive(&mut frame, slot, own);

    let bound = frame.read_function(slot);
    let closure = bound.closure().unwrap();
    // Frame slot, `bound` and `closure`; the closure's own copy is weak.
    assert_eq!(Rc::strong_count(&closure), 3);
    assert_eq!(Rc::weak_count(&closure), 1);

    let inner = closure.frame().read_function(own);
    assert!(inner.same_instance(&bound));

    let mut call_frame = Frame::allocate(&desc);
    let layout = target.closure_descriptor().unwrap();
    Discloser::new(layout, &desc, vec![SlotBinding::new(own, slot)])
        .disclose(Some(&closure), &mut call_frame);
    let restored = call_frame.read_function(slot);
    assert!(restored.same_instance(&bound));
    assert!(!restored.is_self_reference());
    assert_eq!(restored.call(smallvec![]).unwrap(), crate::Value::Int(1));
}
