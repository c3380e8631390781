//! End-to-end tests over hand-built checked programs.
//!
//! Each test assembles the node tree and slot layouts an upstream checker
//! would produce, then runs it through [`Program::execute`](crate::Program).


use std::rc::Rc;

use slate_types::Type;

use crate::builtins::BuiltinRegistry;
use crate::call::{CallTarget, UserFunction};
use crate::closure::SlotBinding;
use crate::frame::{FrameDescriptor, SlotIndex};
use crate::nodes::{FunctionDefinition, FunctionNode, IntNode, Node, RefNode};

fn int_to_int() -> Type {
    Type::function(Type::Int, vec![Type::Int])
}

#[track_caller]
fn slot(frame: &FrameDescriptor, name: &str) -> SlotIndex {
    frame
        .find(name)
        .unwrap_or_else(|| panic!("no slot named `{name}`"))
}

fn read(frame: &FrameDescriptor, name: &str) -> IntNode {
    IntNode::read(frame, slot(frame, name))
}

fn int_array(items: &[i64]) -> RefNode {
    RefNode::array(
        Type::Int,
        items.iter().map(|n| Node::Int(IntNode::literal(*n))).collect(),
    )
}

/// `(p1, ..., pn) -> body` over `int` parameters.
///
/// `captures` names `int` variables of the defining scope; they get slots in
/// the call frame after the parameters and are restored from the closure.
fn int_lambda(
    result: Type,
    params: &[&str],
    captures: &[&str],
    body: impl FnOnce(&FrameDescriptor) -> Node,
) -> Rc<CallTarget> {
    let mut frame = FrameDescriptor::builder();
    let param_slots: Vec<SlotIndex> = params.iter().map(|p| frame.add_slot(p, Type::Int)).collect();
    let captured: Vec<SlotIndex> = captures.iter().map(|c| frame.add_slot(c, Type::Int)).collect();
    let frame = frame.build();

    let mut closure = FrameDescriptor::builder();
    let disclosure = captures
        .iter()
        .zip(captured)
        .map(|(name, target)| SlotBinding::new(closure.add_slot(name, Type::Int), target))
        .collect();

    CallTarget::user(UserFunction {
        name: None,
        ty: Type::function(result, vec![Type::Int; params.len()]),
        body: body(&frame),
        frame,
        params: param_slots,
        closure: closure.build(),
        disclosure,
    })
}

/// Definition node for a target built by [`int_lambda`] with the same
/// `captures`, read from `enclosing`.
fn define(target: Rc<CallTarget>, enclosing: &FrameDescriptor, captures: &[&str]) -> FunctionNode {
    let captures = captures
        .iter()
        .zip(0u32..)
        .map(|(name, i)| SlotBinding::new(slot(enclosing, name), SlotIndex::new(i)))
        .collect();
    FunctionNode::define(FunctionDefinition::new(target, enclosing, captures))
}

#[track_caller]
fn builtin(registry: &BuiltinRegistry, name: &str, args: &[Type]) -> FunctionNode {
    let function = registry
        .resolve(name, args)
        .unwrap_or_else(|| panic!("no overload of {name} for {args:?}"));
    FunctionNode::constant(function.clone())
}
