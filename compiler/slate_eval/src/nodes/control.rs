//! Conditionals, let blocks and bindings.
//!
//! These are generic over the node family of their result, so `if` and
//! `let` producing an `int` stay unboxed end to end.

use slate_types::{assert_same_type, Type};

use super::{BoolNode, Evaluate, FunctionNode, Node};
use crate::closure::capture_recursive;
use crate::errors::EvalResult;
use crate::frame::{Frame, FrameDescriptor, SlotIndex};
use crate::value::Value;

/// `if test then a else b`. Only the selected branch is evaluated.
#[derive(Debug)]
pub struct Conditional<N> {
    test: Box<BoolNode>,
    then_branch: Box<N>,
    else_branch: Box<N>,
}

impl<N: Evaluate> Conditional<N> {
    pub fn new(test: BoolNode, then_branch: N, else_branch: N) -> Self {
        assert_same_type(&then_branch.ty(), &else_branch.ty(), "conditional branches");
        Conditional {
            test: Box::new(test),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }
}

impl<N: Evaluate> Evaluate for Conditional<N> {
    type Output = N::Output;

    fn ty(&self) -> Type {
        self.then_branch.ty()
    }

    #[inline]
    fn eval(&self, frame: &mut Frame) -> EvalResult<N::Output> {
        if self.test.eval(frame)? {
            self.then_branch.eval(frame)
        } else {
            self.else_branch.eval(frame)
        }
    }
}

/// Evaluate a value and store it in a slot of the current frame.
#[derive(Debug)]
pub struct Binding {
    slot: SlotIndex,
    value: Node,
    /// Slot of the function's own closure that receives the function, when
    /// the body refers to the name being bound.
    recursive: Option<SlotIndex>,
}

impl Binding {
    pub fn new(descriptor: &FrameDescriptor, slot: SlotIndex, value: impl Into<Node>) -> Self {
        let value = value.into();
        descriptor.expect_slot_type(slot, &value.ty());
        Binding {
            slot,
            value,
            recursive: None,
        }
    }

    /// Bind a function whose body calls itself through `closure_slot`.
    pub fn recursive(
        descriptor: &FrameDescriptor,
        slot: SlotIndex,
        value: FunctionNode,
        closure_slot: SlotIndex,
    ) -> Self {
        let ty = value.ty();
        descriptor.expect_slot_type(slot, &ty);
        if let FunctionNode::Define(def) = &value {
            if let Some(layout) = def.target().closure_descriptor() {
                layout.expect_slot_type(closure_slot, &ty);
            }
        }
        Binding {
            slot,
            value: Node::Function(value),
            recursive: Some(closure_slot),
        }
    }

    #[inline]
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// Bind the value and return it boxed.
    pub fn eval(&self, frame: &mut Frame) -> EvalResult<Value> {
        self.execute(frame)?;
        Ok(frame.read_value(self.slot))
    }

    /// Bind the value without boxing it.
    pub fn execute(&self, frame: &mut Frame) -> EvalResult<()> {
        match &self.value {
            Node::Bool(n) => {
                let v = n.eval(frame)?;
                frame.write_bool(self.slot, v);
            }
            Node::Int(n) => {
                let v = n.eval(frame)?;
                frame.write_int(self.slot, v);
            }
            Node::Float(n) => {
                let v = n.eval(frame)?;
                frame.write_float(self.slot, v);
            }
            Node::Function(n) => {
                let f = n.eval(frame)?;
                frame.write_function(self.slot, f);
                if let Some(closure_slot) = self.recursive {
                    capture_recursive(frame, self.slot, closure_slot);
                }
            }
            Node::Reference(n) => {
                let v = n.eval(frame)?;
                frame.write_reference(self.slot, v);
            }
        }
        Ok(())
    }
}

/// `let b1, b2, ... in body`, evaluated in the current frame.
///
/// Bindings run in order, so later ones may read earlier ones.
#[derive(Debug)]
pub struct Let<N> {
    bindings: Vec<Binding>,
    body: Box<N>,
}

impl<N: Evaluate> Let<N> {
    pub fn new(bindings: Vec<Binding>, body: N) -> Self {
        Let {
            bindings,
            body: Box::new(body),
        }
    }
}

impl<N: Evaluate> Evaluate for Let<N> {
    type Output = N::Output;

    fn ty(&self) -> Type {
        self.body.ty()
    }

    fn eval(&self, frame: &mut Frame) -> EvalResult<N::Output> {
        for binding in &self.bindings {
            binding.execute(frame)?;
        }
        self.body.eval(frame)
    }
}
