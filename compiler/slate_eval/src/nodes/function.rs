//! Function definitions, function-valued nodes and calls.

use std::rc::Rc;

use slate_types::{defect, Type};

use super::{Binding, BoolNode, Conditional, Evaluate, Index, Let, Node};
use crate::call::{ArgVec, CallTarget};
use crate::closure::{Encloser, SlotBinding};
use crate::errors::EvalResult;
use crate::frame::{Frame, FrameDescriptor, SlotIndex};
use crate::value::{FunctionValue, Value};

/// A lambda: shared code plus the captures it takes from the defining frame.
///
/// Each evaluation produces a distinct [`FunctionValue`] with its own
/// closure snapshot.
#[derive(Debug)]
pub struct FunctionDefinition {
    target: Rc<CallTarget>,
    encloser: Encloser,
}

impl FunctionDefinition {
    /// `captures` map slots of `enclosing` to slots of the target's closure.
    pub fn new(
        target: Rc<CallTarget>,
        enclosing: &FrameDescriptor,
        captures: Vec<SlotBinding>,
    ) -> Self {
        let layout = match target.closure_descriptor() {
            Some(layout) => Rc::clone(layout),
            None => defect(format_args!("definition of builtin {target:?}")),
        };
        FunctionDefinition {
            encloser: Encloser::new(enclosing, layout, captures),
            target,
        }
    }

    #[inline]
    pub fn target(&self) -> &Rc<CallTarget> {
        &self.target
    }

    pub fn instantiate(&self, frame: &Frame) -> FunctionValue {
        FunctionValue::new(Rc::clone(&self.target), self.encloser.capture(frame))
    }
}

/// Node producing a function value.
#[derive(Debug)]
pub enum FunctionNode {
    /// A builtin or other global function.
    Constant(FunctionValue),
    Read(SlotIndex, Type),
    Define(FunctionDefinition),
    If(Conditional<FunctionNode>),
    Let(Let<FunctionNode>),
    Call(Call),
    Index(Index),
}

impl FunctionNode {
    pub fn constant(value: FunctionValue) -> Self {
        FunctionNode::Constant(value)
    }

    pub fn read(descriptor: &FrameDescriptor, slot: SlotIndex) -> Self {
        let ty = descriptor.slot_type(slot).clone();
        ty.expect_function();
        FunctionNode::Read(slot, ty)
    }

    pub fn define(definition: FunctionDefinition) -> Self {
        FunctionNode::Define(definition)
    }

    pub fn if_then_else(
        test: BoolNode,
        then_branch: FunctionNode,
        else_branch: FunctionNode,
    ) -> Self {
        FunctionNode::If(Conditional::new(test, then_branch, else_branch))
    }

    pub fn let_in(bindings: Vec<Binding>, body: FunctionNode) -> Self {
        FunctionNode::Let(Let::new(bindings, body))
    }

    pub fn call(call: Call) -> Self {
        call.result_type().expect_function();
        FunctionNode::Call(call)
    }

    pub fn index(index: Index) -> Self {
        index.element_type().expect_function();
        FunctionNode::Index(index)
    }
}

impl Evaluate for FunctionNode {
    type Output = FunctionValue;

    fn ty(&self) -> Type {
        match self {
            FunctionNode::Constant(f) => f.ty().clone(),
            FunctionNode::Read(_, ty) => ty.clone(),
            FunctionNode::Define(def) => def.target.ty().clone(),
            FunctionNode::If(cond) => cond.ty(),
            FunctionNode::Let(block) => block.ty(),
            FunctionNode::Call(call) => call.result_type().clone(),
            FunctionNode::Index(index) => index.element_type().clone(),
        }
    }

    fn eval(&self, frame: &mut Frame) -> EvalResult<FunctionValue> {
        match self {
            FunctionNode::Constant(f) => Ok(f.clone()),
            FunctionNode::Read(slot, _) => Ok(frame.read_function(*slot)),
            FunctionNode::Define(def) => Ok(def.instantiate(frame)),
            FunctionNode::If(cond) => cond.eval(frame),
            FunctionNode::Let(block) => block.eval(frame),
            FunctionNode::Call(call) => Ok(call.invoke(frame)?.into_function()),
            FunctionNode::Index(index) => Ok(index.get_value(frame)?.into_function()),
        }
    }
}

/// Call of a function-valued expression.
///
/// Arguments are evaluated left to right after the callee.
#[derive(Debug)]
pub struct Call {
    callee: Box<FunctionNode>,
    args: Vec<Node>,
    result: Type,
}

impl Call {
    pub fn new(callee: FunctionNode, args: Vec<Node>) -> Self {
        let ty = callee.ty();
        let signature = ty.expect_function();
        let arg_types: Vec<Type> = args.iter().map(Node::ty).collect();
        if !signature.accepts(&arg_types) {
            defect(format_args!(
                "call of {ty} with arguments ({})",
                arg_types
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            ));
        }
        Call {
            result: signature.result().clone(),
            callee: Box::new(callee),
            args,
        }
    }

    /// Declared result type.
    #[inline]
    pub fn result_type(&self) -> &Type {
        &self.result
    }

    /// Evaluate callee and arguments, then call. The result is boxed.
    pub fn invoke(&self, frame: &mut Frame) -> EvalResult<Value> {
        let function = self.callee.eval(frame)?;
        let mut values = ArgVec::with_capacity(self.args.len());
        for arg in &self.args {
            values.push(arg.eval_value(frame)?);
        }
        let result = function.call(values)?;
        debug_assert_eq!(
            result.representation(),
            self.result.representation(),
            "result of {function}"
        );
        Ok(result)
    }
}

