//! Boolean-valued nodes: logic operators and comparisons.

use slate_types::{assert_same_type, Type};

use super::{Call, Conditional, Evaluate, FloatNode, Index, IntNode, Let};
use crate::errors::EvalResult;
use crate::frame::{Frame, FrameDescriptor, SlotIndex};

/// Binary operator over two booleans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicOp {
    /// Short-circuits on `false`.
    And,
    /// Short-circuits on `true`.
    Or,
    Xor,
    Eq,
    Ne,
}

/// Comparison of two numbers of the same type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    #[inline]
    fn apply<T: PartialOrd>(self, a: T, b: T) -> bool {
        match self {
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Ge => a >= b,
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
        }
    }
}

/// Node producing a `bool`.
#[derive(Debug)]
pub enum BoolNode {
    Literal(bool),
    Read(SlotIndex),
    Not(Box<BoolNode>),
    Logic(LogicOp, Box<BoolNode>, Box<BoolNode>),
    IntCompare(CompareOp, Box<IntNode>, Box<IntNode>),
    FloatCompare(CompareOp, Box<FloatNode>, Box<FloatNode>),
    If(Conditional<BoolNode>),
    Let(Let<BoolNode>),
    Call(Call),
    Index(Index),
}

impl BoolNode {
    pub fn literal(value: bool) -> Self {
        BoolNode::Literal(value)
    }

    pub fn read(descriptor: &FrameDescriptor, slot: SlotIndex) -> Self {
        descriptor.expect_slot_type(slot, &Type::Bool);
        BoolNode::Read(slot)
    }

    #[allow(clippy::should_implement_trait, reason = "builds a node, does not negate")]
    pub fn not(operand: BoolNode) -> Self {
        BoolNode::Not(Box::new(operand))
    }

    pub fn logic(op: LogicOp, left: BoolNode, right: BoolNode) -> Self {
        BoolNode::Logic(op, Box::new(left), Box::new(right))
    }

    pub fn and(left: BoolNode, right: BoolNode) -> Self {
        Self::logic(LogicOp::And, left, right)
    }

    pub fn or(left: BoolNode, right: BoolNode) -> Self {
        Self::logic(LogicOp::Or, left, right)
    }

    pub fn xor(left: BoolNode, right: BoolNode) -> Self {
        Self::logic(LogicOp::Xor, left, right)
    }

    pub fn compare_int(op: CompareOp, left: IntNode, right: IntNode) -> Self {
        BoolNode::IntCompare(op, Box::new(left), Box::new(right))
    }

    pub fn compare_float(op: CompareOp, left: FloatNode, right: FloatNode) -> Self {
        BoolNode::FloatCompare(op, Box::new(left), Box::new(right))
    }

    pub fn if_then_else(test: BoolNode, then_branch: BoolNode, else_branch: BoolNode) -> Self {
        BoolNode::If(Conditional::new(test, then_branch, else_branch))
    }

    pub fn let_in(bindings: Vec<super::Binding>, body: BoolNode) -> Self {
        BoolNode::Let(Let::new(bindings, body))
    }

    pub fn call(call: Call) -> Self {
        assert_same_type(&Type::Bool, call.result_type(), "call result");
        BoolNode::Call(call)
    }

    pub fn index(index: Index) -> Self {
        assert_same_type(&Type::Bool, index.element_type(), "indexed element");
        BoolNode::Index(index)
    }
}

impl Evaluate for BoolNode {
    type Output = bool;

    fn ty(&self) -> Type {
        Type::Bool
    }

    fn eval(&self, frame: &mut Frame) -> EvalResult<bool> {
        match self {
            BoolNode::Literal(b) => Ok(*b),
            BoolNode::Read(slot) => Ok(frame.read_bool(*slot)),
            BoolNode::Not(operand) => Ok(!operand.eval(frame)?),
            BoolNode::Logic(op, left, right) => {
                let a = left.eval(frame)?;
                match op {
                    LogicOp::And => Ok(a && right.eval(frame)?),
                    LogicOp::Or => Ok(a || right.eval(frame)?),
                    LogicOp::Xor => Ok(a ^ right.eval(frame)?),
                    LogicOp::Eq => Ok(a == right.eval(frame)?),
                    LogicOp::Ne => Ok(a != right.eval(frame)?),
                }
            }
            BoolNode::IntCompare(op, left, right) => {
                let a = left.eval(frame)?;
                let b = right.eval(frame)?;
                Ok(op.apply(a, b))
            }
            BoolNode::FloatCompare(op, left, right) => {
                let a = left.eval(frame)?;
                let b = right.eval(frame)?;
                Ok(op.apply(a, b))
            }
            BoolNode::If(cond) => cond.eval(frame),
            BoolNode::Let(block) => block.eval(frame),
            BoolNode::Call(call) => Ok(call.invoke(frame)?.into_bool()),
            BoolNode::Index(index) => index.get_bool(frame),
        }
    }
}
