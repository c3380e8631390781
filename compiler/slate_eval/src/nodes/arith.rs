//! Integer and float arithmetic.
//!
//! Integer operations are checked: overflow, division by zero and negative
//! exponents are runtime errors. Float operations follow IEEE 754.

use slate_types::{assert_same_type, Type};

use super::{Binding, Call, Conditional, Evaluate, Index, Let};
use crate::errors::{division_by_zero, domain_error, integer_overflow, EvalResult};
use crate::frame::{Frame, FrameDescriptor, SlotIndex};

/// Binary integer operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntOp {
    Add,
    Sub,
    Mul,
    /// Truncating division.
    Div,
    Rem,
    Pow,
}

impl IntOp {
    pub fn apply(self, a: i64, b: i64) -> EvalResult<i64> {
        match self {
            IntOp::Add => a.checked_add(b).ok_or_else(|| integer_overflow("addition")),
            IntOp::Sub => a.checked_sub(b).ok_or_else(|| integer_overflow("subtraction")),
            IntOp::Mul => a
                .checked_mul(b)
                .ok_or_else(|| integer_overflow("multiplication")),
            IntOp::Div => {
                if b == 0 {
                    return Err(division_by_zero());
                }
                a.checked_div(b).ok_or_else(|| integer_overflow("division"))
            }
            IntOp::Rem => {
                if b == 0 {
                    return Err(division_by_zero());
                }
                a.checked_rem(b).ok_or_else(|| integer_overflow("remainder"))
            }
            IntOp::Pow => int_pow(a, b),
        }
    }
}

fn int_pow(base: i64, exponent: i64) -> EvalResult<i64> {
    if exponent < 0 {
        return Err(domain_error("^", format!("negative exponent {exponent}")));
    }
    match (base, u32::try_from(exponent)) {
        (_, Ok(e)) => base
            .checked_pow(e)
            .ok_or_else(|| integer_overflow("exponentiation")),
        // Exponent beyond u32: only these bases stay in range.
        (0 | 1, Err(_)) => Ok(base),
        (-1, Err(_)) => Ok(if exponent % 2 == 0 { 1 } else { -1 }),
        (_, Err(_)) => Err(integer_overflow("exponentiation")),
    }
}

/// Binary float operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl FloatOp {
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            FloatOp::Add => a + b,
            FloatOp::Sub => a - b,
            FloatOp::Mul => a * b,
            FloatOp::Div => a / b,
            FloatOp::Pow => a.powf(b),
        }
    }
}

/// Node producing an `int`.
#[derive(Debug)]
pub enum IntNode {
    Literal(i64),
    Read(SlotIndex),
    Neg(Box<IntNode>),
    Binary(IntOp, Box<IntNode>, Box<IntNode>),
    If(Conditional<IntNode>),
    Let(Let<IntNode>),
    Call(Call),
    Index(Index),
}

impl IntNode {
    pub fn literal(value: i64) -> Self {
        IntNode::Literal(value)
    }

    pub fn read(descriptor: &FrameDescriptor, slot: SlotIndex) -> Self {
        descriptor.expect_slot_type(slot, &Type::Int);
        IntNode::Read(slot)
    }

    #[allow(clippy::should_implement_trait, reason = "builds a node")]
    pub fn neg(operand: IntNode) -> Self {
        IntNode::Neg(Box::new(operand))
    }

    pub fn binary(op: IntOp, left: IntNode, right: IntNode) -> Self {
        IntNode::Binary(op, Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait, reason = "builds a node")]
    pub fn add(left: IntNode, right: IntNode) -> Self {
        Self::binary(IntOp::Add, left, right)
    }

    #[allow(clippy::should_implement_trait, reason = "builds a node")]
    pub fn sub(left: IntNode, right: IntNode) -> Self {
        Self::binary(IntOp::Sub, left, right)
    }

    #[allow(clippy::should_implement_trait, reason = "builds a node")]
    pub fn mul(left: IntNode, right: IntNode) -> Self {
        Self::binary(IntOp::Mul, left, right)
    }

    pub fn if_then_else(test: super::BoolNode, then_branch: IntNode, else_branch: IntNode) -> Self {
        IntNode::If(Conditional::new(test, then_branch, else_branch))
    }

    pub fn let_in(bindings: Vec<Binding>, body: IntNode) -> Self {
        IntNode::Let(Let::new(bindings, body))
    }

    pub fn call(call: Call) -> Self {
        assert_same_type(&Type::Int, call.result_type(), "call result");
        IntNode::Call(call)
    }

    pub fn index(index: Index) -> Self {
        assert_same_type(&Type::Int, index.element_type(), "indexed element");
        IntNode::Index(index)
    }
}

impl Evaluate for IntNode {
    type Output = i64;

    fn ty(&self) -> Type {
        Type::Int
    }

    fn eval(&self, frame: &mut Frame) -> EvalResult<i64> {
        match self {
            IntNode::Literal(n) => Ok(*n),
            IntNode::Read(slot) => Ok(frame.read_int(*slot)),
            IntNode::Neg(operand) => operand
                .eval(frame)?
                .checked_neg()
                .ok_or_else(|| integer_overflow("negation")),
            IntNode::Binary(op, left, right) => {
                let a = left.eval(frame)?;
                let b = right.eval(frame)?;
                op.apply(a, b)
            }
            IntNode::If(cond) => cond.eval(frame),
            IntNode::Let(block) => block.eval(frame),
            IntNode::Call(call) => Ok(call.invoke(frame)?.into_int()),
            IntNode::Index(index) => index.get_int(frame),
        }
    }
}

/// Node producing a `float`.
#[derive(Debug)]
pub enum FloatNode {
    Literal(f64),
    Read(SlotIndex),
    Neg(Box<FloatNode>),
    Binary(FloatOp, Box<FloatNode>, Box<FloatNode>),
    If(Conditional<FloatNode>),
    Let(Let<FloatNode>),
    Call(Call),
    Index(Index),
}

impl FloatNode {
    pub fn literal(value: f64) -> Self {
        FloatNode::Literal(value)
    }

    pub fn read(descriptor: &FrameDescriptor, slot: SlotIndex) -> Self {
        descriptor.expect_slot_type(slot, &Type::Float);
        FloatNode::Read(slot)
    }

    #[allow(clippy::should_implement_trait, reason = "builds a node")]
    pub fn neg(operand: FloatNode) -> Self {
        FloatNode::Neg(Box::new(operand))
    }

    pub fn binary(op: FloatOp, left: FloatNode, right: FloatNode) -> Self {
        FloatNode::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn if_then_else(
        test: super::BoolNode,
        then_branch: FloatNode,
        else_branch: FloatNode,
    ) -> Self {
        FloatNode::If(Conditional::new(test, then_branch, else_branch))
    }

    pub fn let_in(bindings: Vec<Binding>, body: FloatNode) -> Self {
        FloatNode::Let(Let::new(bindings, body))
    }

    pub fn call(call: Call) -> Self {
        assert_same_type(&Type::Float, call.result_type(), "call result");
        FloatNode::Call(call)
    }

    pub fn index(index: Index) -> Self {
        assert_same_type(&Type::Float, index.element_type(), "indexed element");
        FloatNode::Index(index)
    }
}

impl Evaluate for FloatNode {
    type Output = f64;

    fn ty(&self) -> Type {
        Type::Float
    }

    fn eval(&self, frame: &mut Frame) -> EvalResult<f64> {
        match self {
            FloatNode::Literal(x) => Ok(*x),
            FloatNode::Read(slot) => Ok(frame.read_float(*slot)),
            FloatNode::Neg(operand) => Ok(-operand.eval(frame)?),
            FloatNode::Binary(op, left, right) => {
                let a = left.eval(frame)?;
                let b = right.eval(frame)?;
                Ok(op.apply(a, b))
            }
            FloatNode::If(cond) => cond.eval(frame),
            FloatNode::Let(block) => block.eval(frame),
            FloatNode::Call(call) => Ok(call.invoke(frame)?.into_float()),
            FloatNode::Index(index) => index.get_float(frame),
        }
    }
}
