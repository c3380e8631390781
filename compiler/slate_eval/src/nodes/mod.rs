//! Typed evaluation tree.
//!
//! Nodes are partitioned by the representation they produce. Each family
//! evaluates to its natural Rust type, so a parent asking an `int` child for
//! a value gets an `i64` directly and nothing is boxed on the way:
//!
//! | family          | output          |
//! |-----------------|-----------------|
//! | [`BoolNode`]    | `bool`          |
//! | [`IntNode`]     | `i64`           |
//! | [`FloatNode`]   | `f64`           |
//! | [`FunctionNode`]| [`FunctionValue`] |
//! | [`RefNode`]     | [`Value`] (arrays, slices, ranges) |
//!
//! [`Node`] unifies the families where any type may appear (bindings, call
//! arguments, function bodies). Constructors check operand types against
//! the frame layout; a mismatch is a defect.
//!
//! [`FunctionValue`]: crate::value::FunctionValue

mod arith;
mod control;
mod function;
mod logic;
mod sequence;

use slate_types::{Representation, Type};

use crate::errors::EvalResult;
use crate::frame::Frame;
use crate::value::Value;

pub use arith::{FloatNode, FloatOp, IntNode, IntOp};
pub use control::{Binding, Conditional, Let};
pub use function::{Call, FunctionDefinition, FunctionNode};
pub use logic::{BoolNode, CompareOp, LogicOp};
pub use sequence::{ArrayLiteral, Index, RangeLiteral, RefNode, Slice};

/// Evaluation of one node family.
pub trait Evaluate {
    /// Unboxed result of evaluation.
    type Output;

    /// Declared type, fixed at construction.
    fn ty(&self) -> Type;

    fn eval(&self, frame: &mut Frame) -> EvalResult<Self::Output>;
}

/// A node of any family.
#[derive(Debug)]
pub enum Node {
    Bool(BoolNode),
    Int(IntNode),
    Float(FloatNode),
    Function(FunctionNode),
    Reference(RefNode),
}

impl Node {
    pub fn ty(&self) -> Type {
        match self {
            Node::Bool(_) => Type::Bool,
            Node::Int(_) => Type::Int,
            Node::Float(_) => Type::Float,
            Node::Function(n) => n.ty(),
            Node::Reference(n) => n.ty(),
        }
    }

    #[inline]
    pub fn representation(&self) -> Representation {
        match self {
            Node::Bool(_) => Representation::Bool,
            Node::Int(_) => Representation::Int,
            Node::Float(_) => Representation::Float,
            Node::Function(_) => Representation::Function,
            Node::Reference(_) => Representation::Reference,
        }
    }

    /// Evaluate and box the result.
    pub fn eval_value(&self, frame: &mut Frame) -> EvalResult<Value> {
        Ok(match self {
            Node::Bool(n) => Value::Bool(n.eval(frame)?),
            Node::Int(n) => Value::Int(n.eval(frame)?),
            Node::Float(n) => Value::Float(n.eval(frame)?),
            Node::Function(n) => Value::Function(n.eval(frame)?),
            Node::Reference(n) => n.eval(frame)?,
        })
    }
}

impl From<BoolNode> for Node {
    fn from(n: BoolNode) -> Self {
        Node::Bool(n)
    }
}

impl From<IntNode> for Node {
    fn from(n: IntNode) -> Self {
        Node::Int(n)
    }
}

impl From<FloatNode> for Node {
    fn from(n: FloatNode) -> Self {
        Node::Float(n)
    }
}

impl From<FunctionNode> for Node {
    fn from(n: FunctionNode) -> Self {
        Node::Function(n)
    }
}

impl From<RefNode> for Node {
    fn from(n: RefNode) -> Self {
        Node::Reference(n)
    }
}

#[cfg(test)]
mod tests;
