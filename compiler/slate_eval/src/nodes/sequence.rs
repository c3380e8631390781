//! Reference-valued nodes: array and range construction, indexing, slicing.

use slate_types::{assert_same_type, defect, SlotCategory, Type};

use super::{Binding, BoolNode, Call, Conditional, Evaluate, FloatNode, IntNode, Let, Node};
use crate::errors::EvalResult;
use crate::frame::{Frame, FrameDescriptor, SlotIndex};
use crate::value::{ArrayBuilder, FloatRange, IntRange, RangeValue, SliceValue, Value};

/// Node producing an array, slice or range.
#[derive(Debug)]
pub enum RefNode {
    Constant(Value),
    Read(SlotIndex, Type),
    If(Conditional<RefNode>),
    Let(Let<RefNode>),
    Call(Call),
    Index(Index),
    Array(ArrayLiteral),
    Range(RangeLiteral),
    Slice(Slice),
}

impl RefNode {
    pub fn constant(value: Value) -> Self {
        if value.representation().is_primitive() || matches!(value, Value::Function(_)) {
            defect(format_args!("{} constant in a reference node", value.kind_name()));
        }
        RefNode::Constant(value)
    }

    pub fn read(descriptor: &FrameDescriptor, slot: SlotIndex) -> Self {
        let ty = descriptor.slot_type(slot).clone();
        if ty.is_function() || ty.slot_category() != SlotCategory::Reference {
            defect(format_args!("reference read of slot declared {ty}"));
        }
        RefNode::Read(slot, ty)
    }

    pub fn if_then_else(test: BoolNode, then_branch: RefNode, else_branch: RefNode) -> Self {
        RefNode::If(Conditional::new(test, then_branch, else_branch))
    }

    pub fn let_in(bindings: Vec<Binding>, body: RefNode) -> Self {
        RefNode::Let(Let::new(bindings, body))
    }

    pub fn call(call: Call) -> Self {
        if call.result_type().element().is_none() {
            defect(format_args!("reference call returning {}", call.result_type()));
        }
        RefNode::Call(call)
    }

    pub fn index(index: Index) -> Self {
        if index.element_type().element().is_none() {
            defect(format_args!(
                "reference index into an array of {}",
                index.element_type()
            ));
        }
        RefNode::Index(index)
    }

    /// `array_of(items...)`.
    pub fn array(element: Type, items: Vec<Node>) -> Self {
        RefNode::Array(ArrayLiteral::new(element, items))
    }

    pub fn range(range: RangeLiteral) -> Self {
        RefNode::Range(range)
    }

    pub fn slice(target: RefNode, slicer: RefNode) -> Self {
        RefNode::Slice(Slice::new(target, slicer))
    }
}

impl Evaluate for RefNode {
    type Output = Value;

    fn ty(&self) -> Type {
        match self {
            RefNode::Constant(v) => v.ty(),
            RefNode::Read(_, ty) => ty.clone(),
            RefNode::If(cond) => cond.ty(),
            RefNode::Let(block) => block.ty(),
            RefNode::Call(call) => call.result_type().clone(),
            RefNode::Index(index) => index.element_type().clone(),
            RefNode::Array(array) => Type::array(array.element.clone()),
            RefNode::Range(range) => range.ty(),
            RefNode::Slice(slice) => slice.target.ty(),
        }
    }

    fn eval(&self, frame: &mut Frame) -> EvalResult<Value> {
        match self {
            RefNode::Constant(v) => Ok(v.clone()),
            RefNode::Read(slot, _) => Ok(frame.read_reference(*slot)),
            RefNode::If(cond) => cond.eval(frame),
            RefNode::Let(block) => block.eval(frame),
            RefNode::Call(call) => call.invoke(frame),
            RefNode::Index(index) => index.get_value(frame),
            RefNode::Array(array) => array.eval(frame),
            RefNode::Range(range) => range.eval(frame),
            RefNode::Slice(slice) => slice.eval(frame),
        }
    }
}

/// Array construction from element expressions.
#[derive(Debug)]
pub struct ArrayLiteral {
    element: Type,
    items: Vec<Node>,
}

impl ArrayLiteral {
    pub fn new(element: Type, items: Vec<Node>) -> Self {
        for item in &items {
            assert_same_type(&element, &item.ty(), "array element");
        }
        ArrayLiteral { element, items }
    }

    fn eval(&self, frame: &mut Frame) -> EvalResult<Value> {
        let mut builder = ArrayBuilder::with_capacity(self.element.clone(), self.items.len());
        for item in &self.items {
            match item {
                Node::Bool(n) => builder.push_bool(n.eval(frame)?),
                Node::Int(n) => builder.push_int(n.eval(frame)?),
                Node::Float(n) => builder.push_float(n.eval(frame)?),
                Node::Function(_) | Node::Reference(_) => builder.push(item.eval_value(frame)?),
            }
        }
        Ok(Value::Array(builder.finish()))
    }
}

/// Range construction `first:last:step`, each part optional.
#[derive(Debug)]
pub enum RangeLiteral {
    Int {
        first: Option<Box<IntNode>>,
        last: Option<Box<IntNode>>,
        step: Option<Box<IntNode>>,
    },
    Float {
        first: Option<Box<FloatNode>>,
        last: Option<Box<FloatNode>>,
        step: Option<Box<FloatNode>>,
    },
}

fn eval_part<N: Evaluate>(part: Option<&N>, frame: &mut Frame) -> EvalResult<Option<N::Output>> {
    part.map(|n| n.eval(frame)).transpose()
}

impl RangeLiteral {
    pub fn int(first: Option<IntNode>, last: Option<IntNode>, step: Option<IntNode>) -> Self {
        RangeLiteral::Int {
            first: first.map(Box::new),
            last: last.map(Box::new),
            step: step.map(Box::new),
        }
    }

    pub fn float(first: Option<FloatNode>, last: Option<FloatNode>, step: Option<FloatNode>) -> Self {
        RangeLiteral::Float {
            first: first.map(Box::new),
            last: last.map(Box::new),
            step: step.map(Box::new),
        }
    }

    fn ty(&self) -> Type {
        match self {
            RangeLiteral::Int { .. } => Type::range(Type::Int),
            RangeLiteral::Float { .. } => Type::range(Type::Float),
        }
    }

    fn eval(&self, frame: &mut Frame) -> EvalResult<Value> {
        let range = match self {
            RangeLiteral::Int { first, last, step } => {
                let first = eval_part(first.as_deref(), frame)?;
                let last = eval_part(last.as_deref(), frame)?;
                let step = eval_part(step.as_deref(), frame)?;
                RangeValue::Int(IntRange::new(first, last, step)?)
            }
            RangeLiteral::Float { first, last, step } => {
                let first = eval_part(first.as_deref(), frame)?;
                let last = eval_part(last.as_deref(), frame)?;
                let step = eval_part(step.as_deref(), frame)?;
                RangeValue::Float(FloatRange::new(first, last, step)?)
            }
        };
        Ok(Value::Range(range))
    }
}

/// One-based element access `sequence[index]`.
#[derive(Debug)]
pub struct Index {
    target: Box<RefNode>,
    index: Box<IntNode>,
    element: Type,
}

impl Index {
    pub fn new(target: RefNode, index: IntNode) -> Self {
        let element = match target.ty() {
            Type::Array(element) => (*element).clone(),
            other => defect(format_args!("index into {other}")),
        };
        Index {
            target: Box::new(target),
            index: Box::new(index),
            element,
        }
    }

    #[inline]
    pub fn element_type(&self) -> &Type {
        &self.element
    }

    fn operands(&self, frame: &mut Frame) -> EvalResult<(SliceValue, i64)> {
        let sequence = self.target.eval(frame)?.into_slice();
        let index = self.index.eval(frame)?;
        Ok((sequence, index))
    }

    pub fn get_value(&self, frame: &mut Frame) -> EvalResult<Value> {
        let (sequence, index) = self.operands(frame)?;
        sequence.get(index)
    }

    pub fn get_bool(&self, frame: &mut Frame) -> EvalResult<bool> {
        let (sequence, index) = self.operands(frame)?;
        sequence.get_bool(index)
    }

    pub fn get_int(&self, frame: &mut Frame) -> EvalResult<i64> {
        let (sequence, index) = self.operands(frame)?;
        sequence.get_int(index)
    }

    pub fn get_float(&self, frame: &mut Frame) -> EvalResult<f64> {
        let (sequence, index) = self.operands(frame)?;
        sequence.get_float(index)
    }
}

/// `sequence[slicer]` with a `range<int>` slicer.
#[derive(Debug)]
pub struct Slice {
    target: Box<RefNode>,
    slicer: Box<RefNode>,
}

impl Slice {
    pub fn new(target: RefNode, slicer: RefNode) -> Self {
        let ty = target.ty();
        if !matches!(ty, Type::Array(_)) {
            defect(format_args!("slice of {ty}"));
        }
        assert_same_type(&Type::range(Type::Int), &slicer.ty(), "slicer");
        Slice {
            target: Box::new(target),
            slicer: Box::new(slicer),
        }
    }

    fn eval(&self, frame: &mut Frame) -> EvalResult<Value> {
        let sequence = self.target.eval(frame)?.into_slice();
        let slicer = self.slicer.eval(frame)?.into_range();
        Ok(Value::Slice(sequence.slice(slicer.expect_int())?))
    }
}
