//! Runtime values.
//!
//! `Value` is the boxed form of every representation. Nodes evaluate
//! primitives unboxed and only box at the call boundary, when storing into
//! collections, and when handing results back to the host.
//!
//! All aggregates are immutable and share their storage through `Rc`; a
//! single evaluation never crosses threads.

mod array;
mod function;
mod range;
mod slice;

use std::fmt;

use slate_types::{defect, Representation, Type};

use crate::errors::EvalResult;

pub use array::{ArrayBuilder, ArrayValue};
pub use function::FunctionValue;
pub use range::{FloatRange, IntRange, RangeIter, RangeValue};
pub use slice::{SliceIter, SliceValue};

/// Runtime value in boxed form.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Callable value (user closure or builtin).
    Function(FunctionValue),
    /// Array with its own backing storage.
    Array(ArrayValue),
    /// View into an array's storage.
    Slice(SliceValue),
    /// Possibly open-ended numeric range.
    Range(RangeValue),
}

impl Value {
    /// The representation this value was produced in.
    pub fn representation(&self) -> Representation {
        match self {
            Value::Bool(_) => Representation::Bool,
            Value::Int(_) => Representation::Int,
            Value::Float(_) => Representation::Float,
            Value::Function(_) => Representation::Function,
            Value::Array(_) | Value::Slice(_) | Value::Range(_) => Representation::Reference,
        }
    }

    /// Runtime type of this value.
    pub fn ty(&self) -> Type {
        match self {
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Function(f) => f.ty().clone(),
            Value::Array(a) => Type::array(a.element_type().clone()),
            Value::Slice(s) => Type::array(s.element_type().clone()),
            Value::Range(r) => Type::range(r.element_type()),
        }
    }

    /// Short name used in defect messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Function(_) => "function",
            Value::Array(_) => "array",
            Value::Slice(_) => "slice",
            Value::Range(_) => "range",
        }
    }

    // Unboxing. A mismatch means a node's declared type lied about what it
    // produces, which the checker rules out.

    #[inline]
    #[track_caller]
    pub fn into_bool(self) -> bool {
        match self {
            Value::Bool(b) => b,
            other => unbox_defect("bool", &other),
        }
    }

    #[inline]
    #[track_caller]
    pub fn into_int(self) -> i64 {
        match self {
            Value::Int(n) => n,
            other => unbox_defect("int", &other),
        }
    }

    #[inline]
    #[track_caller]
    pub fn into_float(self) -> f64 {
        match self {
            Value::Float(x) => x,
            other => unbox_defect("float", &other),
        }
    }

    #[inline]
    #[track_caller]
    pub fn into_function(self) -> FunctionValue {
        match self {
            Value::Function(f) => f,
            other => unbox_defect("function", &other),
        }
    }

    /// View an array or slice as a slice.
    #[track_caller]
    pub fn into_slice(self) -> SliceValue {
        match self {
            Value::Array(a) => SliceValue::whole(a),
            Value::Slice(s) => s,
            other => unbox_defect("array", &other),
        }
    }

    #[track_caller]
    pub fn into_range(self) -> RangeValue {
        match self {
            Value::Range(r) => r,
            other => unbox_defect("range", &other),
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Iterate the elements of an array, slice or closed range.
    ///
    /// Elements are boxed one at a time as they are yielded.
    pub fn elements(&self) -> EvalResult<Elements<'_>> {
        match self {
            Value::Array(a) => Ok(Elements::Slice(a.iter())),
            Value::Slice(s) => Ok(Elements::Slice(s.iter())),
            Value::Range(r) => Ok(Elements::Range(r.iter()?)),
            other => unbox_defect("sequence", other),
        }
    }

    /// Element type of an array, slice or range.
    #[track_caller]
    pub fn element_type(&self) -> Type {
        match self {
            Value::Array(a) => a.element_type().clone(),
            Value::Slice(s) => s.element_type().clone(),
            Value::Range(r) => r.element_type(),
            other => unbox_defect("sequence", other),
        }
    }
}

#[cold]
#[track_caller]
fn unbox_defect(expected: &str, found: &Value) -> ! {
    defect(format_args!(
        "expected a {expected} value, found {}",
        found.kind_name()
    ))
}

/// Iterator over the boxed elements of a sequence value.
pub enum Elements<'a> {
    Slice(SliceIter<'a>),
    Range(RangeIter),
}

impl Iterator for Elements<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            Elements::Slice(it) => it.next(),
            Elements::Range(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Elements::Slice(it) => it.size_hint(),
            Elements::Range(it) => it.size_hint(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<FunctionValue> for Value {
    fn from(f: FunctionValue) -> Self {
        Value::Function(f)
    }
}

impl From<ArrayValue> for Value {
    fn from(a: ArrayValue) -> Self {
        Value::Array(a)
    }
}

impl From<RangeValue> for Value {
    fn from(r: RangeValue) -> Self {
        Value::Range(r)
    }
}

/// Arrays and slices compare equal when their element types and elements
/// match, regardless of whether one is a view. Functions compare by
/// instance.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            #[allow(clippy::float_cmp, reason = "value equality is exact")]
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.same_instance(b),
            (Value::Range(a), Value::Range(b)) => a == b,
            (
                Value::Array(_) | Value::Slice(_),
                Value::Array(_) | Value::Slice(_),
            ) => {
                let (a, b) = (self.clone().into_slice(), other.clone().into_slice());
                a.element_type() == b.element_type()
                    && a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Function(func) => write!(f, "{func}"),
            Value::Array(a) => write_elements(f, a.iter()),
            Value::Slice(s) => write_elements(f, s.iter()),
            Value::Range(r) => write!(f, "{r}"),
        }
    }
}

fn write_elements(f: &mut fmt::Formatter<'_>, items: impl Iterator<Item = Value>) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Function(func) => fmt::Debug::fmt(func, f),
            Value::Array(_) | Value::Slice(_) => {
                write!(f, "{}{self}", self.kind_name())
            }
            _ => fmt::Display::fmt(self, f),
        }
    }
}
