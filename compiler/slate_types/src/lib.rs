//! Type system for the Slate evaluator.
//!
//! Types reach the evaluator already checked: every node, slot and call site
//! carries the type the upstream checker assigned to it. This crate only
//! answers structural questions about those types (equality, result
//! projection, argument compatibility, physical representation).
//!
//! A mismatch discovered here means an earlier phase produced a bad tree, so
//! it is reported through [`defect`] rather than as a recoverable error.

mod representation;

use std::fmt;
use std::rc::Rc;

pub use representation::{Representation, SlotCategory};

/// A guest-language type.
///
/// Primitives compare by variant. Function, array and range types compare
/// structurally on the types they contain.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// Function type `(params -> result)`.
    Function(Rc<FunctionType>),
    /// Homogeneous array `element[]`. Slices share this type.
    Array(Rc<Type>),
    /// Range `range<element>`, possibly open-ended.
    Range(Rc<Type>),
}

/// Signature of a callable value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    result: Type,
    params: Vec<Type>,
}

impl FunctionType {
    pub fn new(result: Type, params: Vec<Type>) -> Self {
        FunctionType { result, params }
    }

    /// The type produced by calling a function of this type.
    #[inline]
    pub fn result(&self) -> &Type {
        &self.result
    }

    #[inline]
    pub fn params(&self) -> &[Type] {
        &self.params
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Check that arguments of the given types may be passed to this function.
    ///
    /// Compatibility is exact: same arity and position-wise equal types.
    pub fn accepts(&self, args: &[Type]) -> bool {
        self.params.len() == args.len() && self.params.iter().zip(args).all(|(p, a)| p == a)
    }
}

impl Type {
    /// Create a function type.
    pub fn function(result: Type, params: Vec<Type>) -> Self {
        Type::Function(Rc::new(FunctionType::new(result, params)))
    }

    /// Create an array type.
    pub fn array(element: Type) -> Self {
        Type::Array(Rc::new(element))
    }

    /// Create a range type.
    pub fn range(element: Type) -> Self {
        Type::Range(Rc::new(element))
    }

    /// The physical representation values of this type are evaluated in.
    pub fn representation(&self) -> Representation {
        match self {
            Type::Bool => Representation::Bool,
            Type::Int => Representation::Int,
            Type::Float => Representation::Float,
            Type::Function(_) => Representation::Function,
            Type::Array(_) | Type::Range(_) => Representation::Reference,
        }
    }

    /// The frame-slot category used to store values of this type.
    pub fn slot_category(&self) -> SlotCategory {
        self.representation().slot_category()
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function(_))
    }

    /// Function signature, if this is a function type.
    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Function signature of a type the caller knows to be a function.
    ///
    /// Calling this on a non-function type is a defect.
    #[track_caller]
    pub fn expect_function(&self) -> &FunctionType {
        match self {
            Type::Function(f) => f,
            other => defect(format_args!("expected a function type, found {other}")),
        }
    }

    /// Element type of an array or range.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(e) | Type::Range(e) => Some(e),
            _ => None,
        }
    }

    /// Element type of a type the caller knows to be a sequence.
    #[track_caller]
    pub fn expect_element(&self) -> &Type {
        match self.element() {
            Some(e) => e,
            None => defect(format_args!("expected an array or range type, found {self}")),
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, "->{})", self.result)
    }
}

impl fmt::Debug for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("bool"),
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::Function(func) => write!(f, "{func}"),
            Type::Array(element) => write!(f, "{element}[]"),
            Type::Range(element) => write!(f, "range<{element}>"),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Report a violated internal invariant and abort the evaluation.
///
/// Defects are never recoverable: they mean the tree handed to the evaluator
/// was not produced by a correct checker/resolver.
#[cold]
#[track_caller]
pub fn defect(message: fmt::Arguments<'_>) -> ! {
    panic!("internal evaluator defect: {message}")
}

/// Assert a type equality that the upstream checker guarantees.
#[inline]
#[track_caller]
pub fn assert_same_type(expected: &Type, actual: &Type, context: &str) {
    if expected != actual {
        defect(format_args!(
            "{context}: expected {expected}, found {actual}"
        ));
    }
}
