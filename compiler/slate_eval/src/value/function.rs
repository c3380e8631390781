//! Function values.
//!
//! A function value pairs shared call-target code with the closure captured
//! when its definition was evaluated. Two instantiations of the same
//! definition share the target but never the closure.

use std::fmt;
use std::rc::Rc;

use slate_types::{defect, FunctionType, Type};

use super::Value;
use crate::call::{ArgVec, Arguments, CallTarget};
use crate::closure::{Closure, ClosureRef};
use crate::errors::EvalResult;

/// A callable value: user closure or builtin.
#[derive(Clone)]
pub struct FunctionValue {
    target: Rc<CallTarget>,
    closure: Option<ClosureRef>,
}

impl FunctionValue {
    pub fn new(target: Rc<CallTarget>, closure: Option<Rc<Closure>>) -> Self {
        FunctionValue {
            target,
            closure: closure.map(ClosureRef::Shared),
        }
    }

    /// A builtin or other closure-less function.
    pub fn plain(target: Rc<CallTarget>) -> Self {
        FunctionValue {
            target,
            closure: None,
        }
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        self.target.ty()
    }

    #[inline]
    pub fn signature(&self) -> &FunctionType {
        self.target.signature()
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.target.name()
    }

    #[inline]
    pub fn target(&self) -> &Rc<CallTarget> {
        &self.target
    }

    /// The captured closure, if any.
    ///
    /// A self-reference stored inside its own closure is only ever read back
    /// through disclosure, which replaces it with a strong reference, so a
    /// dangling one is a defect.
    pub fn closure(&self) -> Option<Rc<Closure>> {
        match &self.closure {
            None => None,
            Some(ClosureRef::Shared(c)) => Some(Rc::clone(c)),
            Some(ClosureRef::SelfReference(weak)) => match weak.upgrade() {
                Some(c) => Some(c),
                None => defect(format_args!(
                    "self-reference of {} outlived its closure",
                    self.display_name()
                )),
            },
        }
    }

    #[inline]
    pub fn has_closure(&self) -> bool {
        self.closure.is_some()
    }

    /// Same value with a different closure.
    #[must_use]
    pub fn with_closure(&self, closure: Rc<Closure>) -> Self {
        FunctionValue::new(Rc::clone(&self.target), Some(closure))
    }

    /// Weak form of this value, for storing inside its own closure.
    #[must_use]
    pub(crate) fn self_reference(&self) -> Self {
        let closure = match &self.closure {
            Some(ClosureRef::Shared(c)) => Some(ClosureRef::SelfReference(Rc::downgrade(c))),
            other => other.clone(),
        };
        FunctionValue {
            target: Rc::clone(&self.target),
            closure,
        }
    }

    #[inline]
    pub(crate) fn is_self_reference(&self) -> bool {
        matches!(self.closure, Some(ClosureRef::SelfReference(_)))
    }

    /// Check whether two values come from the same instantiation.
    pub fn same_instance(&self, other: &FunctionValue) -> bool {
        Rc::ptr_eq(&self.target, &other.target)
            && match (&self.closure, &other.closure) {
                (None, None) => true,
                (Some(a), Some(b)) => a.as_ptr() == b.as_ptr(),
                _ => false,
            }
    }

    /// Call with positional arguments.
    pub fn call(&self, values: ArgVec) -> EvalResult<Value> {
        self.target.invoke(Arguments {
            closure: self.closure(),
            values,
        })
    }

    fn display_name(&self) -> &str {
        self.name().unwrap_or("<anonymous>")
    }
}

impl fmt::Display for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {} {}>", self.display_name(), self.ty())
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("name", &self.display_name())
            .field("ty", self.ty())
            .field("closure", &self.closure.is_some())
            .finish()
    }
}
