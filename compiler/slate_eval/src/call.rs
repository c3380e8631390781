//! Function-call protocol.
//!
//! A [`CallTarget`] is the compiled, shared code of a function: either a user
//! body with its frame layout, or a native builtin. Every call passes the
//! callee's closure explicitly alongside the positional arguments
//! ([`Arguments`]); a user target discloses it into a fresh frame, binds its
//! parameters and evaluates its body.

use std::rc::Rc;

use smallvec::{smallvec, SmallVec};
use slate_types::{assert_same_type, defect, FunctionType, Type};

use crate::closure::{Closure, Discloser, SlotBinding};
use crate::errors::EvalResult;
use crate::frame::{Frame, FrameDescriptor, SlotIndex};
use crate::nodes::Node;
use crate::stack::ensure_sufficient_stack;
use crate::value::{FunctionValue, Value};

/// Positional argument storage. Most calls take few arguments.
pub type ArgVec = SmallVec<[Value; 4]>;

/// Native builtin implementation.
///
/// Arguments arrive boxed and already checked against the declared type.
pub type NativeFn = fn(&[Value]) -> EvalResult<Value>;

/// Everything passed to a call target.
#[derive(Debug)]
pub struct Arguments {
    /// The callee's closure, if it has one.
    pub closure: Option<Rc<Closure>>,
    pub values: ArgVec,
}

/// Description of a user-defined function, consumed by [`CallTarget::user`].
pub struct UserFunction {
    pub name: Option<String>,
    /// Declared function type.
    pub ty: Type,
    /// Layout of each call frame.
    pub frame: Rc<FrameDescriptor>,
    /// Call-frame slots receiving the positional arguments.
    pub params: Vec<SlotIndex>,
    /// Layout of the closures this function captures into.
    pub closure: Rc<FrameDescriptor>,
    /// Closure slot to call-frame slot copies performed on entry.
    pub disclosure: Vec<SlotBinding>,
    pub body: Node,
}

struct UserBody {
    frame: Rc<FrameDescriptor>,
    params: Vec<SlotIndex>,
    closure: Rc<FrameDescriptor>,
    discloser: Discloser,
    body: Node,
}

enum TargetKind {
    User(UserBody),
    Native(NativeFn),
}

/// Shared code of a function.
pub struct CallTarget {
    name: Option<Rc<str>>,
    ty: Type,
    kind: TargetKind,
}

impl CallTarget {
    /// Compile a user function, checking its layout against its type.
    pub fn user(function: UserFunction) -> Rc<CallTarget> {
        let UserFunction {
            name,
            ty,
            frame,
            params,
            closure,
            disclosure,
            body,
        } = function;
        let signature = ty.expect_function();
        if signature.arity() != params.len() {
            defect(format_args!(
                "{ty} declared with {} parameter slots",
                params.len()
            ));
        }
        for (slot, param) in params.iter().zip(signature.params()) {
            frame.expect_slot_type(*slot, param);
        }
        assert_same_type(signature.result(), &body.ty(), "function body");
        let discloser = Discloser::new(&closure, &frame, disclosure);
        Rc::new(CallTarget {
            name: name.map(Rc::from),
            ty,
            kind: TargetKind::User(UserBody {
                frame,
                params,
                closure,
                discloser,
                body,
            }),
        })
    }

    /// Wrap a native builtin.
    pub fn native(name: &str, ty: Type, native: NativeFn) -> Rc<CallTarget> {
        ty.expect_function();
        Rc::new(CallTarget {
            name: Some(Rc::from(name)),
            ty,
            kind: TargetKind::Native(native),
        })
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn display_name(&self) -> &str {
        self.name().unwrap_or("<anonymous>")
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn signature(&self) -> &FunctionType {
        self.ty.expect_function()
    }

    /// Closure layout of a user function. Builtins have none.
    pub fn closure_descriptor(&self) -> Option<&Rc<FrameDescriptor>> {
        match &self.kind {
            TargetKind::User(body) => Some(&body.closure),
            TargetKind::Native(_) => None,
        }
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        matches!(self.kind, TargetKind::Native(_))
    }

    /// Run the target. Errors leaving the call record it in their backtrace.
    pub fn invoke(&self, args: Arguments) -> EvalResult<Value> {
        ensure_sufficient_stack(|| {
            let name = self.display_name();
            let _span = tracing::trace_span!("call", function = name).entered();
            let result = match &self.kind {
                TargetKind::User(body) => body.run(args),
                TargetKind::Native(native) => {
                    if args.closure.is_some() {
                        defect(format_args!("closure passed to builtin {name}"));
                    }
                    native(&args.values)
                }
            };
            result.map_err(|e| e.with_frame(name))
        })
    }
}

impl UserBody {
    fn run(&self, args: Arguments) -> EvalResult<Value> {
        let mut frame = Frame::allocate(&self.frame);
        self.discloser.disclose(args.closure.as_ref(), &mut frame);
        if args.values.len() != self.params.len() {
            defect(format_args!(
                "{} arguments passed to a function of {} parameters",
                args.values.len(),
                self.params.len()
            ));
        }
        for (slot, value) in self.params.iter().zip(args.values) {
            frame.write_value(*slot, value);
        }
        self.body.eval_value(&mut frame)
    }
}

impl std::fmt::Debug for CallTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallTarget")
            .field("name", &self.display_name())
            .field("ty", &self.ty)
            .field("native", &self.is_native())
            .finish_non_exhaustive()
    }
}

/// A call site with a fixed callee, used by natives that call back into
/// guest functions many times.
pub struct CallSite {
    target: Rc<CallTarget>,
    closure: Option<Rc<Closure>>,
}

impl CallSite {
    pub fn new(function: &FunctionValue) -> Self {
        CallSite {
            target: Rc::clone(function.target()),
            closure: function.closure(),
        }
    }

    #[inline]
    pub fn signature(&self) -> &FunctionType {
        self.target.signature()
    }

    pub fn call(&self, values: ArgVec) -> EvalResult<Value> {
        self.target.invoke(Arguments {
            closure: self.closure.clone(),
            values,
        })
    }

    #[inline]
    pub fn call1(&self, a: Value) -> EvalResult<Value> {
        self.call(smallvec![a])
    }

    #[inline]
    pub fn call2(&self, a: Value, b: Value) -> EvalResult<Value> {
        self.call(smallvec![a, b])
    }

    /// Call a predicate.
    #[inline]
    pub fn test(&self, a: Value) -> EvalResult<bool> {
        Ok(self.call1(a)?.into_bool())
    }
}
