//! Slate Eval - typed-node evaluator for the Slate expression language.
//!
//! Programs arrive as trees of typed nodes built by an upstream checker and
//! resolver, with every variable already assigned a frame slot.
//!
//! # Architecture
//!
//! - `frame`: slot layouts (`FrameDescriptor`) and activations (`Frame`)
//! - `closure`: capture into closures (`Encloser`) and restore on call
//!   (`Discloser`), including recursive self-capture
//! - `nodes`: node families partitioned by representation, so primitives
//!   evaluate unboxed
//! - `call`: the call protocol shared by user functions and builtins
//! - `builtins`: the native builtin registry and standard library
//! - `value`: runtime values, arrays, slices and ranges
//! - `interpreter`: the `Program` execution entry
//!
//! # Errors
//!
//! Conditions a well-typed program can still hit at run time are returned as
//! [`EvalError`]. Violated internal invariants are defects and panic through
//! [`slate_types::defect`].

pub mod builtins;
pub mod call;
pub mod closure;
pub mod errors;
pub mod frame;
pub mod interpreter;
pub mod nodes;
mod stack;
pub mod value;

pub use builtins::{Builtin, BuiltinRegistry};
pub use call::{ArgVec, Arguments, CallSite, CallTarget, NativeFn, UserFunction};
pub use closure::{capture_recursive, Closure, Discloser, Encloser, SlotBinding};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use frame::{Frame, FrameDescriptor, SlotIndex};
pub use interpreter::{init_tracing, Program};
pub use nodes::{Evaluate, Node};
pub use stack::ensure_sufficient_stack;
pub use value::{ArrayValue, FunctionValue, RangeValue, SliceValue, Value};

#[cfg(test)]
mod tests;
