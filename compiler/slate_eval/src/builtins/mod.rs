//! Native builtins.
//!
//! Each builtin is instantiated once into a closure-less [`FunctionValue`] at
//! registration. Names may be overloaded across element types, so lookup is
//! either by name alone (all overloads) or by name and exact type.
//!
//! # Standard library
//!
//! [`BuiltinRegistry::standard`] installs:
//! - math: `sqrt`, `abs`, `sign`, `positive`
//! - construction: `zeros`, `range`, `to_array`
//! - sequences: `len`, `map`, `filter`, `fold`, `reduce`
//!
//! The sequence functions accept arrays (and slices) of `bool`, `int` and
//! `float`, and closed `int`/`float` ranges.

mod math;
mod sequence;

use std::rc::Rc;

use rustc_hash::FxHashMap;
use slate_types::Type;

use crate::call::{CallTarget, NativeFn};
use crate::value::FunctionValue;

/// A builtin declaration: name, declared function type, implementation.
#[derive(Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub ty: Type,
    pub native: NativeFn,
}

/// Builtins by name.
#[derive(Default)]
pub struct BuiltinRegistry {
    functions: FxHashMap<Rc<str>, Vec<FunctionValue>>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the standard library.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        math::register(&mut registry);
        sequence::register(&mut registry);
        registry
    }

    /// Register a native under `name` with the declared function type.
    ///
    /// Registering the same name and type twice replaces the earlier entry.
    pub fn register(&mut self, name: &str, ty: Type, native: NativeFn) -> FunctionValue {
        tracing::debug!(builtin = name, ty = %ty, "register builtin");
        let value = FunctionValue::plain(CallTarget::native(name, ty, native));
        let overloads = self.functions.entry(Rc::from(name)).or_default();
        overloads.retain(|f| f.ty() != value.ty());
        overloads.push(value.clone());
        value
    }

    pub fn install(&mut self, builtin: Builtin) -> FunctionValue {
        self.register(builtin.name, builtin.ty, builtin.native)
    }

    /// All overloads of `name`, in registration order.
    pub fn overloads(&self, name: &str) -> &[FunctionValue] {
        self.functions.get(name).map_or(&[][..], Vec::as_slice)
    }

    /// The single builtin named `name`, if it is not overloaded.
    pub fn get(&self, name: &str) -> Option<&FunctionValue> {
        match self.overloads(name) {
            [only] => Some(only),
            _ => None,
        }
    }

    /// The overload of `name` with exactly type `ty`.
    pub fn lookup(&self, name: &str, ty: &Type) -> Option<&FunctionValue> {
        self.overloads(name).iter().find(|f| f.ty() == ty)
    }

    /// The overload of `name` accepting arguments of the given types.
    pub fn resolve(&self, name: &str, args: &[Type]) -> Option<&FunctionValue> {
        self.overloads(name)
            .iter()
            .find(|f| f.signature().accepts(args))
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(|k| &**k)
    }

    pub fn len(&self) -> usize {
        self.functions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Element types the sequence builtins are instantiated for.
fn primitives() -> [Type; 3] {
    [Type::Bool, Type::Int, Type::Float]
}

/// Element types of ranges.
fn numeric() -> [Type; 2] {
    [Type::Int, Type::Float]
}

#[cfg(test)]
mod tests;
