//! Higher-order sequence builtins.
//!
//! These call back into guest functions through a [`CallSite`], which fixes
//! the callee and its closure once per builtin call. Elements are boxed as
//! they are passed to the callback and unboxed into the result's storage.

use slate_types::Type;

use super::{numeric, primitives, Builtin, BuiltinRegistry};
use crate::call::CallSite;
use crate::errors::{domain_error, empty_reduce, host_failure, EvalResult};
use crate::value::{ArrayBuilder, ArrayValue, Value};

pub(super) fn register(registry: &mut BuiltinRegistry) {
    let mut sequences: Vec<Type> = primitives().into_iter().map(Type::array).collect();
    sequences.extend(numeric().into_iter().map(Type::range));

    for sequence in &sequences {
        let element = sequence.expect_element().clone();

        registry.install(Builtin {
            name: "len",
            ty: Type::function(Type::Int, vec![sequence.clone()]),
            native: len,
        });
        registry.install(Builtin {
            name: "to_array",
            ty: Type::function(Type::array(element.clone()), vec![sequence.clone()]),
            native: to_array,
        });
        registry.install(Builtin {
            name: "filter",
            ty: Type::function(
                Type::array(element.clone()),
                vec![
                    sequence.clone(),
                    Type::function(Type::Bool, vec![element.clone()]),
                ],
            ),
            native: filter,
        });
        registry.install(Builtin {
            name: "reduce",
            ty: Type::function(
                element.clone(),
                vec![
                    sequence.clone(),
                    Type::function(element.clone(), vec![element.clone(), element.clone()]),
                ],
            ),
            native: reduce,
        });

        for result in primitives() {
            registry.install(Builtin {
                name: "map",
                ty: Type::function(
                    Type::array(result.clone()),
                    vec![
                        sequence.clone(),
                        Type::function(result.clone(), vec![element.clone()]),
                    ],
                ),
                native: map,
            });
            registry.install(Builtin {
                name: "fold",
                ty: Type::function(
                    result.clone(),
                    vec![
                        sequence.clone(),
                        result.clone(),
                        Type::function(result.clone(), vec![result.clone(), element.clone()]),
                    ],
                ),
                native: fold,
            });
        }
    }
}

fn len(args: &[Value]) -> EvalResult<Value> {
    let n = match &args[0] {
        Value::Range(r) => r.len()?,
        other => other.clone().into_slice().len(),
    };
    let n = i64::try_from(n)
        .map_err(|_| domain_error("len", format!("length {n} does not fit in int")))?;
    Ok(Value::Int(n))
}

fn to_array(args: &[Value]) -> EvalResult<Value> {
    let array = match &args[0] {
        Value::Array(a) => a.clone(),
        Value::Slice(s) => s.to_array(),
        other => ArrayValue::from_values(other.element_type(), other.elements()?)
            .map_err(|e| host_failure("to_array", &e))?,
    };
    Ok(Value::Array(array))
}

/// `map(sequence, f)`: the result element type is `f`'s result type.
fn map(args: &[Value]) -> EvalResult<Value> {
    let site = CallSite::new(&args[1].clone().into_function());
    let elements = args[0].elements()?;
    let mut out =
        ArrayBuilder::try_with_capacity(site.signature().result().clone(), elements.size_hint().0)
            .map_err(|e| host_failure("map", &e))?;
    for item in elements {
        out.push(site.call1(item)?);
    }
    Ok(Value::Array(out.finish()))
}

/// `filter(sequence, p)`: elements satisfying `p`, in order.
fn filter(args: &[Value]) -> EvalResult<Value> {
    let site = CallSite::new(&args[1].clone().into_function());
    let mut out = ArrayBuilder::new(args[0].element_type());
    for item in args[0].elements()? {
        if site.test(item.clone())? {
            out.push(item);
        }
    }
    Ok(Value::Array(out.finish()))
}

/// `fold(sequence, initial, f)`: left fold `f(f(initial, x1), x2)...`.
fn fold(args: &[Value]) -> EvalResult<Value> {
    let site = CallSite::new(&args[2].clone().into_function());
    let mut acc = args[1].clone();
    for item in args[0].elements()? {
        acc = site.call2(acc, item)?;
    }
    Ok(acc)
}

/// `reduce(sequence, f)`: fold seeded with the first element.
fn reduce(args: &[Value]) -> EvalResult<Value> {
    let site = CallSite::new(&args[1].clone().into_function());
    let mut elements = args[0].elements()?;
    let Some(mut acc) = elements.next() else {
        return Err(empty_reduce("reduce"));
    };
    for item in elements {
        acc = site.call2(acc, item)?;
    }
    Ok(acc)
}
