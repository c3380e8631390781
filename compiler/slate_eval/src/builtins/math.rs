//! Numeric builtins and array/range constructors.

use slate_types::Type;

use super::{Builtin, BuiltinRegistry};
use crate::errors::{domain_error, host_failure, integer_overflow, EvalResult};
use crate::value::{ArrayValue, IntRange, RangeValue, Value};

pub(super) fn register(registry: &mut BuiltinRegistry) {
    let unary = |result: Type, param: Type| Type::function(result, vec![param]);
    let builtins = [
        Builtin {
            name: "sqrt",
            ty: unary(Type::Float, Type::Float),
            native: sqrt,
        },
        Builtin {
            name: "abs",
            ty: unary(Type::Int, Type::Int),
            native: abs_int,
        },
        Builtin {
            name: "abs",
            ty: unary(Type::Float, Type::Float),
            native: abs_float,
        },
        Builtin {
            name: "sign",
            ty: unary(Type::Int, Type::Int),
            native: sign_int,
        },
        Builtin {
            name: "sign",
            ty: unary(Type::Float, Type::Float),
            native: sign_float,
        },
        Builtin {
            name: "positive",
            ty: unary(Type::Bool, Type::Float),
            native: positive,
        },
        Builtin {
            name: "zeros",
            ty: unary(Type::array(Type::Float), Type::Int),
            native: zeros,
        },
        Builtin {
            name: "range",
            ty: Type::function(Type::range(Type::Int), vec![Type::Int, Type::Int]),
            native: range2,
        },
        Builtin {
            name: "range",
            ty: Type::function(
                Type::range(Type::Int),
                vec![Type::Int, Type::Int, Type::Int],
            ),
            native: range3,
        },
    ];
    for builtin in builtins {
        registry.install(builtin);
    }
}

fn sqrt(args: &[Value]) -> EvalResult<Value> {
    let x = args[0].clone().into_float();
    if x < 0.0 {
        return Err(domain_error("sqrt", format!("negative argument {x:?}")));
    }
    Ok(Value::Float(x.sqrt()))
}

fn abs_int(args: &[Value]) -> EvalResult<Value> {
    let n = args[0].clone().into_int();
    n.checked_abs()
        .map(Value::Int)
        .ok_or_else(|| integer_overflow("abs"))
}

fn abs_float(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Float(args[0].clone().into_float().abs()))
}

fn sign_int(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Int(args[0].clone().into_int().signum()))
}

/// `-1.0`, `0.0` or `1.0`; NaN stays NaN.
fn sign_float(args: &[Value]) -> EvalResult<Value> {
    let x = args[0].clone().into_float();
    Ok(Value::Float(if x == 0.0 || x.is_nan() { x } else { x.signum() }))
}

fn positive(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(args[0].clone().into_float() > 0.0))
}

fn zeros(args: &[Value]) -> EvalResult<Value> {
    let n = args[0].clone().into_int();
    let Ok(len) = usize::try_from(n) else {
        return Err(domain_error("zeros", format!("negative length {n}")));
    };
    let mut items = Vec::new();
    items
        .try_reserve_exact(len)
        .map_err(|e| host_failure("zeros", &e))?;
    items.resize(len, 0.0);
    Ok(Value::Array(ArrayValue::from_floats(items)))
}

fn range2(args: &[Value]) -> EvalResult<Value> {
    let first = args[0].clone().into_int();
    let last = args[1].clone().into_int();
    Ok(Value::Range(RangeValue::Int(IntRange::new(
        Some(first),
        Some(last),
        None,
    )?)))
}

fn range3(args: &[Value]) -> EvalResult<Value> {
    let first = args[0].clone().into_int();
    let last = args[1].clone().into_int();
    let step = args[2].clone().into_int();
    Ok(Value::Range(RangeValue::Int(IntRange::new(
        Some(first),
        Some(last),
        Some(step),
    )?)))
}
