#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::errors::{EvalErrorKind, EvalResult};
use crate::value::{ArrayValue, FloatRange, IntRange, RangeValue, Value};
use pretty_assertions::assert_eq;
use smallvec::smallvec;

fn ints(items: &[i64]) -> Value {
    Value::Array(ArrayValue::from_ints(items.to_vec()))
}

fn floats(items: &[f64]) -> Value {
    Value::Array(ArrayValue::from_floats(items.to_vec()))
}

fn int_range(first: i64, last: i64) -> Value {
    Value::Range(RangeValue::Int(IntRange::closed(first, last)))
}

fn int_binary() -> Type {
    Type::function(Type::Int, vec![Type::Int, Type::Int])
}

fn add(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Int(args[0].clone().into_int() + args[1].clone().into_int()))
}

fn is_even(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(args[0].clone().into_int() % 2 == 0))
}

/// Look up the overload of `name` accepting `args` and call it.
fn call(registry: &BuiltinRegistry, name: &str, args: Vec<Value>) -> EvalResult<Value> {
    let types: Vec<Type> = args.iter().map(Value::ty).collect();
    let function = registry
        .resolve(name, &types)
        .unwrap_or_else(|| panic!("no overload of {name} for {types:?}"));
    function.call(args.into_iter().collect())
}

fn registry_with_helpers() -> (BuiltinRegistry, Value, Value) {
    let mut registry = BuiltinRegistry::standard();
    let add = registry.register("add", int_binary(), add);
    let even = registry.register(
        "is_even",
        Type::function(Type::Bool, vec![Type::Int]),
        is_even,
    );
    (registry, Value::Function(add), Value::Function(even))
}

// Registry

#[test]
fn overloads_are_looked_up_by_type() {
    let registry = BuiltinRegistry::standard();
    assert!(registry.overloads("map").len() > 1);
    assert!(registry.get("map").is_none());
    assert!(registry.get("sqrt").is_some());
    assert!(registry.overloads("missing").is_empty());

    let abs_int = Type::function(Type::Int, vec![Type::Int]);
    let found = registry.lookup("abs", &abs_int).unwrap();
    assert_eq!(found.ty(), &abs_int);
    assert_eq!(found.name(), Some("abs"));
    assert!(!found.has_closure());
}

#[test]
fn registering_same_type_replaces() {
    let mut registry = BuiltinRegistry::new();
    assert!(registry.is_empty());
    let first = registry.register("add", int_binary(), add);
    let second = registry.register("add", int_binary(), add);
    assert_eq!(registry.len(), 1);
    assert!(registry.get("add").unwrap().same_instance(&second));
    assert!(!first.same_instance(&second));
    assert_eq!(registry.names().collect::<Vec<_>>(), ["add"]);
}

#[test]
fn builtin_declarations_install() {
    let mut registry = BuiltinRegistry::new();
    let value = registry.install(Builtin {
        name: "add",
        ty: int_binary(),
        native: add,
    });
    assert_eq!(
        value.call(smallvec![Value::Int(2), Value::Int(3)]).unwrap(),
        Value::Int(5)
    );
}

// Math

#[test]
fn math_builtins() {
    let registry = BuiltinRegistry::standard();
    assert_eq!(
        call(&registry, "sqrt", vec![Value::Float(9.0)]).unwrap(),
        Value::Float(3.0)
    );
    assert_eq!(
        call(&registry, "abs", vec![Value::Int(-4)]).unwrap(),
        Value::Int(4)
    );
    assert_eq!(
        call(&registry, "abs", vec![Value::Float(-0.5)]).unwrap(),
        Value::Float(0.5)
    );
    assert_eq!(
        call(&registry, "sign", vec![Value::Float(-3.0)]).unwrap(),
        Value::Float(-1.0)
    );
    assert_eq!(
        call(&registry, "sign", vec![Value::Float(0.0)]).unwrap(),
        Value::Float(0.0)
    );
    assert_eq!(
        call(&registry, "sign", vec![Value::Int(7)]).unwrap(),
        Value::Int(1)
    );
    assert_eq!(
        call(&registry, "positive", vec![Value::Float(0.0)]).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn math_domain_errors() {
    let registry = BuiltinRegistry::standard();
    let err = call(&registry, "sqrt", vec![Value::Float(-1.0)]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::DomainError { .. }));
    assert_eq!(err.backtrace()[0].name, "sqrt");

    assert_eq!(
        call(&registry, "abs", vec![Value::Int(i64::MIN)]).unwrap_err(),
        EvalErrorKind::IntegerOverflow { operation: "abs" }
    );
}

#[test]
fn zeros_builds_float_arrays() {
    let registry = BuiltinRegistry::standard();
    assert_eq!(
        call(&registry, "zeros", vec![Value::Int(3)]).unwrap(),
        floats(&[0.0, 0.0, 0.0])
    );
    assert_eq!(
        call(&registry, "zeros", vec![Value::Int(0)]).unwrap(),
        floats(&[])
    );
    assert!(matches!(
        call(&registry, "zeros", vec![Value::Int(-1)]).unwrap_err().kind,
        EvalErrorKind::DomainError { .. }
    ));
}

#[test]
fn range_builtin() {
    let registry = BuiltinRegistry::standard();
    let range = call(
        &registry,
        "range",
        vec![Value::Int(1), Value::Int(9), Value::Int(4)],
    )
    .unwrap();
    assert_eq!(range.to_string(), "1:9:4");
    assert_eq!(
        call(&registry, "to_array", vec![range]).unwrap(),
        ints(&[1, 5, 9])
    );
    assert_eq!(
        call(
            &registry,
            "range",
            vec![Value::Int(1), Value::Int(2), Value::Int(0)]
        )
        .unwrap_err(),
        EvalErrorKind::ZeroStep
    );
}

// Sequences

#[test]
fn len_of_arrays_slices_and_ranges() {
    let registry = BuiltinRegistry::standard();
    assert_eq!(
        call(&registry, "len", vec![ints(&[1, 2, 3])]).unwrap(),
        Value::Int(3)
    );
    let tail = ints(&[1, 2, 3])
        .into_slice()
        .slice(&IntRange::new(Some(2), None, None).unwrap())
        .unwrap();
    assert_eq!(
        call(&registry, "len", vec![Value::Slice(tail)]).unwrap(),
        Value::Int(2)
    );
    assert_eq!(
        call(&registry, "len", vec![int_range(10, 1)]).unwrap(),
        Value::Int(10)
    );
}

#[test]
fn map_uses_callback_result_type() {
    let registry = BuiltinRegistry::standard();
    let sign = registry
        .lookup("sign", &Type::function(Type::Float, vec![Type::Float]))
        .unwrap()
        .clone();
    let mapped = call(
        &registry,
        "map",
        vec![floats(&[-2.0, 0.0, 5.0]), Value::Function(sign)],
    )
    .unwrap();
    assert_eq!(mapped, floats(&[-1.0, 0.0, 1.0]));

    let (registry, _, even) = registry_with_helpers();
    let mapped = call(&registry, "map", vec![int_range(1, 3), even]).unwrap();
    assert_eq!(mapped.ty(), Type::array(Type::Bool));
    assert_eq!(mapped.to_string(), "[false, true, false]");
}

#[test]
fn filter_keeps_order() {
    let (registry, _, even) = registry_with_helpers();
    assert_eq!(
        call(&registry, "filter", vec![ints(&[6, 1, 4, 3, 2]), even.clone()]).unwrap(),
        ints(&[6, 4, 2])
    );
    assert_eq!(
        call(&registry, "filter", vec![ints(&[1, 3]), even]).unwrap(),
        Value::Array(ArrayValue::empty(Type::Int))
    );
}

#[test]
fn fold_and_reduce() {
    let (registry, add, _) = registry_with_helpers();
    assert_eq!(
        call(
            &registry,
            "fold",
            vec![ints(&[1, 2, 3, 4]), Value::Int(0), add.clone()]
        )
        .unwrap(),
        Value::Int(10)
    );
    assert_eq!(
        call(&registry, "reduce", vec![int_range(1, 100), add.clone()]).unwrap(),
        Value::Int(5050)
    );
    let err = call(&registry, "reduce", vec![ints(&[]), add]).unwrap_err();
    assert_eq!(
        err,
        EvalErrorKind::EmptyReduce {
            function: "reduce".to_string()
        }
    );
}

#[test]
fn open_range_sequences_fail() {
    let (registry, add, _) = registry_with_helpers();
    let open = Value::Range(RangeValue::Int(IntRange::new(Some(1), None, None).unwrap()));
    let err = call(&registry, "fold", vec![open, Value::Int(0), add]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::OpenRange { .. }));
}

// Huge and degenerate ranges

fn float_range(first: f64, last: f64, step: f64) -> Value {
    Value::Range(RangeValue::Float(
        FloatRange::new(Some(first), Some(last), Some(step)).unwrap(),
    ))
}

fn abs(registry: &BuiltinRegistry, ty: Type) -> Value {
    Value::Function(registry.resolve("abs", &[ty]).unwrap().clone())
}

#[test]
fn len_at_the_int_limits() {
    let registry = BuiltinRegistry::standard();
    assert_eq!(
        call(&registry, "len", vec![int_range(1, i64::MAX)]).unwrap(),
        Value::Int(i64::MAX)
    );
    assert_eq!(
        call(&registry, "len", vec![int_range(5, 4)]).unwrap(),
        Value::Int(2)
    );

    // 2^63 elements: counted, but not representable as an int.
    let err = call(&registry, "len", vec![int_range(i64::MIN, -1)]).unwrap_err();
    assert!(matches!(&err.kind, EvalErrorKind::DomainError { function, .. } if function == "len"));

    let err = call(&registry, "len", vec![int_range(i64::MIN, i64::MAX)]).unwrap_err();
    assert!(matches!(&err.kind, EvalErrorKind::DomainError { function, .. } if function == "range"));
}

#[test]
fn materialising_huge_ranges_fails_without_allocating() {
    let registry = BuiltinRegistry::standard();
    let huge = int_range(1, i64::MAX);

    let err = call(&registry, "map", vec![huge.clone(), abs(&registry, Type::Int)]).unwrap_err();
    assert!(err.is_host_failure());
    assert!(matches!(&err.kind, EvalErrorKind::HostFailure { builtin, .. } if builtin == "map"));
    assert_eq!(err.backtrace()[0].name, "map");

    let err = call(&registry, "to_array", vec![huge]).unwrap_err();
    assert!(err.is_host_failure());
    assert!(
        matches!(&err.kind, EvalErrorKind::HostFailure { builtin, .. } if builtin == "to_array")
    );
}

#[test]
fn uncountable_float_ranges_are_domain_errors() {
    let mut registry = BuiltinRegistry::standard();
    let count = registry.register(
        "count",
        Type::function(Type::Int, vec![Type::Int, Type::Float]),
        |args| Ok(Value::Int(args[0].clone().into_int() + 1)),
    );
    let wide = || float_range(0.0, 1e300, 1.0);

    for err in [
        call(&registry, "len", vec![wide()]).unwrap_err(),
        call(&registry, "to_array", vec![wide()]).unwrap_err(),
        call(&registry, "map", vec![wide(), abs(&registry, Type::Float)]).unwrap_err(),
        call(&registry, "fold", vec![wide(), Value::Int(0), Value::Function(count)])
            .unwrap_err(),
    ] {
        assert!(matches!(err.kind, EvalErrorKind::DomainError { .. }), "{err}");
        assert!(!err.is_host_failure());
    }
}

#[test]
fn degenerate_ranges_through_builtins() {
    let (registry, add, _) = registry_with_helpers();

    // Descending bounds with an explicit positive step are empty.
    let empty = Value::Range(RangeValue::Int(IntRange::new(Some(5), Some(1), Some(1)).unwrap()));
    assert_eq!(call(&registry, "len", vec![empty.clone()]).unwrap(), Value::Int(0));
    assert_eq!(
        call(&registry, "fold", vec![empty.clone(), Value::Int(7), add]).unwrap(),
        Value::Int(7)
    );
    assert_eq!(
        call(&registry, "map", vec![empty.clone(), abs(&registry, Type::Int)]).unwrap(),
        ints(&[])
    );
    assert_eq!(call(&registry, "to_array", vec![empty]).unwrap(), ints(&[]));

    let single = float_range(2.5, 2.5, 1.0);
    assert_eq!(call(&registry, "len", vec![single.clone()]).unwrap(), Value::Int(1));
    assert_eq!(call(&registry, "to_array", vec![single]).unwrap(), floats(&[2.5]));

    // Extreme bounds with a step that keeps the count small.
    let sparse = Value::Range(RangeValue::Int(
        IntRange::new(Some(i64::MIN), Some(i64::MAX), Some(i64::MAX)).unwrap(),
    ));
    assert_eq!(
        call(&registry, "to_array", vec![sparse]).unwrap(),
        ints(&[i64::MIN, -1, i64::MAX - 1])
    );
}
