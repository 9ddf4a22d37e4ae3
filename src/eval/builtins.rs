//! Built-in functions for the Rilla runtime.
//!
//! Builtins are looked up by name after a miss in the environment chain,
//! so user bindings shadow them. They report failures as first-class
//! error values, exactly like every other runtime operation.

use std::rc::Rc;

use crate::eval::value::Value;

/// Resolves a builtin by name.
pub fn lookup(name: &str) -> Option<Value> {
    match name {
        "len" => Some(Value::Builtin("len")),
        "first" => Some(Value::Builtin("first")),
        "last" => Some(Value::Builtin("last")),
        "rest" => Some(Value::Builtin("rest")),
        "push" => Some(Value::Builtin("push")),
        "print" => Some(Value::Builtin("print")),
        _ => None,
    }
}

/// Invokes a builtin by name with already-evaluated arguments.
pub fn call(name: &str, args: &[Value]) -> Value {
    match name {
        "len" => builtin_len(args),
        "first" => builtin_first(args),
        "last" => builtin_last(args),
        "rest" => builtin_rest(args),
        "push" => builtin_push(args),
        "print" => builtin_print(args),
        _ => Value::Error(format!("unknown builtin: {name}")),
    }
}

fn wrong_arity(got: usize, want: usize) -> Value {
    Value::Error(format!(
        "wrong number of arguments. got={got}, want={want}"
    ))
}

/// `len(x)` - byte length of a string, or element count of an array.
fn builtin_len(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elements) => Value::Integer(elements.len() as i64),
        Value::String(s) => Value::Integer(s.len() as i64),
        other => Value::Error(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        )),
    }
}

/// `first(arr)` - the first element, or null when the array is empty.
fn builtin_first(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elements) => elements.first().cloned().unwrap_or(Value::Null),
        other => Value::Error(format!(
            "argument to `first` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

/// `last(arr)` - the last element, or null when the array is empty.
fn builtin_last(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elements) => elements.last().cloned().unwrap_or(Value::Null),
        other => Value::Error(format!(
            "argument to `last` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

/// `rest(arr)` - a new array without the first element, or null when
/// the array is empty. The input array is not mutated.
fn builtin_rest(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elements) => {
            if elements.is_empty() {
                return Value::Null;
            }
            Value::Array(Rc::new(elements[1..].to_vec()))
        }
        other => Value::Error(format!(
            "argument to `rest` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

/// `push(arr, x)` - a new array with `x` appended. The input array is
/// not mutated.
fn builtin_push(args: &[Value]) -> Value {
    if args.len() != 2 {
        return wrong_arity(args.len(), 2);
    }
    match &args[0] {
        Value::Array(elements) => {
            let mut new_elements = elements.as_ref().clone();
            new_elements.push(args[1].clone());
            Value::Array(Rc::new(new_elements))
        }
        other => Value::Error(format!(
            "argument to `push` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

/// `print(...)` - writes each argument's inspection form to stdout,
/// one per line. Returns null.
fn builtin_print(args: &[Value]) -> Value {
    for arg in args {
        println!("{arg}");
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(values: Vec<Value>) -> Value {
        Value::Array(Rc::new(values))
    }

    #[test]
    fn test_len() {
        assert_eq!(
            builtin_len(&[array(vec![Value::Integer(1), Value::Integer(2)])]),
            Value::Integer(2)
        );
        assert_eq!(
            builtin_len(&[Value::String("hello".into())]),
            Value::Integer(5)
        );
        assert_eq!(
            builtin_len(&[Value::Integer(1)]),
            Value::Error("argument to `len` not supported, got INTEGER".to_string())
        );
        assert_eq!(
            builtin_len(&[Value::Null, Value::Null]),
            Value::Error("wrong number of arguments. got=2, want=1".to_string())
        );
    }

    #[test]
    fn test_first_last_rest_on_empty_array() {
        assert_eq!(builtin_first(&[array(vec![])]), Value::Null);
        assert_eq!(builtin_last(&[array(vec![])]), Value::Null);
        assert_eq!(builtin_rest(&[array(vec![])]), Value::Null);
    }

    #[test]
    fn test_push_does_not_mutate_input() {
        let input = array(vec![Value::Integer(1)]);
        let pushed = builtin_push(&[input.clone(), Value::Integer(2)]);
        assert_eq!(pushed, array(vec![Value::Integer(1), Value::Integer(2)]));
        assert_eq!(input, array(vec![Value::Integer(1)]));
    }

    #[test]
    fn test_rest_drops_first_element() {
        let input = array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert_eq!(
            builtin_rest(&[input]),
            array(vec![Value::Integer(2), Value::Integer(3)])
        );
    }

    #[test]
    fn test_lookup_knows_every_builtin() {
        for name in ["len", "first", "last", "rest", "push", "print"] {
            assert!(lookup(name).is_some(), "missing builtin {name}");
        }
        assert!(lookup("map").is_none());
    }
}
