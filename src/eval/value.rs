//! Runtime values for Rilla evaluation.
//!
//! Values are the results of evaluating expressions: numbers, booleans,
//! strings, arrays, hashes, closures, and the null singleton. The sum
//! type also carries the evaluator's internal control-flow signals
//! (return, break, continue) and first-class runtime errors, so the
//! evaluator can unwind without exceptions by inspecting each result
//! before composing further.
//!
//! Collections and closures are shared by reference: cloning a [`Value`]
//! is cheap, and `push`/`rest` build new arrays instead of mutating
//! their input. Environments are the only mutable structures.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{Block, Identifier};

/// A shared, mutable reference to an environment.
///
/// Closures hold strong references to their defining environment, and a
/// function stored in the environment that captures it forms a cycle.
/// The reference-counted graph tolerates such cycles; they live for the
/// lifetime of the interpreter.
pub type EnvRef = Rc<RefCell<Environment>>;

/// A user-defined function bundled with its defining environment.
pub struct FunctionValue {
    /// Parameter names
    pub parameters: Vec<Identifier>,
    /// The function body
    pub body: Block,
    /// The environment the function literal was evaluated in
    pub env: EnvRef,
}

/// The environment is omitted: a function stored in the environment it
/// captures would make a derived `Debug` recurse forever.
impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("parameters", &self.parameters)
            .field("body", &self.body.to_string())
            .finish_non_exhaustive()
    }
}

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// A 64-bit signed integer
    Integer(i64),
    /// A 64-bit float
    Float(f64),
    /// A boolean
    Boolean(bool),
    /// An immutable string
    String(Rc<str>),
    /// The null singleton
    Null,
    /// An ordered sequence of values
    Array(Rc<Vec<Value>>),
    /// A hash table; entries keep insertion order
    Hash(Rc<IndexMap<HashKey, HashPair>>),
    /// A closure
    Function(Rc<FunctionValue>),
    /// A built-in function, identified by name
    Builtin(&'static str),
    /// Internal: a value traveling up to the nearest function boundary
    Return(Box<Value>),
    /// Internal: a `break` unwinding to the nearest loop
    Break,
    /// Internal: a `continue` unwinding to the nearest loop
    Continue,
    /// A first-class runtime failure
    Error(String),
}

/// A key in a hash value.
///
/// Only integers, floats, booleans, and strings can be hashed; floats
/// key by their bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    /// An integer key
    Integer(i64),
    /// A float key, stored as its IEEE-754 bits
    Float(u64),
    /// A boolean key
    Boolean(bool),
    /// A string key
    String(Rc<str>),
}

/// The stored key/value pair of a hash entry.
///
/// The original key value is kept alongside the mapped value so the
/// hash can render its entries back in their source form.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    /// The key as written
    pub key: Value,
    /// The mapped value
    pub value: Value,
}

impl Value {
    /// Returns the runtime type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Boolean(_) => "BOOLEAN",
            Value::String(_) => "STRING",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Return(_) => "RETURN_VALUE",
            Value::Break => "BREAK",
            Value::Continue => "CONTINUE",
            Value::Error(_) => "ERROR",
        }
    }

    /// Returns true unless the value is `null` or `false`.
    ///
    /// Zero, the empty string, and the empty array are all truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    /// Returns true if the value is a runtime error.
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Derives the hash key for this value, if it is hashable.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(n) => Some(HashKey::Integer(*n)),
            Value::Float(x) => Some(HashKey::Float(x.to_bits())),
            Value::Boolean(b) => Some(HashKey::Boolean(*b)),
            Value::String(s) => Some(HashKey::String(s.clone())),
            _ => None,
        }
    }
}

/// Structural equality, used by tests and hash comparison.
///
/// This is not the language's `==` operator: the evaluator compares
/// non-primitive values by identity, while this implementation compares
/// arrays and hashes element-wise. Functions still compare by identity
/// because two closures have no meaningful structural equality.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Return(a), Value::Return(b)) => a == b,
            (Value::Break, Value::Break) => true,
            (Value::Continue, Value::Continue) => true,
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// The inspection form: what the evaluator-mode REPL prints.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
            Value::Null => write!(f, "null"),
            Value::Array(elements) => {
                let rendered = elements
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{rendered}]")
            }
            Value::Hash(pairs) => {
                let rendered = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{rendered}}}")
            }
            Value::Function(function) => {
                let params = function
                    .parameters
                    .iter()
                    .map(|p| p.value.clone())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "fn({params}) {{\n{}\n}}", function.body)
            }
            Value::Builtin(_) => write!(f, "builtin function"),
            Value::Return(inner) => write!(f, "{inner}"),
            Value::Break => write!(f, "break"),
            Value::Continue => write!(f, "continue"),
            Value::Error(message) => write!(f, "ERROR: {message}"),
        }
    }
}

/// A lexical scope mapping names to values.
///
/// Lookup walks the parent chain; stores always write to the innermost
/// scope. The asymmetry is deliberate: assigning to a free variable
/// creates a local binding rather than mutating an outer one.
#[derive(Debug, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Environment {
    /// Creates an empty root environment.
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Creates a child environment enclosed by `parent`.
    pub fn new_enclosed(parent: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            bindings: HashMap::new(),
            parent: Some(parent),
        }))
    }

    /// Looks up a name, walking the parent chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().get(name))
    }

    /// Binds a name in this (innermost) scope.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        // Unlike many languages, zero and the empty string are truthy.
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::String("".into()).is_truthy());
        assert!(Value::Array(Rc::new(vec![])).is_truthy());
    }

    #[test]
    fn test_hash_key_derivation() {
        assert_eq!(
            Value::Integer(1).hash_key(),
            Some(HashKey::Integer(1))
        );
        assert_eq!(
            Value::String("a".into()).hash_key(),
            Some(HashKey::String("a".into()))
        );
        assert_eq!(Value::Null.hash_key(), None);
        assert_eq!(Value::Array(Rc::new(vec![])).hash_key(), None);
    }

    #[test]
    fn test_environment_lookup_walks_parents() {
        let root = Environment::new();
        root.borrow_mut().set("x", Value::Integer(1));

        let child = Environment::new_enclosed(root.clone());
        child.borrow_mut().set("y", Value::Integer(2));

        assert_eq!(child.borrow().get("x"), Some(Value::Integer(1)));
        assert_eq!(child.borrow().get("y"), Some(Value::Integer(2)));
        assert_eq!(root.borrow().get("y"), None);
    }

    #[test]
    fn test_set_writes_innermost_scope() {
        let root = Environment::new();
        root.borrow_mut().set("x", Value::Integer(1));

        let child = Environment::new_enclosed(root.clone());
        child.borrow_mut().set("x", Value::Integer(2));

        // The outer binding is shadowed, not overwritten.
        assert_eq!(child.borrow().get("x"), Some(Value::Integer(2)));
        assert_eq!(root.borrow().get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn test_inspect_forms() {
        assert_eq!(Value::Integer(5).to_string(), "5");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::String("hello".into()).to_string(), "hello");
        assert_eq!(
            Value::Array(Rc::new(vec![Value::Integer(1), Value::Integer(2)])).to_string(),
            "[1, 2]"
        );
        assert_eq!(
            Value::Error("type mismatch: INTEGER + BOOLEAN".to_string()).to_string(),
            "ERROR: type mismatch: INTEGER + BOOLEAN"
        );
    }
}
