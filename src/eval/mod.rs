//! Runtime evaluation for Rilla.
//!
//! This module bundles the value domain, the environment chain, the
//! builtin table, and the tree-walking [`Interpreter`].
//!
//! # Example
//!
//! ```rust
//! use rilla::eval::{Environment, Interpreter, Value};
//! use rilla::lexer::Lexer;
//! use rilla::parser::Parser;
//!
//! let mut parser = Parser::new(Lexer::new("5 + 5 + 5 + 5 - 10"));
//! let program = parser.parse_program();
//!
//! let env = Environment::new();
//! let mut interpreter = Interpreter::new();
//! assert_eq!(interpreter.eval(&program, &env), Value::Integer(10));
//! ```

pub mod builtins;
pub mod interpreter;
pub mod value;

pub use interpreter::Interpreter;
pub use value::{EnvRef, Environment, FunctionValue, HashKey, HashPair, Value};
