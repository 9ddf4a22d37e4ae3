//! # Rilla
//!
//! Rilla is a small, dynamically typed, expression-oriented scripting
//! language with a tree-walking interpreter. The crate provides the
//! three core stages and the plumbing around them:
//!
//! - [`lexer`]: scans UTF-8 source into tokens with precise ranges,
//!   accumulating structured diagnostics instead of failing;
//! - [`parser`]: a Pratt parser building an AST with the same
//!   diagnostic discipline;
//! - [`eval`]: a recursive evaluator producing first-class values
//!   (integers, floats, booleans, strings, arrays, hashes, closures)
//!   against nested lexical environments.
//!
//! Control flow (`return`, `break`, `continue`) and runtime failures
//! travel as values, not exceptions; lexical and syntactic problems are
//! [`diag::Diagnostic`] records with stable codes.
//!
//! ## Quick start
//!
//! ```rust
//! use rilla::{eval_source, Value};
//!
//! let result = eval_source("let add = fn(x, y) { x + y }; add(2, 40)")?;
//! assert_eq!(result, Value::Integer(42));
//! # Ok::<(), rilla::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`source`]: positions and half-open ranges
//! - [`diag`]: diagnostics and the plain-text renderer
//! - [`token`]: the closed token-kind set
//! - [`lexer`]: tokenization
//! - [`ast`]: syntax tree and canonical text form
//! - [`parser`]: Pratt parsing
//! - [`eval`]: values, environments, builtins, interpreter
//! - [`repl`]: the line-oriented driver

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ast;
pub mod diag;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod source;
pub mod token;

pub use ast::Program;
pub use diag::{Diagnostic, Level};
pub use error::Error;
pub use eval::{Environment, Interpreter, Value};
pub use lexer::Lexer;
pub use parser::Parser;
pub use source::{Position, Range};
pub use token::{Token, TokenKind};

/// Parses a source string into a program.
///
/// Returns the program on success, or [`Error::Parse`] with the number
/// of syntax errors. The partial program and the individual diagnostics
/// are discarded; drive [`Parser`] directly to inspect them.
///
/// # Example
///
/// ```rust
/// use rilla::parse_source;
///
/// let program = parse_source("let x = 1 + 2;")?;
/// assert_eq!(program.to_string(), "let x = (1 + 2);");
///
/// assert!(parse_source("let = 1;").is_err());
/// # Ok::<(), rilla::Error>(())
/// ```
pub fn parse_source(source: &str) -> Result<Program, Error> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    if parser.errors().is_empty() {
        Ok(program)
    } else {
        Err(Error::Parse(parser.errors().len()))
    }
}

/// Parses and evaluates a source string in a fresh environment.
///
/// Runtime failures are part of the result, not the error channel: a
/// program whose evaluation fails yields `Ok(Value::Error(...))`.
///
/// # Example
///
/// ```rust
/// use rilla::{eval_source, Value};
///
/// assert_eq!(eval_source("[1, 2, 3][1 + 1]")?, Value::Integer(3));
///
/// let failure = eval_source("5 + true;")?;
/// assert_eq!(failure.to_string(), "ERROR: type mismatch: INTEGER + BOOLEAN");
/// # Ok::<(), rilla::Error>(())
/// ```
pub fn eval_source(source: &str) -> Result<Value, Error> {
    let program = parse_source(source)?;
    let env = Environment::new();
    let mut interpreter = Interpreter::new();
    Ok(interpreter.eval(&program, &env))
}
