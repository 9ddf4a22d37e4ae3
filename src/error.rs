//! Crate-level error types for Rilla.
//!
//! These errors cover the driver surface: loading source files and
//! summarizing failed parses for callers that want a single `Result`.
//! They are distinct from the two in-language failure channels: parse
//! problems are [`Diagnostic`](crate::diag::Diagnostic) records, and
//! runtime failures are first-class [`Value::Error`](crate::eval::Value)
//! values.

use thiserror::Error;

/// Errors surfaced by the library entry points and the CLI driver.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading a source file failed.
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing produced one or more syntax errors.
    ///
    /// The individual messages live in the parser's error log and
    /// diagnostics; this variant only summarizes the count for callers
    /// that treat any parse failure as fatal.
    #[error("parsing failed with {0} error(s)")]
    Parse(usize),
}
