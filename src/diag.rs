//! Structured diagnostics for Rilla.
//!
//! The lexer and parser never abort on malformed input; they accumulate
//! [`Diagnostic`] records and keep going. Each record carries a severity
//! level, a stable code (`LEX001`, `PAR002`, ...), a human-readable
//! message, an optional hint, and the source range it covers.
//!
//! Diagnostics are distinct from runtime errors: a runtime failure is a
//! first-class value produced by the evaluator, while a diagnostic
//! describes a lexical or syntactic problem in the source text.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::source::Range;

/// Severity of a diagnostic.
///
/// # Example
///
/// ```rust
/// use rilla::diag::Level;
///
/// assert_eq!(Level::Error.to_string(), "error");
/// assert_eq!(Level::Warning.to_string(), "warning");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Level {
    /// A problem that invalidates the enclosing unit of source
    Error,
    /// A suspicious construct that does not prevent further processing
    Warning,
    /// Additional context attached to another diagnostic
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// A single report about the source text.
///
/// Codes are stable strings: tooling may match on them, so they never
/// change meaning across releases. The `hint` is an optional suggestion
/// shown after the main message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    /// Severity level
    pub level: Level,
    /// Stable code, e.g. `LEX001` or `PAR002`
    pub code: String,
    /// Main message
    pub message: String,
    /// Optional suggestion for fixing the problem
    pub hint: Option<String>,
    /// Source range the diagnostic covers, half-open
    pub range: Range,
}

impl Diagnostic {
    /// Creates an error-level diagnostic.
    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        hint: impl Into<String>,
        range: Range,
    ) -> Self {
        Self {
            level: Level::Error,
            code: code.into(),
            message: message.into(),
            hint: Some(hint.into()),
            range,
        }
    }
}

/// Renders diagnostics in a plain, editor-friendly format.
///
/// Each diagnostic prints as `filename:line:col: level CODE: message`,
/// followed by the offending source line and a `^~~~` underline. Lines
/// and columns are clamped to the actual source so a diagnostic at the
/// end of input still renders sensibly.
///
/// # Example
///
/// ```rust
/// use rilla::diag::{render_plain, Diagnostic};
/// use rilla::source::{Position, Range};
///
/// let src = "let x = 3.;";
/// let diag = Diagnostic::error(
///     "LEX002",
///     "Malformed float literal",
///     "At least one digit is expected after the decimal point",
///     Range::new(Position::new(8, 1, 9), Position::new(10, 1, 11)),
/// );
/// let out = render_plain("demo.rl", src, &[diag]);
/// assert!(out.starts_with("demo.rl:1:9: error LEX002: Malformed float literal"));
/// ```
pub fn render_plain(filename: &str, src: &str, diags: &[Diagnostic]) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let lines: Vec<&str> = src.split('\n').collect();

    for d in diags {
        let line = (d.range.start.line as usize).clamp(1, lines.len().max(1));
        let col = (d.range.start.column as usize).max(1);
        let _ = writeln!(
            out,
            "{}:{}:{}: {} {}: {}",
            filename, line, col, d.level, d.code, d.message
        );

        let Some(code) = lines.get(line - 1) else {
            continue;
        };
        out.push_str(code);
        out.push('\n');

        let width = code.chars().count();
        let start_col = (d.range.start.column as usize).clamp(1, width + 1);
        let end_col = if d.range.end.line == d.range.start.line && d.range.end.column > 0 {
            (d.range.end.column as usize).clamp(start_col, width + 1)
        } else {
            // Multi-line range: underline to the end of the first line.
            width + 1
        };
        let length = (end_col - start_col).max(1);

        out.push_str(&" ".repeat(start_col - 1));
        out.push('^');
        out.push_str(&"~".repeat(length - 1));
        out.push('\n');
    }

    out
}
