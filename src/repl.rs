//! The line-oriented read-eval-print driver.
//!
//! The REPL reads one line at a time and runs it in one of three modes:
//!
//! - **scanner**: prints every token as `KIND\t"literal"` until EOF,
//!   then any lexer diagnostics;
//! - **parser**: prints the program's canonical text form, or the
//!   banner and the parser's error log when the line does not parse;
//! - **evaluator**: prints the result's inspection form, keeping one
//!   environment alive across lines so bindings persist.
//!
//! A program with parser errors is reported and never evaluated.
//! Typing `exit` (or closing stdin) leaves the loop.

use std::io::{self, BufRead, Write};

use crate::diag::render_plain;
use crate::eval::{EnvRef, Environment, Interpreter};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::token::TokenKind;

/// The interactive prompt.
pub const PROMPT: &str = ">> ";

const BANNER: &str = r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

/// What the driver does with each line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Mode {
    /// Print tokens
    Scanner,
    /// Print the parsed program's canonical text
    Parser,
    /// Evaluate and print the result
    Evaluator,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Scanner => write!(f, "scanner"),
            Mode::Parser => write!(f, "parser"),
            Mode::Evaluator => write!(f, "evaluator"),
        }
    }
}

/// Runs the interactive loop until `exit` or end of input.
pub fn start<R: BufRead, W: Write>(mut input: R, mut output: W, mode: Mode) -> io::Result<()> {
    let env = Environment::new();
    let mut interpreter = Interpreter::new();
    let mut line = String::new();

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let source = line.trim_end_matches(['\n', '\r']);
        if source == "exit" {
            return Ok(());
        }

        run_line(source, "<repl>", mode, &mut output, &mut interpreter, &env)?;
    }
}

/// Runs a whole source text in one shot, with a fresh environment.
pub fn run_source<W: Write>(
    source: &str,
    filename: &str,
    mode: Mode,
    mut output: W,
) -> io::Result<()> {
    let env = Environment::new();
    let mut interpreter = Interpreter::new();
    run_line(source, filename, mode, &mut output, &mut interpreter, &env)
}

fn run_line<W: Write>(
    source: &str,
    filename: &str,
    mode: Mode,
    output: &mut W,
    interpreter: &mut Interpreter,
    env: &EnvRef,
) -> io::Result<()> {
    match mode {
        Mode::Scanner => scan(source, filename, output),
        Mode::Parser => parse(source, filename, output),
        Mode::Evaluator => evaluate(source, filename, output, interpreter, env),
    }
}

fn scan<W: Write>(source: &str, filename: &str, output: &mut W) -> io::Result<()> {
    let mut lexer = Lexer::new(source);
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            break;
        }
        writeln!(output, "{}\t\"{}\"", token.kind.name(), token.literal)?;
    }
    write_diagnostics(filename, source, lexer.diagnostics(), &[], output)
}

fn parse<W: Write>(source: &str, filename: &str, output: &mut W) -> io::Result<()> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if parser.errors().is_empty() {
        writeln!(output, "{program}")?;
    } else {
        write_parser_errors(parser.errors(), output)?;
    }
    write_diagnostics(
        filename,
        source,
        parser.lexer_diagnostics(),
        parser.diagnostics(),
        output,
    )
}

fn evaluate<W: Write>(
    source: &str,
    filename: &str,
    output: &mut W,
    interpreter: &mut Interpreter,
    env: &EnvRef,
) -> io::Result<()> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if parser.errors().is_empty() {
        let result = interpreter.eval(&program, env);
        writeln!(output, "{result}")?;
    } else {
        write_parser_errors(parser.errors(), output)?;
    }
    write_diagnostics(
        filename,
        source,
        parser.lexer_diagnostics(),
        parser.diagnostics(),
        output,
    )
}

fn write_parser_errors<W: Write>(errors: &[String], output: &mut W) -> io::Result<()> {
    write!(output, "{BANNER}")?;
    write!(
        output,
        "Woops! We ran into some gorilla business here!\n parser errors:\n"
    )?;
    for message in errors {
        writeln!(output, "\t{message}")?;
    }
    Ok(())
}

fn write_diagnostics<W: Write>(
    filename: &str,
    source: &str,
    lexer_diags: &[crate::diag::Diagnostic],
    parser_diags: &[crate::diag::Diagnostic],
    output: &mut W,
) -> io::Result<()> {
    let mut all = Vec::with_capacity(lexer_diags.len() + parser_diags.len());
    all.extend_from_slice(lexer_diags);
    all.extend_from_slice(parser_diags);
    if all.is_empty() {
        return Ok(());
    }
    write!(output, "{}", render_plain(filename, source, &all))
}
