//! rilla - run Rilla programs or explore them interactively
//!
//! # Usage
//!
//! ```bash
//! # Start the REPL (evaluator mode)
//! rilla
//!
//! # Inspect the token stream of a line
//! rilla --mode=scanner
//!
//! # Run a script
//! rilla --file=examples.rl
//!
//! # Show the canonical parse of a script
//! rilla --mode=parser --file=examples.rl
//! ```

use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use rilla::repl::{self, Mode};

/// Run Rilla programs or explore them interactively
#[derive(Parser, Debug)]
#[command(name = "rilla")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// What to do with the input: tokenize, parse, or evaluate
    #[arg(long, value_enum, default_value_t = Mode::Evaluator)]
    mode: Mode,

    /// Script to run; without it the REPL starts
    #[arg(long)]
    file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    if let Err(error) = run(&args) {
        eprintln!("{} {error:#}", "error:".red());
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    match &args.file {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?;
            repl::run_source(&source, &path.display().to_string(), args.mode, io::stdout())?;
        }
        None => {
            let user = std::env::var("USER").unwrap_or_else(|_| "friend".to_string());
            println!("Welcome to Rilla, {user}!");
            println!("Feel free to type in commands");
            println!("Press Ctrl+D or type 'exit' to leave");
            repl::start(BufReader::new(io::stdin()), io::stdout(), args.mode)?;
        }
    }
    Ok(())
}
