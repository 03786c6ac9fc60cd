// File: src/main.rs
//
// Main entry point for the SynthFlow programming language interpreter.
// Handles command-line argument parsing and dispatches to the appropriate
// subcommand (run or repl).

use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use synthflow::errors::SynthFlowError;
use synthflow::interpreter::Interpreter;
use synthflow::lexer;
use synthflow::parser::Parser;
use synthflow::repl::Repl;
use synthflow::semantic;

#[derive(ClapParser)]
#[command(
    name = "synthflow",
    about = "SynthFlow: a small imperative scripting language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a SynthFlow script file
    Run {
        /// Path to the .sf file
        file: PathBuf,
    },

    /// Launch the interactive SynthFlow REPL
    Repl,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file } => {
            let source = match fs::read_to_string(&file) {
                Ok(source) => source,
                Err(err) => {
                    eprintln!("Failed to read {}: {}", file.display(), err);
                    return ExitCode::FAILURE;
                }
            };
            match run_source(&source) {
                Ok(()) => ExitCode::SUCCESS,
                Err(error) => {
                    eprintln!("{}", attach_context(error, &source));
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Repl => match Repl::new() {
            Ok(mut repl) => match repl.run() {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("REPL error: {}", err);
                    ExitCode::FAILURE
                }
            },
            Err(err) => {
                eprintln!("Failed to start REPL: {}", err);
                ExitCode::FAILURE
            }
        },
    }
}

/// Drives the pipeline: tokenize, parse, analyze, evaluate.
/// An error in any stage halts the stages after it.
fn run_source(source: &str) -> Result<(), SynthFlowError> {
    let tokens = lexer::tokenize(source)?;
    let statements = Parser::new(tokens).parse()?;
    semantic::analyze(&statements)?;
    let mut interpreter = Interpreter::new();
    interpreter.execute(&statements)
}

/// Attaches the offending source line to located errors so the
/// diagnostic can show it with a caret
fn attach_context(error: SynthFlowError, source: &str) -> SynthFlowError {
    if error.location.line > 0 {
        if let Some(line) = source.lines().nth(error.location.line - 1) {
            return error.with_source(line.to_string());
        }
    }
    error
}
