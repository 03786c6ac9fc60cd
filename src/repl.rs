// File: src/repl.rs
//
// Interactive REPL (Read-Eval-Print Loop) for the SynthFlow programming
// language. Provides an interactive shell with:
// - Multi-line input support for functions, loops, and control structures
// - Command history with up/down arrow navigation
// - Special commands (:help, :vars, :quit)
// - Persistent interpreter state across inputs
// - Structured error display

use crate::interpreter::{Interpreter, Value};
use crate::lexer;
use crate::parser::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// REPL session that maintains interpreter state and handles user interaction
pub struct Repl {
    interpreter: Interpreter,
    editor: DefaultEditor,
}

impl Repl {
    /// Creates a new REPL session with a fresh interpreter
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let editor = DefaultEditor::new()?;
        Ok(Repl {
            interpreter: Interpreter::new(),
            editor,
        })
    }

    fn show_banner(&self) {
        println!(
            "{}",
            format!("SynthFlow v{} - Interactive Shell", env!("CARGO_PKG_VERSION")).bright_cyan()
        );
        println!(
            "  Type {} for commands, {} to leave.",
            ":help".bright_yellow(),
            ":quit".bright_yellow()
        );
        println!();
    }

    /// Starts the REPL loop
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.show_banner();

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                "flow> ".bright_green().to_string()
            } else {
                "....> ".bright_blue().to_string()
            };

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());

                    // Special commands only outside multi-line mode
                    if buffer.is_empty() && line.trim().starts_with(':') {
                        if self.handle_command(line.trim()) {
                            continue;
                        } else {
                            break;
                        }
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    if Self::is_input_complete(&buffer) {
                        self.eval_input(&buffer);
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C (input discarded, :quit to exit)".bright_yellow());
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
                Err(err) => {
                    eprintln!("{} {}", "Error:".bright_red(), err);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handles special REPL commands starting with ':'.
    /// Returns true to continue the loop, false to quit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":help" | ":h" => {
                println!("  {}  show this help", ":help".bright_yellow());
                println!("  {}  list defined variables", ":vars".bright_yellow());
                println!("  {}  leave the shell", ":quit".bright_yellow());
                true
            }
            ":quit" | ":q" | ":exit" => false,
            ":vars" => {
                for name in self.interpreter.global_names() {
                    if let Some(value) = self.interpreter.get_variable(&name) {
                        if matches!(value, Value::Function(_)) {
                            continue;
                        }
                        println!("  {} = {}", name.bright_green(), value.to_display_string());
                    }
                }
                true
            }
            other => {
                println!("{} unknown command '{}'", "?".bright_red(), other);
                true
            }
        }
    }

    /// Input is complete once every brace, bracket, and paren opened
    /// outside a string literal has been closed
    fn is_input_complete(input: &str) -> bool {
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escaped = false;

        for c in input.chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' if in_string => escaped = true,
                '"' => in_string = !in_string,
                '#' if !in_string => {
                    // Comments run to end of line; handled by the lexer,
                    // a conservative depth count is enough here
                }
                '{' | '(' | '[' if !in_string => depth += 1,
                '}' | ')' | ']' if !in_string => depth -= 1,
                _ => {}
            }
        }

        depth <= 0 && !in_string
    }

    fn eval_input(&mut self, source: &str) {
        let tokens = match lexer::tokenize(source) {
            Ok(tokens) => tokens,
            Err(error) => {
                eprintln!("{}", error);
                return;
            }
        };

        let statements = match Parser::new(tokens).parse() {
            Ok(statements) => statements,
            Err(error) => {
                eprintln!("{}", error);
                return;
            }
        };

        for stmt in &statements {
            match self.interpreter.eval_stmt_repl(stmt) {
                Ok(Some(value)) => {
                    if !matches!(value, Value::Null) {
                        println!("{}", value.to_display_string());
                    }
                }
                Ok(None) => {}
                Err(error) => {
                    eprintln!("{}", error);
                    return;
                }
            }
        }
    }
}
