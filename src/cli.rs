//! Command-line front end: `run_file`/`run_prompt`, argument parsing, exit
//! codes.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;

use crate::interpreter::{Interpreter, RunError};

/// A single optional positional script path. With no argument, the
/// interpreter starts a REPL instead.
#[derive(ClapParser)]
#[command(name = "lox")]
#[command(about = "The Lox programming language", long_about = None)]
pub struct Cli {
    /// The Lox source file to run. Omit to start an interactive prompt.
    pub script: Option<PathBuf>,
}

/// Reads `path` as UTF-8 and runs it as a single batch.
///
/// Exit code 65 on scan/parse errors, 70 on resolve/execute errors, 0
/// otherwise.
pub fn run_file(path: &std::path::Path) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read '{}': {e}", path.display());
            return ExitCode::from(66);
        }
    };

    let mut interpreter = Interpreter::new();
    match interpreter.run(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Scan(_) | RunError::Parse(_)) => ExitCode::from(65),
        Err(RunError::Execute(_)) => ExitCode::from(70),
    }
}

/// Interactive REPL: reads a line, runs it, repeats. Errors are reported but
/// do not end the session; EOF (Ctrl+D) on stdin ends it.
pub fn run_prompt() -> ExitCode {
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {
                // Errors are already reported to stderr by `run`; the REPL
                // just keeps prompting.
                let _ = interpreter.run(&line);
            }
            Err(e) => {
                eprintln!("Failed to read from stdin: {e}");
                break;
            }
        }
    }

    ExitCode::SUCCESS
}
