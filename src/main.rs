//! The Lox tree-walking interpreter.
//!
//! # Usage
//!
//! ```text
//! lox [script]
//! ```
//!
//! With a script path, runs it as one batch and exits with the
//! category-appropriate code. With no arguments, starts an interactive
//! prompt.
//!
//! # Architecture
//!
//! The interpreter is a strictly sequential pipeline:
//!
//! 1. **Scanning** ([`lox::lexer`]) - source text to a token stream
//! 2. **Parsing** ([`lox::parser`]) - tokens to a statement list
//! 3. **Resolving** ([`lox::resolver`]) - variable references to scope depth
//! 4. **Executing** ([`lox::executor`]) - statements against an environment

use std::process::ExitCode;

use clap::Parser;
use lox::cli::{run_file, run_prompt, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.script {
        Some(path) => run_file(&path),
        None => run_prompt(),
    }
}
