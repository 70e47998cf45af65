//! Glues the resolver, environment, evaluator, and executor into one
//! running session, matching the reference implementation's `Lox` /
//! `Interpreter` classes.

use std::fmt;
use std::rc::Rc;

use crate::ast::Stmt;
use crate::callable::NativeClock;
use crate::environment::Environment;
use crate::error::{report_execute_error, report_scan_error, ExecuteError, ParseError, ScanError};
use crate::executor::{execute, ExecSignal};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::resolver::{initial_scope, resolve_statements, Bindings};
use crate::value::Value;

/// Which pipeline stage failed, so the caller (the `cli` module) can pick
/// the right exit code: 65 for scan/parse, 70 for resolve/execute.
#[derive(Debug)]
pub enum RunError {
    Scan(ScanError),
    Parse(ParseError),
    Execute(ExecuteError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Scan(e) => write!(f, "{e}"),
            RunError::Parse(e) => write!(f, "{e}"),
            RunError::Execute(e) => write!(f, "{e}"),
        }
    }
}

/// Owns the single running [`Bindings`] map and the root environment.
/// `run` executes one batch of source (a whole file, or one REPL line)
/// through the full scan → parse → resolve → execute pipeline.
pub struct Interpreter {
    globals: Environment,
    bindings: Bindings,
    /// Every top-level name declared so far, seeded with the natives (see
    /// `initial_scope`). Each `run` call resolves its chunk against this
    /// list rather than against `initial_scope()` alone, so a REPL line can
    /// see variables and functions declared by earlier lines; it is grown
    /// after each chunk resolves successfully.
    known_globals: Vec<String>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new_global();
        globals.define("clock", Value::Callable(Rc::new(NativeClock)));
        Interpreter {
            globals,
            bindings: Bindings::new(),
            known_globals: initial_scope(),
        }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Runs one chunk of Lox source to completion. Every error this returns
    /// has already been written to stderr in the §6 diagnostic format; the
    /// caller only needs the variant to choose an exit code.
    pub fn run(&mut self, source: &str) -> Result<(), RunError> {
        let tokens = Lexer::new(source).tokenize().map_err(|err| {
            report_scan_error(&err);
            RunError::Scan(err)
        })?;

        // The parser reports each synchronized error itself as it's
        // recorded, so the one returned here (the first) isn't re-reported.
        let statements = Parser::new(tokens).parse().map_err(RunError::Parse)?;

        let new_bindings = resolve_statements(&statements, &self.known_globals).map_err(|err| {
            report_execute_error(&err);
            RunError::Execute(err)
        })?;
        self.bindings.merge(new_bindings);

        for name in top_level_names(&statements) {
            if !self.known_globals.iter().any(|known| known == name) {
                self.known_globals.push(name.to_string());
            }
        }

        let globals = self.globals.clone();
        for stmt in &statements {
            match execute(stmt, &globals, self) {
                Ok(()) => {}
                Err(ExecSignal::Error(err)) => {
                    report_execute_error(&err);
                    return Err(RunError::Execute(err));
                }
                Err(ExecSignal::Return(_)) => {
                    unreachable!("resolver rejects 'return' outside a function body")
                }
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

/// The names this chunk declares directly at the top level (not nested in a
/// block or function body), so later chunks' resolution can see them too.
fn top_level_names(statements: &[Stmt]) -> impl Iterator<Item = &str> {
    statements.iter().filter_map(|stmt| match stmt {
        Stmt::Var(name, _) => Some(name.lexeme.as_str()),
        Stmt::Function(decl) => Some(decl.name.lexeme.as_str()),
        _ => None,
    })
}
