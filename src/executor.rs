//! Statement execution.

use std::rc::Rc;

use crate::ast::Stmt;
use crate::callable::LoxFunction;
use crate::environment::Environment;
use crate::error::ExecuteError;
use crate::evaluator::evaluate;
use crate::interpreter::Interpreter;
use crate::value::{stringify, Value};

/// A statement executor either succeeds, fails with an [`ExecuteError`], or
/// unwinds with a `return` value. Modeling `Return` as its own variant (not
/// folded into `ExecuteError`) lets `?` carry it through blocks, loops, and
/// `if` uniformly without mistaking it for a real error; only
/// [`LoxFunction::call`] ever matches on it.
pub enum ExecSignal {
    Error(ExecuteError),
    Return(Value),
}

impl From<ExecuteError> for ExecSignal {
    fn from(err: ExecuteError) -> Self {
        ExecSignal::Error(err)
    }
}

pub fn execute(
    stmt: &Stmt,
    env: &Environment,
    interpreter: &Interpreter,
) -> Result<(), ExecSignal> {
    match stmt {
        Stmt::Expression(expr) => {
            evaluate(expr, env, interpreter.bindings(), interpreter)?;
            Ok(())
        }
        Stmt::Print(expr) => {
            let value = evaluate(expr, env, interpreter.bindings(), interpreter)?;
            println!("{}", stringify(&value));
            Ok(())
        }
        Stmt::Var(name, initializer) => {
            let value = evaluate(initializer, env, interpreter.bindings(), interpreter)?;
            env.define(&name.lexeme, value);
            Ok(())
        }
        Stmt::Block(statements) => {
            let block_env = Environment::new_enclosed(env);
            execute_block(statements, &block_env, interpreter)
        }
        Stmt::If(condition, then_branch, else_branch) => {
            let cond = evaluate(condition, env, interpreter.bindings(), interpreter)?;
            if cond.truthy() {
                execute(then_branch, env, interpreter)
            } else if let Some(else_branch) = else_branch {
                execute(else_branch, env, interpreter)
            } else {
                Ok(())
            }
        }
        Stmt::While(condition, body) => {
            loop {
                let cond = evaluate(condition, env, interpreter.bindings(), interpreter)?;
                if !cond.truthy() {
                    break;
                }
                execute(body, env, interpreter)?;
            }
            Ok(())
        }
        Stmt::Function(decl) => {
            let function = LoxFunction::new(Rc::clone(decl), env.clone());
            env.define(&decl.name.lexeme, Value::Callable(Rc::new(function)));
            Ok(())
        }
        Stmt::Return(_keyword, expr) => {
            let value = evaluate(expr, env, interpreter.bindings(), interpreter)?;
            Err(ExecSignal::Return(value))
        }
    }
}

/// Executes a statement list under `env` without introducing another nested
/// scope — the caller (block statement, or [`LoxFunction::call`] for a
/// function body) is responsible for constructing `env` itself.
pub fn execute_block(
    statements: &[Stmt],
    env: &Environment,
    interpreter: &Interpreter,
) -> Result<(), ExecSignal> {
    for stmt in statements {
        execute(stmt, env, interpreter)?;
    }
    Ok(())
}
