//! Callable values: user-defined functions and the native `clock` built-in.

use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::error::ExecuteError;
use crate::executor::{execute_block, ExecSignal};
use crate::interpreter::Interpreter;
use crate::value::Value;

pub trait LoxCallable: fmt::Debug {
    fn arity(&self) -> usize;
    fn call(&self, interpreter: &Interpreter, args: Vec<Value>) -> Result<Value, ExecuteError>;
}

/// The sole native function, installed on the root environment before any
/// user code runs.
pub struct NativeClock;

impl fmt::Debug for NativeClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

impl LoxCallable for NativeClock {
    fn arity(&self) -> usize {
        0
    }

    fn call(&self, _interpreter: &Interpreter, _args: Vec<Value>) -> Result<Value, ExecuteError> {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock must not be before the Unix epoch")
            .as_secs_f64();
        Ok(Value::Number(seconds))
    }
}

/// A user-defined function: its declaration plus the environment that was
/// current at the point it was declared (its closure).
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Environment,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: Environment) -> Self {
        LoxFunction {
            declaration,
            closure,
        }
    }
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

impl LoxCallable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &Interpreter, args: Vec<Value>) -> Result<Value, ExecuteError> {
        let call_env = Environment::new_enclosed(&self.closure);
        for (param, arg) in self.declaration.params.iter().zip(args) {
            call_env.define(&param.lexeme, arg);
        }

        match execute_block(&self.declaration.body, &call_env, interpreter) {
            Ok(()) => Ok(Value::Nil),
            Err(ExecSignal::Return(value)) => Ok(value),
            Err(ExecSignal::Error(err)) => Err(err),
        }
    }
}
