//! Expression evaluation.

use crate::ast::{Expr, NodeId};
use crate::environment::Environment;
use crate::error::ExecuteError;
use crate::interpreter::Interpreter;
use crate::resolver::Bindings;
use crate::token::{Token, TokenKind};
use crate::value::{value_equal, Value};

pub fn evaluate(
    expr: &Expr,
    env: &Environment,
    bindings: &Bindings,
    interpreter: &Interpreter,
) -> Result<Value, ExecuteError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Grouping(inner) => evaluate(inner, env, bindings, interpreter),
        Expr::Variable(name) => {
            let node_id = NodeId::of(name);
            Ok(env.get(bindings, node_id, name))
        }
        Expr::Assign(name, value_expr) => {
            let value = evaluate(value_expr, env, bindings, interpreter)?;
            let node_id = NodeId::of(name);
            env.assign(bindings, node_id, name, value.clone());
            Ok(value)
        }
        Expr::Unary(op, right) => {
            let right = evaluate(right, env, bindings, interpreter)?;
            eval_unary(op, right)
        }
        Expr::Binary(left, op, right) => {
            // Both operands are evaluated, left-to-right, before either is
            // type-checked.
            let left = evaluate(left, env, bindings, interpreter)?;
            let right = evaluate(right, env, bindings, interpreter)?;
            eval_binary(left, op, right)
        }
        Expr::Logical(left, op, right) => {
            let left_value = evaluate(left, env, bindings, interpreter)?;
            let short_circuits = if op.kind == TokenKind::Or {
                left_value.truthy()
            } else {
                !left_value.truthy()
            };
            if short_circuits {
                Ok(left_value)
            } else {
                evaluate(right, env, bindings, interpreter)
            }
        }
        Expr::Call(callee, paren, args) => {
            let callee_value = evaluate(callee, env, bindings, interpreter)?;
            let mut arg_values = Vec::with_capacity(args.len());
            for arg in args {
                arg_values.push(evaluate(arg, env, bindings, interpreter)?);
            }

            let callable = match callee_value {
                Value::Callable(callable) => callable,
                _ => {
                    return Err(ExecuteError::new(
                        "Can only call functions and classes.",
                        paren.clone(),
                    ))
                }
            };

            if arg_values.len() != callable.arity() {
                return Err(ExecuteError::new(
                    format!(
                        "Expected {} arguments but got {}.",
                        callable.arity(),
                        arg_values.len()
                    ),
                    paren.clone(),
                ));
            }

            callable.call(interpreter, arg_values)
        }
    }
}

fn eval_unary(op: &Token, right: Value) -> Result<Value, ExecuteError> {
    match op.kind {
        TokenKind::Minus => match right {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(ExecuteError::new(
                "Unsupported operand for '-', must be 'number'.",
                op.clone(),
            )),
        },
        TokenKind::Bang => Ok(Value::Bool(!right.truthy())),
        _ => unreachable!("parser only produces Unary with '-' or '!'"),
    }
}

fn eval_binary(left: Value, op: &Token, right: Value) -> Result<Value, ExecuteError> {
    match op.kind {
        TokenKind::Plus => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{a}{b}"))),
            _ => Err(ExecuteError::new(
                "Unsupported operands for '+', must both be 'string' or 'number'.",
                op.clone(),
            )),
        },
        TokenKind::Minus => numeric(left, right, op, |a, b| Value::Number(a - b)),
        TokenKind::Star => numeric(left, right, op, |a, b| Value::Number(a * b)),
        TokenKind::Slash => numeric(left, right, op, |a, b| Value::Number(a / b)),
        TokenKind::Greater => numeric(left, right, op, |a, b| Value::Bool(a > b)),
        TokenKind::GreaterEqual => numeric(left, right, op, |a, b| Value::Bool(a >= b)),
        TokenKind::Less => numeric(left, right, op, |a, b| Value::Bool(a < b)),
        TokenKind::LessEqual => numeric(left, right, op, |a, b| Value::Bool(a <= b)),
        TokenKind::EqualEqual => Ok(Value::Bool(value_equal(&left, &right))),
        TokenKind::BangEqual => Ok(Value::Bool(!value_equal(&left, &right))),
        _ => unreachable!("parser only produces Binary with a binary operator token"),
    }
}

fn numeric(
    left: Value,
    right: Value,
    op: &Token,
    f: impl FnOnce(f64, f64) -> Value,
) -> Result<Value, ExecuteError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(f(a, b)),
        _ => Err(ExecuteError::new(
            format!("Unsupported operands for '{}', must both be 'number'.", op.lexeme),
            op.clone(),
        )),
    }
}
