//! Abstract syntax tree produced by the [`crate::parser`] and consumed by
//! the [`crate::resolver`], [`crate::evaluator`], and [`crate::executor`].

use std::rc::Rc;

use crate::token::Token;
use crate::value::Value;

/// Identity key for a bindable AST node (a `Variable` or `Assign` use site).
///
/// Derived from the address of the node's `Rc<Token>`, not from the token's
/// contents, so two syntactically identical variable references (`x; x;`)
/// never collapse into the same resolver entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn of(token: &Rc<Token>) -> Self {
        NodeId(Rc::as_ptr(token) as usize)
    }
}

/// The declaration half of a named function: shared via `Rc` so closures can
/// hold it without deep-cloning the body.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    Variable(Rc<Token>),
    Assign(Rc<Token>, Box<Expr>),
    Unary(Token, Box<Expr>),
    Binary(Box<Expr>, Token, Box<Expr>),
    Logical(Box<Expr>, Token, Box<Expr>),
    Grouping(Box<Expr>),
    /// Callee, closing-paren token (for error reporting), arguments.
    Call(Box<Expr>, Token, Vec<Expr>),
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    /// Initializer is `Expr::Literal(Value::Nil)` when the declaration has
    /// none, matching the distilled grammar's implicit-nil rule.
    Var(Token, Expr),
    Block(Vec<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    Function(Rc<FunctionDecl>),
    /// Expression is `Expr::Literal(Value::Nil)` for a bare `return;`.
    Return(Token, Expr),
}
