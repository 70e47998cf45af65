//! Static resolution pass: computes the lexical scope distance from each
//! variable reference to its declaring scope.

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Expr, FunctionDecl, NodeId, Stmt};
use crate::error::ExecuteError;
use crate::token::Token;

#[derive(Clone, Copy, PartialEq, Eq)]
enum BindingState {
    Declared,
    Defined,
    /// Seeded from a previous chunk's top-level declarations (see
    /// `initial_scope` below), rather than declared within the chunk
    /// currently being resolved. `declare` exempts these from the
    /// "already a variable with this name" check, so a REPL line can
    /// redefine a name an earlier line introduced.
    Inherited,
}

type Scope = HashMap<String, BindingState>;

/// The resolver's output: a map from bindable AST node identity to the
/// number of enclosing scopes to skip to reach its declaring scope.
///
/// Owned as a single value on the `Interpreter` and passed by reference to
/// every environment lookup, rather than threaded through the environment
/// chain itself.
#[derive(Default)]
pub struct Bindings {
    distances: HashMap<NodeId, usize>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn distance(&self, node_id: NodeId) -> Option<usize> {
        self.distances.get(&node_id).copied()
    }

    pub fn record(&mut self, node_id: NodeId, depth: usize) {
        self.distances.insert(node_id, depth);
    }

    /// Disjoint-union merge: the two maps must not share any keys, since a
    /// shared key would mean two bindable nodes collapsed onto one identity
    /// — a resolver bug, not a legitimate merge.
    pub fn merge(&mut self, other: Bindings) {
        for (node_id, depth) in other.distances {
            let previous = self.distances.insert(node_id, depth);
            debug_assert!(
                previous.is_none(),
                "resolver produced two distances for the same bindable node"
            );
        }
    }
}

/// Seed names visible in the root scope before any user code resolves
/// (currently just `clock`).
pub fn initial_scope() -> Vec<String> {
    vec!["clock".to_string()]
}

struct Resolver {
    scopes: Vec<Scope>,
    bindings: Bindings,
    in_function: bool,
}

/// Resolves a batch of statements, returning the distances recorded for
/// every bindable node reached, or the first resolve-time error.
///
/// `initial_scope` seeds name visibility for globals that already exist
/// before this chunk: the natives (`clock`) and, across a multi-chunk
/// session such as a REPL, every top-level name a previous chunk declared.
/// Each is recorded as `BindingState::Inherited` so this chunk's own
/// declarations may shadow/redefine them without tripping the
/// already-declared check.
pub fn resolve_statements(
    statements: &[Stmt],
    initial_scope: &[String],
) -> Result<Bindings, ExecuteError> {
    let mut globals = Scope::new();
    for name in initial_scope {
        globals.insert(name.clone(), BindingState::Inherited);
    }

    let mut resolver = Resolver {
        scopes: vec![globals],
        bindings: Bindings::new(),
        in_function: false,
    };

    for stmt in statements {
        resolver.resolve_stmt(stmt)?;
    }

    Ok(resolver.bindings)
}

impl Resolver {
    fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn innermost(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("scope stack is never empty")
    }

    fn declare(&mut self, token: &Token) -> Result<(), ExecuteError> {
        match self.innermost().get(&token.lexeme) {
            None => {
                self.innermost()
                    .insert(token.lexeme.clone(), BindingState::Declared);
            }
            // Leave it as Inherited rather than marking it Declared: the
            // initializer may legally read the name's prior value (e.g. a
            // REPL line doing `var a = a + 1;` against an earlier line's
            // `a`), which the self-reference check below must not reject.
            Some(BindingState::Inherited) => {}
            Some(_) => {
                return Err(ExecuteError::new(
                    "Already a variable with this name in this scope.",
                    token.clone(),
                ));
            }
        }
        Ok(())
    }

    fn define(&mut self, name: &str) {
        self.innermost()
            .insert(name.to_string(), BindingState::Defined);
    }

    fn resolve_local(&mut self, node_id: NodeId, name: &str) -> bool {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name) {
                self.bindings.record(node_id, depth);
                return true;
            }
        }
        false
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<(), ExecuteError> {
        match stmt {
            Stmt::Expression(expr) => self.resolve_expr(expr),
            Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::Var(name, initializer) => {
                self.declare(name)?;
                self.resolve_expr(initializer)?;
                self.define(&name.lexeme);
                Ok(())
            }
            Stmt::Block(stmts) => {
                self.push_scope();
                let result = stmts.iter().try_for_each(|s| self.resolve_stmt(s));
                self.pop_scope();
                result
            }
            Stmt::If(cond, then_branch, else_branch) => {
                self.resolve_expr(cond)?;
                self.resolve_stmt(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch)?;
                }
                Ok(())
            }
            Stmt::While(cond, body) => {
                self.resolve_expr(cond)?;
                self.resolve_stmt(body)
            }
            Stmt::Function(decl) => {
                self.define(&decl.name.lexeme);
                self.resolve_function(decl)
            }
            Stmt::Return(keyword, expr) => {
                if !self.in_function {
                    return Err(ExecuteError::new(
                        "Can't return from top-level code.",
                        keyword.clone(),
                    ));
                }
                self.resolve_expr(expr)
            }
        }
    }

    fn resolve_function(&mut self, decl: &Rc<FunctionDecl>) -> Result<(), ExecuteError> {
        let enclosing_in_function = self.in_function;
        self.in_function = true;
        self.push_scope();
        for param in &decl.params {
            self.define(&param.lexeme);
        }
        let result = decl.body.iter().try_for_each(|s| self.resolve_stmt(s));
        self.pop_scope();
        self.in_function = enclosing_in_function;
        result
    }

    fn resolve_expr(&mut self, expr: &Expr) -> Result<(), ExecuteError> {
        match expr {
            Expr::Literal(_) => Ok(()),
            Expr::Variable(name) => {
                if let Some(BindingState::Declared) = self.innermost().get(name.lexeme.as_str()) {
                    return Err(ExecuteError::new(
                        "Can't read local variable in its own initializer.",
                        (**name).clone(),
                    ));
                }
                let node_id = NodeId::of(name);
                if !self.resolve_local(node_id, &name.lexeme) {
                    return Err(ExecuteError::new(
                        format!("Undefined variable '{}'.", name.lexeme),
                        (**name).clone(),
                    ));
                }
                Ok(())
            }
            Expr::Assign(name, value) => {
                self.resolve_expr(value)?;
                let node_id = NodeId::of(name);
                if !self.resolve_local(node_id, &name.lexeme) {
                    return Err(ExecuteError::new(
                        format!("Undefined variable '{}'.", name.lexeme),
                        (**name).clone(),
                    ));
                }
                Ok(())
            }
            Expr::Unary(_, inner) => self.resolve_expr(inner),
            Expr::Binary(left, _, right) | Expr::Logical(left, _, right) => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)
            }
            Expr::Grouping(inner) => self.resolve_expr(inner),
            Expr::Call(callee, _, args) => {
                self.resolve_expr(callee)?;
                args.iter().try_for_each(|a| self.resolve_expr(a))
            }
        }
    }
}
