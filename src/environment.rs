//! Lexically scoped environment chain.
//!
//! Each link is reference-counted so a closure and the call stack that
//! created it can share ownership of the same scope node; a scope survives
//! only as long as something — a still-executing block, or a function value
//! that captured it — holds an `Rc` to it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::NodeId;
use crate::resolver::Bindings;
use crate::token::Token;
use crate::value::Value;

struct EnvironmentData {
    enclosing: Option<Environment>,
    locals: HashMap<String, Value>,
}

/// A scope in the chain. Cheap to clone (an `Rc` bump).
#[derive(Clone)]
pub struct Environment(Rc<RefCell<EnvironmentData>>);

impl Environment {
    pub fn new_global() -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentData {
            enclosing: None,
            locals: HashMap::new(),
        })))
    }

    pub fn new_enclosed(enclosing: &Environment) -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentData {
            enclosing: Some(enclosing.clone()),
            locals: HashMap::new(),
        })))
    }

    /// Defines `name` in *this* scope only. Redefinition is permitted — used
    /// for installing `clock` in the root scope and for re-running
    /// top-level `var` declarations across REPL lines.
    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().locals.insert(name.to_string(), value);
    }

    fn ancestor(&self, distance: usize) -> Environment {
        let mut env = self.clone();
        for _ in 0..distance {
            let next = env
                .0
                .borrow()
                .enclosing
                .clone()
                .expect("resolved distance must not exceed the environment chain");
            env = next;
        }
        env
    }

    /// Looks up a bindable's value using the resolver's recorded depth.
    /// Absence at the resolved scope is an internal-invariant violation: the
    /// resolver guarantees presence for any node that parsed successfully.
    pub fn get(&self, bindings: &Bindings, node_id: NodeId, token: &Token) -> Value {
        let depth = bindings
            .distance(node_id)
            .expect("resolver must have recorded a depth for every bindable node");
        self.ancestor(depth)
            .0
            .borrow()
            .locals
            .get(&token.lexeme)
            .cloned()
            .unwrap_or_else(|| unreachable!("resolved scope must contain '{}'", token.lexeme))
    }

    pub fn assign(&self, bindings: &Bindings, node_id: NodeId, token: &Token, value: Value) {
        let depth = bindings
            .distance(node_id)
            .expect("resolver must have recorded a depth for every bindable node");
        let scope = self.ancestor(depth);
        let mut data = scope.0.borrow_mut();
        data.locals
            .insert(token.lexeme.clone(), value)
            .unwrap_or_else(|| unreachable!("resolved scope must already contain '{}'", token.lexeme));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Bindings;
    use crate::token::TokenKind;

    fn token(lexeme: &str) -> Token {
        Token::new(TokenKind::Identifier, lexeme, None, 1, 1)
    }

    #[test]
    fn define_and_get_in_same_scope() {
        let global = Environment::new_global();
        global.define("x", Value::Number(1.0));
        let mut bindings = Bindings::new();
        let t = Rc::new(token("x"));
        let node_id = NodeId::of(&t);
        bindings.record(node_id, 0);
        match global.get(&bindings, node_id, &t) {
            Value::Number(n) => assert_eq!(n, 1.0),
            _ => panic!("expected number"),
        }
    }

    #[test]
    fn get_walks_up_the_chain() {
        let global = Environment::new_global();
        global.define("x", Value::Number(1.0));
        let inner = Environment::new_enclosed(&global);
        let mut bindings = Bindings::new();
        let t = Rc::new(token("x"));
        let node_id = NodeId::of(&t);
        bindings.record(node_id, 1);
        match inner.get(&bindings, node_id, &t) {
            Value::Number(n) => assert_eq!(n, 1.0),
            _ => panic!("expected number"),
        }
    }

    #[test]
    fn assign_mutates_the_resolved_scope() {
        let global = Environment::new_global();
        global.define("x", Value::Number(1.0));
        let mut bindings = Bindings::new();
        let t = Rc::new(token("x"));
        let node_id = NodeId::of(&t);
        bindings.record(node_id, 0);
        global.assign(&bindings, node_id, &t, Value::Number(2.0));
        match global.get(&bindings, node_id, &t) {
            Value::Number(n) => assert_eq!(n, 2.0),
            _ => panic!("expected number"),
        }
    }
}
