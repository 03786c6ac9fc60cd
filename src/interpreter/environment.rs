// File: src/interpreter/environment.rs
//
// Lexical scoping environment for variable management in the SynthFlow
// interpreter. Environments form a parent-linked chain of reference-counted
// nodes: lookup walks outward from the innermost scope, and a closure keeps
// its declaring environment alive for as long as the function value exists.

use super::value::Value;
use crate::errors::SynthFlowError;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Shared handle to an environment node. Child scopes and closures hold
/// the same node, so a mutation through one handle is visible to all.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One scope: its bindings, the names declared const in it, and a link
/// to the enclosing scope
#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Value>,
    consts: HashSet<String>,
    parent: Option<EnvRef>,
}

impl Environment {
    /// Create a root environment (the global scope)
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            consts: HashSet::new(),
            parent: None,
        }))
    }

    /// Create a child environment chained to `parent`
    pub fn with_parent(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            consts: HashSet::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Bind a name in this scope, shadowing any outer binding.
    /// Re-defining a name clears a previous const marking.
    pub fn define(&mut self, name: String, value: Value) {
        self.consts.remove(&name);
        self.values.insert(name, value);
    }

    /// Bind a name in this scope and mark it immutable
    pub fn define_const(&mut self, name: String, value: Value) {
        self.values.insert(name.clone(), value);
        self.consts.insert(name);
    }

    /// Look a name up through the scope chain
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            return Some(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.borrow().get(name),
            None => None,
        }
    }

    /// Mutate the nearest binding that owns `name`. Fails if the name is
    /// unbound anywhere in the chain or if the owning binding is const.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), SynthFlowError> {
        if self.values.contains_key(name) {
            if self.consts.contains(name) {
                return Err(SynthFlowError::runtime_error(format!(
                    "Cannot reassign const variable '{}'",
                    name
                )));
            }
            self.values.insert(name.to_string(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(SynthFlowError::undefined_variable(name)),
        }
    }

    /// True if the name is bound anywhere in the chain
    pub fn exists(&self, name: &str) -> bool {
        if self.values.contains_key(name) {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.borrow().exists(name),
            None => false,
        }
    }

    /// Names bound directly in this scope, for the REPL's :vars command
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.sort();
        names
    }
}
