use crate::{
    JSError,
    core::{DeclKind, Value},
    raise_eval_error, raise_reference_error, raise_type_error,
};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    kind: DeclKind,
}

struct Scope {
    vars: RefCell<IndexMap<String, Binding>>,
    parent: Option<Environment>,
}

/// A lexical scope: identifier bindings plus a link to the enclosing scope.
///
/// Cloning an `Environment` shares the scope. Lookups walk the parent chain
/// and never modify it; a binding is only ever written in the scope that
/// declared it.
#[derive(Clone)]
pub struct Environment(Rc<Scope>);

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.names())
            .field("depth", &self.depth())
            .finish()
    }
}

impl Environment {
    /// An empty root scope.
    pub fn new() -> Self {
        Environment(Rc::new(Scope {
            vars: RefCell::new(IndexMap::new()),
            parent: None,
        }))
    }

    /// A new scope nested inside this one.
    pub fn child(&self) -> Self {
        Environment(Rc::new(Scope {
            vars: RefCell::new(IndexMap::new()),
            parent: Some(self.clone()),
        }))
    }

    pub fn parent(&self) -> Option<&Environment> {
        self.0.parent.as_ref()
    }

    /// Number of enclosing scopes above this one.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(env) = current {
            depth += 1;
            current = env.parent();
        }
        depth
    }

    /// Pre-bind `name` in this scope, replacing any previous binding here.
    pub fn define(&self, name: impl Into<String>, value: Value) -> &Self {
        self.0.vars.borrow_mut().insert(name.into(), Binding { value, kind: DeclKind::Var });
        self
    }

    /// Declare a binding the way `let`/`const`/`var` does. Re-declaring a
    /// lexical binding in the same scope is an error; `var` may repeat.
    pub(crate) fn declare(&self, name: &str, value: Value, kind: DeclKind) -> Result<(), JSError> {
        let mut vars = self.0.vars.borrow_mut();
        if let Some(existing) = vars.get(name)
            && (existing.kind != DeclKind::Var || kind != DeclKind::Var)
        {
            return Err(raise_eval_error!(format!("SyntaxError: Identifier '{name}' has already been declared")));
        }
        vars.insert(name.to_string(), Binding { value, kind });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let mut current = Some(self);
        while let Some(env) = current {
            if let Some(binding) = env.0.vars.borrow().get(name) {
                return Some(binding.value.clone());
            }
            current = env.parent();
        }
        None
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Update an existing binding in the scope that declared it.
    pub(crate) fn assign(&self, name: &str, value: Value) -> Result<(), JSError> {
        let mut current = Some(self);
        while let Some(env) = current {
            if let Some(binding) = env.0.vars.borrow_mut().get_mut(name) {
                if binding.kind == DeclKind::Const {
                    return Err(raise_type_error!("Assignment to constant variable."));
                }
                binding.value = value;
                return Ok(());
            }
            current = env.parent();
        }
        Err(raise_reference_error!(name))
    }

    /// Names bound directly in this scope, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.0.vars.borrow().keys().cloned().collect()
    }
}
