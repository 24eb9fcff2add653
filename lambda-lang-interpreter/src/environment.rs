use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Value;

#[derive(Debug, PartialEq)]
struct ScopeCore {
    store: HashMap<Rc<str>, Rc<Value>>,
    parent: Option<Environment>,
}

/// One link in the lexical scope chain. Cloning shares the underlying
/// scope, which is how closures keep their captured environment alive
/// after the call frame that created it has returned.
#[derive(Debug, PartialEq, Clone)]
pub struct Environment {
    scope: Rc<RefCell<ScopeCore>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scope: Rc::new(RefCell::new(ScopeCore {
                store: HashMap::new(),
                parent: None,
            })),
        }
    }

    /// A fresh child scope whose parent is this one.
    pub fn extend(&self) -> Environment {
        Environment {
            scope: Rc::new(RefCell::new(ScopeCore {
                store: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    pub fn get(&self, name: &str) -> Option<Rc<Value>> {
        let scope = self.scope.borrow();
        scope
            .store
            .get(name)
            .cloned()
            .or_else(|| scope.parent.as_ref().and_then(|parent| parent.get(name)))
    }

    /// Binds in this scope only, shadowing any ancestor binding.
    pub fn define(&self, name: Rc<str>, value: Rc<Value>) {
        self.scope.borrow_mut().store.insert(name, value);
    }

    /// Overwrites the binding in the nearest scope that already defines
    /// `name`. Returns `None` if no scope does, except that assignment on
    /// the root scope introduces the binding there, which is what lets
    /// top-level programs say `a = 1` without a separate declaration form.
    pub fn set(&self, name: &str, value: Rc<Value>) -> Option<Rc<Value>> {
        if let Some(owner) = self.lookup(name) {
            owner.scope.borrow_mut().store.insert(name.into(), value.clone());
            return Some(value);
        }
        if self.scope.borrow().parent.is_none() {
            self.define(name.into(), value.clone());
            return Some(value);
        }
        None
    }

    /// The nearest scope, this one included, that defines `name`.
    fn lookup(&self, name: &str) -> Option<Environment> {
        let scope = self.scope.borrow();
        if scope.store.contains_key(name) {
            Some(self.clone())
        } else {
            scope
                .parent
                .as_ref()
                .and_then(|parent| parent.lookup(name))
        }
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.scope, &other.scope)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Environment;
    use crate::object::Value;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("a".into(), Value::number(1.0));

        assert_eq!(env.get("a"), Some(Value::number(1.0)));
        assert_eq!(env.get("b"), None);
    }

    #[test]
    fn get_walks_the_chain() {
        let root = Environment::new();
        root.define("a".into(), Value::number(1.0));
        let child = root.extend();
        let grandchild = child.extend();

        assert_eq!(grandchild.get("a"), Some(Value::number(1.0)));
    }

    #[test]
    fn define_shadows_ancestors() {
        let root = Environment::new();
        root.define("a".into(), Value::number(1.0));
        let child = root.extend();
        child.define("a".into(), Value::number(2.0));

        assert_eq!(child.get("a"), Some(Value::number(2.0)));
        assert_eq!(root.get("a"), Some(Value::number(1.0)));
    }

    #[test]
    fn set_mutates_the_owning_scope() {
        let root = Environment::new();
        root.define("a".into(), Value::number(1.0));
        let child = root.extend();

        assert_eq!(child.set("a", Value::number(2.0)), Some(Value::number(2.0)));
        assert_eq!(root.get("a"), Some(Value::number(2.0)));
        // nothing was defined locally
        let scope = child.scope.borrow();
        assert!(scope.store.is_empty());
    }

    #[test]
    fn set_fails_for_undefined_names_in_child_scopes() {
        let root = Environment::new();
        let child = root.extend();

        assert_eq!(child.set("a", Value::number(1.0)), None);
        assert_eq!(root.get("a"), None);
    }

    #[test]
    fn set_on_the_root_scope_defines() {
        let root = Environment::new();

        assert_eq!(root.set("a", Value::number(1.0)), Some(Value::number(1.0)));
        assert_eq!(root.get("a"), Some(Value::number(1.0)));
    }
}
