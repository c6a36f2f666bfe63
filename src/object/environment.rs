use crate::object::Object;
use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

/// Env is how environments are passed around: a function value and any number of active calls
/// may hold on to the same one.
pub type Env = Rc<RefCell<Environment>>;

/// Environment binds names to values in one scope, and defers to its enclosing scope for names
/// it doesn't know.
#[derive(Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns a fresh scope whose lookups fall back to `outer`.
    pub fn extend(outer: &Env) -> Self {
        Environment {
            store: HashMap::new(),
            outer: Some(Rc::clone(outer)),
        }
    }

    pub fn into_env(self) -> Env {
        Rc::new(RefCell::new(self))
    }

    /// Binds `key` in this scope only, replacing any existing binding here.
    pub fn set(&mut self, key: &str, value: Object) {
        self.store.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<Object> {
        match self.store.get(key) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(key)),
        }
    }
}

// Values can be closures over this environment, so only the names are shown.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut names: Vec<&String> = self.store.keys().collect();
        names.sort();

        f.debug_struct("Environment")
            .field("names", &names)
            .field("outer", &self.outer.as_ref().map(|outer| outer.borrow().store.len()))
            .finish()
    }
}
