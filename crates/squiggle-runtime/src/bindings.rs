use crate::library::{stdlib, Library};
use crate::value::Value;

/// Lexical scope: persistent local bindings layered over the shared standard library.
///
/// Cloning is O(1) and clones never observe each other's inserts, which is
/// what closures rely on when they capture their defining scope.
#[derive(Clone)]
pub struct Bindings {
    locals: im::HashMap<String, Value>,
    stdlib: &'static Library,
}

impl Bindings {
    pub fn new() -> Self {
        Self::with_library(stdlib())
    }

    pub fn with_library(stdlib: &'static Library) -> Self {
        Self { locals: im::HashMap::new(), stdlib }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.locals.get(name).or_else(|| self.stdlib.get(name)).cloned()
    }

    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    pub fn insert(&mut self, name: String, value: Value) {
        self.locals.insert(name, value);
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.locals.keys().collect();
        names.sort();
        f.debug_struct("Bindings").field("locals", &names).finish_non_exhaustive()
    }
}
