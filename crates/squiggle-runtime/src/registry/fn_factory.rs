use super::fn_definition::FnDefinition;
use crate::lambda::{BuiltinBody, Lambda, VariadicFn};

/// A named builtin ready to be registered in the library.
#[derive(Debug, Clone)]
pub struct FrFunction {
    pub namespace: &'static str,
    pub name: &'static str,
    pub requires_namespace: bool,
    pub lambda: Lambda,
}

impl FrFunction {
    /// Names the function is reachable under.
    pub fn keys(&self) -> Vec<String> {
        if self.namespace.is_empty() {
            return vec![self.name.to_string()];
        }
        let mut keys = vec![format!("{}.{}", self.namespace, self.name)];
        if !self.requires_namespace {
            keys.push(self.name.to_string());
        }
        keys
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FnFactory {
    pub namespace: &'static str,
    pub requires_namespace: bool,
}

impl FnFactory {
    pub const fn new(namespace: &'static str, requires_namespace: bool) -> Self {
        Self { namespace, requires_namespace }
    }

    fn display_name(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.namespace, name)
        }
    }

    fn build(&self, name: &'static str, body: BuiltinBody) -> FrFunction {
        FrFunction {
            namespace: self.namespace,
            name,
            requires_namespace: self.requires_namespace,
            lambda: Lambda::builtin(self.display_name(name), body),
        }
    }

    /// Overloads are tried in the order given.
    pub fn make(&self, name: &'static str, definitions: Vec<FnDefinition>) -> FrFunction {
        self.build(name, BuiltinBody::Definitions(definitions))
    }

    pub fn variadic(&self, name: &'static str, f: VariadicFn) -> FrFunction {
        self.build(name, BuiltinBody::Variadic(f))
    }
}
