//! Typed builtin definitions: argument descriptors, overloads, and namespaced factories.

pub mod fn_definition;
pub mod fn_factory;
pub mod fr_types;

pub use fn_definition::{
    make_definition0, make_definition1, make_definition2, make_definition3, make_definition4,
    FnDefinition,
};
pub use fn_factory::{FnFactory, FrFunction};
pub use fr_types::*;
