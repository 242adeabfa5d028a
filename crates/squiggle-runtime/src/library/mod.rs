//! The standard library: every builtin, keyed by the names code can refer to it by.

mod base;
mod date;
mod dict;
mod dist;
mod list;
mod mixture;
mod number;
mod plot;
mod relative_values;
mod scale;
mod table;

use crate::context::MAX_GENERATED_LENGTH;
use crate::error::RuntimeError;
use crate::registry::FrFunction;
use crate::value::{format_number, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

pub type Library = HashMap<String, Value>;

fn all_functions() -> Vec<FrFunction> {
    let mut fns = Vec::new();
    fns.extend(base::library());
    fns.extend(number::library());
    fns.extend(dist::library());
    fns.extend(mixture::library());
    fns.extend(list::library());
    fns.extend(dict::library());
    fns.extend(scale::library());
    fns.extend(plot::library());
    fns.extend(relative_values::library());
    fns.extend(table::library());
    fns.extend(date::library());
    fns
}

fn constants() -> Vec<(&'static str, Value)> {
    vec![
        ("Math.pi", Value::Number(std::f64::consts::PI)),
        ("Math.e", Value::Number(std::f64::consts::E)),
        ("Math.phi", Value::Number(1.618_033_988_749_895)),
    ]
}

/// Check a user-supplied element count before anything is allocated for it.
fn generated_length(n: f64, what: &str) -> Result<usize, RuntimeError> {
    if n < 0.0 || n.fract() != 0.0 || !n.is_finite() {
        return Err(RuntimeError::other(format!(
            "{} must be a non-negative integer, got {}",
            what,
            format_number(n)
        )));
    }
    if n > MAX_GENERATED_LENGTH as f64 {
        return Err(RuntimeError::other(format!(
            "{} must be at most {}, got {}",
            what,
            MAX_GENERATED_LENGTH,
            format_number(n)
        )));
    }
    Ok(n as usize)
}

/// Earlier registrations win when two functions claim the same name.
pub fn build_library() -> Library {
    let mut lib = Library::new();
    for f in all_functions() {
        for key in f.keys() {
            lib.entry(key).or_insert_with(|| Value::Lambda(f.lambda.clone()));
        }
    }
    for (name, value) in constants() {
        lib.entry(name.to_string()).or_insert(value);
    }
    debug!(entries = lib.len(), "standard library built");
    lib
}

/// Process-wide standard library, built on first use and never mutated.
pub fn stdlib() -> &'static Library {
    static LIBRARY: OnceLock<Library> = OnceLock::new();
    LIBRARY.get_or_init(build_library)
}
