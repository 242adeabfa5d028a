//! Squiggle runtime: values, distributions, the standard library and the reducer.

pub mod bindings;
pub mod context;
pub mod dist;
pub mod error;
pub mod evaluator;
pub mod lambda;
pub mod library;
pub mod reducer;
pub mod registry;
pub mod value;

pub use bindings::Bindings;
pub use context::{Environment, ReducerContext};
pub use error::{RuntimeError, SquiggleError};
pub use evaluator::{ComparisonCacheRow, ModelEvaluator, RelativeValue};
pub use lambda::Lambda;
pub use value::{Value, ValueMap};

use squiggle_expr::{Expression, Op};
use tracing::debug;

/// Final value of a program plus its top-level bindings in definition order.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub result: Value,
    pub bindings: ValueMap,
}

/// Parse and lower source text to the expression IR.
pub fn compile(code: &str) -> Result<Expression, SquiggleError> {
    let program = squiggle_parser::parse_program(code)?;
    Ok(squiggle_expr::compile_program(&program)?)
}

pub fn run(code: &str, environment: Environment) -> Result<RunOutput, SquiggleError> {
    debug!(sample_count = environment.sample_count, seed = ?environment.seed, "evaluating program");
    let expression = compile(code)?;
    let mut ctx = ReducerContext::new(environment);
    let result = reducer::evaluate(&expression, &mut ctx)?;
    let mut bindings = ValueMap::new();
    if let Op::Program { statements, .. } = &expression.op {
        for s in statements {
            if let Op::Assign { left, .. } = &s.op {
                if let Some(v) = ctx.bindings.local(left) {
                    // Rebinding keeps the first position with the last value
                    bindings.insert(left.clone(), v.clone());
                }
            }
        }
    }
    Ok(RunOutput { result, bindings })
}

pub fn evaluate_string_to_result(code: &str, environment: Environment) -> Result<Value, SquiggleError> {
    run(code, environment).map(|out| out.result)
}

/// `Error(message)` for failures, the value's display form otherwise.
pub fn result_to_string(result: &Result<Value, SquiggleError>) -> String {
    match result {
        Ok(v) => v.to_string(),
        Err(e) => format!("Error({})", e),
    }
}

/// Call a function value outside of any program, in a fresh context.
pub fn call_lambda(f: &Lambda, args: &[Value], environment: Environment) -> Result<Value, RuntimeError> {
    let mut ctx = ReducerContext::new(environment);
    f.call(args, &mut ctx)
}

pub fn get(value: &Value, key: &Value) -> Result<Value, RuntimeError> {
    value.get(key)
}

/// A standard library function by its fully qualified or bare name.
pub fn lambda_from_stdlib(name: &str) -> Option<Lambda> {
    match library::stdlib().get(name) {
        Some(Value::Lambda(l)) => Some(l.clone()),
        _ => None,
    }
}
