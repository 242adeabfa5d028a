//! `mx` / `mixture`: argument shapes too irregular for fixed-arity overloads.

use crate::context::ReducerContext;
use crate::dist::{self, Dist, DistError};
use crate::error::RuntimeError;
use crate::registry::{FnFactory, FrFunction};
use crate::value::Value;

const MAKER: FnFactory = FnFactory::new("Dist", false);

fn argument_error(msg: &str) -> RuntimeError {
    DistError::Argument(msg.to_string()).into()
}

fn parse_dist(v: &Value) -> Result<Dist, RuntimeError> {
    match v {
        Value::Dist(d) => Ok(d.clone()),
        Value::Number(x) => Ok(Dist::point_mass(*x)?),
        _ => Err(argument_error("Not a distribution")),
    }
}

fn parse_weight(v: &Value) -> Result<f64, RuntimeError> {
    match v {
        Value::Number(x) => Ok(*x),
        _ => Err(argument_error("Not a number")),
    }
}

fn with_weights(dists: Vec<Dist>, weights: Vec<f64>) -> Result<Value, RuntimeError> {
    if dists.len() != weights.len() {
        return Err(argument_error(
            "Error, mixture call has different number of distributions and weights",
        ));
    }
    Ok(Value::Dist(dist::mixture(dists.into_iter().zip(weights).collect())?))
}

fn with_uniform_weights(dists: Vec<Dist>) -> Result<Value, RuntimeError> {
    let weights = vec![1.0 / dists.len() as f64; dists.len()];
    with_weights(dists, weights)
}

fn parse_all<T>(items: &[Value], f: fn(&Value) -> Result<T, RuntimeError>) -> Result<Vec<T>, RuntimeError> {
    items.iter().map(f).collect()
}

pub fn mixture(args: &[Value], _ctx: &mut ReducerContext) -> Result<Value, RuntimeError> {
    match args {
        [Value::Array(dists)] => with_uniform_weights(parse_all(dists, parse_dist)?),
        [Value::Array(dists), Value::Array(weights)] => {
            with_weights(parse_all(dists, parse_dist)?, parse_all(weights, parse_weight)?)
        }
        [init @ .., Value::Array(weights)] => {
            with_weights(parse_all(init, parse_dist)?, parse_all(weights, parse_weight)?)
        }
        [_, ..] if matches!(args.last(), Some(Value::Number(_) | Value::Dist(_))) => {
            with_uniform_weights(parse_all(args, parse_dist)?)
        }
        _ => Err(argument_error("Last argument of mx must be array or distribution")),
    }
}

pub fn library() -> Vec<FrFunction> {
    vec![MAKER.variadic("mx", mixture), MAKER.variadic("mixture", mixture)]
}

#[cfg(test)]
mod tests {
    use crate::{evaluate_string_to_result, result_to_string, Environment};

    fn eval(code: &str) -> String {
        result_to_string(&evaluate_string_to_result(code, Environment::default()))
    }

    #[test]
    fn positional_arguments_get_uniform_weights() {
        assert_eq!(eval("mx(1, normal(0, 1))"), "Mixture(PointMass(1): 0.5, Normal(0,1): 0.5)");
    }

    #[test]
    fn explicit_weights_are_normalised() {
        assert_eq!(
            eval("mx([pointMass(1), pointMass(2)], [1, 3])"),
            "Mixture(PointMass(1): 0.25, PointMass(2): 0.75)"
        );
        assert_eq!(
            eval("mx(pointMass(1), pointMass(2), [1, 3])"),
            "Mixture(PointMass(1): 0.25, PointMass(2): 0.75)"
        );
        assert_eq!(eval("mean(mixture([1, 5]))"), "3");
    }

    #[test]
    fn mismatched_counts_fail() {
        assert_eq!(
            eval("mx([normal(0, 1), normal(1, 1)], [1])"),
            "Error(Distribution Math Error: Argument Error: Error, mixture call has different number of distributions and weights)"
        );
        assert_eq!(
            eval("mx(normal(0, 1), \"a\")"),
            "Error(Distribution Math Error: Argument Error: Last argument of mx must be array or distribution)"
        );
    }
}
