//! Operators and the other un-namespaced builtins the compiler lowers syntax to.

use crate::context::ReducerContext;
use crate::dist::{algebraic, AlgebraicOp};
use crate::error::RuntimeError;
use crate::registry::*;
use crate::value::Value;
use chrono::{DateTime, TimeDelta, Utc};
use squiggle_expr::INDEX_LOOKUP_FN;
use std::cmp::Ordering;

const MAKER: FnFactory = FnFactory::new("", false);

fn dist_algebra(
    op: AlgebraicOp,
    a: DistOrNumber,
    b: DistOrNumber,
    ctx: &mut ReducerContext,
) -> Result<Value, RuntimeError> {
    let (a, b) = (a.into_dist()?, b.into_dist()?);
    let n = ctx.sample_count();
    Ok(Value::Dist(algebraic(op, &a, &b, n, &mut ctx.rng)?))
}

fn numbers(f: fn(f64, f64) -> f64) -> FnDefinition {
    make_definition2(fr_number(), fr_number(), move |a, b, _| Ok(Value::Number(f(a, b))))
}

// Only reached when at least one side is a distribution
fn dists(op: AlgebraicOp) -> FnDefinition {
    make_definition2(fr_dist_or_number(), fr_dist_or_number(), move |a, b, ctx| {
        dist_algebra(op, a, b, ctx)
    })
}

fn shift_date(d: DateTime<Utc>, ms: f64) -> Result<Value, RuntimeError> {
    TimeDelta::try_milliseconds(ms.round() as i64)
        .and_then(|delta| d.checked_add_signed(delta))
        .map(Value::Date)
        .ok_or_else(|| RuntimeError::other("Date is out of range"))
}

fn comparison(test: fn(Ordering) -> bool) -> Vec<FnDefinition> {
    vec![
        make_definition2(fr_number(), fr_number(), move |a, b, _| {
            Ok(Value::Bool(a.partial_cmp(&b).map_or(false, test)))
        }),
        make_definition2(fr_string(), fr_string(), move |a, b, _| Ok(Value::Bool(test(a.cmp(&b))))),
        make_definition2(fr_date(), fr_date(), move |a, b, _| Ok(Value::Bool(test(a.cmp(&b))))),
        make_definition2(fr_duration(), fr_duration(), move |a, b, _| {
            Ok(Value::Bool(a.partial_cmp(&b).map_or(false, test)))
        }),
    ]
}

fn logical(f: fn(bool, bool) -> bool) -> Vec<FnDefinition> {
    vec![make_definition2(fr_bool(), fr_bool(), move |a, b, _| Ok(Value::Bool(f(a, b))))]
}

pub fn library() -> Vec<FrFunction> {
    vec![
        MAKER.make(
            "add",
            vec![
                numbers(|a, b| a + b),
                make_definition2(fr_string(), fr_string(), |a, b, _| Ok(Value::String(a + &b))),
                make_definition2(fr_date(), fr_duration(), |d, ms, _| shift_date(d, ms)),
                make_definition2(fr_duration(), fr_date(), |ms, d, _| shift_date(d, ms)),
                make_definition2(fr_duration(), fr_duration(), |a, b, _| Ok(Value::Duration(a + b))),
                dists(AlgebraicOp::Add),
            ],
        ),
        MAKER.make(
            "subtract",
            vec![
                numbers(|a, b| a - b),
                make_definition2(fr_date(), fr_date(), |a, b, _| {
                    Ok(Value::Duration((a - b).num_milliseconds() as f64))
                }),
                make_definition2(fr_date(), fr_duration(), |d, ms, _| shift_date(d, -ms)),
                make_definition2(fr_duration(), fr_duration(), |a, b, _| Ok(Value::Duration(a - b))),
                dists(AlgebraicOp::Subtract),
            ],
        ),
        MAKER.make(
            "multiply",
            vec![
                numbers(|a, b| a * b),
                make_definition2(fr_duration(), fr_number(), |a, b, _| Ok(Value::Duration(a * b))),
                make_definition2(fr_number(), fr_duration(), |a, b, _| Ok(Value::Duration(a * b))),
                dists(AlgebraicOp::Multiply),
            ],
        ),
        MAKER.make(
            "divide",
            vec![
                numbers(|a, b| a / b),
                make_definition2(fr_duration(), fr_number(), |a, b, _| Ok(Value::Duration(a / b))),
                make_definition2(fr_duration(), fr_duration(), |a, b, _| Ok(Value::Number(a / b))),
                dists(AlgebraicOp::Divide),
            ],
        ),
        MAKER.make("pow", vec![numbers(f64::powf), dists(AlgebraicOp::Power)]),
        MAKER.make(
            "unaryMinus",
            vec![
                make_definition1(fr_number(), |x, _| Ok(Value::Number(-x))),
                make_definition1(fr_duration(), |x, _| Ok(Value::Duration(-x))),
                make_definition1(fr_dist(), |d, ctx| {
                    dist_algebra(
                        AlgebraicOp::Multiply,
                        DistOrNumber::Dist(d),
                        DistOrNumber::Number(-1.0),
                        ctx,
                    )
                }),
            ],
        ),
        MAKER.make("not", vec![make_definition1(fr_bool(), |b, _| Ok(Value::Bool(!b)))]),
        MAKER.make("and", logical(|a, b| a && b)),
        MAKER.make("or", logical(|a, b| a || b)),
        MAKER.make(
            "equal",
            vec![make_definition2(fr_any(), fr_any(), |a, b, _| Ok(Value::Bool(a.is_equal(&b))))],
        ),
        MAKER.make(
            "unequal",
            vec![make_definition2(fr_any(), fr_any(), |a, b, _| Ok(Value::Bool(!a.is_equal(&b))))],
        ),
        MAKER.make("smaller", comparison(|o| o == Ordering::Less)),
        MAKER.make("smallerEq", comparison(|o| o != Ordering::Greater)),
        MAKER.make("larger", comparison(|o| o == Ordering::Greater)),
        MAKER.make("largerEq", comparison(|o| o != Ordering::Less)),
        MAKER.make(
            "concat",
            vec![
                make_definition2(fr_string(), fr_string(), |a, b, _| Ok(Value::String(a + &b))),
                make_definition2(fr_array_any(), fr_array_any(), |a, b, _| {
                    let mut out = Vec::with_capacity(a.len() + b.len());
                    out.extend(a.iter().cloned());
                    out.extend(b.iter().cloned());
                    Ok(Value::array(out))
                }),
            ],
        ),
        MAKER.make(
            INDEX_LOOKUP_FN,
            vec![make_definition2(fr_any(), fr_any(), |target, key, _| target.get(&key))],
        ),
        MAKER.make(
            "typeOf",
            vec![make_definition1(fr_any(), |v, _| Ok(Value::string(v.type_name())))],
        ),
        MAKER.make(
            "toString",
            vec![
                make_definition1(fr_string(), |s, _| Ok(Value::String(s))),
                make_definition1(fr_any(), |v, _| Ok(Value::String(v.to_string()))),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::{evaluate_string_to_result, result_to_string, Environment};

    fn eval(code: &str) -> String {
        let env = Environment { seed: Some(1), sample_count: 100, ..Environment::default() };
        result_to_string(&evaluate_string_to_result(code, env))
    }

    #[test]
    fn arithmetic_on_numbers_and_strings() {
        assert_eq!(eval("1 + 2 * 3"), "7");
        assert_eq!(eval("2 ^ 10"), "1024");
        assert_eq!(eval("\"a\" + \"b\""), "\"ab\"");
        assert_eq!(eval("-(3)"), "-3");
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(eval("1 < 2 && 3 >= 3"), "true");
        assert_eq!(eval("\"a\" < \"b\""), "true");
        assert_eq!(eval("!(1 == 1) || false"), "false");
        assert_eq!(eval("[1, {a: 2}] == [1, {a: 2}]"), "true");
        assert_eq!(eval("1 != 2"), "true");
    }

    #[test]
    fn mismatched_operands_list_overloads() {
        let out = eval("true + 1");
        assert!(out.starts_with("Error(There are function matches for add()"), "{}", out);
        assert!(out.contains("add(number, number)"), "{}", out);
    }

    #[test]
    fn normal_plus_constant_stays_symbolic() {
        assert_eq!(eval("normal(5, 2) + 3"), "Normal(8,2)");
        assert_eq!(eval("-normal(5, 2)"), "Normal(-5,2)");
    }

    #[test]
    fn type_and_string_helpers() {
        assert_eq!(eval("typeOf([1])"), "\"Array\"");
        assert_eq!(eval("toString(1.5)"), "\"1.5\"");
        assert_eq!(eval("toString(\"x\")"), "\"x\"");
        assert_eq!(eval("concat([1], [2, 3])"), "[1,2,3]");
    }
}
