use super::generated_length;
use crate::error::RuntimeError;
use crate::registry::*;
use crate::value::Value;

const MAKER: FnFactory = FnFactory::new("List", true);

/// Largest integer an f64 holds exactly; past it `x + 1 == x`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn up_to(low: f64, high: f64) -> Result<Value, RuntimeError> {
    if low.fract() != 0.0 || high.fract() != 0.0 {
        return Err(RuntimeError::other("upTo requires integer bounds"));
    }
    if low.abs() > MAX_SAFE_INTEGER || high.abs() > MAX_SAFE_INTEGER {
        return Err(RuntimeError::other("upTo bounds must be safe integers"));
    }
    let count = generated_length((high - low + 1.0).max(0.0), "upTo length")?;
    let start = low as i64;
    Ok(Value::array((0..count as i64).map(|k| Value::Number((start + k) as f64)).collect()))
}

fn list_is_empty() -> RuntimeError {
    RuntimeError::other("List must not be empty")
}

pub fn library() -> Vec<FrFunction> {
    vec![
        MAKER.make(
            "length",
            vec![make_definition1(fr_array_any(), |xs, _| Ok(Value::Number(xs.len() as f64)))],
        ),
        MAKER.make(
            "map",
            vec![make_definition2(fr_array_any(), fr_lambda(), |xs, f, ctx| {
                let out = xs
                    .iter()
                    .map(|x| f.call(std::slice::from_ref(x), ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(out))
            })],
        ),
        MAKER.make(
            "filter",
            vec![make_definition2(fr_array_any(), fr_lambda(), |xs, f, ctx| {
                let mut out = Vec::new();
                for x in xs.iter() {
                    match f.call(std::slice::from_ref(x), ctx)? {
                        Value::Bool(true) => out.push(x.clone()),
                        Value::Bool(false) => {}
                        other => {
                            return Err(RuntimeError::ExpectedType {
                                expected: "Bool".into(),
                                found: other.type_name().into(),
                            })
                        }
                    }
                }
                Ok(Value::array(out))
            })],
        ),
        MAKER.make(
            "reduce",
            vec![make_definition3(fr_array_any(), fr_any(), fr_lambda(), |xs, init, f, ctx| {
                xs.iter().try_fold(init, |acc, x| f.call(&[acc, x.clone()], ctx))
            })],
        ),
        MAKER.make(
            "upTo",
            vec![make_definition2(fr_number(), fr_number(), |low, high, _| up_to(low, high))],
        ),
        MAKER.make(
            "first",
            vec![make_definition1(fr_array_any(), |xs, _| xs.first().cloned().ok_or_else(list_is_empty))],
        ),
        MAKER.make(
            "last",
            vec![make_definition1(fr_array_any(), |xs, _| xs.last().cloned().ok_or_else(list_is_empty))],
        ),
        MAKER.make(
            "reverse",
            vec![make_definition1(fr_array_any(), |xs, _| {
                Ok(Value::array(xs.iter().rev().cloned().collect()))
            })],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::{evaluate_string_to_result, result_to_string, Environment};

    fn eval(code: &str) -> String {
        result_to_string(&evaluate_string_to_result(code, Environment::default()))
    }

    #[test]
    fn higher_order_functions() {
        assert_eq!(eval("List.map([1, 2, 3], {|x| x * 2})"), "[2,4,6]");
        assert_eq!(eval("List.filter([1, 2, 3, 4], {|x| x > 2})"), "[3,4]");
        assert_eq!(eval("List.reduce([1, 2, 3], 10, {|acc, x| acc + x})"), "16");
        assert_eq!(eval("[1, 2] -> List.map({|x| x + 1})"), "[2,3]");
    }

    #[test]
    fn element_access() {
        assert_eq!(eval("List.upTo(1, 4)"), "[1,2,3,4]");
        assert_eq!(eval("List.first([7, 8])"), "7");
        assert_eq!(eval("List.last([7, 8])"), "8");
        assert_eq!(eval("List.reverse([1, 2])"), "[2,1]");
        assert_eq!(eval("List.first([])"), "Error(List must not be empty)");
    }

    #[test]
    fn up_to_bounds() {
        assert_eq!(eval("List.upTo(-2, 0)"), "[-2,-1,0]");
        assert_eq!(eval("List.upTo(3, 1)"), "[]");
        assert_eq!(eval("List.upTo(1.5, 3)"), "Error(upTo requires integer bounds)");
        assert_eq!(
            eval("List.length(List.upTo(1e16, 1e16 + 4))"),
            "Error(upTo bounds must be safe integers)"
        );
        assert_eq!(
            eval("List.upTo(0, 2e7)"),
            "Error(upTo length must be at most 10000000, got 20000001)"
        );
    }

    #[test]
    fn callback_errors_propagate_unchanged() {
        assert_eq!(eval("List.map([1], {|x| y})"), "Error(y is not defined)");
        assert_eq!(
            eval("List.filter([1], {|x| 1})"),
            "Error(Expected type: Bool but got: Number)"
        );
    }
}
