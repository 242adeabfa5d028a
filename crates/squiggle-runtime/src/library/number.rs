use crate::error::RuntimeError;
use crate::registry::*;
use crate::value::{Domain, Value};

const MAKER: FnFactory = FnFactory::new("Number", false);

fn unary(name: &'static str, f: fn(f64) -> f64) -> FrFunction {
    MAKER.make(name, vec![make_definition1(fr_number(), move |x, _| Ok(Value::Number(f(x))))])
}

fn non_empty(xs: &[f64]) -> Result<(), RuntimeError> {
    if xs.is_empty() {
        return Err(RuntimeError::other("List must not be empty"));
    }
    Ok(())
}

fn extremum(name: &'static str, pick: fn(f64, f64) -> f64) -> FrFunction {
    MAKER.make(
        name,
        vec![
            make_definition2(fr_number(), fr_number(), move |a, b, _| Ok(Value::Number(pick(a, b)))),
            make_definition1(fr_array(fr_number()), move |xs, _| {
                non_empty(&xs)?;
                Ok(Value::Number(xs.into_iter().reduce(pick).unwrap_or(f64::NAN)))
            }),
        ],
    )
}

pub fn library() -> Vec<FrFunction> {
    vec![
        unary("floor", f64::floor),
        unary("ceil", f64::ceil),
        // halves round towards positive infinity
        unary("round", |x| (x + 0.5).floor()),
        unary("abs", f64::abs),
        unary("sqrt", f64::sqrt),
        unary("exp", f64::exp),
        unary("log", f64::ln),
        unary("log10", f64::log10),
        extremum("min", f64::min),
        extremum("max", f64::max),
        MAKER.make(
            "sum",
            vec![make_definition1(fr_array(fr_number()), |xs, _| Ok(Value::Number(xs.iter().sum())))],
        ),
        MAKER.make(
            "product",
            vec![make_definition1(fr_array(fr_number()), |xs, _| {
                Ok(Value::Number(xs.iter().product()))
            })],
        ),
        MAKER.make(
            "rangeDomain",
            vec![make_definition1(
                fr_dict2(("min", fr_number()), ("max", fr_number())),
                |(min, max), _| Ok(Value::Domain(Domain::numeric_range(min, max)?)),
            )],
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
    fn rounding_and_bare_names() {
        assert_eq!(eval("round(2.5)"), "3");
        assert_eq!(eval("Number.round(-2.5)"), "-2");
        assert_eq!(eval("floor(2.7) + ceil(2.1)"), "5");
    }

    #[test]
    fn list_reductions() {
        assert_eq!(eval("sum([1, 2, 3])"), "6");
        assert_eq!(eval("product([2, 3])"), "6");
        assert_eq!(eval("max([1, 5, 3])"), "5");
        assert_eq!(eval("min(4, 2)"), "2");
        assert_eq!(eval("max([])"), "Error(List must not be empty)");
    }

    #[test]
    fn range_domain_validates_bounds() {
        assert_eq!(eval("Number.rangeDomain({min: 3, max: 5})"), "Number.rangeDomain({ min: 3, max: 5 })");
        assert!(eval("Number.rangeDomain({min: 5, max: 3})").starts_with("Error("));
        assert_eq!(eval("Math.pi > 3.14"), "true");
    }
}
