use crate::error::RuntimeError;
use crate::registry::*;
use crate::value::{format_number, Scale, ScaleKind, Value};

const MAKER: FnFactory = FnFactory::new("Scale", true);

type OptNumber = FrOptional<FrNumber>;
type OptString = FrOptional<FrString>;

fn check_min_max(min: Option<f64>, max: Option<f64>) -> Result<(), RuntimeError> {
    if let (Some(min), Some(max)) = (min, max) {
        if max <= min {
            return Err(RuntimeError::other(format!(
                "Max must be greater than min, got: min={}, max={}",
                format_number(min),
                format_number(max)
            )));
        }
    }
    Ok(())
}

fn scale(kind: ScaleKind, min: Option<f64>, max: Option<f64>, tick_format: Option<String>) -> Value {
    Value::Scale(Scale { kind, min, max, tick_format })
}

fn nullary(kind: ScaleKind) -> FnDefinition {
    make_definition0(move |_| Ok(scale(kind.clone(), None, None, None)))
}

fn bounds() -> FrDict3<OptNumber, OptNumber, OptString> {
    fr_dict3(
        ("min", fr_optional(fr_number())),
        ("max", fr_optional(fr_number())),
        ("tickFormat", fr_optional(fr_string())),
    )
}

/// Common bounds plus one scale-specific number.
fn bounds_and(extra: &'static str) -> FrDict4<OptNumber, OptNumber, OptString, OptNumber> {
    fr_dict4(
        ("min", fr_optional(fr_number())),
        ("max", fr_optional(fr_number())),
        ("tickFormat", fr_optional(fr_string())),
        (extra, fr_optional(fr_number())),
    )
}

pub fn library() -> Vec<FrFunction> {
    vec![
        MAKER.make(
            "linear",
            vec![
                make_definition1(bounds(), |(min, max, tick_format), _| {
                    check_min_max(min, max)?;
                    Ok(scale(ScaleKind::Linear, min, max, tick_format))
                }),
                nullary(ScaleKind::Linear),
            ],
        ),
        MAKER.make(
            "log",
            vec![
                make_definition1(bounds(), |(min, max, tick_format), _| {
                    if let Some(min) = min.filter(|m| *m <= 0.0) {
                        return Err(RuntimeError::other(format!(
                            "Min must be over 0 for log scale, got: {}",
                            format_number(min)
                        )));
                    }
                    check_min_max(min, max)?;
                    Ok(scale(ScaleKind::Log, min, max, tick_format))
                }),
                nullary(ScaleKind::Log),
            ],
        ),
        MAKER.make(
            "symlog",
            vec![
                make_definition1(bounds_and("constant"), |(min, max, tick_format, constant), _| {
                    check_min_max(min, max)?;
                    if constant == Some(0.0) {
                        return Err(RuntimeError::other("Symlog scale constant cannot be 0."));
                    }
                    Ok(scale(ScaleKind::Symlog { constant }, min, max, tick_format))
                }),
                nullary(ScaleKind::Symlog { constant: None }),
            ],
        ),
        MAKER.make(
            "power",
            vec![
                make_definition1(bounds_and("exponent"), |(min, max, tick_format, exponent), _| {
                    check_min_max(min, max)?;
                    if exponent.is_some_and(|e| e <= 0.0) {
                        return Err(RuntimeError::other("Power Scale exponent must be over 0."));
                    }
                    Ok(scale(ScaleKind::Power { exponent }, min, max, tick_format))
                }),
                nullary(ScaleKind::Power { exponent: None }),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::value::Value;
    use crate::{evaluate_string_to_result, result_to_string, Environment};

    fn eval(code: &str) -> String {
        result_to_string(&evaluate_string_to_result(code, Environment::default()))
    }

    #[test]
    fn invalid_scales_fail_at_construction() {
        assert_eq!(
            eval("Scale.linear({min: 5, max: 3})"),
            "Error(Max must be greater than min, got: min=5, max=3)"
        );
        assert_eq!(eval("Scale.log({min: -1, max: 10})"), "Error(Min must be over 0 for log scale, got: -1)");
        assert_eq!(eval("Scale.symlog({constant: 0})"), "Error(Symlog scale constant cannot be 0.)");
        assert_eq!(eval("Scale.power({exponent: 0})"), "Error(Power Scale exponent must be over 0.)");
    }

    #[test]
    fn bounds_round_trip() {
        let v = evaluate_string_to_result("Scale.linear({min: 3, max: 10})", Environment::default()).unwrap();
        let Value::Scale(s) = v else { panic!("expected a scale") };
        assert_eq!((s.min, s.max), (Some(3.0), Some(10.0)));
        assert_eq!(eval("Scale.linear()"), "Linear scale");
        assert_eq!(eval("Scale.power({exponent: 2})"), "Power scale (2)");
        assert_eq!(eval("Scale.power()"), "Power scale (0.1)");
        assert_eq!(eval("Scale.log({tickFormat: \".2s\"})"), "Logarithmic scale");
    }
}
