use super::generated_length;
use crate::context::ReducerContext;
use crate::error::RuntimeError;
use crate::lambda::Lambda;
use crate::registry::*;
use crate::value::{Domain, LabeledDistribution, Plot, Scale, Value};
use std::sync::Arc;

const MAKER: FnFactory = FnFactory::new("Plot", true);

fn plot(p: Plot) -> Result<Value, RuntimeError> {
    Ok(Value::Plot(Arc::new(p)))
}

fn scale_or_default(s: Option<Scale>) -> Scale {
    s.unwrap_or_else(Scale::linear)
}

/// Sample point count of a function plot, falling back to the environment's `xy_point_length`.
fn plot_points(points: Option<f64>, ctx: &ReducerContext) -> Result<usize, RuntimeError> {
    match points {
        Some(n) => match generated_length(n, "Plot points")? {
            0 => Err(RuntimeError::other("Plot points must be at least 1")),
            n => Ok(n),
        },
        None => Ok(ctx.environment.xy_point_length),
    }
}

fn verify_one_parameter(func: &Lambda) -> Result<(), RuntimeError> {
    if func.parameters().len() != 1 {
        return Err(RuntimeError::other("Expected a function with one parameter"));
    }
    Ok(())
}

/// X scale of a function plot: unset bounds come from the parameter's numeric
/// domain, and the result must set both bounds or neither.
fn function_x_scale(func: &Lambda, x_scale: Option<Scale>) -> Result<Scale, RuntimeError> {
    let mut scale = scale_or_default(x_scale);
    let domain = func.parameters().into_iter().next().and_then(|p| p.domain);
    if let Some(Domain::NumericRange { min, max }) = domain {
        scale.min = scale.min.or(Some(min));
        scale.max = scale.max.or(Some(max));
    }
    if scale.min.is_some() != scale.max.is_some() {
        return Err(RuntimeError::other(
            "'max' and 'min' should either be simultaneously set or unset on xScale for a function plot",
        ));
    }
    Ok(scale)
}

fn axes() -> (FrOptional<FrScale>, FrOptional<FrScale>) {
    (fr_optional(fr_scale()), fr_optional(fr_scale()))
}

pub fn library() -> Vec<FrFunction> {
    let (x, y) = axes();
    vec![
        MAKER.make(
            "dists",
            vec![make_definition1(
                fr_dict5(
                    ("dists", fr_array(fr_dict2(("name", fr_string()), ("value", fr_dist_or_number())))),
                    ("xScale", x.clone()),
                    ("yScale", y.clone()),
                    ("title", fr_optional(fr_string())),
                    ("showSummary", fr_optional(fr_bool())),
                ),
                |(dists, x_scale, y_scale, title, show_summary), _| {
                    let distributions = dists
                        .into_iter()
                        .map(|(name, value)| -> Result<_, RuntimeError> {
                            Ok(LabeledDistribution { name: Some(name), distribution: value.into_dist()? })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    plot(Plot::Distributions {
                        distributions,
                        x_scale: scale_or_default(x_scale),
                        y_scale: scale_or_default(y_scale),
                        title,
                        show_summary: show_summary.unwrap_or(true),
                    })
                },
            )],
        ),
        MAKER.make(
            "dist",
            vec![make_definition1(
                fr_dict5(
                    ("dist", fr_dist()),
                    ("xScale", x.clone()),
                    ("yScale", y.clone()),
                    ("title", fr_optional(fr_string())),
                    ("showSummary", fr_optional(fr_bool())),
                ),
                |(dist, x_scale, y_scale, title, show_summary), _| {
                    plot(Plot::Distributions {
                        distributions: vec![LabeledDistribution { name: None, distribution: dist }],
                        x_scale: scale_or_default(x_scale),
                        y_scale: scale_or_default(y_scale),
                        title,
                        show_summary: show_summary.unwrap_or(true),
                    })
                },
            )],
        ),
        MAKER.make(
            "numericFn",
            vec![make_definition1(
                fr_dict4(
                    ("fn", fr_lambda()),
                    ("xScale", x.clone()),
                    ("yScale", y.clone()),
                    ("points", fr_optional(fr_number())),
                ),
                |(func, x_scale, y_scale, points), ctx| {
                    verify_one_parameter(&func)?;
                    let x_scale = function_x_scale(&func, x_scale)?;
                    let points = plot_points(points, ctx)?;
                    plot(Plot::NumericFn { func, x_scale, y_scale: scale_or_default(y_scale), points })
                },
            )],
        ),
        MAKER.make(
            "distFn",
            vec![make_definition1(
                fr_dict5(
                    ("fn", fr_lambda()),
                    ("xScale", x.clone()),
                    ("yScale", y.clone()),
                    ("distXScale", fr_optional(fr_scale())),
                    ("points", fr_optional(fr_number())),
                ),
                |(func, x_scale, y_scale, dist_x_scale, points), ctx| {
                    verify_one_parameter(&func)?;
                    let x_scale = function_x_scale(&func, x_scale)?;
                    let points = plot_points(points, ctx)?;
                    plot(Plot::DistFn {
                        func,
                        x_scale,
                        y_scale: scale_or_default(y_scale),
                        dist_x_scale: scale_or_default(dist_x_scale),
                        points,
                    })
                },
            )],
        ),
        MAKER.make(
            "scatter",
            vec![make_definition1(
                fr_dict4(("xDist", fr_dist()), ("yDist", fr_dist()), ("xScale", x), ("yScale", y)),
                |(x_dist, y_dist, x_scale, y_scale), _| {
                    plot(Plot::Scatter {
                        x_dist,
                        y_dist,
                        x_scale: scale_or_default(x_scale),
                        y_scale: scale_or_default(y_scale),
                    })
                },
            )],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::value::{Plot, Scale, ScaleKind, Value};
    use crate::{evaluate_string_to_result, result_to_string, Environment};

    fn eval(code: &str) -> String {
        result_to_string(&evaluate_string_to_result(code, Environment::default()))
    }

    fn x_scale(code: &str) -> Scale {
        match evaluate_string_to_result(code, Environment::default()) {
            Ok(Value::Plot(p)) => match p.as_ref() {
                Plot::NumericFn { x_scale, .. } | Plot::DistFn { x_scale, .. } => x_scale.clone(),
                other => panic!("expected a function plot, got {:?}", other),
            },
            other => panic!("expected a plot, got {:?}", other),
        }
    }

    #[test]
    fn labeled_dists() {
        assert_eq!(
            eval("Plot.dists({dists: [{name: \"dist1\", value: 2}, {name: \"dist2\", value: 2 to 5}]})"),
            "Plot containing dist1, dist2"
        );
    }

    #[test]
    fn function_plots_need_one_parameter() {
        assert!(eval("Plot.numericFn({fn: {|x| x * 5}})").starts_with("Plot for numeric function"));
        assert_eq!(
            eval("Plot.numericFn({fn: {|x, y| x * y}})"),
            "Error(Expected a function with one parameter)"
        );
        assert!(eval("Plot.distFn({fn: {|x| x to x + 1}})").starts_with("Plot for dist function"));
        assert_eq!(
            eval("Plot.distFn({fn: {|x, y| x to x + y}})"),
            "Error(Expected a function with one parameter)"
        );
    }

    #[test]
    fn partial_bounds_are_rejected() {
        let msg = "Error('max' and 'min' should either be simultaneously set or unset on xScale for a function plot)";
        assert_eq!(eval("Plot.numericFn({fn: {|x| x * 5}, xScale: Scale.linear({min: 100})})"), msg);
        assert_eq!(eval("Plot.numericFn({fn: {|x| x * 5}, xScale: Scale.linear({max: 100})})"), msg);
    }

    #[test]
    fn domain_fills_unset_bounds() {
        let s = x_scale("Plot.numericFn({fn: {|x: [3, 5]| x * 5}})");
        assert_eq!((s.kind, s.min, s.max), (ScaleKind::Linear, Some(3.0), Some(5.0)));

        let s = x_scale("Plot.numericFn({fn: {|x: [3, 5]| x * 5}, xScale: Scale.linear({min: 100, max: 200})})");
        assert_eq!((s.min, s.max), (Some(100.0), Some(200.0)));

        let s = x_scale("Plot.numericFn({fn: {|x: [3, 5]| x * 5}, xScale: Scale.log()})");
        assert_eq!((s.kind, s.min, s.max), (ScaleKind::Log, Some(3.0), Some(5.0)));

        let s = x_scale("Plot.numericFn({fn: {|x: [3, 5]| x * 5}, xScale: Scale.log({min: 100})})");
        assert_eq!((s.min, s.max), (Some(100.0), Some(5.0)));

        let s = x_scale("Plot.distFn({fn: {|x: [3, 5]| uniform(x, x + 1)}})");
        assert_eq!((s.min, s.max), (Some(3.0), Some(5.0)));
    }

    fn points(code: &str, environment: Environment) -> usize {
        match evaluate_string_to_result(code, environment) {
            Ok(Value::Plot(p)) => match p.as_ref() {
                Plot::NumericFn { points, .. } | Plot::DistFn { points, .. } => *points,
                other => panic!("expected a function plot, got {:?}", other),
            },
            other => panic!("expected a plot, got {:?}", other),
        }
    }

    #[test]
    fn points_default_to_environment() {
        assert_eq!(points("Plot.numericFn({fn: {|x| x * 5}})", Environment::default()), 1000);
        let env = Environment { xy_point_length: 64, ..Environment::default() };
        assert_eq!(points("Plot.distFn({fn: {|x| normal(x, 1)}})", env), 64);
        assert_eq!(points("Plot.numericFn({fn: {|x| x * 5}, points: 50})", Environment::default()), 50);
        assert_eq!(
            eval("Plot.numericFn({fn: {|x| x * 5}, points: 0})"),
            "Error(Plot points must be at least 1)"
        );
        assert_eq!(
            eval("Plot.numericFn({fn: {|x| x * 5}, points: 2.5})"),
            "Error(Plot points must be a non-negative integer, got 2.5)"
        );
    }

    #[test]
    fn function_plot_exposes_its_function() {
        assert_eq!(eval("p = Plot.numericFn({fn: {|x| x * 5}})\np.fn(2)"), "10");
    }

    #[test]
    fn scatter_plot() {
        assert_eq!(
            eval("Plot.scatter({xDist: normal(0, 1), yDist: normal(1, 1)})"),
            "Scatter plot for distributions Normal(0,1) and Normal(1,1)"
        );
    }
}
