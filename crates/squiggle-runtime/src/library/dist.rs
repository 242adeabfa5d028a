use super::generated_length;
use crate::dist::{Dist, DistError, SampleSet, SymbolicDist};
use crate::error::RuntimeError;
use crate::registry::*;
use crate::value::{format_number, Value};

const MAKER: FnFactory = FnFactory::new("Dist", false);
const SAMPLE_SET: FnFactory = FnFactory::new("SampleSet", true);

fn symbolic(d: Result<SymbolicDist, DistError>) -> Result<Value, RuntimeError> {
    Ok(Value::Dist(Dist::Symbolic(d?)))
}

fn two_numbers(f: fn(f64, f64) -> Result<SymbolicDist, DistError>) -> FnDefinition {
    make_definition2(fr_number(), fr_number(), move |a, b, _| symbolic(f(a, b)))
}

fn summary(name: &'static str, f: fn(&Dist) -> f64) -> FrFunction {
    MAKER.make(name, vec![make_definition1(fr_dist(), move |d, _| Ok(Value::Number(f(&d))))])
}

fn probability(p: f64) -> Result<f64, RuntimeError> {
    if !(0.0..=1.0).contains(&p) {
        let msg = format!("Probability must be between 0 and 1, got {}", format_number(p));
        return Err(DistError::Argument(msg).into());
    }
    Ok(p)
}

fn quantile_definitions() -> Vec<FnDefinition> {
    vec![make_definition2(fr_dist(), fr_number(), |d, p, _| {
        Ok(Value::Number(d.inv(probability(p)?)))
    })]
}

fn credible_interval() -> Vec<FnDefinition> {
    vec![two_numbers(SymbolicDist::from_credible_interval)]
}

fn numbers(xs: &[f64]) -> Value {
    Value::array(xs.iter().map(|x| Value::Number(*x)).collect())
}

pub fn library() -> Vec<FrFunction> {
    vec![
        MAKER.make(
            "normal",
            vec![
                two_numbers(SymbolicDist::normal),
                make_definition1(
                    fr_dict2(("mean", fr_number()), ("stdev", fr_number())),
                    |(mean, stdev), _| symbolic(SymbolicDist::normal(mean, stdev)),
                ),
            ],
        ),
        MAKER.make(
            "lognormal",
            vec![
                two_numbers(SymbolicDist::lognormal),
                make_definition1(
                    fr_dict2(("mu", fr_number()), ("sigma", fr_number())),
                    |(mu, sigma), _| symbolic(SymbolicDist::lognormal(mu, sigma)),
                ),
            ],
        ),
        MAKER.make("uniform", vec![two_numbers(SymbolicDist::uniform)]),
        MAKER.make(
            "pointMass",
            vec![make_definition1(fr_number(), |x, _| symbolic(SymbolicDist::point_mass(x)))],
        ),
        MAKER.make(
            "exponential",
            vec![make_definition1(fr_number(), |rate, _| symbolic(SymbolicDist::exponential(rate)))],
        ),
        MAKER.make(
            "triangular",
            vec![make_definition3(fr_number(), fr_number(), fr_number(), |a, m, b, _| {
                symbolic(SymbolicDist::triangular(a, m, b))
            })],
        ),
        MAKER.make("to", credible_interval()),
        MAKER.make("credibleIntervalToDistribution", credible_interval()),
        summary("mean", Dist::mean),
        summary("stdev", Dist::stdev),
        summary("variance", Dist::variance),
        MAKER.make(
            "sample",
            vec![make_definition1(fr_dist(), |d, ctx| Ok(Value::Number(d.sample(&mut ctx.rng))))],
        ),
        MAKER.make(
            "sampleN",
            vec![make_definition2(fr_dist(), fr_number(), |d, n, ctx| {
                let n = generated_length(n, "Sample count")?;
                Ok(numbers(&d.sample_n(n, &mut ctx.rng)))
            })],
        ),
        MAKER.make(
            "cdf",
            vec![make_definition2(fr_dist(), fr_number(), |d, x, _| Ok(Value::Number(d.cdf(x))))],
        ),
        MAKER.make(
            "pdf",
            vec![make_definition2(fr_dist(), fr_number(), |d, x, _| Ok(Value::Number(d.pdf(x)?)))],
        ),
        MAKER.make("inv", quantile_definitions()),
        MAKER.make("quantile", quantile_definitions()),
        SAMPLE_SET.make(
            "fromDist",
            vec![make_definition1(fr_dist(), |d, ctx| {
                let n = ctx.sample_count();
                Ok(Value::Dist(Dist::SampleSet(d.to_sample_set(n, &mut ctx.rng)?)))
            })],
        ),
        SAMPLE_SET.make(
            "fromList",
            vec![make_definition1(fr_array(fr_number()), |xs, _| {
                Ok(Value::Dist(Dist::SampleSet(SampleSet::new(xs)?)))
            })],
        ),
        SAMPLE_SET.make(
            "toList",
            vec![make_definition1(fr_dist(), |d, ctx| {
                let n = ctx.sample_count();
                Ok(numbers(d.to_sample_set(n, &mut ctx.rng)?.samples()))
            })],
        ),
    ]
}
