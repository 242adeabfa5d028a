//! Probability distributions: symbolic, sample-based, and mixtures.

pub mod operations;
pub mod sample_set;
pub mod symbolic;

pub use operations::{algebraic, mixture, AlgebraicOp};
pub use sample_set::SampleSet;
pub use symbolic::SymbolicDist;

use crate::value::format_number;
use rand::Rng;
use std::sync::Arc;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DistError {
    #[error("Argument Error: {0}")]
    Argument(String),
    #[error("Operation Error: {0}")]
    Operation(String),
    #[error("Too few samples when constructing sample set")]
    TooFewSamples,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dist {
    Symbolic(SymbolicDist),
    SampleSet(SampleSet),
    /// Components with weights normalised to sum to 1.
    Mixture(Arc<Vec<(Dist, f64)>>),
}

impl From<SymbolicDist> for Dist {
    fn from(d: SymbolicDist) -> Self {
        Dist::Symbolic(d)
    }
}

impl From<SampleSet> for Dist {
    fn from(s: SampleSet) -> Self {
        Dist::SampleSet(s)
    }
}

impl Dist {
    pub fn point_mass(x: f64) -> Result<Dist, DistError> {
        SymbolicDist::point_mass(x).map(Dist::Symbolic)
    }

    pub fn mean(&self) -> f64 {
        match self {
            Dist::Symbolic(d) => d.mean(),
            Dist::SampleSet(s) => s.mean(),
            Dist::Mixture(cs) => cs.iter().map(|(d, w)| w * d.mean()).sum(),
        }
    }

    pub fn variance(&self) -> f64 {
        match self {
            Dist::Symbolic(d) => d.variance(),
            Dist::SampleSet(s) => s.variance(),
            Dist::Mixture(cs) => {
                let mean = self.mean();
                let second: f64 =
                    cs.iter().map(|(d, w)| w * (d.variance() + d.mean().powi(2))).sum();
                (second - mean * mean).max(0.0)
            }
        }
    }

    pub fn stdev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Dist::Symbolic(d) => d.sample(rng),
            Dist::SampleSet(s) => {
                let xs = s.samples();
                xs[rng.gen_range(0..xs.len())]
            }
            Dist::Mixture(cs) => {
                let mut u: f64 = rng.gen::<f64>();
                for (d, w) in cs.iter() {
                    if u < *w {
                        return d.sample(rng);
                    }
                    u -= w;
                }
                // rounding left us past the last weight
                cs.last().map(|(d, _)| d.sample(rng)).unwrap_or(f64::NAN)
            }
        }
    }

    pub fn sample_n<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }

    /// Sample-based copy; sample sets are returned as they are.
    pub fn to_sample_set<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<SampleSet, DistError> {
        match self {
            Dist::SampleSet(s) => Ok(s.clone()),
            _ => SampleSet::new(self.sample_n(n, rng)),
        }
    }

    pub fn cdf(&self, x: f64) -> f64 {
        match self {
            Dist::Symbolic(d) => d.cdf(x),
            Dist::SampleSet(s) => s.cdf(x),
            Dist::Mixture(cs) => cs.iter().map(|(d, w)| w * d.cdf(x)).sum(),
        }
    }

    pub fn pdf(&self, x: f64) -> Result<f64, DistError> {
        match self {
            Dist::Symbolic(d) => d.pdf(x),
            Dist::SampleSet(s) => s.pdf(x),
            Dist::Mixture(cs) => {
                let mut total = 0.0;
                for (d, w) in cs.iter() {
                    total += w * d.pdf(x)?;
                }
                Ok(total)
            }
        }
    }

    pub fn inv(&self, p: f64) -> f64 {
        match self {
            Dist::Symbolic(d) => d.inv(p),
            Dist::SampleSet(s) => s.inv(p),
            Dist::Mixture(cs) => {
                // the mixture quantile lies between the component quantiles
                let qs: Vec<f64> = cs.iter().map(|(d, _)| d.inv(p)).collect();
                let mut lo = qs.iter().cloned().fold(f64::INFINITY, f64::min);
                let mut hi = qs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                if !(lo.is_finite() && hi.is_finite()) || lo == hi {
                    return lo;
                }
                for _ in 0..100 {
                    let mid = (lo + hi) / 2.0;
                    if self.cdf(mid) < p {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                hi
            }
        }
    }
}

impl std::fmt::Display for Dist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dist::Symbolic(d) => write!(f, "{}", d),
            Dist::SampleSet(_) => write!(f, "Sample Set Distribution"),
            Dist::Mixture(cs) => {
                let parts: Vec<String> =
                    cs.iter().map(|(d, w)| format!("{}: {}", d, format_number(*w))).collect();
                write!(f, "Mixture({})", parts.join(", "))
            }
        }
    }
}
