//! Closed-form distributions.

use super::DistError;
use crate::value::format_number;
use rand::Rng;
use std::f64::consts::{PI, SQRT_2};

/// z-score of the 95th percentile; `a to b` treats [a, b] as a 90% interval.
pub const NORMAL_95_PERCENTILE: f64 = 1.6448536269514722;

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolicDist {
    Normal { mean: f64, stdev: f64 },
    Lognormal { mu: f64, sigma: f64 },
    Uniform { low: f64, high: f64 },
    PointMass(f64),
    Exponential { rate: f64 },
    Triangular { low: f64, mode: f64, high: f64 },
}

fn argument_error(msg: &str) -> DistError {
    DistError::Argument(msg.to_string())
}

// Abramowitz & Stegun 7.1.26
pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let y = 1.0
        - (((((1.061405429 * t - 1.453152027) * t) + 1.421413741) * t - 0.284496736) * t
            + 0.254829592)
            * t
            * (-x * x).exp();
    sign * y
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / SQRT_2))
}

fn standard_normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}

/// Inverse of the standard normal cdf (Acklam's rational approximation).
pub fn standard_normal_quantile(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    const A: [f64; 6] = [
        -3.969683028665376e1,
        2.209460984245205e2,
        -2.759285104469687e2,
        1.383577518672690e2,
        -3.066479806614716e1,
        2.506628277459239,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e1,
        1.615858368580409e2,
        -1.556989798598866e2,
        6.680131188771972e1,
        -1.328068155288572e1,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-3,
        -3.223964580411365e-1,
        -2.400758277161838,
        -2.549732539343734,
        4.374664141464968,
        2.938163982698783,
    ];
    const D: [f64; 4] =
        [7.784695709041462e-3, 3.224671290700398e-1, 2.445134137142996, 3.754408661907416];
    let p_low = 0.02425;
    if p < p_low {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - p_low {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Box-Muller draw from N(0, 1).
pub fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

impl SymbolicDist {
    pub fn normal(mean: f64, stdev: f64) -> Result<Self, DistError> {
        if !mean.is_finite() || !stdev.is_finite() {
            return Err(argument_error("Normal parameters must be finite"));
        }
        if stdev <= 0.0 {
            return Err(argument_error(
                "Standard deviation of normal distribution must be larger than 0",
            ));
        }
        Ok(SymbolicDist::Normal { mean, stdev })
    }

    pub fn lognormal(mu: f64, sigma: f64) -> Result<Self, DistError> {
        if sigma <= 0.0 {
            return Err(argument_error("Lognormal standard deviation must be larger than 0"));
        }
        Ok(SymbolicDist::Lognormal { mu, sigma })
    }

    pub fn uniform(low: f64, high: f64) -> Result<Self, DistError> {
        if high <= low {
            return Err(argument_error("High must be larger than low"));
        }
        Ok(SymbolicDist::Uniform { low, high })
    }

    pub fn point_mass(x: f64) -> Result<Self, DistError> {
        if !x.is_finite() {
            return Err(argument_error("PointMass must be finite"));
        }
        Ok(SymbolicDist::PointMass(x))
    }

    pub fn exponential(rate: f64) -> Result<Self, DistError> {
        if rate <= 0.0 {
            return Err(argument_error("Exponential distributions rate must be larger than 0."));
        }
        Ok(SymbolicDist::Exponential { rate })
    }

    pub fn triangular(low: f64, mode: f64, high: f64) -> Result<Self, DistError> {
        if !(low < mode && mode < high) {
            return Err(argument_error("Triangular values must be increasing order."));
        }
        Ok(SymbolicDist::Triangular { low, mode, high })
    }

    /// Distribution whose 5th and 95th percentiles are `low` and `high`.
    pub fn from_credible_interval(low: f64, high: f64) -> Result<Self, DistError> {
        if low >= high {
            return Err(argument_error("Low value must be less than high value"));
        }
        if low > 0.0 {
            let (log_low, log_high) = (low.ln(), high.ln());
            let mu = (log_low + log_high) / 2.0;
            let sigma = (log_high - log_low) / (2.0 * NORMAL_95_PERCENTILE);
            SymbolicDist::lognormal(mu, sigma)
        } else {
            let mean = (low + high) / 2.0;
            let stdev = (high - low) / (2.0 * NORMAL_95_PERCENTILE);
            SymbolicDist::normal(mean, stdev)
        }
    }

    pub fn mean(&self) -> f64 {
        match *self {
            SymbolicDist::Normal { mean, .. } => mean,
            SymbolicDist::Lognormal { mu, sigma } => (mu + sigma * sigma / 2.0).exp(),
            SymbolicDist::Uniform { low, high } => (low + high) / 2.0,
            SymbolicDist::PointMass(x) => x,
            SymbolicDist::Exponential { rate } => 1.0 / rate,
            SymbolicDist::Triangular { low, mode, high } => (low + mode + high) / 3.0,
        }
    }

    pub fn variance(&self) -> f64 {
        match *self {
            SymbolicDist::Normal { stdev, .. } => stdev * stdev,
            SymbolicDist::Lognormal { mu, sigma } => {
                let s2 = sigma * sigma;
                (s2.exp() - 1.0) * (2.0 * mu + s2).exp()
            }
            SymbolicDist::Uniform { low, high } => (high - low).powi(2) / 12.0,
            SymbolicDist::PointMass(_) => 0.0,
            SymbolicDist::Exponential { rate } => 1.0 / (rate * rate),
            SymbolicDist::Triangular { low: a, mode: c, high: b } => {
                (a * a + b * b + c * c - a * b - a * c - b * c) / 18.0
            }
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            SymbolicDist::Normal { mean, stdev } => mean + stdev * sample_standard_normal(rng),
            SymbolicDist::Lognormal { mu, sigma } => (mu + sigma * sample_standard_normal(rng)).exp(),
            SymbolicDist::PointMass(x) => x,
            _ => self.inv(rng.gen::<f64>()),
        }
    }

    pub fn cdf(&self, x: f64) -> f64 {
        match *self {
            SymbolicDist::Normal { mean, stdev } => standard_normal_cdf((x - mean) / stdev),
            SymbolicDist::Lognormal { mu, sigma } => {
                if x <= 0.0 {
                    0.0
                } else {
                    standard_normal_cdf((x.ln() - mu) / sigma)
                }
            }
            SymbolicDist::Uniform { low, high } => ((x - low) / (high - low)).clamp(0.0, 1.0),
            SymbolicDist::PointMass(v) => {
                if x >= v {
                    1.0
                } else {
                    0.0
                }
            }
            SymbolicDist::Exponential { rate } => {
                if x <= 0.0 {
                    0.0
                } else {
                    1.0 - (-rate * x).exp()
                }
            }
            SymbolicDist::Triangular { low: a, mode: c, high: b } => {
                if x <= a {
                    0.0
                } else if x <= c {
                    (x - a).powi(2) / ((b - a) * (c - a))
                } else if x < b {
                    1.0 - (b - x).powi(2) / ((b - a) * (b - c))
                } else {
                    1.0
                }
            }
        }
    }

    pub fn pdf(&self, x: f64) -> Result<f64, DistError> {
        Ok(match *self {
            SymbolicDist::Normal { mean, stdev } => standard_normal_pdf((x - mean) / stdev) / stdev,
            SymbolicDist::Lognormal { mu, sigma } => {
                if x <= 0.0 {
                    0.0
                } else {
                    standard_normal_pdf((x.ln() - mu) / sigma) / (x * sigma)
                }
            }
            SymbolicDist::Uniform { low, high } => {
                if x >= low && x <= high {
                    1.0 / (high - low)
                } else {
                    0.0
                }
            }
            SymbolicDist::PointMass(_) => {
                return Err(DistError::Operation("Point mass has no density".into()))
            }
            SymbolicDist::Exponential { rate } => {
                if x < 0.0 {
                    0.0
                } else {
                    rate * (-rate * x).exp()
                }
            }
            SymbolicDist::Triangular { low: a, mode: c, high: b } => {
                if x < a || x > b {
                    0.0
                } else if x <= c {
                    2.0 * (x - a) / ((b - a) * (c - a))
                } else {
                    2.0 * (b - x) / ((b - a) * (b - c))
                }
            }
        })
    }

    /// Quantile function.
    pub fn inv(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        match *self {
            SymbolicDist::Normal { mean, stdev } => mean + stdev * standard_normal_quantile(p),
            SymbolicDist::Lognormal { mu, sigma } => (mu + sigma * standard_normal_quantile(p)).exp(),
            SymbolicDist::Uniform { low, high } => low + p * (high - low),
            SymbolicDist::PointMass(x) => x,
            SymbolicDist::Exponential { rate } => -(1.0 - p).ln() / rate,
            SymbolicDist::Triangular { low: a, mode: c, high: b } => {
                let fc = (c - a) / (b - a);
                if p < fc {
                    a + (p * (b - a) * (c - a)).sqrt()
                } else {
                    b - ((1.0 - p) * (b - a) * (b - c)).sqrt()
                }
            }
        }
    }
}

impl std::fmt::Display for SymbolicDist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = format_number;
        match *self {
            SymbolicDist::Normal { mean, stdev } => write!(f, "Normal({},{})", n(mean), n(stdev)),
            SymbolicDist::Lognormal { mu, sigma } => write!(f, "Lognormal({},{})", n(mu), n(sigma)),
            SymbolicDist::Uniform { low, high } => write!(f, "Uniform({},{})", n(low), n(high)),
            SymbolicDist::PointMass(x) => write!(f, "PointMass({})", n(x)),
            SymbolicDist::Exponential { rate } => write!(f, "Exponential({})", n(rate)),
            SymbolicDist::Triangular { low, mode, high } => {
                write!(f, "Triangular({},{},{})", n(low), n(mode), n(high))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn normal_cdf_and_quantile_agree() {
        let d = SymbolicDist::normal(5.0, 2.0).unwrap();
        assert!(close(d.cdf(5.0), 0.5, 1e-6));
        assert!(close(d.inv(0.5), 5.0, 1e-6));
        let x = d.inv(0.95);
        assert!(close(d.cdf(x), 0.95, 1e-4));
    }

    #[test]
    fn credible_interval_picks_family_by_sign() {
        let d = SymbolicDist::from_credible_interval(1.0, 10.0).unwrap();
        assert!(matches!(d, SymbolicDist::Lognormal { .. }));
        assert!(close(d.inv(0.05), 1.0, 1e-3));
        assert!(close(d.inv(0.95), 10.0, 1e-2));

        let d = SymbolicDist::from_credible_interval(-5.0, 5.0).unwrap();
        assert_eq!(d.mean(), 0.0);
        assert!(matches!(d, SymbolicDist::Normal { .. }));
        assert!(SymbolicDist::from_credible_interval(3.0, 3.0).is_err());
    }

    #[test]
    fn constructors_validate_arguments() {
        assert!(SymbolicDist::normal(0.0, 0.0).is_err());
        assert!(SymbolicDist::uniform(2.0, 1.0).is_err());
        assert!(SymbolicDist::exponential(-1.0).is_err());
        assert!(SymbolicDist::triangular(1.0, 0.5, 3.0).is_err());
    }

    #[test]
    fn sampling_matches_moments() {
        let mut rng = StdRng::seed_from_u64(7);
        let d = SymbolicDist::uniform(0.0, 10.0).unwrap();
        let n = 20_000;
        let mean = (0..n).map(|_| d.sample(&mut rng)).sum::<f64>() / n as f64;
        assert!(close(mean, 5.0, 0.2));
    }

    #[test]
    fn display_uses_short_numbers() {
        assert_eq!(SymbolicDist::normal(5.0, 2.5).unwrap().to_string(), "Normal(5,2.5)");
        assert_eq!(SymbolicDist::PointMass(3.0).to_string(), "PointMass(3)");
    }
}
