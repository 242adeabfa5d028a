use super::{Dist, DistError, SampleSet, SymbolicDist};
use rand::Rng;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgebraicOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl AlgebraicOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            AlgebraicOp::Add => a + b,
            AlgebraicOp::Subtract => a - b,
            AlgebraicOp::Multiply => a * b,
            AlgebraicOp::Divide => a / b,
            AlgebraicOp::Power => a.powf(b),
        }
    }
}

// Closed-form results; None means fall back to sampling
fn symbolic(op: AlgebraicOp, a: &SymbolicDist, b: &SymbolicDist) -> Option<Result<SymbolicDist, DistError>> {
    use AlgebraicOp::*;
    use SymbolicDist::*;
    Some(match (op, a, b) {
        (_, PointMass(x), PointMass(y)) => SymbolicDist::point_mass(op.apply(*x, *y)),
        (Add, Normal { mean: m1, stdev: s1 }, Normal { mean: m2, stdev: s2 }) => {
            SymbolicDist::normal(m1 + m2, s1.hypot(*s2))
        }
        (Subtract, Normal { mean: m1, stdev: s1 }, Normal { mean: m2, stdev: s2 }) => {
            SymbolicDist::normal(m1 - m2, s1.hypot(*s2))
        }
        (Add | Subtract, Normal { mean, stdev }, PointMass(k)) => {
            SymbolicDist::normal(op.apply(*mean, *k), *stdev)
        }
        (Add, PointMass(k), Normal { mean, stdev }) => SymbolicDist::normal(k + mean, *stdev),
        (Subtract, PointMass(k), Normal { mean, stdev }) => SymbolicDist::normal(k - mean, *stdev),
        (Multiply, Normal { mean, stdev }, PointMass(k)) | (Multiply, PointMass(k), Normal { mean, stdev })
            if *k != 0.0 =>
        {
            SymbolicDist::normal(mean * k, stdev * k.abs())
        }
        (Divide, Normal { mean, stdev }, PointMass(k)) if *k != 0.0 => {
            SymbolicDist::normal(mean / k, stdev / k.abs())
        }
        (Multiply, Lognormal { mu: m1, sigma: s1 }, Lognormal { mu: m2, sigma: s2 }) => {
            SymbolicDist::lognormal(m1 + m2, s1.hypot(*s2))
        }
        (Divide, Lognormal { mu: m1, sigma: s1 }, Lognormal { mu: m2, sigma: s2 }) => {
            SymbolicDist::lognormal(m1 - m2, s1.hypot(*s2))
        }
        (Multiply, Lognormal { mu, sigma }, PointMass(k)) | (Multiply, PointMass(k), Lognormal { mu, sigma })
            if *k > 0.0 =>
        {
            SymbolicDist::lognormal(mu + k.ln(), *sigma)
        }
        (Divide, Lognormal { mu, sigma }, PointMass(k)) if *k > 0.0 => {
            SymbolicDist::lognormal(mu - k.ln(), *sigma)
        }
        _ => return None,
    })
}

/// `a op b` over distributions, using closed forms where they exist and
/// `sample_count` paired samples otherwise.
pub fn algebraic<R: Rng + ?Sized>(
    op: AlgebraicOp,
    a: &Dist,
    b: &Dist,
    sample_count: usize,
    rng: &mut R,
) -> Result<Dist, DistError> {
    if let (Dist::Symbolic(x), Dist::Symbolic(y)) = (a, b) {
        if let Some(res) = symbolic(op, x, y) {
            return res.map(Dist::Symbolic);
        }
    }
    let n = match (a, b) {
        (Dist::SampleSet(s), _) | (_, Dist::SampleSet(s)) => s.len(),
        _ => sample_count,
    };
    let xs = sample_like(a, n, rng)?;
    let ys = sample_like(b, n, rng)?;
    let out: Vec<f64> = xs.iter().zip(ys.iter()).map(|(x, y)| op.apply(*x, *y)).collect();
    if out.iter().any(|v| v.is_nan()) {
        return Err(DistError::Operation(format!("{:?} produced NaN samples", op)));
    }
    SampleSet::new(out).map(Dist::SampleSet)
}

// Sample sets keep their own samples (resized to n); everything else is sampled
fn sample_like<R: Rng + ?Sized>(d: &Dist, n: usize, rng: &mut R) -> Result<Vec<f64>, DistError> {
    match d {
        Dist::SampleSet(s) if s.len() == n => Ok(s.samples().to_vec()),
        Dist::SampleSet(s) => Ok((0..n).map(|i| s.samples()[i % s.len()]).collect()),
        other => Ok(other.sample_n(n, rng)),
    }
}

/// Weighted mixture; weights are normalised to sum to 1.
pub fn mixture(components: Vec<(Dist, f64)>) -> Result<Dist, DistError> {
    if components.is_empty() {
        return Err(DistError::Argument("Mixture requires at least one distribution".into()));
    }
    if components.iter().any(|(_, w)| !w.is_finite() || *w < 0.0) {
        return Err(DistError::Argument("Mixture weights must be non-negative numbers".into()));
    }
    let total: f64 = components.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return Err(DistError::Argument("Mixture weights must sum to a positive number".into()));
    }
    let normalised = components.into_iter().map(|(d, w)| (d, w / total)).collect();
    Ok(Dist::Mixture(Arc::new(normalised)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn normal(m: f64, s: f64) -> Dist {
        Dist::Symbolic(SymbolicDist::normal(m, s).unwrap())
    }

    #[test]
    fn normal_sum_stays_symbolic() {
        let mut rng = StdRng::seed_from_u64(1);
        let d = algebraic(AlgebraicOp::Add, &normal(1.0, 3.0), &normal(2.0, 4.0), 100, &mut rng).unwrap();
        assert_eq!(d, normal(3.0, 5.0));
    }

    #[test]
    fn scaling_a_normal_by_negative_constant() {
        let mut rng = StdRng::seed_from_u64(1);
        let k = Dist::point_mass(-2.0).unwrap();
        let d = algebraic(AlgebraicOp::Multiply, &normal(1.0, 3.0), &k, 100, &mut rng).unwrap();
        assert_eq!(d, normal(-2.0, 6.0));
    }

    #[test]
    fn fallback_uses_sample_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let u = Dist::Symbolic(SymbolicDist::uniform(0.0, 1.0).unwrap());
        let d = algebraic(AlgebraicOp::Multiply, &u, &normal(0.0, 1.0), 500, &mut rng).unwrap();
        match d {
            Dist::SampleSet(s) => assert_eq!(s.len(), 500),
            other => panic!("expected sample set, got {}", other),
        }
    }

    #[test]
    fn mixture_normalises_weights() {
        let d = mixture(vec![(normal(0.0, 1.0), 1.0), (normal(10.0, 1.0), 3.0)]).unwrap();
        let Dist::Mixture(cs) = &d else { panic!("expected mixture") };
        assert_eq!(cs[0].1, 0.25);
        assert_eq!(cs[1].1, 0.75);
        assert!((d.mean() - 7.5).abs() < 1e-12);
    }

    #[test]
    fn mixture_rejects_bad_weights() {
        assert!(mixture(vec![]).is_err());
        assert!(mixture(vec![(normal(0.0, 1.0), -1.0)]).is_err());
        assert!(mixture(vec![(normal(0.0, 1.0), 0.0)]).is_err());
    }

    #[test]
    fn mixture_quantile_of_point_masses() {
        let a = Dist::point_mass(1.0).unwrap();
        let b = Dist::point_mass(3.0).unwrap();
        let d = mixture(vec![(a, 1.0), (b, 1.0)]).unwrap();
        assert!((d.inv(0.25) - 1.0).abs() < 1e-9);
        assert!((d.inv(0.75) - 3.0).abs() < 1e-9);
    }
}
