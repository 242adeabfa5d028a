use super::DistError;
use std::sync::Arc;

/// Empirical distribution backed by raw samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    samples: Arc<Vec<f64>>,
}

impl SampleSet {
    pub fn new(samples: Vec<f64>) -> Result<Self, DistError> {
        if samples.len() < 2 {
            return Err(DistError::TooFewSamples);
        }
        Ok(Self { samples: Arc::new(samples) })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn sorted(&self) -> Vec<f64> {
        let mut xs = self.samples.to_vec();
        xs.sort_by(|a, b| a.total_cmp(b));
        xs
    }

    pub fn mean(&self) -> f64 {
        self.samples.iter().sum::<f64>() / self.len() as f64
    }

    pub fn variance(&self) -> f64 {
        let m = self.mean();
        self.samples.iter().map(|x| (x - m).powi(2)).sum::<f64>() / self.len() as f64
    }

    pub fn cdf(&self, x: f64) -> f64 {
        self.samples.iter().filter(|&&s| s <= x).count() as f64 / self.len() as f64
    }

    /// Linear interpolation between order statistics.
    pub fn inv(&self, p: f64) -> f64 {
        let xs = self.sorted();
        let pos = p.clamp(0.0, 1.0) * (xs.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let frac = pos - lo as f64;
        xs[lo] + (xs[hi] - xs[lo]) * frac
    }

    /// Gaussian kernel density estimate with Silverman's bandwidth.
    pub fn pdf(&self, x: f64) -> Result<f64, DistError> {
        let n = self.len() as f64;
        let stdev = self.variance().sqrt();
        let xs = self.sorted();
        let iqr = self.inv(0.75) - self.inv(0.25);
        let spread = if iqr > 0.0 { stdev.min(iqr / 1.34) } else { stdev };
        if spread <= 0.0 {
            return Err(DistError::Operation("Cannot estimate density of constant samples".into()));
        }
        let h = 0.9 * spread * n.powf(-0.2);
        let norm = 1.0 / (n * h * (2.0 * std::f64::consts::PI).sqrt());
        Ok(xs.iter().map(|s| (-0.5 * ((x - s) / h).powi(2)).exp()).sum::<f64>() * norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_at_least_two_samples() {
        assert_eq!(SampleSet::new(vec![1.0]), Err(DistError::TooFewSamples));
    }

    #[test]
    fn quantiles_interpolate() {
        let s = SampleSet::new(vec![4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(s.inv(0.0), 1.0);
        assert_eq!(s.inv(0.5), 3.0);
        assert_eq!(s.inv(1.0), 5.0);
        assert_eq!(s.inv(0.125), 1.5);
        assert_eq!(s.cdf(2.0), 0.4);
        assert_eq!(s.mean(), 3.0);
    }
}
