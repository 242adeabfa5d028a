use crate::bindings::Bindings;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use squiggle_ast::span::Span;

/// Nested user calls beyond this depth fail instead of exhausting the native stack.
pub const MAX_CALL_DEPTH: usize = 64;

/// Upper bound on the length of any list or sample set a builtin generates.
pub const MAX_GENERATED_LENGTH: usize = 10_000_000;

/// Run parameters shared by every evaluation in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Environment {
    pub sample_count: usize,
    pub xy_point_length: usize,
    pub seed: Option<u64>,
}

impl Default for Environment {
    fn default() -> Self {
        Self { sample_count: 10_000, xy_point_length: 1_000, seed: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub name: String,
    pub span: Span,
}

/// Mutable state of one evaluation. Never shared between evaluations.
#[derive(Debug)]
pub struct ReducerContext {
    pub environment: Environment,
    pub bindings: Bindings,
    pub frames: Vec<Frame>,
    pub rng: StdRng,
}

impl ReducerContext {
    pub fn new(environment: Environment) -> Self {
        let rng = match environment.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { environment, bindings: Bindings::new(), frames: Vec::new(), rng }
    }

    pub fn sample_count(&self) -> usize {
        self.environment.sample_count
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_reads_partial_json() {
        let env: Environment = serde_json::from_str(r#"{"sampleCount": 50, "seed": 3}"#).unwrap();
        assert_eq!(env.sample_count, 50);
        assert_eq!(env.xy_point_length, 1000);
        assert_eq!(env.seed, Some(3));
    }

    #[test]
    fn seeded_contexts_agree() {
        use rand::Rng;
        let env = Environment { seed: Some(11), ..Environment::default() };
        let a: f64 = ReducerContext::new(env.clone()).rng.gen();
        let b: f64 = ReducerContext::new(env).rng.gen();
        assert_eq!(a, b);
    }
}
