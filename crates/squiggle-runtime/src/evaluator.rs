//! Relative-value models: a program binding `fn(a, b)` to a distribution of ratios.

use crate::context::Environment;
use crate::error::{RuntimeError, SquiggleError};
use crate::lambda::Lambda;
use crate::value::Value;
use crate::{call_lambda, run};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeValue {
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonCacheRow {
    pub first_item: String,
    pub second_item: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<RelativeValue>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelEvaluator {
    environment: Environment,
    func: Lambda,
}

impl ModelEvaluator {
    pub fn create(code: &str, environment: Environment) -> Result<Self, SquiggleError> {
        let output = run(code, environment.clone())?;
        match output.bindings.get("fn") {
            Some(Value::Lambda(func)) => Ok(Self { environment, func: func.clone() }),
            Some(other) => Err(RuntimeError::ExpectedType {
                expected: "Lambda".into(),
                found: other.type_name().into(),
            }
            .into()),
            None => Err(RuntimeError::other("Expected the model to define fn").into()),
        }
    }

    /// Median and 90% interval of `fn(first, second)`.
    pub fn compare(&self, first: &str, second: &str) -> Result<RelativeValue, RuntimeError> {
        let args = [Value::string(first), Value::string(second)];
        match call_lambda(&self.func, &args, self.environment.clone())? {
            Value::Dist(d) => Ok(RelativeValue { median: d.inv(0.5), min: d.inv(0.05), max: d.inv(0.95) }),
            Value::Number(x) => Ok(RelativeValue { median: x, min: x, max: x }),
            other => Err(RuntimeError::ExpectedType {
                expected: "Dist".into(),
                found: other.type_name().into(),
            }),
        }
    }

    /// One row per ordered pair of `ids` not already in `seen`.
    pub fn build_comparison_cache(
        &self,
        ids: &[String],
        seen: &HashSet<(String, String)>,
    ) -> Vec<ComparisonCacheRow> {
        let mut rows = Vec::new();
        for first in ids {
            for second in ids {
                if seen.contains(&(first.clone(), second.clone())) {
                    continue;
                }
                let (result, error) = match self.compare(first, second) {
                    Ok(v) => (Some(v), None),
                    Err(e) => {
                        debug!(first = %first, second = %second, error = %e, "comparison failed");
                        (None, Some(e.to_string()))
                    }
                };
                rows.push(ComparisonCacheRow {
                    first_item: first.clone(),
                    second_item: second.clone(),
                    result,
                    error,
                });
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"
values = {a: 1, b: 2, c: 4}
fn(x, y) = values[x] / values[y]
"#;

    fn env() -> Environment {
        Environment { seed: Some(5), sample_count: 200, ..Environment::default() }
    }

    #[test]
    fn compare_summarises_numbers() {
        let ev = ModelEvaluator::create(MODEL, env()).unwrap();
        let v = ev.compare("c", "a").unwrap();
        assert_eq!(v, RelativeValue { median: 4.0, min: 4.0, max: 4.0 });
    }

    #[test]
    fn compare_summarises_distributions() {
        let ev = ModelEvaluator::create("fn(x, y) = normal(10, 1)", env()).unwrap();
        let v = ev.compare("a", "b").unwrap();
        assert!((v.median - 10.0).abs() < 1e-6);
        assert!(v.min < v.median && v.median < v.max);
    }

    #[test]
    fn cache_skips_seen_pairs_and_records_errors() {
        let ev = ModelEvaluator::create(MODEL, env()).unwrap();
        let ids: Vec<String> = ["a", "b", "zzz"].iter().map(|s| s.to_string()).collect();
        let seen: HashSet<(String, String)> = [("a".to_string(), "a".to_string())].into_iter().collect();
        let rows = ev.build_comparison_cache(&ids, &seen);
        assert_eq!(rows.len(), 8);
        assert!(!rows.iter().any(|r| r.first_item == "a" && r.second_item == "a"));
        let bad = rows.iter().find(|r| r.first_item == "zzz" && r.second_item == "a").unwrap();
        assert_eq!(bad.error.as_deref(), Some("Dict property not found: zzz"));
        let ok = rows.iter().find(|r| r.first_item == "b" && r.second_item == "a").unwrap();
        assert_eq!(ok.result.as_ref().map(|r| r.median), Some(2.0));
        let json = serde_json::to_string(ok).unwrap();
        assert!(json.contains("\"firstItem\":\"b\""), "{}", json);
    }

    #[test]
    fn model_without_fn_is_rejected() {
        assert!(ModelEvaluator::create("x = 1", env()).is_err());
    }
}
