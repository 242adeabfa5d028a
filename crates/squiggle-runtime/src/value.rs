//! Runtime values.
//!
//! Values are immutable once built: arrays and dicts sit behind `Arc` and are
//! copied on write, so a clone is O(1) and never observes later updates.

use crate::context::ReducerContext;
use crate::dist::Dist;
use crate::error::RuntimeError;
use crate::lambda::Lambda;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::Arc;

pub type ValueMap = IndexMap<String, Value>;

pub const SCALE_POWER_DEFAULT_CONSTANT: f64 = 0.1;

pub const MS_PER_MINUTE: f64 = 60_000.0;
pub const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;
pub const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;
pub const MS_PER_YEAR: f64 = 365.25 * MS_PER_DAY;

#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Date(DateTime<Utc>),
    /// Milliseconds.
    Duration(f64),
    Array(Arc<Vec<Value>>),
    Dict(Arc<ValueMap>),
    Lambda(Lambda),
    Dist(Dist),
    Scale(Scale),
    Domain(Domain),
    Plot(Arc<Plot>),
    TableChart(Arc<TableChart>),
    Void,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScaleKind {
    Linear,
    Log,
    Symlog { constant: Option<f64> },
    Power { exponent: Option<f64> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    pub kind: ScaleKind,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub tick_format: Option<String>,
}

impl Scale {
    pub fn linear() -> Self {
        Scale { kind: ScaleKind::Linear, min: None, max: None, tick_format: None }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ScaleKind::Linear => "linear",
            ScaleKind::Log => "log",
            ScaleKind::Symlog { .. } => "symlog",
            ScaleKind::Power { .. } => "power",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    NumericRange { min: f64, max: f64 },
}

impl Domain {
    pub fn numeric_range(min: f64, max: f64) -> Result<Self, RuntimeError> {
        if min > max {
            return Err(RuntimeError::other(format!(
                "The range minimum ({}) must be lower than the range maximum ({})",
                format_number(min),
                format_number(max)
            )));
        }
        Ok(Domain::NumericRange { min, max })
    }

    pub fn includes(&self, v: &Value) -> bool {
        match (self, v) {
            (Domain::NumericRange { min, max }, Value::Number(x)) => x >= min && x <= max,
            _ => false,
        }
    }

    /// Check a call argument against this domain.
    pub fn validate(&self, v: &Value) -> Result<(), RuntimeError> {
        if self.includes(v) {
            return Ok(());
        }
        Err(RuntimeError::Domain { value: v.to_string(), domain: self.to_string() })
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::NumericRange { min, max } => write!(
                f,
                "Number.rangeDomain({{ min: {}, max: {} }})",
                format_number(*min),
                format_number(*max)
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LabeledDistribution {
    pub name: Option<String>,
    pub distribution: Dist,
}

#[derive(Debug, Clone)]
pub enum Plot {
    Distributions {
        distributions: Vec<LabeledDistribution>,
        x_scale: Scale,
        y_scale: Scale,
        title: Option<String>,
        show_summary: bool,
    },
    NumericFn {
        func: Lambda,
        x_scale: Scale,
        y_scale: Scale,
        points: usize,
    },
    DistFn {
        func: Lambda,
        x_scale: Scale,
        y_scale: Scale,
        dist_x_scale: Scale,
        points: usize,
    },
    Scatter {
        x_dist: Dist,
        y_dist: Dist,
        x_scale: Scale,
        y_scale: Scale,
    },
    RelativeValues {
        func: Lambda,
        ids: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct TableColumn {
    pub func: Lambda,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TableChart {
    pub data: Vec<Value>,
    pub columns: Vec<TableColumn>,
}

impl TableChart {
    /// Evaluate one cell: the column's function applied to the row's datum.
    pub fn item(&self, row: usize, column: usize, ctx: &mut ReducerContext) -> Result<Value, RuntimeError> {
        let datum = self.data.get(row).ok_or_else(|| RuntimeError::ArrayIndexNotFound {
            message: "Table row not found".into(),
            index: row as f64,
        })?;
        let col = self.columns.get(column).ok_or_else(|| RuntimeError::ArrayIndexNotFound {
            message: "Table column not found".into(),
            index: column as f64,
        })?;
        col.func.call(std::slice::from_ref(datum), ctx)
    }
}

/// Render a number the way JavaScript's `String(n)` does.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    if n == 0.0 {
        return "0".into();
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return format!("{}", n);
    }
    let s = format!("{:e}", n);
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => s,
    }
}

/// Three significant digits, switching to exponent form the way `toPrecision(3)` does.
/// The exponent is read after rounding so that 999.6 becomes `1.00e+3`.
fn to_precision_3(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format_number(v);
    }
    let sci = format!("{:.2e}", v);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return format_number(v);
    };
    match exponent.parse::<i32>() {
        Ok(e) if (-6..3).contains(&e) => format!("{:.*}", (2 - e) as usize, v),
        Ok(e) => format!("{}e{}{}", mantissa, if e < 0 { '-' } else { '+' }, e.abs()),
        Err(_) => format_number(v),
    }
}

pub fn format_duration(ms: f64) -> String {
    let abs = ms.abs();
    let unit = |v: f64, name: &str| {
        if v == 1.0 {
            format!("1 {}", name)
        } else {
            format!("{} {}s", to_precision_3(v), name)
        }
    };
    if abs >= MS_PER_YEAR {
        unit(ms / MS_PER_YEAR, "year")
    } else if abs >= MS_PER_DAY {
        unit(ms / MS_PER_DAY, "day")
    } else if abs >= MS_PER_HOUR {
        unit(ms / MS_PER_HOUR, "hour")
    } else if abs >= MS_PER_MINUTE {
        unit(ms / MS_PER_MINUTE, "minute")
    } else {
        format!("{}ms", format_number(ms))
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Bool(_) => "Bool",
            Value::Date(_) => "Date",
            Value::Duration(_) => "Duration",
            Value::Array(_) => "Array",
            Value::Dict(_) => "Dict",
            Value::Lambda(_) => "Lambda",
            Value::Dist(_) => "Dist",
            Value::Scale(_) => "Scale",
            Value::Domain(_) => "Domain",
            Value::Plot(_) => "Plot",
            Value::TableChart(_) => "TableChart",
            Value::Void => "Void",
        }
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Arc::new(items))
    }

    pub fn dict(map: ValueMap) -> Value {
        Value::Dict(Arc::new(map))
    }

    pub fn string<S: Into<String>>(s: S) -> Value {
        Value::String(s.into())
    }

    /// Structural field/index access used by `a.b`, `a[b]` and viewers.
    pub fn get(&self, key: &Value) -> Result<Value, RuntimeError> {
        match self {
            Value::Array(items) => match key {
                Value::Number(n) => {
                    if n.fract() != 0.0 || !n.is_finite() {
                        return Err(RuntimeError::ArrayIndexNotFound {
                            message: "Array index must be an integer".into(),
                            index: *n,
                        });
                    }
                    if *n >= 0.0 && (*n as usize) < items.len() {
                        Ok(items[*n as usize].clone())
                    } else {
                        Err(RuntimeError::ArrayIndexNotFound {
                            message: "Array index not found".into(),
                            index: *n,
                        })
                    }
                }
                _ => Err(RuntimeError::other("Can't access non-numerical key on an array")),
            },
            Value::Dict(map) => match key {
                Value::String(k) => map.get(k).cloned().ok_or_else(|| {
                    RuntimeError::DictPropertyNotFound {
                        message: "Dict property not found".into(),
                        key: k.clone(),
                    }
                }),
                _ => Err(RuntimeError::other("Can't access non-string key on a dict")),
            },
            Value::Lambda(l) => match key {
                Value::String(k) if k == "parameters" => {
                    let params = l
                        .parameters()
                        .into_iter()
                        .map(|p| {
                            let mut fields = ValueMap::new();
                            fields.insert("name".into(), Value::String(p.name));
                            if let Some(d) = p.domain {
                                fields.insert("domain".into(), Value::Domain(d));
                            }
                            Value::dict(fields)
                        })
                        .collect();
                    Ok(Value::array(params))
                }
                _ => Err(RuntimeError::other("No such field")),
            },
            Value::Plot(plot) => match (key, plot.as_ref()) {
                (Value::String(k), Plot::NumericFn { func, .. })
                | (Value::String(k), Plot::DistFn { func, .. })
                | (Value::String(k), Plot::RelativeValues { func, .. })
                    if k == "fn" =>
                {
                    Ok(Value::Lambda(func.clone()))
                }
                _ => Err(RuntimeError::other("Trying to access non-existent field")),
            },
            Value::Domain(Domain::NumericRange { min, max }) => match key {
                Value::String(k) if k == "min" => Ok(Value::Number(*min)),
                Value::String(k) if k == "max" => Ok(Value::Number(*max)),
                _ => Err(RuntimeError::other("Trying to access non-existent field")),
            },
            Value::Number(_)
            | Value::String(_)
            | Value::Bool(_)
            | Value::Date(_)
            | Value::Duration(_)
            | Value::Dist(_)
            | Value::Scale(_)
            | Value::TableChart(_)
            | Value::Void => Err(RuntimeError::NotIndexable { type_name: self.type_name().into() }),
        }
    }

    /// Structural equality for data values; functions and distributions never compare equal.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.is_equal(y))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).map(|w| v.is_equal(w)).unwrap_or(false))
            }
            (Value::Scale(a), Value::Scale(b)) => a == b,
            (Value::Domain(a), Value::Domain(b)) => a == b,
            (Value::Void, Value::Void) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => match serde_json::to_string(s) {
                Ok(quoted) => f.write_str(&quoted),
                Err(_) => write!(f, "{:?}", s),
            },
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%a %b %d %Y")),
            Value::Duration(ms) => f.write_str(&format_duration(*ms)),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(","))
            }
            Value::Dict(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(","))
            }
            Value::Lambda(l) => write!(f, "{}", l),
            Value::Dist(d) => write!(f, "{}", d),
            Value::Scale(s) => match s.kind {
                ScaleKind::Linear => f.write_str("Linear scale"),
                ScaleKind::Log => f.write_str("Logarithmic scale"),
                ScaleKind::Symlog { .. } => f.write_str("Symlog scale"),
                ScaleKind::Power { exponent } => write!(
                    f,
                    "Power scale ({})",
                    format_number(exponent.unwrap_or(SCALE_POWER_DEFAULT_CONSTANT))
                ),
            },
            Value::Domain(d) => write!(f, "{}", d),
            Value::Plot(p) => match p.as_ref() {
                Plot::Distributions { distributions, .. } => {
                    let names: Vec<&str> =
                        distributions.iter().map(|d| d.name.as_deref().unwrap_or("")).collect();
                    write!(f, "Plot containing {}", names.join(", "))
                }
                Plot::NumericFn { func, .. } => write!(f, "Plot for numeric function {}", func),
                Plot::DistFn { func, .. } => write!(f, "Plot for dist function {}", func),
                Plot::Scatter { x_dist, y_dist, .. } => {
                    write!(f, "Scatter plot for distributions {} and {}", x_dist, y_dist)
                }
                Plot::RelativeValues { ids, .. } => {
                    write!(f, "Plot for relative values {}", ids.join(", "))
                }
            },
            Value::TableChart(t) => {
                write!(f, "Table with {}x{} elements", t.columns.len(), t.data.len())
            }
            Value::Void => f.write_str("()"),
        }
    }
}
