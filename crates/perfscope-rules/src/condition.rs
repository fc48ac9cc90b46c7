use crate::context::ContextValue;
use perfscope_common::types::MetricValue;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    GreaterThan,
    LessThan,
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Self::GreaterThan),
            "<" => Ok(Self::LessThan),
            _ => Err(format!("unknown compare operator: {s}")),
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GreaterThan => write!(f, ">"),
            Self::LessThan => write!(f, "<"),
        }
    }
}

impl CompareOp {
    pub fn check(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
        }
    }
}

/// Threshold predicate on a single named metric.
///
/// The operator is kept as written so that a rule with an operator this
/// engine does not know still loads; such a condition is never met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub metric: String,
    pub operator: String,
    pub threshold: MetricValue,
}

impl Condition {
    pub fn new(metric: impl Into<String>, operator: CompareOp, threshold: impl Into<MetricValue>) -> Self {
        Self {
            metric: metric.into(),
            operator: operator.to_string(),
            threshold: threshold.into(),
        }
    }

    /// The parsed operator, or `None` if it is not one of `>` / `<`.
    pub fn compare_op(&self) -> Option<CompareOp> {
        self.operator.parse().ok()
    }

    /// Whether `value` satisfies this condition.
    ///
    /// Text values and unknown operators never satisfy a condition.
    pub fn is_met(&self, value: ContextValue<'_>) -> bool {
        let ContextValue::Number(number) = value else {
            return false;
        };
        match self.compare_op() {
            Some(op) => op.check(number.as_f64(), self.threshold.as_f64()),
            None => {
                tracing::debug!(
                    metric = %self.metric,
                    operator = %self.operator,
                    "Unknown operator, condition not met"
                );
                false
            }
        }
    }
}
