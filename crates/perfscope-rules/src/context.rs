use perfscope_common::types::{MetricSet, MetricValue};
use std::collections::BTreeMap;

/// Context key under which the transaction name is exposed to rules and
/// templates.
pub const TRANSACTION_NAME_KEY: &str = "transaction_name";

/// A value visible to rule conditions: the transaction name or a metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContextValue<'a> {
    Text(&'a str),
    Number(MetricValue),
}

impl std::fmt::Display for ContextValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextValue::Text(s) => f.write_str(s),
            ContextValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Per-transaction name -> value view that rule conditions are evaluated
/// against: every metric of the transaction plus `transaction_name`.
#[derive(Debug, Clone)]
pub struct EvalContext<'a> {
    transaction: &'a str,
    values: BTreeMap<&'a str, ContextValue<'a>>,
}

impl<'a> EvalContext<'a> {
    pub fn new(transaction: &'a str, metrics: &'a MetricSet) -> Self {
        let mut values: BTreeMap<&'a str, ContextValue<'a>> = metrics
            .iter()
            .map(|(name, value)| (name.as_str(), ContextValue::Number(*value)))
            .collect();
        // inserted last: a metric named `transaction_name` never shadows the name
        values.insert(TRANSACTION_NAME_KEY, ContextValue::Text(transaction));
        Self {
            transaction,
            values,
        }
    }

    pub fn transaction_name(&self) -> &'a str {
        self.transaction
    }

    pub fn get(&self, key: &str) -> Option<ContextValue<'a>> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
