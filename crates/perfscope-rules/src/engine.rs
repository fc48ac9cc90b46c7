use crate::context::EvalContext;
use crate::rule::Rule;
use crate::template::{self, TemplateVars};
use perfscope_common::types::{Suggestion, TransactionMetrics};

/// Evaluates every rule against every transaction and returns the
/// suggestions of the rules that fire, most urgent first.
///
/// Transactions are visited in map order and rules in slice order; the sort
/// by priority is stable, so suggestions of equal priority keep that
/// (transaction, rule) generation order. A rule whose metric is missing from
/// a transaction is skipped for it. A rule whose template cannot be rendered
/// is skipped and logged; it never aborts the pass.
pub fn evaluate(transactions: &TransactionMetrics, rules: &[Rule]) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for (transaction, metrics) in transactions {
        let ctx = EvalContext::new(transaction, metrics);

        for rule in rules {
            let Some(value) = ctx.get(&rule.condition.metric) else {
                tracing::trace!(
                    rule_id = %rule.id,
                    transaction = %transaction,
                    metric = %rule.condition.metric,
                    "Metric not present, rule skipped"
                );
                continue;
            };

            if !rule.condition.is_met(value) {
                continue;
            }

            let vars = TemplateVars {
                transaction_name: ctx.transaction_name(),
                value,
                threshold: rule.condition.threshold,
            };
            match template::render(&rule.suggestion, &vars) {
                Ok(text) => suggestions.push(Suggestion {
                    rule_id: rule.id.clone(),
                    transaction: transaction.clone(),
                    suggestion: text,
                    priority: rule.effective_priority(),
                }),
                Err(e) => {
                    tracing::warn!(
                        rule_id = %rule.id,
                        transaction = %transaction,
                        error = %e,
                        "Suggestion template could not be rendered, rule skipped"
                    );
                }
            }
        }
    }

    suggestions.sort_by_key(|s| s.priority);
    suggestions
}
