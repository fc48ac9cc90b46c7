use perfscope_common::types::{ReportSummary, ReportType, Suggestion};
use perfscope_report::ExtractError;
use perfscope_rules::{RuleError, RuleSource};

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("{0}")]
    Extraction(#[from] ExtractError),

    #[error("rule store unavailable: {0}")]
    Rules(#[from] RuleError),
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub summary: ReportSummary,
    pub suggestions: Vec<Suggestion>,
}

/// Extracts metrics from `content`, loads the rule set and evaluates it.
///
/// Synchronous and free of shared state; callers on an async runtime run it
/// on the blocking pool.
pub fn run_analysis(
    report_type: ReportType,
    content: &str,
    rules: &RuleSource,
) -> Result<AnalysisOutcome, AnalyzeError> {
    let summary = perfscope_report::extract(report_type, content)?;
    let rule_set = rules.load()?;
    let suggestions = rule_set.evaluate(&summary.transactions);

    tracing::info!(
        report_type = %report_type,
        transactions = summary.transactions.len(),
        rules = rule_set.len(),
        suggestions = suggestions.len(),
        "Report analyzed"
    );

    Ok(AnalysisOutcome {
        summary,
        suggestions,
    })
}
