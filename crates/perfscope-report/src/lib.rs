//! Metric extraction for performance-test reports.
//!
//! Each [`ReportExtractor`] turns the raw text of one report format into a
//! [`ReportSummary`]: per-transaction latency and error statistics keyed by
//! transaction name, ready for rule evaluation.

pub mod error;
pub mod jmeter;
pub mod loadrunner;
pub mod stats;

pub use error::{ExtractError, Result};
pub use jmeter::JmeterCsvExtractor;
pub use loadrunner::LoadRunnerHtmlExtractor;

use perfscope_common::types::{ReportSummary, ReportType};

/// A parser for one performance report format.
///
/// Extractors are stateless; a single instance can be shared across threads
/// and reused for any number of reports.
pub trait ReportExtractor: Send + Sync {
    /// The report format this extractor understands.
    fn report_type(&self) -> ReportType;

    /// Parses `content` into per-transaction metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if the report does not have the structure this
    /// extractor expects. Partial results are never returned.
    fn extract(&self, content: &str) -> Result<ReportSummary>;
}

/// Returns the extractor registered for `report_type`.
pub fn extractor_for(report_type: ReportType) -> &'static dyn ReportExtractor {
    match report_type {
        ReportType::Jmeter => &JmeterCsvExtractor,
        ReportType::Loadrunner => &LoadRunnerHtmlExtractor,
    }
}

/// Parses `content` with the extractor for `report_type`.
pub fn extract(report_type: ReportType, content: &str) -> Result<ReportSummary> {
    let extractor = extractor_for(report_type);
    let summary = extractor.extract(content)?;
    tracing::debug!(
        report_type = %report_type,
        transactions = summary.transactions.len(),
        "Report extracted"
    );
    Ok(summary)
}
