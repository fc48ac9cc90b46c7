use crate::error::{ExtractError, Result};
use crate::stats::round2;
use crate::ReportExtractor;
use perfscope_common::types::{
    MetricSet, MetricValue, ReportSummary, ReportType, TransactionMetrics,
    METRIC_AVG_RESPONSE_TIME_MS, METRIC_ERROR_RATE_PERCENT, METRIC_TOTAL_REQUESTS,
};
use regex::Regex;
use std::sync::LazyLock;

/// Class carried by the transaction summary table in LoadRunner analysis
/// exports.
const SUMMARY_TABLE_CLASS: &str = "TransactionSummary";

/// Cells 0 (name), 2 (average) and 4 (error rate) must be present.
const MIN_CELLS: usize = 5;
const CELL_NAME: usize = 0;
const CELL_AVG_SECS: usize = 2;
const CELL_ERROR_RATE: usize = 4;

static TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table\b([^>]*)>(.*?)</table\s*>").expect("valid regex"));
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).expect("valid regex")
});
static ROW_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<tr\b[^>]*>").expect("valid regex"));
static ROW_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</tr\s*>").expect("valid regex"));
static CELL_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<td\b[^>]*>").expect("valid regex"));
static CELL_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</td\s*>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

/// Extracts transaction rows from the summary table of a LoadRunner HTML
/// analysis report.
///
/// LoadRunner reports average response time in seconds; it is converted to
/// milliseconds. Request counts are not part of the summary table, so
/// `total_requests` is always `0`.
pub struct LoadRunnerHtmlExtractor;

fn has_summary_class(attrs: &str) -> bool {
    CLASS_RE
        .captures(attrs)
        .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .is_some_and(|m| {
            m.as_str()
                .split_whitespace()
                .any(|class| class == SUMMARY_TABLE_CLASS)
        })
}

/// Inner HTML of every element opened by `start`, up to its closing tag or
/// the next opening tag, whichever comes first.
fn segments<'a>(html: &'a str, start: &Regex, end: &Regex) -> Vec<&'a str> {
    let starts: Vec<regex::Match<'a>> = start.find_iter(html).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let limit = starts.get(i + 1).map_or(html.len(), |next| next.start());
            let body = &html[m.end()..limit];
            end.find(body).map_or(body, |close| &body[..close.start()])
        })
        .collect()
}

fn cell_text(cell_html: &str) -> String {
    let stripped = TAG_RE.replace_all(cell_html, "");
    html_escape::decode_html_entities(&stripped).trim().to_string()
}

fn parse_seconds(text: &str, row: usize) -> Result<f64> {
    text.trim_end_matches(|c: char| c == 's' || c.is_whitespace())
        .parse()
        .map_err(|_| ExtractError::InvalidField {
            row,
            field: METRIC_AVG_RESPONSE_TIME_MS,
        })
}

fn parse_percent(text: &str, row: usize) -> Result<f64> {
    text.trim_end_matches('%')
        .trim()
        .parse()
        .map_err(|_| ExtractError::InvalidField {
            row,
            field: METRIC_ERROR_RATE_PERCENT,
        })
}

impl ReportExtractor for LoadRunnerHtmlExtractor {
    fn report_type(&self) -> ReportType {
        ReportType::Loadrunner
    }

    fn extract(&self, content: &str) -> Result<ReportSummary> {
        if content.trim().is_empty() {
            return Err(ExtractError::EmptyReport);
        }

        let table = TABLE_RE
            .captures_iter(content)
            .find(|c| c.get(1).is_some_and(|attrs| has_summary_class(attrs.as_str())))
            .and_then(|c| c.get(2))
            .ok_or(ExtractError::TableNotFound)?;

        let mut transactions = TransactionMetrics::new();

        // first row is the header
        for (idx, row_html) in segments(table.as_str(), &ROW_START_RE, &ROW_END_RE)
            .into_iter()
            .enumerate()
            .skip(1)
        {
            let row = idx + 1;
            let cells: Vec<String> = segments(row_html, &CELL_START_RE, &CELL_END_RE)
                .into_iter()
                .map(cell_text)
                .collect();
            if cells.len() < MIN_CELLS {
                return Err(ExtractError::MalformedRow {
                    row,
                    found: cells.len(),
                    expected: MIN_CELLS,
                });
            }

            let avg_ms = parse_seconds(&cells[CELL_AVG_SECS], row)? * 1000.0;
            let error_rate = parse_percent(&cells[CELL_ERROR_RATE], row)?;

            let mut metrics = MetricSet::new();
            metrics.insert(
                METRIC_AVG_RESPONSE_TIME_MS.to_string(),
                MetricValue::Float(round2(avg_ms)),
            );
            metrics.insert(
                METRIC_ERROR_RATE_PERCENT.to_string(),
                MetricValue::Float(round2(error_rate)),
            );
            metrics.insert(METRIC_TOTAL_REQUESTS.to_string(), MetricValue::Int(0));

            let name = cells[CELL_NAME].clone();
            if transactions.insert(name, metrics).is_some() {
                tracing::debug!(row, "Duplicate transaction row replaces earlier entry");
            }
        }

        Ok(ReportSummary {
            report_type: ReportType::Loadrunner,
            transactions,
            global_tps: None,
        })
    }
}
