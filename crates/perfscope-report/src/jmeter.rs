use crate::error::{ExtractError, Result};
use crate::stats::{mean, quantile_sorted, round2};
use crate::ReportExtractor;
use perfscope_common::types::{
    MetricSet, MetricValue, ReportSummary, ReportType, TransactionMetrics,
    METRIC_AVG_RESPONSE_TIME_MS, METRIC_ERROR_RATE_PERCENT, METRIC_P95_RESPONSE_TIME_MS,
    METRIC_TOTAL_REQUESTS,
};
use std::collections::BTreeMap;

const COL_LABEL: &str = "label";
const COL_ELAPSED: &str = "elapsed";
const COL_SUCCESS: &str = "success";
const COL_TIMESTAMP: &str = "timeStamp";

const P95: f64 = 0.95;

/// Extracts per-label statistics from a JMeter CSV result log.
///
/// Only the `label`, `elapsed`, `success` and `timeStamp` (epoch millis)
/// columns are read; any other columns JMeter was configured to write are
/// ignored.
pub struct JmeterCsvExtractor;

struct Columns {
    label: usize,
    elapsed: usize,
    success: usize,
    timestamp: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ExtractError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            label: find(COL_LABEL)?,
            elapsed: find(COL_ELAPSED)?,
            success: find(COL_SUCCESS)?,
            timestamp: find(COL_TIMESTAMP)?,
        })
    }
}

#[derive(Default)]
struct LabelSamples {
    elapsed: Vec<f64>,
    failures: usize,
}

impl LabelSamples {
    fn into_metrics(mut self) -> MetricSet {
        let count = self.elapsed.len();
        self.elapsed.sort_by(f64::total_cmp);
        let error_rate = if count == 0 {
            0.0
        } else {
            self.failures as f64 / count as f64 * 100.0
        };

        let mut metrics = MetricSet::new();
        metrics.insert(
            METRIC_TOTAL_REQUESTS.to_string(),
            MetricValue::Int(count as i64),
        );
        metrics.insert(
            METRIC_AVG_RESPONSE_TIME_MS.to_string(),
            MetricValue::Float(round2(mean(&self.elapsed))),
        );
        metrics.insert(
            METRIC_P95_RESPONSE_TIME_MS.to_string(),
            MetricValue::Float(round2(quantile_sorted(&self.elapsed, P95))),
        );
        metrics.insert(
            METRIC_ERROR_RATE_PERCENT.to_string(),
            MetricValue::Float(round2(error_rate)),
        );
        metrics
    }
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, row: usize, name: &'static str) -> Result<&'r str> {
    record
        .get(idx)
        .ok_or(ExtractError::InvalidField { row, field: name })
}

fn parse_success(raw: &str, row: usize) -> Result<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ExtractError::InvalidField {
            row,
            field: COL_SUCCESS,
        })
    }
}

/// Events per second over the span between the earliest and latest
/// timestamps. Zero when there are fewer than two events or the span is empty.
fn global_rate(total: usize, span_ms: Option<(f64, f64)>) -> f64 {
    if total < 2 {
        return 0.0;
    }
    match span_ms {
        Some((min, max)) if max > min => total as f64 / ((max - min) / 1000.0),
        _ => 0.0,
    }
}

impl ReportExtractor for JmeterCsvExtractor {
    fn report_type(&self) -> ReportType {
        ReportType::Jmeter
    }

    fn extract(&self, content: &str) -> Result<ReportSummary> {
        let content = content.trim_start_matches('\u{feff}');
        if content.trim().is_empty() {
            return Err(ExtractError::EmptyReport);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let columns = Columns::locate(reader.headers()?)?;

        let mut groups: BTreeMap<String, LabelSamples> = BTreeMap::new();
        let mut total = 0usize;
        let mut span: Option<(f64, f64)> = None;

        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            // header occupies row 1
            let row = idx + 2;

            let label = field(&record, columns.label, row, COL_LABEL)?;
            let elapsed: f64 = field(&record, columns.elapsed, row, COL_ELAPSED)?
                .parse()
                .map_err(|_| ExtractError::InvalidField {
                    row,
                    field: COL_ELAPSED,
                })?;
            let success = parse_success(field(&record, columns.success, row, COL_SUCCESS)?, row)?;
            let timestamp: f64 = field(&record, columns.timestamp, row, COL_TIMESTAMP)?
                .parse()
                .map_err(|_| ExtractError::InvalidField {
                    row,
                    field: COL_TIMESTAMP,
                })?;

            let samples = groups.entry(label.to_string()).or_default();
            samples.elapsed.push(elapsed);
            if !success {
                samples.failures += 1;
            }

            total += 1;
            span = Some(match span {
                None => (timestamp, timestamp),
                Some((min, max)) => (min.min(timestamp), max.max(timestamp)),
            });
        }

        let transactions: TransactionMetrics = groups
            .into_iter()
            .map(|(label, samples)| (label, samples.into_metrics()))
            .collect();

        Ok(ReportSummary {
            report_type: ReportType::Jmeter,
            transactions,
            global_tps: Some(global_rate(total, span)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(summary: &ReportSummary, tx: &str, name: &str) -> MetricValue {
        summary.transactions[tx][name]
    }

    #[test]
    fn computes_per_label_statistics_and_global_rate() {
        let csv = "timeStamp,elapsed,label,responseCode,success\n\
                   1700000000000,100,A,200,true\n\
                   1700000000500,200,A,200,true\n\
                   1700000001000,300,A,200,true\n";
        let summary = JmeterCsvExtractor.extract(csv).unwrap();

        assert_eq!(summary.report_type, ReportType::Jmeter);
        assert_eq!(metric(&summary, "A", METRIC_TOTAL_REQUESTS), MetricValue::Int(3));
        assert_eq!(
            metric(&summary, "A", METRIC_AVG_RESPONSE_TIME_MS),
            MetricValue::Float(200.0)
        );
        assert_eq!(
            metric(&summary, "A", METRIC_P95_RESPONSE_TIME_MS),
            MetricValue::Float(290.0)
        );
        assert_eq!(
            metric(&summary, "A", METRIC_ERROR_RATE_PERCENT),
            MetricValue::Float(0.0)
        );
        assert_eq!(summary.global_tps, Some(3.0));
    }

    #[test]
    fn failure_ratio_is_a_percentage_per_label() {
        let csv = "timeStamp,elapsed,label,success\n\
                   1000,10,Login,true\n\
                   2000,20,Login,false\n\
                   3000,30,Login,FALSE\n\
                   4000,40,Search,true\n";
        let summary = JmeterCsvExtractor.extract(csv).unwrap();

        assert_eq!(
            metric(&summary, "Login", METRIC_ERROR_RATE_PERCENT),
            MetricValue::Float(66.67)
        );
        assert_eq!(
            metric(&summary, "Search", METRIC_ERROR_RATE_PERCENT),
            MetricValue::Float(0.0)
        );
        let labels: Vec<&String> = summary.transactions.keys().collect();
        assert_eq!(labels, ["Login", "Search"]);
        // 4 events over 3 seconds
        let tps = summary.global_tps.unwrap();
        assert!((tps - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn average_on_an_exact_tie_rounds_to_even() {
        let mut csv = String::from("timeStamp,elapsed,label,success\n");
        for i in 0..7 {
            csv.push_str(&format!("{},100,A,true\n", 1000 + i));
        }
        csv.push_str("2000,101,A,true\n");
        let summary = JmeterCsvExtractor.extract(&csv).unwrap();
        // mean is exactly 100.125
        assert_eq!(
            metric(&summary, "A", METRIC_AVG_RESPONSE_TIME_MS),
            MetricValue::Float(100.12)
        );
    }

    #[test]
    fn labels_come_out_sorted_whatever_the_row_order() {
        let csv = "timeStamp,elapsed,label,success\n\
                   1000,10,Search,true\n\
                   2000,20,Login,true\n\
                   3000,30,Browse,true\n";
        let summary = JmeterCsvExtractor.extract(csv).unwrap();
        let labels: Vec<&str> = summary.transactions.keys().map(String::as_str).collect();
        assert_eq!(labels, ["Browse", "Login", "Search"]);
    }

    #[test]
    fn single_event_has_zero_global_rate() {
        let csv = "timeStamp,elapsed,label,success\n1000,10,Only,true\n";
        let summary = JmeterCsvExtractor.extract(csv).unwrap();
        assert_eq!(summary.global_tps, Some(0.0));
    }

    #[test]
    fn identical_timestamps_have_zero_global_rate() {
        let csv = "timeStamp,elapsed,label,success\n1000,10,A,true\n1000,20,A,true\n";
        let summary = JmeterCsvExtractor.extract(csv).unwrap();
        assert_eq!(summary.global_tps, Some(0.0));
    }

    #[test]
    fn header_only_report_has_no_transactions() {
        let csv = "timeStamp,elapsed,label,success\n";
        let summary = JmeterCsvExtractor.extract(csv).unwrap();
        assert!(summary.transactions.is_empty());
        assert_eq!(summary.global_tps, Some(0.0));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let csv = "timeStamp,label,success\n1000,A,true\n";
        let err = JmeterCsvExtractor.extract(csv).unwrap_err();
        assert!(matches!(err, ExtractError::MissingColumn(ref c) if c == "elapsed"));
    }

    #[test]
    fn invalid_number_names_row_without_echoing_value() {
        let csv = "timeStamp,elapsed,label,success\n1000,10,A,true\n2000,secret-token,A,true\n";
        let err = JmeterCsvExtractor.extract(csv).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::InvalidField { row: 3, field: "elapsed" }
        ));
        assert!(!err.to_string().contains("secret-token"));
    }

    #[test]
    fn unknown_success_flag_is_rejected() {
        let csv = "timeStamp,elapsed,label,success\n1000,10,A,maybe\n";
        let err = JmeterCsvExtractor.extract(csv).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidField { field: "success", .. }));
    }

    #[test]
    fn empty_report_is_rejected() {
        assert!(matches!(
            JmeterCsvExtractor.extract("  \n"),
            Err(ExtractError::EmptyReport)
        ));
    }
}
