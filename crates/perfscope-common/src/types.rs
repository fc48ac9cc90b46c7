use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// A numeric metric or threshold value that remembers whether it was written
/// as an integer or as a float.
///
/// The text form follows the natural representation of the number: integers
/// print without a fractional part, floats always carry one.
///
/// # Examples
///
/// ```
/// use perfscope_common::types::MetricValue;
///
/// assert_eq!(MetricValue::Int(1000).to_string(), "1000");
/// assert_eq!(MetricValue::Float(1200.0).to_string(), "1200.0");
/// assert_eq!(MetricValue::Float(290.5).to_string(), "290.5");
/// assert_eq!(MetricValue::Int(2).as_f64(), 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricValue::Int(v) => v as f64,
            MetricValue::Float(v) => v,
        }
    }
}

/// Shortest round-trip form of `v`. Magnitudes below `1e-4` or from `1e16`
/// up use an exponent with an explicit sign and at least two digits
/// (`1e+20`, `1.5e-07`); everything else is positional with at least one
/// fractional digit.
fn fmt_float(v: f64, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if v.is_nan() {
        return f.write_str("nan");
    }
    let magnitude = v.abs();
    if v.is_infinite() || magnitude == 0.0 || (1e-4..1e16).contains(&magnitude) {
        // Debug keeps the trailing ".0" on whole floats
        return write!(f, "{v:?}");
    }
    let sci = format!("{v:e}");
    match sci.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            write!(f, "{mantissa}e{sign}{digits:0>2}")
        }
        None => f.write_str(&sci),
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{v}"),
            MetricValue::Float(v) => fmt_float(*v, f),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

/// Metric name -> value for a single transaction.
pub type MetricSet = BTreeMap<String, MetricValue>;

/// Transaction name -> metrics, in the order the report lists them.
///
/// Extractors decide that order (JMeter: sorted by label, LoadRunner: table
/// row order) and every later pass, including tie order among suggestions
/// of equal priority, follows it.
pub type TransactionMetrics = IndexMap<String, MetricSet>;

pub const METRIC_TOTAL_REQUESTS: &str = "total_requests";
pub const METRIC_AVG_RESPONSE_TIME_MS: &str = "avg_response_time_ms";
pub const METRIC_P95_RESPONSE_TIME_MS: &str = "p95_response_time_ms";
pub const METRIC_ERROR_RATE_PERCENT: &str = "error_rate_percent";

/// Supported performance report formats.
///
/// # Examples
///
/// ```
/// use perfscope_common::types::ReportType;
///
/// let kind: ReportType = "jmeter".parse().unwrap();
/// assert_eq!(kind, ReportType::Jmeter);
/// assert_eq!(ReportType::Loadrunner.to_string(), "loadrunner");
/// assert!("gatling".parse::<ReportType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// JMeter CSV result log
    Jmeter,
    /// LoadRunner HTML analysis report
    Loadrunner,
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportType::Jmeter => write!(f, "jmeter"),
            ReportType::Loadrunner => write!(f, "loadrunner"),
        }
    }
}

impl std::str::FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jmeter" => Ok(ReportType::Jmeter),
            "loadrunner" => Ok(ReportType::Loadrunner),
            _ => Err(format!("unsupported report type: {s}")),
        }
    }
}

/// 报告解析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportSummary {
    /// 报告类型（jmeter / loadrunner）
    pub report_type: ReportType,
    /// 事务指标：事务名 -> 指标名 -> 数值
    #[schema(value_type = Object)]
    pub transactions: TransactionMetrics,
    /// 全局 TPS（仅 JMeter 报告提供）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_tps: Option<f64>,
}

/// 修复建议
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Suggestion {
    /// 触发的规则 ID
    pub rule_id: String,
    /// 事务名称
    pub transaction: String,
    /// 渲染后的建议文本
    pub suggestion: String,
    /// 优先级（数值越小越紧急）
    pub priority: i64,
}

/// 报告分析请求
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// 报告类型（jmeter / loadrunner）
    #[serde(default)]
    pub report_type: Option<String>,
    /// 报告原文（JMeter CSV 或 LoadRunner HTML）
    #[serde(default)]
    pub content: Option<String>,
}
