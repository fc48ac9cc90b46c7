/// Errors raised while turning report text into transaction metrics.
///
/// Messages name rows and columns but never repeat report content.
///
/// # Examples
///
/// ```rust
/// use perfscope_report::error::ExtractError;
///
/// let err = ExtractError::MissingColumn("elapsed".to_string());
/// assert!(err.to_string().contains("elapsed"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The report has no content at all.
    #[error("report is empty")]
    EmptyReport,

    /// A column required to compute the metrics is not in the CSV header.
    #[error("required column '{0}' not found in report header")]
    MissingColumn(String),

    /// A field could not be parsed into the expected type.
    #[error("invalid {field} value at row {row}")]
    InvalidField { row: usize, field: &'static str },

    /// The CSV layer rejected the document.
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The HTML document does not contain the transaction summary table.
    #[error("transaction summary table not found, format not recognized")]
    TableNotFound,

    /// A summary table row has fewer cells than the known fields need.
    #[error("summary table row {row} has {found} cells, expected at least {expected}")]
    MalformedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Convenience `Result` alias for extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;
