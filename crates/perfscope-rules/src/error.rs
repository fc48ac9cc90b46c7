/// Errors raised while loading a rule document.
///
/// Problems confined to a single rule entry are not errors: the entry is
/// skipped and logged, and the rest of the document still loads.
///
/// # Examples
///
/// ```rust
/// use perfscope_rules::error::RuleError;
///
/// let err = RuleError::MissingRules;
/// assert!(err.to_string().contains("rules"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The rule file could not be read.
    #[error("failed to read rule file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML or not a mapping.
    #[error("invalid rule document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document has no top-level `rules` sequence.
    #[error("rule document has no top-level 'rules' collection")]
    MissingRules,
}

/// Convenience `Result` alias for rule loading.
pub type Result<T> = std::result::Result<T, RuleError>;
