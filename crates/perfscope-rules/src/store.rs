use crate::engine;
use crate::error::{Result, RuleError};
use crate::rule::Rule;
use crate::template;
use perfscope_common::types::{Suggestion, TransactionMetrics};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Rule document compiled into the binary, used when no rule file is
/// configured.
pub const BUILTIN_RULES_YAML: &str = include_str!("../rules/default_rules.yaml");

#[derive(Deserialize)]
struct RulesDocument {
    #[serde(default)]
    rules: Option<Vec<serde_yaml::Value>>,
}

/// An ordered, read-only collection of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parses a YAML (or JSON) document with a top-level `rules` sequence.
    ///
    /// Entries that are malformed, carry an invalid suggestion template or
    /// repeat an earlier id are logged and skipped; the remaining entries
    /// keep their document order.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(RuleError::MissingRules);
        }
        let doc: RulesDocument = serde_yaml::from_str(content)?;
        let entries = doc.rules.ok_or(RuleError::MissingRules)?;

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let rule: Rule = match serde_yaml::from_value(entry) {
                Ok(rule) => rule,
                Err(e) => {
                    tracing::warn!(index, error = %e, "Malformed rule entry skipped");
                    continue;
                }
            };
            if rule.id.trim().is_empty() {
                tracing::warn!(index, "Rule without id skipped");
                continue;
            }
            if let Err(e) = template::validate(&rule.suggestion) {
                tracing::warn!(index, rule_id = %rule.id, error = %e, "Rule with invalid suggestion template skipped");
                continue;
            }
            if !seen.insert(rule.id.clone()) {
                tracing::warn!(index, rule_id = %rule.id, "Duplicate rule id skipped");
                continue;
            }
            rules.push(rule);
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Get a rule by its ID.
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn evaluate(&self, transactions: &TransactionMetrics) -> Vec<Suggestion> {
        engine::evaluate(transactions, &self.rules)
    }
}

/// Where a [`RuleSet`] comes from.
///
/// `load` performs no caching: a file source is re-read on every call, so
/// edits to the file apply to the next evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Builtin,
    File(PathBuf),
}

impl RuleSource {
    pub fn load(&self) -> Result<RuleSet> {
        match self {
            RuleSource::Builtin => RuleSet::from_yaml_str(BUILTIN_RULES_YAML),
            RuleSource::File(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                RuleSet::from_yaml_str(&content)
            }
        }
    }
}

impl std::fmt::Display for RuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleSource::Builtin => write!(f, "builtin"),
            RuleSource::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}
