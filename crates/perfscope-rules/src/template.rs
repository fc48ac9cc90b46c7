//! Suggestion templates.
//!
//! A template is plain text with named placeholders in braces:
//!
//! - `{transaction_name}`, `{value}`, `{threshold}` substitute the
//!   transaction name, the metric value that triggered the rule and the
//!   rule's threshold.
//! - `{value:.1f}` formats a number with a fixed number of decimals. No
//!   other format spec is accepted.
//! - `{{` and `}}` produce literal braces.
//!
//! Numbers otherwise keep their natural form, e.g. `1200.0` or `1000`.
//!
//! ```
//! use perfscope_common::types::MetricValue;
//! use perfscope_rules::context::ContextValue;
//! use perfscope_rules::template::{render, TemplateVars};
//!
//! let vars = TemplateVars {
//!     transaction_name: "Login",
//!     value: ContextValue::Number(MetricValue::Float(1234.4)),
//!     threshold: MetricValue::Int(1000),
//! };
//! let text = render("{transaction_name}: {value:.0f} ms > {threshold} ms", &vars).unwrap();
//! assert_eq!(text, "Login: 1234 ms > 1000 ms");
//! ```

use crate::context::{ContextValue, TRANSACTION_NAME_KEY};
use perfscope_common::types::MetricValue;

const VALUE_KEY: &str = "value";
const THRESHOLD_KEY: &str = "threshold";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown placeholder '{{{0}}}'")]
    UnknownPlaceholder(String),

    #[error("unterminated placeholder at byte {0}")]
    Unterminated(usize),

    #[error("single '}}' at byte {0}")]
    StrayClose(usize),

    #[error("unsupported format spec '{spec}' for placeholder '{name}'")]
    UnsupportedSpec { name: String, spec: String },
}

/// Values substituted into a suggestion template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub transaction_name: &'a str,
    pub value: ContextValue<'a>,
    pub threshold: MetricValue,
}

#[derive(Debug, PartialEq)]
enum Segment<'t> {
    Text(&'t str),
    Placeholder {
        name: &'t str,
        precision: Option<usize>,
    },
}

fn parse_precision(name: &str, spec: &str) -> Result<usize, TemplateError> {
    spec.strip_prefix('.')
        .and_then(|rest| rest.strip_suffix('f'))
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| TemplateError::UnsupportedSpec {
            name: name.to_string(),
            spec: spec.to_string(),
        })
}

fn parse(template: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while let Some(found) = template[pos..].find(|c: char| c == '{' || c == '}') {
        let at = pos + found;
        if at > pos {
            segments.push(Segment::Text(&template[pos..at]));
        }
        let after = &template[at + 1..];

        if template[at..].starts_with('}') {
            if !after.starts_with('}') {
                return Err(TemplateError::StrayClose(at));
            }
            segments.push(Segment::Text("}"));
            pos = at + 2;
            continue;
        }

        if after.starts_with('{') {
            segments.push(Segment::Text("{"));
            pos = at + 2;
            continue;
        }

        let close = after.find('}').ok_or(TemplateError::Unterminated(at))?;
        let inner = &after[..close];
        if inner.contains('{') {
            return Err(TemplateError::Unterminated(at));
        }
        let (name, spec) = match inner.split_once(':') {
            Some((name, spec)) => (name, Some(spec)),
            None => (inner, None),
        };
        if ![TRANSACTION_NAME_KEY, VALUE_KEY, THRESHOLD_KEY].contains(&name) {
            return Err(TemplateError::UnknownPlaceholder(name.to_string()));
        }
        let precision = spec.map(|s| parse_precision(name, s)).transpose()?;
        segments.push(Segment::Placeholder { name, precision });
        pos = at + 1 + close + 1;
    }

    if pos < template.len() {
        segments.push(Segment::Text(&template[pos..]));
    }
    Ok(segments)
}

/// Checks that `template` only uses known placeholders and valid syntax.
pub fn validate(template: &str) -> Result<(), TemplateError> {
    parse(template).map(|_| ())
}

/// Renders `template` with `vars`.
pub fn render(template: &str, vars: &TemplateVars<'_>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + 16);
    for segment in parse(template)? {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder { name, precision } => {
                let value = match name {
                    TRANSACTION_NAME_KEY => ContextValue::Text(vars.transaction_name),
                    VALUE_KEY => vars.value,
                    _ => ContextValue::Number(vars.threshold),
                };
                match (precision, value) {
                    (None, value) => out.push_str(&value.to_string()),
                    (Some(p), ContextValue::Number(n)) => {
                        out.push_str(&format!("{:.*}", p, n.as_f64()));
                    }
                    (Some(p), ContextValue::Text(_)) => {
                        return Err(TemplateError::UnsupportedSpec {
                            name: name.to_string(),
                            spec: format!(".{p}f"),
                        });
                    }
                }
            }
        }
    }
    Ok(out)
}
