//! Rule engine that turns per-transaction metrics into prioritized
//! remediation suggestions.
//!
//! Rules are plain data: a threshold [`Condition`] on one metric plus a
//! suggestion template. [`engine::evaluate`] checks every rule against every
//! transaction's [`EvalContext`], renders the templates of the rules that
//! fire and returns the suggestions ordered by priority. Rule documents are
//! loaded through a [`RuleSource`], either a YAML file re-read on each load or
//! the built-in default set.

pub mod condition;
pub mod context;
pub mod engine;
pub mod error;
pub mod rule;
pub mod store;
pub mod template;


pub use condition::{CompareOp, Condition};
pub use context::{ContextValue, EvalContext};
pub use error::{Result, RuleError};
pub use rule::{Rule, DEFAULT_PRIORITY};
pub use store::{RuleSet, RuleSource};
