//! Shared data model for perfscope: per-transaction metrics produced by the
//! report extractors, and the suggestions produced by the rule engine.

pub mod types;
