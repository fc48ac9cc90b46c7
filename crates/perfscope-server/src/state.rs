use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use perfscope_rules::RuleSource;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Read on every analysis request; nothing is cached between requests.
    pub rule_source: Arc<RuleSource>,
    pub analysis_timeout: Duration,
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            rule_source: Arc::new(config.rule_source()),
            analysis_timeout: Duration::from_secs(config.analysis_timeout_secs),
            start_time: Utc::now(),
            config: Arc::new(config),
        }
    }
}
