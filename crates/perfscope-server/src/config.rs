use perfscope_rules::RuleSource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// 规则文件路径（YAML），未配置时使用内置默认规则。
    /// 每次分析请求都会重新读取该文件。
    #[serde(default)]
    pub rules_path: Option<String>,

    /// 单次分析（解析 + 规则评估）的超时时间（秒）
    #[serde(default = "default_analysis_timeout_secs")]
    pub analysis_timeout_secs: u64,

    /// 请求体（报告原文）大小上限（字节）
    #[serde(default = "default_max_report_bytes")]
    pub max_report_bytes: usize,

    /// CORS 允许的 origins 列表，为空时允许所有来源（开发模式）
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            http_port: default_http_port(),
            rules_path: None,
            analysis_timeout_secs: default_analysis_timeout_secs(),
            max_report_bytes: default_max_report_bytes(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    5000
}

fn default_analysis_timeout_secs() -> u64 {
    30
}

fn default_max_report_bytes() -> usize {
    16 * 1024 * 1024
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn rule_source(&self) -> RuleSource {
        match &self.rules_path {
            Some(path) if !path.trim().is_empty() => RuleSource::File(PathBuf::from(path)),
            _ => RuleSource::Builtin,
        }
    }
}
