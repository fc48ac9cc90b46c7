use crate::api::{error_response, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::Response;
use perfscope_common::types::MetricValue;
use perfscope_rules::Rule;
use serde::Serialize;
use utoipa::ToSchema;

/// 规则信息
#[derive(Serialize, ToSchema)]
pub struct RuleResponse {
    /// 规则 ID
    pub id: String,
    /// 指标名称
    pub metric: String,
    /// 比较运算符（> 或 <）
    pub operator: String,
    /// 阈值
    pub threshold: MetricValue,
    /// 生效优先级（未配置时为 3）
    pub priority: i64,
    /// 建议模板
    pub suggestion: String,
}

impl From<&Rule> for RuleResponse {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id.clone(),
            metric: rule.condition.metric.clone(),
            operator: rule.condition.operator.clone(),
            threshold: rule.condition.threshold,
            priority: rule.effective_priority(),
            suggestion: rule.suggestion.clone(),
        }
    }
}

/// 查询当前加载的规则集（按规则文件中的顺序）。
#[utoipa::path(
    get,
    path = "/v1/rules",
    tag = "Rules",
    responses(
        (status = 200, description = "规则列表", body = Vec<RuleResponse>),
        (status = 500, description = "规则加载失败", body = ApiError)
    )
)]
pub async fn list_rules(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> Response {
    let source = state.rule_source.clone();
    let loaded = tokio::task::spawn_blocking(move || source.load()).await;

    match loaded {
        Ok(Ok(set)) => {
            let items: Vec<RuleResponse> = set.rules().iter().map(RuleResponse::from).collect();
            success_response(StatusCode::OK, &trace_id, items)
        }
        Ok(Err(e)) => {
            tracing::error!(source = %state.rule_source, error = %e, "Rule store unavailable");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "rule_store_error",
                "rule store unavailable",
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Rule loading task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "internal_error",
                "internal error",
            )
        }
    }
}
