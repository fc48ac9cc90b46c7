use crate::analysis::{run_analysis, AnalyzeError};
use crate::api::{error_response, ApiError, STATUS_SUCCESS};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use perfscope_common::types::{AnalyzeRequest, ReportSummary, ReportType, Suggestion};
use serde::Serialize;
use utoipa::ToSchema;

/// 报告分析结果
#[derive(Serialize, ToSchema)]
pub struct AnalyzeResponse {
    /// 固定为 success
    pub status: String,
    /// 报告解析得到的指标
    pub summary: ReportSummary,
    /// 按优先级升序排列的建议
    pub suggestions: Vec<Suggestion>,
    /// 链路追踪 ID
    pub trace_id: String,
}

impl AnalyzeResponse {
    pub fn new(summary: ReportSummary, suggestions: Vec<Suggestion>, trace_id: &str) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            summary,
            suggestions,
            trace_id: trace_id.to_string(),
        }
    }
}

fn bad_request(trace_id: &str, msg: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, trace_id, "bad_request", msg)
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

/// 分析性能测试报告并生成优化建议。
/// 报告原文不会出现在错误信息或日志中。
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "Analysis",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "分析结果", body = AnalyzeResponse),
        (status = 400, description = "请求参数错误或不支持的报告类型", body = ApiError),
        (status = 413, description = "报告超过大小上限", body = ApiError),
        (status = 500, description = "报告解析或规则加载失败", body = ApiError),
        (status = 504, description = "分析超时", body = ApiError)
    )
)]
pub async fn analyze(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(
                limit_bytes = state.config.max_report_bytes,
                "Analyze body exceeds size limit"
            );
            return error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                &trace_id,
                "payload_too_large",
                &format!(
                    "request body exceeds the {} byte limit",
                    state.config.max_report_bytes
                ),
            );
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected analyze body");
            return bad_request(&trace_id, "request body must be a JSON object");
        }
    };

    let (Some(report_type), Some(content)) = (required(req.report_type), required(req.content))
    else {
        return bad_request(&trace_id, "report_type and content are required");
    };

    let report_type: ReportType = match report_type.trim().parse() {
        Ok(kind) => kind,
        Err(msg) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "unsupported_report_type",
                &msg,
            );
        }
    };

    let rules = state.rule_source.clone();
    let task = tokio::task::spawn_blocking(move || run_analysis(report_type, &content, &rules));

    match tokio::time::timeout(state.analysis_timeout, task).await {
        Ok(Ok(Ok(outcome))) => (
            StatusCode::OK,
            Json(AnalyzeResponse::new(
                outcome.summary,
                outcome.suggestions,
                &trace_id,
            )),
        )
            .into_response(),
        Ok(Ok(Err(AnalyzeError::Extraction(e)))) => {
            tracing::warn!(report_type = %report_type, error = %e, "Report extraction failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "extraction_error",
                &e.to_string(),
            )
        }
        Ok(Ok(Err(AnalyzeError::Rules(e)))) => {
            tracing::error!(source = %state.rule_source, error = %e, "Rule store unavailable");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "rule_store_error",
                "rule store unavailable",
            )
        }
        Ok(Err(join_err)) => {
            tracing::error!(error = %join_err, "Analysis task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "internal_error",
                "internal error",
            )
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = state.analysis_timeout.as_secs(),
                "Analysis timed out"
            );
            error_response(
                StatusCode::GATEWAY_TIMEOUT,
                &trace_id,
                "timeout",
                "analysis timed out",
            )
        }
    }
}
