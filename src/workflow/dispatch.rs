//! 单次请求派发与失败归类
//!
//! 提交流程和直接输入流程共用：带超时发一次请求，失败时归成用户可读的消息

use std::time::Duration;

use crate::clients::ProcessEndpoint;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{ProcessReply, ProcessRequest, SubmissionOutcome};

/// 失败归类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureClass {
    RateLimited(String),
    Failed(String),
}

/// 发一次请求，超过 `timeout` 视为失败；不重试
pub async fn dispatch(
    endpoint: &dyn ProcessEndpoint,
    request: &ProcessRequest,
    timeout: Duration,
) -> AppResult<ProcessReply> {
    match tokio::time::timeout(timeout, endpoint.process(request)).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout {
            endpoint: "processing endpoint".to_string(),
            after_secs: timeout.as_secs(),
        }
        .into()),
    }
}

/// 把错误归成限流 / 一般失败，并挑出最合适的提示
///
/// 优先用响应体里的 message，没有时退回通用描述
pub fn classify_failure(err: &AppError) -> FailureClass {
    let message = match err {
        AppError::Api(ApiError::RateLimited { .. }) => {
            return FailureClass::RateLimited(SubmissionOutcome::RATE_LIMIT_MESSAGE.to_string())
        }
        AppError::Api(ApiError::BadStatus {
            status, message, ..
        }) => message
            .clone()
            .unwrap_or_else(|| format!("HTTP error! Status: {}", status)),
        AppError::Api(ApiError::Rejected { message, .. }) => message
            .clone()
            .unwrap_or_else(|| "Server reported an error".to_string()),
        AppError::Api(ApiError::Timeout { after_secs, .. }) => {
            format!("Request timed out after {}s", after_secs)
        }
        AppError::Api(ApiError::RequestFailed { source, .. }) => {
            format!("Network error: {}", source)
        }
        AppError::Api(ApiError::MalformedBody { .. }) => {
            "Invalid response from server.".to_string()
        }
        other => other.to_string(),
    };
    FailureClass::Failed(message)
}
