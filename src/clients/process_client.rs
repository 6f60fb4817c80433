//! 处理服务客户端
//!
//! 封装 `POST /process` 的调用和响应解析
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{ProcessReply, ProcessRequest};
use crate::utils::truncate_text;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// 处理服务能力
///
/// 发一次请求，拿回成功的响应或结构化错误；不重试
#[async_trait]
pub trait ProcessEndpoint: Send + Sync {
    async fn process(&self, request: &ProcessRequest) -> AppResult<ProcessReply>;
}

/// 基于 reqwest 的处理服务客户端
pub struct ProcessClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl ProcessClient {
    /// 创建新的处理服务客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let endpoint = format!("{}/process", config.endpoint_base_url.trim_end_matches('/'));
        let timeout = config.submit_timeout();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        Ok(Self {
            http,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::Api(ApiError::Timeout {
                endpoint: self.endpoint.clone(),
                after_secs: self.timeout.as_secs(),
            })
        } else {
            AppError::api_request_failed(&self.endpoint, err)
        }
    }
}

#[async_trait]
impl ProcessEndpoint for ProcessClient {
    async fn process(&self, request: &ProcessRequest) -> AppResult<ProcessReply> {
        debug!(
            "POST {} (问题长度: {} 字符, 附加信息: {})",
            self.endpoint,
            request.question.chars().count(),
            request.additional_info.is_some()
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        debug!("处理服务响应: status={}, body={}", status, truncate_text(&body, 200));

        interpret_response(&self.endpoint, status, &body)
    }
}

/// 把 HTTP 状态码和响应体解释成成功响应或错误
///
/// - 非 2xx：429 为限流，其余为 BadStatus；能解析出 message 就带上
/// - 2xx 但不是 JSON：MalformedBody
/// - 2xx 但 status 不是 "success"：Rejected
pub fn interpret_response(endpoint: &str, status: u16, body: &str) -> AppResult<ProcessReply> {
    let parsed = serde_json::from_str::<ProcessReply>(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .and_then(|reply| reply.message)
            .filter(|m| !m.trim().is_empty());
        let err = if status == 429 {
            ApiError::RateLimited {
                endpoint: endpoint.to_string(),
                message,
            }
        } else {
            ApiError::BadStatus {
                endpoint: endpoint.to_string(),
                status,
                message,
            }
        };
        return Err(err.into());
    }

    let Some(reply) = parsed else {
        return Err(ApiError::MalformedBody {
            endpoint: endpoint.to_string(),
            detail: truncate_text(body, 200),
        }
        .into());
    };

    if reply.is_success() {
        Ok(reply)
    } else {
        Err(ApiError::Rejected {
            endpoint: endpoint.to_string(),
            message: reply.message,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "http://localhost:5000/process";

    #[test]
    fn test_success_reply() {
        let reply =
            interpret_response(ENDPOINT, 200, r#"{"status":"success","message":"copied"}"#).unwrap();
        assert_eq!(reply.message.as_deref(), Some("copied"));
    }

    #[test]
    fn test_rate_limit_status() {
        let err = interpret_response(ENDPOINT, 429, r#"{"status":"error","message":"slow down"}"#)
            .unwrap_err();
        match err {
            AppError::Api(ApiError::RateLimited { message, .. }) => {
                assert_eq!(message.as_deref(), Some("slow down"))
            }
            other => panic!("意外的错误: {:?}", other),
        }
    }

    #[test]
    fn test_error_status_without_body() {
        let err = interpret_response(ENDPOINT, 502, "<html>bad gateway</html>").unwrap_err();
        match err {
            AppError::Api(ApiError::BadStatus {
                status, message, ..
            }) => {
                assert_eq!(status, 502);
                assert!(message.is_none());
            }
            other => panic!("意外的错误: {:?}", other),
        }
    }

    #[test]
    fn test_application_error_on_2xx() {
        let err = interpret_response(ENDPOINT, 200, r#"{"status":"error","message":"no code"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Api(ApiError::Rejected { message: Some(ref m), .. }) if m == "no code"
        ));
    }

    #[test]
    fn test_non_json_2xx_is_malformed() {
        let err = interpret_response(ENDPOINT, 200, "ok").unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::MalformedBody { .. })));
    }

    #[test]
    fn test_endpoint_built_from_base_url() {
        let config = Config {
            endpoint_base_url: "http://127.0.0.1:5000/".to_string(),
            ..Config::default()
        };
        let client = ProcessClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:5000/process");
    }
}
