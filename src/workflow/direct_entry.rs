//! 直接输入流程 - 流程层
//!
//! 用户直接填写问题（和可选的附加信息）发给处理服务，不经过缓冲区

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::clients::ProcessEndpoint;
use crate::models::{DirectOutcome, ProcessRequest};
use crate::workflow::dispatch::{classify_failure, dispatch, FailureClass};

pub struct DirectEntry {
    endpoint: Arc<dyn ProcessEndpoint>,
    timeout: Duration,
}

impl DirectEntry {
    pub fn new(endpoint: Arc<dyn ProcessEndpoint>, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    /// 提交一次直接输入
    ///
    /// 问题为空时不发请求；附加信息为空时不带 `additional_info` 字段
    pub async fn submit(&self, question: &str, additional_info: Option<&str>) -> DirectOutcome {
        let question = question.trim();
        if question.is_empty() {
            return DirectOutcome::MissingQuestion;
        }

        let mut request = ProcessRequest::new(question);
        if let Some(info) = additional_info.map(str::trim).filter(|s| !s.is_empty()) {
            request = request.with_additional_info(info);
        }

        info!(
            "📤 发送直接输入的问题 (附加信息: {})",
            if request.additional_info.is_some() { "有" } else { "无" }
        );

        match dispatch(self.endpoint.as_ref(), &request, self.timeout).await {
            Ok(reply) => DirectOutcome::Success {
                message: reply.message,
            },
            Err(e) => {
                warn!("⚠️ 直接输入提交失败: {}", e);
                match classify_failure(&e) {
                    FailureClass::RateLimited(message) => DirectOutcome::RateLimited { message },
                    FailureClass::Failed(message) => DirectOutcome::Failed { message },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, AppResult};
    use crate::models::ProcessReply;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEndpoint {
        requests: Mutex<Vec<ProcessRequest>>,
        fail_with_status: Option<u16>,
    }

    #[async_trait]
    impl ProcessEndpoint for RecordingEndpoint {
        async fn process(&self, request: &ProcessRequest) -> AppResult<ProcessReply> {
            self.requests.lock().unwrap().push(request.clone());
            match self.fail_with_status {
                Some(status) => Err(ApiError::BadStatus {
                    endpoint: "e".to_string(),
                    status,
                    message: None,
                }
                .into()),
                None => Ok(ProcessReply {
                    status: Some("success".to_string()),
                    ..ProcessReply::default()
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_blank_question_sends_nothing() {
        let endpoint = Arc::new(RecordingEndpoint::default());
        let entry = DirectEntry::new(endpoint.clone(), Duration::from_secs(5));

        assert_eq!(entry.submit("   ", Some("info")).await, DirectOutcome::MissingQuestion);
        assert!(endpoint.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_additional_info_is_omitted() {
        let endpoint = Arc::new(RecordingEndpoint::default());
        let entry = DirectEntry::new(endpoint.clone(), Duration::from_secs(5));

        assert!(entry.submit(" Q ", Some("  ")).await.is_success());
        assert!(entry.submit("Q", Some(" more ")).await.is_success());

        let requests = endpoint.requests.lock().unwrap().clone();
        assert_eq!(requests[0], ProcessRequest::new("Q"));
        assert_eq!(requests[1], ProcessRequest::new("Q").with_additional_info("more"));
    }

    #[tokio::test]
    async fn test_failure_status_line() {
        let endpoint = Arc::new(RecordingEndpoint {
            fail_with_status: Some(400),
            ..RecordingEndpoint::default()
        });
        let entry = DirectEntry::new(endpoint, Duration::from_secs(5));

        let outcome = entry.submit("Q", None).await;
        assert_eq!(outcome.status_line(), "Server Error: HTTP error! Status: 400");
    }
}
