//! 组合问题提交流程 - 流程层
//!
//! 流程顺序：
//! 1. 读缓冲区：读失败报错，没有主问题就提示用户
//! 2. 拼接组合提示词
//! 3. 发一次请求（带超时，不重试）
//! 4. 成功 → 有条件清空缓冲区；失败 → 缓冲区原样保留并归类错误

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::clients::ProcessEndpoint;
use crate::models::{ProcessRequest, SubmissionOutcome};
use crate::services::{BufferStore, Notifier};
use crate::utils::truncate_text;
use crate::workflow::dispatch::{classify_failure, dispatch, FailureClass};

/// 提交控制器
///
/// - 缓冲区只在确认成功后清空
/// - 清空是有条件的：提交期间有新片段追加就保留整个缓冲区
pub struct SubmissionController {
    buffer: Arc<BufferStore>,
    endpoint: Arc<dyn ProcessEndpoint>,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl SubmissionController {
    pub fn new(
        buffer: Arc<BufferStore>,
        endpoint: Arc<dyn ProcessEndpoint>,
        notifier: Arc<dyn Notifier>,
        timeout: Duration,
    ) -> Self {
        Self {
            buffer,
            endpoint,
            notifier,
            timeout,
        }
    }

    /// 处理一次提交触发
    pub async fn on_submit_trigger(&self) -> SubmissionOutcome {
        let snapshot = match self.buffer.try_read().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("❌ 读取问题缓冲区失败，无法提交: {}", e);
                return SubmissionOutcome::RetrieveFailed {
                    reason: e.to_string(),
                };
            }
        };

        let Some(prompt) = snapshot.compose_prompt() else {
            info!("💡 还没有主问题，无需提交");
            return SubmissionOutcome::NoQuestionSet;
        };

        let context_count = snapshot.context_count();
        info!("📤 正在提交组合问题 ({} 个上下文片段)...", context_count);
        debug!("组合提示词: {}", truncate_text(&prompt, 200));

        self.notifier
            .notify(
                "Processing...",
                &format!("Sending question with {} context snippets.", context_count),
            )
            .await;

        let request = ProcessRequest::new(prompt);

        match dispatch(self.endpoint.as_ref(), &request, self.timeout).await {
            Ok(reply) => {
                info!("✓ 处理服务返回成功");
                let buffer_cleared = match self.buffer.clear_if_unchanged(&snapshot).await {
                    Ok(cleared) => cleared,
                    Err(e) => {
                        // 用户已经拿到结果，不降级
                        error!("❌ 提交成功但清空缓冲区失败: {}", e);
                        false
                    }
                };
                SubmissionOutcome::Success {
                    message: reply.message,
                    buffer_cleared,
                }
            }
            Err(e) => {
                warn!("⚠️ 提交失败，缓冲区保留: {}", e);
                match classify_failure(&e) {
                    FailureClass::RateLimited(message) => {
                        SubmissionOutcome::RateLimited { message }
                    }
                    FailureClass::Failed(message) => SubmissionOutcome::Failed { message },
                }
            }
        }
    }
}
