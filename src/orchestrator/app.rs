//! 应用 - 编排层
//!
//! ## 职责
//!
//! 1. **资源装配**：按配置创建存储、处理服务客户端、通知渠道
//! 2. **流程分发**：把每个用户动作交给对应的流程
//! 3. **结果通知**：把流程结果转成通知，流程本身不关心怎么展示

use crate::clients::{GeminiClient, ProcessClient, ProcessEndpoint};
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{JsonFileStore, KeyValueStore};
use crate::models::{Acknowledgement, DirectOutcome, QuestionBuffer, SubmissionOutcome};
use crate::services::{
    extract_code_block, BufferStore, CompositeNotifier, ConsoleNotifier, FileNotifier, Notifier,
};
use crate::utils::logging::log_startup;
use crate::utils::truncate_text;
use crate::workflow::{AccumulationController, DirectEntry, SubmissionController};
use std::sync::Arc;
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    buffer: Arc<BufferStore>,
    accumulation: AccumulationController,
    submission: SubmissionController,
    direct: DirectEntry,
    notifier: Arc<dyn Notifier>,
}

impl App {
    /// 按配置初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&config.store_path));
        let endpoint: Arc<dyn ProcessEndpoint> = Arc::new(ProcessClient::new(&config)?);
        let notifier: Arc<dyn Notifier> = Arc::new(
            CompositeNotifier::new()
                .with(Arc::new(ConsoleNotifier))
                .with(Arc::new(FileNotifier::with_path(&config.notification_log_file))),
        );

        Ok(Self::with_parts(config, store, endpoint, notifier))
    }

    /// 用现成的能力组装应用（嵌入和测试用）
    pub fn with_parts(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        endpoint: Arc<dyn ProcessEndpoint>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let timeout = config.submit_timeout();
        let buffer = Arc::new(BufferStore::new(store));

        Self {
            accumulation: AccumulationController::new(buffer.clone()),
            submission: SubmissionController::new(
                buffer.clone(),
                endpoint.clone(),
                notifier.clone(),
                timeout,
            ),
            direct: DirectEntry::new(endpoint, timeout),
            buffer,
            notifier,
            config,
        }
    }

    /// 选中文本
    pub async fn select(&self, text: &str) -> Option<Acknowledgement> {
        let ack = self.accumulation.on_selection(text).await;
        if let Some(ack) = &ack {
            self.notifier.notify(ack.title(), &ack.message()).await;
        }
        ack
    }

    /// 提交组合问题
    pub async fn submit(&self) -> SubmissionOutcome {
        let outcome = self.submission.on_submit_trigger().await;
        self.notifier
            .notify(outcome.title(), &outcome.message())
            .await;
        outcome
    }

    /// 发一条不属于任何流程的通知
    pub async fn notify(&self, title: &str, message: &str) {
        self.notifier.notify(title, message).await;
    }

    /// 查看当前缓冲区
    pub async fn status(&self) -> QuestionBuffer {
        self.buffer.read().await
    }

    /// 清空缓冲区（相当于重新安装后的干净状态）
    pub async fn reset(&self) -> AppResult<()> {
        self.buffer.clear().await?;
        info!("🗑️ 已清空问题缓冲区");
        Ok(())
    }

    /// 直接输入一个问题
    pub async fn direct(&self, question: &str, additional_info: Option<&str>) -> DirectOutcome {
        self.direct.submit(question, additional_info).await
    }

    /// 单次问答：选中文本直接发给 Gemini
    ///
    /// 空白文本返回 Ok(None)；`code_only` 时只返回代码块
    pub async fn ask(&self, text: &str, code_only: bool) -> AppResult<Option<String>> {
        let question = text.trim();
        if question.is_empty() {
            warn!("⚠️ 没有选中文本");
            return Ok(None);
        }

        info!("📖 单次问答: {}", truncate_text(question, 50));
        let client = GeminiClient::new(&self.config)?;
        let answer = client.generate(question).await?;

        if !code_only {
            return Ok(Some(answer));
        }

        match extract_code_block(&answer) {
            Some(code) => Ok(Some(code)),
            None => {
                warn!("⚠️ 回答中没有代码块，返回完整回答");
                Ok(Some(answer))
            }
        }
    }
}

/// 把缓冲区描述成给人看的多行文本
pub fn describe_buffer(buffer: &QuestionBuffer) -> String {
    let Some(main_question) = &buffer.main_question else {
        return "No question in progress.".to_string();
    };

    let mut lines = vec![
        format!("Main question: {}", truncate_text(main_question, 60)),
        format!("Context snippets: {}", buffer.context_count()),
    ];
    for (index, snippet) in buffer.context_snippets.iter().enumerate() {
        lines.push(format!("  [{}] {}", index + 1, truncate_text(snippet, 60)));
    }
    lines.join("\n")
}
