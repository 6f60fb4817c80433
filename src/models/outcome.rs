//! 各流程的结果类型，以及它们对应的通知文案

use crate::utils::truncate_text;

/// 通知预览的最大字符数
pub const PREVIEW_CHARS: usize = 40;

/// 生成通知用的文本预览
pub fn preview(text: &str) -> String {
    truncate_text(text, PREVIEW_CHARS)
}

/// 选中文本被接收后的回执
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    /// 设置了主问题
    MainQuestionSet { preview: String },
    /// 追加了上下文，`total` 为追加后的片段总数
    ContextAdded { preview: String, total: usize },
    /// 保存失败，不应再显示成功通知
    PersistenceFailed { reason: String },
}

impl Acknowledgement {
    pub fn is_success(&self) -> bool {
        !matches!(self, Acknowledgement::PersistenceFailed { .. })
    }

    pub fn title(&self) -> &'static str {
        match self {
            Acknowledgement::MainQuestionSet { .. } => "Main Question Added",
            Acknowledgement::ContextAdded { .. } => "Context Added",
            Acknowledgement::PersistenceFailed { .. } => "Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Acknowledgement::MainQuestionSet { preview } => {
                format!("Set: \"{}\"\nSelect more text to add context.", preview)
            }
            Acknowledgement::ContextAdded { preview, total } => {
                format!("Added: \"{}\"\nTotal context snippets: {}.", preview, total)
            }
            Acknowledgement::PersistenceFailed { .. } => "Failed to save question part.".to_string(),
        }
    }
}

/// 提交的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 还没有主问题，缓冲区未动
    NoQuestionSet,
    /// 存储读失败，拿不到缓冲区，没有发请求
    RetrieveFailed { reason: String },
    /// 提交成功
    Success {
        /// 服务端返回的消息
        message: Option<String>,
        /// 缓冲区是否已清空（提交期间有新片段时保留）
        buffer_cleared: bool,
    },
    /// 被限流，缓冲区保留
    RateLimited { message: String },
    /// 其他失败，缓冲区保留
    Failed { message: String },
}

impl SubmissionOutcome {
    pub const RATE_LIMIT_MESSAGE: &'static str = "Rate limit hit. Please wait and try again.";

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success { .. })
    }

    pub fn title(&self) -> &'static str {
        match self {
            SubmissionOutcome::NoQuestionSet => "Question Builder",
            SubmissionOutcome::RetrieveFailed { .. } => "Error",
            SubmissionOutcome::Success { .. } => "Success!",
            SubmissionOutcome::RateLimited { .. } | SubmissionOutcome::Failed { .. } => {
                "Processing Failed"
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            SubmissionOutcome::NoQuestionSet => "Please add a main question first.".to_string(),
            SubmissionOutcome::RetrieveFailed { .. } => {
                "Could not retrieve question for processing.".to_string()
            }
            SubmissionOutcome::Success {
                message,
                buffer_cleared,
            } => {
                let base = message
                    .clone()
                    .unwrap_or_else(|| "Question processed and result copied.".to_string());
                if *buffer_cleared {
                    base
                } else {
                    format!("{}\nNew text arrived while sending; question kept.", base)
                }
            }
            SubmissionOutcome::RateLimited { message } | SubmissionOutcome::Failed { message } => {
                message.clone()
            }
        }
    }
}

/// 直接输入（弹窗表单）的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectOutcome {
    /// 问题为空，没有发请求
    MissingQuestion,
    Success { message: Option<String> },
    RateLimited { message: String },
    Failed { message: String },
}

impl DirectOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DirectOutcome::Success { .. })
    }

    /// 状态栏文案
    pub fn status_line(&self) -> String {
        match self {
            DirectOutcome::MissingQuestion => "Error: Please enter a question.".to_string(),
            DirectOutcome::Success { .. } => "Success! Code copied to clipboard.".to_string(),
            DirectOutcome::RateLimited { message } => message.clone(),
            DirectOutcome::Failed { message } => format!("Server Error: {}", message),
        }
    }
}
