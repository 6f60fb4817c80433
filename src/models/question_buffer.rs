//! 问题缓冲区模型
//!
//! 一个"主问题 + 有序上下文片段"的组合问题，以及它的序列化格式

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 正在累积中的组合问题
///
/// 不变量：
/// - 只有设置了主问题才可能有上下文片段
/// - 上下文片段按插入顺序保存，不去重
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBuffer {
    /// 主问题，None 表示还没开始
    pub main_question: Option<String>,
    /// 上下文片段
    #[serde(default)]
    pub context_snippets: Vec<String>,
}

impl QuestionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.main_question.is_none()
    }

    pub fn has_main_question(&self) -> bool {
        self.main_question.is_some()
    }

    pub fn context_count(&self) -> usize {
        self.context_snippets.len()
    }

    /// 设置主问题（调用方需先确认主问题为空，否则直接覆盖）
    pub fn set_main(&mut self, text: impl Into<String>) {
        self.main_question = Some(text.into());
    }

    /// 追加一个上下文片段
    pub fn push_context(&mut self, text: impl Into<String>) {
        self.context_snippets.push(text.into());
    }

    /// 从存储里的原始值恢复缓冲区
    ///
    /// 形状不对时整体视为空：
    /// - 不是对象
    /// - `context_snippets` 不是字符串数组
    /// - `main_question` 不是字符串 / null
    /// - 没有主问题却有上下文
    pub fn from_stored(value: Option<JsonValue>) -> Self {
        let Some(JsonValue::Object(map)) = value else {
            return Self::default();
        };

        let main_question = match map.get("main_question") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) if s.is_empty() => None,
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(_) => return Self::default(),
        };

        let context_snippets = match map.get("context_snippets") {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(items)) => {
                let mut snippets = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        JsonValue::String(s) => snippets.push(s.clone()),
                        _ => return Self::default(),
                    }
                }
                snippets
            }
            Some(_) => return Self::default(),
        };

        if main_question.is_none() && !context_snippets.is_empty() {
            return Self::default();
        }

        Self {
            main_question,
            context_snippets,
        }
    }

    /// 转成存储用的 JSON 值
    pub fn to_stored(&self) -> JsonValue {
        serde_json::json!({
            "main_question": self.main_question,
            "context_snippets": self.context_snippets,
        })
    }

    /// 拼接成发往处理服务的组合提示词
    ///
    /// 没有主问题时返回 None
    pub fn compose_prompt(&self) -> Option<String> {
        let main_question = self.main_question.as_deref()?;

        let mut prompt = format!("Main Question:\n{}\n", main_question);
        if !self.context_snippets.is_empty() {
            prompt.push_str("\nAdditional Context Provided:\n");
            for (index, snippet) in self.context_snippets.iter().enumerate() {
                prompt.push_str(&format!("[Context {}]:\n{}\n\n", index + 1, snippet));
            }
        }

        Some(prompt.trim_end().to_string())
    }
}
