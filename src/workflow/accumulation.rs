//! 选中文本累积流程 - 流程层
//!
//! 决定一次选中该成为主问题还是上下文片段

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::models::{preview, Acknowledgement};
use crate::services::BufferStore;
use crate::utils::truncate_text;

/// 首次选中成为主问题、之后的选中都追加为上下文
enum AppendKind {
    Main,
    Context(usize),
}

/// 累积控制器
///
/// - 去掉首尾空白，空文本直接忽略
/// - 不去重：同一段文字选两次就是两个片段
pub struct AccumulationController {
    buffer: Arc<BufferStore>,
}

impl AccumulationController {
    pub fn new(buffer: Arc<BufferStore>) -> Self {
        Self { buffer }
    }

    /// 处理一次选中事件
    ///
    /// 空白文本返回 None，缓冲区不变
    pub async fn on_selection(&self, selected_text: &str) -> Option<Acknowledgement> {
        let text = selected_text.trim();
        if text.is_empty() {
            debug!("选中文本为空，忽略");
            return None;
        }

        info!("📝 添加文本片段: {}", truncate_text(text, 50));

        // 判空和追加必须在同一次事务里
        let result = self
            .buffer
            .update(|buffer| {
                if buffer.has_main_question() {
                    buffer.push_context(text);
                    AppendKind::Context(buffer.context_count())
                } else {
                    buffer.set_main(text);
                    AppendKind::Main
                }
            })
            .await;

        let ack = match result {
            Ok(AppendKind::Main) => {
                info!("✓ 已设为主问题");
                Acknowledgement::MainQuestionSet {
                    preview: preview(text),
                }
            }
            Ok(AppendKind::Context(total)) => {
                info!("✓ 已追加为上下文 (共 {} 个)", total);
                Acknowledgement::ContextAdded {
                    preview: preview(text),
                    total,
                }
            }
            Err(e) => {
                error!("❌ 保存问题片段失败: {}", e);
                Acknowledgement::PersistenceFailed {
                    reason: e.to_string(),
                }
            }
        };

        Some(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::infrastructure::{KeyValueStore, MemoryStore};
    use crate::models::QuestionBuffer;
    use crate::services::BUFFER_KEY;
    use async_trait::async_trait;
    use serde_json::Value as JsonValue;
    use std::time::Duration;

    fn controller() -> (Arc<MemoryStore>, Arc<BufferStore>, AccumulationController) {
        let store = Arc::new(MemoryStore::new());
        let buffer = Arc::new(BufferStore::new(store.clone()));
        let controller = AccumulationController::new(buffer.clone());
        (store, buffer, controller)
    }

    #[tokio::test]
    async fn test_first_selection_becomes_main_question() {
        let (_, buffer, controller) = controller();

        let ack = controller.on_selection("  hello world  ").await;

        assert_eq!(
            ack,
            Some(Acknowledgement::MainQuestionSet {
                preview: "hello world".to_string()
            })
        );
        assert_eq!(
            buffer.read().await,
            QuestionBuffer {
                main_question: Some("hello world".to_string()),
                context_snippets: vec![],
            }
        );
    }

    #[tokio::test]
    async fn test_context_keeps_insertion_order() {
        let (_, buffer, controller) = controller();
        controller.on_selection("Q").await;

        let first = controller.on_selection("a").await;
        let second = controller.on_selection("b").await;

        assert!(matches!(first, Some(Acknowledgement::ContextAdded { total: 1, .. })));
        assert!(matches!(second, Some(Acknowledgement::ContextAdded { total: 2, .. })));
        assert_eq!(buffer.read().await.context_snippets, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_blank_selection_is_ignored() {
        let (store, _, controller) = controller();
        controller.on_selection("Q").await;
        let before = store.get(BUFFER_KEY).await.unwrap();

        assert_eq!(controller.on_selection("   \n\t ").await, None);

        assert_eq!(store.get(BUFFER_KEY).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let (_, buffer, controller) = controller();
        controller.on_selection("Q").await;
        controller.on_selection("same").await;
        controller.on_selection("same").await;
        assert_eq!(buffer.read().await.context_snippets, vec!["same", "same"]);
    }

    #[tokio::test]
    async fn test_preview_is_truncated() {
        let (_, _, controller) = controller();
        let long = "a".repeat(60);
        match controller.on_selection(&long).await {
            Some(Acknowledgement::MainQuestionSet { preview }) => {
                assert_eq!(preview, format!("{}...", "a".repeat(40)))
            }
            other => panic!("意外的回执: {:?}", other),
        }
    }

    /// 读写都带延迟的存储，用来放大并发窗口
    struct SlowStore {
        inner: MemoryStore,
        delay: Duration,
    }

    #[async_trait]
    impl KeyValueStore for SlowStore {
        async fn get(&self, key: &str) -> AppResult<Option<JsonValue>> {
            tokio::time::sleep(self.delay).await;
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: JsonValue) -> AppResult<()> {
            tokio::time::sleep(self.delay).await;
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> AppResult<()> {
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_selections_are_all_kept() {
        let store = Arc::new(SlowStore {
            inner: MemoryStore::new(),
            delay: Duration::from_millis(2),
        });
        let buffer = Arc::new(BufferStore::new(store));
        let controller = Arc::new(AccumulationController::new(buffer.clone()));

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let controller = controller.clone();
                tokio::spawn(async move { controller.on_selection(&format!("part {}", i)).await })
            })
            .collect();
        for handle in futures::future::join_all(handles).await {
            assert!(handle.unwrap().is_some_and(|ack| ack.is_success()));
        }

        let current = buffer.read().await;
        assert!(current.has_main_question());
        assert_eq!(current.context_count(), 19);
    }

    /// 写入总是失败的存储
    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> AppResult<Option<JsonValue>> {
            self.inner.get(key).await
        }

        async fn set(&self, _key: &str, _value: JsonValue) -> AppResult<()> {
            Err(AppError::storage_write_failed(
                "memory",
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ))
        }

        async fn remove(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_is_reported() {
        let inner = MemoryStore::new();
        inner
            .set(BUFFER_KEY, QuestionBuffer {
                main_question: Some("Q".to_string()),
                context_snippets: vec![],
            }
            .to_stored())
            .await
            .unwrap();
        let buffer = Arc::new(BufferStore::new(Arc::new(ReadOnlyStore { inner })));
        let controller = AccumulationController::new(buffer.clone());

        let ack = controller.on_selection("context").await.unwrap();

        assert!(matches!(ack, Acknowledgement::PersistenceFailed { ref reason } if reason.contains("disk full")));
        assert!(buffer.read().await.context_snippets.is_empty());
    }
}
