//! 问题缓冲区服务 - 业务能力层
//!
//! 唯一能读写问题缓冲区的地方。所有"读 → 计算 → 写"都在同一把门锁里完成，
//! 两次快速的选中不会读到同一个旧状态而互相覆盖。
//! 门锁分两层：进程内的 tokio Mutex，加上存储提供的跨进程写锁
//! （每个 `select` 命令都是一个新进程）。

use crate::error::AppResult;
use crate::infrastructure::KeyValueStore;
use crate::models::QuestionBuffer;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// 缓冲区在存储中的固定键
pub const BUFFER_KEY: &str = "question_builder.current_question";

/// 问题缓冲区服务
///
/// 职责：
/// - 持有唯一的缓冲区键
/// - 提供 read / append / clear 能力，每次操作要么全部落盘要么不变
/// - 不关心选中文本该当主问题还是上下文
pub struct BufferStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    gate: Mutex<()>,
}

impl BufferStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, BUFFER_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            gate: Mutex::new(()),
        }
    }

    /// 读取当前缓冲区，从不失败
    ///
    /// 没存过、形状不对、或者存储读失败时都返回空缓冲区
    pub async fn read(&self) -> QuestionBuffer {
        let _guard = self.gate.lock().await;
        match self.load().await {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!("⚠️ 读取问题缓冲区失败，按空处理: {}", e);
                QuestionBuffer::default()
            }
        }
    }

    /// 读取当前缓冲区，存储读失败时返回错误
    ///
    /// 形状不对仍按空处理；只有存储本身出错才报错
    pub async fn try_read(&self) -> AppResult<QuestionBuffer> {
        let _guard = self.gate.lock().await;
        self.load().await
    }

    /// 在门锁内做一次事务性修改
    ///
    /// 读失败或写失败都返回错误，已存的内容不会被空缓冲区覆盖
    pub async fn update<F, T>(&self, mutate: F) -> AppResult<T>
    where
        F: FnOnce(&mut QuestionBuffer) -> T,
    {
        let _guard = self.gate.lock().await;
        let _write_lock = self.store.acquire_write_lock().await?;
        let mut buffer = self.load().await?;
        let result = mutate(&mut buffer);
        self.store.set(&self.key, buffer.to_stored()).await?;
        debug!(
            "缓冲区已保存: 主问题={}, 上下文={}",
            buffer.has_main_question(),
            buffer.context_count()
        );
        Ok(result)
    }

    /// 设置主问题
    pub async fn append_main(&self, text: &str) -> AppResult<()> {
        self.update(|buffer| buffer.set_main(text)).await
    }

    /// 追加上下文片段，返回追加后的片段总数
    pub async fn append_context(&self, text: &str) -> AppResult<usize> {
        self.update(|buffer| {
            buffer.push_context(text);
            buffer.context_count()
        })
        .await
    }

    /// 清空缓冲区
    pub async fn clear(&self) -> AppResult<()> {
        let _guard = self.gate.lock().await;
        let _write_lock = self.store.acquire_write_lock().await?;
        self.store.remove(&self.key).await
    }

    /// 只有当缓冲区仍等于 `expected` 时才清空
    ///
    /// 返回是否真的清空了。提交期间追加的片段会让它返回 false 并保留缓冲区。
    pub async fn clear_if_unchanged(&self, expected: &QuestionBuffer) -> AppResult<bool> {
        let _guard = self.gate.lock().await;
        let _write_lock = self.store.acquire_write_lock().await?;
        let current = self.load().await?;
        if &current != expected {
            warn!(
                "⚠️ 提交期间缓冲区有变化 (上下文 {} → {})，保留不清空",
                expected.context_count(),
                current.context_count()
            );
            return Ok(false);
        }
        self.store.remove(&self.key).await?;
        Ok(true)
    }

    async fn load(&self) -> AppResult<QuestionBuffer> {
        let stored = self.store.get(&self.key).await?;
        Ok(QuestionBuffer::from_stored(stored))
    }
}
