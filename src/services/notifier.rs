//! 通知服务 - 业务能力层
//!
//! 只负责"把一条 (标题, 消息) 展示给用户"，尽力而为，失败不影响流程

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// 通知能力
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 发送一条通知，内部吞掉所有错误
    async fn notify(&self, title: &str, message: &str);
}

/// 打印到 stderr 的通知
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, title: &str, message: &str) {
        info!("🔔 {}: {}", title, message.replace('\n', " | "));
        eprintln!("[{}] {}", title, message);
    }
}

/// 追加写入通知日志文件
pub struct FileNotifier {
    log_file_path: String,
}

impl FileNotifier {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            log_file_path: path.into(),
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    async fn notify(&self, title: &str, message: &str) {
        let line = format!(
            "[{}] {} | {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            title,
            message.replace('\n', " / ")
        );
        if let Err(e) = self.append(&line).await {
            debug!("写入通知日志失败 ({}): {}", self.log_file_path, e);
        }
    }
}

/// 同时发给多个通知渠道
#[derive(Default)]
pub struct CompositeNotifier {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl CompositeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl Notifier for CompositeNotifier {
    async fn notify(&self, title: &str, message: &str) {
        futures::future::join_all(self.sinks.iter().map(|sink| sink.notify(title, message))).await;
    }
}

/// 记录所有通知，供嵌入方或测试检查
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.entries().into_iter().map(|(title, _)| title).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((title.to_string(), message.to_string()));
    }
}
