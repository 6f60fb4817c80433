//! 键值存储 - 基础设施层
//!
//! 持有持久化资源（文件 / 内存），只暴露 get / set / remove 能力

use crate::error::{AppError, AppResult, StorageError};
use async_trait::async_trait;
use fs2::FileExt;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// 键值存储能力
///
/// 职责：
/// - 按固定键读写 JSON 值
/// - set / remove 失败必须以错误返回，不能吞掉
/// - 不认识问题缓冲区的结构
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 读取键，不存在时返回 None
    async fn get(&self, key: &str) -> AppResult<Option<JsonValue>>;

    /// 写入键
    async fn set(&self, key: &str, value: JsonValue) -> AppResult<()>;

    /// 删除键，键不存在也视为成功
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// 获取跨进程的独占写锁，守卫存活期间其他进程的写入方会等待
    ///
    /// 默认不加锁：只在一个进程里共享的存储靠调用方的进程内锁就够了
    async fn acquire_write_lock(&self) -> AppResult<StoreLock> {
        Ok(StoreLock::unlocked())
    }
}

/// 跨进程写锁守卫，drop 时释放
pub struct StoreLock {
    file: Option<std::fs::File>,
}

impl StoreLock {
    /// 不持有任何锁的守卫
    pub fn unlocked() -> Self {
        Self { file: None }
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = file.unlock();
        }
    }
}

/// 基于单个 JSON 文件的存储
///
/// 整个文件是一个 JSON 对象，每个键对应一个字段。
/// 写入时先写同目录下的唯一临时文件再 rename，崩溃不会留下半个文件，
/// 多个写入方也不会互相覆盖对方的临时文件。
/// 跨进程写锁是旁边的 `<文件名>.lock`。
pub struct JsonFileStore {
    path: PathBuf,
    file_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    async fn ensure_parent_dir(&self) -> AppResult<PathBuf> {
        let parent = self.parent_dir();
        fs::create_dir_all(&parent)
            .await
            .map_err(|e| AppError::storage_write_failed(parent.display().to_string(), e))?;
        Ok(parent)
    }

    async fn load_map(&self) -> AppResult<Map<String, JsonValue>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("存储文件不存在，视为空: {}", self.display_path());
                return Ok(Map::new());
            }
            Err(e) => return Err(AppError::storage_read_failed(self.display_path(), e)),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<JsonValue>(&content) {
            Ok(JsonValue::Object(map)) => Ok(map),
            Ok(_) => {
                warn!("⚠️ 存储文件不是 JSON 对象，视为空: {}", self.display_path());
                Ok(Map::new())
            }
            Err(e) => {
                warn!("⚠️ 存储文件无法解析，视为空 ({}): {}", self.display_path(), e);
                Ok(Map::new())
            }
        }
    }

    async fn save_map(&self, map: Map<String, JsonValue>) -> AppResult<()> {
        let content =
            serde_json::to_string_pretty(&JsonValue::Object(map)).map_err(StorageError::from)?;
        let parent = self.ensure_parent_dir().await?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
            temp.write_all(content.as_bytes())?;
            temp.as_file().sync_all()?;
            temp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::storage_write_failed(self.display_path(), e))?
        .map_err(|e| AppError::storage_write_failed(self.display_path(), e))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> AppResult<Option<JsonValue>> {
        let _guard = self.file_lock.lock().await;
        let mut map = self.load_map().await?;
        Ok(map.remove(key))
    }

    async fn set(&self, key: &str, value: JsonValue) -> AppResult<()> {
        let _guard = self.file_lock.lock().await;
        let mut map = self.load_map().await?;
        map.insert(key.to_string(), value);
        self.save_map(map).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let _guard = self.file_lock.lock().await;
        let mut map = self.load_map().await?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.save_map(map).await.map_err(|e| match e {
            AppError::Storage(StorageError::WriteFailed { source, .. }) => {
                AppError::Storage(StorageError::RemoveFailed {
                    key: key.to_string(),
                    source,
                })
            }
            other => other,
        })
    }

    async fn acquire_write_lock(&self) -> AppResult<StoreLock> {
        self.ensure_parent_dir().await?;
        let lock_path = self.lock_path();
        let lock_display = lock_path.display().to_string();

        let file = tokio::task::spawn_blocking(move || -> std::io::Result<std::fs::File> {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(&lock_path)?;
            file.lock_exclusive()?;
            Ok(file)
        })
        .await
        .map_err(|e| AppError::storage_write_failed(&lock_display, e))?
        .map_err(|e| AppError::storage_write_failed(&lock_display, e))?;

        debug!("已获取存储写锁: {}", lock_display);
        Ok(StoreLock { file: Some(file) })
    }
}

/// 内存存储，进程退出即丢失
#[derive(Default)]
pub struct MemoryStore {
    entries: std::sync::Mutex<HashMap<String, JsonValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, JsonValue>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<JsonValue>> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: JsonValue) -> AppResult<()> {
        self.entries().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}
