use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 持久化存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 标准输入输出错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 持久化存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 读取存储失败
    #[error("读取存储失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入存储失败
    #[error("写入存储失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 删除键失败
    #[error("删除键 {key} 失败: {source}")]
    RemoveFailed {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 序列化失败
    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（未拿到响应）
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 请求超时
    #[error("API请求超时 ({endpoint}), 已等待 {after_secs} 秒")]
    Timeout { endpoint: String, after_secs: u64 },
    /// 非 2xx 响应
    #[error("API返回错误状态 ({endpoint}): status={status}, message={message:?}")]
    BadStatus {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// 请求频率限制 (HTTP 429)
    #[error("API请求频率限制 ({endpoint}): {message:?}")]
    RateLimited {
        endpoint: String,
        message: Option<String>,
    },
    /// 2xx 响应但应用层报告失败
    #[error("服务端报告失败 ({endpoint}): {message:?}")]
    Rejected {
        endpoint: String,
        message: Option<String>,
    },
    /// 响应体无法解析
    #[error("响应体无法解析 ({endpoint}): {detail}")]
    MalformedBody { endpoint: String, detail: String },
    /// 提示词或回答被安全策略拦截
    #[error("内容被拦截: {reason}")]
    Blocked { reason: String },
    /// 返回结果中没有回答文本
    #[error("返回结果中没有回答文本 (finish_reason: {finish_reason:?})")]
    EmptyAnswer { finish_reason: Option<String> },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 必需的配置项为空
    #[error("缺少配置项 {name}")]
    MissingValue { name: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建存储读取错误
    pub fn storage_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Storage(StorageError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建存储写入错误
    pub fn storage_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Storage(StorageError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建缺少配置项错误
    pub fn missing_config(name: impl Into<String>) -> Self {
        AppError::Config(ConfigError::MissingValue { name: name.into() })
    }

    /// 是否为频率限制错误
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::Api(ApiError::RateLimited { .. }))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
