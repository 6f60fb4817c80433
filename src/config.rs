use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 处理服务地址（不含 /process）
    pub endpoint_base_url: String,
    /// 问题缓冲区的持久化文件
    pub store_path: String,
    /// 通知日志文件
    pub notification_log_file: String,
    /// 提交请求超时（秒）
    pub submit_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- Gemini 配置 ---
    pub gemini_api_key: String,
    pub gemini_api_base_url: String,
    pub gemini_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_base_url: "http://localhost:5000".to_string(),
            store_path: "question_store.json".to_string(),
            notification_log_file: "notifications.txt".to_string(),
            submit_timeout_secs: 30,
            verbose_logging: false,
            gemini_api_key: String::new(),
            gemini_api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            gemini_model_name: "gemini-1.5-flash".to_string(),
        }
    }
}

/// TOML 配置文件中的可选字段
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    endpoint_base_url: Option<String>,
    store_path: Option<String>,
    notification_log_file: Option<String>,
    submit_timeout_secs: Option<u64>,
    verbose_logging: Option<bool>,
    gemini_api_key: Option<String>,
    gemini_api_base_url: Option<String>,
    gemini_model_name: Option<String>,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env()
    }

    /// 先读 TOML 配置文件，再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        base.with_env()
    }

    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        let file: FileConfig =
            toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
                path: origin.to_string(),
                source,
            })?;
        let default = Self::default();
        Ok(Self {
            endpoint_base_url: file.endpoint_base_url.unwrap_or(default.endpoint_base_url),
            store_path: file.store_path.unwrap_or(default.store_path),
            notification_log_file: file
                .notification_log_file
                .unwrap_or(default.notification_log_file),
            submit_timeout_secs: file.submit_timeout_secs.unwrap_or(default.submit_timeout_secs),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
            gemini_api_key: file.gemini_api_key.unwrap_or(default.gemini_api_key),
            gemini_api_base_url: file.gemini_api_base_url.unwrap_or(default.gemini_api_base_url),
            gemini_model_name: file.gemini_model_name.unwrap_or(default.gemini_model_name),
        })
    }

    fn with_env(self) -> AppResult<Self> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    /// 用 `lookup` 提供的变量覆盖配置；数值和布尔值解析失败时报错
    fn with_vars(self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        Ok(Self {
            endpoint_base_url: lookup("ENDPOINT_BASE_URL").unwrap_or(self.endpoint_base_url),
            store_path: lookup("STORE_PATH").unwrap_or(self.store_path),
            notification_log_file: lookup("NOTIFICATION_LOG_FILE")
                .unwrap_or(self.notification_log_file),
            submit_timeout_secs: parse_var(&lookup, "SUBMIT_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.submit_timeout_secs),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
            gemini_api_key: lookup("GEMINI_API_KEY").unwrap_or(self.gemini_api_key),
            gemini_api_base_url: lookup("GEMINI_API_BASE_URL").unwrap_or(self.gemini_api_base_url),
            gemini_model_name: lookup("GEMINI_MODEL_NAME").unwrap_or(self.gemini_model_name),
        })
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs.max(1))
    }
}

/// 解析一个可选的环境变量，未设置时返回 None
fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    expected_type: &str,
) -> AppResult<Option<T>> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    value.trim().parse().map(Some).map_err(|_| {
        ConfigError::EnvVarParseFailed {
            var_name: name.to_string(),
            value,
            expected_type: expected_type.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_overrides_defaults() {
        let content = r#"
            endpoint_base_url = "http://127.0.0.1:9000"
            submit_timeout_secs = 5
        "#;
        let config = Config::from_toml_str(content, "inline").unwrap();
        assert_eq!(config.endpoint_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.submit_timeout_secs, 5);
        assert_eq!(config.store_path, "question_store.json");
        assert_eq!(config.gemini_model_name, "gemini-1.5-flash");
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = Config::from_toml_str("submit_timeout_secs = \"soon\"", "inline").unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Config(ConfigError::TomlParseFailed { .. })
        ));
    }

    #[test]
    fn test_timeout_never_zero() {
        let config = Config {
            submit_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.submit_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_vars_override_config() {
        let config = Config::default()
            .with_vars(|name| match name {
                "SUBMIT_TIMEOUT_SECS" => Some(" 12 ".to_string()),
                "VERBOSE_LOGGING" => Some("true".to_string()),
                "STORE_PATH" => Some("/tmp/qb.json".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.submit_timeout_secs, 12);
        assert!(config.verbose_logging);
        assert_eq!(config.store_path, "/tmp/qb.json");
        assert_eq!(config.endpoint_base_url, "http://localhost:5000");
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let err = Config::default()
            .with_vars(|name| (name == "SUBMIT_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        match err {
            crate::error::AppError::Config(ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            }) => {
                assert_eq!(var_name, "SUBMIT_TIMEOUT_SECS");
                assert_eq!(value, "soon");
                assert_eq!(expected_type, "u64");
            }
            other => panic!("意外的错误: {:?}", other),
        }
    }
}
