//! Gemini API 客户端
//!
//! 单次问答：把选中的文本作为唯一提示词发给 generateContent，取出回答文本
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::utils::truncate_text;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, warn};

/// 安全评级中视为"未拦截"的概率等级
const HARMLESS_PROBABILITIES: [&str; 2] = ["NEGLIGIBLE", "LOW"];

/// Gemini 客户端
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
    model_name: String,
    timeout: Duration,
}

impl GeminiClient {
    /// 创建新的 Gemini 客户端，API Key 为空时报配置错误
    pub fn new(config: &Config) -> AppResult<Self> {
        if config.gemini_api_key.trim().is_empty() {
            return Err(AppError::missing_config("GEMINI_API_KEY"));
        }

        let timeout = config.submit_timeout();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::api_request_failed(&config.gemini_api_base_url, e))?;

        Ok(Self {
            http,
            api_key: config.gemini_api_key.clone(),
            api_base_url: config.gemini_api_base_url.clone(),
            model_name: config.gemini_model_name.clone(),
            timeout,
        })
    }

    /// 不含 key 的接口地址，可以安全地写进日志
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base_url.trim_end_matches('/'),
            self.model_name
        )
    }

    /// 发送提示词并返回回答文本
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        let endpoint = self.endpoint();
        debug!("调用 Gemini API: {} (模型: {})", endpoint, self.model_name);
        debug!("提示词: {}", truncate_text(prompt, 200));

        let body = json!({ "contents": [ { "parts": [ { "text": prompt } ] } ] });

        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Api(ApiError::Timeout {
                        endpoint: endpoint.clone(),
                        after_secs: self.timeout.as_secs(),
                    })
                } else {
                    AppError::api_request_failed(&endpoint, e)
                }
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let answer = interpret_generate_response(&endpoint, status, &text)?;
        debug!("Gemini 回答: {}", truncate_text(&answer, 200));
        Ok(answer)
    }
}

/// 解释 generateContent 的 HTTP 响应
pub fn interpret_generate_response(endpoint: &str, status: u16, body: &str) -> AppResult<String> {
    let parsed = serde_json::from_str::<JsonValue>(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .and_then(|v| v.pointer("/error/message"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let err = if status == 429 {
            ApiError::RateLimited {
                endpoint: endpoint.to_string(),
                message,
            }
        } else {
            ApiError::BadStatus {
                endpoint: endpoint.to_string(),
                status,
                message,
            }
        };
        return Err(err.into());
    }

    let value = parsed.ok_or_else(|| ApiError::MalformedBody {
        endpoint: endpoint.to_string(),
        detail: truncate_text(body, 200),
    })?;

    extract_answer(&value)
}

/// 从 generateContent 的响应 JSON 中取出 `candidates[0].content.parts[0].text`
pub fn extract_answer(value: &JsonValue) -> AppResult<String> {
    let Some(candidate) = value.pointer("/candidates/0") else {
        if let Some(reason) = value
            .pointer("/promptFeedback/blockReason")
            .and_then(|v| v.as_str())
        {
            let details = value
                .pointer("/promptFeedback/blockReasonMessage")
                .and_then(|v| v.as_str())
                .unwrap_or("No details provided.");
            return Err(ApiError::Blocked {
                reason: format!("{}. {}", reason, details),
            }
            .into());
        }
        return Err(ApiError::EmptyAnswer {
            finish_reason: None,
        }
        .into());
    };

    let finish_reason = candidate
        .get("finishReason")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    match finish_reason.as_deref() {
        Some("SAFETY") => {
            let categories: Vec<&str> = candidate
                .get("safetyRatings")
                .and_then(|v| v.as_array())
                .map(|ratings| {
                    ratings
                        .iter()
                        .filter(|r| {
                            let probability = r.get("probability").and_then(|p| p.as_str());
                            !probability.is_some_and(|p| HARMLESS_PROBABILITIES.contains(&p))
                        })
                        .filter_map(|r| r.get("category").and_then(|c| c.as_str()))
                        .collect()
                })
                .unwrap_or_default();
            let reason = if categories.is_empty() {
                "SAFETY (details unavailable)".to_string()
            } else {
                format!("SAFETY ({})", categories.join(", "))
            };
            return Err(ApiError::Blocked { reason }.into());
        }
        Some("RECITATION") => warn!("⚠️ Gemini 回答被标记为 RECITATION"),
        Some("STOP") | Some("MAX_TOKENS") | None => {}
        Some(other) => warn!("⚠️ 不常见的 finishReason: {}", other),
    }

    let text = candidate
        .pointer("/content/parts/0/text")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ApiError::EmptyAnswer { finish_reason }.into());
    }

    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_answer() {
        let value = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "  42  " } ] }, "finishReason": "STOP" }
            ]
        });
        assert_eq!(extract_answer(&value).unwrap(), "42");
    }

    #[test]
    fn test_prompt_blocked() {
        let value = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = extract_answer(&value).unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::Blocked { ref reason }) if reason.starts_with("SAFETY.")));
    }

    #[test]
    fn test_safety_finish_lists_categories() {
        let value = json!({
            "candidates": [{
                "finishReason": "SAFETY",
                "safetyRatings": [
                    { "category": "HARM_CATEGORY_HARASSMENT", "probability": "HIGH" },
                    { "category": "HARM_CATEGORY_HATE_SPEECH", "probability": "NEGLIGIBLE" }
                ]
            }]
        });
        match extract_answer(&value).unwrap_err() {
            AppError::Api(ApiError::Blocked { reason }) => {
                assert_eq!(reason, "SAFETY (HARM_CATEGORY_HARASSMENT)")
            }
            other => panic!("意外的错误: {:?}", other),
        }
    }

    #[test]
    fn test_empty_text_reports_finish_reason() {
        let value = json!({ "candidates": [ { "finishReason": "MAX_TOKENS", "content": { "parts": [] } } ] });
        match extract_answer(&value).unwrap_err() {
            AppError::Api(ApiError::EmptyAnswer { finish_reason }) => {
                assert_eq!(finish_reason.as_deref(), Some("MAX_TOKENS"))
            }
            other => panic!("意外的错误: {:?}", other),
        }
    }

    #[test]
    fn test_error_status_carries_api_message() {
        let body = r#"{"error":{"code":429,"message":"Resource exhausted"}}"#;
        let err = interpret_generate_response("gemini", 429, body).unwrap_err();
        assert!(err.is_rate_limited());

        let body = r#"{"error":{"code":404,"message":"model not found"}}"#;
        match interpret_generate_response("gemini", 404, body).unwrap_err() {
            AppError::Api(ApiError::BadStatus { status, message, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(message.as_deref(), Some("model not found"));
            }
            other => panic!("意外的错误: {:?}", other),
        }
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = Config::default();
        assert!(matches!(
            GeminiClient::new(&config),
            Err(AppError::Config(_))
        ));
    }

    /// 需要真实的 GEMINI_API_KEY
    #[tokio::test]
    #[ignore]
    async fn test_generate_live() {
        let config = Config::from_env().unwrap();
        let client = GeminiClient::new(&config).expect("需要设置 GEMINI_API_KEY");
        let answer = client.generate("Reply with the single word: pong").await.unwrap();
        assert!(!answer.is_empty());
    }
}
